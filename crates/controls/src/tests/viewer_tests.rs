use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use anyhow::anyhow;
use serde_json::json;
use shared::{
    domain::Rgba,
    protocol::{ControlSpec, ServerEvent},
};

use super::*;
use crate::{
    error::ConstructionError,
    images::PixelArray,
    test_support::recording_viewer,
    variants::{
        Button, Checkbox, ColorPicker, DownloadButton, Dropdown, ImageGallery, Label, PlotPanel,
        Slider,
    },
};

fn defined(events: &[ServerEvent]) -> Vec<ControlEnvelope> {
    events
        .iter()
        .filter_map(|event| match event {
            ServerEvent::DefineControl { control } => Some(control.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn static_configuration_survives_the_wire() {
    let (mut viewer, _recorder) = recording_viewer();
    viewer.create("Settings", Group::new(true));
    viewer
        .create_in_group(
            "Settings",
            "Scale",
            Slider::new(0.1, 5.0, 0.1, 1.0).description("Uniform scale"),
        )
        .expect("slider");
    viewer.create("Go", Button::new());
    viewer.create("label", Label::new("**markdown** text"));
    viewer.create("Visible", Checkbox::new(true).description("Show mesh"));
    viewer.create(
        "Render Mode",
        Dropdown::new(["Solid", "Wireframe", "Points"]).initial("Points"),
    );
    viewer.create("Export", DownloadButton::new("mesh.obj"));
    viewer.create("Tint", ColorPicker::new([0.2_f32, 0.4, 0.6, 1.0]));
    viewer.create(
        "Histogram",
        PlotPanel::new(json!({"data": [{"type": "bar", "y": [1, 2]}], "layout": {}})),
    );
    viewer.create(
        "gallery",
        ImageGallery::new(["data:image/png;base64,AA=="])
            .expect("gallery")
            .thumbnail_size(96)
            .columns(4)
            .rows_per_page(2),
    );

    let snapshot = viewer.snapshot();
    assert_eq!(snapshot.len(), 10);
    for envelope in snapshot {
        let wire = serde_json::to_string(&envelope).expect("serialize");
        let parsed: ControlEnvelope = serde_json::from_str(&wire).expect("parse");
        assert_eq!(parsed, envelope, "{wire}");
        assert_eq!(parsed.id, parsed.name);
        assert_eq!(parsed.viewer_id, Some(ViewerId::new("client")));
    }

    let tint = viewer.serialize("Tint").expect("tint");
    match tint.spec {
        ControlSpec::ColorPicker { initial } => {
            assert!((initial.0[1] - 0.4).abs() < 1e-6);
        }
        other => panic!("unexpected spec: {other:?}"),
    }
    let mode = viewer.serialize("Render Mode").expect("dropdown");
    assert_eq!(
        mode.spec,
        ControlSpec::Dropdown {
            options: vec!["Solid".into(), "Wireframe".into(), "Points".into()],
            initial: "Points".into(),
            description: String::new(),
        }
    );
}

#[test]
fn creation_emits_a_definition() {
    let (mut viewer, recorder) = recording_viewer();
    viewer.create("MySlider", Slider::default());

    let events = recorder.events();
    assert_eq!(events.len(), 1);
    let ServerEvent::DefineControl { control } = &events[0] else {
        panic!("expected a definition, got {:?}", events[0]);
    };
    assert_eq!(control.name, "MySlider");
    assert_eq!(control.control_type(), ControlType::Slider);
}

#[test]
fn duplicate_names_keep_the_last_definition() {
    let (mut viewer, _recorder) = recording_viewer();
    viewer.create("Opacity", Slider::new(0.0, 1.0, 0.1, 1.0));
    viewer.create("Opacity", Checkbox::new(false));

    assert_eq!(viewer.registry().len(), 1);
    let control = viewer.get("Opacity").expect("control");
    assert_eq!(control.control_type(), ControlType::Checkbox);
    assert_eq!(control.value(), ControlValue::Bool(false));
}

#[test]
fn delete_removes_entry_and_always_notifies() {
    let (mut viewer, recorder) = recording_viewer();
    viewer.create("Reset", Button::new());
    recorder.clear();

    assert!(viewer.delete("Reset").is_some());
    assert!(viewer.get("Reset").is_none());
    assert!(viewer.value("Reset").is_none());
    assert!(viewer.delete("Reset").is_none());

    let deletes = recorder
        .events()
        .into_iter()
        .filter(|event| matches!(event, ServerEvent::DeleteControl { name } if name == "Reset"))
        .count();
    assert_eq!(deletes, 2);
}

#[test]
fn group_membership_is_recorded_once_in_insertion_order() {
    let (mut viewer, recorder) = recording_viewer();
    viewer.create("Basic Settings", Group::new(false));
    viewer
        .create_in_group("Basic Settings", "Scale", Slider::new(0.1, 5.0, 0.1, 1.0))
        .expect("scale");
    viewer
        .create_in_group("Basic Settings", "Visible", Checkbox::new(true))
        .expect("visible");
    viewer.create("Reset All", Button::new());
    viewer
        .add_to_group("Basic Settings", "Scale")
        .expect("re-adding is harmless");
    viewer
        .add_to_group("Basic Settings", "Reset All")
        .expect("reset");

    let scale = viewer.serialize("Scale").expect("scale");
    assert_eq!(scale.group.as_deref(), Some("Basic Settings"));
    let reset = viewer.serialize("Reset All").expect("reset");
    assert_eq!(reset.group.as_deref(), Some("Basic Settings"));

    let group = viewer.serialize("Basic Settings").expect("group");
    assert_eq!(
        group.spec,
        ControlSpec::Group {
            collapsed: false,
            controls: vec!["Scale".into(), "Visible".into(), "Reset All".into()],
        }
    );
    assert!(group.group.is_none());

    let last = defined(&recorder.events()).pop().expect("definitions");
    assert_eq!(last, group);
}

#[test]
fn grouping_into_missing_or_non_group_registers_nothing() {
    let (mut viewer, recorder) = recording_viewer();
    viewer.create("Plain", Button::new());
    recorder.clear();

    let error = viewer
        .create_in_group("Nowhere", "Scale", Slider::default())
        .expect_err("missing group");
    assert!(matches!(error, ControlError::NotFound(name) if name == "Nowhere"));

    let error = viewer
        .create_in_group("Plain", "Scale", Slider::default())
        .expect_err("not a group");
    assert!(matches!(
        error,
        ControlError::WrongKind {
            expected: ControlType::Group,
            actual: ControlType::Button,
            ..
        }
    ));

    assert!(viewer.get("Scale").is_none());
    assert!(recorder.events().is_empty());
}

#[test]
fn a_group_cannot_contain_itself() {
    let (mut viewer, recorder) = recording_viewer();
    viewer.create("G", Group::new(false));
    recorder.clear();

    let error = viewer
        .create_in_group("G", "G", Slider::default())
        .expect_err("self member");
    assert!(matches!(error, ControlError::SelfMembership(name) if name == "G"));
    let error = viewer.add_to_group("G", "G").expect_err("self member");
    assert!(matches!(error, ControlError::SelfMembership(_)));

    assert_eq!(viewer.get("G").map(Control::control_type), Some(ControlType::Group));
    let Some(ControlKind::Group(group)) = viewer.get("G").map(Control::kind) else {
        panic!("group replaced");
    };
    assert!(group.members().is_empty());
    assert!(recorder.events().is_empty());
}

#[test]
fn deleting_a_group_leaves_members_alone_and_deleting_members_keeps_group_list() {
    let (mut viewer, _recorder) = recording_viewer();
    viewer.create("Advanced", Group::new(true));
    viewer
        .create_in_group("Advanced", "Opacity", Slider::default())
        .expect("opacity");
    viewer
        .create_in_group("Advanced", "Mode", Dropdown::new(["Solid"]))
        .expect("mode");

    viewer.delete("Mode");
    let group = viewer.serialize("Advanced").expect("group");
    assert_eq!(
        group.spec,
        ControlSpec::Group {
            collapsed: true,
            controls: vec!["Opacity".into(), "Mode".into()],
        }
    );
    assert_eq!(viewer.value("Advanced"), Some(ControlValue::Bool(true)));

    viewer.delete("Advanced");
    let opacity = viewer.serialize("Opacity").expect("member survives");
    assert_eq!(opacity.group.as_deref(), Some("Advanced"));
}

#[test]
fn label_update_runs_callback_and_always_emits() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let (mut viewer, recorder) = recording_viewer();
    viewer.create(
        "status",
        Label::new("idle").on_update(move |viewer| {
            seen.fetch_add(1, Ordering::SeqCst);
            assert_eq!(
                viewer.value("status"),
                Some(ControlValue::Text("running".into()))
            );
            Ok(())
        }),
    );
    recorder.clear();

    viewer.update_label("status", "running").expect("update");
    viewer.update_label("status", "running").expect("update");

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    let updates: Vec<ServerEvent> = recorder.events();
    assert_eq!(
        updates,
        vec![
            ServerEvent::UpdateLabel {
                name: "status".into(),
                text: "running".into()
            };
            2
        ]
    );
}

#[test]
fn label_update_emits_even_when_callback_fails() {
    let (mut viewer, recorder) = recording_viewer();
    viewer.create(
        "status",
        Label::new("").on_update(|_viewer| Err(anyhow!("renderer busy"))),
    );
    recorder.clear();

    let error = viewer.update_label("status", "done").expect_err("callback");
    assert!(matches!(error, ControlError::Callback { ref name, .. } if name == "status"));
    assert_eq!(viewer.value("status"), Some(ControlValue::Text("done".into())));
    assert_eq!(recorder.events().len(), 1);
}

#[test]
fn label_update_rejects_other_kinds_and_missing_names() {
    let (mut viewer, _recorder) = recording_viewer();
    viewer.create("Scale", Slider::default());

    assert!(matches!(
        viewer.update_label("Scale", "x"),
        Err(ControlError::WrongKind {
            expected: ControlType::Label,
            ..
        })
    ));
    assert!(matches!(
        viewer.update_label("missing", "x"),
        Err(ControlError::NotFound(_))
    ));
}

#[test]
fn gallery_update_resets_view_state_and_emits_once() {
    let (mut viewer, recorder) = recording_viewer();
    viewer.create(
        "gallery",
        ImageGallery::new(["data:image/png;base64,AA==", "data:image/png;base64,AQ=="])
            .expect("gallery"),
    );
    viewer
        .handle_event("gallery", json!({"type": "imageClick", "index": 1}))
        .expect("click");
    viewer
        .handle_event("gallery", json!({"type": "pageChange", "page": 3}))
        .expect("page");
    recorder.clear();

    let replacement = PixelArray::from_u8([1, 1, 3], vec![255, 0, 0]);
    viewer
        .update_gallery("gallery", [replacement])
        .expect("update");

    let updates = recorder.gallery_updates();
    assert_eq!(updates.len(), 1);
    let (name, images) = &updates[0];
    assert_eq!(name, "gallery");
    assert_eq!(images.len(), 1);
    assert!(images[0].starts_with(crate::images::PNG_DATA_URI_PREFIX));

    let Some(ControlKind::ImageGallery(gallery)) = viewer.get("gallery").map(Control::kind)
    else {
        panic!("gallery missing");
    };
    assert_eq!(gallery.selected_index(), None);
    assert_eq!(gallery.current_page(), 0);
    assert_eq!(gallery.images(), images.as_slice());
    assert_eq!(viewer.value("gallery"), Some(ControlValue::Selection(None)));
}

#[test]
fn failed_gallery_update_changes_nothing() {
    let (mut viewer, recorder) = recording_viewer();
    viewer.create(
        "gallery",
        ImageGallery::new(["data:image/png;base64,AA=="]).expect("gallery"),
    );
    viewer
        .handle_event("gallery", json!({"type": "imageClick", "index": 0}))
        .expect("click");
    recorder.clear();

    let two_channels = PixelArray::from_u8([1, 1, 2], vec![0, 0]);
    let error = viewer
        .update_gallery("gallery", [two_channels])
        .expect_err("bad channels");
    assert!(matches!(
        error,
        ControlError::Construction(ConstructionError::UnsupportedChannels { .. })
    ));
    assert_eq!(viewer.value("gallery"), Some(ControlValue::Selection(Some(0))));
    assert!(recorder.gallery_updates().is_empty());
}

#[test]
fn snapshot_lists_groups_before_members() {
    let (mut viewer, _recorder) = recording_viewer();
    viewer.create("Reset All", Button::new());
    viewer.create("Basic", Group::new(false));
    viewer
        .create_in_group("Basic", "Scale", Slider::default())
        .expect("scale");
    viewer.create("Advanced", Group::new(true));
    viewer.create("Tint", ColorPicker::new(Rgba::new(1.0, 0.0, 0.0, 1.0)));

    let names: Vec<String> = viewer
        .snapshot()
        .into_iter()
        .map(|envelope| envelope.name)
        .collect();
    assert_eq!(names, ["Basic", "Advanced", "Reset All", "Scale", "Tint"]);
}

#[test]
fn lookup_exposes_group_and_typed_values() {
    let (mut viewer, _recorder) = recording_viewer();
    viewer.create("Basic", Group::new(false));
    viewer
        .create_in_group("Basic", "Scale", Slider::new(0.0, 2.0, 0.5, 1.5))
        .expect("scale");
    viewer.create("Visible", Checkbox::new(true));
    viewer.create("Mode", Dropdown::new(["Solid", "Points"]));
    viewer.create("Tint", ColorPicker::new(Rgba::new(1.0, 0.0, 0.0, 1.0)));

    assert_eq!(viewer.get("Scale").and_then(Control::group), Some("Basic"));
    assert_eq!(viewer.get("Visible").and_then(Control::group), None);

    let scale = viewer.value("Scale").expect("scale");
    assert_eq!(scale.as_f64(), Some(1.5));
    assert_eq!(scale.as_bool(), None);
    assert_eq!(viewer.value("Visible").and_then(|v| v.as_bool()), Some(true));
    assert_eq!(
        viewer.value("Mode").as_ref().and_then(ControlValue::as_str),
        Some("Solid")
    );
    assert_eq!(
        viewer.value("Tint").and_then(|v| v.as_color()),
        Some(Rgba::new(1.0, 0.0, 0.0, 1.0))
    );
}
