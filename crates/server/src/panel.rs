//! Demo control panel served when the binary starts.

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use controls::{
    Button, Checkbox, ColorPicker, ControlError, DownloadButton, Dropdown, Emitter, Group,
    ImageGallery, Label, PixelArray, PlotPanel, Slider, Viewer,
};
use headless::{with_capture, RenderEngine, Resolution};
use serde_json::json;
use shared::{
    error::{ApiError, ErrorCode},
    protocol::ServerEvent,
};
use tokio::runtime::Handle;
use tracing::{info, warn};
use url::Url;

pub(crate) const STATUS_LABEL: &str = "status";
pub(crate) const GALLERY: &str = "test_gallery";
pub(crate) const SCREENSHOT: &str = "Screenshot";
pub(crate) const SCREENSHOT_FILE: &str = "screenshot.png";
const GALLERY_SIZE: usize = 12;
const TILE: usize = 64;
const SCREENSHOT_TIMEOUT: Duration = Duration::from_secs(60);

/// Surface to capture when the screenshot control is pressed.
#[derive(Clone)]
pub(crate) struct ScreenshotTarget {
    pub(crate) url: Url,
    pub(crate) engine: Arc<dyn RenderEngine>,
    pub(crate) timeout: Duration,
}

impl ScreenshotTarget {
    pub(crate) fn new(url: Url, engine: Arc<dyn RenderEngine>) -> Self {
        Self {
            url,
            engine,
            timeout: SCREENSHOT_TIMEOUT,
        }
    }
}

pub(crate) fn install_demo_panel(
    viewer: &mut Viewer,
    screenshot: Option<ScreenshotTarget>,
) -> Result<(), ControlError> {
    viewer.create(STATUS_LABEL, Label::new("Waiting for input"));

    viewer.create("Basic Settings", Group::new(false));
    viewer.create_in_group(
        "Basic Settings",
        "Scale",
        Slider::new(0.1, 5.0, 0.1, 1.0)
            .description("Uniform scale of the model")
            .on_change(|viewer, value| {
                viewer.update_label(STATUS_LABEL, format!("Scale: {value:.1}"))?;
                Ok(None)
            }),
    )?;
    viewer.create_in_group(
        "Basic Settings",
        "Visible",
        Checkbox::new(true).on_change(|viewer, visible| {
            viewer.update_label(STATUS_LABEL, format!("Visible: {visible}"))?;
            Ok(None)
        }),
    )?;

    viewer.create("Advanced Settings", Group::new(true));
    viewer.create_in_group(
        "Advanced Settings",
        "Opacity",
        Slider::new(0.0, 1.0, 0.01, 1.0),
    )?;
    viewer.create_in_group(
        "Advanced Settings",
        "Render Mode",
        Dropdown::new(["Solid", "Wireframe", "Points"]).on_change(|viewer, mode| {
            viewer.update_label(STATUS_LABEL, format!("Mode: {mode}"))?;
            Ok(Some(json!(mode)))
        }),
    )?;

    viewer.create(
        "Reset All",
        Button::new().on_press(|viewer| {
            viewer.update_label(STATUS_LABEL, "Reset clicked!")?;
            Ok(())
        }),
    );
    viewer.create(
        "MyColorPicker",
        ColorPicker::default().on_change(|_viewer, color| Ok(Some(json!(color)))),
    );
    viewer.create(
        "SelfDestructiveButton",
        Button::new().on_press(|viewer| {
            viewer.delete("SelfDestructiveButton");
            Ok(())
        }),
    );
    viewer.create(
        "Download Text File",
        DownloadButton::new("test.txt")
            .on_press(|_viewer| Ok(Some(b"This is a test file.".to_vec()))),
    );
    viewer.create("Histogram", PlotPanel::new(histogram_figure()));

    viewer.create(
        GALLERY,
        ImageGallery::new(gallery_tiles(0))?
            .thumbnail_size(120)
            .columns(2)
            .rows_per_page(2)
            .on_click(|viewer, index| {
                viewer.update_label(STATUS_LABEL, format!("Clicked image {index}"))?;
                Ok(Some(json!(index)))
            }),
    );
    viewer.create(
        "Shuffle Gallery",
        Button::new().on_press(|viewer| {
            viewer.update_gallery(GALLERY, gallery_tiles(5))?;
            Ok(())
        }),
    );

    if let Some(target) = screenshot {
        info!(url = %target.url, engine = target.engine.name(), "screenshot control enabled");
        // The file is emitted by the capture task once it is ready.
        viewer.create(
            SCREENSHOT,
            DownloadButton::new(SCREENSHOT_FILE).on_press(move |viewer| {
                spawn_capture(Arc::clone(viewer.emitter()), target.clone())?;
                Ok(None)
            }),
        );
    }
    Ok(())
}

fn histogram_figure() -> serde_json::Value {
    let counts: Vec<u32> = (0..16u32).map(|i| (i * 7) % 11 + 1).collect();
    json!({
        "data": [{ "type": "bar", "y": counts }],
        "layout": { "title": { "text": "Histogram" }, "bargap": 0.05 }
    })
}

/// Solid colored tiles, each a different hue.
fn gallery_tiles(offset: usize) -> Vec<PixelArray> {
    (0..GALLERY_SIZE)
        .map(|i| {
            let i = i + offset;
            let color = [(i * 20) % 255, (i * 40) % 255, (i * 60) % 255].map(|c| c as u8);
            let data = color
                .iter()
                .copied()
                .cycle()
                .take(TILE * TILE * 3)
                .collect();
            PixelArray::from_u8([TILE, TILE, 3], data)
        })
        .collect()
}

/// Captures the surface on a blocking worker so the session keeps serving
/// events and snapshots, including the ones the captured page asks for.
fn spawn_capture(emitter: Arc<dyn Emitter>, target: ScreenshotTarget) -> anyhow::Result<()> {
    let runtime = Handle::try_current().context("screenshots need a tokio runtime")?;
    runtime.spawn(async move {
        let url = target.url.clone();
        let limit = target.timeout;
        let work = tokio::task::spawn_blocking(move || capture_surface(&target));
        let failure = match tokio::time::timeout(limit, work).await {
            Ok(Ok(Ok(png))) => {
                info!(%url, bytes = png.len(), "screenshot captured");
                emitter.emit_download_file(&png, SCREENSHOT_FILE);
                return;
            }
            Ok(Ok(Err(error))) => format!("{error:#}"),
            Ok(Err(error)) => format!("screenshot task failed: {error}"),
            Err(_) => format!("screenshot timed out after {}ms", limit.as_millis()),
        };
        warn!(%url, error = %failure, "screenshot failed");
        emitter.emit(ServerEvent::Error(ApiError::new(ErrorCode::Internal, failure)));
    });
    Ok(())
}

fn capture_surface(target: &ScreenshotTarget) -> anyhow::Result<Vec<u8>> {
    with_capture(
        target.engine.as_ref(),
        &target.url,
        Resolution::default(),
        |capture| Ok(capture.capture(None)?),
    )
    .context("screenshot of the rendering surface failed")
}

#[cfg(test)]
#[path = "tests/panel_tests.rs"]
mod tests;
