use std::{fmt, sync::Arc};

use serde_json::Value;
use shared::{
    domain::{ControlType, ViewerId},
    protocol::{ControlEnvelope, InboundEvent},
};
use tracing::debug;

use crate::{
    control::{Control, ControlKind, ControlValue},
    dispatch::{dispatch, DispatchOutcome},
    emitter::Emitter,
    error::{ControlError, DispatchError},
    images::ImageSource,
    registry::Registry,
    variants::Group,
};

/// One session: the control registry plus the transport it reports to.
///
/// Every mutation goes through `&mut Viewer`, so a session is driven by a
/// single owner at a time (see [`crate::session::SessionHandle`]).
pub struct Viewer {
    viewer_id: Option<ViewerId>,
    registry: Registry,
    emitter: Arc<dyn Emitter>,
}

impl fmt::Debug for Viewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Viewer")
            .field("viewer_id", &self.viewer_id)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl Viewer {
    pub fn new(emitter: Arc<dyn Emitter>) -> Self {
        Self {
            viewer_id: None,
            registry: Registry::new(),
            emitter,
        }
    }

    pub fn with_viewer_id(mut self, viewer_id: impl Into<ViewerId>) -> Self {
        self.viewer_id = Some(viewer_id.into());
        self
    }

    pub fn viewer_id(&self) -> Option<&ViewerId> {
        self.viewer_id.as_ref()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn emitter(&self) -> &Arc<dyn Emitter> {
        &self.emitter
    }

    pub(crate) fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Registers a control and announces it. An existing control with the
    /// same name is replaced.
    pub fn create(&mut self, name: impl Into<String>, kind: impl Into<ControlKind>) {
        self.register(Control::new(name, kind));
    }

    /// Like [`Viewer::create`], with the control placed in `group`. A control
    /// may not share its group's name.
    pub fn create_in_group(
        &mut self,
        group: &str,
        name: impl Into<String>,
        kind: impl Into<ControlKind>,
    ) -> Result<(), ControlError> {
        let mut control = Control::new(name, kind);
        if control.name() == group {
            return Err(ControlError::SelfMembership(group.to_string()));
        }
        self.group_mut(group)?.add_member(control.name());
        control.set_group(group);
        self.register(control);
        self.announce(group);
        Ok(())
    }

    /// Puts an existing control into `group` and re-announces both.
    pub fn add_to_group(&mut self, group: &str, control: &str) -> Result<(), ControlError> {
        if control == group {
            return Err(ControlError::SelfMembership(group.to_string()));
        }
        if !self.registry.contains(control) {
            return Err(ControlError::NotFound(control.to_string()));
        }
        self.group_mut(group)?.add_member(control);
        if let Some(member) = self.registry.get_mut(control) {
            member.set_group(group);
        }
        self.announce(control);
        self.announce(group);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Control> {
        self.registry.get(name)
    }

    pub fn value(&self, name: &str) -> Option<ControlValue> {
        self.registry.get(name).map(Control::value)
    }

    pub fn serialize(&self, name: &str) -> Option<ControlEnvelope> {
        self.registry
            .get(name)
            .map(|control| control.serialize(self.viewer_id.as_ref()))
    }

    /// Removes `name` and always tells the surface to drop it, even when it
    /// was already gone. Group memberships are left as they are.
    pub fn delete(&mut self, name: &str) -> Option<Control> {
        let removed = self.registry.remove(name);
        if removed.is_none() {
            debug!(control = name, "delete for absent control");
        }
        self.emitter.emit_delete_control(name);
        removed
    }

    /// Replaces a label's text, runs its callback, and always emits the
    /// update, even when the text is unchanged or the callback fails.
    pub fn update_label(&mut self, name: &str, text: impl Into<String>) -> Result<(), ControlError> {
        let text = text.into();
        let control = self
            .registry
            .get_mut(name)
            .ok_or_else(|| ControlError::NotFound(name.to_string()))?;
        let callback = match control.kind_mut() {
            ControlKind::Label(label) => label.set_text(text.clone()),
            other => return Err(wrong_kind(name, ControlType::Label, other)),
        };

        let result = match callback {
            Some(callback) => (callback.0)(self),
            None => Ok(()),
        };
        self.emitter.emit_update_label(name, &text);
        result.map_err(|source| ControlError::Callback {
            name: name.to_string(),
            source,
        })
    }

    /// Replaces a gallery's images, clears its selection and page, and
    /// emits the new images. Invalid input leaves the gallery unchanged.
    pub fn update_gallery<I>(&mut self, name: &str, images: I) -> Result<(), ControlError>
    where
        I: IntoIterator,
        I::Item: Into<ImageSource>,
    {
        let control = self
            .registry
            .get_mut(name)
            .ok_or_else(|| ControlError::NotFound(name.to_string()))?;
        let actual = control.control_type();
        let ControlKind::ImageGallery(gallery) = control.kind_mut() else {
            return Err(ControlError::WrongKind {
                name: name.to_string(),
                expected: ControlType::ImageGallery,
                actual,
            });
        };
        let encoded = gallery.replace_images(images)?;
        self.emitter.emit_update_image_gallery(name, encoded);
        Ok(())
    }

    /// Routes one inbound event; see [`dispatch`].
    pub fn handle_event(
        &mut self,
        name: impl Into<String>,
        payload: Value,
    ) -> Result<DispatchOutcome, DispatchError> {
        dispatch(self, InboundEvent::new(name, payload))
    }

    /// Every control in creation order, groups ahead of their members.
    pub fn snapshot(&self) -> Vec<ControlEnvelope> {
        let viewer_id = self.viewer_id.as_ref();
        let (groups, controls): (Vec<&Control>, Vec<&Control>) = self
            .registry
            .ordered()
            .into_iter()
            .partition(|control| control.control_type() == ControlType::Group);
        groups
            .into_iter()
            .chain(controls)
            .map(|control| control.serialize(viewer_id))
            .collect()
    }

    fn register(&mut self, control: Control) {
        let envelope = control.serialize(self.viewer_id.as_ref());
        if let Some(previous) = self.registry.insert(control) {
            debug!(
                control = %envelope.name,
                previous = %previous.control_type(),
                "control redefined, previous definition replaced"
            );
        }
        self.emitter.emit_define_control(envelope);
    }

    fn announce(&self, name: &str) {
        if let Some(envelope) = self.serialize(name) {
            self.emitter.emit_define_control(envelope);
        }
    }

    fn group_mut(&mut self, name: &str) -> Result<&mut Group, ControlError> {
        let control = self
            .registry
            .get_mut(name)
            .ok_or_else(|| ControlError::NotFound(name.to_string()))?;
        match control.kind_mut() {
            ControlKind::Group(group) => Ok(group),
            other => Err(wrong_kind(name, ControlType::Group, other)),
        }
    }
}

fn wrong_kind(name: &str, expected: ControlType, actual: &ControlKind) -> ControlError {
    ControlError::WrongKind {
        name: name.to_string(),
        expected,
        actual: actual.control_type(),
    }
}

#[cfg(test)]
#[path = "tests/viewer_tests.rs"]
mod tests;
