use shared::protocol::ControlSpec;

use crate::{
    callback::{action_callback, ActionCallback},
    viewer::Viewer,
};

/// Read-only text driven by the application, never by the surface.
#[derive(Debug, Clone, Default)]
pub struct Label {
    text: String,
    on_update: Option<ActionCallback>,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            on_update: None,
        }
    }

    /// Runs after every [`Viewer::update_label`] on this label.
    pub fn on_update<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Viewer) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.on_update = Some(action_callback(f));
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn set_text(&mut self, text: String) -> Option<ActionCallback> {
        self.text = text;
        self.on_update.clone()
    }

    pub(crate) fn spec(&self) -> ControlSpec {
        ControlSpec::Label {
            text: self.text.clone(),
        }
    }
}
