use shared::protocol::ControlSpec;

use crate::{
    callback::{action_callback, download_callback, ActionCallback, DownloadCallback, Invocation},
    viewer::Viewer,
};

pub const DEFAULT_DOWNLOAD_FILENAME: &str = "download.bin";

/// Stateless push button. A press carries no value.
#[derive(Debug, Clone, Default)]
pub struct Button {
    on_press: Option<ActionCallback>,
}

impl Button {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_press<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Viewer) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.on_press = Some(action_callback(f));
        self
    }

    pub(crate) fn apply(&self) -> Invocation {
        Invocation::action(self.on_press.as_ref())
    }

    pub(crate) fn spec(&self) -> ControlSpec {
        ControlSpec::Button
    }
}

/// Button whose callback produces a file for the surface to save.
#[derive(Debug, Clone)]
pub struct DownloadButton {
    filename: String,
    on_press: Option<DownloadCallback>,
}

impl Default for DownloadButton {
    fn default() -> Self {
        Self::new(DEFAULT_DOWNLOAD_FILENAME)
    }
}

impl DownloadButton {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            on_press: None,
        }
    }

    /// `Ok(None)` from the callback means nothing is sent for that press.
    pub fn on_press<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Viewer) -> anyhow::Result<Option<Vec<u8>>> + Send + Sync + 'static,
    {
        self.on_press = Some(download_callback(f));
        self
    }

    pub(crate) fn apply(&self) -> Invocation {
        match &self.on_press {
            Some(callback) => Invocation::Download {
                callback: callback.clone(),
                filename: self.filename.clone(),
            },
            None => Invocation::Nothing,
        }
    }

    pub(crate) fn spec(&self) -> ControlSpec {
        ControlSpec::DownloadButton {
            filename: self.filename.clone(),
        }
    }
}
