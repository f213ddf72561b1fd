use tracing::{debug, info, warn};
use url::Url;

use crate::{
    engine::{EngineInstance, RenderEngine, Resolution, Viewport},
    error::{CaptureError, LaunchError},
};

pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Uninitialized,
    Launching,
    Ready,
    Closed,
}

/// A page loaded in an isolated engine viewport, ready to be captured.
///
/// Dropping the handle closes it.
pub struct HeadlessCapture {
    state: CaptureState,
    url: Url,
    resolution: Resolution,
    instance: Option<Box<dyn EngineInstance>>,
    viewport: Option<Box<dyn Viewport>>,
}

impl std::fmt::Debug for HeadlessCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessCapture")
            .field("state", &self.state)
            .field("url", &self.url.as_str())
            .field("resolution", &self.resolution)
            .finish_non_exhaustive()
    }
}

impl HeadlessCapture {
    /// Starts the engine, opens a viewport of `resolution` and loads `url`.
    pub fn launch(
        engine: &dyn RenderEngine,
        url: &Url,
        resolution: Resolution,
    ) -> Result<Self, LaunchError> {
        let mut capture = Self {
            state: CaptureState::Uninitialized,
            url: url.clone(),
            resolution,
            instance: None,
            viewport: None,
        };

        // Early returns drop `capture`, which releases whatever is stored in it.
        capture.state = CaptureState::Launching;
        info!(engine = engine.name(), %url, %resolution, "launching headless capture");
        let mut instance = engine.launch(resolution)?;
        let opened = instance.open_viewport(resolution);
        capture.instance = Some(instance);

        let mut viewport = opened.map_err(|source| LaunchError::Viewport {
            width: resolution.width,
            height: resolution.height,
            source,
        })?;
        let navigated = viewport.navigate(url);
        capture.viewport = Some(viewport);
        navigated.map_err(|source| LaunchError::Navigation {
            url: url.to_string(),
            source,
        })?;

        capture.state = CaptureState::Ready;
        info!(%url, "headless capture ready");
        Ok(capture)
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Encoded PNG of the loaded page, at `resolution` or the viewport size.
    pub fn capture(&mut self, resolution: Option<Resolution>) -> Result<Vec<u8>, CaptureError> {
        if self.state != CaptureState::Ready {
            return Err(CaptureError::Closed);
        }
        let Some(viewport) = self.viewport.as_mut() else {
            return Err(CaptureError::Closed);
        };
        let resolution = resolution.unwrap_or(self.resolution);
        let png = viewport.capture(resolution).map_err(CaptureError::Engine)?;
        if !png.starts_with(&PNG_SIGNATURE) {
            return Err(CaptureError::NotPng { len: png.len() });
        }
        debug!(url = %self.url, %resolution, bytes = png.len(), "captured page");
        Ok(png)
    }

    /// Releases the viewport, then the engine. Safe to call repeatedly.
    /// Release failures are logged; the second release is attempted even
    /// when the first fails.
    pub fn close(&mut self) {
        if self.state == CaptureState::Closed {
            return;
        }
        if let Some(mut viewport) = self.viewport.take() {
            if let Err(error) = viewport.close() {
                warn!(url = %self.url, error = %format!("{error:#}"), "failed to close viewport");
            }
        }
        if let Some(mut instance) = self.instance.take() {
            if let Err(error) = instance.shutdown() {
                warn!(url = %self.url, error = %format!("{error:#}"), "failed to shut down rendering engine");
            }
        }
        self.state = CaptureState::Closed;
        info!(url = %self.url, "headless capture closed");
    }
}

impl Drop for HeadlessCapture {
    fn drop(&mut self) {
        self.close();
    }
}

/// [`HeadlessCapture::launch`] at the default 1280x720 viewport.
pub fn launch(engine: &dyn RenderEngine, url: &Url) -> Result<HeadlessCapture, LaunchError> {
    HeadlessCapture::launch(engine, url, Resolution::default())
}

/// Runs `f` against a freshly launched capture and closes it afterwards,
/// whether `f` succeeds, fails or panics.
pub fn with_capture<T, F>(
    engine: &dyn RenderEngine,
    url: &Url,
    resolution: Resolution,
    f: F,
) -> anyhow::Result<T>
where
    F: FnOnce(&mut HeadlessCapture) -> anyhow::Result<T>,
{
    let mut capture = HeadlessCapture::launch(engine, url, resolution)?;
    let result = f(&mut capture);
    capture.close();
    result
}

#[cfg(test)]
#[path = "tests/capture_tests.rs"]
mod tests;
