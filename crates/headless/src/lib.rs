//! Scoped capture of a rendered page through an external rendering engine.
//!
//! [`HeadlessCapture`] walks `Uninitialized -> Launching -> Ready -> Closed`.
//! Whatever was acquired is released on every exit path: explicitly through
//! [`HeadlessCapture::close`] or [`with_capture`], and otherwise on drop.

pub mod capture;
pub mod chromium;
pub mod config;
pub mod engine;
pub mod error;

use std::{fs, path::Path};

use anyhow::Context;
use tracing::info;
use url::Url;

pub use capture::{launch, with_capture, CaptureState, HeadlessCapture};
pub use chromium::ChromiumEngine;
pub use config::CaptureConfig;
pub use engine::{EngineInstance, RenderEngine, Resolution, Viewport};
pub use error::{CaptureError, LaunchError};

/// Renders `url` at `resolution` and writes the PNG to `output`.
pub fn screenshot(
    engine: &dyn RenderEngine,
    url: &Url,
    resolution: Resolution,
    output: &Path,
) -> anyhow::Result<()> {
    let png = with_capture(engine, url, resolution, |capture| {
        Ok(capture.capture(None)?)
    })?;
    fs::write(output, &png)
        .with_context(|| format!("failed to write screenshot to '{}'", output.display()))?;
    info!(path = %output.display(), bytes = png.len(), %url, "screenshot saved");
    Ok(())
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
