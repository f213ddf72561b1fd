//! Seams between the capture state machine and a concrete engine.

use std::fmt;

use url::Url;

pub const DEFAULT_WIDTH: u32 = 1280;
pub const DEFAULT_HEIGHT: u32 = 720;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Something that can start a rendering engine process or library.
pub trait RenderEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Starts the engine with a window of `resolution`. The instance stays
    /// alive until [`EngineInstance::shutdown`].
    fn launch(
        &self,
        resolution: Resolution,
    ) -> Result<Box<dyn EngineInstance>, crate::error::LaunchError>;
}

/// A running engine. Owns every viewport it opens.
pub trait EngineInstance: Send {
    fn open_viewport(&mut self, resolution: Resolution) -> anyhow::Result<Box<dyn Viewport>>;

    fn shutdown(&mut self) -> anyhow::Result<()>;
}

/// An isolated page context of a fixed size.
pub trait Viewport: Send {
    fn navigate(&mut self, url: &Url) -> anyhow::Result<()>;

    /// Encoded PNG of the page loaded by the last [`Viewport::navigate`],
    /// without loading it again.
    fn capture(&mut self, resolution: Resolution) -> anyhow::Result<Vec<u8>>;

    fn close(&mut self) -> anyhow::Result<()>;
}
