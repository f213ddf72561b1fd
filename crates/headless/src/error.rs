use thiserror::Error;

/// Failure to bring a capture to `Ready`. Anything acquired before the
/// failure has already been released.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("{dependency} is required for headless capture.\n{remediation}")]
    DependencyMissing {
        dependency: String,
        remediation: String,
    },
    #[error("failed to launch the rendering engine: {source}\n{remediation}")]
    EngineLaunch {
        remediation: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("failed to open a {width}x{height} viewport: {source}")]
    Viewport {
        width: u32,
        height: u32,
        #[source]
        source: anyhow::Error,
    },
    #[error("failed to load {url}: {source}")]
    Navigation {
        url: String,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capture is closed")]
    Closed,
    #[error("rendering engine failed to capture: {0}")]
    Engine(#[source] anyhow::Error),
    #[error("engine returned {len} bytes that are not a PNG image")]
    NotPng { len: usize },
}
