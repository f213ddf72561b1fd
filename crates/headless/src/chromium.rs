//! [`RenderEngine`] backed by a headless Chromium driven over DevTools.
//!
//! One browser process runs from [`RenderEngine::launch`] until
//! [`EngineInstance::shutdown`]. A viewport is a tab of that browser, and
//! captures screenshot the page the tab already loaded.

use std::{
    env,
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{anyhow, Context};
use headless_chrome::{protocol::cdp::Page, Browser, LaunchOptions, Tab};
use tempfile::TempDir;
use tracing::{debug, info};
use url::Url;

use crate::{
    config::CaptureConfig,
    engine::{EngineInstance, RenderEngine, Resolution, Viewport},
    error::LaunchError,
};

pub const BINARY_CANDIDATES: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "headless_shell",
];

const INSTALL_HINT: &str = "Install Chromium (for example `apt install chromium` or \
`brew install --cask chromium`) or point PANEL_CHROMIUM_PATH at an existing \
Chrome/Chromium binary.";

const LAUNCH_HINT: &str = "The Chromium binary was found but could not be started. \
Check that it runs with `--headless --version`; in containers you may need \
PANEL_CHROMIUM_ARGS=\"--no-sandbox\".";

#[derive(Debug, Clone, Default)]
pub struct ChromiumEngine {
    config: CaptureConfig,
}

impl ChromiumEngine {
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }
}

impl RenderEngine for ChromiumEngine {
    fn name(&self) -> &str {
        "chromium"
    }

    fn launch(&self, resolution: Resolution) -> Result<Box<dyn EngineInstance>, LaunchError> {
        let binary = resolve_binary(self.config.binary.as_deref(), env::var_os("PATH"))?;
        let launch_error = |source: anyhow::Error| LaunchError::EngineLaunch {
            remediation: LAUNCH_HINT.to_string(),
            source,
        };
        let profile = tempfile::Builder::new()
            .prefix("panel-chromium-")
            .tempdir()
            .map_err(|error| LaunchError::EngineLaunch {
                remediation: "Make sure the temporary directory is writable.".to_string(),
                source: error.into(),
            })?;
        let options = launch_options(&self.config, &binary, profile.path(), resolution)
            .map_err(launch_error)?;
        let browser = Browser::new(options).map_err(launch_error)?;
        info!(binary = %binary.display(), %resolution, "chromium started");
        Ok(Box::new(ChromiumInstance {
            browser: Some(browser),
            profile: Some(profile),
            config: self.config.clone(),
            window: resolution,
        }))
    }
}

/// Picks the configured binary, or the first candidate found on
/// `search_path`.
pub fn resolve_binary(
    configured: Option<&Path>,
    search_path: Option<OsString>,
) -> Result<PathBuf, LaunchError> {
    if let Some(path) = configured {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(LaunchError::DependencyMissing {
            dependency: format!("Chromium at '{}'", path.display()),
            remediation: format!("The configured binary does not exist. {INSTALL_HINT}"),
        });
    }

    search_path
        .iter()
        .flat_map(env::split_paths)
        .flat_map(|dir| BINARY_CANDIDATES.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| LaunchError::DependencyMissing {
            dependency: "Chromium".to_string(),
            remediation: INSTALL_HINT.to_string(),
        })
}

/// Browser options for one capture session: a private profile, a window of
/// `resolution`, and an idle timeout long enough to outlive the handle.
pub fn launch_options<'a>(
    config: &'a CaptureConfig,
    binary: &Path,
    profile: &Path,
    resolution: Resolution,
) -> anyhow::Result<LaunchOptions<'a>> {
    LaunchOptions::default_builder()
        .headless(true)
        .path(Some(binary.to_path_buf()))
        .user_data_dir(Some(profile.to_path_buf()))
        .window_size(Some((resolution.width, resolution.height)))
        .idle_browser_timeout(config.idle_timeout())
        .args(config.extra_args.iter().map(OsStr::new).collect())
        .build()
        .map_err(|error| anyhow!("invalid chromium launch options: {error}"))
}

struct ChromiumInstance {
    browser: Option<Browser>,
    profile: Option<TempDir>,
    config: CaptureConfig,
    window: Resolution,
}

impl EngineInstance for ChromiumInstance {
    fn open_viewport(&mut self, resolution: Resolution) -> anyhow::Result<Box<dyn Viewport>> {
        let browser = self
            .browser
            .as_ref()
            .context("chromium instance already shut down")?;
        let tab = browser.new_tab().context("failed to open a chromium tab")?;
        tab.set_default_timeout(self.config.navigation_timeout());
        debug!(%resolution, window = %self.window, "chromium tab opened");
        Ok(Box::new(ChromiumViewport {
            tab: Some(tab),
            window: self.window,
        }))
    }

    fn shutdown(&mut self) -> anyhow::Result<()> {
        // Dropping the browser kills its process.
        drop(self.browser.take());
        if let Some(profile) = self.profile.take() {
            let path = profile.path().display().to_string();
            profile
                .close()
                .with_context(|| format!("failed to remove chromium profile '{path}'"))?;
        }
        Ok(())
    }
}

struct ChromiumViewport {
    tab: Option<Arc<Tab>>,
    window: Resolution,
}

impl ChromiumViewport {
    fn tab(&self) -> anyhow::Result<&Arc<Tab>> {
        self.tab.as_ref().context("chromium tab already closed")
    }
}

impl Viewport for ChromiumViewport {
    fn navigate(&mut self, url: &Url) -> anyhow::Result<()> {
        self.tab()?
            .navigate_to(url.as_str())
            .and_then(|tab| tab.wait_until_navigated())
            .with_context(|| format!("chromium failed to load '{url}'"))?;
        debug!(%url, "page loaded");
        Ok(())
    }

    fn capture(&mut self, resolution: Resolution) -> anyhow::Result<Vec<u8>> {
        let clip = (resolution != self.window).then(|| clip_to(resolution));
        self.tab()?
            .capture_screenshot(Page::CaptureScreenshotFormatOption::Png, None, clip, true)
            .context("chromium screenshot failed")
    }

    fn close(&mut self) -> anyhow::Result<()> {
        if let Some(tab) = self.tab.take() {
            tab.close(true).context("failed to close chromium tab")?;
        }
        Ok(())
    }
}

/// Region of the page at the top left corner, at device scale.
fn clip_to(resolution: Resolution) -> Page::Viewport {
    Page::Viewport {
        x: 0.0,
        y: 0.0,
        width: f64::from(resolution.width),
        height: f64::from(resolution.height),
        scale: 1.0,
    }
}

#[cfg(test)]
#[path = "tests/chromium_tests.rs"]
mod tests;
