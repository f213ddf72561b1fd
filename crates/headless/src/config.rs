use std::{path::PathBuf, time::Duration};

use serde::Deserialize;

pub const DEFAULT_NAVIGATION_TIMEOUT_MS: u64 = 20_000;
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;

/// Settings for the Chromium engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Explicit browser binary; searched on `PATH` when unset.
    pub binary: Option<PathBuf>,
    pub extra_args: Vec<String>,
    /// Upper bound for page loads and DevTools calls.
    pub navigation_timeout_ms: u64,
    /// The browser is torn down after this long without DevTools traffic.
    pub idle_timeout_secs: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            binary: None,
            extra_args: Vec::new(),
            navigation_timeout_ms: DEFAULT_NAVIGATION_TIMEOUT_MS,
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
        }
    }
}

impl CaptureConfig {
    /// Defaults with process environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `PANEL_CHROMIUM_PATH`, `PANEL_CHROMIUM_ARGS` (whitespace
    /// separated), `PANEL_NAV_TIMEOUT_MS` and `PANEL_BROWSER_IDLE_SECS` as
    /// read through `var`.
    pub fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = var("PANEL_CHROMIUM_PATH").filter(|v| !v.trim().is_empty()) {
            self.binary = Some(PathBuf::from(v.trim()));
        }
        if let Some(v) = var("PANEL_CHROMIUM_ARGS") {
            self.extra_args = v.split_whitespace().map(str::to_string).collect();
        }
        if let Some(parsed) = var("PANEL_NAV_TIMEOUT_MS").and_then(|v| v.trim().parse().ok()) {
            self.navigation_timeout_ms = parsed;
        }
        if let Some(parsed) = var("PANEL_BROWSER_IDLE_SECS").and_then(|v| v.trim().parse().ok()) {
            self.idle_timeout_secs = parsed;
        }
        self
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}
