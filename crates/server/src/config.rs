use std::{fs, path::Path};

use headless::CaptureConfig;
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "panel.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub bind_addr: String,
    pub viewer_id: String,
    pub event_capacity: usize,
    /// Where the rendering surface for this viewer is served. Enables the
    /// screenshot control when set.
    pub surface_url: Option<String>,
    pub capture: CaptureConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".into(),
            viewer_id: "client".into(),
            event_capacity: 256,
            surface_url: None,
            capture: CaptureConfig::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    viewer_id: Option<String>,
    event_capacity: Option<usize>,
    surface_url: Option<String>,
    capture: Option<CaptureConfig>,
}

pub fn load_settings(path: &Path) -> Settings {
    load_settings_with(path, |key| std::env::var(key).ok())
}

/// Defaults, then the TOML file at `path` if it parses, then variables read
/// through `var`.
pub fn load_settings_with(path: &Path, var: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.bind_addr {
                    settings.bind_addr = v;
                }
                if let Some(v) = file_cfg.viewer_id {
                    settings.viewer_id = v;
                }
                if let Some(v) = file_cfg.event_capacity {
                    settings.event_capacity = v;
                }
                if let Some(v) = file_cfg.surface_url {
                    settings.surface_url = Some(v);
                }
                if let Some(v) = file_cfg.capture {
                    settings.capture = v;
                }
            }
            Err(error) => warn!(path = %path.display(), %error, "ignoring unparsable config file"),
        }
    }

    if let Some(v) = var("PANEL_BIND") {
        settings.bind_addr = v;
    }
    if let Some(v) = var("APP__BIND_ADDR") {
        settings.bind_addr = v;
    }

    if let Some(v) = var("PANEL_VIEWER_ID") {
        settings.viewer_id = v;
    }

    if let Some(v) = var("PANEL_EVENT_CAPACITY") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.event_capacity = parsed.max(1);
        }
    }

    if let Some(v) = var("PANEL_SURFACE_URL") {
        settings.surface_url = Some(v);
    }

    settings.capture = settings.capture.with_overrides(&var);
    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
