use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use headless::{screenshot, CaptureConfig, ChromiumEngine, Resolution};
use shared::domain::ViewerId;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Renders a viewer's surface in headless Chromium and saves it as PNG.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "http://localhost:8080")]
    server_url: String,
    #[arg(long, default_value = "client")]
    viewer_id: String,
    /// Defaults to a timestamped file in the current directory.
    #[arg(long)]
    output: Option<PathBuf>,
    #[arg(long, default_value_t = 1280)]
    width: u32,
    #[arg(long, default_value_t = 720)]
    height: u32,
    /// Chromium binary; overrides PANEL_CHROMIUM_PATH.
    #[arg(long)]
    chromium: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();

    let url = viewer_url(&args.server_url, &ViewerId::new(args.viewer_id.as_str()))?;
    let output = args.output.unwrap_or_else(default_output);
    let mut config = CaptureConfig::from_env();
    if let Some(binary) = args.chromium {
        config.binary = Some(binary);
    }

    let engine = ChromiumEngine::new(config);
    screenshot(
        &engine,
        &url,
        Resolution::new(args.width, args.height),
        &output,
    )?;
    println!("{}", output.display());
    Ok(())
}

fn viewer_url(server_url: &str, viewer_id: &ViewerId) -> Result<Url> {
    let mut url =
        Url::parse(server_url).with_context(|| format!("invalid server url '{server_url}'"))?;
    url.query_pairs_mut()
        .append_pair("viewer_id", viewer_id.as_str());
    Ok(url)
}

fn default_output() -> PathBuf {
    PathBuf::from(format!(
        "screenshot_{}.png",
        Local::now().format("%Y%m%d_%H%M%S")
    ))
}
