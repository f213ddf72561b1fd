use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use axum::{
    extract::{ws::rejection::WebSocketUpgradeRejection, Query, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use clap::Parser;
use controls::{BroadcastEmitter, SessionHandle, Viewer};
use headless::ChromiumEngine;
use serde::Deserialize;
use shared::{
    domain::ViewerId,
    error::{ApiError, ErrorCode},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

mod app_state;
mod config;
mod panel;
mod transport;

use app_state::AppState;
use config::{load_settings, DEFAULT_CONFIG_PATH};
use panel::{install_demo_panel, ScreenshotTarget};

const SESSION_QUEUE: usize = 256;

#[derive(Parser, Debug)]
#[command(about = "Serves a demo control panel to rendering surfaces over websockets")]
struct Cli {
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[arg(long)]
    bind: Option<String>,
    #[arg(long)]
    viewer_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WsQuery {
    viewer_id: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(&cli.config);
    if let Some(bind) = cli.bind {
        settings.bind_addr = bind;
    }
    if let Some(viewer_id) = cli.viewer_id {
        settings.viewer_id = viewer_id;
    }

    let screenshot = match settings.surface_url.as_deref().map(Url::parse).transpose() {
        Ok(url) => url.map(|url| {
            ScreenshotTarget::new(url, Arc::new(ChromiumEngine::new(settings.capture.clone())))
        }),
        Err(error) => {
            warn!(%error, "invalid surface_url, screenshot control disabled");
            None
        }
    };

    let emitter = BroadcastEmitter::new(settings.event_capacity);
    let mut viewer =
        Viewer::new(Arc::new(emitter.clone())).with_viewer_id(settings.viewer_id.as_str());
    install_demo_panel(&mut viewer, screenshot).context("failed to build demo panel")?;
    let (session, _session_task) = SessionHandle::spawn(viewer, SESSION_QUEUE);

    let state = AppState {
        viewer_id: ViewerId::new(settings.viewer_id.clone()),
        session,
        emitter,
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.bind_addr))?;
    info!(%addr, viewer_id = %settings.viewer_id, "panel server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/ws", get(ws_handler))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn ws_handler(
    State(state): State<Arc<AppState>>,
    Query(q): Query<WsQuery>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    if q.viewer_id != state.viewer_id.as_str() {
        warn!(requested = %q.viewer_id, "connection for unknown viewer");
        return (
            StatusCode::NOT_FOUND,
            Json(ApiError::new(
                ErrorCode::UnknownViewer,
                format!("no viewer named '{}'", q.viewer_id),
            )),
        )
            .into_response();
    }
    match ws {
        Ok(ws) => ws.on_upgrade(move |socket| transport::ws_connection(state, socket)),
        Err(rejection) => rejection.into_response(),
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
