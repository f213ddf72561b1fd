//! Websocket bridge between rendering surfaces and the viewer session.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{parse_client_frame, ClientRequest, ControlEnvelope, ServerEvent},
};
use tokio::sync::{broadcast::error::RecvError, mpsc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::app_state::AppState;
use controls::{DispatchOutcome, SessionError};

const DIRECT_QUEUE: usize = 32;

pub(crate) async fn ws_connection(state: Arc<AppState>, socket: WebSocket) {
    let connection_id = Uuid::new_v4();
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before taking the snapshot so nothing falls between them.
    let mut events_rx = state.emitter.subscribe();
    let snapshot = match snapshot_events(&state).await {
        Ok(events) => events,
        Err(error) => vec![session_error(&error)],
    };
    info!(
        %connection_id,
        viewer_id = %state.viewer_id,
        controls = snapshot.len(),
        "surface connected"
    );

    let (direct_tx, mut direct_rx) = mpsc::channel::<ServerEvent>(DIRECT_QUEUE);
    let task_state = Arc::clone(&state);
    let send_task = tokio::spawn(async move {
        let mut outgoing = snapshot;
        loop {
            for event in &outgoing {
                if send_event(&mut sender, event).await.is_err() {
                    return;
                }
            }
            outgoing = tokio::select! {
                direct = direct_rx.recv() => match direct {
                    Some(event) => vec![event],
                    None => break,
                },
                broadcast = events_rx.recv() => {
                    match forward_broadcast(&task_state, broadcast, connection_id).await {
                        Some(events) => events,
                        None => break,
                    }
                }
            };
        }
    });

    while let Some(Ok(message)) = receiver.next().await {
        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };
        for reply in handle_frame(&state, &text).await {
            if direct_tx.send(reply).await.is_err() {
                break;
            }
        }
    }

    send_task.abort();
    info!(%connection_id, "surface disconnected");
}

async fn send_event<S>(sender: &mut S, event: &ServerEvent) -> Result<(), ()>
where
    S: futures::Sink<Message> + Unpin,
{
    let text = match serde_json::to_string(event) {
        Ok(v) => v,
        Err(error) => {
            warn!(%error, "failed to serialize server event");
            return Ok(());
        }
    };
    sender.send(Message::Text(text)).await.map_err(|_| ())
}

/// Applies one client frame and returns what goes back to that client only.
pub(crate) async fn handle_frame(state: &AppState, text: &str) -> Vec<ServerEvent> {
    let request = match parse_client_frame(text) {
        Ok(request) => request,
        Err(error) => {
            warn!(%error, "rejecting client frame");
            return vec![ServerEvent::Error(ApiError::new(
                ErrorCode::MalformedFrame,
                error.to_string(),
            ))];
        }
    };

    match request {
        ClientRequest::UiEvent(event) => {
            let control = event.control_name.clone();
            match state.session.dispatch(event).await {
                Ok(DispatchOutcome::Applied { forwarded }) => {
                    debug!(%control, ?forwarded, "event applied");
                    Vec::new()
                }
                Ok(DispatchOutcome::UnknownControl | DispatchOutcome::Malformed(_)) => Vec::new(),
                Err(error) => vec![session_error(&error)],
            }
        }
        ClientRequest::RequestSnapshot => match snapshot_events(state).await {
            Ok(events) => events,
            Err(error) => vec![session_error(&error)],
        },
    }
}

/// What one broadcast receive turns into on the wire. A receiver that fell
/// behind gets the whole snapshot in place of the events it missed.
pub(crate) async fn forward_broadcast(
    state: &AppState,
    received: Result<ServerEvent, RecvError>,
    connection_id: Uuid,
) -> Option<Vec<ServerEvent>> {
    match received {
        Ok(event) => Some(vec![event]),
        Err(RecvError::Lagged(skipped)) => {
            warn!(%connection_id, skipped, "surface fell behind, resending snapshot");
            Some(
                snapshot_events(state)
                    .await
                    .unwrap_or_else(|error| vec![session_error(&error)]),
            )
        }
        Err(RecvError::Closed) => None,
    }
}

async fn snapshot_events(state: &AppState) -> Result<Vec<ServerEvent>, SessionError> {
    let snapshot: Vec<ControlEnvelope> = state.session.with_viewer(|viewer| viewer.snapshot()).await?;
    Ok(snapshot
        .into_iter()
        .map(|control| ServerEvent::DefineControl { control })
        .collect())
}

fn session_error(error: &SessionError) -> ServerEvent {
    let code = match error {
        SessionError::Closed => ErrorCode::SessionClosed,
        SessionError::Dispatch(_) => ErrorCode::Callback,
    };
    ServerEvent::Error(ApiError::new(code, error.to_string()))
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
