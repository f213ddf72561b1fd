use controls::{BroadcastEmitter, SessionHandle};
use shared::domain::ViewerId;

/// Everything a connection needs to reach the viewer it serves.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) viewer_id: ViewerId,
    pub(crate) session: SessionHandle,
    pub(crate) emitter: BroadcastEmitter,
}
