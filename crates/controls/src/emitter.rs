//! Outbound side of the session: what the core asks the transport to send.

use shared::protocol::{ControlEnvelope, ServerEvent};
use tokio::sync::broadcast;
use tracing::trace;

/// Fire-and-forget sink for outbound events.
///
/// Transports implement [`Emitter::emit`]; the core only calls the named
/// operations, which build the matching [`ServerEvent`].
pub trait Emitter: Send + Sync {
    fn emit(&self, event: ServerEvent);

    fn emit_define_control(&self, control: ControlEnvelope) {
        self.emit(ServerEvent::DefineControl { control });
    }

    fn emit_delete_control(&self, name: &str) {
        self.emit(ServerEvent::DeleteControl {
            name: name.to_string(),
        });
    }

    fn emit_update_label(&self, name: &str, text: &str) {
        self.emit(ServerEvent::UpdateLabel {
            name: name.to_string(),
            text: text.to_string(),
        });
    }

    fn emit_download_file(&self, data: &[u8], filename: &str) {
        self.emit(ServerEvent::download_file(data, filename));
    }

    fn emit_update_image_gallery(&self, name: &str, images: &[String]) {
        self.emit(ServerEvent::UpdateImageGallery {
            name: name.to_string(),
            images: images.to_vec(),
        });
    }
}

/// Fans events out to every subscribed connection of a viewer.
#[derive(Debug, Clone)]
pub struct BroadcastEmitter {
    events: broadcast::Sender<ServerEvent>,
}

impl BroadcastEmitter {
    pub fn new(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity);
        Self { events }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.events.subscribe()
    }
}

impl Emitter for BroadcastEmitter {
    fn emit(&self, event: ServerEvent) {
        // No connected surface is not an error; the snapshot replays state.
        if self.events.send(event).is_err() {
            trace!("no subscribers for outbound event");
        }
    }
}
