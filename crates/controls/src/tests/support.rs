use std::sync::{Arc, Mutex};

use shared::protocol::ServerEvent;

use crate::{emitter::Emitter, viewer::Viewer};

#[derive(Default)]
pub(crate) struct RecordingEmitter {
    events: Mutex<Vec<ServerEvent>>,
}

impl RecordingEmitter {
    pub(crate) fn events(&self) -> Vec<ServerEvent> {
        self.events.lock().expect("emitter lock").clone()
    }

    pub(crate) fn clear(&self) {
        self.events.lock().expect("emitter lock").clear();
    }

    pub(crate) fn downloads(&self) -> Vec<(String, Vec<u8>)> {
        self.events()
            .into_iter()
            .filter_map(|event| match &event {
                ServerEvent::DownloadFile { filename, .. } => Some((
                    filename.clone(),
                    event.download_bytes().expect("download").expect("base64"),
                )),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn gallery_updates(&self) -> Vec<(String, Vec<String>)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ServerEvent::UpdateImageGallery { name, images } => Some((name, images)),
                _ => None,
            })
            .collect()
    }
}

impl Emitter for RecordingEmitter {
    fn emit(&self, event: ServerEvent) {
        self.events.lock().expect("emitter lock").push(event);
    }
}

pub(crate) fn recording_viewer() -> (Viewer, Arc<RecordingEmitter>) {
    let recorder = Arc::new(RecordingEmitter::default());
    let viewer = Viewer::new(recorder.clone()).with_viewer_id("client");
    (viewer, recorder)
}
