//! Per-session dispatch task.
//!
//! The [`Viewer`] is moved into one task and only reached through its
//! command queue. Events from any number of connections are applied one at
//! a time in arrival order, and a callback finishes before the next queued
//! command starts.

use shared::protocol::InboundEvent;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{error, info};

use crate::{
    dispatch::{dispatch, DispatchOutcome},
    error::{DispatchError, SessionError},
    viewer::Viewer,
};

type ViewerTask = Box<dyn FnOnce(&mut Viewer) + Send>;

enum SessionCommand {
    Dispatch {
        event: InboundEvent,
        reply: Option<oneshot::Sender<Result<DispatchOutcome, DispatchError>>>,
    },
    Run(ViewerTask),
}

#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    /// Moves `viewer` into a new dispatch task. The task hands the viewer
    /// back once every handle has been dropped.
    pub fn spawn(viewer: Viewer, capacity: usize) -> (Self, JoinHandle<Viewer>) {
        let (commands, rx) = mpsc::channel(capacity.max(1));
        let task = tokio::spawn(run_session(viewer, rx));
        (Self { commands }, task)
    }

    /// Queues an event without waiting for it. Callback failures are
    /// logged by the session.
    pub async fn submit(&self, event: InboundEvent) -> Result<(), SessionError> {
        self.commands
            .send(SessionCommand::Dispatch { event, reply: None })
            .await
            .map_err(|_| SessionError::Closed)
    }

    /// Queues an event and waits for its outcome, callback errors included.
    pub async fn dispatch(&self, event: InboundEvent) -> Result<DispatchOutcome, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(SessionCommand::Dispatch {
                event,
                reply: Some(reply),
            })
            .await
            .map_err(|_| SessionError::Closed)?;
        Ok(rx.await.map_err(|_| SessionError::Closed)??)
    }

    /// Runs `f` on the session task, in order with queued events.
    pub async fn with_viewer<F, R>(&self, f: F) -> Result<R, SessionError>
    where
        F: FnOnce(&mut Viewer) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply, rx) = oneshot::channel();
        let task: ViewerTask = Box::new(move |viewer| {
            let _ = reply.send(f(viewer));
        });
        self.commands
            .send(SessionCommand::Run(task))
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)
    }
}

async fn run_session(mut viewer: Viewer, mut commands: mpsc::Receiver<SessionCommand>) -> Viewer {
    info!(viewer_id = ?viewer.viewer_id(), "session dispatch task started");
    while let Some(command) = commands.recv().await {
        match command {
            SessionCommand::Dispatch {
                event,
                reply: Some(reply),
            } => {
                let _ = reply.send(dispatch(&mut viewer, event));
            }
            SessionCommand::Dispatch { event, reply: None } => {
                if let Err(error) = dispatch(&mut viewer, event) {
                    error!(%error, "application callback failed");
                }
            }
            SessionCommand::Run(task) => task(&mut viewer),
        }
    }
    info!(viewer_id = ?viewer.viewer_id(), "session dispatch task stopped");
    viewer
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
