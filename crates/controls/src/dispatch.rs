//! Routing of inbound events to controls.

use serde_json::Value;
use shared::protocol::InboundEvent;
use tracing::{debug, warn};

use crate::{
    callback::{CallbackResult, Invocation},
    error::{DecodeError, DispatchError},
    viewer::Viewer,
};

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The payload was committed; `forwarded` is what the callback returned.
    Applied { forwarded: Option<Value> },
    /// No control under that name. The event was dropped.
    UnknownControl,
    /// The payload did not decode. The event was dropped and the control
    /// kept its previous state.
    Malformed(DecodeError),
}

/// Decodes `event` into its control and runs the bound callback.
///
/// The decoded value is committed before the callback runs, so a failing
/// callback never rolls back control state. Callback errors are the only
/// errors returned.
pub fn dispatch(viewer: &mut Viewer, event: InboundEvent) -> Result<DispatchOutcome, DispatchError> {
    let InboundEvent {
        control_name,
        payload,
    } = event;

    let Some(control) = viewer.registry_mut().get_mut(&control_name) else {
        debug!(control = %control_name, "dropping event for unknown control");
        return Ok(DispatchOutcome::UnknownControl);
    };

    let kind = control.control_type();
    let invocation = match control.apply(&payload) {
        Ok(invocation) => invocation,
        Err(error) => {
            warn!(control = %control_name, %kind, %error, "dropping malformed event");
            return Ok(DispatchOutcome::Malformed(error));
        }
    };

    let forwarded = run(viewer, invocation).map_err(|source| DispatchError::Callback {
        control: control_name,
        source,
    })?;
    Ok(DispatchOutcome::Applied { forwarded })
}

fn run(viewer: &mut Viewer, invocation: Invocation) -> CallbackResult {
    match invocation {
        Invocation::Nothing => Ok(None),
        Invocation::Call(call) => call(viewer),
        Invocation::Download { callback, filename } => {
            match (callback.0)(viewer)? {
                Some(data) if !data.is_empty() => {
                    viewer.emitter().emit_download_file(&data, &filename);
                }
                _ => debug!(%filename, "download callback produced no payload"),
            }
            Ok(None)
        }
    }
}

#[cfg(test)]
#[path = "tests/dispatch_tests.rs"]
mod tests;
