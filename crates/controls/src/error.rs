use shared::domain::ControlType;
use thiserror::Error;

/// An inbound payload that does not match the shape a control expects.
///
/// Never fatal: the dispatcher logs it and leaves the control untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("{kind} expected {expected}, got {found}")]
    Shape {
        kind: ControlType,
        expected: &'static str,
        found: String,
    },
    #[error("{kind} value is not finite: {value}")]
    NonFinite { kind: ControlType, value: f64 },
    #[error("color channel {channel} out of range [0, 1]: {value}")]
    ColorOutOfRange { channel: usize, value: f64 },
}

impl DecodeError {
    pub(crate) fn shape(
        kind: ControlType,
        expected: &'static str,
        found: &serde_json::Value,
    ) -> Self {
        Self::Shape {
            kind,
            expected,
            found: found.to_string(),
        }
    }
}

/// Invalid input while building a control; nothing is registered.
#[derive(Debug, Error)]
pub enum ConstructionError {
    #[error("unsupported image shape {shape:?}: expected 1, 3 or 4 channels")]
    UnsupportedChannels { shape: Vec<usize> },
    #[error("image buffer holds {actual} values but shape {shape:?} needs {expected}")]
    BufferMismatch {
        shape: Vec<usize>,
        expected: usize,
        actual: usize,
    },
    #[error("failed to encode image {index}: {source}")]
    Encode {
        index: usize,
        #[source]
        source: image::ImageError,
    },
}

/// Failure of a local operation addressed to a control by name.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("control '{0}' not found")]
    NotFound(String),
    #[error("control '{name}' is a {actual}, expected {expected}")]
    WrongKind {
        name: String,
        expected: ControlType,
        actual: ControlType,
    },
    #[error("group '{0}' cannot contain itself")]
    SelfMembership(String),
    #[error(transparent)]
    Construction(#[from] ConstructionError),
    #[error("callback for control '{name}' failed: {source}")]
    Callback {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Error escaping the dispatcher. Only application callback failures get
/// here; decode failures and unknown controls are reported as outcomes.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("callback for control '{control}' failed: {source}")]
    Callback {
        control: String,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session dispatch task is no longer running")]
    Closed,
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
