//! Wire types shared by the control core, the transport host and the tools.

pub mod domain;
pub mod error;
pub mod protocol;
