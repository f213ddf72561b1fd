//! Interactive controls synchronized with a remote rendering surface.
//!
//! A [`Viewer`] owns a name-keyed [`Registry`] of controls and reports every
//! change through an [`Emitter`]. Inbound events from the surface go through
//! [`dispatch`], which decodes the payload into the addressed control,
//! commits it, and runs the control's callback.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use controls::{BroadcastEmitter, Slider, Viewer};
//! use serde_json::json;
//!
//! let emitter = Arc::new(BroadcastEmitter::new(64));
//! let mut viewer = Viewer::new(emitter).with_viewer_id("client");
//! viewer.create(
//!     "Opacity",
//!     Slider::new(0.0, 1.0, 0.01, 1.0).on_change(|_viewer, value| {
//!         println!("opacity set to {value}");
//!         Ok(None)
//!     }),
//! );
//! viewer.handle_event("Opacity", json!(0.25)).unwrap();
//! ```

pub mod callback;
pub mod control;
pub mod dispatch;
pub mod emitter;
pub mod error;
pub mod images;
pub mod registry;
pub mod session;
pub mod variants;
pub mod viewer;

pub use callback::CallbackResult;
pub use control::{Control, ControlKind, ControlSerial, ControlValue};
pub use dispatch::{dispatch, DispatchOutcome};
pub use emitter::{BroadcastEmitter, Emitter};
pub use error::{ConstructionError, ControlError, DecodeError, DispatchError, SessionError};
pub use images::{ImageSource, PixelArray, PixelData};
pub use registry::Registry;
pub use session::SessionHandle;
pub use variants::{
    Button, Checkbox, ColorPicker, DownloadButton, Dropdown, Group, ImageGallery, Label,
    PlotPanel, Slider,
};
pub use viewer::Viewer;

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
