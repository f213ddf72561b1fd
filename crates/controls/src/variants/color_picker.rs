use serde_json::Value;
use shared::{
    domain::{ControlType, Rgba},
    protocol::ControlSpec,
};

use crate::{
    callback::{value_callback, CallbackResult, Invocation, ValueCallback},
    error::DecodeError,
    variants::slider::decode_number,
    viewer::Viewer,
};

#[derive(Debug, Clone, Default)]
pub struct ColorPicker {
    initial: Rgba,
    current: Rgba,
    on_change: Option<ValueCallback<Rgba>>,
}

impl ColorPicker {
    pub fn new(initial: impl Into<Rgba>) -> Self {
        let initial = initial.into();
        Self {
            initial,
            current: initial,
            on_change: None,
        }
    }

    pub fn on_change<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Viewer, Rgba) -> CallbackResult + Send + Sync + 'static,
    {
        self.on_change = Some(value_callback(f));
        self
    }

    pub fn color(&self) -> Rgba {
        self.current
    }

    pub(crate) fn apply(&mut self, payload: &Value) -> Result<Invocation, DecodeError> {
        let color = decode_rgba(payload)?;
        self.current = color;
        Ok(Invocation::with_value(self.on_change.as_ref(), color))
    }

    pub(crate) fn spec(&self) -> ControlSpec {
        ControlSpec::ColorPicker {
            initial: self.initial,
        }
    }
}

fn decode_rgba(payload: &Value) -> Result<Rgba, DecodeError> {
    let channels = payload
        .as_array()
        .filter(|channels| channels.len() == 4)
        .ok_or_else(|| {
            DecodeError::shape(ControlType::ColorPicker, "an array of 4 numbers", payload)
        })?;

    let mut rgba = [0.0; 4];
    for (channel, (slot, raw)) in rgba.iter_mut().zip(channels).enumerate() {
        let value = decode_number(ControlType::ColorPicker, raw)?;
        if !(0.0..=1.0).contains(&value) {
            return Err(DecodeError::ColorOutOfRange { channel, value });
        }
        *slot = value;
    }
    Ok(Rgba(rgba))
}
