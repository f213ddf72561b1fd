use serde_json::Value;
use shared::{domain::ControlType, protocol::ControlSpec};

use crate::{
    callback::{value_callback, CallbackResult, Invocation, ValueCallback},
    error::DecodeError,
    viewer::Viewer,
};

#[derive(Debug, Clone)]
pub struct Slider {
    min: f64,
    max: f64,
    step: f64,
    initial: f64,
    description: String,
    current: f64,
    on_change: Option<ValueCallback<f64>>,
}

impl Default for Slider {
    fn default() -> Self {
        Self::new(0.0, 1.0, 0.1, 0.5)
    }
}

impl Slider {
    pub fn new(
        min: impl Into<f64>,
        max: impl Into<f64>,
        step: impl Into<f64>,
        initial: impl Into<f64>,
    ) -> Self {
        let initial = initial.into();
        Self {
            min: min.into(),
            max: max.into(),
            step: step.into(),
            initial,
            description: String::new(),
            current: initial,
            on_change: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn on_change<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Viewer, f64) -> CallbackResult + Send + Sync + 'static,
    {
        self.on_change = Some(value_callback(f));
        self
    }

    pub fn value(&self) -> f64 {
        self.current
    }

    pub(crate) fn apply(&mut self, payload: &Value) -> Result<Invocation, DecodeError> {
        let value = decode_number(ControlType::Slider, payload)?;
        self.current = value;
        Ok(Invocation::with_value(self.on_change.as_ref(), value))
    }

    pub(crate) fn spec(&self) -> ControlSpec {
        ControlSpec::Slider {
            min: self.min,
            max: self.max,
            step: self.step,
            initial: self.initial,
            description: self.description.clone(),
        }
    }
}

/// Accepts JSON numbers of any kind and numeric strings; the result is
/// always a finite `f64`.
pub(crate) fn decode_number(kind: ControlType, payload: &Value) -> Result<f64, DecodeError> {
    let value = match payload {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| DecodeError::shape(kind, "a number", payload))?;

    if !value.is_finite() {
        return Err(DecodeError::NonFinite { kind, value });
    }
    Ok(value)
}
