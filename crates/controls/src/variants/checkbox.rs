use serde_json::Value;
use shared::{domain::ControlType, protocol::ControlSpec};

use crate::{
    callback::{value_callback, CallbackResult, Invocation, ValueCallback},
    error::DecodeError,
    viewer::Viewer,
};

#[derive(Debug, Clone, Default)]
pub struct Checkbox {
    initial: bool,
    description: String,
    checked: bool,
    on_change: Option<ValueCallback<bool>>,
}

impl Checkbox {
    pub fn new(initial: bool) -> Self {
        Self {
            initial,
            checked: initial,
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn on_change<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Viewer, bool) -> CallbackResult + Send + Sync + 'static,
    {
        self.on_change = Some(value_callback(f));
        self
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub(crate) fn apply(&mut self, payload: &Value) -> Result<Invocation, DecodeError> {
        let checked = payload
            .as_bool()
            .ok_or_else(|| DecodeError::shape(ControlType::Checkbox, "a boolean", payload))?;
        self.checked = checked;
        Ok(Invocation::with_value(self.on_change.as_ref(), checked))
    }

    pub(crate) fn spec(&self) -> ControlSpec {
        ControlSpec::Checkbox {
            initial: self.initial,
            description: self.description.clone(),
        }
    }
}
