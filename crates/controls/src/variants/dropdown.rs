use serde_json::Value;
use shared::{domain::ControlType, protocol::ControlSpec};

use crate::{
    callback::{value_callback, CallbackResult, Invocation, ValueCallback},
    error::DecodeError,
    viewer::Viewer,
};

#[derive(Debug, Clone)]
pub struct Dropdown {
    options: Vec<String>,
    initial: String,
    description: String,
    current: String,
    on_change: Option<ValueCallback<String>>,
}

impl Dropdown {
    /// Starts on the first option, or on an empty selection when there are
    /// no options.
    pub fn new<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options: Vec<String> = options.into_iter().map(Into::into).collect();
        let initial = options.first().cloned().unwrap_or_default();
        Self {
            options,
            current: initial.clone(),
            initial,
            description: String::new(),
            on_change: None,
        }
    }

    pub fn initial(mut self, initial: impl Into<String>) -> Self {
        self.initial = initial.into();
        self.current = self.initial.clone();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn on_change<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Viewer, String) -> CallbackResult + Send + Sync + 'static,
    {
        self.on_change = Some(value_callback(f));
        self
    }

    pub fn selected(&self) -> &str {
        &self.current
    }

    // Selections outside `options` are accepted: option sets may change on
    // the surface before the application learns about it.
    pub(crate) fn apply(&mut self, payload: &Value) -> Result<Invocation, DecodeError> {
        let selection = payload
            .as_str()
            .ok_or_else(|| DecodeError::shape(ControlType::Dropdown, "a string", payload))?
            .to_string();
        self.current = selection.clone();
        Ok(Invocation::with_value(self.on_change.as_ref(), selection))
    }

    pub(crate) fn spec(&self) -> ControlSpec {
        ControlSpec::Dropdown {
            options: self.options.clone(),
            initial: self.initial.clone(),
            description: self.description.clone(),
        }
    }
}
