use serde_json::Value;
use shared::protocol::ControlSpec;

/// Named slot for a pre-rendered figure. The figure specification is opaque
/// JSON and is never inspected.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotPanel {
    spec: Value,
}

impl PlotPanel {
    pub fn new(spec: Value) -> Self {
        Self { spec }
    }

    pub fn figure(&self) -> &Value {
        &self.spec
    }

    pub(crate) fn spec(&self) -> ControlSpec {
        ControlSpec::PlotPanel {
            spec: self.spec.clone(),
        }
    }
}
