use serde_json::Value;
use shared::{
    domain::{ControlType, Rgba, ViewerId},
    protocol::{ControlEnvelope, ControlSpec},
};

use crate::{
    callback::Invocation,
    error::DecodeError,
    variants::{
        Button, Checkbox, ColorPicker, DownloadButton, Dropdown, Group, ImageGallery, Label,
        PlotPanel, Slider,
    },
};

/// Registry-assigned creation number, unique within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ControlSerial(pub u64);

/// The closed set of control variants.
#[derive(Debug, Clone)]
pub enum ControlKind {
    Slider(Slider),
    Button(Button),
    Label(Label),
    Checkbox(Checkbox),
    Dropdown(Dropdown),
    DownloadButton(DownloadButton),
    ColorPicker(ColorPicker),
    PlotPanel(PlotPanel),
    ImageGallery(ImageGallery),
    Group(Group),
}

macro_rules! kind_from {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for ControlKind {
                fn from(value: $variant) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

kind_from!(
    Slider,
    Button,
    Label,
    Checkbox,
    Dropdown,
    DownloadButton,
    ColorPicker,
    PlotPanel,
    ImageGallery,
    Group,
);

impl ControlKind {
    pub fn control_type(&self) -> ControlType {
        match self {
            Self::Slider(_) => ControlType::Slider,
            Self::Button(_) => ControlType::Button,
            Self::Label(_) => ControlType::Label,
            Self::Checkbox(_) => ControlType::Checkbox,
            Self::Dropdown(_) => ControlType::Dropdown,
            Self::DownloadButton(_) => ControlType::DownloadButton,
            Self::ColorPicker(_) => ControlType::ColorPicker,
            Self::PlotPanel(_) => ControlType::PlotPanel,
            Self::ImageGallery(_) => ControlType::ImageGallery,
            Self::Group(_) => ControlType::Group,
        }
    }

    /// Decodes `payload` and commits it. State is only written once the
    /// whole payload decoded, so an error leaves the control untouched.
    pub(crate) fn apply(&mut self, payload: &Value) -> Result<Invocation, DecodeError> {
        match self {
            Self::Slider(slider) => slider.apply(payload),
            Self::Checkbox(checkbox) => checkbox.apply(payload),
            Self::Dropdown(dropdown) => dropdown.apply(payload),
            Self::ColorPicker(picker) => picker.apply(payload),
            Self::ImageGallery(gallery) => gallery.apply(payload),
            Self::Button(button) => Ok(button.apply()),
            Self::DownloadButton(button) => Ok(button.apply()),
            Self::Label(_) | Self::PlotPanel(_) | Self::Group(_) => Ok(Invocation::Nothing),
        }
    }

    pub fn value(&self) -> ControlValue {
        match self {
            Self::Slider(slider) => ControlValue::Number(slider.value()),
            Self::Button(_) | Self::DownloadButton(_) => ControlValue::Neutral,
            Self::Label(label) => ControlValue::Text(label.text().to_string()),
            Self::Checkbox(checkbox) => ControlValue::Bool(checkbox.is_checked()),
            Self::Dropdown(dropdown) => ControlValue::Text(dropdown.selected().to_string()),
            Self::ColorPicker(picker) => ControlValue::Color(picker.color()),
            Self::PlotPanel(plot) => ControlValue::Figure(plot.figure().clone()),
            Self::ImageGallery(gallery) => ControlValue::Selection(gallery.selected_index()),
            Self::Group(group) => ControlValue::Bool(group.is_collapsed()),
        }
    }

    pub fn spec(&self) -> ControlSpec {
        match self {
            Self::Slider(slider) => slider.spec(),
            Self::Button(button) => button.spec(),
            Self::Label(label) => label.spec(),
            Self::Checkbox(checkbox) => checkbox.spec(),
            Self::Dropdown(dropdown) => dropdown.spec(),
            Self::DownloadButton(button) => button.spec(),
            Self::ColorPicker(picker) => picker.spec(),
            Self::PlotPanel(plot) => plot.spec(),
            Self::ImageGallery(gallery) => gallery.spec(),
            Self::Group(group) => group.spec(),
        }
    }
}

/// Current value of a control, as returned by [`Control::value`].
#[derive(Debug, Clone, PartialEq)]
pub enum ControlValue {
    Number(f64),
    Bool(bool),
    Text(String),
    Color(Rgba),
    /// Placeholder value of stateless buttons.
    Neutral,
    Figure(Value),
    Selection(Option<usize>),
}

impl ControlValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Rgba> {
        match self {
            Self::Color(value) => Some(*value),
            _ => None,
        }
    }
}

/// A named control as stored in the registry.
#[derive(Debug, Clone)]
pub struct Control {
    name: String,
    group: Option<String>,
    serial: ControlSerial,
    kind: ControlKind,
}

impl Control {
    pub fn new(name: impl Into<String>, kind: impl Into<ControlKind>) -> Self {
        Self {
            name: name.into(),
            group: None,
            serial: ControlSerial::default(),
            kind: kind.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn serial(&self) -> ControlSerial {
        self.serial
    }

    pub fn kind(&self) -> &ControlKind {
        &self.kind
    }

    pub fn control_type(&self) -> ControlType {
        self.kind.control_type()
    }

    pub fn value(&self) -> ControlValue {
        self.kind.value()
    }

    pub fn serialize(&self, viewer_id: Option<&ViewerId>) -> ControlEnvelope {
        ControlEnvelope {
            id: self.name.clone(),
            name: self.name.clone(),
            spec: self.kind.spec(),
            group: self.group.clone(),
            viewer_id: viewer_id.cloned(),
        }
    }

    pub(crate) fn kind_mut(&mut self) -> &mut ControlKind {
        &mut self.kind
    }

    pub(crate) fn set_group(&mut self, group: &str) {
        self.group = Some(group.to_string());
    }

    pub(crate) fn set_serial(&mut self, serial: ControlSerial) {
        self.serial = serial;
    }

    pub(crate) fn apply(&mut self, payload: &Value) -> Result<Invocation, DecodeError> {
        self.kind.apply(payload)
    }
}
