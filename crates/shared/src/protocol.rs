use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{
    domain::{ControlType, Rgba, ViewerId},
    error::ApiError,
};

/// Flat wire representation of one control.
///
/// The variant tag and variant fields are flattened next to the common
/// fields, so a slider serializes as
/// `{"id":"s","name":"s","type":"slider","min":0.0,...,"group":"g"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlEnvelope {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub spec: ControlSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewer_id: Option<ViewerId>,
}

impl ControlEnvelope {
    pub fn control_type(&self) -> ControlType {
        self.spec.control_type()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlSpec {
    Slider {
        min: f64,
        max: f64,
        step: f64,
        initial: f64,
        #[serde(default)]
        description: String,
    },
    Button,
    Label {
        text: String,
    },
    Checkbox {
        initial: bool,
        #[serde(default)]
        description: String,
    },
    Dropdown {
        options: Vec<String>,
        initial: String,
        #[serde(default)]
        description: String,
    },
    DownloadButton {
        filename: String,
    },
    ColorPicker {
        initial: Rgba,
    },
    #[serde(rename = "plotly")]
    PlotPanel {
        spec: Value,
    },
    ImageGallery {
        images: Vec<String>,
        thumbnail_size: u32,
        columns: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rows_per_page: Option<u32>,
    },
    Group {
        collapsed: bool,
        controls: Vec<String>,
    },
}

impl ControlSpec {
    pub fn control_type(&self) -> ControlType {
        match self {
            Self::Slider { .. } => ControlType::Slider,
            Self::Button => ControlType::Button,
            Self::Label { .. } => ControlType::Label,
            Self::Checkbox { .. } => ControlType::Checkbox,
            Self::Dropdown { .. } => ControlType::Dropdown,
            Self::DownloadButton { .. } => ControlType::DownloadButton,
            Self::ColorPicker { .. } => ControlType::ColorPicker,
            Self::PlotPanel { .. } => ControlType::PlotPanel,
            Self::ImageGallery { .. } => ControlType::ImageGallery,
            Self::Group { .. } => ControlType::Group,
        }
    }
}

/// An event raised by the rendering surface for one named control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub control_name: String,
    #[serde(default)]
    pub payload: Value,
}

impl InboundEvent {
    pub fn new(control_name: impl Into<String>, payload: Value) -> Self {
        Self {
            control_name: control_name.into(),
            payload,
        }
    }
}

/// Payload of an image gallery event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GalleryEvent {
    ImageClick { index: usize },
    PageChange { page: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ClientRequest {
    UiEvent(InboundEvent),
    RequestSnapshot,
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("malformed client frame: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn parse_client_frame(text: &str) -> Result<ClientRequest, FrameError> {
    Ok(serde_json::from_str(text)?)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerEvent {
    DefineControl {
        control: ControlEnvelope,
    },
    DeleteControl {
        name: String,
    },
    UpdateLabel {
        name: String,
        text: String,
    },
    DownloadFile {
        filename: String,
        data_b64: String,
    },
    UpdateImageGallery {
        name: String,
        images: Vec<String>,
    },
    Error(ApiError),
}

impl ServerEvent {
    pub fn download_file(data: &[u8], filename: impl Into<String>) -> Self {
        Self::DownloadFile {
            filename: filename.into(),
            data_b64: STANDARD.encode(data),
        }
    }

    /// Raw bytes of a `DownloadFile` event, `None` for every other event.
    pub fn download_bytes(&self) -> Option<Result<Vec<u8>, base64::DecodeError>> {
        match self {
            Self::DownloadFile { data_b64, .. } => Some(STANDARD.decode(data_b64)),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
