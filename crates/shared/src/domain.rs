use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! name_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

name_newtype!(ViewerId);

/// Variant tag carried in the `type` field of every serialized control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlType {
    Slider,
    Button,
    Label,
    Checkbox,
    Dropdown,
    DownloadButton,
    ColorPicker,
    #[serde(rename = "plotly")]
    PlotPanel,
    ImageGallery,
    Group,
}

impl ControlType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Slider => "slider",
            Self::Button => "button",
            Self::Label => "label",
            Self::Checkbox => "checkbox",
            Self::Dropdown => "dropdown",
            Self::DownloadButton => "download_button",
            Self::ColorPicker => "color_picker",
            Self::PlotPanel => "plotly",
            Self::ImageGallery => "image_gallery",
            Self::Group => "group",
        }
    }
}

impl fmt::Display for ControlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// RGBA color with every channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgba(pub [f64; 4]);

impl Rgba {
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self([r, g, b, a])
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::new(0.5, 0.5, 0.5, 1.0)
    }
}

impl From<[f32; 4]> for Rgba {
    fn from(value: [f32; 4]) -> Self {
        Self(value.map(f64::from))
    }
}

impl From<[f64; 4]> for Rgba {
    fn from(value: [f64; 4]) -> Self {
        Self(value)
    }
}

impl From<(f64, f64, f64, f64)> for Rgba {
    fn from((r, g, b, a): (f64, f64, f64, f64)) -> Self {
        Self::new(r, g, b, a)
    }
}
