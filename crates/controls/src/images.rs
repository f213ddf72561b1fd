//! Normalization of gallery input into self-describing PNG data URIs.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage, RgbaImage};

use crate::error::ConstructionError;

pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// One gallery image in any of the accepted input forms.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Already encoded (typically a data URI); passed through untouched.
    Encoded(String),
    Pixels(PixelArray),
    Decoded(DynamicImage),
}

impl From<String> for ImageSource {
    fn from(value: String) -> Self {
        Self::Encoded(value)
    }
}

impl From<&str> for ImageSource {
    fn from(value: &str) -> Self {
        Self::Encoded(value.to_string())
    }
}

impl From<PixelArray> for ImageSource {
    fn from(value: PixelArray) -> Self {
        Self::Pixels(value)
    }
}

impl From<DynamicImage> for ImageSource {
    fn from(value: DynamicImage) -> Self {
        Self::Decoded(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PixelData {
    U8(Vec<u8>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

/// Row-major pixel buffer shaped `[height, width]` or
/// `[height, width, channels]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelArray {
    shape: Vec<usize>,
    data: PixelData,
}

impl PixelArray {
    pub fn new(shape: impl Into<Vec<usize>>, data: PixelData) -> Self {
        Self {
            shape: shape.into(),
            data,
        }
    }

    pub fn from_u8(shape: impl Into<Vec<usize>>, data: Vec<u8>) -> Self {
        Self::new(shape, PixelData::U8(data))
    }

    pub fn from_f32(shape: impl Into<Vec<usize>>, data: Vec<f32>) -> Self {
        Self::new(shape, PixelData::F32(data))
    }

    pub fn from_f64(shape: impl Into<Vec<usize>>, data: Vec<f64>) -> Self {
        Self::new(shape, PixelData::F64(data))
    }

    fn channels(&self) -> Option<usize> {
        match self.shape.as_slice() {
            [_, _] => Some(1),
            [_, _, channels @ (1 | 3 | 4)] => Some(*channels),
            _ => None,
        }
    }

    fn into_image(self) -> Result<DynamicImage, ConstructionError> {
        let channels = self
            .channels()
            .ok_or_else(|| ConstructionError::UnsupportedChannels {
                shape: self.shape.clone(),
            })?;
        let (height, width) = (self.shape[0], self.shape[1]);
        let expected = height * width * channels;
        let shape = self.shape;
        let bytes = to_display_bytes(self.data);
        if bytes.len() != expected {
            return Err(ConstructionError::BufferMismatch {
                shape,
                expected,
                actual: bytes.len(),
            });
        }

        let (w, h) = (width as u32, height as u32);
        let image = match channels {
            1 => GrayImage::from_raw(w, h, bytes).map(DynamicImage::ImageLuma8),
            3 => RgbImage::from_raw(w, h, bytes).map(DynamicImage::ImageRgb8),
            _ => RgbaImage::from_raw(w, h, bytes).map(DynamicImage::ImageRgba8),
        };
        image.ok_or(ConstructionError::BufferMismatch {
            shape,
            expected,
            actual: expected,
        })
    }
}

/// Floating point buffers whose largest element is at most `1.0` are in
/// unit range and get scaled by 255; anything larger is already in display
/// range. The cast to `u8` truncates and saturates.
fn to_display_bytes(data: PixelData) -> Vec<u8> {
    match data {
        PixelData::U8(bytes) => bytes,
        PixelData::F32(values) => {
            scale_floats(values.into_iter().map(f64::from).collect::<Vec<_>>())
        }
        PixelData::F64(values) => scale_floats(values),
    }
}

fn scale_floats(values: Vec<f64>) -> Vec<u8> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let factor = if max <= 1.0 { 255.0 } else { 1.0 };
    values.into_iter().map(|v| (v * factor) as u8).collect()
}

pub fn encode_png_data_uri(image: &DynamicImage) -> Result<String, image::ImageError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(format!("{PNG_DATA_URI_PREFIX}{}", STANDARD.encode(bytes)))
}

/// Converts every input into an encoded string, in order. Fails on the
/// first image that cannot be converted.
pub fn normalize_images<I>(images: I) -> Result<Vec<String>, ConstructionError>
where
    I: IntoIterator,
    I::Item: Into<ImageSource>,
{
    images
        .into_iter()
        .enumerate()
        .map(|(index, source)| match source.into() {
            ImageSource::Encoded(encoded) => Ok(encoded),
            ImageSource::Pixels(pixels) => {
                let image = pixels.into_image()?;
                encode_png_data_uri(&image)
                    .map_err(|source| ConstructionError::Encode { index, source })
            }
            ImageSource::Decoded(image) => encode_png_data_uri(&image)
                .map_err(|source| ConstructionError::Encode { index, source }),
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/images_tests.rs"]
mod tests;
