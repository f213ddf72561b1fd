use serde_json::Value;
use shared::{
    domain::ControlType,
    protocol::{ControlSpec, GalleryEvent},
};

use crate::{
    callback::{value_callback, CallbackResult, Invocation, ValueCallback},
    error::{ConstructionError, DecodeError},
    images::{normalize_images, ImageSource},
    viewer::Viewer,
};

pub const DEFAULT_THUMBNAIL_SIZE: u32 = 150;
pub const DEFAULT_COLUMNS: u32 = 3;

/// Paginated grid of clickable thumbnails.
#[derive(Debug, Clone)]
pub struct ImageGallery {
    images: Vec<String>,
    thumbnail_size: u32,
    columns: u32,
    rows_per_page: Option<u32>,
    selected_index: Option<usize>,
    current_page: usize,
    on_click: Option<ValueCallback<usize>>,
}

impl ImageGallery {
    pub fn new<I>(images: I) -> Result<Self, ConstructionError>
    where
        I: IntoIterator,
        I::Item: Into<ImageSource>,
    {
        Ok(Self {
            images: normalize_images(images)?,
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
            columns: DEFAULT_COLUMNS,
            rows_per_page: None,
            selected_index: None,
            current_page: 0,
            on_click: None,
        })
    }

    pub fn thumbnail_size(mut self, thumbnail_size: u32) -> Self {
        self.thumbnail_size = thumbnail_size;
        self
    }

    pub fn columns(mut self, columns: u32) -> Self {
        self.columns = columns;
        self
    }

    pub fn rows_per_page(mut self, rows_per_page: u32) -> Self {
        self.rows_per_page = Some(rows_per_page);
        self
    }

    pub fn on_click<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Viewer, usize) -> CallbackResult + Send + Sync + 'static,
    {
        self.on_click = Some(value_callback(f));
        self
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Swaps in a new image set. On error the gallery is left as it was.
    pub(crate) fn replace_images<I>(&mut self, images: I) -> Result<&[String], ConstructionError>
    where
        I: IntoIterator,
        I::Item: Into<ImageSource>,
    {
        self.images = normalize_images(images)?;
        self.selected_index = None;
        self.current_page = 0;
        Ok(&self.images)
    }

    // Page changes are local view state, so only clicks reach the callback.
    pub(crate) fn apply(&mut self, payload: &Value) -> Result<Invocation, DecodeError> {
        let event: GalleryEvent = serde_json::from_value(payload.clone()).map_err(|_| {
            DecodeError::shape(
                ControlType::ImageGallery,
                "an imageClick or pageChange event",
                payload,
            )
        })?;

        match event {
            GalleryEvent::ImageClick { index } => {
                self.selected_index = Some(index);
                Ok(Invocation::with_value(self.on_click.as_ref(), index))
            }
            GalleryEvent::PageChange { page } => {
                self.current_page = page;
                Ok(Invocation::Nothing)
            }
        }
    }

    pub(crate) fn spec(&self) -> ControlSpec {
        ControlSpec::ImageGallery {
            images: self.images.clone(),
            thumbnail_size: self.thumbnail_size,
            columns: self.columns,
            rows_per_page: self.rows_per_page,
        }
    }
}
