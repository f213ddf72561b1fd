//! Concrete control variants.

mod button;
mod checkbox;
mod color_picker;
mod dropdown;
mod gallery;
mod group;
mod label;
mod plot;
mod slider;

pub use button::{Button, DownloadButton, DEFAULT_DOWNLOAD_FILENAME};
pub use checkbox::Checkbox;
pub use color_picker::ColorPicker;
pub use dropdown::Dropdown;
pub use gallery::{ImageGallery, DEFAULT_COLUMNS, DEFAULT_THUMBNAIL_SIZE};
pub use group::Group;
pub use label::Label;
pub use plot::PlotPanel;
pub use slider::Slider;
