//! The deterministic resize engine.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` with format sniffing |
//! | **Geometry** | pure integer math, floor rounding |
//! | **Resample** | `image` Lanczos3 (`resize_exact`) |
//! | **Pad** | `imageops::overlay` onto a background canvas |
//! | **Encode** | `image` codecs, `webp` for lossy WebP, `tiff` for LZW |
//!
//! The module is split into:
//! - **Calculations**: pure functions for dimension and crop-box math
//! - **Parameters**: quality, background, formats, and [`TargetSpec`]
//! - **Strategy**: [`Strategy`] and its resolution into a [`ResizePlan`]
//! - **Raster**: decoded pixels, color-mode normalization, source loading
//! - **Resizer**: executes plans with Lanczos3
//! - **Encoder**: raster to bytes per [`OutputFormat`]

mod calculations;
pub mod encoder;
mod params;
pub mod raster;
pub mod resizer;
pub mod strategy;

pub use calculations::{
    CropBox, DEFAULT_ASPECT_TOLERANCE, Padding, calculate_center_crop, calculate_crop_box,
    calculate_crop_box_with_tolerance, calculate_fill_dimensions, calculate_fit_dimensions,
    calculate_padding, calculate_thumbnail_dimensions,
};
pub use encoder::{EncodeOptions, encode, encode_with};
pub use params::{
    Anchor, Background, OutputFormat, PadPosition, Quality, Sharpening, TargetSpec,
};
pub use raster::{ColorMode, ImageInfo, Raster, SourceImage, image_info, load_source};
pub use resizer::Resizer;
pub use strategy::{ResizePlan, Strategy};
