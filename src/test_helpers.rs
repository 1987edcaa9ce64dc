//! Shared test utilities for the preset-resize test suite.
//!
//! Synthetic rasters built in memory, so tests never depend on fixture files.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let src = split_vertical(200, 100, Rgb([255, 0, 0]), Rgb([0, 0, 255]));
//! let out = Resizer::default().apply(&src, &TargetSpec::new(50, 50)).unwrap();
//! ```

use crate::imaging::Raster;
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::Path;

// =========================================================================
// Synthetic rasters
// =========================================================================

/// RGB8 raster with a diagonal color gradient.
pub fn gradient_rgb(width: u32, height: u32) -> Raster {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    });
    Raster::new(DynamicImage::ImageRgb8(img))
}

/// RGBA8 raster with the same gradient, fully opaque.
pub fn gradient_rgba(width: u32, height: u32) -> Raster {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
            255,
        ])
    });
    Raster::new(DynamicImage::ImageRgba8(img))
}

/// RGB8 raster: `top` color above the middle row, `bottom` below.
pub fn split_horizontal(width: u32, height: u32, top: Rgb<u8>, bottom: Rgb<u8>) -> Raster {
    let img = RgbImage::from_fn(width, height, |_, y| if y < height / 2 { top } else { bottom });
    Raster::new(DynamicImage::ImageRgb8(img))
}

/// RGB8 raster: `left` color left of the middle column, `right` after it.
pub fn split_vertical(width: u32, height: u32, left: Rgb<u8>, right: Rgb<u8>) -> Raster {
    let img = RgbImage::from_fn(width, height, |x, _| if x < width / 2 { left } else { right });
    Raster::new(DynamicImage::ImageRgb8(img))
}

// =========================================================================
// Files
// =========================================================================

/// Write `raster` to `path` as PNG.
pub fn write_png(path: &Path, raster: &Raster) {
    raster
        .image()
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}
