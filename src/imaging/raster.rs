//! Decoded rasters, color-mode normalization, and source loading.
//!
//! A [`Raster`] wraps an `image::DynamicImage`. Sources are decoded once into
//! a [`SourceImage`]; every target then works on its own normalized copy
//! ([`Raster::normalized`]), so targets processed in parallel never share a
//! mutable buffer.
//!
//! Normalization maps every decoded mode onto one of two working modes:
//!
//! | Decoded mode | Working mode |
//! |---|---|
//! | RGB8 | RGB8 |
//! | RGBA8, RGBA16, RGBA32F | RGBA8 |
//! | gray + alpha (8/16 bit) | RGBA8 |
//! | gray (8/16 bit), RGB16, RGB32F, anything else | RGB8 |
//!
//! Indexed images never reach the engine as such: the PNG and GIF decoders
//! expand palettes to RGB8, or to RGBA8 when the palette carries transparency.

use crate::error::OptimizeError;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Pixel layout of a decoded raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Gray8,
    GrayAlpha8,
    Gray16,
    GrayAlpha16,
    Rgb8,
    Rgba8,
    Rgb16,
    Rgba16,
    Rgb32F,
    Rgba32F,
    Other,
}

impl ColorMode {
    pub fn of(image: &DynamicImage) -> Self {
        match image {
            DynamicImage::ImageLuma8(_) => ColorMode::Gray8,
            DynamicImage::ImageLumaA8(_) => ColorMode::GrayAlpha8,
            DynamicImage::ImageLuma16(_) => ColorMode::Gray16,
            DynamicImage::ImageLumaA16(_) => ColorMode::GrayAlpha16,
            DynamicImage::ImageRgb8(_) => ColorMode::Rgb8,
            DynamicImage::ImageRgba8(_) => ColorMode::Rgba8,
            DynamicImage::ImageRgb16(_) => ColorMode::Rgb16,
            DynamicImage::ImageRgba16(_) => ColorMode::Rgba16,
            DynamicImage::ImageRgb32F(_) => ColorMode::Rgb32F,
            DynamicImage::ImageRgba32F(_) => ColorMode::Rgba32F,
            _ => ColorMode::Other,
        }
    }

    pub fn has_alpha(self) -> bool {
        matches!(
            self,
            ColorMode::GrayAlpha8 | ColorMode::GrayAlpha16 | ColorMode::Rgba8 | ColorMode::Rgba16
                | ColorMode::Rgba32F
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColorMode::Gray8 => "gray8",
            ColorMode::GrayAlpha8 => "grayalpha8",
            ColorMode::Gray16 => "gray16",
            ColorMode::GrayAlpha16 => "grayalpha16",
            ColorMode::Rgb8 => "rgb8",
            ColorMode::Rgba8 => "rgba8",
            ColorMode::Rgb16 => "rgb16",
            ColorMode::Rgba16 => "rgba16",
            ColorMode::Rgb32F => "rgb32f",
            ColorMode::Rgba32F => "rgba32f",
            ColorMode::Other => "other",
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    image: DynamicImage,
}

impl Raster {
    pub fn new(image: DynamicImage) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_image(self) -> DynamicImage {
        self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    pub fn color_mode(&self) -> ColorMode {
        ColorMode::of(&self.image)
    }

    pub fn has_alpha(&self) -> bool {
        self.color_mode().has_alpha()
    }

    /// An owned RGB8 or RGBA8 working copy of this raster.
    pub fn normalized(&self) -> Raster {
        let image = match &self.image {
            DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => self.image.clone(),
            other if ColorMode::of(other).has_alpha() => {
                DynamicImage::ImageRgba8(other.to_rgba8())
            }
            other => DynamicImage::ImageRgb8(other.to_rgb8()),
        };
        Raster { image }
    }
}

impl From<DynamicImage> for Raster {
    fn from(image: DynamicImage) -> Self {
        Self::new(image)
    }
}

/// A decoded source together with what is known about its origin.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub raster: Raster,
    /// Where the source was read from, if it came from disk.
    pub path: Option<PathBuf>,
    /// Encoded size of the source in bytes (0 when unknown).
    pub byte_size: u64,
    /// Container format the source was decoded from, if known.
    pub format: Option<ImageFormat>,
    /// Raw EXIF block found in the source container, if any.
    pub exif: Option<Vec<u8>>,
}

impl SourceImage {
    /// Wrap an in-memory raster with no file behind it.
    pub fn from_raster(raster: Raster) -> Self {
        Self {
            raster,
            path: None,
            byte_size: 0,
            format: None,
            exif: None,
        }
    }

    /// File stem used to derive output names; `"image"` for in-memory sources.
    pub fn stem(&self) -> String {
        self.path
            .as_deref()
            .and_then(|p| p.file_stem())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string())
    }
}

/// Load and decode an image from disk.
///
/// Fails with `NotFound` when the path does not exist and `Decode` when the
/// bytes are not a supported image.
pub fn load_source(path: &Path) -> Result<SourceImage, OptimizeError> {
    if !path.exists() {
        return Err(OptimizeError::NotFound(path.to_path_buf()));
    }
    let byte_size = std::fs::metadata(path)?.len();
    let reader = ImageReader::open(path)?
        .with_guessed_format()
        .map_err(OptimizeError::Io)?;
    let format = reader.format();
    let decode_err = |e: image::ImageError| OptimizeError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let mut decoder = reader.into_decoder().map_err(decode_err)?;
    // Unreadable metadata never blocks decoding the pixels.
    let exif = decoder.exif_metadata().unwrap_or_else(|e| {
        tracing::debug!(path = %path.display(), error = %e, "ignoring unreadable EXIF");
        None
    });
    let image = DynamicImage::from_decoder(decoder).map_err(decode_err)?;
    tracing::debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        mode = %ColorMode::of(&image),
        "decoded source"
    );
    Ok(SourceImage {
        raster: Raster::new(image),
        path: Some(path.to_path_buf()),
        byte_size,
        format,
        exif,
    })
}

/// Summary of an image file, for the `info` command.
#[derive(Debug, Clone, Serialize)]
pub struct ImageInfo {
    pub path: String,
    pub filename: String,
    pub format: Option<String>,
    pub mode: ColorMode,
    pub width: u32,
    pub height: u32,
    /// Width / height, rounded to 3 decimals.
    pub aspect_ratio: f64,
    pub file_size_bytes: u64,
    /// File size in KiB, rounded to 2 decimals.
    pub file_size_kb: f64,
    pub has_alpha: bool,
}

/// Decode `path` and describe it.
pub fn image_info(path: &Path) -> Result<ImageInfo, OptimizeError> {
    let source = load_source(path)?;
    let (width, height) = source.raster.dimensions();
    let mode = source.raster.color_mode();
    Ok(ImageInfo {
        path: path.display().to_string(),
        filename: path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default(),
        format: source.format.map(|f| format!("{f:?}").to_uppercase()),
        mode,
        width,
        height,
        aspect_ratio: (width as f64 / height as f64 * 1000.0).round() / 1000.0,
        file_size_bytes: source.byte_size,
        file_size_kb: (source.byte_size as f64 / 1024.0 * 100.0).round() / 100.0,
        has_alpha: mode.has_alpha(),
    })
}
