//! Parameter types for resize and encode operations.
//!
//! These types describe *what* to produce, not *how*. A [`TargetSpec`] is the
//! complete request for one output: exact target box, aspect-ratio
//! [`Strategy`], background color, output format and quality. The
//! [`resizer`](super::resizer) and [`encoder`](super::encoder) consume them.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1-100, default 95). Clamped on construction.
//! - [`Background`]: Raw RGBA 4-tuple used for pad canvases and JPEG compositing.
//! - [`OutputFormat`]: PNG, JPEG, WebP, ICO, BMP, TIFF.
//! - [`Anchor`]: Which edge survives a crop.
//! - [`PadPosition`]: Where a fitted image sits on a padded canvas.
//! - [`Sharpening`]: Unsharp-mask parameters applied after scaling.
//! - [`TargetSpec`]: Everything needed to produce one output.

use super::strategy::Strategy;
use crate::error::OptimizeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}

impl From<u32> for Quality {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<Quality> for u32 {
    fn from(q: Quality) -> Self {
        q.0 as u32
    }
}

/// Background color as a raw RGBA 4-tuple (0-255 per channel).
///
/// Named colors and hex strings are parsed by [`crate::color`]; the engine
/// itself only ever sees the four channel values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Background(pub [u8; 4]);

impl Background {
    /// Fully transparent white, the default padding color.
    pub const TRANSPARENT: Background = Background([255, 255, 255, 0]);
    pub const WHITE: Background = Background([255, 255, 255, 255]);

    pub fn rgba(self) -> image::Rgba<u8> {
        image::Rgba(self.0)
    }

    /// Color channels only; alpha dropped.
    pub fn rgb(self) -> image::Rgb<u8> {
        let [r, g, b, _] = self.0;
        image::Rgb([r, g, b])
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    #[serde(alias = "jpg")]
    Jpeg,
    Webp,
    Ico,
    Bmp,
    Tiff,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 6] = [
        OutputFormat::Png,
        OutputFormat::Jpeg,
        OutputFormat::Webp,
        OutputFormat::Ico,
        OutputFormat::Bmp,
        OutputFormat::Tiff,
    ];

    /// Lowercase identifier, also used as the file extension.
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Webp => "webp",
            OutputFormat::Ico => "ico",
            OutputFormat::Bmp => "bmp",
            OutputFormat::Tiff => "tiff",
        }
    }

    pub fn extension(self) -> &'static str {
        self.as_str()
    }

    /// Whether the `quality` setting changes the encoded output.
    pub fn is_lossy(self) -> bool {
        matches!(self, OutputFormat::Jpeg | OutputFormat::Webp)
    }

    pub fn supports_alpha(self) -> bool {
        !matches!(self, OutputFormat::Jpeg)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = OptimizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "jpg" {
            return Ok(OutputFormat::Jpeg);
        }
        OutputFormat::ALL
            .into_iter()
            .find(|f| f.as_str() == lower)
            .ok_or_else(|| {
                let valid: Vec<&str> = OutputFormat::ALL.iter().map(|f| f.as_str()).collect();
                OptimizeError::InvalidTarget(format!(
                    "invalid format '{s}', expected one of: {}",
                    valid.join(", ")
                ))
            })
    }
}

/// Reference edge used by crop-family strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    #[default]
    Center,
    Top,
    Bottom,
    Left,
    Right,
}

/// Placement of a fitted image on a padded canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PadPosition {
    #[default]
    Center,
    TopLeft,
    Top,
    TopRight,
    Left,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

/// Sharpening parameters for unsharp mask.
///
/// - `sigma`: Standard deviation of the Gaussian blur (higher = more sharpening)
/// - `threshold`: Minimum brightness difference to sharpen (0 = sharpen all pixels)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sharpening {
    pub sigma: f32,
    pub threshold: i32,
}

impl Sharpening {
    /// Light sharpening that offsets the softening of a large downscale.
    pub fn light() -> Self {
        Self {
            sigma: 0.5,
            threshold: 0,
        }
    }
}

/// Everything needed to produce one output image.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSpec {
    pub width: u32,
    pub height: u32,
    pub strategy: Strategy,
    pub background: Background,
    pub format: OutputFormat,
    pub quality: Quality,
    pub sharpening: Option<Sharpening>,
}

impl TargetSpec {
    /// A PNG, `crop_center` target of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            strategy: Strategy::CropCenter,
            background: Background::default(),
            format: OutputFormat::Png,
            quality: Quality::default(),
            sharpening: None,
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_background(mut self, background: Background) -> Self {
        self.background = background;
        self
    }

    pub fn with_sharpening(mut self, sharpening: Sharpening) -> Self {
        self.sharpening = Some(sharpening);
        self
    }

    /// Reject non-positive target dimensions.
    pub fn validate(&self) -> Result<(), OptimizeError> {
        if self.width == 0 || self.height == 0 {
            return Err(OptimizeError::InvalidTarget(format!(
                "target dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
