//! Aspect-ratio strategies and their resolution into resize plans.
//!
//! A [`Strategy`] names a policy for reconciling source and target aspect
//! ratios. [`Strategy::plan`] turns it into a [`ResizePlan`]: the concrete
//! crop / scale / pad steps, with every dimension already computed by the
//! [`calculations`](super::calculations) module. The resizer executes plans
//! and never looks at strategies, so adding a strategy means touching the one
//! match in [`Strategy::plan`].
//!
//! | Strategy | Plan |
//! |---|---|
//! | `stretch` | scale to exact target, aspect ignored |
//! | `fit` | fit-scale; one axis may be smaller than target |
//! | `fill` | fill-scale, then center-crop to exact target |
//! | `crop_*` | anchored crop to target aspect, then scale to exact target |
//! | `crop_smart` | same as `crop_center` (no content detection) |
//! | `pad` | fit-scale onto a target-sized background canvas, centered |
//! | `thumbnail` | fit-scale bounded by the source size (never upscales) |

use super::calculations::{
    CropBox, Padding, calculate_center_crop, calculate_crop_box_with_tolerance,
    calculate_fill_dimensions, calculate_fit_dimensions, calculate_padding,
    calculate_thumbnail_dimensions,
};
use super::params::{Anchor, PadPosition};
use crate::error::OptimizeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Fit,
    Fill,
    #[default]
    CropCenter,
    CropTop,
    CropBottom,
    CropLeft,
    CropRight,
    CropSmart,
    Stretch,
    Pad,
    Thumbnail,
}

impl Strategy {
    pub const ALL: [Strategy; 11] = [
        Strategy::Fit,
        Strategy::Fill,
        Strategy::CropCenter,
        Strategy::CropTop,
        Strategy::CropBottom,
        Strategy::CropLeft,
        Strategy::CropRight,
        Strategy::CropSmart,
        Strategy::Stretch,
        Strategy::Pad,
        Strategy::Thumbnail,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Fit => "fit",
            Strategy::Fill => "fill",
            Strategy::CropCenter => "crop_center",
            Strategy::CropTop => "crop_top",
            Strategy::CropBottom => "crop_bottom",
            Strategy::CropLeft => "crop_left",
            Strategy::CropRight => "crop_right",
            Strategy::CropSmart => "crop_smart",
            Strategy::Stretch => "stretch",
            Strategy::Pad => "pad",
            Strategy::Thumbnail => "thumbnail",
        }
    }

    /// Crop anchor for crop-family strategies, `None` for everything else.
    pub fn anchor(self) -> Option<Anchor> {
        match self {
            Strategy::CropCenter | Strategy::CropSmart => Some(Anchor::Center),
            Strategy::CropTop => Some(Anchor::Top),
            Strategy::CropBottom => Some(Anchor::Bottom),
            Strategy::CropLeft => Some(Anchor::Left),
            Strategy::CropRight => Some(Anchor::Right),
            Strategy::Fit
            | Strategy::Fill
            | Strategy::Stretch
            | Strategy::Pad
            | Strategy::Thumbnail => None,
        }
    }

    /// One-line description for help output.
    pub fn describe(self) -> &'static str {
        match self {
            Strategy::Fit => "Fit within dimensions (may letterbox)",
            Strategy::Fill => "Fill dimensions completely, center-crop the excess",
            Strategy::CropCenter => "Crop from center to the target aspect, then resize",
            Strategy::CropTop => "Crop keeping the top",
            Strategy::CropBottom => "Crop keeping the bottom",
            Strategy::CropLeft => "Crop keeping the left side",
            Strategy::CropRight => "Crop keeping the right side",
            Strategy::CropSmart => "Deterministic center crop (no content detection)",
            Strategy::Stretch => "Stretch to exact size (distorts)",
            Strategy::Pad => "Fit and pad with the background color",
            Strategy::Thumbnail => "Fit within dimensions, never upscale",
        }
    }

    /// Resolve this strategy against concrete sizes.
    ///
    /// `tolerance` is the crop-box aspect epsilon (see
    /// [`DEFAULT_ASPECT_TOLERANCE`](super::calculations::DEFAULT_ASPECT_TOLERANCE)).
    pub fn plan(self, source: (u32, u32), target: (u32, u32), tolerance: f64) -> ResizePlan {
        match self {
            Strategy::Stretch => ResizePlan::Scale {
                width: target.0,
                height: target.1,
            },
            Strategy::Fit => {
                let (width, height) = calculate_fit_dimensions(source, target);
                ResizePlan::Scale { width, height }
            }
            Strategy::Thumbnail => {
                let (width, height) = calculate_thumbnail_dimensions(source, target);
                ResizePlan::Scale { width, height }
            }
            Strategy::Fill => {
                let fill = calculate_fill_dimensions(source, target);
                ResizePlan::FillThenCrop {
                    fill,
                    crop: calculate_center_crop(fill, target),
                }
            }
            Strategy::CropCenter
            | Strategy::CropTop
            | Strategy::CropBottom
            | Strategy::CropLeft
            | Strategy::CropRight
            | Strategy::CropSmart => {
                let anchor = self.anchor().unwrap_or_default();
                ResizePlan::CropThenScale {
                    crop: calculate_crop_box_with_tolerance(source, target, anchor, tolerance),
                    width: target.0,
                    height: target.1,
                }
            }
            Strategy::Pad => {
                let fit = calculate_fit_dimensions(source, target);
                ResizePlan::FitOnCanvas {
                    fit,
                    padding: calculate_padding(fit, target, PadPosition::Center),
                    canvas: target,
                }
            }
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = OptimizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Strategy::ALL
            .into_iter()
            .find(|st| st.as_str() == lower)
            .ok_or_else(|| {
                let valid: Vec<&str> = Strategy::ALL.iter().map(|st| st.as_str()).collect();
                OptimizeError::InvalidTarget(format!(
                    "invalid strategy '{s}', expected one of: {}",
                    valid.join(", ")
                ))
            })
    }
}

/// Concrete steps for one resize, all dimensions precomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizePlan {
    /// Scale the whole source to `width` x `height`.
    Scale { width: u32, height: u32 },
    /// Scale to `fill`, then cut `crop` out of the scaled image.
    FillThenCrop { fill: (u32, u32), crop: CropBox },
    /// Cut `crop` out of the source, then scale it to `width` x `height`.
    CropThenScale { crop: CropBox, width: u32, height: u32 },
    /// Scale to `fit` and paste it onto a `canvas`-sized background at `padding`.
    FitOnCanvas {
        fit: (u32, u32),
        padding: Padding,
        canvas: (u32, u32),
    },
}

impl ResizePlan {
    /// Dimensions of the raster this plan produces.
    pub fn output_dimensions(&self) -> (u32, u32) {
        match *self {
            ResizePlan::Scale { width, height } => (width, height),
            ResizePlan::FillThenCrop { crop, .. } => (crop.width(), crop.height()),
            ResizePlan::CropThenScale { width, height, .. } => (width, height),
            ResizePlan::FitOnCanvas { canvas, .. } => canvas,
        }
    }
}
