//! Executes resize plans on rasters.
//!
//! [`Resizer::apply`] validates the target, normalizes the color mode of a
//! private working copy, resolves the strategy into a
//! [`ResizePlan`](super::strategy::ResizePlan), and runs it. All scaling uses
//! Lanczos3; nearest-neighbor is never used.

use super::calculations::DEFAULT_ASPECT_TOLERANCE;
use super::params::{Background, TargetSpec};
use super::raster::Raster;
use super::strategy::ResizePlan;
use crate::error::OptimizeError;
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage, RgbaImage};

#[derive(Debug, Clone, Copy)]
pub struct Resizer {
    filter: FilterType,
    aspect_tolerance: f64,
}

impl Resizer {
    /// Lanczos3 resizer with a custom crop-box aspect tolerance.
    pub fn new(aspect_tolerance: f64) -> Self {
        Self {
            filter: FilterType::Lanczos3,
            aspect_tolerance,
        }
    }

    pub fn aspect_tolerance(&self) -> f64 {
        self.aspect_tolerance
    }

    /// Produce a new raster for `spec` from `raster`.
    ///
    /// The input is never modified. Fails with `InvalidTarget` before any
    /// pixel work when a target dimension is zero.
    pub fn apply(&self, raster: &Raster, spec: &TargetSpec) -> Result<Raster, OptimizeError> {
        spec.validate()?;

        let working = raster.normalized();
        let plan = spec
            .strategy
            .plan(working.dimensions(), spec.dimensions(), self.aspect_tolerance);
        tracing::debug!(
            strategy = %spec.strategy,
            source_w = working.width(),
            source_h = working.height(),
            target_w = spec.width,
            target_h = spec.height,
            ?plan,
            "resizing"
        );

        let mut out = self.execute(working.into_image(), plan, spec.background);
        if let Some(sharpening) = spec.sharpening {
            out = out.unsharpen(sharpening.sigma, sharpening.threshold);
        }
        Ok(Raster::new(out))
    }

    /// Run `plan` on an already-normalized image.
    pub fn execute(
        &self,
        image: DynamicImage,
        plan: ResizePlan,
        background: Background,
    ) -> DynamicImage {
        match plan {
            ResizePlan::Scale { width, height } => self.scale(image, (width, height)),
            ResizePlan::FillThenCrop { fill, crop } => {
                let filled = self.scale(image, fill);
                if crop.is_full(filled.width(), filled.height()) {
                    filled
                } else {
                    filled.crop_imm(crop.left, crop.top, crop.width(), crop.height())
                }
            }
            ResizePlan::CropThenScale {
                crop,
                width,
                height,
            } => {
                let cropped = if crop.is_full(image.width(), image.height()) {
                    image
                } else {
                    image.crop_imm(crop.left, crop.top, crop.width(), crop.height())
                };
                self.scale(cropped, (width, height))
            }
            ResizePlan::FitOnCanvas {
                fit,
                padding,
                canvas,
            } => {
                let fitted = self.scale(image, fit);
                let (x, y) = (padding.left as i64, padding.top as i64);
                match fitted {
                    DynamicImage::ImageRgba8(top) => {
                        let mut base = RgbaImage::from_pixel(canvas.0, canvas.1, background.rgba());
                        imageops::overlay(&mut base, &top, x, y);
                        DynamicImage::ImageRgba8(base)
                    }
                    other => {
                        let mut base = RgbImage::from_pixel(canvas.0, canvas.1, background.rgb());
                        imageops::replace(&mut base, &other.to_rgb8(), x, y);
                        DynamicImage::ImageRgb8(base)
                    }
                }
            }
        }
    }

    fn scale(&self, image: DynamicImage, (width, height): (u32, u32)) -> DynamicImage {
        if image.width() == width && image.height() == height {
            return image;
        }
        image.resize_exact(width, height, self.filter)
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new(DEFAULT_ASPECT_TOLERANCE)
    }
}
