//! Pure calculation functions for resize geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! Sizes are computed in exact integer arithmetic: aspect ratios are compared
//! by cross-multiplying and scaled dimensions are floored integer quotients.
//! Equal aspects therefore always reproduce the source proportions exactly,
//! and every implementation of the same geometry lands on the same pixel.
//! A floored dimension that would collapse to zero is clamped to 1px.
//! Only the crop-box tolerance check works in floating point.

use super::params::{Anchor, PadPosition};

/// Aspect ratios closer than this are treated as equal by
/// [`calculate_crop_box`], which then skips cropping entirely.
pub const DEFAULT_ASPECT_TOLERANCE: f64 = 0.01;

fn ratio(width: u32, height: u32) -> f64 {
    width as f64 / height as f64
}

/// `floor(value * num / den)` in u64, never below 1.
fn scale_px(value: u32, num: u32, den: u32) -> u32 {
    let scaled = u64::from(value) * u64::from(num) / u64::from(den);
    u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
}

/// Whether `a` is strictly wider than `b`, compared without division.
fn is_wider(a: (u32, u32), b: (u32, u32)) -> bool {
    u64::from(a.0) * u64::from(b.1) > u64::from(b.0) * u64::from(a.1)
}

/// A rectangle in source coordinates, `right` and `bottom` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropBox {
    /// The box covering a whole `width` x `height` image.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            left: 0,
            top: 0,
            right: width,
            bottom: height,
        }
    }

    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    pub fn is_full(&self, width: u32, height: u32) -> bool {
        *self == Self::full(width, height)
    }
}

/// Padding on each side of a fitted image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Padding {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

/// Calculate the largest size that fits inside `target` preserving the source aspect.
///
/// Exactly one dimension equals its target; the other is at most its target.
///
/// # Examples
/// ```
/// # use preset_resize::imaging::calculate_fit_dimensions;
/// // 4:3 source into a 1:1 box → width pinned
/// assert_eq!(calculate_fit_dimensions((800, 600), (400, 400)), (400, 300));
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    if is_wider(source, target) {
        // Source is wider: width pinned, height shrinks
        (tgt_w, scale_px(tgt_w, src_h, src_w).min(tgt_h))
    } else {
        // Source is taller (or equal): height pinned, width shrinks
        (scale_px(tgt_h, src_w, src_h).min(tgt_w), tgt_h)
    }
}

/// Calculate dimensions needed to fill a target area (resize before crop).
///
/// Returns dimensions that completely cover the target area while maintaining
/// the source aspect ratio. One dimension will match exactly, the other may exceed.
pub fn calculate_fill_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    if is_wider(source, target) {
        // Source is wider: height will match, width will exceed
        (scale_px(tgt_h, src_w, src_h).max(tgt_w), tgt_h)
    } else {
        // Source is taller (or equal): width will match, height will exceed
        (tgt_w, scale_px(tgt_w, src_h, src_w).max(tgt_h))
    }
}

/// Calculate a thumbnail size: fit inside `target`, but never larger than the source.
///
/// This is the one sizing rule bounded by the source rather than the target.
pub fn calculate_thumbnail_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;
    if src_w <= tgt_w && src_h <= tgt_h {
        return source;
    }
    calculate_fit_dimensions(source, target)
}

/// Calculate the crop box that gives `source` the aspect ratio of `target`.
///
/// Uses [`DEFAULT_ASPECT_TOLERANCE`]; see [`calculate_crop_box_with_tolerance`].
pub fn calculate_crop_box(source: (u32, u32), target: (u32, u32), anchor: Anchor) -> CropBox {
    calculate_crop_box_with_tolerance(source, target, anchor, DEFAULT_ASPECT_TOLERANCE)
}

/// Calculate the crop box that gives `source` the aspect ratio of `target`.
///
/// If the two aspect ratios differ by less than `tolerance` the full source
/// box is returned. Otherwise the relatively longer axis is cut down:
/// `Left`/`Right` pin a wide crop to one edge, `Top`/`Bottom` pin a tall
/// crop, and every other anchor centers it (floor on odd splits).
///
/// The result always lies within `[0, src_w] x [0, src_h]`.
pub fn calculate_crop_box_with_tolerance(
    source: (u32, u32),
    target: (u32, u32),
    anchor: Anchor,
    tolerance: f64,
) -> CropBox {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    if (ratio(src_w, src_h) - ratio(tgt_w, tgt_h)).abs() < tolerance {
        return CropBox::full(src_w, src_h);
    }

    if is_wider(source, target) {
        let new_w = scale_px(src_h, tgt_w, tgt_h).min(src_w);
        let left = match anchor {
            Anchor::Left => 0,
            Anchor::Right => src_w - new_w,
            Anchor::Center | Anchor::Top | Anchor::Bottom => (src_w - new_w) / 2,
        };
        CropBox {
            left,
            top: 0,
            right: left + new_w,
            bottom: src_h,
        }
    } else {
        let new_h = scale_px(src_w, tgt_h, tgt_w).min(src_h);
        let top = match anchor {
            Anchor::Top => 0,
            Anchor::Bottom => src_h - new_h,
            Anchor::Center | Anchor::Left | Anchor::Right => (src_h - new_h) / 2,
        };
        CropBox {
            left: 0,
            top,
            right: src_w,
            bottom: top + new_h,
        }
    }
}

/// Centered `target`-sized window inside an image of size `filled`.
///
/// Used after a fill-scale, where `filled` covers `target` on both axes.
pub fn calculate_center_crop(filled: (u32, u32), target: (u32, u32)) -> CropBox {
    let w = target.0.min(filled.0);
    let h = target.1.min(filled.1);
    let left = (filled.0 - w) / 2;
    let top = (filled.1 - h) / 2;
    CropBox {
        left,
        top,
        right: left + w,
        bottom: top + h,
    }
}

/// Calculate padding that places a `fit`-sized image on a `target` canvas.
///
/// `left + right == target_w - fit_w` and `top + bottom == target_h - fit_h`.
/// Centered axes put the odd pixel on the right/bottom; edge positions push
/// all padding to the opposite side.
pub fn calculate_padding(fit: (u32, u32), target: (u32, u32), position: PadPosition) -> Padding {
    let pad_x = target.0.saturating_sub(fit.0);
    let pad_y = target.1.saturating_sub(fit.1);

    let (left, top) = match position {
        PadPosition::Center => (pad_x / 2, pad_y / 2),
        PadPosition::TopLeft => (0, 0),
        PadPosition::Top => (pad_x / 2, 0),
        PadPosition::TopRight => (pad_x, 0),
        PadPosition::Left => (0, pad_y / 2),
        PadPosition::Right => (pad_x, pad_y / 2),
        PadPosition::BottomLeft => (0, pad_y),
        PadPosition::Bottom => (pad_x / 2, pad_y),
        PadPosition::BottomRight => (pad_x, pad_y),
    };

    Padding {
        left,
        top,
        right: pad_x - left,
        bottom: pad_y - top,
    }
}
