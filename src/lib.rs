//! # preset-resize
//!
//! Deterministic image resizing for platform size presets. Given a source
//! image and a target box, produce an output of predictable dimensions using
//! one of eleven aspect-ratio strategies, then encode it as PNG, JPEG, WebP,
//! ICO, BMP, or TIFF.
//!
//! # Pipeline
//!
//! ```text
//! preset name ─▶ presets::lookup ─▶ TargetSpec
//!                                       │
//! source file ─▶ load_source ─▶ Raster ─┼─▶ Resizer ─▶ encode ─▶ OutputSink
//!                                       │
//!                             Strategy::plan (pure geometry)
//! ```
//!
//! Every target works on its own normalized copy of the decoded source, so a
//! batch can be fanned out across threads by the caller. Every outcome is an
//! [`optimize::OptimizationResult`]; one failing target never aborts its
//! siblings.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Geometry, strategies, color-mode normalization, Lanczos3 resize, encoders |
//! | [`presets`] | Compiled-in `platform → preset → (width, height)` table, reverse lookup, groups |
//! | [`optimize`] | [`Optimizer`](optimize::Optimizer): single targets, batches, convenience sets |
//! | [`sink`] | [`OutputSink`](sink::OutputSink) trait and the atomic filesystem sink |
//! | [`output`] | Result summaries and CLI text formatting |
//! | [`config`] | `preset-resize.toml` loading, merging, and validation |
//! | [`color`] | Named and hex background colors |
//! | [`error`] | [`OptimizeError`](error::OptimizeError) and its [`ErrorKind`](error::ErrorKind) |
//!
//! # Determinism
//!
//! All geometry is integer math with floor rounding, so the same request
//! produces the same dimensions and crop boxes everywhere. Encoded bytes are
//! not guaranteed stable across codec versions; pixel dimensions are.

pub mod color;
pub mod config;
pub mod error;
pub mod imaging;
pub mod optimize;
pub mod output;
pub mod presets;
pub mod sink;

#[cfg(test)]
pub(crate) mod test_helpers;
