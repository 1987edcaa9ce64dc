//! Optimizer configuration.
//!
//! Handles loading, validating, and merging `preset-resize.toml`. Stock
//! defaults are the base layer; a user file overrides any subset of keys.
//! Command-line flags are applied on top by the binary.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [defaults]
//! quality = 95                    # JPEG/WebP quality (1-100)
//! format = "png"                  # png, jpeg, webp, ico, bmp, tiff
//! strategy = "crop_center"        # see `preset-resize resize --help`
//! optimize = true                 # slower, smaller PNGs
//! background = [255, 255, 255, 0] # RGBA for pad canvases and JPEG flattening
//! preserve_exif = false           # copy source EXIF into PNG/JPEG/WebP output
//!
//! [geometry]
//! aspect_tolerance = 0.01         # aspect ratios closer than this skip cropping
//!
//! [processing]
//! max_processes = 4               # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Background, DEFAULT_ASPECT_TOLERANCE, OutputFormat, Quality, Strategy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "preset-resize.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Optimizer configuration loaded from `preset-resize.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizerConfig {
    /// Output settings used when a request does not override them.
    pub defaults: DefaultsConfig,
    /// Geometry constants.
    pub geometry: GeometryConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl OptimizerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.defaults.quality) {
            return Err(ConfigError::Validation(
                "defaults.quality must be 1-100".into(),
            ));
        }
        let tolerance = self.geometry.aspect_tolerance;
        if !(tolerance > 0.0 && tolerance < 1.0) {
            return Err(ConfigError::Validation(
                "geometry.aspect_tolerance must be greater than 0 and less than 1".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Per-request defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsConfig {
    /// Lossy quality, 1-100. Kept raw here so out-of-range values are
    /// reported instead of clamped.
    pub quality: u32,
    pub format: OutputFormat,
    pub strategy: Strategy,
    /// Spend extra effort on smaller lossless output.
    pub optimize: bool,
    pub background: Background,
    /// Copy the source's EXIF block into outputs that can hold one.
    pub preserve_exif: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            quality: 95,
            format: OutputFormat::Png,
            strategy: Strategy::CropCenter,
            optimize: true,
            background: Background::TRANSPARENT,
            preserve_exif: false,
        }
    }
}

impl DefaultsConfig {
    pub fn quality(&self) -> Quality {
        Quality::new(self.quality)
    }
}

/// Geometry constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeometryConfig {
    /// Crop-box aspect epsilon.
    pub aspect_tolerance: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            aspect_tolerance: DEFAULT_ASPECT_TOLERANCE,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel batch workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Worker count for batch jobs: `max_processes` clamped to `1..=cores`, or
/// every core when unset.
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = available_cores();
    match config.max_processes {
        Some(n) => n.clamp(1, cores),
        None => cores,
    }
}

fn available_cores() -> usize {
    std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(OptimizerConfig::default())?)
}

/// Layer `overlay` over `base`.
///
/// Tables merge per key, recursively; any other overlay value replaces what
/// `base` had at that key.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    let mut merged = base;
    merge_into(&mut merged, overlay);
    merged
}

fn merge_into(slot: &mut toml::Value, overlay: toml::Value) {
    match (slot, overlay) {
        (toml::Value::Table(table), toml::Value::Table(layer)) => {
            for (key, value) in layer {
                match table.get_mut(&key) {
                    Some(existing) => merge_into(existing, value),
                    None => {
                        table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Read a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<OptimizerConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: OptimizerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when it is absent.
///
/// Rejects unknown keys and validates the result.
pub fn load_config(path: &Path) -> Result<OptimizerConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    if overlay.is_some() {
        tracing::debug!(path = %path.display(), "loaded config file");
    }
    resolve_config(overlay)
}

/// Returns a fully-commented stock `preset-resize.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# preset-resize configuration
# ===========================
# Place this file as preset-resize.toml in the working directory, or pass
# --config <path>. All keys are optional; omitted keys keep the values below.

[defaults]
# Quality for lossy formats (jpeg, webp), 1-100. Ignored by lossless formats.
quality = 95

# Output format: png, jpeg, webp, ico, bmp, tiff
format = "png"

# Aspect-ratio strategy:
#   fit          fit inside the box, one side may come out smaller
#   fill         cover the box, center-crop the excess
#   crop_center  crop to the target aspect from the center, then scale
#   crop_top     ... keeping the top
#   crop_bottom  ... keeping the bottom
#   crop_left    ... keeping the left side
#   crop_right   ... keeping the right side
#   crop_smart   same as crop_center (no content detection)
#   stretch      scale to the exact box, distorting if needed
#   pad          fit, then pad to the exact box with `background`
#   thumbnail    fit, but never larger than the source
strategy = "crop_center"

# Slower, smaller PNG output.
optimize = true

# RGBA background for pad canvases. JPEG output is flattened onto its RGB.
background = [255, 255, 255, 0]

# Copy the source image's EXIF block into PNG, JPEG, and WebP outputs.
# Orientation is copied as-is; pixels are not rotated.
preserve_exif = false

[geometry]
# Source and target aspect ratios closer than this are treated as equal and
# the crop step is skipped. Must be greater than 0 and less than 1.
aspect_tolerance = 0.01

[processing]
# Maximum parallel workers for batch jobs. Omit for one per CPU core.
# max_processes = 4
"##
}
