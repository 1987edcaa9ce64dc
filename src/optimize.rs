//! Batch orchestration: presets and explicit targets to written files.
//!
//! [`Optimizer`] ties the pieces together for each target: resolve the preset,
//! build a [`TargetSpec`] from request overrides and configured defaults,
//! resize, encode, and hand the bytes to an [`OutputSink`]. Every outcome,
//! success or failure, becomes an [`OptimizationResult`]; no error escapes a
//! single target, so one bad preset name or failed encode never aborts the
//! rest of a batch.
//!
//! ## Output naming
//!
//! | Request | Output |
//! |---|---|
//! | preset, into a directory | `{dir}/{platform}_{name}.{ext}` |
//! | preset, beside the source | `{stem}_{platform}_{name}.{ext}` |
//! | explicit target | `{stem}_{w}x{h}.{ext}` |
//! | single explicit size, no path | `{stem}_optimized.{ext}` |
//!
//! The optimizer does not manage concurrency. Batches run sequentially;
//! callers that want parallelism fan out over [`Optimizer::optimize_item`],
//! which is safe because each target works on its own copy of the source.

use crate::config::{DefaultsConfig, OptimizerConfig};
use crate::error::{ErrorKind, OptimizeError};
use crate::imaging::{
    Background, EncodeOptions, OutputFormat, Quality, Resizer, Sharpening, SourceImage, Strategy,
    TargetSpec, encode_with, load_source,
};
use crate::presets;
use crate::sink::{FsSink, OutputSink};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// Outcome of one target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationResult {
    pub success: bool,
    /// Where the output was written. Absent on failure.
    pub output_path: Option<PathBuf>,
    pub original_size: (u32, u32),
    pub new_size: (u32, u32),
    pub original_file_size: u64,
    pub new_file_size: u64,
    pub format: Option<OutputFormat>,
    pub strategy: Option<Strategy>,
    pub message: String,
    /// Failure category, for callers that branch on it.
    pub error_kind: Option<ErrorKind>,
}

impl OptimizationResult {
    /// A failed result for `err`, keeping whatever is known about the source.
    pub fn failure(source: Option<&SourceImage>, err: &OptimizeError) -> Self {
        Self::failed(source, err.to_string(), err.kind())
    }

    /// A failed result for an item skipped by cancellation.
    pub fn cancelled(source: &SourceImage) -> Self {
        Self::failed(Some(source), "cancelled".to_string(), ErrorKind::Cancelled)
    }

    fn failed(source: Option<&SourceImage>, message: String, kind: ErrorKind) -> Self {
        let (original_size, original_file_size) = source
            .map(|s| (s.raster.dimensions(), s.byte_size))
            .unwrap_or(((0, 0), 0));
        Self {
            success: false,
            output_path: None,
            original_size,
            new_size: (0, 0),
            original_file_size,
            new_file_size: 0,
            format: None,
            strategy: None,
            message,
            error_kind: Some(kind),
        }
    }

    /// Percentage by which the output is smaller than the source file.
    ///
    /// Zero when the source size is unknown; negative when the output grew.
    pub fn size_reduction_percent(&self) -> f64 {
        if self.original_file_size == 0 {
            return 0.0;
        }
        (self.original_file_size as f64 - self.new_file_size as f64)
            / self.original_file_size as f64
            * 100.0
    }
}

/// Per-request settings that take precedence over configured defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Overrides {
    pub strategy: Option<Strategy>,
    pub format: Option<OutputFormat>,
    pub quality: Option<Quality>,
    pub background: Option<Background>,
    pub sharpening: Option<Sharpening>,
}

/// One entry of a batch request.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchItem {
    /// A registry preset, resolved at run time.
    Preset { platform: String, name: String },
    /// An explicit target, used exactly as given.
    Target(TargetSpec),
}

impl BatchItem {
    pub fn preset(platform: impl Into<String>, name: impl Into<String>) -> Self {
        BatchItem::Preset {
            platform: platform.into(),
            name: name.into(),
        }
    }

    /// Items for a list of `(platform, preset)` keys.
    pub fn presets(keys: &[(&str, &str)]) -> Vec<Self> {
        keys.iter().map(|&(p, n)| Self::preset(p, n)).collect()
    }
}

/// Where batch outputs are placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// `{dir}/{platform}_{name}.{ext}`, or `{dir}/{stem}_{w}x{h}.{ext}` for explicit targets.
    Directory(PathBuf),
    /// Next to the source file, prefixed with its stem.
    BesideSource,
}

/// Drives resize + encode + write for single targets and batches.
pub struct Optimizer<S: OutputSink = FsSink> {
    defaults: DefaultsConfig,
    resizer: Resizer,
    sink: S,
}

impl Optimizer<FsSink> {
    /// Stock defaults, writing to the filesystem.
    pub fn new() -> Self {
        Self::from_config(&OptimizerConfig::default(), FsSink)
    }
}

impl Default for Optimizer<FsSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: OutputSink> Optimizer<S> {
    pub fn from_config(config: &OptimizerConfig, sink: S) -> Self {
        Self {
            defaults: config.defaults.clone(),
            resizer: Resizer::new(config.geometry.aspect_tolerance),
            sink,
        }
    }

    /// Stock defaults with a custom sink.
    pub fn with_sink(sink: S) -> Self {
        Self::from_config(&OptimizerConfig::default(), sink)
    }

    pub fn defaults(&self) -> &DefaultsConfig {
        &self.defaults
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Build the spec for a `width` x `height` target from overrides and defaults.
    pub fn target_spec(&self, width: u32, height: u32, overrides: &Overrides) -> TargetSpec {
        TargetSpec {
            width,
            height,
            strategy: overrides.strategy.unwrap_or(self.defaults.strategy),
            background: overrides.background.unwrap_or(self.defaults.background),
            format: overrides.format.unwrap_or(self.defaults.format),
            quality: overrides.quality.unwrap_or_else(|| self.defaults.quality()),
            sharpening: overrides.sharpening,
        }
    }

    fn output_format(&self, overrides: &Overrides) -> OutputFormat {
        overrides.format.unwrap_or(self.defaults.format)
    }

    /// Resize, encode, and write one target.
    pub fn render(
        &self,
        source: &SourceImage,
        spec: &TargetSpec,
        output: &Path,
    ) -> Result<OptimizationResult, OptimizeError> {
        let resized = self.resizer.apply(&source.raster, spec)?;
        let options = EncodeOptions {
            quality: spec.quality,
            background: spec.background,
            optimize: self.defaults.optimize,
            exif: source
                .exif
                .as_deref()
                .filter(|_| self.defaults.preserve_exif),
        };
        let bytes = encode_with(&resized, spec.format, &options)?;
        self.sink.write(output, &bytes)?;

        Ok(OptimizationResult {
            success: true,
            output_path: Some(output.to_path_buf()),
            original_size: source.raster.dimensions(),
            new_size: resized.dimensions(),
            original_file_size: source.byte_size,
            new_file_size: bytes.len() as u64,
            format: Some(spec.format),
            strategy: Some(spec.strategy),
            message: "Image optimized successfully".to_string(),
            error_kind: None,
        })
    }

    /// [`render`](Self::render), with any error folded into a failed result.
    pub fn optimize_raster(
        &self,
        source: &SourceImage,
        spec: &TargetSpec,
        output: &Path,
    ) -> OptimizationResult {
        self.render(source, spec, output).unwrap_or_else(|err| {
            tracing::warn!(output = %output.display(), error = %err, "target failed");
            OptimizationResult::failure(Some(source), &err)
        })
    }

    /// Load `path` and produce one `width` x `height` output.
    ///
    /// Without an explicit `output`, writes `{stem}_optimized.{ext}` next to
    /// the source.
    pub fn optimize_image(
        &self,
        path: &Path,
        width: u32,
        height: u32,
        output: Option<&Path>,
        overrides: &Overrides,
    ) -> OptimizationResult {
        let source = match load_source(path) {
            Ok(source) => source,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "cannot load source");
                return OptimizationResult::failure(None, &err);
            }
        };
        self.optimize_size(&source, width, height, output, overrides)
    }

    /// Produce one `width` x `height` output from an already-decoded source.
    ///
    /// Without an explicit `output`, writes `{stem}_optimized.{ext}` next to
    /// the source.
    pub fn optimize_size(
        &self,
        source: &SourceImage,
        width: u32,
        height: u32,
        output: Option<&Path>,
        overrides: &Overrides,
    ) -> OptimizationResult {
        let spec = self.target_spec(width, height, overrides);
        let output = output.map(Path::to_path_buf).unwrap_or_else(|| {
            beside(
                source,
                &format!("{}_optimized.{}", source.stem(), spec.format.extension()),
            )
        });
        self.optimize_raster(source, &spec, &output)
    }

    /// Produce the `platform/name` preset from an already-decoded source.
    ///
    /// An unknown platform or preset yields a failed result with
    /// [`ErrorKind::PresetNotFound`]. Without an explicit `output`, writes
    /// `{stem}_{platform}_{name}.{ext}` next to the source.
    pub fn optimize_for_preset(
        &self,
        source: &SourceImage,
        platform: &str,
        name: &str,
        output: Option<&Path>,
        overrides: &Overrides,
    ) -> OptimizationResult {
        let preset = match presets::lookup(platform, name) {
            Ok(preset) => preset,
            Err(miss) => {
                tracing::warn!(%platform, %name, "{miss}");
                return OptimizationResult::failure(Some(source), &OptimizeError::from(miss));
            }
        };
        let spec = self.target_spec(preset.width, preset.height, overrides);
        let output = output.map(Path::to_path_buf).unwrap_or_else(|| {
            beside(
                source,
                &format!(
                    "{}_{}_{}.{}",
                    source.stem(),
                    preset.platform,
                    preset.name,
                    spec.format.extension()
                ),
            )
        });
        self.optimize_raster(source, &spec, &output)
    }

    /// Produce one batch item. Safe to call concurrently for different items.
    pub fn optimize_item(
        &self,
        source: &SourceImage,
        item: &BatchItem,
        output: &OutputTarget,
        overrides: &Overrides,
    ) -> OptimizationResult {
        match item {
            BatchItem::Preset { platform, name } => {
                let path = match output {
                    OutputTarget::Directory(dir) => Some(dir.join(format!(
                        "{}_{}.{}",
                        platform.to_ascii_lowercase(),
                        name,
                        self.output_format(overrides).extension()
                    ))),
                    OutputTarget::BesideSource => None,
                };
                self.optimize_for_preset(source, platform, name, path.as_deref(), overrides)
            }
            BatchItem::Target(spec) => {
                let file = format!(
                    "{}_{}x{}.{}",
                    source.stem(),
                    spec.width,
                    spec.height,
                    spec.format.extension()
                );
                let path = match output {
                    OutputTarget::Directory(dir) => dir.join(file),
                    OutputTarget::BesideSource => beside(source, &file),
                };
                self.optimize_raster(source, spec, &path)
            }
        }
    }

    /// Produce every item, in request order.
    ///
    /// The result list always has one entry per item.
    pub fn batch_optimize(
        &self,
        source: &SourceImage,
        items: &[BatchItem],
        output: &OutputTarget,
        overrides: &Overrides,
    ) -> Vec<OptimizationResult> {
        self.batch_optimize_cancellable(source, items, output, overrides, &AtomicBool::new(false))
    }

    /// [`batch_optimize`](Self::batch_optimize) that checks `cancel` between
    /// items.
    ///
    /// Items not started when `cancel` is set become failed results with
    /// [`ErrorKind::Cancelled`]. An item already in progress runs to completion.
    pub fn batch_optimize_cancellable(
        &self,
        source: &SourceImage,
        items: &[BatchItem],
        output: &OutputTarget,
        overrides: &Overrides,
        cancel: &AtomicBool,
    ) -> Vec<OptimizationResult> {
        let results: Vec<_> = items
            .iter()
            .map(|item| {
                if cancel.load(Ordering::Relaxed) {
                    OptimizationResult::cancelled(source)
                } else {
                    self.optimize_item(source, item, output, overrides)
                }
            })
            .collect();

        tracing::info!(
            succeeded = results.iter().filter(|r| r.success).count(),
            total = results.len(),
            "batch complete"
        );
        results
    }

    // =========================================================================
    // Convenience batches
    // =========================================================================

    /// Every iOS icon size as PNG, `crop_center` unless `strategy` is given.
    pub fn generate_all_ios_icons(
        &self,
        source: &SourceImage,
        output_dir: &Path,
        strategy: Option<Strategy>,
    ) -> Vec<OptimizationResult> {
        self.generate_platform(source, "ios", output_dir, strategy)
    }

    /// Every Android icon size as PNG, `crop_center` unless `strategy` is given.
    pub fn generate_all_android_icons(
        &self,
        source: &SourceImage,
        output_dir: &Path,
        strategy: Option<Strategy>,
    ) -> Vec<OptimizationResult> {
        self.generate_platform(source, "android", output_dir, strategy)
    }

    fn generate_platform(
        &self,
        source: &SourceImage,
        platform: &str,
        output_dir: &Path,
        strategy: Option<Strategy>,
    ) -> Vec<OptimizationResult> {
        let items: Vec<_> = presets::presets_for(platform)
            .unwrap_or_default()
            .into_iter()
            .map(|p| BatchItem::preset(p.platform, p.name))
            .collect();
        self.batch_optimize(
            source,
            &items,
            &OutputTarget::Directory(output_dir.to_path_buf()),
            &png_overrides(strategy),
        )
    }

    /// `profile_photo` for each of `platforms` that has one.
    ///
    /// Defaults to linkedin, twitter, facebook, and instagram. Platforms
    /// without a `profile_photo` preset are skipped, not reported as failures.
    pub fn generate_social_profile_images(
        &self,
        source: &SourceImage,
        output_dir: &Path,
        platforms: Option<&[&str]>,
        strategy: Option<Strategy>,
    ) -> Vec<OptimizationResult> {
        const DEFAULT_PLATFORMS: [&str; 4] = ["linkedin", "twitter", "facebook", "instagram"];
        let items: Vec<_> = platforms
            .unwrap_or(&DEFAULT_PLATFORMS)
            .iter()
            .filter(|p| presets::lookup(p, "profile_photo").is_ok())
            .map(|p| BatchItem::preset(*p, "profile_photo"))
            .collect();
        self.batch_optimize(
            source,
            &items,
            &OutputTarget::Directory(output_dir.to_path_buf()),
            &png_overrides(strategy),
        )
    }

    /// The web favicon set (16, 32, 192, 512, and the Apple touch icon).
    pub fn generate_favicons(
        &self,
        source: &SourceImage,
        output_dir: &Path,
        format: Option<OutputFormat>,
    ) -> Vec<OptimizationResult> {
        let items = BatchItem::presets(&[
            ("web", "favicon_16"),
            ("web", "favicon_32"),
            ("web", "favicon_192"),
            ("web", "favicon_512"),
            ("web", "apple_touch_icon"),
        ]);
        let overrides = Overrides {
            format,
            ..Overrides::default()
        };
        self.batch_optimize(
            source,
            &items,
            &OutputTarget::Directory(output_dir.to_path_buf()),
            &overrides,
        )
    }
}

fn png_overrides(strategy: Option<Strategy>) -> Overrides {
    Overrides {
        strategy: Some(strategy.unwrap_or(Strategy::CropCenter)),
        format: Some(OutputFormat::Png),
        ..Overrides::default()
    }
}

/// `file` in the source's directory; relative to the working directory for
/// in-memory sources.
fn beside(source: &SourceImage, file: &str) -> PathBuf {
    source
        .path
        .as_deref()
        .and_then(Path::parent)
        .unwrap_or_else(|| Path::new(""))
        .join(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::tests::MemorySink;
    use crate::test_helpers::{gradient_rgb, gradient_rgba, write_png};
    use image::ImageFormat;

    fn source(w: u32, h: u32) -> SourceImage {
        SourceImage::from_raster(gradient_rgb(w, h))
    }

    fn memory_optimizer() -> Optimizer<MemorySink> {
        Optimizer::with_sink(MemorySink::new())
    }

    fn out_dir() -> OutputTarget {
        OutputTarget::Directory(PathBuf::from("out"))
    }

    // =========================================================================
    // OptimizationResult
    // =========================================================================

    #[test]
    fn size_reduction_guards_zero_original() {
        let mut result = OptimizationResult::failure(
            None,
            &OptimizeError::InvalidTarget("x".into()),
        );
        assert_eq!(result.size_reduction_percent(), 0.0);

        result.original_file_size = 1000;
        result.new_file_size = 250;
        assert_eq!(result.size_reduction_percent(), 75.0);
    }

    #[test]
    fn failure_carries_kind_and_no_output() {
        let result = OptimizationResult::failure(
            Some(&source(10, 20)),
            &OptimizeError::InvalidTarget("0x10".into()),
        );
        assert!(!result.success);
        assert_eq!(result.output_path, None);
        assert_eq!(result.original_size, (10, 20));
        assert_eq!(result.error_kind, Some(ErrorKind::InvalidTarget));
    }

    // =========================================================================
    // Single targets
    // =========================================================================

    #[test]
    fn target_spec_prefers_overrides() {
        let opt = memory_optimizer();
        let spec = opt.target_spec(10, 20, &Overrides::default());
        assert_eq!(spec.strategy, Strategy::CropCenter);
        assert_eq!(spec.format, OutputFormat::Png);
        assert_eq!(spec.quality, Quality::new(95));

        let overrides = Overrides {
            strategy: Some(Strategy::Fit),
            format: Some(OutputFormat::Webp),
            quality: Some(Quality::new(60)),
            ..Overrides::default()
        };
        let spec = opt.target_spec(10, 20, &overrides);
        assert_eq!(spec.strategy, Strategy::Fit);
        assert_eq!(spec.format, OutputFormat::Webp);
        assert_eq!(spec.quality, Quality::new(60));
    }

    #[test]
    fn preset_success_records_sizes() {
        let opt = memory_optimizer();
        let result = opt.optimize_for_preset(
            &source(1024, 768),
            "linkedin",
            "app_logo",
            None,
            &Overrides::default(),
        );
        assert!(result.success, "{}", result.message);
        assert_eq!(result.new_size, (180, 180));
        assert_eq!(result.original_size, (1024, 768));
        assert_eq!(result.format, Some(OutputFormat::Png));
        assert_eq!(result.strategy, Some(Strategy::CropCenter));
        assert_eq!(
            result.output_path.as_deref(),
            Some(Path::new("image_linkedin_app_logo.png"))
        );
        let written = opt.sink().bytes_for(Path::new("image_linkedin_app_logo.png")).unwrap();
        assert_eq!(written.len() as u64, result.new_file_size);
    }

    #[test]
    fn preset_miss_is_a_failed_result() {
        let opt = memory_optimizer();
        let result =
            opt.optimize_for_preset(&source(64, 64), "ios", "icon_9999", None, &Overrides::default());
        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::PresetNotFound));
        assert_eq!(result.message, "Unknown preset: ios/icon_9999");
        assert!(opt.sink().paths().is_empty());

        let result =
            opt.optimize_for_preset(&source(64, 64), "myspace", "x", None, &Overrides::default());
        assert_eq!(result.message, "Unknown platform: myspace");
    }

    #[test]
    fn optimize_image_missing_file_is_not_found() {
        let opt = memory_optimizer();
        let result = opt.optimize_image(
            Path::new("/nonexistent/logo.png"),
            100,
            100,
            None,
            &Overrides::default(),
        );
        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::NotFound));
        assert_eq!(result.original_file_size, 0);
    }

    #[test]
    fn optimize_image_defaults_to_optimized_suffix_beside_source() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("logo.png");
        write_png(&path, &gradient_rgb(200, 100));

        let result = Optimizer::new().optimize_image(&path, 50, 50, None, &Overrides::default());
        assert!(result.success, "{}", result.message);
        let expected = tmp.path().join("logo_optimized.png");
        assert_eq!(result.output_path.as_deref(), Some(expected.as_path()));
        assert_eq!(image::image_dimensions(&expected).unwrap(), (50, 50));
        assert_eq!(result.original_file_size, std::fs::metadata(&path).unwrap().len());
    }

    #[test]
    fn optimize_size_names_output_beside_decoded_source() {
        let opt = memory_optimizer();
        let src = SourceImage {
            path: Some(PathBuf::from("art/logo.png")),
            ..source(200, 100)
        };
        let overrides = Overrides {
            format: Some(OutputFormat::Webp),
            ..Overrides::default()
        };

        let result = opt.optimize_size(&src, 64, 64, None, &overrides);
        assert!(result.success, "{}", result.message);
        let expected = Path::new("art/logo_optimized.webp");
        assert_eq!(result.output_path.as_deref(), Some(expected));
        assert!(opt.sink().bytes_for(expected).is_some());
        assert_eq!(result.new_size, (64, 64));

        let explicit = Path::new("out/exact.webp");
        let result = opt.optimize_size(&src, 64, 32, Some(explicit), &overrides);
        assert_eq!(result.output_path.as_deref(), Some(explicit));
    }

    #[test]
    fn zero_sized_target_is_invalid_target() {
        let opt = memory_optimizer();
        let result = opt.optimize_raster(
            &source(10, 10),
            &TargetSpec::new(0, 5),
            Path::new("x.png"),
        );
        assert_eq!(result.error_kind, Some(ErrorKind::InvalidTarget));
    }

    #[test]
    fn pad_to_jpeg_with_transparent_background_flattens_to_white() {
        let opt = memory_optimizer();
        let src = SourceImage::from_raster(gradient_rgba(400, 200));
        let spec = TargetSpec::new(200, 200)
            .with_strategy(Strategy::Pad)
            .with_format(OutputFormat::Jpeg)
            .with_background(Background::TRANSPARENT);
        let result = opt.optimize_raster(&src, &spec, Path::new("pad.jpeg"));
        assert!(result.success, "{}", result.message);

        let bytes = opt.sink().bytes_for(Path::new("pad.jpeg")).unwrap();
        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (200, 200));
        assert!(!decoded.color().has_alpha());
        let band = decoded.to_rgb8().get_pixel(100, 10).0;
        assert!(band.iter().all(|&c| c > 245), "expected white band, got {band:?}");
    }

    // =========================================================================
    // Batches
    // =========================================================================

    #[test]
    fn ios_batch_with_one_bad_name_keeps_going_and_order() {
        let opt = memory_optimizer();
        let mut items: Vec<_> = presets::presets_for("ios")
            .unwrap()
            .into_iter()
            .map(|p| BatchItem::preset(p.platform, p.name))
            .collect();
        items[5] = BatchItem::preset("ios", "icon_9999");

        let results = opt.batch_optimize(&source(256, 256), &items, &out_dir(), &Overrides::default());

        assert_eq!(results.len(), 13);
        assert_eq!(results.iter().filter(|r| r.success).count(), 12);
        assert_eq!(results[5].error_kind, Some(ErrorKind::PresetNotFound));
        assert_eq!(
            results[0].output_path.as_deref(),
            Some(Path::new("out/ios_icon_1024.png"))
        );
        assert_eq!(results[12].new_size, (20, 20));
        assert_eq!(opt.sink().paths().len(), 12);
    }

    #[test]
    fn write_failure_is_isolated_to_its_item() {
        let opt = Optimizer::with_sink(MemorySink::failing_on(&["out/web_favicon_32.png"]));
        let items = BatchItem::presets(&[
            ("web", "favicon_16"),
            ("web", "favicon_32"),
            ("web", "favicon_192"),
        ]);
        let results = opt.batch_optimize(&source(64, 64), &items, &out_dir(), &Overrides::default());
        let flags: Vec<_> = results.iter().map(|r| r.success).collect();
        assert_eq!(flags, vec![true, false, true]);
        assert_eq!(results[1].error_kind, Some(ErrorKind::Io));
    }

    #[test]
    fn oversized_ico_fails_only_that_target() {
        let opt = memory_optimizer();
        let items = vec![
            BatchItem::Target(TargetSpec::new(48, 48).with_format(OutputFormat::Ico)),
            BatchItem::Target(TargetSpec::new(512, 512).with_format(OutputFormat::Ico)),
        ];
        let results = opt.batch_optimize(&source(600, 600), &items, &out_dir(), &Overrides::default());
        assert!(results[0].success);
        assert_eq!(results[1].error_kind, Some(ErrorKind::Encode));
    }

    #[test]
    fn explicit_targets_are_named_by_size() {
        let opt = memory_optimizer();
        let items = vec![BatchItem::Target(
            TargetSpec::new(64, 32).with_format(OutputFormat::Webp),
        )];
        let results =
            opt.batch_optimize(&source(128, 128), &items, &OutputTarget::BesideSource, &Overrides::default());
        assert_eq!(
            results[0].output_path.as_deref(),
            Some(Path::new("image_64x32.webp"))
        );
        assert_eq!(results[0].new_size, (64, 32));
    }

    #[test]
    fn batch_beside_source_uses_preset_naming() {
        let opt = memory_optimizer();
        let items = BatchItem::presets(&[("twitter", "profile_photo")]);
        let results =
            opt.batch_optimize(&source(500, 500), &items, &OutputTarget::BesideSource, &Overrides::default());
        assert_eq!(
            results[0].output_path.as_deref(),
            Some(Path::new("image_twitter_profile_photo.png"))
        );
    }

    #[test]
    fn cancelled_batch_yields_cancelled_results() {
        let opt = memory_optimizer();
        let items = BatchItem::presets(&[("web", "favicon_16"), ("web", "favicon_32")]);
        let cancel = AtomicBool::new(true);
        let results = opt.batch_optimize_cancellable(
            &source(64, 64),
            &items,
            &out_dir(),
            &Overrides::default(),
            &cancel,
        );
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.error_kind == Some(ErrorKind::Cancelled)));
        assert!(results.iter().all(|r| r.message == "cancelled"));
        assert!(opt.sink().paths().is_empty());
    }

    // =========================================================================
    // Convenience batches
    // =========================================================================

    #[test]
    fn android_icons_are_png_in_table_order() {
        let opt = memory_optimizer();
        let results = opt.generate_all_android_icons(&source(512, 512), Path::new("icons"), None);
        assert_eq!(results.len(), 8);
        assert!(results.iter().all(|r| r.success));
        assert!(results.iter().all(|r| r.format == Some(OutputFormat::Png)));
        assert_eq!(
            results[0].output_path.as_deref(),
            Some(Path::new("icons/android_icon_xxxhdpi.png"))
        );
    }

    #[test]
    fn social_profiles_skip_platforms_without_profile_photo() {
        let opt = memory_optimizer();
        let results = opt.generate_social_profile_images(
            &source(400, 400),
            Path::new("social"),
            Some(&["twitter", "web", "instagram"]),
            None,
        );
        let sizes: Vec<_> = results.iter().map(|r| r.new_size).collect();
        assert_eq!(sizes, vec![(400, 400), (320, 320)]);
    }

    #[test]
    fn favicons_follow_requested_format() {
        let opt = memory_optimizer();
        let results =
            opt.generate_favicons(&source(512, 512), Path::new("fav"), Some(OutputFormat::Ico));
        assert_eq!(results.len(), 5);
        // 512 exceeds the ICO limit; everything else fits.
        let ok: Vec<_> = results.iter().map(|r| r.success).collect();
        assert_eq!(ok, vec![true, true, true, false, true]);
    }

    // =========================================================================
    // EXIF
    // =========================================================================

    const EXIF: &[u8] = &[b'M', b'M', 0, 42, 0, 0, 0, 8, 0, 0, 0, 0, 0, 0];

    fn exif_source() -> SourceImage {
        SourceImage {
            exif: Some(EXIF.to_vec()),
            ..source(64, 48)
        }
    }

    fn jpeg_exif(bytes: &[u8]) -> Option<Vec<u8>> {
        use image::ImageDecoder;
        image::codecs::jpeg::JpegDecoder::new(std::io::Cursor::new(bytes))
            .unwrap()
            .exif_metadata()
            .unwrap()
    }

    #[test]
    fn exif_is_dropped_unless_preserved() {
        let optimizer = memory_optimizer();
        let spec = TargetSpec::new(32, 24).with_format(OutputFormat::Jpeg);
        let out = Path::new("out/plain.jpg");
        assert!(optimizer.optimize_raster(&exif_source(), &spec, out).success);
        assert_eq!(jpeg_exif(&optimizer.sink().bytes_for(out).unwrap()), None);
    }

    #[test]
    fn preserve_exif_copies_source_block_into_jpeg() {
        let mut config = OptimizerConfig::default();
        config.defaults.preserve_exif = true;
        let optimizer = Optimizer::from_config(&config, MemorySink::new());
        let spec = TargetSpec::new(32, 24).with_format(OutputFormat::Jpeg);
        let out = Path::new("out/kept.jpg");

        assert!(optimizer.optimize_raster(&exif_source(), &spec, out).success);
        let exif = jpeg_exif(&optimizer.sink().bytes_for(out).unwrap());
        assert_eq!(exif.as_deref(), Some(EXIF));
    }

    #[test]
    fn preserved_exif_survives_a_disk_round_trip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut config = OptimizerConfig::default();
        config.defaults.preserve_exif = true;
        let optimizer = Optimizer::from_config(&config, crate::sink::FsSink);

        let first = tmp.path().join("first.jpg");
        let spec = TargetSpec::new(40, 30).with_format(OutputFormat::Jpeg);
        assert!(optimizer.optimize_raster(&exif_source(), &spec, &first).success);

        let reloaded = load_source(&first).unwrap();
        assert_eq!(reloaded.exif.as_deref(), Some(EXIF));
        let second = tmp.path().join("second.jpg");
        let spec = TargetSpec::new(20, 15).with_format(OutputFormat::Jpeg);
        assert!(optimizer.optimize_raster(&reloaded, &spec, &second).success);
        assert_eq!(load_source(&second).unwrap().exif.as_deref(), Some(EXIF));
    }
}
