//! End-to-end scenarios through the public API and the filesystem sink.
//!
//! Sources are synthesized with the `image` crate and written into a temp
//! directory, then loaded back the way the CLI loads them.

use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use preset_resize::error::ErrorKind;
use preset_resize::imaging::{
    Background, OutputFormat, SourceImage, Strategy, TargetSpec, load_source,
};
use preset_resize::optimize::{BatchItem, Optimizer, OutputTarget, Overrides};
use preset_resize::output::Summary;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_source(dir: &Path, name: &str, img: DynamicImage) -> PathBuf {
    let path = dir.join(name);
    img.save_with_format(&path, ImageFormat::Png).unwrap();
    path
}

fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 90])
    }))
}

fn load(path: &Path) -> SourceImage {
    load_source(path).unwrap()
}

fn decoded(path: &Path) -> DynamicImage {
    image::open(path).unwrap()
}

// =========================================================================
// Preset batches
// =========================================================================

#[test]
fn ios_batch_with_one_bad_name_keeps_order() {
    let tmp = TempDir::new().unwrap();
    let src = write_source(tmp.path(), "logo.png", gradient(1500, 1500));
    let out = tmp.path().join("icons");

    let mut keys = vec![
        ("ios", "icon_1024"),
        ("ios", "icon_180"),
        ("ios", "icon_167"),
        ("ios", "icon_152"),
        ("ios", "icon_120"),
        ("ios", "icon_9999"),
        ("ios", "icon_87"),
    ];
    keys.push(("ios", "icon_80"));
    let items = BatchItem::presets(&keys);

    let results = Optimizer::new().batch_optimize(
        &load(&src),
        &items,
        &OutputTarget::Directory(out.clone()),
        &Overrides::default(),
    );

    assert_eq!(results.len(), keys.len());
    let summary = Summary::from_results(&results);
    assert_eq!(summary.succeeded, keys.len() - 1);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].index, 5);
    assert_eq!(summary.failures[0].kind, Some(ErrorKind::PresetNotFound));
    assert_eq!(results[5].original_size, (1500, 1500));

    let written = decoded(&out.join("ios_icon_180.png"));
    assert_eq!(written.dimensions(), (180, 180));
    assert!(!out.join("ios_icon_9999.png").exists());
}

#[test]
fn full_ios_set_writes_every_icon() {
    let tmp = TempDir::new().unwrap();
    let src = write_source(tmp.path(), "logo.png", gradient(1200, 1000));
    let out = tmp.path().join("ios");

    let results = Optimizer::new().generate_all_ios_icons(&load(&src), &out, None);

    assert_eq!(results.len(), 13);
    assert!(results.iter().all(|r| r.success));
    for r in &results {
        let path = r.output_path.as_ref().unwrap();
        assert_eq!(decoded(path).dimensions(), r.new_size);
        assert_eq!(r.format, Some(OutputFormat::Png));
    }
}

// =========================================================================
// Strategies end to end
// =========================================================================

#[test]
fn pad_to_jpeg_fills_background() {
    let tmp = TempDir::new().unwrap();
    let red = RgbaImage::from_pixel(200, 100, Rgba([220, 20, 20, 255]));
    let src = write_source(tmp.path(), "banner.png", DynamicImage::ImageRgba8(red));
    let output = tmp.path().join("square.jpg");

    let overrides = Overrides {
        strategy: Some(Strategy::Pad),
        format: Some(OutputFormat::Jpeg),
        background: Some(Background([0, 0, 0, 255])),
        ..Overrides::default()
    };
    let result = Optimizer::new().optimize_image(&src, 100, 100, Some(&output), &overrides);

    assert!(result.success, "{}", result.message);
    assert_eq!(result.new_size, (100, 100));
    let img = decoded(&output).to_rgb8();
    let corner = img.get_pixel(2, 2);
    assert!(corner.0.iter().all(|&c| c < 30), "corner {corner:?}");
    let center = img.get_pixel(50, 50);
    assert!(center[0] > 180 && center[1] < 60, "center {center:?}");
}

#[test]
fn crop_smart_matches_crop_center() {
    let tmp = TempDir::new().unwrap();
    let src = load(&write_source(tmp.path(), "wide.png", gradient(640, 360)));
    let optimizer = Optimizer::new();

    let render = |strategy: Strategy, name: &str| {
        let spec = TargetSpec::new(200, 200).with_strategy(strategy);
        let path = tmp.path().join(name);
        let r = optimizer.optimize_raster(&src, &spec, &path);
        assert!(r.success, "{}", r.message);
        decoded(&path).to_rgb8()
    };

    assert_eq!(
        render(Strategy::CropSmart, "smart.png"),
        render(Strategy::CropCenter, "center.png")
    );
}

#[test]
fn thumbnail_never_upscales() {
    let tmp = TempDir::new().unwrap();
    let src = write_source(tmp.path(), "small.png", gradient(120, 80));
    let overrides = Overrides {
        strategy: Some(Strategy::Thumbnail),
        ..Overrides::default()
    };

    let result = Optimizer::new().optimize_image(&src, 400, 400, None, &overrides);

    assert!(result.success, "{}", result.message);
    assert_eq!(result.new_size, (120, 80));
    let output = tmp.path().join("small_optimized.png");
    assert_eq!(result.output_path.as_deref(), Some(output.as_path()));
    assert_eq!(decoded(&output).dimensions(), (120, 80));
}

#[test]
fn fit_linkedin_post_keeps_aspect() {
    let tmp = TempDir::new().unwrap();
    let src = load(&write_source(tmp.path(), "photo.png", gradient(2000, 1000)));
    let overrides = Overrides {
        strategy: Some(Strategy::Fit),
        ..Overrides::default()
    };

    let result =
        Optimizer::new().optimize_for_preset(&src, "linkedin", "post_image", None, &overrides);

    assert!(result.success, "{}", result.message);
    assert_eq!(result.new_size, (1200, 600));
    let output = tmp.path().join("photo_linkedin_post_image.png");
    assert_eq!(decoded(&output).dimensions(), (1200, 600));
}

#[test]
fn missing_source_is_reported_not_raised() {
    let tmp = TempDir::new().unwrap();
    let result = Optimizer::new().optimize_image(
        &tmp.path().join("nope.png"),
        10,
        10,
        None,
        &Overrides::default(),
    );
    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::NotFound));
}

// =========================================================================
// Parallel fan-out
// =========================================================================

#[test]
fn parallel_items_match_sequential_order() {
    let tmp = TempDir::new().unwrap();
    let src = load(&write_source(tmp.path(), "art.png", gradient(800, 600)));
    let optimizer = Optimizer::new();

    let mut items = BatchItem::presets(&[
        ("web", "favicon_16"),
        ("web", "favicon_32"),
        ("web", "og_image"),
        ("nowhere", "thing"),
        ("twitter", "header_photo"),
    ]);
    items.push(BatchItem::Target(
        TargetSpec::new(64, 48).with_format(OutputFormat::Webp),
    ));

    let parallel_out = OutputTarget::Directory(tmp.path().join("par"));
    let parallel: Vec<_> = items
        .par_iter()
        .map(|item| optimizer.optimize_item(&src, item, &parallel_out, &Overrides::default()))
        .collect();
    let sequential = optimizer.batch_optimize(
        &src,
        &items,
        &OutputTarget::Directory(tmp.path().join("seq")),
        &Overrides::default(),
    );

    assert_eq!(parallel.len(), items.len());
    for (p, s) in parallel.iter().zip(&sequential) {
        assert_eq!(p.success, s.success);
        assert_eq!(p.new_size, s.new_size);
        assert_eq!(p.error_kind, s.error_kind);
    }
    assert_eq!(parallel[3].error_kind, Some(ErrorKind::PresetNotFound));
    assert_eq!(
        parallel[5].output_path.as_deref(),
        Some(tmp.path().join("par").join("art_64x48.webp").as_path())
    );
}
