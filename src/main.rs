use clap::{Parser, Subcommand};
use preset_resize::config::{self, CONFIG_FILE_NAME, OptimizerConfig};
use preset_resize::imaging::{OutputFormat, Quality, Sharpening, Strategy, image_info, load_source};
use preset_resize::optimize::{BatchItem, OptimizationResult, Optimizer, OutputTarget, Overrides};
use preset_resize::output::{self, Summary};
use preset_resize::sink::FsSink;
use preset_resize::{color, presets};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "preset-resize")]
#[command(about = "Resize images to platform size presets")]
#[command(long_about = "\
Resize images to platform size presets

Every output has an exact target box and an aspect-ratio strategy that decides
how the source gets there: crop, fit, fill, pad, stretch, or thumbnail.
Presets cover app icons (iOS, Android), social media (LinkedIn, Twitter,
Facebook, Instagram), favicons, e-commerce, app stores, and messaging apps.

Examples:
  preset-resize resize logo.png --size 180x180 -o logo_small.png
  preset-resize resize logo.png --preset linkedin/app_logo
  preset-resize resize photo.jpg --size 1200x627 --strategy pad --bg-color white
  preset-resize batch icon.png --ios-icons -d ./ios_icons
  preset-resize presets --platform android
  preset-resize find-size 180x180

Run 'preset-resize gen-config' to generate a documented preset-resize.toml.")]
#[command(version)]
struct Cli {
    /// Config file [default: ./preset-resize.toml when present]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show per-output sizes and debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Flags shared by commands that write images.
#[derive(clap::Args, Clone)]
struct OutputArgs {
    /// Aspect-ratio strategy (see `preset-resize strategies`)
    #[arg(long)]
    strategy: Option<Strategy>,

    /// Output format: png, jpeg, webp, ico, bmp, tiff
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Quality for jpeg/webp
    #[arg(short, long, value_name = "1-100", value_parser = clap::value_parser!(u32).range(1..=100))]
    quality: Option<u32>,

    /// Background for padding: a name (white, black, transparent, ...) or #RRGGBB[AA]
    #[arg(long, value_name = "COLOR")]
    bg_color: Option<String>,

    /// Apply light sharpening after downscaling
    #[arg(long)]
    sharpen: bool,

    /// Copy the source's EXIF block into PNG, JPEG, and WebP outputs
    #[arg(long)]
    preserve_exif: bool,

    /// Print results as JSON instead of text
    #[arg(long)]
    json: bool,
}

impl OutputArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            strategy: self.strategy,
            format: self.format,
            quality: self.quality.map(Quality::new),
            background: self.bg_color.as_deref().map(color::parse_color),
            sharpening: self.sharpen.then(Sharpening::light),
        }
    }

    /// Fold config-level flags into the loaded config.
    fn apply(&self, mut config: OptimizerConfig) -> OptimizerConfig {
        config.defaults.preserve_exif |= self.preserve_exif;
        config
    }
}

/// `WIDTHxHEIGHT`.
#[derive(Clone, Copy)]
struct Size {
    width: u32,
    height: u32,
}

fn parse_size(s: &str) -> Result<Size, String> {
    let invalid = || format!("invalid size '{s}', expected WIDTHxHEIGHT (e.g. 180x180)");
    let lower = s.to_ascii_lowercase();
    let (w, h) = lower.split_once('x').ok_or_else(invalid)?;
    match (w.trim().parse::<u32>(), h.trim().parse::<u32>()) {
        (Ok(width), Ok(height)) if width > 0 && height > 0 => Ok(Size { width, height }),
        _ => Err(invalid()),
    }
}

/// `PLATFORM/PRESET`, checked against the registry.
#[derive(Clone)]
struct PresetKey {
    platform: String,
    name: String,
}

fn parse_preset(s: &str) -> Result<PresetKey, String> {
    let (platform, name) = s.split_once('/').ok_or_else(|| {
        format!("invalid preset '{s}', expected PLATFORM/PRESET (e.g. linkedin/app_logo)")
    })?;
    let found = presets::lookup(platform, name).map_err(|miss| miss.to_string())?;
    Ok(PresetKey {
        platform: found.platform.to_string(),
        name: found.name.to_string(),
    })
}

#[derive(Subcommand)]
enum Command {
    /// Resize one image to an explicit size and/or presets
    Resize {
        /// Source image
        image: PathBuf,

        /// Target size as WIDTHxHEIGHT
        #[arg(short, long, value_parser = parse_size, required_unless_present = "presets")]
        size: Option<Size>,

        /// Platform preset as PLATFORM/PRESET (repeatable)
        #[arg(short = 'p', long = "preset", value_parser = parse_preset)]
        presets: Vec<PresetKey>,

        /// Output file (explicit size, or a single preset)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        args: OutputArgs,
    },
    /// Generate many sizes from one image into a directory
    Batch {
        /// Source image
        image: PathBuf,

        /// Every iOS icon size (PNG)
        #[arg(long)]
        ios_icons: bool,

        /// Every Android icon size (PNG)
        #[arg(long)]
        android_icons: bool,

        /// Profile photos for LinkedIn, Twitter, Facebook, Instagram (PNG)
        #[arg(long)]
        social_profiles: bool,

        /// Web favicon sizes
        #[arg(long)]
        favicons: bool,

        /// A named preset group (ios_icons_all, social_posts, ...)
        #[arg(long)]
        group: Vec<String>,

        /// Platform preset as PLATFORM/PRESET (repeatable)
        #[arg(short = 'p', long = "preset", value_parser = parse_preset)]
        presets: Vec<PresetKey>,

        /// Output directory
        #[arg(short = 'd', long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        args: OutputArgs,
    },
    /// List size presets
    Presets {
        /// Only this platform
        #[arg(long)]
        platform: Option<String>,
    },
    /// Find presets with an exact size
    FindSize {
        /// Size as WIDTHxHEIGHT
        #[arg(value_parser = parse_size)]
        size: Size,
    },
    /// Describe an image file
    Info {
        image: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// List aspect-ratio strategies
    Strategies,
    /// Print a stock preset-resize.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let verbose = cli.verbose;
    match cli.command {
        Command::Resize {
            image,
            size,
            presets,
            output,
            args,
        } => {
            let config = args.apply(load_config(cli.config.as_deref())?);
            let optimizer = Optimizer::from_config(&config, FsSink);
            let overrides = args.overrides();

            let source = match load_source(&image) {
                Ok(source) => source,
                Err(err) => {
                    return report(&[OptimizationResult::failure(None, &err)], verbose, args.json);
                }
            };
            let single = presets.len() == 1;
            let mut results: Vec<_> = presets
                .iter()
                .map(|key| {
                    let out = if single { output.as_deref() } else { None };
                    optimizer.optimize_for_preset(&source, &key.platform, &key.name, out, &overrides)
                })
                .collect();
            if let Some(size) = size {
                let out = if presets.is_empty() { output.as_deref() } else { None };
                results.push(optimizer.optimize_size(
                    &source,
                    size.width,
                    size.height,
                    out,
                    &overrides,
                ));
            }
            report(&results, verbose, args.json)
        }
        Command::Batch {
            image,
            ios_icons,
            android_icons,
            social_profiles,
            favicons,
            group,
            presets,
            output_dir,
            args,
        } => {
            let config = args.apply(load_config(cli.config.as_deref())?);
            init_thread_pool(&config.processing);
            let optimizer = Optimizer::from_config(&config, FsSink);

            let overrides = args.overrides();
            let icon_overrides = Overrides {
                strategy: Some(args.strategy.unwrap_or(Strategy::CropCenter)),
                format: Some(OutputFormat::Png),
                ..overrides
            };

            let mut jobs: Vec<(BatchItem, Overrides)> = Vec::new();
            if ios_icons {
                push_jobs(&mut jobs, &group_keys("ios_icons_all")?, icon_overrides);
            }
            if android_icons {
                push_jobs(&mut jobs, &group_keys("android_icons_all")?, icon_overrides);
            }
            if social_profiles {
                push_jobs(&mut jobs, &group_keys("social_profiles")?, icon_overrides);
            }
            if favicons {
                push_jobs(&mut jobs, &FAVICONS, overrides);
            }
            for name in &group {
                push_jobs(&mut jobs, &group_keys(name)?, overrides);
            }
            for key in &presets {
                push_jobs(&mut jobs, &[(key.platform.as_str(), key.name.as_str())], overrides);
            }
            if jobs.is_empty() {
                return Err("nothing to generate: pass --ios-icons, --android-icons, \
                            --social-profiles, --favicons, --group, or --preset"
                    .into());
            }

            let source = match load_source(&image) {
                Ok(source) => source,
                Err(err) => {
                    return report(&[OptimizationResult::failure(None, &err)], verbose, args.json);
                }
            };
            let target = OutputTarget::Directory(output_dir);
            if !args.json {
                println!("Generating {} images into {}", jobs.len(), target_dir(&target));
            }
            let results: Vec<_> = jobs
                .par_iter()
                .map(|(item, ov)| optimizer.optimize_item(&source, item, &target, ov))
                .collect();
            report(&results, verbose, args.json)
        }
        Command::Presets { platform } => {
            output::print_presets(platform.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
        Command::FindSize { size } => {
            let matches = presets::find_by_size(size.width, size.height);
            for line in output::format_size_matches(size.width, size.height, &matches) {
                println!("{}", line);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Info { image, json } => {
            let info = image_info(&image)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                output::print_info(&info);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Strategies => {
            for line in output::format_strategies() {
                println!("{}", line);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Print results and map them to the process exit code.
fn report(
    results: &[OptimizationResult],
    verbose: bool,
    json: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
    } else {
        output::print_results(results, verbose);
    }
    Ok(if Summary::from_results(results).all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Favicon sizes for `--favicons`; `favicon_ico` is left to `--group favicons_all`.
const FAVICONS: [(&str, &str); 5] = [
    ("web", "favicon_16"),
    ("web", "favicon_32"),
    ("web", "favicon_192"),
    ("web", "favicon_512"),
    ("web", "apple_touch_icon"),
];

fn push_jobs(jobs: &mut Vec<(BatchItem, Overrides)>, keys: &[(&str, &str)], overrides: Overrides) {
    jobs.extend(
        keys.iter()
            .map(|&(platform, name)| (BatchItem::preset(platform, name), overrides)),
    );
}

fn group_keys(name: &str) -> Result<Vec<(&'static str, &'static str)>, String> {
    presets::group(name).ok_or_else(|| {
        format!(
            "unknown group '{name}', expected one of: {}",
            presets::GROUP_NAMES.join(", ")
        )
    })
}

fn target_dir(target: &OutputTarget) -> String {
    match target {
        OutputTarget::Directory(dir) => format!("{}/", dir.display()),
        OutputTarget::BesideSource => "source directory".to_string(),
    }
}

/// Explicit `--config` must exist; the default file is optional.
fn load_config(path: Option<&Path>) -> Result<OptimizerConfig, Box<dyn std::error::Error>> {
    match path {
        Some(p) if !p.exists() => Err(format!("config file not found: {}", p.display()).into()),
        Some(p) => Ok(config::load_config(p)?),
        None => Ok(config::load_config(Path::new(CONFIG_FILE_NAME))?),
    }
}

/// Logs go to stderr; `-v` turns on debug events from this crate.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("preset_resize=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. Users can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
