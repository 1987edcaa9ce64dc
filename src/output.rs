//! Result aggregation and CLI output formatting.
//!
//! [`Summary`] folds a list of [`OptimizationResult`]s into success counts and
//! an ordered failure list. It does no transform work of its own.
//!
//! # Output Format
//!
//! ## Results
//!
//! ```text
//!   [OK] icons/ios_icon_1024.png
//!        Original: 2048x2048 (812.4 KB)
//!        New:      1024x1024 (301.7 KB)
//!        Size reduction: 62.9%
//!   [FAIL] Unknown preset: ios/icon_9999
//!
//! Completed: 12/13 successful
//! ```
//!
//! ## Presets
//!
//! ```text
//! IOS
//!     icon_1024                 1024 x 1024  (ratio: 1.00)
//!     icon_180                   180 x  180  (ratio: 1.00)
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions do no I/O.

use crate::error::{ErrorKind, PresetMiss};
use crate::imaging::{ImageInfo, Strategy};
use crate::optimize::OptimizationResult;
use crate::presets::{self, PresetSize};

// ============================================================================
// Summary
// ============================================================================

/// One failed entry of a batch, by request position.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub index: usize,
    pub message: String,
    pub kind: Option<ErrorKind>,
}

/// Success/total counts and the failures of a batch, in request order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub succeeded: usize,
    pub total: usize,
    pub failures: Vec<Failure>,
}

impl Summary {
    pub fn from_results(results: &[OptimizationResult]) -> Self {
        let failures: Vec<_> = results
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.success)
            .map(|(index, r)| Failure {
                index,
                message: r.message.clone(),
                kind: r.error_kind,
            })
            .collect();
        Self {
            succeeded: results.len() - failures.len(),
            total: results.len(),
            failures,
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

// ============================================================================
// Results
// ============================================================================

fn kb(bytes: u64) -> f64 {
    bytes as f64 / 1024.0
}

/// Format one result line, plus size details when `verbose`.
pub fn format_result(result: &OptimizationResult, verbose: bool) -> Vec<String> {
    if !result.success {
        return vec![format!("  [FAIL] {}", result.message)];
    }
    let path = result
        .output_path
        .as_deref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let mut lines = vec![format!("  [OK] {path}")];
    if verbose {
        let (ow, oh) = result.original_size;
        let (nw, nh) = result.new_size;
        lines.push(format!(
            "       Original: {ow}x{oh} ({:.1} KB)",
            kb(result.original_file_size)
        ));
        lines.push(format!(
            "       New:      {nw}x{nh} ({:.1} KB)",
            kb(result.new_file_size)
        ));
        let reduction = result.size_reduction_percent();
        if reduction > 0.0 {
            lines.push(format!("       Size reduction: {reduction:.1}%"));
        }
    }
    lines
}

/// Format the closing count line.
pub fn format_summary(summary: &Summary) -> String {
    format!(
        "Completed: {}/{} successful",
        summary.succeeded, summary.total
    )
}

/// Format every result followed by a blank line and the summary.
pub fn format_results(results: &[OptimizationResult], verbose: bool) -> Vec<String> {
    let mut lines: Vec<String> = results
        .iter()
        .flat_map(|r| format_result(r, verbose))
        .collect();
    lines.push(String::new());
    lines.push(format_summary(&Summary::from_results(results)));
    lines
}

/// Print results and summary to stdout.
pub fn print_results(results: &[OptimizationResult], verbose: bool) {
    for line in format_results(results, verbose) {
        println!("{}", line);
    }
}

// ============================================================================
// Presets
// ============================================================================

fn preset_line(preset: &PresetSize) -> String {
    format!(
        "    {:25} {:4} x {:4}  (ratio: {:.2})",
        preset.name,
        preset.width,
        preset.height,
        preset.width as f64 / preset.height as f64
    )
}

/// Format the preset table, or one platform of it.
pub fn format_presets(platform: Option<&str>) -> Result<Vec<String>, PresetMiss> {
    let keys: Vec<&str> = match platform {
        Some(p) => vec![p],
        None => presets::platforms().collect(),
    };
    let mut lines = Vec::new();
    for key in keys {
        let entries = presets::presets_for(key)?;
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(key.to_uppercase());
        lines.extend(entries.iter().map(preset_line));
    }
    Ok(lines)
}

pub fn print_presets(platform: Option<&str>) -> Result<(), PresetMiss> {
    for line in format_presets(platform)? {
        println!("{}", line);
    }
    Ok(())
}

/// Format reverse-lookup matches as `platform/name` lines.
pub fn format_size_matches(width: u32, height: u32, matches: &[PresetSize]) -> Vec<String> {
    if matches.is_empty() {
        return vec![format!("No presets are {width}x{height}")];
    }
    let mut lines = vec![format!("Presets at {width}x{height}")];
    lines.extend(
        matches
            .iter()
            .map(|p| format!("    {}/{}", p.platform, p.name)),
    );
    lines
}

/// Format the strategy list for help output.
pub fn format_strategies() -> Vec<String> {
    Strategy::ALL
        .iter()
        .map(|s| format!("    {:12} {}", s.as_str(), s.describe()))
        .collect()
}

// ============================================================================
// Image info
// ============================================================================

pub fn format_info(info: &ImageInfo) -> Vec<String> {
    vec![
        format!("Image Information: {}", info.filename),
        format!("    Path:        {}", info.path),
        format!(
            "    Format:      {}",
            info.format.as_deref().unwrap_or("unknown")
        ),
        format!("    Mode:        {}", info.mode),
        format!("    Size:        {} x {}", info.width, info.height),
        format!("    Aspect:      {}", info.aspect_ratio),
        format!("    File size:   {} KB", info.file_size_kb),
        format!("    Has alpha:   {}", info.has_alpha),
    ]
}

pub fn print_info(info: &ImageInfo) {
    for line in format_info(info) {
        println!("{}", line);
    }
}
