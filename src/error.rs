//! Error taxonomy for the resize engine.
//!
//! Every fallible engine operation returns [`OptimizeError`]. The batch layer
//! never lets one of these escape across item boundaries: each error is folded
//! into a failed [`OptimizationResult`](crate::optimize::OptimizationResult)
//! together with its [`ErrorKind`], so callers can branch on the kind without
//! parsing messages.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Why a preset lookup missed.
///
/// Distinguishes an unknown platform from an unknown preset under a known
/// platform so diagnostics can say which key was wrong.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PresetMiss {
    #[error("Unknown platform: {platform}")]
    UnknownPlatform { platform: String },
    #[error("Unknown preset: {platform}/{name}")]
    UnknownPreset { platform: String, name: String },
}

#[derive(Error, Debug)]
pub enum OptimizeError {
    #[error("Image not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to decode {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },
    #[error("Invalid target: {0}")]
    InvalidTarget(String),
    #[error("{0}")]
    PresetNotFound(#[from] PresetMiss),
    #[error("{format} encode failed: {message}")]
    Encode { format: &'static str, message: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl OptimizeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OptimizeError::NotFound(_) => ErrorKind::NotFound,
            OptimizeError::Decode { .. } => ErrorKind::Decode,
            OptimizeError::InvalidTarget(_) => ErrorKind::InvalidTarget,
            OptimizeError::PresetNotFound(_) => ErrorKind::PresetNotFound,
            OptimizeError::Encode { .. } => ErrorKind::Encode,
            OptimizeError::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn encode(format: &'static str, err: impl std::fmt::Display) -> Self {
        OptimizeError::Encode {
            format,
            message: err.to_string(),
        }
    }
}

/// Flat discriminant of [`OptimizeError`], carried by failed results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Decode,
    InvalidTarget,
    PresetNotFound,
    Encode,
    Io,
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_miss_messages_name_the_missing_key() {
        let platform = PresetMiss::UnknownPlatform {
            platform: "myspace".into(),
        };
        assert_eq!(platform.to_string(), "Unknown platform: myspace");

        let preset = PresetMiss::UnknownPreset {
            platform: "ios".into(),
            name: "icon_9000".into(),
        };
        assert_eq!(preset.to_string(), "Unknown preset: ios/icon_9000");
    }

    #[test]
    fn kind_follows_variant() {
        let err = OptimizeError::from(PresetMiss::UnknownPlatform {
            platform: "x".into(),
        });
        assert_eq!(err.kind(), ErrorKind::PresetNotFound);
        assert_eq!(
            OptimizeError::InvalidTarget("0x10".into()).kind(),
            ErrorKind::InvalidTarget
        );
        let io = OptimizeError::from(std::io::Error::other("disk full"));
        assert_eq!(io.kind(), ErrorKind::Io);
    }
}
