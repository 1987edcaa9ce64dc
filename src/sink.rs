//! Where encoded bytes go.
//!
//! The [`OutputSink`] trait is the single seam between the engine and the
//! filesystem. Production code uses [`FsSink`], which creates missing parent
//! directories and replaces the destination atomically: bytes land in a
//! temporary file in the same directory and are renamed into place, so a
//! failed or interrupted write never leaves a truncated image behind.

use crate::error::OptimizeError;
use std::io::Write;
use std::path::Path;

/// Destination for encoded images.
///
/// Implementations must be `Sync` so a batch can be fanned out over a thread
/// pool against one shared sink.
pub trait OutputSink: Sync {
    /// Store `bytes` at `path`, replacing anything already there.
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), OptimizeError>;
}

/// Writes to the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSink;

impl OutputSink for FsSink {
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), OptimizeError> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote output");
        Ok(())
    }
}
