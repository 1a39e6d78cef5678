//! High-level image operations.
//!
//! These functions combine calculations with backend execution: they decide
//! whether a thumbnail is stale, plan its parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::params::{Quality, ThumbnailParams};
use std::path::Path;
use std::time::SystemTime;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Configuration for thumbnail generation.
#[derive(Debug, Clone)]
pub struct ThumbnailConfig {
    /// Edge of the square bounding box.
    pub max_dim: u32,
    pub quality: Quality,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            max_dim: 400,
            quality: Quality::default(),
        }
    }
}

/// What [`ensure_thumbnail`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailStatus {
    /// Existing thumbnail was at least as new as its source.
    Fresh,
    /// Thumbnail was (re)generated.
    Generated,
}

/// Plan a thumbnail operation without executing it.
pub fn plan_thumbnail(source: &Path, output: &Path, config: &ThumbnailConfig) -> ThumbnailParams {
    ThumbnailParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        max_width: config.max_dim,
        max_height: config.max_dim,
        quality: config.quality,
    }
}

/// A thumbnail needs regenerating when it is missing or older than its source.
pub fn needs_regeneration(source_modified: SystemTime, thumb_modified: Option<SystemTime>) -> bool {
    match thumb_modified {
        None => true,
        Some(thumb) => thumb < source_modified,
    }
}

/// Create `output` from `source` unless an up-to-date thumbnail already exists.
pub fn ensure_thumbnail(
    backend: &dyn ImageBackend,
    source: &Path,
    output: &Path,
    config: &ThumbnailConfig,
) -> Result<ThumbnailStatus> {
    let source_modified = std::fs::metadata(source)?.modified()?;
    let thumb_modified = std::fs::metadata(output)
        .and_then(|m| m.modified())
        .ok();

    if !needs_regeneration(source_modified, thumb_modified) {
        return Ok(ThumbnailStatus::Fresh);
    }

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }
    backend.thumbnail(&plan_thumbnail(source, output, config))?;
    Ok(ThumbnailStatus::Generated)
}
