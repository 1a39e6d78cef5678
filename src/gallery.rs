//! Per-post photo galleries.
//!
//! A post with `photo_page: true` may carry a `photos/` directory next to its
//! source file. Every image directly inside it gets a thumbnail under
//! `photos/thumbs/` and a `figure` in the gallery fragment appended to the
//! post body:
//!
//! ```text
//! posts/hoagie-fest/
//! ├── post.md
//! └── photos/
//!     ├── big-hoagie.jpg
//!     ├── line_outside.png
//!     └── thumbs/              # generated
//!         ├── big-hoagie.jpg
//!         └── line_outside.png
//! ```
//!
//! Thumbnails are only regenerated when missing or older than their source,
//! so this is the one incremental step of an otherwise full rebuild.

use crate::imaging::{ImageBackend, ThumbnailConfig, ThumbnailStatus, ensure_thumbnail};
use crate::imaging::{BackendError, supported_input_extensions};
use maud::{Markup, html};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const PHOTOS_DIR: &str = "photos";
pub const THUMBS_DIR: &str = "thumbs";

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Thumbnail for {file} failed: {source}")]
    Thumbnail { file: String, source: BackendError },
}

/// One image of a gallery, paths relative to the post page.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryImage {
    pub filename: String,
    pub caption: String,
}

impl GalleryImage {
    pub fn href(&self) -> String {
        format!("{PHOTOS_DIR}/{}", self.filename)
    }

    pub fn thumb_src(&self) -> String {
        format!("{PHOTOS_DIR}/{THUMBS_DIR}/{}", self.filename)
    }
}

/// Build the gallery fragment for a post directory.
///
/// Returns an empty string when there is no `photos/` directory or it holds
/// no images. Images that vanish or cannot be read are skipped; a decode or
/// encode failure aborts.
pub fn build_gallery(
    post_dir: &Path,
    backend: &dyn ImageBackend,
    max_dim: u32,
) -> Result<String, GalleryError> {
    let photos_dir = post_dir.join(PHOTOS_DIR);
    if !photos_dir.is_dir() {
        return Ok(String::new());
    }

    let config = ThumbnailConfig {
        max_dim,
        ..ThumbnailConfig::default()
    };
    let thumbs_dir = photos_dir.join(THUMBS_DIR);

    let mut images = Vec::new();
    for filename in list_images(&photos_dir)? {
        let source = photos_dir.join(&filename);
        let output = thumbs_dir.join(&filename);

        match ensure_thumbnail(backend, &source, &output, &config) {
            Ok(ThumbnailStatus::Generated) => {
                tracing::debug!(file = %filename, "generated thumbnail");
            }
            Ok(ThumbnailStatus::Fresh) => {}
            Err(BackendError::Io(e)) => {
                if source.exists() {
                    tracing::warn!(file = %filename, error = %e, "unreadable image, skipping");
                } else {
                    tracing::debug!(file = %filename, error = %e, "image vanished, skipping");
                }
                continue;
            }
            Err(e) => {
                return Err(GalleryError::Thumbnail {
                    file: filename,
                    source: e,
                });
            }
        }

        images.push(GalleryImage {
            caption: caption(&filename),
            filename,
        });
    }

    if images.is_empty() {
        return Ok(String::new());
    }
    Ok(render_gallery(&images).into_string())
}

/// Image filenames directly under `dir`, sorted.
pub fn list_images(dir: &Path) -> Result<Vec<String>, GalleryError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if is_image(&name) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

fn is_image(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            supported_input_extensions().contains(&e.as_str())
        })
        .unwrap_or(false)
}

/// Caption derived from a filename: stem, separators to spaces, first letter
/// uppercased.
///
/// ```
/// assert_eq!(postbake::gallery::caption("big-hoagie_2.jpg"), "Big hoagie 2");
/// ```
pub fn caption(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    let spaced = stem.replace(['-', '_'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn render_gallery(images: &[GalleryImage]) -> Markup {
    html! {
        div.gallery {
            @for image in images {
                figure {
                    a href=(image.href()) {
                        img src=(image.thumb_src()) alt=(image.caption) loading="lazy";
                    }
                    figcaption { (image.caption) }
                }
            }
        }
    }
}
