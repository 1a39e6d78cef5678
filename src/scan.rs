//! Post discovery and loading.
//!
//! The posts directory holds one subdirectory per post. The directory name is
//! the slug; the source file inside it (`post.md` by default) holds the
//! frontmatter and body:
//!
//! ```text
//! posts/
//! ├── hoagie-fest/
//! │   ├── post.md
//! │   ├── index.html            # written by the build
//! │   └── photos/               # optional, used when photo_page is set
//! ├── wawa-run/
//! │   └── post.md
//! └── drafts-notes/             # no post.md: skipped
//! ```
//!
//! Directories are visited sorted by name, so same-day posts and first-seen
//! tag display names come out the same on every run.
//!
//! ## Skips
//!
//! | Condition | Level |
//! |---|---|
//! | No source file | debug |
//! | Slug not filesystem/URL safe | warn |
//! | Source not UTF-8 | warn |
//! | Missing frontmatter delimiter | warn |

use crate::frontmatter::{self, FrontmatterError};
use crate::types::Post;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Why a post directory was not loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoSource,
    UnsafeSlug,
    NotUtf8,
    Frontmatter(FrontmatterError),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoSource => write!(f, "no source file"),
            SkipReason::UnsafeSlug => write!(f, "directory name is not a safe slug"),
            SkipReason::NotUtf8 => write!(f, "source is not valid UTF-8"),
            SkipReason::Frontmatter(e) => write!(f, "{e}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedPost {
    pub slug: String,
    pub reason: SkipReason,
}

/// Everything found in the posts directory, in slug order.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub posts: Vec<Post>,
    pub skipped: Vec<SkippedPost>,
}

/// A slug is safe when it is non-empty, does not start with `.`, and only
/// uses `[A-Za-z0-9._-]`.
pub fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('.')
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// Immediate subdirectories of `posts_dir`, sorted by name.
///
/// A missing posts directory has no posts.
pub fn discover_post_dirs(posts_dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    if !posts_dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut dirs = Vec::new();
    for entry in WalkDir::new(posts_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if entry.file_type().is_dir() {
            dirs.push(entry.into_path());
        }
    }
    Ok(dirs)
}

/// Load a single post directory.
///
/// `Ok(Err(reason))` means the directory is not a usable post.
pub fn load_post(dir: &Path, source_file: &str) -> Result<Result<Post, SkipReason>, ScanError> {
    let slug = dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    let source_path = dir.join(source_file);
    if !source_path.is_file() {
        return Ok(Err(SkipReason::NoSource));
    }
    if !is_safe_slug(&slug) {
        return Ok(Err(SkipReason::UnsafeSlug));
    }

    let source = match fs::read_to_string(&source_path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
            return Ok(Err(SkipReason::NotUtf8));
        }
        Err(e) => return Err(e.into()),
    };
    let parsed = match frontmatter::parse(&source) {
        Ok(p) => p,
        Err(e) => return Ok(Err(SkipReason::Frontmatter(e))),
    };

    let fm = parsed.frontmatter;
    let title = if fm.title.is_empty() {
        slug.clone()
    } else {
        fm.title
    };

    Ok(Ok(Post {
        slug,
        dir: dir.to_path_buf(),
        title,
        date: fm.date,
        tags: fm.tags,
        section: fm.section,
        hide_from_feed: fm.hide_from_feed,
        photo_page: fm.photo_page,
        description_markdown: fm.description,
        body_markdown: parsed.body,
    }))
}

/// Load every post under `posts_dir`, recording skipped directories.
pub fn scan_posts(posts_dir: &Path, source_file: &str) -> Result<ScanResult, ScanError> {
    let mut result = ScanResult::default();
    for dir in discover_post_dirs(posts_dir)? {
        match load_post(&dir, source_file)? {
            Ok(post) => {
                if post.parsed_date().is_none() {
                    tracing::warn!(slug = %post.slug, date = %post.date, "unparseable date");
                }
                result.posts.push(post);
            }
            Err(reason) => {
                let slug = dir
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                match reason {
                    SkipReason::NoSource => {
                        tracing::debug!(%slug, "skipping directory without {source_file}");
                    }
                    ref other => tracing::warn!(%slug, reason = %other, "skipping post"),
                }
                result.skipped.push(SkippedPost { slug, reason });
            }
        }
    }
    Ok(result)
}
