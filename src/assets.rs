//! Stylesheet cache busting and critical CSS.
//!
//! The canonical stylesheet (`css/style.css` by default) is minified and
//! published under a fingerprinted name, `style.<fingerprint>.min.css`, next
//! to its source. The fingerprint is *not* a hash of the source: it is minted
//! at random, and only when the minified bytes differ from every published
//! copy. Touching the source without changing its minified form keeps the
//! current filename, so browsers keep their cached copy.
//!
//! ```text
//! css/
//! ├── style.css                # canonical source
//! ├── style.3f9a01bc.min.css   # exactly one after a build
//! └── critical.css             # inlined into every page head
//! ```
//!
//! After publishing, the header template is rewritten in place so every
//! reference to the stylesheet (bare, minified or fingerprinted) points at the
//! published file. This happens before any page is composed.

use regex::{Captures, Regex};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

/// Number of hex characters in a fingerprint.
pub const FINGERPRINT_LEN: usize = 8;

static CSS_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid regex"));
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("valid regex"));

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid stylesheet name: {0}")]
    InvalidName(String),
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

/// Source of new fingerprints.
pub trait Fingerprinter {
    /// A fresh lowercase hex string of [`FINGERPRINT_LEN`] characters.
    fn fingerprint(&self) -> String;
}

/// Random fingerprints taken from a UUID v4.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomFingerprint;

impl Fingerprinter for RandomFingerprint {
    fn fingerprint(&self) -> String {
        let hex = uuid::Uuid::new_v4().simple().to_string();
        hex[..FINGERPRINT_LEN].to_string()
    }
}

/// Result of publishing the stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylesheetOutcome {
    /// Published filename, e.g. `style.3f9a01bc.min.css`.
    pub filename: String,
    pub fingerprint: String,
    /// True when a new fingerprinted file was written this run.
    pub minted: bool,
}

/// Strip comments and collapse whitespace runs to a single space.
///
/// Selectors and punctuation are left alone.
pub fn minify_css(css: &str) -> String {
    let without_comments = CSS_COMMENT.replace_all(css, "");
    WHITESPACE_RUN
        .replace_all(&without_comments, " ")
        .into_owned()
}

/// Critical CSS as a single line, ready to inline into `<style>`.
pub fn critical_css_inline(css: &str) -> String {
    let single_line = css.replace(['\r', '\n'], "");
    WHITESPACE_RUN
        .replace_all(&single_line, " ")
        .trim()
        .to_string()
}

/// Create an empty critical CSS file if none exists.
///
/// Returns true when the file was created.
pub fn ensure_critical_css(path: &Path) -> Result<bool, AssetError> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, "")?;
    Ok(true)
}

/// Read the critical CSS, inlined. A missing file reads as empty.
pub fn read_critical_css(path: &Path) -> Result<String, AssetError> {
    match fs::read_to_string(path) {
        Ok(css) => Ok(critical_css_inline(&css)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e.into()),
    }
}

fn stylesheet_stem(source: &Path) -> Result<&str, AssetError> {
    source
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AssetError::InvalidName(source.display().to_string()))
}

fn fingerprinted_pattern(stem: &str) -> Result<Regex, AssetError> {
    Ok(Regex::new(&format!(
        r"^{}\.([0-9a-f]+)\.min\.css$",
        regex::escape(stem)
    ))?)
}

/// Fingerprinted copies of `stem` currently published in `dir`, sorted.
pub fn published_stylesheets(dir: &Path, stem: &str) -> Result<Vec<String>, AssetError> {
    let pattern = fingerprinted_pattern(stem)?;
    let mut names = Vec::new();
    if !dir.is_dir() {
        return Ok(names);
    }
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if let Some(name) = entry.file_name().to_str() {
            if pattern.is_match(name) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

/// Minify `source` and publish it under a fingerprinted name.
///
/// Reuses a published copy whose bytes match the minified output, otherwise
/// mints a new fingerprint. All other fingerprinted copies are removed.
/// Returns `None` when the source stylesheet does not exist.
pub fn publish_stylesheet(
    source: &Path,
    fingerprinter: &dyn Fingerprinter,
) -> Result<Option<StylesheetOutcome>, AssetError> {
    if !source.is_file() {
        tracing::warn!(path = %source.display(), "stylesheet not found, skipping cache busting");
        return Ok(None);
    }

    let stem = stylesheet_stem(source)?;
    let dir = source.parent().unwrap_or_else(|| Path::new("."));
    let minified = minify_css(&fs::read_to_string(source)?);
    let published = published_stylesheets(dir, stem)?;

    let mut current = None;
    for name in &published {
        if fs::read(dir.join(name))? == minified.as_bytes() {
            current = Some(name.clone());
            break;
        }
    }

    let (filename, minted) = match current {
        Some(name) => (name, false),
        None => {
            let mut name = format!("{stem}.{}.min.css", fingerprinter.fingerprint());
            while published.contains(&name) {
                name = format!("{stem}.{}.min.css", fingerprinter.fingerprint());
            }
            fs::write(dir.join(&name), &minified)?;
            (name, true)
        }
    };

    for stale in published.iter().filter(|n| **n != filename) {
        fs::remove_file(dir.join(stale))?;
        tracing::debug!(file = %stale, "removed stale stylesheet");
    }

    let fingerprint = filename
        .strip_prefix(&format!("{stem}."))
        .and_then(|rest| rest.strip_suffix(".min.css"))
        .unwrap_or_default()
        .to_string();

    Ok(Some(StylesheetOutcome {
        filename,
        fingerprint,
        minted,
    }))
}

/// Point every reference to the stylesheet `stem` at `filename`.
///
/// Matches `<stem>.css`, `<stem>.min.css`, `<stem>.<hex>.css` and
/// `<stem>.<hex>.min.css`. The name must start a path segment: it follows a
/// `/`, a quote, `=`, `(`, whitespace or the start of the header, so
/// `print-style.css` is left alone.
pub fn rewrite_stylesheet_refs(
    header: &str,
    stem: &str,
    filename: &str,
) -> Result<String, AssetError> {
    let pattern = Regex::new(&format!(
        r#"(^|[/"'=(\s]){}(?:\.[0-9a-f]+)?(?:\.min)?\.css\b"#,
        regex::escape(stem)
    ))?;
    Ok(pattern
        .replace_all(header, |caps: &Captures| format!("{}{filename}", &caps[1]))
        .into_owned())
}

/// Rewrite the header template file for a published stylesheet.
///
/// The file is only written when some reference actually changes. Returns
/// true when the file was rewritten.
pub fn update_header_template(
    header_path: &Path,
    source: &Path,
    outcome: &StylesheetOutcome,
) -> Result<bool, AssetError> {
    let header = fs::read_to_string(header_path)?;
    let rewritten = rewrite_stylesheet_refs(&header, stylesheet_stem(source)?, &outcome.filename)?;
    if rewritten == header {
        return Ok(false);
    }
    fs::write(header_path, rewritten)?;
    Ok(true)
}
