//! Site configuration module.
//!
//! Handles loading and validating the flat `site.toml` file at the site root.
//! There is no nesting and no cascading: one file, one table of key/value
//! pairs, read once at the start of a build and passed by reference to every
//! stage afterwards.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! posts_dir = "posts"              # One subdirectory per post
//! templates_dir = "templates"      # header.html + footer.html
//! feed_dir = "feed"                # feed.xml + feed.json
//! tags_dir = "tags"                # Tag pages and the tag directory
//! stylesheet = "css/style.css"     # Canonical stylesheet (fingerprinted on publish)
//! critical_css = "css/critical.css" # Inlined into every page head
//! index_file = "index.html"        # Filename of every generated page
//! source_file = "post.md"          # Post source inside each post directory
//! site_title = "My Site"
//! site_description = ""
//! base_url = "http://localhost"
//! thumbnail_size = 400             # Gallery thumbnail bounding box edge (px)
//! ```
//!
//! Every directory is relative to the site root, the directory holding the
//! config file. Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file looked up at the site root.
pub const CONFIG_FILENAME: &str = "site.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `site.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Directory holding one subdirectory per post.
    pub posts_dir: String,
    /// Directory holding `header.html` and `footer.html`.
    pub templates_dir: String,
    /// Output directory for `feed.xml` and `feed.json`.
    pub feed_dir: String,
    /// Output directory for tag pages and the tag directory page.
    pub tags_dir: String,
    /// Canonical stylesheet source; fingerprinted copies are published next to it.
    pub stylesheet: String,
    /// Critical CSS inlined into every page head.
    pub critical_css: String,
    /// Filename of every generated page.
    pub index_file: String,
    /// Post source filename inside each post directory.
    pub source_file: String,
    pub site_title: String,
    /// RSS channel description.
    pub site_description: String,
    /// Absolute URL prefix used by the feeds and the sitemap.
    pub base_url: String,
    /// Edge of the square bounding box gallery thumbnails are fitted into.
    pub thumbnail_size: u32,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            posts_dir: "posts".to_string(),
            templates_dir: "templates".to_string(),
            feed_dir: "feed".to_string(),
            tags_dir: "tags".to_string(),
            stylesheet: "css/style.css".to_string(),
            critical_css: "css/critical.css".to_string(),
            index_file: "index.html".to_string(),
            source_file: "post.md".to_string(),
            site_title: "My Site".to_string(),
            site_description: String::new(),
            base_url: "http://localhost".to_string(),
            thumbnail_size: 400,
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.index_file.trim().is_empty() {
            return Err(ConfigError::Validation("index_file must not be empty".into()));
        }
        if self.source_file.trim().is_empty() {
            return Err(ConfigError::Validation(
                "source_file must not be empty".into(),
            ));
        }
        if self.thumbnail_size == 0 {
            return Err(ConfigError::Validation(
                "thumbnail_size must be non-zero".into(),
            ));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Validation(
                "base_url must start with http:// or https://".into(),
            ));
        }
        Ok(())
    }
}

/// A loaded config bound to the site root it was read from.
///
/// Resolves the relative directories of [`SiteConfig`] to filesystem paths
/// and to site-absolute URL paths.
#[derive(Debug, Clone)]
pub struct Site {
    pub root: PathBuf,
    pub config: SiteConfig,
}

impl Site {
    pub fn new(root: impl Into<PathBuf>, config: SiteConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn posts_dir(&self) -> PathBuf {
        self.root.join(&self.config.posts_dir)
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.root.join(&self.config.templates_dir)
    }

    pub fn feed_dir(&self) -> PathBuf {
        self.root.join(&self.config.feed_dir)
    }

    pub fn tags_dir(&self) -> PathBuf {
        self.root.join(&self.config.tags_dir)
    }

    pub fn stylesheet(&self) -> PathBuf {
        self.root.join(&self.config.stylesheet)
    }

    pub fn critical_css(&self) -> PathBuf {
        self.root.join(&self.config.critical_css)
    }

    /// Site-absolute URL path of a post page, e.g. `/posts/hello/`.
    pub fn post_url(&self, slug: &str) -> String {
        url_path(&[&self.config.posts_dir, slug])
    }

    /// Site-absolute URL path of a tag page, e.g. `/tags/summer/`.
    pub fn tag_url(&self, tag_slug: &str) -> String {
        url_path(&[&self.config.tags_dir, tag_slug])
    }

    /// Site-absolute URL path of the tag directory, e.g. `/tags/`.
    pub fn tags_index_url(&self) -> String {
        url_path(&[&self.config.tags_dir])
    }
}

/// Join relative directory segments into a site-absolute directory URL path.
///
/// `.` and empty segments collapse away, so a posts directory of `.` yields
/// `/<slug>/`.
pub fn url_path(segments: &[&str]) -> String {
    let mut path = String::from("/");
    for segment in segments {
        for part in segment.split('/') {
            if part.is_empty() || part == "." {
                continue;
            }
            path.push_str(part);
            path.push('/');
        }
    }
    path
}

/// Join a base URL and a site-absolute path without doubling the slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Load `site.toml` from the given path, apply defaults, and validate.
///
/// A missing file is an error: a build without a config is refused.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    let config: SiteConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load the config file and bind it to its parent directory as the site root.
pub fn load_site(config_path: &Path) -> Result<Site, ConfigError> {
    let config = load_config(config_path)?;
    let root = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(Site::new(root, config))
}

/// Returns a fully-commented stock `site.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# postbake configuration
# ======================
# All settings are optional. Values shown below are the defaults.
# Directories are relative to the directory holding this file.
# Unknown keys will cause an error.

# Directory holding one subdirectory per post.
posts_dir = "posts"

# Directory holding header.html and footer.html.
templates_dir = "templates"

# Output directory for feed.xml and feed.json.
feed_dir = "feed"

# Output directory for tag pages and the tag directory.
tags_dir = "tags"

# Canonical stylesheet. A minified, fingerprinted copy is published next to it.
stylesheet = "css/style.css"

# Critical CSS inlined into every page at the <!-- CRITICAL_CSS --> marker.
critical_css = "css/critical.css"

# Filename of every generated page.
index_file = "index.html"

# Post source filename inside each post directory.
source_file = "post.md"

# Site title ({{site_title}}, homepage title, RSS channel title).
site_title = "My Site"

# RSS channel description.
site_description = ""

# Absolute URL prefix for feeds and the sitemap.
base_url = "http://localhost"

# Gallery thumbnails are fitted into a square of this many pixels.
thumbnail_size = 400
"##
}
