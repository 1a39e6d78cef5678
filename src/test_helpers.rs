//! Shared test utilities for the postbake test suite.
//!
//! Builds throwaway site trees in temp directories and provides a
//! deterministic [`Fingerprinter`] so stylesheet names are predictable.
//!
//! # Usage
//!
//! ```text
//! use crate::test_helpers::*;
//!
//! let tmp = setup_site();
//! write_post(&tmp.path().join("posts"), "hello", "title: Hello\ndate: 2025-09-27", "Hi!");
//! let site = site_at(tmp.path());
//! ```

use std::cell::Cell;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::assets::Fingerprinter;
use crate::config::{Site, SiteConfig};

pub const TEST_HEADER: &str = concat!(
    "<!DOCTYPE html><html><head><title>{{title}} | {{site_title}}</title>",
    "<!-- CRITICAL_CSS -->",
    r#"<link rel="stylesheet" href="/css/style.css">"#,
    "</head><body class=\"{{body_class}}\"><main>\n<!-- POST_START -->\n",
);

pub const TEST_FOOTER: &str =
    "\n<!-- POST_END -->\n</main><footer>{{site_title}}</footer></body></html>\n";

// =========================================================================
// Fixture setup
// =========================================================================

/// A temp site with templates, a stylesheet and an empty posts directory.
pub fn setup_site() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_templates(tmp.path(), TEST_HEADER, TEST_FOOTER);
    let css = tmp.path().join("css");
    fs::create_dir_all(&css).unwrap();
    fs::write(css.join("style.css"), "body {\n  color: #222;\n}\n").unwrap();
    fs::create_dir_all(tmp.path().join("posts")).unwrap();
    tmp
}

pub fn write_templates(root: &Path, header: &str, footer: &str) {
    let dir = root.join("templates");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("header.html"), header).unwrap();
    fs::write(dir.join("footer.html"), footer).unwrap();
}

/// Write `<posts_dir>/<slug>/post.md` from frontmatter lines and a body.
pub fn write_post(posts_dir: &Path, slug: &str, frontmatter: &str, body: &str) {
    let dir = posts_dir.join(slug);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("post.md"), format!("---\n{frontmatter}\n---\n{body}")).unwrap();
}

/// Site bound to `root` with default config and an https base URL.
pub fn site_at(root: &Path) -> Site {
    Site::new(
        root,
        SiteConfig {
            site_title: "Hoagie Blog".to_string(),
            base_url: "https://example.com".to_string(),
            ..SiteConfig::default()
        },
    )
}

pub fn read(path: impl AsRef<Path>) -> String {
    let path = path.as_ref();
    fs::read_to_string(path).unwrap_or_else(|e| panic!("reading {}: {e}", path.display()))
}

// =========================================================================
// Deterministic fingerprints
// =========================================================================

/// Yields `00000001`, `00000002`, ...
#[derive(Debug, Default)]
pub struct SequenceFingerprint {
    next: Cell<u32>,
}

impl SequenceFingerprint {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Fingerprinter for SequenceFingerprint {
    fn fingerprint(&self) -> String {
        let n = self.next.get() + 1;
        self.next.set(n);
        format!("{n:08x}")
    }
}
