//! CLI output formatting for `build` and `check`.
//!
//! Progress during a build goes through `tracing`; this module formats the
//! end-of-run report printed to stdout.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Stylesheet
//!     style.3f9a01bc.min.css (new fingerprint)
//!     Header: rewritten
//!
//! Posts
//!     12 written (1 hidden from feeds)
//!     Skipped: drafts (no source file)
//!
//! Built 12 posts, 7 tags, 11 feed entries, 21 sitemap URLs
//! ```
//!
//! ## Check
//!
//! ```text
//! Posts
//!     12 found (1 hidden from feeds, 2 photo pages)
//!     Skipped: drafts (no source file)
//!     Unparseable date: someday-post
//!
//! 7 tags
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::build::{BuildSummary, CheckSummary};
use crate::scan::SkippedPost;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{n} {}", if n == 1 { one } else { many })
}

fn skipped_lines(skipped: &[SkippedPost]) -> Vec<String> {
    skipped
        .iter()
        .map(|s| format!("{}Skipped: {} ({})", indent(1), s.slug, s.reason))
        .collect()
}

// ============================================================================
// Build
// ============================================================================

pub fn format_build_summary(summary: &BuildSummary) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Stylesheet".to_string());
    match &summary.stylesheet {
        Some(outcome) => {
            let status = if outcome.minted {
                "new fingerprint"
            } else {
                "unchanged"
            };
            lines.push(format!("{}{} ({status})", indent(1), outcome.filename));
            let header = if summary.header_rewritten {
                "rewritten"
            } else {
                "up to date"
            };
            lines.push(format!("{}Header: {header}", indent(1)));
        }
        None => lines.push(format!("{}(none)", indent(1))),
    }
    if summary.critical_css_created {
        lines.push(format!("{}Critical CSS: created empty file", indent(1)));
    }

    lines.push(String::new());
    lines.push("Posts".to_string());
    let mut written = format!("{}{} written", indent(1), summary.posts_written);
    if summary.hidden_posts > 0 {
        written.push_str(&format!(" ({} hidden from feeds)", summary.hidden_posts));
    }
    lines.push(written);
    lines.extend(skipped_lines(&summary.skipped));

    lines.push(String::new());
    lines.push(format!(
        "Built {}, {}, {}, {}",
        plural(summary.posts_written, "post", "posts"),
        plural(summary.tags, "tag", "tags"),
        plural(summary.feed_entries, "feed entry", "feed entries"),
        plural(summary.sitemap_urls, "sitemap URL", "sitemap URLs"),
    ));
    lines
}

pub fn print_build_summary(summary: &BuildSummary) {
    for line in format_build_summary(summary) {
        println!("{line}");
    }
}

// ============================================================================
// Check
// ============================================================================

pub fn format_check_output(summary: &CheckSummary) -> Vec<String> {
    let mut lines = vec!["Posts".to_string()];

    let mut details = Vec::new();
    if summary.hidden_posts > 0 {
        details.push(format!("{} hidden from feeds", summary.hidden_posts));
    }
    if summary.photo_pages > 0 {
        details.push(plural(summary.photo_pages, "photo page", "photo pages"));
    }
    let mut found = format!("{}{} found", indent(1), summary.posts);
    if !details.is_empty() {
        found.push_str(&format!(" ({})", details.join(", ")));
    }
    lines.push(found);
    lines.extend(skipped_lines(&summary.skipped));
    for slug in &summary.unparseable_dates {
        lines.push(format!("{}Unparseable date: {slug}", indent(1)));
    }

    lines.push(String::new());
    lines.push(plural(summary.tags, "tag", "tags"));
    lines
}

pub fn print_check_output(summary: &CheckSummary) {
    for line in format_check_output(summary) {
        println!("{line}");
    }
}
