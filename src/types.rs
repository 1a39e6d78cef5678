//! Shared types used across the build stages.
//!
//! A [`Post`] is read from disk by [`scan`](crate::scan); the per-post pass
//! projects it into a [`PostSummary`] (homepage and tag listings) and, when it
//! is feed-eligible, a [`FeedEntry`].

use chrono::NaiveDate;
use std::path::PathBuf;

/// One post of the corpus, exactly as authored.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    /// Directory name; also the URL path segment.
    pub slug: String,
    /// Source directory (holds the source file, `photos/`, and the output page).
    pub dir: PathBuf,
    pub title: String,
    /// Raw `YYYY-MM-DD` date string. Not validated; sorted lexicographically.
    pub date: String,
    /// Raw tag strings in authored order, trimmed, empties removed.
    pub tags: Vec<String>,
    pub section: Option<String>,
    pub hide_from_feed: bool,
    pub photo_page: bool,
    pub description_markdown: String,
    pub body_markdown: String,
}

impl Post {
    /// The post date as a calendar date, if it parses as `YYYY-MM-DD`.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }

    /// `body_class` value: slug, plus the section when present.
    pub fn body_class(&self) -> String {
        match &self.section {
            Some(section) => format!("{} {}", self.slug, section),
            None => self.slug.clone(),
        }
    }
}

/// Parse a `YYYY-MM-DD` date string.
pub fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()
}

/// A post projected for listings (homepage, tag pages).
#[derive(Debug, Clone, PartialEq)]
pub struct PostSummary {
    pub date: String,
    pub title: String,
    pub slug: String,
    /// Site-absolute URL path of the post page.
    pub url: String,
    /// Rendered description, collapsed to one line.
    pub description_html: String,
}

/// A feed-eligible post projected for the RSS and JSON feeds.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub date: String,
    pub title: String,
    pub tags: Vec<String>,
    pub slug: String,
    pub url: String,
    pub description_html: String,
    /// Main content region of the rendered post page.
    pub content_html: String,
}

impl FeedEntry {
    pub fn summary(&self) -> PostSummary {
        PostSummary {
            date: self.date.clone(),
            title: self.title.clone(),
            slug: self.slug.clone(),
            url: self.url.clone(),
            description_html: self.description_html.clone(),
        }
    }
}

/// Stable sort, newest first. Equal dates keep their insertion order.
pub fn sort_newest_first<T>(items: &mut [T], date: impl Fn(&T) -> &str) {
    items.sort_by(|a, b| date(b).cmp(date(a)));
}
