//! Tag aggregation across the corpus.
//!
//! Raw tag strings are normalized into slugs; many raw forms may share one
//! slug ("Wawa", "wawa " and "WaWa!" all become `wawa`). The first raw form
//! seen for a slug becomes its display name. Since posts are visited in slug
//! order, the display name is deterministic across runs.

use crate::types::{PostSummary, sort_newest_first};
use std::collections::{BTreeMap, BTreeSet};

/// Normalize a raw tag: lowercase, spaces to dashes, drop everything outside
/// `[a-z0-9-]`.
///
/// ```
/// use postbake::tags::tag_slug;
/// assert_eq!(tag_slug("Hoagie Fest!"), "hoagie-fest");
/// assert_eq!(tag_slug(" wawa "), "wawa");
/// ```
pub fn tag_slug(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

/// A tag with its members, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub slug: String,
    pub display_name: String,
    /// Newest first; same-day posts keep corpus order.
    pub members: Vec<PostSummary>,
}

#[derive(Debug, Clone)]
struct TagRecord {
    display_name: String,
    members: Vec<PostSummary>,
}

/// Tag slug → record, filled during the per-post pass.
#[derive(Debug, Default)]
pub struct TagIndex {
    tags: BTreeMap<String, TagRecord>,
}

impl TagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one (post, tag) pair. Returns false when the tag slugs to
    /// nothing and was discarded.
    pub fn record(&mut self, raw: &str, summary: &PostSummary) -> bool {
        let slug = tag_slug(raw);
        if slug.is_empty() {
            return false;
        }
        self.tags
            .entry(slug)
            .or_insert_with(|| TagRecord {
                display_name: raw.trim().to_string(),
                members: Vec::new(),
            })
            .members
            .push(summary.clone());
        true
    }

    /// Record every tag of one post. Raw tags that share a slug count once,
    /// under the first spelling. Returns the number of distinct slugs recorded.
    pub fn record_post(&mut self, raw_tags: &[String], summary: &PostSummary) -> usize {
        let mut seen = BTreeSet::new();
        raw_tags
            .iter()
            .filter(|raw| seen.insert(tag_slug(raw)))
            .filter(|raw| self.record(raw, summary))
            .count()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// All tags sorted by slug, members sorted newest first.
    pub fn tags_in_order(&self) -> Vec<Tag> {
        self.tags
            .iter()
            .map(|(slug, record)| {
                let mut members = record.members.clone();
                sort_newest_first(&mut members, |m| &m.date);
                Tag {
                    slug: slug.clone(),
                    display_name: record.display_name.clone(),
                    members,
                }
            })
            .collect()
    }
}
