//! Frontmatter parsing for post source files.
//!
//! A post source starts with a metadata block delimited by `---` lines,
//! followed by the Markdown body:
//!
//! ```text
//! ---
//! title: Hoagie Fest
//! date: 2025-09-27
//! tags: Photos, summer, HoagieFest
//! section: food
//! hide_from_feed: 0
//! photo_page: 1
//! description: A day of sandwiches.
//! ![the line](photos/line.jpg)
//! ---
//! Body text...
//! ```
//!
//! Keys are matched by a `key: ` prefix at the start of a line and the first
//! occurrence wins. `description` is the only multi-line key: it continues
//! until the next line shaped like `word:` or the closing delimiter. A
//! description line that happens to start with `word:` ends the description
//! early; that is accepted behavior.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrontmatterError {
    #[error("missing opening `---` delimiter")]
    MissingOpening,
    #[error("missing closing `---` delimiter")]
    MissingClosing,
}

static KEY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*:").expect("valid regex"));

/// Structured fields of the metadata block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    pub title: String,
    pub date: String,
    pub tags: Vec<String>,
    pub section: Option<String>,
    pub hide_from_feed: bool,
    pub photo_page: bool,
    /// Raw Markdown, possibly spanning several lines.
    pub description: String,
}

/// A source file split into its metadata and its body.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSource {
    pub frontmatter: Frontmatter,
    /// Everything after the closing delimiter line, unmodified.
    pub body: String,
}

pub fn parse(source: &str) -> Result<ParsedSource, FrontmatterError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let mut lines = source.split_inclusive('\n');

    let first = lines.next().ok_or(FrontmatterError::MissingOpening)?;
    if !is_delimiter(first) {
        return Err(FrontmatterError::MissingOpening);
    }

    let mut offset = first.len();
    let mut block = Vec::new();
    let mut body_start = None;
    for line in lines {
        offset += line.len();
        if is_delimiter(line) {
            body_start = Some(offset);
            break;
        }
        block.push(trim_eol(line));
    }
    let body_start = body_start.ok_or(FrontmatterError::MissingClosing)?;

    Ok(ParsedSource {
        frontmatter: parse_block(&block),
        body: source[body_start..].to_string(),
    })
}

fn parse_block(block: &[&str]) -> Frontmatter {
    let mut title = None;
    let mut date = None;
    let mut tags = None;
    let mut section = None;
    let mut hide_from_feed = None;
    let mut photo_page = None;
    let mut description: Option<String> = None;

    let mut i = 0;
    while i < block.len() {
        let line = block[i];
        i += 1;

        if let Some(value) = field(line, "description") {
            let mut parts = Vec::new();
            if !value.is_empty() {
                parts.push(value);
            }
            while i < block.len() && !KEY_LINE.is_match(block[i]) {
                parts.push(block[i]);
                i += 1;
            }
            description.get_or_insert_with(|| parts.join("\n"));
        } else if let Some(value) = field(line, "title") {
            title.get_or_insert(value);
        } else if let Some(value) = field(line, "date") {
            date.get_or_insert(value);
        } else if let Some(value) = field(line, "tags") {
            tags.get_or_insert(value);
        } else if let Some(value) = field(line, "section") {
            section.get_or_insert(value);
        } else if let Some(value) = field(line, "hide_from_feed") {
            hide_from_feed.get_or_insert(value);
        } else if let Some(value) = field(line, "photo_page") {
            photo_page.get_or_insert(value);
        }
    }

    Frontmatter {
        title: title.unwrap_or_default().to_string(),
        date: date.unwrap_or_default().to_string(),
        tags: split_tags(tags.unwrap_or_default()),
        section: section.filter(|s| !s.is_empty()).map(str::to_string),
        hide_from_feed: hide_from_feed.is_some_and(parse_flag),
        photo_page: photo_page.is_some_and(parse_flag),
        description: description.unwrap_or_default(),
    }
}

/// Match `key: value` (or a bare `key:`) at the start of a line.
fn field<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(key)?.strip_prefix(':')?;
    if rest.is_empty() {
        return Some("");
    }
    rest.strip_prefix(' ').map(str::trim)
}

fn split_tags(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// `1`, `true` and `yes` are true; everything else, including empty, is false.
fn parse_flag(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

fn is_delimiter(line: &str) -> bool {
    trim_eol(line) == "---"
}

fn trim_eol(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}
