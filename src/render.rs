//! Markdown rendering.
//!
//! The conversion itself is a delegate behind [`MarkdownRenderer`], so the
//! build can run against a test double. [`CmarkRenderer`] is the production
//! implementation on `pulldown-cmark` with the extended dialect authors expect:
//! tables, footnotes, strikethrough, task lists and definition lists. Fenced
//! code blocks are part of CommonMark.

use pulldown_cmark::{Options, Parser, html as md_html};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Markdown rendering failed: {0}")]
    Failed(String),
}

/// Pure `markdown -> html` conversion.
pub trait MarkdownRenderer {
    fn render(&self, markdown: &str) -> Result<String, RenderError>;

    /// Render and collapse the output to a single line.
    ///
    /// Used for values substituted inline into other markup (descriptions);
    /// full post bodies keep their newlines.
    fn render_inline(&self, markdown: &str) -> Result<String, RenderError> {
        Ok(collapse_lines(&self.render(markdown)?))
    }
}

/// `pulldown-cmark` backed renderer.
#[derive(Debug, Default, Clone, Copy)]
pub struct CmarkRenderer;

impl CmarkRenderer {
    pub fn new() -> Self {
        Self
    }

    fn options() -> Options {
        Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_DEFINITION_LIST
    }
}

impl MarkdownRenderer for CmarkRenderer {
    fn render(&self, markdown: &str) -> Result<String, RenderError> {
        if markdown.trim().is_empty() {
            return Ok(String::new());
        }
        let parser = Parser::new_ext(markdown, Self::options());
        let mut html = String::with_capacity(markdown.len() * 3 / 2);
        md_html::push_html(&mut html, parser);
        Ok(html)
    }
}

const BLOCK_TAGS: &[&str] = &[
    "blockquote", "dd", "div", "dl", "dt", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "li",
    "ol", "p", "pre", "section", "table", "tbody", "td", "th", "thead", "tr", "ul",
];

/// Remove line breaks, keeping the text on one line.
///
/// A break between two block-level tags is dropped; any other break is a
/// soft break inside text and becomes a space.
pub fn collapse_lines(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut prev: Option<&str> = None;
    for line in html.lines().map(str::trim_end).filter(|l| !l.is_empty()) {
        if let Some(prev) = prev {
            if !(ends_with_block_tag(prev) || starts_with_block_tag(line)) {
                out.push(' ');
            }
        }
        out.push_str(line);
        prev = Some(line);
    }
    out
}

fn is_block_tag(tag: &str) -> bool {
    let name = tag
        .trim_start_matches('<')
        .trim_start_matches('/')
        .split(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/')
        .next()
        .unwrap_or("");
    BLOCK_TAGS.contains(&name)
}

fn ends_with_block_tag(line: &str) -> bool {
    line.ends_with('>') && line.rfind('<').is_some_and(|i| is_block_tag(&line[i..]))
}

fn starts_with_block_tag(line: &str) -> bool {
    line.starts_with('<') && is_block_tag(line)
}
