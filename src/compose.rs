//! Page composition from the header/footer template pair.
//!
//! Every emitted page is exactly `header + body + footer`. Templating is
//! literal placeholder substitution, applied to both header and footer:
//!
//! | Placeholder | Value |
//! |---|---|
//! | `{{title}}` | page title (HTML-escaped) |
//! | `{{body_class}}` | slug plus section for posts, a fixed class otherwise |
//! | `{{site_title}}` | `site_title` from the config (HTML-escaped) |
//! | `<!-- CRITICAL_CSS -->` | `<style>` holding the critical CSS, or nothing |
//!
//! Substitution is a single pass, so a value that happens to contain a
//! placeholder is inserted verbatim.
//!
//! The templates also carry the `<!-- POST_START -->` / `<!-- POST_END -->`
//! markers around the main content region. They are left untouched here; the
//! feeds read the region back out of written post pages with
//! [`extract_post_content`].

use maud::html;
use regex::{Captures, Regex};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

pub const HEADER_TEMPLATE: &str = "header.html";
pub const FOOTER_TEMPLATE: &str = "footer.html";

pub const CRITICAL_CSS_MARKER: &str = "<!-- CRITICAL_CSS -->";
pub const POST_START_MARKER: &str = "<!-- POST_START -->";
pub const POST_END_MARKER: &str = "<!-- POST_END -->";

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{(title|body_class|site_title)\}\}|<!-- CRITICAL_CSS -->")
        .expect("valid regex")
});

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("Template not found: {0}")]
    MissingTemplate(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The header/footer pair, read once per build.
#[derive(Debug, Clone, PartialEq)]
pub struct Templates {
    pub header: String,
    pub footer: String,
}

impl Templates {
    pub fn header_path(templates_dir: &Path) -> PathBuf {
        templates_dir.join(HEADER_TEMPLATE)
    }

    pub fn footer_path(templates_dir: &Path) -> PathBuf {
        templates_dir.join(FOOTER_TEMPLATE)
    }

    /// Load both templates. Either one missing is an error.
    pub fn load(templates_dir: &Path) -> Result<Self, ComposeError> {
        Ok(Self {
            header: read_template(&Self::header_path(templates_dir))?,
            footer: read_template(&Self::footer_path(templates_dir))?,
        })
    }
}

fn read_template(path: &Path) -> Result<String, ComposeError> {
    match fs::read_to_string(path) {
        Ok(s) => Ok(s),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ComposeError::MissingTemplate(path.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Per-page substitution values.
#[derive(Debug, Clone, Copy)]
pub struct PageVars<'a> {
    pub title: &'a str,
    pub body_class: &'a str,
}

/// Composes pages from loaded templates, site title and critical CSS.
#[derive(Debug, Clone)]
pub struct PageComposer {
    templates: Templates,
    site_title: String,
    /// Already single-line; empty when there is no critical CSS.
    critical_css: String,
}

impl PageComposer {
    pub fn new(templates: Templates, site_title: &str, critical_css: &str) -> Self {
        Self {
            templates,
            site_title: site_title.to_string(),
            critical_css: critical_css.to_string(),
        }
    }

    /// `header(vars) + body + footer(vars)`.
    pub fn compose(&self, vars: PageVars<'_>, body: &str) -> String {
        let header = self.substitute(&self.templates.header, vars);
        let footer = self.substitute(&self.templates.footer, vars);
        let mut page = String::with_capacity(header.len() + body.len() + footer.len());
        page.push_str(&header);
        page.push_str(body);
        page.push_str(&footer);
        page
    }

    fn substitute(&self, template: &str, vars: PageVars<'_>) -> String {
        PLACEHOLDER
            .replace_all(template, |caps: &Captures| match caps.get(1).map(|m| m.as_str()) {
                Some("title") => escape_text(vars.title),
                Some("body_class") => escape_text(vars.body_class),
                Some("site_title") => escape_text(&self.site_title),
                _ => self.critical_style(),
            })
            .into_owned()
    }

    fn critical_style(&self) -> String {
        if self.critical_css.is_empty() {
            String::new()
        } else {
            format!("<style>{}</style>", self.critical_css)
        }
    }
}

fn escape_text(value: &str) -> String {
    html! { (value) }.into_string()
}

/// Text between the post markers of a composed page, if both are present.
pub fn extract_post_content(page: &str) -> Option<&str> {
    let start = page.find(POST_START_MARKER)? + POST_START_MARKER.len();
    let end = start + page[start..].find(POST_END_MARKER)?;
    Some(&page[start..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HEADER: &str = "<html><head><title>{{title}} | {{site_title}}</title><!-- CRITICAL_CSS --></head><body class=\"{{body_class}}\"><main><!-- POST_START -->";
    const FOOTER: &str = "<!-- POST_END --></main><footer>{{site_title}}</footer></body></html>";

    fn composer(critical: &str) -> PageComposer {
        PageComposer::new(
            Templates {
                header: HEADER.to_string(),
                footer: FOOTER.to_string(),
            },
            "Hoagie Blog",
            critical,
        )
    }

    fn vars<'a>(title: &'a str, body_class: &'a str) -> PageVars<'a> {
        PageVars { title, body_class }
    }

    #[test]
    fn compose_is_header_body_footer() {
        let page = composer("").compose(vars("Hello", "hello"), "<p>body</p>");
        assert_eq!(
            page,
            "<html><head><title>Hello | Hoagie Blog</title></head><body class=\"hello\"><main><!-- POST_START --><p>body</p><!-- POST_END --></main><footer>Hoagie Blog</footer></body></html>"
        );
    }

    #[test]
    fn critical_css_is_inlined() {
        let page = composer("body{margin:0}").compose(vars("T", "t"), "");
        assert!(page.contains("<style>body{margin:0}</style></head>"));
        assert!(!page.contains(CRITICAL_CSS_MARKER));
    }

    #[test]
    fn titles_are_escaped() {
        let page = composer("").compose(vars("Fish & <Chips>", "x"), "");
        assert!(page.contains("<title>Fish &amp; &lt;Chips&gt; | Hoagie Blog</title>"));
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let page = composer("").compose(vars("{{body_class}}", "post"), "");
        assert!(page.contains("<title>{{body_class}} | Hoagie Blog</title>"));
    }

    #[test]
    fn body_is_not_substituted() {
        let page = composer("").compose(vars("T", "t"), "<code>{{title}}</code>");
        assert!(page.contains("<code>{{title}}</code>"));
    }

    #[test]
    fn extract_returns_region_between_markers() {
        let page = composer("").compose(vars("T", "t"), "<article>hi</article>");
        assert_eq!(extract_post_content(&page), Some("<article>hi</article>"));
    }

    #[test]
    fn extract_without_markers_is_none() {
        assert_eq!(extract_post_content("<p>no markers</p>"), None);
        assert_eq!(
            extract_post_content("<!-- POST_START --><p>unterminated</p>"),
            None
        );
    }

    #[test]
    fn load_reads_both_templates() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(HEADER_TEMPLATE), HEADER).unwrap();
        fs::write(tmp.path().join(FOOTER_TEMPLATE), FOOTER).unwrap();

        let templates = Templates::load(tmp.path()).unwrap();
        assert_eq!(templates.header, HEADER);
        assert_eq!(templates.footer, FOOTER);
    }

    #[test]
    fn load_missing_footer_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(HEADER_TEMPLATE), HEADER).unwrap();

        let err = Templates::load(tmp.path()).unwrap_err();
        assert!(
            matches!(err, ComposeError::MissingTemplate(ref p) if p.ends_with(FOOTER_TEMPLATE))
        );
    }
}
