//! Sitemap protocol 0.9 document.
//!
//! One `<url>` per emitted page: the homepage, every post (hidden ones too,
//! feed eligibility does not matter here), every tag page and the tag
//! directory. Posts use their own date as `lastmod`; everything else uses the
//! build date.

use crate::config::{Site, join_url};
use crate::tags::Tag;
use crate::types::{PostSummary, parse_date};
use chrono::NaiveDate;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Cursor;
use thiserror::Error;

pub const SITEMAP_FILENAME: &str = "sitemap.xml";
pub const SITEMAP_XMLNS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Error, Debug)]
pub enum SitemapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("Sitemap is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    pub loc: String,
    /// `YYYY-MM-DD`; omitted from the document when `None`.
    pub lastmod: Option<String>,
}

/// Entries for every page of the site, in emission order.
pub fn sitemap_entries(
    site: &Site,
    posts: &[PostSummary],
    tags: &[Tag],
    build_date: NaiveDate,
) -> Vec<SitemapEntry> {
    let base = &site.config.base_url;
    let built = Some(build_date.format("%Y-%m-%d").to_string());

    let mut entries = Vec::with_capacity(posts.len() + tags.len() + 2);
    entries.push(SitemapEntry {
        loc: join_url(base, "/"),
        lastmod: built.clone(),
    });
    for post in posts {
        entries.push(SitemapEntry {
            loc: join_url(base, &post.url),
            lastmod: parse_date(&post.date).map(|d| d.format("%Y-%m-%d").to_string()),
        });
    }
    for tag in tags {
        entries.push(SitemapEntry {
            loc: join_url(base, &site.tag_url(&tag.slug)),
            lastmod: built.clone(),
        });
    }
    entries.push(SitemapEntry {
        loc: join_url(base, &site.tags_index_url()),
        lastmod: built,
    });
    entries
}

pub fn render_sitemap(entries: &[SitemapEntry]) -> Result<String, SitemapError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut urlset = BytesStart::new("urlset");
    urlset.push_attribute(("xmlns", SITEMAP_XMLNS));
    writer.write_event(Event::Start(urlset))?;

    for entry in entries {
        writer.write_event(Event::Start(BytesStart::new("url")))?;
        writer.write_event(Event::Start(BytesStart::new("loc")))?;
        writer.write_event(Event::Text(BytesText::new(&entry.loc)))?;
        writer.write_event(Event::End(BytesEnd::new("loc")))?;
        if let Some(lastmod) = &entry.lastmod {
            writer.write_event(Event::Start(BytesStart::new("lastmod")))?;
            writer.write_event(Event::Text(BytesText::new(lastmod)))?;
            writer.write_event(Event::End(BytesEnd::new("lastmod")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("url")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("urlset")))?;
    Ok(String::from_utf8(writer.into_inner().into_inner())?)
}
