//! RSS 2.0 and JSON feeds.
//!
//! Both feeds cover the feed-eligible posts, newest first. Posts only carry a
//! calendar date, so each entry gets a synthetic time of day derived from its
//! slug:
//!
//! ```text
//! digest = SHA-256(slug as UTF-8)
//! hour   = digest[0] mod 24
//! minute = digest[1] mod 60
//! second = digest[2] mod 60      (UTC)
//! ```
//!
//! The same slug always lands on the same time, so feeds are stable across
//! rebuilds. The time is cosmetic and says nothing about when a post was
//! actually written.

use crate::config::{Site, join_url};
use crate::types::{FeedEntry, parse_date};
use chrono::{DateTime, NaiveTime, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::io::Cursor;
use thiserror::Error;

pub const RSS_FILENAME: &str = "feed.xml";
pub const JSON_FILENAME: &str = "feed.json";

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Feed is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Time of day derived from the slug.
pub fn synthetic_time(slug: &str) -> NaiveTime {
    let digest = Sha256::digest(slug.as_bytes());
    let hour = u32::from(digest[0]) % 24;
    let minute = u32::from(digest[1]) % 60;
    let second = u32::from(digest[2]) % 60;
    // All three are in range by construction.
    NaiveTime::from_hms_opt(hour, minute, second).unwrap_or(NaiveTime::MIN)
}

/// Publication instant: the post date at its synthetic time, in UTC.
///
/// `None` when the date does not parse.
pub fn publication_time(date: &str, slug: &str) -> Option<DateTime<Utc>> {
    parse_date(date).map(|d| d.and_time(synthetic_time(slug)).and_utc())
}

/// Make `text` safe inside a single CDATA section.
pub fn escape_cdata(text: &str) -> String {
    text.replace("]]>", "]]]]><![CDATA[>")
}

type XmlWriter = Writer<Cursor<Vec<u8>>>;

fn push_text(writer: &mut XmlWriter, tag: &str, text: &str) -> Result<(), FeedError> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn push_cdata(writer: &mut XmlWriter, tag: &str, text: &str) -> Result<(), FeedError> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::CData(BytesCData::new(escape_cdata(text))))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

/// Render the RSS 2.0 document.
pub fn render_rss(entries: &[FeedEntry], site: &Site) -> Result<String, FeedError> {
    let base = &site.config.base_url;
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    writer.write_event(Event::Start(rss))?;
    writer.write_event(Event::Start(BytesStart::new("channel")))?;

    push_text(&mut writer, "title", &site.config.site_title)?;
    push_text(&mut writer, "link", &join_url(base, "/"))?;
    push_text(&mut writer, "description", &site.config.site_description)?;

    for entry in entries {
        let link = join_url(base, &entry.url);

        writer.write_event(Event::Start(BytesStart::new("item")))?;
        push_text(&mut writer, "title", &entry.title)?;
        push_text(&mut writer, "link", &link)?;

        let mut guid = BytesStart::new("guid");
        guid.push_attribute(("isPermaLink", "true"));
        writer.write_event(Event::Start(guid))?;
        writer.write_event(Event::Text(BytesText::new(&link)))?;
        writer.write_event(Event::End(BytesEnd::new("guid")))?;

        if let Some(published) = publication_time(&entry.date, &entry.slug) {
            push_text(&mut writer, "pubDate", &published.to_rfc2822())?;
        }
        for tag in &entry.tags {
            push_text(&mut writer, "category", tag)?;
        }
        push_cdata(&mut writer, "description", &entry.content_html)?;

        writer.write_event(Event::End(BytesEnd::new("item")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("channel")))?;
    writer.write_event(Event::End(BytesEnd::new("rss")))?;

    Ok(String::from_utf8(writer.into_inner().into_inner())?)
}

#[derive(Debug, Serialize)]
struct JsonFeedItem<'a> {
    title: &'a str,
    link: String,
    date: String,
    tags: Vec<&'a str>,
    content: &'a str,
}

/// Render the JSON feed: an array of `{title, link, date, tags, content}`.
///
/// `date` is RFC 3339 at the synthetic time, or the raw date string when it
/// does not parse.
pub fn render_json(entries: &[FeedEntry], site: &Site) -> Result<String, FeedError> {
    let items: Vec<JsonFeedItem<'_>> = entries
        .iter()
        .map(|entry| JsonFeedItem {
            title: &entry.title,
            link: join_url(&site.config.base_url, &entry.url),
            date: publication_time(&entry.date, &entry.slug)
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| entry.date.clone()),
            tags: entry.tags.iter().map(|t| t.trim()).collect(),
            content: &entry.content_html,
        })
        .collect();
    Ok(serde_json::to_string_pretty(&items)?)
}
