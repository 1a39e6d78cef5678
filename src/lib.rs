//! # postbake
//!
//! A static site builder for Markdown blogs. Each post is a directory with a
//! Markdown source file; one build turns the whole corpus into post pages, a
//! homepage, tag pages, a tag directory, RSS and JSON feeds, and a sitemap.
//!
//! # Architecture: One Pass Plus Aggregation
//!
//! ```text
//! site.toml ─► templates ─► stylesheet fingerprint ─► header rewrite
//!
//! posts/<slug>/post.md  ─►  frontmatter ─► render ─► gallery ─► compose ─► posts/<slug>/index.html
//!                                                                      └► tags, feed entries
//!
//! aggregation           ─►  index.html, tags/…, feed/feed.xml, feed/feed.json, sitemap.xml
//! ```
//!
//! Every build starts from an empty tag index and feed list, so output only
//! depends on what is on disk. Rebuilding an unchanged site rewrites the same
//! bytes; only the sitemap's build-date `lastmod` values move.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | Flat `site.toml` loading, defaults, validation, path and URL resolution |
//! | [`scan`] | Discovers post directories in slug order and loads posts |
//! | [`frontmatter`] | Splits a source file into metadata and body |
//! | [`render`] | Markdown rendering delegate ([`render::MarkdownRenderer`]) on `pulldown-cmark` |
//! | [`gallery`] | Photo galleries for `photo_page` posts |
//! | [`imaging`] | Thumbnail delegate ([`imaging::ImageBackend`]) on the `image` crate |
//! | [`assets`] | Stylesheet minification, fingerprinting and critical CSS |
//! | [`compose`] | Header/footer template substitution |
//! | [`generate`] | Maud fragments for every page type |
//! | [`tags`] | Tag slugging and aggregation |
//! | [`feed`] | RSS 2.0 and JSON feeds with synthetic publication times |
//! | [`sitemap`] | Sitemap protocol 0.9 |
//! | [`build`] | The orchestrator: [`build::build_site`] and [`build::check_site`] |
//! | [`types`] | Shared types (`Post`, `PostSummary`, `FeedEntry`) |
//! | [`output`] | CLI report formatting |
//!
//! # Design Decisions
//!
//! ## Delegates as Traits
//!
//! Markdown rendering, thumbnailing and fingerprint minting are the three
//! things a build asks the outside world for. Each is a trait, bundled in
//! [`build::Delegates`], so tests run full builds against a mock image
//! backend and a deterministic fingerprinter.
//!
//! ## Deterministic Corpus Order
//!
//! Post directories are visited sorted by name. Same-day posts therefore
//! list in slug order and a tag's display name (the first raw spelling seen)
//! does not depend on filesystem iteration order.
//!
//! ## Literal Templates
//!
//! The header and footer are plain HTML files with a handful of placeholders.
//! There are no conditionals or loops; anything structural is produced by
//! [`generate`] with Maud and dropped between header and footer.

pub mod assets;
pub mod build;
pub mod compose;
pub mod config;
pub mod feed;
pub mod frontmatter;
pub mod gallery;
pub mod generate;
pub mod imaging;
pub mod output;
pub mod render;
pub mod scan;
pub mod sitemap;
pub mod tags;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
