//! The build orchestrator.
//!
//! One call to [`build_site`] rebuilds the whole site from the posts on disk:
//!
//! ```text
//! templates ─► directories ─► critical CSS ─► stylesheet + header rewrite
//!                                                   │
//!      ┌────────────────────────────────────────────┘
//!      ▼
//! per post (slug order): parse ─► render ─► gallery ─► compose ─► write
//!                        └─► tag index, feed entries
//!      │
//!      ▼
//! sort feed ─► homepage ─► tag pages ─► tag directory ─► RSS + JSON ─► sitemap
//! ```
//!
//! Templates are loaded before anything is written, so a missing template
//! never leaves a half-written site. Past that point there is no rollback: a
//! delegate failure (Markdown rendering, thumbnailing) aborts the build with
//! the post's slug in the error, leaving earlier posts rebuilt and later ones
//! stale. Re-running after fixing the cause converges.
//!
//! Builds must not run concurrently against the same site tree; nothing
//! enforces this.

use crate::assets::{self, AssetError, Fingerprinter, StylesheetOutcome};
use crate::compose::{ComposeError, PageComposer, PageVars, Templates, extract_post_content};
use crate::config::Site;
use crate::feed::{self, FeedError};
use crate::gallery::{self, GalleryError};
use crate::generate;
use crate::imaging::ImageBackend;
use crate::render::{MarkdownRenderer, RenderError};
use crate::scan::{self, ScanError, SkippedPost};
use crate::sitemap::{self, SitemapError};
use crate::tags::TagIndex;
use crate::types::{FeedEntry, Post, PostSummary, sort_newest_first};
use chrono::NaiveDate;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Template error: {0}")]
    Compose(#[from] ComposeError),
    #[error("Stylesheet error: {0}")]
    Asset(#[from] AssetError),
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),
    #[error("Sitemap error: {0}")]
    Sitemap(#[from] SitemapError),
    #[error("Rendering post '{slug}' failed: {source}")]
    Render { slug: String, source: RenderError },
    #[error("Gallery for post '{slug}' failed: {source}")]
    Gallery { slug: String, source: GalleryError },
}

/// The external capabilities a build calls out to.
pub struct Delegates<'a> {
    pub renderer: &'a dyn MarkdownRenderer,
    pub images: &'a dyn ImageBackend,
    pub fingerprinter: &'a dyn Fingerprinter,
}

/// What a build produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildSummary {
    pub posts_written: usize,
    pub hidden_posts: usize,
    pub skipped: Vec<SkippedPost>,
    pub feed_entries: usize,
    pub tags: usize,
    pub sitemap_urls: usize,
    pub stylesheet: Option<StylesheetOutcome>,
    pub header_rewritten: bool,
    pub critical_css_created: bool,
}

/// What a dry run found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckSummary {
    pub posts: usize,
    pub hidden_posts: usize,
    pub photo_pages: usize,
    pub tags: usize,
    pub skipped: Vec<SkippedPost>,
    /// Slugs whose date does not parse as `YYYY-MM-DD`.
    pub unparseable_dates: Vec<String>,
}

/// Rebuild every artifact of the site.
///
/// `build_date` is the `lastmod` of the homepage, tag pages and tag
/// directory in the sitemap.
pub fn build_site(
    site: &Site,
    delegates: &Delegates<'_>,
    build_date: NaiveDate,
) -> Result<BuildSummary, BuildError> {
    let config = &site.config;
    let mut summary = BuildSummary::default();

    let templates_dir = site.templates_dir();
    let mut templates = Templates::load(&templates_dir)?;

    for dir in [site.posts_dir(), site.feed_dir(), site.tags_dir()] {
        fs::create_dir_all(&dir)?;
    }
    if let Some(css_dir) = site.stylesheet().parent() {
        fs::create_dir_all(css_dir)?;
    }

    summary.critical_css_created = assets::ensure_critical_css(&site.critical_css())?;
    if summary.critical_css_created {
        tracing::info!(path = %site.critical_css().display(), "created empty critical CSS");
    }

    // Stylesheet, then the header, before any page is composed.
    let stylesheet = site.stylesheet();
    if let Some(outcome) = assets::publish_stylesheet(&stylesheet, delegates.fingerprinter)? {
        if outcome.minted {
            tracing::info!(
                file = %outcome.filename,
                fingerprint = %outcome.fingerprint,
                "stylesheet changed, new fingerprint"
            );
        } else {
            tracing::info!(file = %outcome.filename, "stylesheet unchanged");
        }
        let header_path = Templates::header_path(&templates_dir);
        summary.header_rewritten =
            assets::update_header_template(&header_path, &stylesheet, &outcome)?;
        if summary.header_rewritten {
            tracing::info!(file = %outcome.filename, "header now references stylesheet");
            templates = Templates::load(&templates_dir)?;
        }
        summary.stylesheet = Some(outcome);
    }

    let critical_css = assets::read_critical_css(&site.critical_css())?;
    let composer = PageComposer::new(templates, &config.site_title, &critical_css);

    // Per-post pass.
    let scanned = scan::scan_posts(&site.posts_dir(), &config.source_file)?;
    summary.skipped = scanned.skipped;

    let mut tag_index = TagIndex::new();
    let mut all_posts = Vec::with_capacity(scanned.posts.len());
    let mut feed_entries = Vec::new();

    for post in &scanned.posts {
        let built = build_post(post, site, delegates, &composer)?;
        tag_index.record_post(&post.tags, &built.summary);
        if let Some(entry) = built.feed_entry {
            feed_entries.push(entry);
        } else {
            summary.hidden_posts += 1;
        }
        all_posts.push(built.summary);
        summary.posts_written += 1;
    }

    // Aggregation pass.
    sort_newest_first(&mut feed_entries, |e| &e.date);
    summary.feed_entries = feed_entries.len();

    let listed: Vec<PostSummary> = feed_entries.iter().map(FeedEntry::summary).collect();
    let home = generate::home_page(&listed).into_string();
    write_page(
        &site.root.join(&config.index_file),
        &composer.compose(
            PageVars {
                title: &config.site_title,
                body_class: generate::HOME_BODY_CLASS,
            },
            &home,
        ),
    )?;
    tracing::info!(posts = listed.len(), "wrote homepage");

    let tags = tag_index.tags_in_order();
    for tag in &tags {
        let body = generate::tag_page(tag).into_string();
        let page = composer.compose(
            PageVars {
                title: &tag.display_name,
                body_class: generate::TAG_BODY_CLASS,
            },
            &body,
        );
        write_page(
            &site.tags_dir().join(&tag.slug).join(&config.index_file),
            &page,
        )?;
    }
    summary.tags = tags.len();
    tracing::info!(tags = tags.len(), "wrote tag pages");

    let directory = generate::tag_directory(&tags, site).into_string();
    write_page(
        &site.tags_dir().join(&config.index_file),
        &composer.compose(
            PageVars {
                title: generate::TAG_DIRECTORY_TITLE,
                body_class: generate::TAG_DIRECTORY_BODY_CLASS,
            },
            &directory,
        ),
    )?;
    tracing::info!("wrote tag directory");

    let feed_dir = site.feed_dir();
    fs::write(
        feed_dir.join(feed::RSS_FILENAME),
        feed::render_rss(&feed_entries, site)?,
    )?;
    fs::write(
        feed_dir.join(feed::JSON_FILENAME),
        feed::render_json(&feed_entries, site)?,
    )?;
    tracing::info!(entries = feed_entries.len(), "wrote feeds");

    let entries = sitemap::sitemap_entries(site, &all_posts, &tags, build_date);
    fs::write(
        site.root.join(sitemap::SITEMAP_FILENAME),
        sitemap::render_sitemap(&entries)?,
    )?;
    summary.sitemap_urls = entries.len();
    tracing::info!(urls = entries.len(), "wrote sitemap");

    Ok(summary)
}

struct BuiltPost {
    summary: PostSummary,
    /// `None` for posts hidden from the feeds.
    feed_entry: Option<FeedEntry>,
}

fn build_post(
    post: &Post,
    site: &Site,
    delegates: &Delegates<'_>,
    composer: &PageComposer,
) -> Result<BuiltPost, BuildError> {
    let render_err = |source| BuildError::Render {
        slug: post.slug.clone(),
        source,
    };
    let body_html = delegates
        .renderer
        .render(&post.body_markdown)
        .map_err(render_err)?;
    let description_html = delegates
        .renderer
        .render_inline(&post.description_markdown)
        .map_err(render_err)?;

    let gallery_html = if post.photo_page {
        gallery::build_gallery(&post.dir, delegates.images, site.config.thumbnail_size).map_err(
            |source| BuildError::Gallery {
                slug: post.slug.clone(),
                source,
            },
        )?
    } else {
        String::new()
    };

    let fragment = generate::post_body(post, &body_html, &gallery_html, site).into_string();
    let body_class = post.body_class();
    let page = composer.compose(
        PageVars {
            title: &post.title,
            body_class: &body_class,
        },
        &fragment,
    );
    let page_path = post.dir.join(&site.config.index_file);
    write_page(&page_path, &page)?;
    tracing::info!(slug = %post.slug, "built post");

    let summary = PostSummary {
        date: post.date.clone(),
        title: post.title.clone(),
        slug: post.slug.clone(),
        url: site.post_url(&post.slug),
        description_html: description_html.clone(),
    };

    if post.hide_from_feed {
        tracing::debug!(slug = %post.slug, "hidden from feeds");
        return Ok(BuiltPost {
            summary,
            feed_entry: None,
        });
    }

    let written = fs::read_to_string(&page_path)?;
    let content_html = match extract_post_content(&written) {
        Some(content) => content.to_string(),
        None => {
            tracing::warn!(slug = %post.slug, "post markers missing from templates, feeding body only");
            fragment
        }
    };

    Ok(BuiltPost {
        feed_entry: Some(FeedEntry {
            date: post.date.clone(),
            title: post.title.clone(),
            tags: post.tags.clone(),
            slug: post.slug.clone(),
            url: summary.url.clone(),
            description_html,
            content_html,
        }),
        summary,
    })
}

fn write_page(path: &Path, html: &str) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, html)?;
    Ok(())
}

/// Validate templates and posts without writing anything.
pub fn check_site(site: &Site) -> Result<CheckSummary, BuildError> {
    Templates::load(&site.templates_dir())?;
    let scanned = scan::scan_posts(&site.posts_dir(), &site.config.source_file)?;

    let mut summary = CheckSummary {
        posts: scanned.posts.len(),
        skipped: scanned.skipped,
        ..CheckSummary::default()
    };
    let mut tag_index = TagIndex::new();
    for post in &scanned.posts {
        if post.hide_from_feed {
            summary.hidden_posts += 1;
        }
        if post.photo_page {
            summary.photo_pages += 1;
        }
        if post.parsed_date().is_none() {
            summary.unparseable_dates.push(post.slug.clone());
        }
        let placeholder = PostSummary {
            date: post.date.clone(),
            title: post.title.clone(),
            slug: post.slug.clone(),
            url: site.post_url(&post.slug),
            description_html: String::new(),
        };
        tag_index.record_post(&post.tags, &placeholder);
    }
    summary.tags = tag_index.len();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::MockBackend;
    use crate::render::CmarkRenderer;
    use crate::scan::SkipReason;
    use crate::test_helpers::*;
    use std::cell::Cell;
    use tempfile::TempDir;

    fn build_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()
    }

    fn run(site: &Site) -> Result<BuildSummary, BuildError> {
        let renderer = CmarkRenderer::new();
        let images = MockBackend::new();
        let fingerprinter = SequenceFingerprint::new();
        build_site(
            site,
            &Delegates {
                renderer: &renderer,
                images: &images,
                fingerprinter: &fingerprinter,
            },
            build_date(),
        )
    }

    fn two_posts() -> TempDir {
        let tmp = setup_site();
        let posts = tmp.path().join("posts");
        write_post(
            &posts,
            "older",
            "title: Older\ndate: 2025-09-27\ntags: Photos, summer, HoagieFest\ndescription: The first.",
            "Older *body*.\n",
        );
        write_post(
            &posts,
            "newer",
            "title: Newer\ndate: 2025-09-28\ntags: Photos",
            "Newer body.\n",
        );
        tmp
    }

    /// Renderer that fails on one marker string.
    struct FailingRenderer {
        calls: Cell<usize>,
    }

    impl MarkdownRenderer for FailingRenderer {
        fn render(&self, markdown: &str) -> Result<String, RenderError> {
            self.calls.set(self.calls.get() + 1);
            if markdown.contains("BOOM") {
                return Err(RenderError::Failed("boom".to_string()));
            }
            CmarkRenderer::new().render(markdown)
        }
    }

    // =========================================================================
    // Outputs
    // =========================================================================

    #[test]
    fn writes_every_artifact() {
        let tmp = two_posts();
        let summary = run(&site_at(tmp.path())).unwrap();

        for path in [
            "index.html",
            "posts/older/index.html",
            "posts/newer/index.html",
            "tags/index.html",
            "tags/photos/index.html",
            "tags/summer/index.html",
            "tags/hoagiefest/index.html",
            "feed/feed.xml",
            "feed/feed.json",
            "sitemap.xml",
            "css/critical.css",
            "css/style.00000001.min.css",
        ] {
            assert!(tmp.path().join(path).exists(), "missing {path}");
        }
        assert_eq!(summary.posts_written, 2);
        assert_eq!(summary.tags, 3);
        assert_eq!(summary.feed_entries, 2);
        // home + 2 posts + 3 tags + directory
        assert_eq!(summary.sitemap_urls, 7);
        assert!(summary.critical_css_created);
        assert!(summary.header_rewritten);
    }

    #[test]
    fn post_page_is_composed_from_templates() {
        let tmp = two_posts();
        run(&site_at(tmp.path())).unwrap();

        let page = read(tmp.path().join("posts/older/index.html"));
        assert!(page.starts_with("<!DOCTYPE html><html><head><title>Older | Hoagie Blog</title>"));
        assert!(page.contains(r#"href="/css/style.00000001.min.css""#));
        assert!(page.contains(r#"<body class="older">"#));
        assert!(page.contains("<em>body</em>"));
        assert!(page.contains(r#"<a href="/tags/hoagiefest/">HoagieFest</a>"#));
        assert!(page.ends_with("<footer>Hoagie Blog</footer></body></html>\n"));
    }

    #[test]
    fn homepage_lists_newest_first() {
        let tmp = two_posts();
        run(&site_at(tmp.path())).unwrap();

        let home = read(tmp.path().join("index.html"));
        assert!(home.find("2025-09-28").unwrap() < home.find("2025-09-27").unwrap());
        assert!(home.contains("<p>The first.</p>"));
    }

    #[test]
    fn tag_page_lists_post_once() {
        let tmp = two_posts();
        run(&site_at(tmp.path())).unwrap();

        let photos = read(tmp.path().join("tags/photos/index.html"));
        assert_eq!(photos.matches(r#"href="/posts/older/""#).count(), 1);
        assert!(photos.contains("<h1>Photos</h1>"));
        assert!(photos.find("/posts/newer/").unwrap() < photos.find("/posts/older/").unwrap());
    }

    #[test]
    fn tags_sharing_a_slug_count_post_once() {
        let tmp = setup_site();
        write_post(
            &tmp.path().join("posts"),
            "wawa-run",
            "title: Wawa Run\ndate: 2025-09-28\ntags: Wawa, wawa",
            "Late night.\n",
        );
        let summary = run(&site_at(tmp.path())).unwrap();
        assert_eq!(summary.tags, 1);

        let wawa = read(tmp.path().join("tags/wawa/index.html"));
        assert_eq!(wawa.matches(r#"href="/posts/wawa-run/""#).count(), 1);
        let directory = read(tmp.path().join("tags/index.html"));
        assert!(directory.contains(r#"<span class="count">(1)</span>"#));

        let check = check_site(&site_at(tmp.path())).unwrap();
        assert_eq!(check.tags, 1);
    }

    #[test]
    fn feed_content_is_the_marked_region() {
        let tmp = two_posts();
        run(&site_at(tmp.path())).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&read(tmp.path().join("feed/feed.json"))).unwrap();
        let content = json[1]["content"].as_str().unwrap();
        assert!(content.trim().starts_with(r#"<article class="post">"#));
        assert!(content.trim().ends_with("</article>"));
        assert!(!content.contains("<footer>"));
    }

    #[test]
    fn critical_css_is_inlined_into_pages() {
        let tmp = two_posts();
        fs::write(tmp.path().join("css/critical.css"), "h1 {\n  margin: 0;\n}\n").unwrap();
        run(&site_at(tmp.path())).unwrap();

        let page = read(tmp.path().join("posts/newer/index.html"));
        assert!(page.contains("<style>h1 { margin: 0;}</style>"));
    }

    #[test]
    fn photo_page_gets_gallery() {
        let tmp = setup_site();
        let posts = tmp.path().join("posts");
        write_post(&posts, "trip", "title: Trip\ndate: 2025-09-27\nphoto_page: 1", "");
        let photos = posts.join("trip/photos");
        fs::create_dir_all(&photos).unwrap();
        fs::write(photos.join("big-hoagie.jpg"), b"img").unwrap();

        run(&site_at(tmp.path())).unwrap();

        let page = read(posts.join("trip/index.html"));
        assert!(page.contains(r#"<div class="gallery">"#));
        assert!(page.contains("<figcaption>Big hoagie</figcaption>"));
    }

    // =========================================================================
    // Failure and skip policy
    // =========================================================================

    #[test]
    fn missing_template_fails_before_writing() {
        let tmp = two_posts();
        fs::remove_file(tmp.path().join("templates/footer.html")).unwrap();

        let err = run(&site_at(tmp.path())).unwrap_err();
        assert!(matches!(err, BuildError::Compose(ComposeError::MissingTemplate(_))));
        assert!(!tmp.path().join("index.html").exists());
        assert!(!tmp.path().join("css/critical.css").exists());
    }

    #[test]
    fn render_failure_names_the_post() {
        let tmp = two_posts();
        write_post(&tmp.path().join("posts"), "broken", "title: B\ndate: 2025-01-01", "BOOM");
        let renderer = FailingRenderer { calls: Cell::new(0) };
        let images = MockBackend::new();
        let fingerprinter = SequenceFingerprint::new();

        let err = build_site(
            &site_at(tmp.path()),
            &Delegates {
                renderer: &renderer,
                images: &images,
                fingerprinter: &fingerprinter,
            },
            build_date(),
        )
        .unwrap_err();

        assert!(matches!(err, BuildError::Render { ref slug, .. } if slug == "broken"));
        assert!(!tmp.path().join("posts/broken/index.html").exists());
        assert!(!tmp.path().join("sitemap.xml").exists());
    }

    #[test]
    fn gallery_failure_aborts_build() {
        let tmp = setup_site();
        let posts = tmp.path().join("posts");
        write_post(&posts, "trip", "title: Trip\nphoto_page: 1", "");
        fs::create_dir_all(posts.join("trip/photos")).unwrap();
        fs::write(posts.join("trip/photos/a.jpg"), b"img").unwrap();
        let renderer = CmarkRenderer::new();
        let images = MockBackend::failing();
        let fingerprinter = SequenceFingerprint::new();

        let err = build_site(
            &site_at(tmp.path()),
            &Delegates {
                renderer: &renderer,
                images: &images,
                fingerprinter: &fingerprinter,
            },
            build_date(),
        )
        .unwrap_err();

        assert!(matches!(err, BuildError::Gallery { ref slug, .. } if slug == "trip"));
    }

    #[test]
    fn skipped_posts_are_reported() {
        let tmp = two_posts();
        fs::create_dir_all(tmp.path().join("posts/empty-dir")).unwrap();

        let summary = run(&site_at(tmp.path())).unwrap();
        assert_eq!(summary.posts_written, 2);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].reason, SkipReason::NoSource);
    }

    #[test]
    fn missing_stylesheet_leaves_header_alone() {
        let tmp = two_posts();
        fs::remove_file(tmp.path().join("css/style.css")).unwrap();

        let summary = run(&site_at(tmp.path())).unwrap();
        assert!(summary.stylesheet.is_none());
        assert!(!summary.header_rewritten);
        assert_eq!(read(tmp.path().join("templates/header.html")), TEST_HEADER);
    }

    // =========================================================================
    // Check
    // =========================================================================

    #[test]
    fn check_counts_without_writing() {
        let tmp = two_posts();
        write_post(
            &tmp.path().join("posts"),
            "secret",
            "title: S\ndate: someday\nhide_from_feed: yes\ntags: Photos",
            "",
        );

        let summary = check_site(&site_at(tmp.path())).unwrap();
        assert_eq!(summary.posts, 3);
        assert_eq!(summary.hidden_posts, 1);
        assert_eq!(summary.tags, 3);
        assert_eq!(summary.unparseable_dates, vec!["secret"]);
        assert!(!tmp.path().join("index.html").exists());
        assert!(!tmp.path().join("css/critical.css").exists());
    }
}
