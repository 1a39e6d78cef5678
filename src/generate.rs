//! HTML fragments for every page type.
//!
//! These are the bodies handed to the [`PageComposer`](crate::compose::PageComposer);
//! the surrounding chrome comes from the header/footer templates.
//!
//! ## Pages
//!
//! | Page | Fragment | Composed with |
//! |---|---|---|
//! | Post (`/posts/<slug>/`) | [`post_body`] | title = post title, class = slug + section |
//! | Homepage (`/`) | [`home_page`] | title = site title, class = `home` |
//! | Tag (`/tags/<slug>/`) | [`tag_page`] | title = tag name, class = `tag` |
//! | Tag directory (`/tags/`) | [`tag_directory`] | title = `Tags`, class = `tags` |
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Titles and tag names are escaped; rendered Markdown is inserted as-is.

use crate::config::Site;
use crate::tags::{Tag, tag_slug};
use crate::types::{Post, PostSummary};
use maud::{Markup, PreEscaped, html};

pub const HOME_BODY_CLASS: &str = "home";
pub const TAG_BODY_CLASS: &str = "tag";
pub const TAG_DIRECTORY_BODY_CLASS: &str = "tags";
pub const TAG_DIRECTORY_TITLE: &str = "Tags";

// ============================================================================
// Components
// ============================================================================

/// Links for a post's tags; tags that slug to nothing are left out.
fn tag_links(tags: &[String], site: &Site) -> Markup {
    let linked: Vec<(String, &str)> = tags
        .iter()
        .map(|raw| (tag_slug(raw), raw.trim()))
        .filter(|(slug, _)| !slug.is_empty())
        .collect();

    html! {
        @if !linked.is_empty() {
            ul.tags {
                @for (slug, name) in &linked {
                    li { a href=(site.tag_url(slug)) { (name) } }
                }
            }
        }
    }
}

/// Newest-first listing used by the homepage and tag pages.
fn post_list(posts: &[PostSummary]) -> Markup {
    html! {
        ul.post-list {
            @for post in posts {
                li.post-summary {
                    time datetime=(post.date) { (post.date) }
                    " "
                    a href=(post.url) { (post.title) }
                    @if !post.description_html.is_empty() {
                        div.post-description { (PreEscaped(&post.description_html)) }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Page fragments
// ============================================================================

/// Main content of a post page: header row, body, gallery and tag links.
pub fn post_body(post: &Post, body_html: &str, gallery_html: &str, site: &Site) -> Markup {
    html! {
        article.post {
            header.post-header {
                time datetime=(post.date) { (post.date) }
                h1 { (post.title) }
            }
            div.post-body { (PreEscaped(body_html)) }
            @if !gallery_html.is_empty() {
                (PreEscaped(gallery_html))
            }
            (tag_links(&post.tags, site))
        }
    }
}

pub fn home_page(posts: &[PostSummary]) -> Markup {
    html! {
        section.home {
            (post_list(posts))
        }
    }
}

pub fn tag_page(tag: &Tag) -> Markup {
    html! {
        section.tag-page {
            h1 { (tag.display_name) }
            (post_list(&tag.members))
        }
    }
}

pub fn tag_directory(tags: &[Tag], site: &Site) -> Markup {
    html! {
        section.tag-directory {
            h1 { (TAG_DIRECTORY_TITLE) }
            ul.tag-list {
                @for tag in tags {
                    li {
                        a href=(site.tag_url(&tag.slug)) { (tag.display_name) }
                        " "
                        span.count { "(" (tag.members.len()) ")" }
                    }
                }
            }
        }
    }
}
