//! HTML rendering for posts and listings.
//!
//! A post page is a fixed header block followed by the Markdown body:
//!
//! ```html
//! <div id="header"><h1 id="title">{Title}</h1><h2 id="date">{Date}</h2></div>
//! ...rendered Markdown...
//! ```
//!
//! Listings link every post under a directory in sorted URL order. Both are
//! wrapped in the same minimal document with the stylesheet inlined, so
//! compiled output needs no asset files.
//!
//! Uses [maud](https://maud.lambda.xyz/) for the document shell, which escapes
//! every substituted string, and pulldown-cmark for the Markdown.

use crate::config::RenderConfig;
use crate::post::Metadata;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Options, Parser, html as md_html};

const CSS: &str = include_str!("../static/style.css");

/// Markdown rendering switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub smart_punctuation: bool,
}

impl From<&RenderConfig> for RenderOptions {
    fn from(config: &RenderConfig) -> Self {
        Self {
            smart_punctuation: config.smart_punctuation,
        }
    }
}

/// One line of a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Canonical URL without a leading slash.
    pub url: String,
    pub title: String,
    pub date: String,
}

/// Render a full post page from its metadata and Markdown body.
pub fn render_post(meta: &Metadata, body: &[u8], options: &RenderOptions) -> String {
    let source = String::from_utf8_lossy(body);
    let content = html! {
        (post_header(meta))
        article.post {
            (PreEscaped(markdown_to_html(&source, options)))
        }
    };
    base_document(&meta.title, content).into_string()
}

/// Render a listing page linking each entry.
///
/// `parent` is the URL of the enclosing directory, shown as an "up" link.
pub fn render_listing(title: &str, entries: &[ListingEntry], parent: Option<&str>) -> String {
    let content = html! {
        div id="header" {
            h1 id="title" { (title) }
        }
        @if let Some(parent) = parent {
            p.up { a href=(parent) { "↑ Up" } }
        }
        @if entries.is_empty() {
            p.empty { "Nothing here yet." }
        } @else {
            ul.post-list {
                @for entry in entries {
                    li {
                        a href={ "/" (entry.url) } {
                            @if entry.title.is_empty() { (entry.url) } @else { (entry.title) }
                        }
                        @if !entry.date.is_empty() {
                            span.post-date { (entry.date) }
                        }
                    }
                }
            }
        }
    };
    base_document(title, content).into_string()
}

/// The fixed title/date block above every post.
fn post_header(meta: &Metadata) -> Markup {
    html! {
        div id="header" {
            h1 id="title" { (meta.title) }
            h2 id="date" { (meta.date) }
        }
    }
}

fn markdown_to_html(source: &str, options: &RenderOptions) -> String {
    let mut flags = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    if options.smart_punctuation {
        flags |= Options::ENABLE_SMART_PUNCTUATION;
    }
    let parser = Parser::new_ext(source, flags);
    let mut out = String::with_capacity(source.len() * 3 / 2);
    md_html::push_html(&mut out, parser);
    out
}

fn base_document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                (content)
            }
        }
    }
}
