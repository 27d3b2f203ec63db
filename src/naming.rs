//! Canonical URL derivation for posts.
//!
//! Every post gets exactly one URL, computed from its metadata alone:
//!
//! ```text
//! ~~url: b_test
//! ~~date: 6 January 2012        →  2012/1/b_test.html
//!
//! ~~title: Hello World          →  hello_world.html
//!
//! (no metadata) notes/Draft.md  →  draft.html
//! ```
//!
//! ## Basename
//!
//! The first non-empty source wins: the `url` field verbatim, then the title
//! with spaces turned into underscores, then the source file stem. The result
//! is lower-cased and gets an `.html` suffix.
//!
//! ## Date prefix
//!
//! A date in one of the accepted formats prefixes the basename with
//! `<year>/<month>/`. The month is not zero-padded, so `2012/10/` sorts before
//! `2012/2/`. Collections sort URLs as plain strings and that ordering is
//! kept as is.
//!
//! ## Path cleaning
//!
//! The pieces are joined like URL paths: empty and `.` segments vanish and
//! `..` removes the segment before it. A `..` with nothing left to remove is
//! dropped, so a URL never climbs above the site root:
//!
//! ```text
//! ~~url: ../x    ~~date: 6 January 2012   →  2012/x.html
//! ~~url: /about                           →  about.html
//! ~~url: ../../escaped                    →  escaped.html
//! ```

use chrono::{Datelike, NaiveDate};
use std::path::Path;

/// Accepted `date` layouts, tried in order.
///
/// - `6 January 2012`
/// - `January 6, 2012`
/// - `January 6 2012`
const DATE_FORMATS: &[&str] = &["%d %B %Y", "%B %d, %Y", "%B %d %Y"];

/// Parse a post date. Returns `None` for empty or unrecognized input.
///
/// Months must be spelled out in full (case-insensitive); `6 Jan 2012` is
/// not a date.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    let date = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(input, format).ok())?;
    // chrono's %B also takes abbreviations.
    let month = date.format("%B").to_string().to_lowercase();
    input.to_lowercase().contains(&month).then_some(date)
}

/// Choose the lower-cased basename (without `.html`) for a post.
pub fn basename(url_fragment: &str, title: &str, source: &Path) -> String {
    let base = if !url_fragment.is_empty() {
        url_fragment.to_string()
    } else if !title.is_empty() {
        title.replace(' ', "_")
    } else {
        source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    };
    base.to_lowercase()
}

/// Build the canonical URL for a post from its metadata fields.
pub fn canonical_url(url_fragment: &str, title: &str, date: &str, source: &Path) -> String {
    let file = format!("{}.html", basename(url_fragment, title, source));
    match parse_date(date) {
        Some(date) => join_segments(&[&date.year().to_string(), &date.month().to_string(), &file]),
        None => join_segments(&[&file]),
    }
}

/// Join URL pieces into a clean relative path.
///
/// Never yields a leading slash, an empty segment, `.`, or `..`.
fn join_segments(parts: &[&str]) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in parts.iter().flat_map(|p| p.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }
    segments.join("/")
}
