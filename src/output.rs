//! CLI output formatting for compile and serve modes.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Each post leads with
//! its positional index and title, followed by `→` and the URL it was written
//! to. Source paths appear only as indented context, relative to the source
//! root, where they help trace a problem back to a file.
//!
//! # Output Format
//!
//! ## Compile
//!
//! ```text
//! Posts
//! 001 B Test → 2012/1/b_test.html
//! 002 C Test → 2012/1/c_test.html
//! 003 Alpha → alpha.html
//!
//! Listings
//!     index.html
//!     2012/index.html
//!
//! Collisions
//!     same.html
//!         Kept: a.md
//!         Dropped: b.md
//!
//! Compiled 3 posts, 2 listings into dist
//! ```
//!
//! ## Serve
//!
//! ```text
//! Serving 4 posts from posts
//!     http://0.0.0.0:8080/
//!     Static: /static/ → posts/static
//!     Polling every 30s
//! ```
//!
//! # Architecture
//!
//! Each mode has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::compile::CompileReport;
use crate::scan::{SkippedEntry, UrlCollision};
use crate::server::StaticFiles;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format a post line: index + title, untitled posts show their URL alone.
///
/// ```text
/// 001 B Test → 2012/1/b_test.html
/// 002 (untitled) → notes.html
/// ```
fn post_line(index: usize, title: &str, url: &str) -> String {
    let title = if title.is_empty() { "(untitled)" } else { title };
    format!("{} {} \u{2192} {}", format_index(index), title, url)
}

/// Display `path` relative to `root` when it lives under it.
fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{} {}", n, if n == 1 { one } else { many })
}

/// Lines for entries a scan left out.
pub fn format_skipped(skipped: &[SkippedEntry], source_root: &Path) -> Vec<String> {
    if skipped.is_empty() {
        return Vec::new();
    }
    let mut lines = vec!["Skipped".to_string()];
    for entry in skipped {
        lines.push(format!(
            "{}{}: {}",
            indent(1),
            relative(&entry.path, source_root),
            entry.reason
        ));
    }
    lines
}

/// Lines for URL collisions, showing which source won.
pub fn format_collisions(collisions: &[UrlCollision], source_root: &Path) -> Vec<String> {
    if collisions.is_empty() {
        return Vec::new();
    }
    let mut lines = vec!["Collisions".to_string()];
    for collision in collisions {
        lines.push(format!("{}{}", indent(1), collision.url));
        lines.push(format!(
            "{}Kept: {}",
            indent(2),
            relative(&collision.kept, source_root)
        ));
        lines.push(format!(
            "{}Dropped: {}",
            indent(2),
            relative(&collision.dropped, source_root)
        ));
    }
    lines
}

// ============================================================================
// Compile
// ============================================================================

/// Format the result of a compile run.
pub fn format_compile_output(report: &CompileReport, source_root: &Path, dest: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    if !report.pages.is_empty() {
        lines.push("Posts".to_string());
        for (i, page) in report.pages.iter().enumerate() {
            lines.push(post_line(i + 1, &page.title, &page.url));
        }
    }

    if !report.listings.is_empty() {
        lines.push(String::new());
        lines.push("Listings".to_string());
        for url in &report.listings {
            lines.push(format!("{}{}", indent(1), url));
        }
    }

    if !report.failed.is_empty() {
        lines.push(String::new());
        lines.push("Failed".to_string());
        for failed in &report.failed {
            lines.push(format!("{}{}: {}", indent(1), failed.url, failed.reason));
        }
    }

    for section in [
        format_skipped(&report.skipped, source_root),
        format_collisions(&report.collisions, source_root),
    ] {
        if !section.is_empty() {
            lines.push(String::new());
            lines.extend(section);
        }
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "Compiled {}, {} into {}",
        plural(report.pages.len(), "post", "posts"),
        plural(report.listings.len(), "listing", "listings"),
        dest.display()
    ));

    lines
}

/// Print compile output to stdout.
pub fn print_compile_output(report: &CompileReport, source_root: &Path, dest: &Path) {
    for line in format_compile_output(report, source_root, dest) {
        println!("{}", line);
    }
}

// ============================================================================
// Serve
// ============================================================================

/// Format the banner shown once the server is listening.
pub fn format_serve_output(
    addr: SocketAddr,
    source_root: &Path,
    posts: usize,
    poll_interval: Duration,
    statics: Option<&StaticFiles>,
) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Serving {} from {}",
            plural(posts, "post", "posts"),
            source_root.display()
        ),
        format!("{}http://{}/", indent(1), addr),
    ];
    if let Some(statics) = statics {
        lines.push(format!(
            "{}Static: {} \u{2192} {}",
            indent(1),
            statics.prefix(),
            statics.root().display()
        ));
    }
    lines.push(format!(
        "{}Polling every {}s",
        indent(1),
        poll_interval.as_secs()
    ));
    lines
}

/// Print the serve banner to stdout.
pub fn print_serve_output(
    addr: SocketAddr,
    source_root: &Path,
    posts: usize,
    poll_interval: Duration,
    statics: Option<&StaticFiles>,
) {
    for line in format_serve_output(addr, source_root, posts, poll_interval, statics) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
