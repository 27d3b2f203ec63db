//! Source directory scanning and collection building.
//!
//! Turns a directory tree of Markdown files into a [`Collection`]: every post
//! keyed by its canonical URL, plus the URLs in sorted order.
//!
//! ## Directory Structure
//!
//! Layout is free-form. Only the file extension matters; the URL comes from
//! the post's metadata, not from where the file lives:
//!
//! ```text
//! posts/
//! ├── blog.toml              # Optional configuration (not a post)
//! ├── static/                # Optional assets, served verbatim
//! ├── hello.md               # → hello.html (no date)
//! ├── 2012/
//! │   ├── b_test.md          # ~~date: 6 January 2012  → 2012/1/b_test.html
//! │   └── c_test.md          # ~~date: 18 January 2012 → 2012/1/c_test.html
//! └── drafts/
//!     └── notes.txt          # Ignored (not .md)
//! ```
//!
//! ## Failure handling
//!
//! Only an unreadable root aborts a scan. A file that can't be read or an
//! unreadable subdirectory is recorded as a [`SkippedEntry`] in the
//! [`ScanReport`] and logged, and the walk carries on.
//!
//! ## URL collisions
//!
//! Two posts can derive the same URL. [`Collection::build`] orders posts by
//! source path first, so the post whose path sorts first always wins and the
//! others are reported as [`UrlCollision`]s. Losing posts are still held, so
//! an edit that gives one of them a URL of its own is noticed.

use crate::post::Post;
use rayon::prelude::*;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Extension of post source files.
pub const SOURCE_EXTENSION: &str = "md";

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("cannot read source directory {}: {source}", path.display())]
    UnreadableRoot { path: PathBuf, source: io::Error },
}

/// A file or directory left out of a scan, and why.
#[derive(Debug, Clone)]
pub struct SkippedEntry {
    pub path: PathBuf,
    pub reason: String,
}

/// Everything a scan found: the posts plus what it had to skip.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub posts: Vec<Post>,
    pub skipped: Vec<SkippedEntry>,
}

/// Walk `root` depth-first and open every `.md` file as a [`Post`].
pub fn scan(root: &Path) -> Result<ScanReport, ScanError> {
    fs::read_dir(root).map_err(|source| ScanError::UnreadableRoot {
        path: root.to_path_buf(),
        source,
    })?;

    let mut report = ScanReport::default();
    let mut sources = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden_dir(e));

    for entry in walker {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && is_source(entry.path()) {
                    sources.push(entry.into_path());
                }
            }
            Err(e) => {
                let path = e.path().unwrap_or(root).to_path_buf();
                tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable entry");
                report.skipped.push(SkippedEntry {
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }

    let opened: Vec<_> = sources
        .par_iter()
        .map(|path| (path, Post::open(path.as_path())))
        .collect();

    for (path, result) in opened {
        match result {
            Ok(post) => report.posts.push(post),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable post");
                report.skipped.push(SkippedEntry {
                    path: path.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    tracing::debug!(
        posts = report.posts.len(),
        skipped = report.skipped.len(),
        "Scan completed"
    );
    Ok(report)
}

/// Dot-directories (`.git`, `.cache`) are not walked. Dot-files are, so
/// `.draft.md` is a post like any other.
fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name().to_string_lossy().starts_with('.')
}

fn is_source(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
}

/// Two posts that derived the same URL.
#[derive(Debug, Clone)]
pub struct UrlCollision {
    pub url: String,
    /// Source path of the post that owns the URL.
    pub kept: PathBuf,
    /// Source path of the post left out.
    pub dropped: PathBuf,
}

/// Posts keyed by canonical URL, with the URLs in sorted order.
///
/// The key set of the map and the sorted list always hold the same URLs.
#[derive(Debug, Default)]
pub struct Collection {
    posts: HashMap<String, Arc<Post>>,
    urls: Vec<String>,
    collisions: Vec<UrlCollision>,
    /// Posts that lost a URL collision.
    shadowed: Vec<Arc<Post>>,
}

impl Collection {
    /// Assign every post its URL, drop collisions, and sort.
    pub fn build(mut posts: Vec<Post>) -> Self {
        posts.sort_by(|a, b| a.path().cmp(b.path()));

        let mut map: HashMap<String, Arc<Post>> = HashMap::with_capacity(posts.len());
        let mut urls = Vec::with_capacity(posts.len());
        let mut collisions = Vec::new();
        let mut shadowed = Vec::new();

        for post in posts {
            match map.entry(post.create_url()) {
                Entry::Vacant(slot) => {
                    urls.push(slot.key().clone());
                    slot.insert(Arc::new(post));
                }
                Entry::Occupied(slot) => {
                    tracing::warn!(
                        url = %slot.key(),
                        kept = %slot.get().path().display(),
                        dropped = %post.path().display(),
                        "Duplicate post URL"
                    );
                    collisions.push(UrlCollision {
                        url: slot.key().clone(),
                        kept: slot.get().path().to_path_buf(),
                        dropped: post.path().to_path_buf(),
                    });
                    shadowed.push(Arc::new(post));
                }
            }
        }

        urls.sort();

        Self {
            posts: map,
            urls,
            collisions,
            shadowed,
        }
    }

    pub fn get(&self, url: &str) -> Option<&Arc<Post>> {
        self.posts.get(url)
    }

    /// All URLs, sorted as plain strings.
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// Posts in URL order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Post>)> {
        self.urls
            .iter()
            .filter_map(|url| self.posts.get(url).map(|post| (url.as_str(), post)))
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn collisions(&self) -> &[UrlCollision] {
        &self.collisions
    }

    /// Every post handed to [`Collection::build`], collision losers last.
    pub fn sources(&self) -> impl Iterator<Item = &Arc<Post>> {
        self.iter().map(|(_, post)| post).chain(&self.shadowed)
    }

    /// Number of posts handed to [`Collection::build`], collisions included.
    pub fn source_count(&self) -> usize {
        self.posts.len() + self.shadowed.len()
    }
}
