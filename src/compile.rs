//! One-shot compilation of the blog to static files.
//!
//! Writes every post to its canonical URL under the destination, plus an
//! `index.html` listing for each directory whose index no post owns:
//!
//! ```text
//! dest/
//! ├── index.html                 # Listing of every post
//! ├── alpha.html
//! └── 2012/
//!     ├── index.html             # Listing of 2012/…
//!     └── 1/
//!         ├── index.html
//!         ├── b_test.html
//!         └── c_test.html
//! ```
//!
//! A post that fails to read or write is logged and reported, and the rest
//! are still written. Only a failure to scan, build, or create the
//! destination stops the run.

use crate::config::BlogConfig;
use crate::engine::{self, ServeError, Snapshot};
use crate::render::{self, RenderOptions};
use crate::scan::{self, ScanError, SkippedEntry, UrlCollision};
use crate::tree::{self, INDEX_SEGMENT, TreeError};
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Listing(#[from] ServeError),
    #[error("cannot write {}: {source}", path.display())]
    Output { path: PathBuf, source: io::Error },
}

/// A post written to disk.
#[derive(Debug, Clone)]
pub struct CompiledPage {
    pub url: String,
    pub title: String,
}

/// A post that could not be written, and why.
#[derive(Debug, Clone)]
pub struct FailedPage {
    pub url: String,
    pub reason: String,
}

/// Everything a compile run did.
#[derive(Debug, Default)]
pub struct CompileReport {
    /// Posts written, in URL order.
    pub pages: Vec<CompiledPage>,
    /// Listing pages written, as URLs (`index.html`, `2012/index.html`).
    pub listings: Vec<String>,
    pub failed: Vec<FailedPage>,
    pub skipped: Vec<SkippedEntry>,
    pub collisions: Vec<UrlCollision>,
}

/// Render every post under `root` into `dest`.
pub fn compile(root: &Path, dest: &Path, config: &BlogConfig) -> Result<CompileReport, CompileError> {
    let scanned = scan::scan(root)?;
    let skipped = scanned.skipped.clone();
    let snapshot = Snapshot::build(scanned)?;
    let options = RenderOptions::from(&config.render);

    fs::create_dir_all(dest).map_err(|source| CompileError::Output {
        path: dest.to_path_buf(),
        source,
    })?;

    let results: Vec<_> = snapshot
        .collection()
        .iter()
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(|(url, post)| {
            let written = post
                .contents()
                .map_err(|e| e.to_string())
                .and_then(|body| {
                    let html = render::render_post(post.metadata(), &body, &options);
                    write_page(dest, url, &html).map_err(|e| e.to_string())
                });
            (url, post.title(), written)
        })
        .collect();

    let mut report = CompileReport {
        skipped,
        collisions: snapshot.collection().collisions().to_vec(),
        ..CompileReport::default()
    };

    for (url, title, written) in results {
        match written {
            Ok(()) => report.pages.push(CompiledPage {
                url: url.to_string(),
                title: title.to_string(),
            }),
            Err(reason) => {
                tracing::warn!(url, error = %reason, "Failed to write post");
                report.failed.push(FailedPage {
                    url: url.to_string(),
                    reason,
                });
            }
        }
    }

    for dir in snapshot.tree().directories() {
        if dir.has_index_post() {
            continue;
        }
        let entries = snapshot.listing(dir.prefix())?;
        let parent = dir.parent_prefix().map(tree::directory_url);
        let html = render::render_listing(
            &engine::listing_title(&config.title, dir.prefix()),
            &entries,
            parent.as_deref(),
        );
        let url = listing_url(dir.prefix());
        write_page(dest, &url, &html).map_err(|source| CompileError::Output {
            path: dest.join(&url),
            source,
        })?;
        report.listings.push(url);
    }

    tracing::info!(
        pages = report.pages.len(),
        listings = report.listings.len(),
        failed = report.failed.len(),
        "Compile finished"
    );
    Ok(report)
}

fn listing_url(prefix: &str) -> String {
    if prefix.is_empty() {
        INDEX_SEGMENT.to_string()
    } else {
        format!("{prefix}/{INDEX_SEGMENT}")
    }
}

/// Write `html` to `dest/url`, creating parent directories.
///
/// `url` must be a plain relative path; anything that could land outside
/// `dest` is refused.
fn write_page(dest: &Path, url: &str, html: &str) -> io::Result<()> {
    let rel = Path::new(url);
    if url.is_empty() || !rel.components().all(|c| matches!(c, Component::Normal(_))) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("refusing to write outside the destination: {url:?}"),
        ));
    }
    let path = dest.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, html)
}
