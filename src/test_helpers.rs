//! Shared test utilities for the blackblog test suite.
//!
//! Provides fixture setup, post writers, and lookup helpers that panic with a
//! clear message on a miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let collection = Collection::build(scan(tmp.path()).unwrap().posts);
//!
//! let post = find_post(&collection, "2012/1/b_test.html");
//! assert_eq!(post.title(), "B Test");
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use crate::post::Post;
use crate::scan::{Collection, ScanReport, scan};
use crate::tree::{self, DirectoryNode};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/posts/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/posts");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write `content` to `root/rel`, creating parent directories.
pub fn write_post(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

/// Scan `root` and build both the collection and its tree.
pub fn build_all(root: &Path) -> (Collection, DirectoryNode) {
    let collection = Collection::build(scan(root).unwrap().posts);
    let tree = tree::build(&collection).unwrap();
    (collection, tree)
}

// =========================================================================
// Lookups
// =========================================================================

/// Find a post by URL. Panics if not found.
pub fn find_post<'a>(collection: &'a Collection, url: &str) -> &'a Arc<Post> {
    collection.get(url).unwrap_or_else(|| {
        panic!(
            "post '{url}' not found. Available: {:?}",
            collection.urls()
        )
    })
}

/// Post titles in scan order.
pub fn titles(report: &ScanReport) -> Vec<&str> {
    report.posts.iter().map(Post::title).collect()
}
