//! The render tree: a path-segment index over a [`Collection`].
//!
//! Requests are answered by walking this tree one URL segment at a time:
//!
//! ```text
//! /                          Directory ""          → listing of every post
//! ├── index.html             Redirect "/"
//! ├── alpha.html             Post
//! └── 2012/                  Directory "2012"      → listing of 2012/…
//!     ├── index.html         Redirect "/2012/"
//!     └── 1/                 Directory "2012/1"
//!         ├── index.html     Redirect "/2012/1/"
//!         ├── b_test.html    Post
//!         └── c_test.html    Post
//! ```
//!
//! A directory's `index.html` is a redirect to the directory itself unless a
//! real post owns that URL, so `/2012/index.html` and `/2012/` render the same
//! listing under one canonical address.
//!
//! Trees are built once from a collection and never mutated. A rebuild makes
//! a new tree and the engine swaps it in whole.

use crate::post::Post;
use crate::scan::Collection;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::Arc;
use thiserror::Error;

/// Segment rendered when a directory itself is requested.
pub const INDEX_SEGMENT: &str = "index.html";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TreeError {
    #[error("URL {url} needs '{segment}' as both a post and a directory")]
    Conflict { url: String, segment: String },
    #[error("URL {url:?} contains an empty path segment")]
    EmptySegment { url: String },
}

/// One node of the render tree.
#[derive(Debug)]
pub enum RenderNode {
    Post(Arc<Post>),
    Directory(DirectoryNode),
    /// Permanent redirect to an absolute URL path.
    Redirect(String),
}

/// A directory of the URL space.
///
/// `prefix` is the directory's URL without slashes at either end (`""` for
/// the root, `"2012/1"` below it). The parent is the prefix minus its last
/// segment; nodes never point back up the tree.
#[derive(Debug, Default)]
pub struct DirectoryNode {
    prefix: String,
    children: BTreeMap<String, RenderNode>,
}

/// Absolute URL path for a directory prefix.
pub fn directory_url(prefix: &str) -> String {
    if prefix.is_empty() {
        "/".to_string()
    } else {
        format!("/{prefix}/")
    }
}

/// What a request path resolved to.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    Post(&'a Arc<Post>),
    Directory(&'a DirectoryNode),
    Redirect(&'a str),
}

impl DirectoryNode {
    fn new(prefix: String) -> Self {
        Self {
            prefix,
            children: BTreeMap::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn is_root(&self) -> bool {
        self.prefix.is_empty()
    }

    /// Prefix of the enclosing directory, `None` for the root.
    pub fn parent_prefix(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        Some(self.prefix.rsplit_once('/').map_or("", |(parent, _)| parent))
    }

    /// Absolute URL path of the directory (`/` or `/2012/1/`).
    pub fn url(&self) -> String {
        directory_url(&self.prefix)
    }

    pub fn child(&self, segment: &str) -> Option<&RenderNode> {
        self.children.get(segment)
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &RenderNode)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Walk `path` from this directory.
    ///
    /// Leading and trailing slashes are ignored and an empty path means this
    /// directory. Landing on a directory yields its `index.html` post if one
    /// exists, else the directory itself. `None` when a segment is missing
    /// or the walk has to pass through a post or redirect.
    pub fn resolve(&self, path: &str) -> Option<Target<'_>> {
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return Some(self.as_target());
        }

        let segments: Vec<&str> = trimmed.split('/').collect();
        let (last, interior) = segments.split_last()?;

        let mut dir = self;
        for segment in interior {
            match dir.children.get(*segment)? {
                RenderNode::Directory(child) => dir = child,
                RenderNode::Post(_) | RenderNode::Redirect(_) => return None,
            }
        }

        Some(match dir.children.get(*last)? {
            RenderNode::Post(post) => Target::Post(post),
            RenderNode::Redirect(target) => Target::Redirect(target),
            RenderNode::Directory(child) => child.as_target(),
        })
    }

    fn as_target(&self) -> Target<'_> {
        match self.children.get(INDEX_SEGMENT) {
            Some(RenderNode::Post(post)) => Target::Post(post),
            _ => Target::Directory(self),
        }
    }

    fn insert_post(&mut self, url: &str, post: &Arc<Post>) -> Result<(), TreeError> {
        let segments: Vec<&str> = url.split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(TreeError::EmptySegment {
                url: url.to_string(),
            });
        }
        let Some((last, interior)) = segments.split_last() else {
            return Err(TreeError::EmptySegment {
                url: url.to_string(),
            });
        };

        let mut dir = self;
        for (depth, segment) in interior.iter().enumerate() {
            let prefix = segments[..=depth].join("/");
            let child = dir
                .children
                .entry((*segment).to_string())
                .or_insert_with(|| RenderNode::Directory(DirectoryNode::new(prefix.clone())));
            dir = match child {
                RenderNode::Directory(child) => child,
                RenderNode::Post(_) | RenderNode::Redirect(_) => {
                    return Err(TreeError::Conflict {
                        url: url.to_string(),
                        segment: prefix,
                    });
                }
            };
        }

        match dir.children.entry((*last).to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(RenderNode::Post(Arc::clone(post)));
                Ok(())
            }
            Entry::Occupied(_) => Err(TreeError::Conflict {
                url: url.to_string(),
                segment: url.to_string(),
            }),
        }
    }

    fn add_index_redirects(&mut self) {
        for child in self.children.values_mut() {
            if let RenderNode::Directory(dir) = child {
                dir.add_index_redirects();
            }
        }
        let url = self.url();
        self.children
            .entry(INDEX_SEGMENT.to_string())
            .or_insert(RenderNode::Redirect(url));
    }

    /// Whether a real post owns this directory's `index.html`.
    pub fn has_index_post(&self) -> bool {
        matches!(self.children.get(INDEX_SEGMENT), Some(RenderNode::Post(_)))
    }

    /// This directory and every directory below it, parents first.
    pub fn directories(&self) -> Vec<&DirectoryNode> {
        let mut out = vec![self];
        for child in self.children.values() {
            if let RenderNode::Directory(dir) = child {
                out.extend(dir.directories());
            }
        }
        out
    }

    /// Every post below this directory with the path that reaches it.
    #[cfg(test)]
    pub(crate) fn posts(&self) -> Vec<(String, &Arc<Post>)> {
        let mut out = Vec::new();
        for (segment, child) in &self.children {
            let path = if self.is_root() {
                segment.clone()
            } else {
                format!("{}/{}", self.prefix, segment)
            };
            match child {
                RenderNode::Post(post) => out.push((path, post)),
                RenderNode::Directory(dir) => out.extend(dir.posts()),
                RenderNode::Redirect(_) => {}
            }
        }
        out
    }
}

/// Build the tree for `collection`, walking its URLs in sorted order.
pub fn build(collection: &Collection) -> Result<DirectoryNode, TreeError> {
    let mut root = DirectoryNode::new(String::new());
    for (url, post) in collection.iter() {
        root.insert_post(url, post)?;
    }
    root.add_index_redirects();
    Ok(root)
}
