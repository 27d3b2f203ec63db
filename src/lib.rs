//! # Blackblog
//!
//! A Markdown blog engine. A directory of `.md` files is the whole database:
//! each file is a post, its leading `~~key: value` lines are its metadata,
//! and the rest is the body.
//!
//! # Architecture
//!
//! Both modes share one pipeline:
//!
//! ```text
//! 1. Scan      posts/      →  ScanReport   (files → Posts + skipped entries)
//! 2. Collect   ScanReport  →  Collection   (canonical URL → Post, sorted)
//! 3. Tree      Collection  →  DirectoryNode (URL segments → nodes)
//! 4. Render    node        →  HTML         (header block + Markdown)
//! ```
//!
//! **Compile mode** runs the pipeline once and writes every page to disk.
//! **Serve mode** keeps the result as a snapshot in the [`engine`], answers
//! HTTP requests from it, and rebuilds it when a poll finds changed posts.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`post`] | A single post: header parsing, body extraction, staleness checks |
//! | [`checksum`] | SHA-256 content hashes used to detect edits |
//! | [`naming`] | Canonical URL derivation and header date parsing |
//! | [`scan`] | Directory walk into a `ScanReport`, and the URL-keyed `Collection` |
//! | [`tree`] | The render tree: segment-by-segment URL lookup |
//! | [`engine`] | Snapshot swapping, polling, request resolution |
//! | [`render`] | Post and listing pages with Maud and pulldown-cmark |
//! | [`compile`] | One-shot static output |
//! | [`server`] | `tiny_http` transport and static assets |
//! | [`config`] | `blog.toml` loading, validation, and run mode selection |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Whole-Snapshot Swaps
//!
//! The serving state is replaced, never patched. The poller builds a fresh
//! collection and tree with no lock held, then swaps it in under a brief
//! write lock. Requests never observe a half-built tree, and a failed build
//! leaves the previous snapshot serving.
//!
//! ## Content Hashes Over Timestamps
//!
//! A post is stale when its bytes no longer hash to the stored checksum.
//! Editors that preserve mtimes, clock skew, and `touch` without edits all
//! behave as expected.
//!
//! ## Prefixes, Not Parent Pointers
//!
//! Directory nodes know their URL prefix (`2012/1`) instead of holding a
//! reference to their parent. The tree stays a plain owned structure and the
//! parent is derived when a listing needs an "up" link.

pub mod checksum;
pub mod compile;
pub mod config;
pub mod engine;
pub mod naming;
pub mod output;
pub mod post;
pub mod render;
pub mod scan;
pub mod server;
pub mod tree;

#[cfg(test)]
pub(crate) mod test_helpers;
