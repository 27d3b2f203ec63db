//! The serving engine: a swappable snapshot of the blog plus the poller that
//! keeps it current.
//!
//! ## Snapshots
//!
//! A [`Snapshot`] is one consistent build: the [`Collection`] and the render
//! tree made from it. The engine keeps the current snapshot behind a
//! `parking_lot::RwLock<Option<Snapshot>>`:
//!
//! - Request threads take the read guard for one resolve-and-prepare, copy
//!   what they need out, drop the guard, then render.
//! - The poll thread builds the next snapshot with no lock held and takes
//!   the write guard only to swap it in.
//!
//! A request therefore always sees exactly one snapshot, old or new, never a
//! mix.
//!
//! ## Staleness
//!
//! Every poll re-scans the source root. The snapshot is stale when the scan
//! found a different number of posts than the snapshot was built from, or
//! when any post it was built from no longer hashes to its stored checksum.
//! That includes posts that lost a URL collision. A stale snapshot is
//! rebuilt from the fresh scan.
//!
//! ## Failure
//!
//! Per-request problems become negative [`Reply`]s. A failed background
//! rebuild is not survivable: the poller logs it and exits the process with
//! [`FATAL_REBUILD_EXIT_CODE`].

use crate::config::BlogConfig;
use crate::post::{Metadata, Post};
use crate::render::{self, ListingEntry, RenderOptions};
use crate::scan::{self, Collection, ScanError, ScanReport};
use crate::tree::{self, DirectoryNode, Target, TreeError};
use parking_lot::{Mutex, RwLock};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// Process exit code after a background rebuild fails.
pub const FATAL_REBUILD_EXIT_CODE: i32 = 3;

const HTML: &str = "text/html; charset=utf-8";
const TEXT: &str = "text/plain; charset=utf-8";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error("cannot start poll thread: {0}")]
    Spawn(#[source] io::Error),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ServeError {
    #[error("no page at {path}")]
    NotFound { path: String },
    #[error("listing names {url} but no post owns it")]
    Inconsistent { url: String },
    #[error("no snapshot has been built yet")]
    NotReady,
    #[error("method {0} not allowed")]
    MethodNotAllowed(String),
}

impl ServeError {
    /// HTTP status reported for this error.
    pub fn status(&self) -> u16 {
        match self {
            ServeError::NotFound { .. } => 404,
            ServeError::Inconsistent { .. } => 500,
            ServeError::NotReady => 503,
            ServeError::MethodNotAllowed(_) => 405,
        }
    }
}

/// Engine lifecycle. There is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No snapshot yet.
    Empty,
    Ready,
    /// A new snapshot is being built; the old one (if any) is still served.
    Rebuilding,
}

/// Result of one staleness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Unchanged,
    Rebuilt { posts: usize },
}

/// Settings the engine needs from the blog config.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub title: String,
    pub poll_interval: Duration,
    pub render: RenderOptions,
}

impl EngineOptions {
    pub fn from_config(config: &BlogConfig) -> Self {
        Self {
            title: config.title.clone(),
            poll_interval: Duration::from_secs(config.server.poll_interval),
            render: RenderOptions::from(&config.render),
        }
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::from_config(&BlogConfig::default())
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// One consistent build of the blog.
#[derive(Debug)]
pub struct Snapshot {
    generation: u64,
    collection: Collection,
    tree: DirectoryNode,
}

/// Everything a request needs, copied out from under the read guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prepared {
    Post { meta: Metadata, body: Vec<u8> },
    Redirect(String),
    Listing {
        /// Directory prefix, `""` for the root.
        scope: String,
        entries: Vec<ListingEntry>,
        parent: Option<String>,
    },
}

impl Snapshot {
    /// Build the collection and tree for a scan.
    pub fn build(report: ScanReport) -> Result<Self, TreeError> {
        let collection = Collection::build(report.posts);
        let tree = tree::build(&collection)?;
        Ok(Self {
            generation: 0,
            collection,
            tree,
        })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn tree(&self) -> &DirectoryNode {
        &self.tree
    }

    /// Resolve a request path against the tree.
    pub fn resolve(&self, path: &str) -> Result<Target<'_>, ServeError> {
        self.tree.resolve(path).ok_or_else(|| ServeError::NotFound {
            path: path.to_string(),
        })
    }

    /// Resolve `path` and gather what is needed to answer it.
    pub fn prepare(&self, path: &str) -> Result<Prepared, ServeError> {
        match self.resolve(path)? {
            Target::Post(post) => prepare_post(post, path),
            Target::Redirect(to) => Ok(Prepared::Redirect(to.to_string())),
            Target::Directory(dir) => Ok(Prepared::Listing {
                scope: dir.prefix().to_string(),
                entries: self.listing(dir.prefix())?,
                parent: dir.parent_prefix().map(tree::directory_url),
            }),
        }
    }

    /// Listing entries for every URL under `prefix`, in sorted order.
    ///
    /// The root (`""`) lists the whole collection.
    pub fn listing(&self, prefix: &str) -> Result<Vec<ListingEntry>, ServeError> {
        let scope = if prefix.is_empty() {
            String::new()
        } else {
            format!("{prefix}/")
        };
        self.collection
            .urls()
            .iter()
            .filter(|url| url.starts_with(&scope))
            .map(|url| {
                let post = self
                    .collection
                    .get(url)
                    .ok_or_else(|| ServeError::Inconsistent { url: url.clone() })?;
                Ok(ListingEntry {
                    url: url.clone(),
                    title: post.title().to_string(),
                    date: post.date().to_string(),
                })
            })
            .collect()
    }
}

fn prepare_post(post: &Post, path: &str) -> Result<Prepared, ServeError> {
    match post.contents() {
        Ok(body) => Ok(Prepared::Post {
            meta: post.metadata().clone(),
            body,
        }),
        Err(e) => {
            tracing::warn!(path = %post.path().display(), error = %e, "Cannot read post body");
            Err(ServeError::NotFound {
                path: path.to_string(),
            })
        }
    }
}

// ============================================================================
// Replies
// ============================================================================

/// A transport-independent HTTP answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    /// `Location` header for redirects.
    pub location: Option<String>,
}

impl Reply {
    fn html(body: String) -> Self {
        Self {
            status: 200,
            content_type: HTML,
            body: body.into_bytes(),
            location: None,
        }
    }

    fn redirect(to: String) -> Self {
        Self {
            status: 301,
            content_type: TEXT,
            body: format!("Moved Permanently: {to}\n").into_bytes(),
            location: Some(to),
        }
    }

    fn error(err: &ServeError) -> Self {
        let status = err.status();
        let body = match err {
            ServeError::NotFound { .. } => "404 page not found\n".to_string(),
            other => format!("{status} {other}\n"),
        };
        Self {
            status,
            content_type: TEXT,
            body: body.into_bytes(),
            location: None,
        }
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Shared serving state. Workers and the poll thread hold it by `Arc`.
#[derive(Debug)]
pub struct Engine {
    root: PathBuf,
    options: EngineOptions,
    snapshot: RwLock<Option<Snapshot>>,
    state: Mutex<EngineState>,
}

impl Engine {
    /// An engine with no snapshot. Requests get 503 until the first build.
    pub fn new(root: impl Into<PathBuf>, options: EngineOptions) -> Self {
        Self {
            root: root.into(),
            options,
            snapshot: RwLock::new(None),
            state: Mutex::new(EngineState::Empty),
        }
    }

    /// Build the first snapshot synchronously, without starting the poller.
    pub fn load(root: impl Into<PathBuf>, options: EngineOptions) -> Result<Arc<Self>, BuildError> {
        let engine = Self::new(root, options);
        let report = scan::scan(&engine.root)?;
        engine.rebuild(report)?;
        Ok(Arc::new(engine))
    }

    /// Build the first snapshot, then start the background poll thread.
    pub fn start(root: impl Into<PathBuf>, options: EngineOptions) -> Result<Arc<Self>, BuildError> {
        let engine = Self::load(root, options)?;
        let poller = Arc::clone(&engine);
        thread::Builder::new()
            .name("poller".to_string())
            .spawn(move || poller.run_poll_loop())
            .map_err(BuildError::Spawn)?;
        Ok(engine)
    }

    pub fn state(&self) -> EngineState {
        *self.state.lock()
    }

    /// Generation of the current snapshot, `None` before the first build.
    pub fn generation(&self) -> Option<u64> {
        self.snapshot.read().as_ref().map(Snapshot::generation)
    }

    /// Number of posts in the current snapshot.
    pub fn post_count(&self) -> usize {
        self.snapshot
            .read()
            .as_ref()
            .map_or(0, |s| s.collection.len())
    }

    /// Replace the snapshot with one built from `report`.
    ///
    /// On failure the previous snapshot stays in place.
    pub fn rebuild(&self, report: ScanReport) -> Result<usize, BuildError> {
        let previous = self.transition(EngineState::Rebuilding);

        let mut next = match Snapshot::build(report) {
            Ok(next) => next,
            Err(e) => {
                self.transition(previous);
                return Err(e.into());
            }
        };
        let posts = next.collection.len();

        {
            let mut current = self.snapshot.write();
            next.generation = current.as_ref().map_or(1, |s| s.generation + 1);
            *current = Some(next);
        }

        self.transition(EngineState::Ready);
        tracing::info!(posts, "Snapshot rebuilt");
        Ok(posts)
    }

    /// Set the state, returning the one it replaced.
    fn transition(&self, to: EngineState) -> EngineState {
        std::mem::replace(&mut *self.state.lock(), to)
    }

    /// Re-scan the root and rebuild if the snapshot is stale.
    pub fn poll_once(&self) -> Result<PollOutcome, BuildError> {
        let report = scan::scan(&self.root)?;
        if !self.is_stale(&report) {
            tracing::trace!("Snapshot up to date");
            return Ok(PollOutcome::Unchanged);
        }
        let posts = self.rebuild(report)?;
        Ok(PollOutcome::Rebuilt { posts })
    }

    fn is_stale(&self, candidate: &ScanReport) -> bool {
        // Hashing reads every file, so do it after releasing the guard.
        let held: Vec<Arc<Post>> = {
            let guard = self.snapshot.read();
            let Some(snapshot) = guard.as_ref() else {
                return true;
            };
            if candidate.posts.len() != snapshot.collection.source_count() {
                tracing::debug!(
                    before = snapshot.collection.source_count(),
                    after = candidate.posts.len(),
                    "Post count changed"
                );
                return true;
            }
            snapshot.collection.sources().map(Arc::clone).collect()
        };

        held.iter().any(|post| {
            let changed = !post.is_up_to_date();
            if changed {
                tracing::debug!(path = %post.path().display(), "Post changed");
            }
            changed
        })
    }

    /// Poll forever at the configured interval.
    ///
    /// A failed rebuild ends the process through [`fatal_rebuild`].
    pub fn run_poll_loop(&self) {
        tracing::debug!(interval = ?self.options.poll_interval, "Poller started");
        loop {
            thread::sleep(self.options.poll_interval);
            match self.poll_once() {
                Ok(PollOutcome::Unchanged) => {}
                Ok(PollOutcome::Rebuilt { posts }) => {
                    tracing::info!(posts, root = %self.root.display(), "Reloaded posts");
                }
                Err(e) => fatal_rebuild(&e),
            }
        }
    }

    /// Answer one request.
    pub fn handle(&self, method: &str, path: &str) -> Reply {
        let reply = match self.respond(method, path) {
            Ok(reply) => reply,
            Err(e) => {
                if let ServeError::Inconsistent { .. } = e {
                    tracing::error!(path, error = %e, "Snapshot inconsistent");
                }
                Reply::error(&e)
            }
        };
        tracing::debug!(method, path, status = reply.status, "Request handled");
        reply
    }

    fn respond(&self, method: &str, path: &str) -> Result<Reply, ServeError> {
        if method != "GET" && method != "HEAD" {
            return Err(ServeError::MethodNotAllowed(method.to_string()));
        }

        let prepared = {
            let guard = self.snapshot.read();
            guard.as_ref().ok_or(ServeError::NotReady)?.prepare(path)?
        };

        Ok(match prepared {
            Prepared::Post { meta, body } => {
                Reply::html(render::render_post(&meta, &body, &self.options.render))
            }
            Prepared::Redirect(to) => Reply::redirect(to),
            Prepared::Listing {
                scope,
                entries,
                parent,
            } => Reply::html(render::render_listing(
                &listing_title(&self.options.title, &scope),
                &entries,
                parent.as_deref(),
            )),
        })
    }
}

/// Title of a listing page: the blog title, qualified below the root.
pub fn listing_title(title: &str, scope: &str) -> String {
    if scope.is_empty() {
        title.to_string()
    } else {
        format!("{title}: {scope}")
    }
}

/// Log a failed background rebuild and exit the process.
pub fn fatal_rebuild(err: &BuildError) -> ! {
    tracing::error!(error = %err, "Rebuild failed, shutting down");
    eprintln!("Fatal: rebuild failed: {err}");
    std::process::exit(FATAL_REBUILD_EXIT_CODE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn load(root: &Path) -> Arc<Engine> {
        Engine::load(root, EngineOptions::default()).unwrap()
    }

    fn body(reply: &Reply) -> String {
        String::from_utf8(reply.body.clone()).unwrap()
    }

    // =========================================================================
    // Building and state
    // =========================================================================

    #[test]
    fn new_engine_is_empty_and_not_ready() {
        let tmp = TempDir::new().unwrap();
        let engine = Engine::new(tmp.path(), EngineOptions::default());

        assert_eq!(engine.state(), EngineState::Empty);
        assert_eq!(engine.generation(), None);
        assert_eq!(engine.handle("GET", "/").status, 503);
    }

    #[test]
    fn load_builds_first_generation() {
        let tmp = setup_fixtures();
        let engine = load(tmp.path());

        assert_eq!(engine.state(), EngineState::Ready);
        assert_eq!(engine.generation(), Some(1));
        assert_eq!(engine.post_count(), 4);
    }

    #[test]
    fn load_fails_on_missing_root() {
        let tmp = TempDir::new().unwrap();
        let result = Engine::load(tmp.path().join("missing"), EngineOptions::default());
        assert!(matches!(result, Err(BuildError::Scan(_))));
    }

    #[test]
    fn load_fails_on_tree_conflict() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "a.md", "~~url: foo\n");
        write_post(tmp.path(), "b.md", "~~url: foo.html/bar\n");

        let result = Engine::load(tmp.path(), EngineOptions::default());
        assert!(matches!(
            result,
            Err(BuildError::Tree(TreeError::Conflict { .. }))
        ));
    }

    #[test]
    fn failed_rebuild_keeps_previous_snapshot() {
        let tmp = setup_fixtures();
        let engine = load(tmp.path());

        write_post(tmp.path(), "x.md", "~~url: alpha.html/child\n");
        assert!(engine.poll_once().is_err());

        assert_eq!(engine.state(), EngineState::Ready);
        assert_eq!(engine.generation(), Some(1));
        assert_eq!(engine.handle("GET", "/alpha.html").status, 200);
    }

    // =========================================================================
    // Polling
    // =========================================================================

    #[test]
    fn poll_without_changes_is_unchanged() {
        let tmp = setup_fixtures();
        let engine = load(tmp.path());

        assert_eq!(engine.poll_once().unwrap(), PollOutcome::Unchanged);
        assert_eq!(engine.generation(), Some(1));
    }

    #[test]
    fn poll_picks_up_new_post() {
        let tmp = setup_fixtures();
        let engine = load(tmp.path());
        assert_eq!(engine.handle("GET", "/fresh.html").status, 404);

        write_post(tmp.path(), "fresh.md", "~~title: Fresh\n~~url: fresh\n\nNew!\n");

        assert_eq!(
            engine.poll_once().unwrap(),
            PollOutcome::Rebuilt { posts: 5 }
        );
        assert_eq!(engine.generation(), Some(2));
        assert!(body(&engine.handle("GET", "/fresh.html")).contains("New!"));
    }

    #[test]
    fn poll_picks_up_edited_post() {
        let tmp = setup_fixtures();
        let engine = load(tmp.path());

        fs::write(
            tmp.path().join("archive/alpha.md"),
            "~~title: Alpha Prime\n~~url: alpha\n\nEdited.\n",
        )
        .unwrap();

        assert!(matches!(
            engine.poll_once().unwrap(),
            PollOutcome::Rebuilt { .. }
        ));
        let page = body(&engine.handle("GET", "/alpha.html"));
        assert!(page.contains("Alpha Prime"));
        assert!(page.contains("Edited."));
    }

    #[test]
    fn poll_picks_up_deleted_post() {
        let tmp = setup_fixtures();
        let engine = load(tmp.path());

        fs::remove_file(tmp.path().join("archive/alpha.md")).unwrap();

        assert_eq!(
            engine.poll_once().unwrap(),
            PollOutcome::Rebuilt { posts: 3 }
        );
        assert_eq!(engine.handle("GET", "/alpha.html").status, 404);
    }

    #[test]
    fn url_collision_does_not_cause_endless_rebuilds() {
        let tmp = setup_fixtures();
        write_post(tmp.path(), "zz_dup.md", "~~url: alpha\n");
        let engine = load(tmp.path());

        assert_eq!(engine.post_count(), 4);
        assert_eq!(engine.poll_once().unwrap(), PollOutcome::Unchanged);
    }

    #[test]
    fn poll_notices_edit_to_collision_loser() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "a.md", "~~url: same\n");
        write_post(tmp.path(), "b.md", "~~url: same\n");
        let engine = load(tmp.path());
        assert_eq!(engine.post_count(), 1);

        fs::write(tmp.path().join("b.md"), "~~url: other\n").unwrap();

        assert_eq!(
            engine.poll_once().unwrap(),
            PollOutcome::Rebuilt { posts: 2 }
        );
        assert_eq!(engine.handle("GET", "/other.html").status, 200);
        assert_eq!(engine.handle("GET", "/same.html").status, 200);
    }

    #[test]
    fn rooted_url_fragment_does_not_break_rebuild() {
        let tmp = setup_fixtures();
        let engine = load(tmp.path());

        write_post(tmp.path(), "about.md", "~~title: About\n~~url: /about\n");

        assert_eq!(
            engine.poll_once().unwrap(),
            PollOutcome::Rebuilt { posts: 5 }
        );
        assert!(body(&engine.handle("GET", "/about.html")).contains("About"));
    }

    #[test]
    fn poll_fails_when_root_disappears() {
        let tmp = setup_fixtures();
        let engine = load(tmp.path());
        fs::remove_dir_all(tmp.path()).unwrap();

        assert!(matches!(engine.poll_once(), Err(BuildError::Scan(_))));
        assert_eq!(engine.post_count(), 4);
    }

    // =========================================================================
    // Resolution and preparation
    // =========================================================================

    #[test]
    fn every_url_resolves_to_its_post() {
        let tmp = setup_fixtures();
        let snapshot = Snapshot::build(scan::scan(tmp.path()).unwrap()).unwrap();

        for (url, post) in snapshot.collection().iter() {
            match snapshot.resolve(url).unwrap() {
                Target::Post(found) => assert!(Arc::ptr_eq(found, post)),
                other => panic!("{url} resolved to {other:?}"),
            }
        }
    }

    #[test]
    fn one_segment_short_is_a_listing() {
        let tmp = setup_fixtures();
        let snapshot = Snapshot::build(scan::scan(tmp.path()).unwrap()).unwrap();

        match snapshot.prepare("2012/1").unwrap() {
            Prepared::Listing {
                scope,
                entries,
                parent,
            } => {
                assert_eq!(scope, "2012/1");
                assert_eq!(entries.len(), 3);
                assert_eq!(parent.as_deref(), Some("/2012/"));
            }
            other => panic!("expected listing, got {other:?}"),
        }
    }

    #[test]
    fn root_listing_covers_every_post_in_order() {
        let tmp = setup_fixtures();
        let snapshot = Snapshot::build(scan::scan(tmp.path()).unwrap()).unwrap();

        let urls: Vec<String> = snapshot
            .listing("")
            .unwrap()
            .into_iter()
            .map(|e| e.url)
            .collect();
        assert_eq!(urls, snapshot.collection().urls());
    }

    #[test]
    fn listing_scope_does_not_match_partial_segments() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "a.md", "~~url: 2012/one\n");
        write_post(tmp.path(), "b.md", "~~url: 20121/two\n");
        let snapshot = Snapshot::build(scan::scan(tmp.path()).unwrap()).unwrap();

        let entries = snapshot.listing("2012").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].url, "2012/one.html");
    }

    #[test]
    fn unknown_path_is_not_found() {
        let tmp = setup_fixtures();
        let snapshot = Snapshot::build(scan::scan(tmp.path()).unwrap()).unwrap();

        assert!(matches!(
            snapshot.prepare("2013/1/nothing.html"),
            Err(ServeError::NotFound { .. })
        ));
        assert!(matches!(
            snapshot.prepare("alpha.html/deeper"),
            Err(ServeError::NotFound { .. })
        ));
    }

    // =========================================================================
    // Request handling
    // =========================================================================

    #[test]
    fn get_post_renders_header_and_body() {
        let tmp = setup_fixtures();
        let engine = load(tmp.path());

        let reply = engine.handle("GET", "/2012/1/simple_post.html");
        assert_eq!(reply.status, 200);
        assert_eq!(reply.content_type, HTML);
        let page = body(&reply);
        assert!(page.contains(r#"<h1 id="title">Simple Post</h1>"#));
        assert!(page.contains("This is a simple post!"));
        assert!(!page.contains("~~"));
    }

    #[test]
    fn head_is_accepted() {
        let tmp = setup_fixtures();
        let engine = load(tmp.path());
        assert_eq!(engine.handle("HEAD", "/alpha.html").status, 200);
    }

    #[test]
    fn other_methods_are_rejected() {
        let tmp = setup_fixtures();
        let engine = load(tmp.path());

        let reply = engine.handle("POST", "/alpha.html");
        assert_eq!(reply.status, 405);
        assert!(body(&reply).contains("POST"));
    }

    #[test]
    fn root_serves_index_listing() {
        let tmp = setup_fixtures();
        let engine = load(tmp.path());

        let page = body(&engine.handle("GET", "/"));
        assert!(page.contains("<title>Blog</title>"));
        assert!(page.contains(r#"href="/2012/1/b_test.html""#));
        assert!(page.contains(r#"href="/alpha.html""#));
    }

    #[test]
    fn directory_index_redirects_to_directory() {
        let tmp = setup_fixtures();
        let engine = load(tmp.path());

        let reply = engine.handle("GET", "/2012/index.html");
        assert_eq!(reply.status, 301);
        assert_eq!(reply.location.as_deref(), Some("/2012/"));

        let reply = engine.handle("GET", "/index.html");
        assert_eq!(reply.location.as_deref(), Some("/"));
    }

    #[test]
    fn scoped_listing_has_qualified_title() {
        let tmp = setup_fixtures();
        let engine = load(tmp.path());

        let page = body(&engine.handle("GET", "/2012/"));
        assert!(page.contains("<title>Blog: 2012</title>"));
        assert!(!page.contains("alpha.html"));
    }

    #[test]
    fn vanished_post_is_not_found_until_rebuilt() {
        let tmp = setup_fixtures();
        let engine = load(tmp.path());
        fs::remove_file(tmp.path().join("archive/alpha.md")).unwrap();

        let reply = engine.handle("GET", "/alpha.html");
        assert_eq!(reply.status, 404);
        assert_eq!(body(&reply), "404 page not found\n");
    }

    #[test]
    fn error_statuses() {
        assert_eq!(ServeError::NotReady.status(), 503);
        assert_eq!(
            ServeError::Inconsistent {
                url: "x.html".into()
            }
            .status(),
            500
        );
        assert_eq!(ServeError::MethodNotAllowed("PUT".into()).status(), 405);
    }

    #[test]
    fn listing_title_is_scoped() {
        assert_eq!(listing_title("Blog", ""), "Blog");
        assert_eq!(listing_title("Blog", "2012/1"), "Blog: 2012/1");
    }

    #[test]
    fn options_follow_config() {
        let mut config = BlogConfig::default();
        config.title = "Notes".into();
        config.server.poll_interval = 7;
        let options = EngineOptions::from_config(&config);
        assert_eq!(options.title, "Notes");
        assert_eq!(options.poll_interval, Duration::from_secs(7));
    }
}
