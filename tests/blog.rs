//! End-to-end tests over the public API: compile and serve the fixture blog
//! and check both modes produce the same pages.

use blackblog::compile;
use blackblog::config::{self, BlogConfig};
use blackblog::engine::{Engine, EngineOptions, PollOutcome};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use walkdir::WalkDir;

fn copy_fixtures() -> TempDir {
    let src = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/posts");
    let tmp = TempDir::new().unwrap();
    for entry in WalkDir::new(&src) {
        let entry = entry.unwrap();
        let target = tmp.path().join(entry.path().strip_prefix(&src).unwrap());
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).unwrap();
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }
    tmp
}

fn load(root: &Path, config: &BlogConfig) -> Arc<Engine> {
    Engine::load(root, EngineOptions::from_config(config)).unwrap()
}

#[test]
fn fixture_config_is_loaded() {
    let src = copy_fixtures();
    let config = config::load_config(src.path()).unwrap();
    assert_eq!(config.title, "Fixture Blog");
    assert_eq!(config.server.poll_interval, 5);
}

#[test]
fn compiled_pages_match_served_pages() {
    let src = copy_fixtures();
    let dest = TempDir::new().unwrap();
    let config = config::load_config(src.path()).unwrap();

    let report = compile::compile(src.path(), dest.path(), &config).unwrap();
    let engine = load(src.path(), &config);

    assert_eq!(report.pages.len(), engine.post_count());
    for page in &report.pages {
        let written = fs::read(dest.path().join(&page.url)).unwrap();
        let served = engine.handle("GET", &format!("/{}", page.url));
        assert_eq!(served.status, 200, "{}", page.url);
        assert_eq!(served.body, written, "{} differs", page.url);
    }

    for (listing, path) in [("index.html", "/"), ("2012/index.html", "/2012/")] {
        let written = fs::read(dest.path().join(listing)).unwrap();
        assert_eq!(engine.handle("GET", path).body, written, "{listing} differs");
    }
}

#[test]
fn served_post_has_header_and_typographic_body() {
    let src = copy_fixtures();
    let config = config::load_config(src.path()).unwrap();
    let engine = load(src.path(), &config);

    let reply = engine.handle("GET", "/2012/1/c_test.html");
    let page = String::from_utf8(reply.body).unwrap();

    assert!(page.contains(
        r#"<div id="header"><h1 id="title">C Test</h1><h2 id="date">January 18, 2012</h2></div>"#
    ));
    assert!(page.contains("“quoted”"));
    assert!(page.contains('–'));
}

#[test]
fn edits_are_served_after_poll() {
    let src = copy_fixtures();
    let engine = load(src.path(), &BlogConfig::default());

    fs::write(
        src.path().join("simple_post.md"),
        "~~title: Simple Post\n~~url: simple_post\n~~date: 24 January 2012\nRevised.\n",
    )
    .unwrap();
    let before = engine.handle("GET", "/2012/1/simple_post.html");
    assert!(String::from_utf8_lossy(&before.body).contains("Revised."));

    assert!(matches!(
        engine.poll_once().unwrap(),
        PollOutcome::Rebuilt { posts: 4 }
    ));
    assert_eq!(engine.poll_once().unwrap(), PollOutcome::Unchanged);
}

#[test]
fn moving_a_post_to_a_new_date_moves_its_url() {
    let src = copy_fixtures();
    let engine = load(src.path(), &BlogConfig::default());

    fs::write(
        src.path().join("2012/b_test.md"),
        "~~title: B Test\n~~url: b_test\n~~date: 3 March 2013\n",
    )
    .unwrap();
    engine.poll_once().unwrap();

    assert_eq!(engine.handle("GET", "/2012/1/b_test.html").status, 404);
    assert_eq!(engine.handle("GET", "/2013/3/b_test.html").status, 200);
}

#[test]
fn readers_see_whole_snapshots_during_rebuilds() {
    let src = copy_fixtures();
    let engine = load(src.path(), &BlogConfig::default());

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let engine = Arc::clone(&engine);
            scope.spawn(move || {
                for _ in 0..50 {
                    let reply = engine.handle("GET", "/alpha.html");
                    assert_eq!(reply.status, 200);
                    let listing = engine.handle("GET", "/");
                    assert_eq!(listing.status, 200);
                }
            });
        }

        for i in 0..5 {
            fs::write(
                src.path().join("archive/alpha.md"),
                format!("~~title: Alpha\n~~url: alpha\nRevision {i}\n"),
            )
            .unwrap();
            engine.poll_once().unwrap();
        }
    });

    assert_eq!(engine.post_count(), 4);
}
