//! HTTP transport for serve mode.
//!
//! Built on `tiny_http`. Requests are decoded, stripped of their query
//! string, and handed to [`Engine::handle`] on a pool of worker threads.
//! Paths under the static prefix (`/static/` by default) bypass the engine
//! and are served verbatim from the static directory.
//!
//! ```text
//! ┌───────────────┐   recv    ┌──────────────────┐
//! │  tiny_http    │ ────────▶ │  worker pool     │──▶ Engine::handle (read lock)
//! │  0.0.0.0:port │           │  (N threads)     │──▶ static files
//! └───────────────┘           └──────────────────┘
//!                                                    Engine poller (write lock)
//! ```

use crate::config::BlogConfig;
use crate::engine::{Engine, Reply};
use std::borrow::Cow;
use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tiny_http::{Header, Request, Response, Server, StatusCode};

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("cannot listen on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("cannot start request workers: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Files served verbatim under a URL prefix.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    prefix: String,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
        }
    }

    /// Static files as configured for a source root, if enabled.
    pub fn from_config(config: &BlogConfig, source: &Path) -> Option<Self> {
        config
            .static_root(source)
            .map(|root| Self::new(root, config.server.static_prefix.clone()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Answer `path` if it falls under the prefix, `None` otherwise.
    pub fn reply(&self, path: &str) -> Option<Reply> {
        let rel = path.strip_prefix(&self.prefix)?;
        Some(match self.locate(rel) {
            Some(file) => match fs::read(&file) {
                Ok(body) => Reply {
                    status: 200,
                    content_type: guess_content_type(&file),
                    body,
                    location: None,
                },
                Err(e) => {
                    tracing::warn!(path = %file.display(), error = %e, "Cannot read static file");
                    not_found()
                }
            },
            None => not_found(),
        })
    }

    /// Map a relative request path to a file under the root.
    ///
    /// Rejects parent components and anything that escapes the root once
    /// symlinks are resolved.
    fn locate(&self, rel: &str) -> Option<PathBuf> {
        let rel = Path::new(rel);
        if !rel.components().all(|c| matches!(c, Component::Normal(_))) {
            return None;
        }
        let canonical = self.root.join(rel).canonicalize().ok()?;
        let root = self.root.canonicalize().ok()?;
        (canonical.starts_with(&root) && canonical.is_file()).then_some(canonical)
    }
}

fn not_found() -> Reply {
    Reply {
        status: 404,
        content_type: "text/plain; charset=utf-8",
        body: b"404 page not found\n".to_vec(),
        location: None,
    }
}

/// Bind the HTTP listener on all interfaces.
pub fn bind(port: u16) -> Result<(Server, SocketAddr), ServerError> {
    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port);
    let server = Server::http(addr).map_err(|source| ServerError::Bind { addr, source })?;
    let bound = server.server_addr().to_ip().unwrap_or(addr);
    Ok((server, bound))
}

/// Serve requests until the listener shuts down.
pub fn run(
    server: Server,
    engine: Arc<Engine>,
    statics: Option<StaticFiles>,
    workers: usize,
) -> Result<(), ServerError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("request-{i}"))
        .build()?;
    let statics = statics.map(Arc::new);

    for request in server.incoming_requests() {
        let engine = Arc::clone(&engine);
        let statics = statics.clone();
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &engine, statics.as_deref()) {
                tracing::debug!(error = %e, "Failed to send response");
            }
        });
    }
    Ok(())
}

fn handle_request(
    request: Request,
    engine: &Engine,
    statics: Option<&StaticFiles>,
) -> std::io::Result<()> {
    let path = request_path(request.url());
    let method = request.method().to_string();

    let reply = statics
        .filter(|_| method == "GET" || method == "HEAD")
        .and_then(|s| s.reply(&path))
        .unwrap_or_else(|| engine.handle(&method, &path));

    request.respond(into_response(reply))
}

/// Strip the query string and percent-decode what remains.
fn request_path(url: &str) -> String {
    let raw = url.split(['?', '#']).next().unwrap_or(url);
    urlencoding::decode(raw)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| raw.to_string())
}

fn into_response(reply: Reply) -> Response<std::io::Cursor<Vec<u8>>> {
    let mut response = Response::from_data(reply.body).with_status_code(StatusCode(reply.status));
    if let Ok(header) = Header::from_bytes("Content-Type", reply.content_type) {
        response.add_header(header);
    }
    if let Some(location) = reply.location
        && let Ok(header) = Header::from_bytes("Location", location.as_bytes())
    {
        response.add_header(header);
    }
    response
}

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
pub fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "application/xml; charset=utf-8",

        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("ico") => "image/x-icon",

        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",

        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain; charset=utf-8",
        Some("md") => "text/markdown; charset=utf-8",

        _ => "application/octet-stream",
    }
}
