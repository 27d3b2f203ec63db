//! Blog configuration.
//!
//! Handles loading, validating, and merging `blog.toml`, and choosing the run
//! mode from the command line. Stock defaults are overridden by an optional
//! `blog.toml` in the source root, and `--poll-time` overrides that.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! title = "Blog"              # Title of the index listing
//!
//! [server]
//! poll_interval = 30          # Seconds between checks for changed posts
//! # workers = 4               # Request threads (omit for auto = CPU cores)
//! static_dir = "static"       # Assets directory, relative to the source root
//! static_prefix = "/static/"  # URL prefix the assets are served under
//!
//! [render]
//! smart_punctuation = true    # Typographic quotes and dashes
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the optional config file in the source root.
pub const CONFIG_FILENAME: &str = "blog.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("{0}")]
    Mode(String),
}

/// Blog configuration loaded from `blog.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlogConfig {
    /// Title shown on the index listing.
    pub title: String,
    /// Serve-mode settings.
    pub server: ServerConfig,
    /// Markdown rendering settings.
    pub render: RenderConfig,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            title: "Blog".to_string(),
            server: ServerConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl BlogConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.poll_interval == 0 {
            return Err(ConfigError::Validation(
                "server.poll_interval must be at least 1 second".into(),
            ));
        }
        if self.server.workers == Some(0) {
            return Err(ConfigError::Validation(
                "server.workers must be at least 1".into(),
            ));
        }
        let prefix = &self.server.static_prefix;
        if prefix.len() < 3 || !prefix.starts_with('/') || !prefix.ends_with('/') {
            return Err(ConfigError::Validation(
                "server.static_prefix must look like \"/name/\"".into(),
            ));
        }
        Ok(())
    }

    /// Absolute location of the static assets directory, if enabled.
    pub fn static_root(&self, source: &Path) -> Option<PathBuf> {
        if self.server.static_dir.is_empty() {
            None
        } else {
            Some(source.join(&self.server.static_dir))
        }
    }
}

/// Serve-mode settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Seconds the poller sleeps between staleness checks.
    pub poll_interval: u64,
    /// Number of request-handling threads.
    /// When absent, defaults to the number of CPU cores.
    pub workers: Option<usize>,
    /// Static assets directory, relative to the source root. Empty disables.
    pub static_dir: String,
    /// URL prefix for static assets.
    pub static_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            poll_interval: 30,
            workers: None,
            static_dir: "static".to_string(),
            static_prefix: "/static/".to_string(),
        }
    }
}

/// Resolve the effective request worker count.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_workers(config: &ServerConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.workers.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Markdown rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Convert straight quotes and `--`/`---` into typographic ones.
    pub smart_punctuation: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            smart_punctuation: true,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(BlogConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `blog.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `blog.toml`.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<BlogConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: BlogConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `blog.toml` in the source root.
pub fn load_config(root: &Path) -> Result<BlogConfig, ConfigError> {
    resolve_config(load_raw_config(root)?)
}

// =============================================================================
// Run mode
// =============================================================================

/// What the process was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Write every page under `dest` once and exit.
    Compile { dest: PathBuf },
    /// Serve pages over HTTP on `port` until killed.
    Serve { port: u16 },
}

/// Pick exactly one mode from the `--dest` / `--port` flags.
pub fn select_mode(dest: Option<PathBuf>, port: Option<u16>) -> Result<Mode, ConfigError> {
    match (dest, port) {
        (Some(dest), None) => Ok(Mode::Compile { dest }),
        (None, Some(port)) => Ok(Mode::Serve { port }),
        (None, None) => Err(ConfigError::Mode(
            "No --port or --dest flag specified".into(),
        )),
        (Some(_), Some(_)) => Err(ConfigError::Mode(
            "--port and --dest are mutually exclusive".into(),
        )),
    }
}
