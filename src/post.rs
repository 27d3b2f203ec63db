//! Blog posts: one Markdown source file plus the metadata in its header.
//!
//! ## Source format
//!
//! ```text
//! ~~title: Simple Post
//! ~~url: simple_post
//! ~~date: 24 January 2012
//! This is a simple post!
//!
//! With two lines.
//! ```
//!
//! Every line at the top of the file that starts with `~~` is a metadata line
//! of the form `~~<key>:<value>`. Keys are matched case-insensitively against
//! `title`, `url` and `date`; anything else is ignored so newer files still
//! load in older builds. The header ends at the first line without the marker,
//! and the body is everything after it.
//!
//! ## Staleness
//!
//! A [`Post`] stores the checksum of the exact bytes its metadata was parsed
//! from. [`Post::is_up_to_date`] re-hashes the file on disk and compares, and
//! [`Post::refresh`] only re-parses when the two differ.

use crate::checksum::{self, Checksum};
use crate::naming;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Two-character prefix marking a metadata line.
pub const METADATA_MARKER: &[u8; 2] = b"~~";

#[derive(Error, Debug)]
pub enum PostError {
    #[error("cannot open {}: {source}", path.display())]
    UnreadableSource { path: PathBuf, source: io::Error },
    #[error("cannot checksum {}: {source}", path.display())]
    ChecksumFailure { path: PathBuf, source: io::Error },
    #[error("read failed for {}: {source}", path.display())]
    ReadFailure { path: PathBuf, source: io::Error },
}

/// Metadata fields parsed from a post header. Absent fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub title: String,
    /// Basename override for the canonical URL (`~~url:`).
    pub url: String,
    /// Free-form publication date (`~~date:`), parsed only for URLs.
    pub date: String,
}

impl Metadata {
    /// Parse the header at the start of `bytes`.
    fn from_header(bytes: &[u8]) -> Self {
        let mut meta = Self::default();
        for line in bytes.split(|&b| b == b'\n') {
            if !line.starts_with(METADATA_MARKER) {
                break;
            }
            meta.apply_line(&String::from_utf8_lossy(line));
        }
        meta
    }

    /// Apply one `~~key: value` line. Lines that don't match change nothing.
    pub fn apply_line(&mut self, line: &str) {
        let Some(rest) = line.strip_prefix("~~") else {
            return;
        };
        let Some((key, value)) = rest.split_once(':') else {
            return;
        };
        let value = value.trim().to_string();
        match key.trim().to_lowercase().as_str() {
            "title" => self.title = value,
            "url" => self.url = value,
            "date" => self.date = value,
            _ => {}
        }
    }
}

/// One Markdown post on disk.
#[derive(Debug, Clone)]
pub struct Post {
    path: PathBuf,
    meta: Metadata,
    checksum: Checksum,
}

impl Post {
    /// Read the file at `path`, checksum it, and parse its header.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PostError> {
        let path = path.into();
        let (meta, checksum) = read_and_parse(&path)?;
        Ok(Self {
            path,
            meta,
            checksum,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata(&self) -> &Metadata {
        &self.meta
    }

    pub fn title(&self) -> &str {
        &self.meta.title
    }

    pub fn url_fragment(&self) -> &str {
        &self.meta.url
    }

    pub fn date(&self) -> &str {
        &self.meta.date
    }

    pub fn checksum(&self) -> &Checksum {
        &self.checksum
    }

    /// Whether the file on disk still hashes to the stored checksum.
    ///
    /// A file that vanished or became unreadable is simply not up to date.
    pub fn is_up_to_date(&self) -> bool {
        checksum::hash_file(&self.path)
            .map(|current| current == self.checksum)
            .unwrap_or(false)
    }

    /// Re-parse the header if the file changed since it was last read.
    ///
    /// Returns `true` when the metadata and checksum were replaced.
    pub fn refresh(&mut self) -> Result<bool, PostError> {
        let (meta, checksum) = read_and_parse(&self.path)?;
        if checksum == self.checksum {
            return Ok(false);
        }
        self.meta = meta;
        self.checksum = checksum;
        Ok(true)
    }

    /// The Markdown body: the file minus its header, with `\n` line endings.
    pub fn contents(&self) -> Result<Vec<u8>, PostError> {
        let file = File::open(&self.path).map_err(|source| PostError::UnreadableSource {
            path: self.path.clone(),
            source,
        })?;
        strip_header(BufReader::new(file)).map_err(|source| PostError::ReadFailure {
            path: self.path.clone(),
            source,
        })
    }

    /// Canonical URL, e.g. `2012/1/b_test.html`.
    pub fn create_url(&self) -> String {
        naming::canonical_url(&self.meta.url, &self.meta.title, &self.meta.date, &self.path)
    }
}

/// Single read feeding both the checksum and the header parse.
fn read_and_parse(path: &Path) -> Result<(Metadata, Checksum), PostError> {
    let mut file = File::open(path).map_err(|source| PostError::UnreadableSource {
        path: path.to_path_buf(),
        source,
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|source| PostError::ChecksumFailure {
            path: path.to_path_buf(),
            source,
        })?;
    Ok((Metadata::from_header(&bytes), Checksum::of_bytes(&bytes)))
}

/// Copy everything after the leading metadata lines, normalizing line endings.
fn strip_header<R: BufRead>(mut reader: R) -> io::Result<Vec<u8>> {
    let mut body = Vec::new();
    let mut line = Vec::new();
    let mut in_header = true;
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(body);
        }
        if in_header && line.starts_with(METADATA_MARKER) {
            continue;
        }
        in_header = false;

        if line.last() == Some(&b'\n') {
            line.pop();
        }
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        body.extend_from_slice(&line);
        body.push(b'\n');
    }
}
