//! Content checksums for staleness detection.
//!
//! A post remembers the digest of the bytes it was parsed from. Comparing that
//! digest with a fresh one is how the server notices an edited file without
//! trusting modification times (which `git checkout` and `rsync` reset).
//!
//! Digests are SHA-256, hex encoded.

use sha2::{Digest, Sha256};
use std::fmt;
use std::io::{self, Read};
use std::path::Path;

/// Hex-encoded SHA-256 digest of a file's full contents.
///
/// Only produced by hashing real bytes, so an empty checksum cannot exist.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Checksum(String);

impl Checksum {
    /// Digest of an in-memory byte slice.
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(format!("{:x}", Sha256::digest(bytes)))
    }

    /// Digest of everything a reader yields until end of stream.
    pub fn of_reader<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut hasher = Sha256::new();
        io::copy(&mut reader, &mut hasher)?;
        Ok(Self(format!("{:x}", hasher.finalize())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash the file at `path` as it is on disk right now.
pub fn hash_file(path: &Path) -> io::Result<Checksum> {
    let file = std::fs::File::open(path)?;
    Checksum::of_reader(io::BufReader::new(file))
}
