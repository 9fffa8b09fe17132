//! xxHash64 file fingerprinting with streaming support.
//!
//! # Overview
//!
//! This module provides the [`Hasher`] struct for the two content keys of
//! the duplicate cascade:
//!
//! - [`Hasher::quick_signature`] reads at most [`HEAD_WINDOW`] bytes from the
//!   start of a file and combines their hash with the file's size and
//!   (optionally) modification time.
//! - [`Hasher::full_hash`] streams the entire file through the same hash.
//!
//! Both use xxHash64 with seed 0, a fast non-cryptographic digest. Distinct
//! contents can collide in principle; that risk is accepted.

use std::fmt;
use std::fs::File;
use std::hash::Hasher as _;
use std::io::{ErrorKind, Read};
use std::path::Path;

use twox_hash::XxHash64;

use super::{FileEntry, HashError};

/// Number of leading bytes hashed for a quick signature (8 KiB).
pub const HEAD_WINDOW: usize = 8 * 1024;

/// Read buffer size used when streaming a full hash (64 KiB).
const STREAM_BUFFER_SIZE: usize = 64 * 1024;

/// Full-content digest of a file.
pub type ContentHash = u64;

/// Cheap composite key used to prune candidates before a full read.
///
/// Equal signatures mark *candidates* for duplication, not confirmed
/// duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuickSignature {
    /// File size in bytes
    pub size: u64,
    /// Modification time in Unix seconds, or 0 when mtime matching is off
    pub modified: i64,
    /// xxHash64 of the first [`HEAD_WINDOW`] bytes
    pub head_hash: u64,
}

impl fmt::Display for QuickSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{:x}", self.size, self.modified, self.head_hash)
    }
}

/// File hasher for quick signatures and full-content hashes.
///
/// Stateless apart from its window size, so one instance can be shared by
/// every worker of a stage.
#[derive(Debug, Clone)]
pub struct Hasher {
    head_window: usize,
    match_mtime: bool,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with the default 8 KiB head window.
    #[must_use]
    pub fn new() -> Self {
        Self {
            head_window: HEAD_WINDOW,
            match_mtime: false,
        }
    }

    /// Override the number of leading bytes used for quick signatures.
    #[must_use]
    pub fn with_head_window(mut self, bytes: usize) -> Self {
        self.head_window = bytes;
        self
    }

    /// Include modification time in every quick signature.
    #[must_use]
    pub fn with_match_mtime(mut self, enabled: bool) -> Self {
        self.match_mtime = enabled;
        self
    }

    /// The configured head window in bytes.
    #[must_use]
    pub fn head_window(&self) -> usize {
        self.head_window
    }

    /// Compute the quick signature of a discovered file.
    ///
    /// Files shorter than the head window are hashed in full; an empty file
    /// hashes an empty prefix.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read.
    pub fn quick_signature(&self, entry: &FileEntry) -> Result<QuickSignature, HashError> {
        let head_hash = self.head_hash(&entry.path)?;
        Ok(QuickSignature {
            size: entry.size,
            modified: if self.match_mtime { entry.modified } else { 0 },
            head_hash,
        })
    }

    /// Hash the first `head_window` bytes of a file.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read.
    pub fn head_hash(&self, path: &Path) -> Result<u64, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;

        let mut head = Vec::with_capacity(self.head_window);
        file.take(self.head_window as u64)
            .read_to_end(&mut head)
            .map_err(|e| HashError::from_io(path, e))?;

        let mut hasher = XxHash64::with_seed(0);
        hasher.write(&head);
        Ok(hasher.finish())
    }

    /// Hash the entire content of a file in streaming mode.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read.
    pub fn full_hash(&self, path: &Path) -> Result<ContentHash, HashError> {
        let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let mut hasher = XxHash64::with_seed(0);
        let mut buffer = vec![0u8; STREAM_BUFFER_SIZE];

        loop {
            let count = match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path, e)),
            };
            hasher.write(&buffer[..count]);
        }

        Ok(hasher.finish())
    }
}

/// Format a content hash as 16 lowercase hex digits.
#[must_use]
pub fn hash_to_hex(hash: ContentHash) -> String {
    format!("{:016x}", hash)
}
