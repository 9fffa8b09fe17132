//! Scanner module for directory traversal and file fingerprinting.
//!
//! This module provides functionality for:
//! - Recursive directory walking using walkdir
//! - Inclusion predicates (extension sets such as "only images")
//! - Prefix fingerprints and full-content hashes with xxHash64
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`filter`]: Inclusion predicates applied during discovery
//! - [`hasher`]: Quick signatures and streaming content hashes
//!
//! # Example
//!
//! ```no_run
//! use dupecheck::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."), WalkerConfig::default());
//! walker.validate_root().expect("root must be a readable directory");
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Skipped: {}", e),
//!     }
//! }
//! ```

pub mod filter;
pub mod hasher;
pub mod walker;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

// Re-export main types
pub use filter::{ExtensionFilter, IncludeFilter, IMAGE_EXTENSIONS};
pub use hasher::{hash_to_hex, ContentHash, Hasher, QuickSignature, HEAD_WINDOW};
pub use walker::Walker;

/// Metadata for a discovered file.
///
/// Produced once by the walker and then moved between pipeline stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path to the file, unique within one scan
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modification time as Unix seconds
    pub modified: i64,
}

impl FileEntry {
    /// Create a new FileEntry.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the file
    /// * `size` - File size in bytes
    /// * `modified` - Last modification time (Unix seconds)
    #[must_use]
    pub fn new(path: PathBuf, size: u64, modified: i64) -> Self {
        Self {
            path,
            size,
            modified,
        }
    }
}

/// Convert a `SystemTime` to whole Unix seconds.
///
/// Times before the epoch become negative values.
#[must_use]
pub fn unix_seconds(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => i64::try_from(d.as_secs()).unwrap_or(i64::MAX),
        Err(e) => -i64::try_from(e.duration().as_secs()).unwrap_or(i64::MAX),
    }
}

/// Configuration for directory walking.
#[derive(Clone, Default)]
pub struct WalkerConfig {
    /// Optional predicate restricting which files are reported.
    /// Directories are always descended into.
    pub include: Option<Arc<dyn IncludeFilter>>,
}

impl std::fmt::Debug for WalkerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalkerConfig")
            .field("include", &self.include.as_ref().map(|_| "<filter>"))
            .finish()
    }
}

impl WalkerConfig {
    /// Restrict discovery to files accepted by `filter`.
    #[must_use]
    pub fn with_include(mut self, filter: Arc<dyn IncludeFilter>) -> Self {
        self.include = Some(filter);
        self
    }
}

/// Errors that can occur during directory scanning.
///
/// At the root these are fatal; below the root they only mark a skipped entry.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while accessing a path.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Classify an I/O error raised while accessing `path`.
    #[must_use]
    pub fn from_io(path: PathBuf, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            _ => Self::Io { path, source: error },
        }
    }
}

/// Errors that can occur during file hashing.
///
/// Hash errors never abort a scan; the affected file is dropped.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Classify an I/O error raised while reading `path`.
    #[must_use]
    pub fn from_io(path: &std::path::Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}
