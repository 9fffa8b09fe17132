//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory
//! tree and collecting the metadata the duplicate cascade needs.
//!
//! # Traversal policy
//!
//! - Symbolic links are never followed and never reported, whatever they
//!   point to. Only entries whose own type is a regular file are yielded.
//! - Sockets, FIFOs and device nodes are excluded.
//! - Hidden files and directories are included.
//! - The optional [`IncludeFilter`](super::IncludeFilter) is applied to
//!   files only; every directory is descended into. Extensions are the
//!   text after the last dot of the file name, so `.png` counts as a PNG.
//! - Unreadable directories and files with unreadable metadata are yielded
//!   as [`ScanError`] values and never stop the walk.
//!
//! Traversal is single-threaded; ordering is not guaranteed to callers.
//!
//! # Example
//!
//! ```no_run
//! use dupecheck::scanner::{ExtensionFilter, Walker, WalkerConfig};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let config = WalkerConfig::default().with_include(Arc::new(ExtensionFilter::images()));
//! let walker = Walker::new(Path::new("/home/user/Pictures"), config);
//! walker.validate_root()?;
//! let images: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("{} images", images.len());
//! # Ok::<(), dupecheck::scanner::ScanError>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::WalkDir;

use super::{unix_seconds, FileEntry, ScanError, WalkerConfig};

/// Directory walker for file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// # Arguments
    ///
    /// * `path` - Root directory to scan
    /// * `config` - Walker configuration options
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set, iteration stops at the next entry.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Check that the root exists, is a directory and can be listed.
    ///
    /// # Errors
    ///
    /// Returns the fatal [`ScanError`] describing why the root cannot be
    /// traversed.
    pub fn validate_root(&self) -> Result<(), ScanError> {
        let metadata =
            fs::metadata(&self.root).map_err(|e| ScanError::from_io(self.root.clone(), e))?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(self.root.clone()));
        }
        fs::read_dir(&self.root).map_err(|e| ScanError::from_io(self.root.clone(), e))?;
        Ok(())
    }

    /// Walk the directory tree, yielding file entries.
    ///
    /// Errors below the root are yielded as [`ScanError`] values rather than
    /// stopping iteration. Call [`Walker::validate_root`] first to surface
    /// root failures as fatal.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .take_while(move |_| {
                if self.is_shutdown_requested() {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                    false
                } else {
                    true
                }
            })
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        if entry.path_is_symlink() {
                            log::trace!("Skipping symlink: {}", entry.path().display());
                        }
                        return None;
                    }
                    self.process_file_entry(entry)
                }
                Err(e) => Some(Err(self.handle_walk_error(e))),
            })
    }

    /// Build a FileEntry for a regular file that passes the filter.
    fn process_file_entry(
        &self,
        entry: walkdir::DirEntry,
    ) -> Option<Result<FileEntry, ScanError>> {
        if let Some(ref filter) = self.config.include {
            if !filter.includes(entry.path()) {
                log::trace!("Skipping file due to filter: {}", entry.path().display());
                return None;
            }
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => return Some(Err(self.handle_walk_error(e))),
        };

        let modified = metadata.modified().map_or(0, unix_seconds);

        Some(Ok(FileEntry {
            path: entry.into_path(),
            size: metadata.len(),
            modified,
        }))
    }

    /// Convert a walkdir error into a soft ScanError.
    fn handle_walk_error(&self, error: walkdir::Error) -> ScanError {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);
        let scan_error = match error.into_io_error() {
            Some(io) => ScanError::from_io(path, io),
            None => ScanError::Io {
                path,
                source: std::io::Error::other("filesystem loop detected"),
            },
        };
        match &scan_error {
            ScanError::NotFound(p) => {
                log::debug!("Entry vanished during walk: {}", p.display());
            }
            other => log::warn!("Skipping unreadable entry: {}", other),
        }
        scan_error
    }
}
