//! JSON output formatter for duplicate scan results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "duplicates": [
//!     {
//!       "hash": "9c3f1e0a2b4d6f81",
//!       "size": 1024,
//!       "files": ["/path/to/file1.txt", "/path/to/file2.txt"]
//!     }
//!   ],
//!   "summary": {
//!     "total_files": 100,
//!     "total_size": 1048576,
//!     "skipped_entries": 0,
//!     "size_candidates": 40,
//!     "quick_candidates": 12,
//!     "confirmed_files": 10,
//!     "failed_files": 0,
//!     "duplicate_groups": 5,
//!     "duplicate_files": 5,
//!     "reclaimable_space": 51200,
//!     "scan_duration_ms": 1234,
//!     "exit_code": 0,
//!     "exit_code_name": "DC000"
//!   }
//! }
//! ```
//!
//! Groups are ordered by reclaimable space, largest first, and the paths of
//! each group are sorted.

use std::io::Write;

use serde::Serialize;

use crate::duplicates::{DuplicateGroup, ScanSummary};
use crate::error::ExitCode;

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// xxHash64 of the content as 16 hex digits
    pub hash: String,
    /// File size in bytes
    pub size: u64,
    /// Absolute paths to all duplicate files
    pub files: Vec<String>,
}

impl JsonDuplicateGroup {
    /// Create a JSON duplicate group from a DuplicateGroup.
    ///
    /// Paths are converted to absolute paths where possible.
    #[must_use]
    pub fn from_duplicate_group(group: &DuplicateGroup) -> Self {
        let mut files: Vec<String> = group
            .files
            .iter()
            .map(|f| normalize_path(f.as_path()))
            .collect();
        files.sort();
        Self {
            hash: group.hash_hex(),
            size: group.size,
            files,
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Total number of files discovered
    pub total_files: usize,
    /// Total size of all discovered files in bytes
    pub total_size: u64,
    /// Entries skipped during discovery
    pub skipped_entries: usize,
    /// Files sharing their size with another file
    pub size_candidates: usize,
    /// Files sharing their quick signature with another file
    pub quick_candidates: usize,
    /// Files in confirmed duplicate groups
    pub confirmed_files: usize,
    /// Files that could not be read while hashing
    pub failed_files: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding originals)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates (bytes)
    pub reclaimable_space: u64,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DC000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            total_size: summary.total_size,
            skipped_entries: summary.skipped_entries,
            size_candidates: summary.size_candidates,
            quick_candidates: summary.quick_candidates,
            confirmed_files: summary.confirmed_files,
            failed_files: summary.failed_files,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            scan_duration_ms: u64::try_from(summary.scan_duration.as_millis()).unwrap_or(u64::MAX),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// List of duplicate groups
    pub duplicates: Vec<JsonDuplicateGroup>,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Create a new JSON output from duplicate groups, summary and exit code.
    ///
    /// # Example
    ///
    /// ```
    /// use dupecheck::duplicates::{DuplicateGroup, ScanSummary};
    /// use dupecheck::output::json::JsonOutput;
    /// use dupecheck::error::ExitCode;
    /// use std::path::PathBuf;
    ///
    /// let groups = vec![DuplicateGroup::new(
    ///     0xfeed,
    ///     1024,
    ///     vec![PathBuf::from("/file1.txt"), PathBuf::from("/file2.txt")],
    /// )];
    ///
    /// let output = JsonOutput::new(&groups, &ScanSummary::default(), ExitCode::Success);
    /// assert_eq!(output.duplicates.len(), 1);
    /// assert_eq!(output.duplicates[0].hash, "000000000000feed");
    /// ```
    #[must_use]
    pub fn new(groups: &[DuplicateGroup], summary: &ScanSummary, exit_code: ExitCode) -> Self {
        let mut ordered: Vec<&DuplicateGroup> = groups.iter().collect();
        ordered.sort_by(|a, b| {
            b.wasted_space()
                .cmp(&a.wasted_space())
                .then_with(|| a.hash.cmp(&b.hash))
        });
        Self {
            duplicates: ordered
                .into_iter()
                .map(JsonDuplicateGroup::from_duplicate_group)
                .collect(),
            summary: JsonSummary::from_scan_summary(summary, exit_code),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    ///
    /// # Example
    ///
    /// ```
    /// use dupecheck::duplicates::ScanSummary;
    /// use dupecheck::output::json::JsonOutput;
    /// use dupecheck::error::ExitCode;
    ///
    /// let output = JsonOutput::new(&[], &ScanSummary::default(), ExitCode::Success);
    /// let json = output.to_json_pretty().unwrap();
    /// assert!(json.contains('\n'));
    /// ```
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        if pretty {
            serde_json::to_writer_pretty(&mut *writer, self)?;
        } else {
            serde_json::to_writer(&mut *writer, self)?;
        }
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Normalize a path to an absolute path string.
///
/// Falls back to the path as given when it cannot be canonicalized (e.g.
/// the file was removed after the scan).
fn normalize_path(path: &std::path::Path) -> String {
    match path.canonicalize() {
        Ok(canonical) => canonical.to_string_lossy().into_owned(),
        Err(_) => path.to_string_lossy().into_owned(),
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
