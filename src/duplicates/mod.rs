//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (Phase 1)
//! - Quick-signature comparison (Phase 2)
//! - Full hash comparison (Phase 3)
//! - The bounded worker pool both hashing phases run on
//!
//! # Example
//!
//! ```no_run
//! use dupecheck::duplicates::scan;
//! use std::path::Path;
//!
//! let groups = scan(Path::new("/home/user/Downloads"), None)?;
//! for group in &groups {
//!     println!("{} copies of {} bytes", group.len(), group.size);
//! }
//! # Ok::<(), dupecheck::duplicates::FinderError>(())
//! ```

pub mod finder;
pub mod groups;
pub mod pool;

use std::path::Path;
use std::sync::Arc;

use crate::scanner::IncludeFilter;

// Re-export main types
pub use finder::{
    phase2_quick, phase3_full, DuplicateFinder, FinderConfig, FinderError, ScanSummary,
    StageConfig, StageStats,
};
pub use groups::{group_by_size, DuplicateGroup, GroupingStats};
pub use pool::{default_workers, PoolOutcome, WorkerPool};

/// Find every group of byte-identical files under `root`.
///
/// Runs the full pipeline with default settings. When `include` is given,
/// only files it accepts are considered.
///
/// # Errors
///
/// Returns [`FinderError::Scan`] when the root is missing, is not a
/// directory or cannot be listed. Unreadable entries below the root are
/// skipped.
pub fn scan(
    root: &Path,
    include: Option<Arc<dyn IncludeFilter>>,
) -> Result<Vec<DuplicateGroup>, FinderError> {
    let mut config = FinderConfig::default();
    if let Some(filter) = include {
        config = config.with_include(filter);
    }
    let (groups, _) = DuplicateFinder::new(config).find_duplicates(root)?;
    Ok(groups)
}
