//! Duplicate grouping and size-based file organization.
//!
//! # Overview
//!
//! This module holds the pure, I/O-free parts of the cascade:
//!
//! - [`group_by_size`]: Phase 1, bucketing descriptors by exact size
//! - [`prune_singletons`]: the cardinality ≥ 2 filter applied at every stage
//!   boundary
//! - [`DuplicateGroup`]: the confirmed result of Phase 3
//!
//! Files with different sizes cannot be duplicates, so size grouping
//! removes every uniquely-sized file before any content is read. Zero-byte
//! files are bucketed like any other size.
//!
//! # Example
//!
//! ```
//! use dupecheck::scanner::FileEntry;
//! use dupecheck::duplicates::group_by_size;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileEntry::new(PathBuf::from("/file1.txt"), 1024, 0),
//!     FileEntry::new(PathBuf::from("/file2.txt"), 1024, 0),
//!     FileEntry::new(PathBuf::from("/file3.txt"), 2048, 0),
//! ];
//!
//! let (groups, stats) = group_by_size(files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);
//! assert_eq!(groups.len(), 1);
//! ```

use std::collections::HashMap;
use std::hash::Hash;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::scanner::{hash_to_hex, ContentHash, FileEntry};

/// Confirmed duplicate group of files.
///
/// Every member has byte-identical content (modulo hash collisions) and the
/// same size. The order of `files` carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    /// xxHash64 of the file content
    pub hash: ContentHash,
    /// File size in bytes, shared by all members
    pub size: u64,
    /// Paths of every member, at least two
    pub files: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    ///
    /// # Arguments
    ///
    /// * `hash` - Full-content hash
    /// * `size` - File size in bytes
    /// * `files` - Member paths
    #[must_use]
    pub fn new(hash: ContentHash, size: u64, files: Vec<PathBuf>) -> Self {
        Self { hash, size, files }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Space reclaimable by keeping a single copy.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Hash as hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(self.hash)
    }

    /// Check whether `path` is a member of this group.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.files.iter().any(|f| f == path)
    }
}

/// Statistics from size grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of distinct file sizes
    pub unique_sizes: usize,
    /// Number of files that could be duplicates (in groups of 2+)
    pub potential_duplicates: usize,
    /// Number of files eliminated as unique (singleton buckets)
    pub eliminated_unique: usize,
    /// Number of size buckets with 2+ files
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Drop every group with fewer than two members.
///
/// Returns the surviving groups and the number of files eliminated.
pub fn prune_singletons<K, V>(groups: HashMap<K, Vec<V>>) -> (HashMap<K, Vec<V>>, usize)
where
    K: Eq + Hash,
{
    let mut eliminated = 0;
    let survivors = groups
        .into_iter()
        .filter(|(_, members)| {
            if members.len() < 2 {
                eliminated += members.len();
                false
            } else {
                true
            }
        })
        .collect();
    (survivors, eliminated)
}

/// Append each `(key, value)` pair to the group for its key.
///
/// The result depends only on the multiset of pairs, not on their order
/// (apart from the order within each group).
pub fn group_by_key<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> HashMap<K, Vec<V>>
where
    K: Eq + Hash,
{
    let mut groups: HashMap<K, Vec<V>> = HashMap::new();
    for (key, value) in pairs {
        groups.entry(key).or_default().push(value);
    }
    groups
}

/// Total number of members across all groups.
#[must_use]
pub fn member_count<K, V>(groups: &HashMap<K, Vec<V>>) -> usize {
    groups.values().map(Vec::len).sum()
}

/// Group files by size (Phase 1 of duplicate detection).
///
/// # Returns
///
/// A tuple of:
/// - `HashMap<u64, Vec<FileEntry>>` - Files grouped by size (only groups with 2+ files)
/// - `GroupingStats` - Statistics about the grouping operation
///
/// # Example
///
/// ```
/// use dupecheck::scanner::FileEntry;
/// use dupecheck::duplicates::group_by_size;
/// use std::path::PathBuf;
///
/// let files = vec![
///     FileEntry::new(PathBuf::from("/a.txt"), 0, 0),
///     FileEntry::new(PathBuf::from("/b.txt"), 0, 0),
///     FileEntry::new(PathBuf::from("/c.txt"), 200, 0),
/// ];
///
/// let (groups, stats) = group_by_size(files);
///
/// // Empty files form a bucket like any other size
/// assert_eq!(groups[&0].len(), 2);
/// assert_eq!(stats.eliminated_unique, 1);
/// ```
#[must_use]
pub fn group_by_size(
    files: impl IntoIterator<Item = FileEntry>,
) -> (HashMap<u64, Vec<FileEntry>>, GroupingStats) {
    let mut stats = GroupingStats::default();

    let all_groups = group_by_key(files.into_iter().map(|file| {
        stats.total_files += 1;
        stats.total_size += file.size;
        (file.size, file)
    }));
    stats.unique_sizes = all_groups.len();

    let (filtered_groups, eliminated) = prune_singletons(all_groups);
    stats.eliminated_unique = eliminated;
    stats.potential_duplicates = member_count(&filtered_groups);
    stats.duplicate_groups = filtered_groups.len();

    for (size, files) in &filtered_groups {
        log::trace!("Size group {} bytes: {} candidates", size, files.len());
    }

    log::info!(
        "Phase 1 complete: {} files → {} potential duplicates ({:.1}% eliminated)",
        stats.total_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (filtered_groups, stats)
}
