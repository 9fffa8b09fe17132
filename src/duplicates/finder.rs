//! Quick-signature and full-hash phases, and the pipeline orchestrator.
//!
//! # Overview
//!
//! After [`group_by_size`](super::group_by_size) has removed every file with
//! a unique size, two hashing phases refine the candidates:
//!
//! - [`phase2_quick`] computes a [`QuickSignature`] per file from its size,
//!   optionally its mtime, and the xxHash64 of its first 8 KiB.
//! - [`phase3_full`] streams every surviving file through xxHash64 and turns
//!   each group of equal hashes into a [`DuplicateGroup`].
//!
//! Both phases run on a [`WorkerPool`] and return only once every candidate
//! has been hashed or dropped. A file whose read fails is logged at `warn`,
//! counted and dropped; it never aborts the scan.
//!
//! [`DuplicateFinder`] chains discovery and the three phases.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;

use super::groups::{group_by_key, group_by_size, member_count, prune_singletons, DuplicateGroup};
use super::pool::{default_workers, PoolOutcome, WorkerPool, DEFAULT_QUEUE_CAPACITY};
use crate::progress::ProgressCallback;
use crate::scanner::{
    ContentHash, FileEntry, Hasher, IncludeFilter, QuickSignature, ScanError, Walker,
    WalkerConfig, HEAD_WINDOW,
};

/// Execution settings shared by the two hashing phases.
#[derive(Clone)]
pub struct StageConfig {
    /// Number of worker threads per phase.
    pub workers: usize,
    /// Capacity of the bounded work and result queues.
    pub queue_capacity: usize,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for StageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageConfig")
            .field("workers", &self.workers)
            .field("queue_capacity", &self.queue_capacity)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl StageConfig {
    /// Set the number of worker threads.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn pool(&self) -> WorkerPool {
        WorkerPool::new(self.workers)
            .with_queue_capacity(self.queue_capacity)
            .with_shutdown_flag(self.shutdown_flag.clone())
    }
}

/// Statistics from one hashing phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageStats {
    /// Total files that entered the phase
    pub input_files: usize,
    /// Number of files successfully hashed
    pub hashed_files: usize,
    /// Number of files that failed to hash (I/O errors)
    pub failed_files: usize,
    /// Bytes read from disk
    pub bytes_read: u64,
    /// Number of files that are still candidates after this phase
    pub potential_duplicates: usize,
    /// Number of groups with 2+ files
    pub duplicate_groups: usize,
    /// Whether phase was interrupted by shutdown
    pub interrupted: bool,
}

impl StageStats {
    fn from_outcome(input_files: usize, outcome: &PoolOutcome) -> Self {
        Self {
            input_files,
            hashed_files: outcome.succeeded,
            failed_files: outcome.failed,
            interrupted: outcome.interrupted,
            ..Default::default()
        }
    }

    /// Percentage of input files eliminated by this phase.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.input_files == 0 {
            0.0
        } else {
            let eliminated = self.input_files - self.potential_duplicates;
            (eliminated as f64 / self.input_files as f64) * 100.0
        }
    }
}

/// Hash every file on the stage's pool, keyed by `key`.
///
/// Failed files are logged and dropped. Progress is reported from the
/// aggregating thread.
fn hash_stage<K, F>(
    phase: &str,
    files: Vec<FileEntry>,
    config: &StageConfig,
    bytes_for: impl Fn(&FileEntry) -> u64,
    key: F,
) -> (Vec<(K, FileEntry)>, StageStats)
where
    K: Send,
    F: Fn(&FileEntry) -> Result<K, crate::scanner::HashError> + Sync,
{
    let input_files = files.len();
    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start(phase, input_files);
    }

    let mut keyed = Vec::with_capacity(input_files);
    let mut bytes_read = 0u64;
    let mut completed = 0usize;

    let outcome = config.pool().run(files, key, |file, result| {
        completed += 1;
        if let Some(ref callback) = config.progress_callback {
            callback.on_progress(completed, file.path.to_string_lossy().as_ref());
        }
        match result {
            Ok(k) => {
                let bytes = bytes_for(&file);
                bytes_read += bytes;
                if let Some(ref callback) = config.progress_callback {
                    callback.on_item_completed(bytes);
                }
                keyed.push((k, file));
            }
            Err(e) => {
                log::warn!("Skipping file during {} hash: {}", phase, e);
            }
        }
    });

    if outcome.skipped > 0 {
        log::debug!(
            "{} hash: {} files skipped after shutdown request",
            phase,
            outcome.skipped
        );
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end(phase);
    }

    let mut stats = StageStats::from_outcome(input_files, &outcome);
    stats.bytes_read = bytes_read;
    (keyed, stats)
}

/// Group files by quick signature within size groups (Phase 2).
///
/// Reads at most the hasher's head window from each file. Signatures shared
/// by a single file are discarded.
///
/// # Returns
///
/// A tuple of:
/// - `HashMap<QuickSignature, Vec<FileEntry>>` - Candidate groups (2+ files each)
/// - `StageStats` - Statistics about the phase
///
/// # Example
///
/// ```no_run
/// use dupecheck::scanner::{FileEntry, Hasher};
/// use dupecheck::duplicates::{group_by_size, phase2_quick, StageConfig};
///
/// let files: Vec<FileEntry> = vec![];
/// let (size_groups, _) = group_by_size(files);
///
/// let (quick_groups, stats) = phase2_quick(size_groups, &Hasher::new(), &StageConfig::default());
///
/// println!("Phase 2: {:.1}% eliminated by quick signature", stats.elimination_rate());
/// ```
#[must_use]
pub fn phase2_quick(
    size_groups: HashMap<u64, Vec<FileEntry>>,
    hasher: &Hasher,
    config: &StageConfig,
) -> (HashMap<QuickSignature, Vec<FileEntry>>, StageStats) {
    let all_files: Vec<FileEntry> = size_groups.into_values().flatten().collect();
    if all_files.is_empty() {
        log::debug!("Phase 2: No files to process");
        return (HashMap::new(), StageStats::default());
    }

    log::info!(
        "Phase 2: Computing quick signatures for {} files",
        all_files.len()
    );

    let window = hasher.head_window() as u64;
    let (signed, mut stats) = hash_stage(
        "quick",
        all_files,
        config,
        |file| file.size.min(window),
        |file| hasher.quick_signature(file),
    );

    let (groups, _) = prune_singletons(group_by_key(signed));
    stats.potential_duplicates = member_count(&groups);
    stats.duplicate_groups = groups.len();

    log::info!(
        "Phase 2 complete: {} files → {} potential duplicates ({:.1}% eliminated)",
        stats.input_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (groups, stats)
}

/// Confirm duplicates by full-content hash (Phase 3).
///
/// Files are grouped by their quick signature and content hash together, so
/// files separated by Phase 2 are never merged here. Every group of two or
/// more becomes a [`DuplicateGroup`]; the order of groups and of files inside
/// a group is unspecified.
#[must_use]
pub fn phase3_full(
    quick_groups: HashMap<QuickSignature, Vec<FileEntry>>,
    hasher: &Hasher,
    config: &StageConfig,
) -> (Vec<DuplicateGroup>, StageStats) {
    let mut all_files = Vec::with_capacity(member_count(&quick_groups));
    let mut signatures: HashMap<PathBuf, QuickSignature> = HashMap::new();
    for (signature, files) in quick_groups {
        for file in files {
            signatures.insert(file.path.clone(), signature);
            all_files.push(file);
        }
    }

    if all_files.is_empty() {
        log::debug!("Phase 3: No files to process");
        return (Vec::new(), StageStats::default());
    }

    log::info!("Phase 3: Computing full hashes for {} files", all_files.len());

    let (hashed, mut stats) = hash_stage(
        "full",
        all_files,
        config,
        |file| file.size,
        |file| hasher.full_hash(&file.path),
    );

    let keyed = hashed.into_iter().filter_map(|(hash, file)| {
        signatures
            .get(&file.path)
            .map(|signature| ((*signature, hash), file))
    });
    let grouped: HashMap<(QuickSignature, ContentHash), Vec<FileEntry>> = group_by_key(keyed);
    let (groups, _) = prune_singletons(grouped);

    let duplicate_groups: Vec<DuplicateGroup> = groups
        .into_iter()
        .map(|((signature, hash), files)| {
            log::debug!(
                "Duplicate group {:016x}: {} files of {} bytes",
                hash,
                files.len(),
                signature.size
            );
            DuplicateGroup::new(
                hash,
                signature.size,
                files.into_iter().map(|f| f.path).collect(),
            )
        })
        .collect();

    stats.potential_duplicates = duplicate_groups.iter().map(DuplicateGroup::len).sum();
    stats.duplicate_groups = duplicate_groups.len();

    log::info!(
        "Phase 3 complete: {} files → {} confirmed duplicates in {} groups",
        stats.input_files,
        stats.potential_duplicates,
        stats.duplicate_groups
    );

    (duplicate_groups, stats)
}

// ============================================================================
// DuplicateFinder - Pipeline Orchestrator
// ============================================================================

/// Configuration for the duplicate finder.
///
/// Controls the behavior of the multi-phase duplicate detection pipeline.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of worker threads per hashing phase.
    /// Defaults to the host's available parallelism.
    pub workers: usize,
    /// Capacity of the bounded work queue.
    pub queue_capacity: usize,
    /// Include modification time in quick signatures.
    pub match_mtime: bool,
    /// Number of leading bytes hashed for quick signatures.
    pub head_window: usize,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("workers", &self.workers)
            .field("queue_capacity", &self.queue_capacity)
            .field("match_mtime", &self.match_mtime)
            .field("head_window", &self.head_window)
            .field("walker_config", &self.walker_config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            match_mtime: false,
            head_window: HEAD_WINDOW,
            walker_config: WalkerConfig::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the number of worker threads per phase.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the bounded queue capacity.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Require equal modification times in the quick signature.
    #[must_use]
    pub fn with_match_mtime(mut self, enabled: bool) -> Self {
        self.match_mtime = enabled;
        self
    }

    /// Override the quick-signature head window.
    #[must_use]
    pub fn with_head_window(mut self, bytes: usize) -> Self {
        self.head_window = bytes;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Restrict discovery to files accepted by `filter`.
    #[must_use]
    pub fn with_include(mut self, filter: Arc<dyn IncludeFilter>) -> Self {
        self.walker_config = self.walker_config.with_include(filter);
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    fn stage_config(&self) -> StageConfig {
        StageConfig {
            workers: self.workers,
            queue_capacity: self.queue_capacity,
            shutdown_flag: self.shutdown_flag.clone(),
            progress_callback: self.progress_callback.clone(),
        }
    }
}

/// Summary statistics from a duplicate scan.
///
/// The three candidate counters never increase from one phase to the next:
/// `size_candidates >= quick_candidates >= confirmed_files`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Total number of files discovered
    pub total_files: usize,
    /// Total size of all discovered files in bytes
    pub total_size: u64,
    /// Entries skipped during discovery (unreadable directories or metadata)
    pub skipped_entries: usize,
    /// Files sharing their size with at least one other file
    pub size_candidates: usize,
    /// Files sharing their quick signature with at least one other file
    pub quick_candidates: usize,
    /// Files in confirmed duplicate groups
    pub confirmed_files: usize,
    /// Files dropped because they could not be read while hashing
    pub failed_files: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding one original per group)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
}

impl ScanSummary {
    /// Calculate the percentage of space that is wasted by duplicates.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize::b(self.total_size).to_string()
    }

    fn record_groups(&mut self, groups: &[DuplicateGroup]) {
        self.duplicate_groups = groups.len();
        self.confirmed_files = groups.iter().map(DuplicateGroup::len).sum();
        self.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        self.reclaimable_space = groups.iter().map(DuplicateGroup::wasted_space).sum();
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The root cannot be traversed.
    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// Duplicate finder that orchestrates the multi-phase detection pipeline.
///
/// The `DuplicateFinder` runs the complete duplicate detection pipeline:
/// 1. **Walk** - Collect all regular files under the root
/// 2. **Phase 1** - Group files by size
/// 3. **Phase 2** - Compare quick signatures of same-size files
/// 4. **Phase 3** - Compute full hashes to confirm duplicates
///
/// # Example
///
/// ```no_run
/// use dupecheck::duplicates::{DuplicateFinder, FinderConfig};
/// use std::path::Path;
///
/// let config = FinderConfig::default().with_workers(4);
/// let finder = DuplicateFinder::new(config);
///
/// let (groups, summary) = finder.find_duplicates(Path::new("/some/path")).unwrap();
///
/// println!("Found {} duplicate groups", summary.duplicate_groups);
/// println!("Reclaimable space: {}", summary.reclaimable_display());
/// ```
#[derive(Debug)]
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let hasher = Hasher::new()
            .with_head_window(config.head_window)
            .with_match_mtime(config.match_mtime);
        Self { config, hasher }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The configuration this finder runs with.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find all duplicate files under `path`.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The root does not exist, is not a directory or cannot be listed
    /// - The scan is interrupted by shutdown signal
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dupecheck::duplicates::DuplicateFinder;
    /// use std::path::Path;
    ///
    /// let finder = DuplicateFinder::with_defaults();
    /// match finder.find_duplicates(Path::new(".")) {
    ///     Ok((groups, summary)) => {
    ///         println!("Found {} duplicate groups", groups.len());
    ///         println!("Can reclaim {} bytes", summary.reclaimable_space);
    ///     }
    ///     Err(e) => eprintln!("Scan failed: {}", e),
    /// }
    /// ```
    pub fn find_duplicates(
        &self,
        path: &Path,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start_time = Instant::now();

        let mut walker = Walker::new(path, self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }
        walker.validate_root()?;

        log::info!("Starting duplicate scan of {}", path.display());

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("walking", 0);
            callback.on_message(&format!("Walking {}", path.display()));
        }

        let mut files = Vec::new();
        let mut skipped_entries = 0;
        for result in walker.walk() {
            match result {
                Ok(file) => {
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_progress(files.len() + 1, file.path.to_string_lossy().as_ref());
                    }
                    files.push(file);
                }
                Err(_) => skipped_entries += 1,
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("walking");
        }

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let (groups, mut summary) = self.run_cascade(files, start_time)?;
        summary.skipped_entries = skipped_entries;
        Ok((groups, summary))
    }

    /// Find duplicates from a pre-collected list of files.
    ///
    /// Use this method when the file list comes from another source, such as
    /// a custom walker. Files that cannot be read are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Interrupted`] if shutdown is requested.
    pub fn find_duplicates_from_files(
        &self,
        files: Vec<FileEntry>,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }
        self.run_cascade(files, Instant::now())
    }

    fn run_cascade(
        &self,
        files: Vec<FileEntry>,
        start_time: Instant,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let mut summary = ScanSummary {
            total_files: files.len(),
            total_size: files.iter().map(|f| f.size).sum(),
            ..Default::default()
        };

        log::info!(
            "Found {} files ({} total)",
            summary.total_files,
            summary.total_size_display()
        );

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_files_discovered(summary.total_files, summary.total_size);
        }

        let (size_groups, size_stats) = group_by_size(files);
        summary.size_candidates = size_stats.potential_duplicates;

        if size_groups.is_empty() {
            log::info!("No potential duplicates found after size grouping");
            summary.scan_duration = start_time.elapsed();
            return Ok((Vec::new(), summary));
        }

        let stage_config = self.config.stage_config();

        let (quick_groups, quick_stats) = phase2_quick(size_groups, &self.hasher, &stage_config);
        summary.failed_files += quick_stats.failed_files;
        summary.quick_candidates = quick_stats.potential_duplicates;

        if quick_stats.interrupted || self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let (duplicate_groups, full_stats) = phase3_full(quick_groups, &self.hasher, &stage_config);
        summary.failed_files += full_stats.failed_files;

        if full_stats.interrupted || self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        summary.record_groups(&duplicate_groups);
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} duplicate groups, {} duplicate files, {} reclaimable",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display()
        );

        Ok((duplicate_groups, summary))
    }
}
