//! Progress reporting utilities using indicatif.
//!
//! This module provides the [`ProgressCallback`] trait the pipeline reports
//! through, and [`Progress`], which implements it with terminal progress
//! bars. It also owns the scan-time estimate shown once discovery finishes.

use std::sync::Mutex;
use std::time::Duration;

use bytesize::ByteSize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Progress callback for duplicate finding phases.
///
/// Implement this trait to receive progress updates during
/// the duplicate detection pipeline. Phase names are `"walking"`,
/// `"quick"` and `"full"`.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase
    /// * `total` - Total number of items to process (0 when unknown)
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called for each item processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Current item number (1-based)
    /// * `path` - Path being processed
    fn on_progress(&self, current: usize, path: &str);

    /// Called when an item has been hashed, with the number of bytes read.
    fn on_item_completed(&self, _bytes: u64) {}

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);

    /// Called to update the progress message.
    fn on_message(&self, _message: &str) {}

    /// Called once discovery is complete, before any file is hashed.
    ///
    /// # Arguments
    ///
    /// * `files` - Number of files discovered
    /// * `bytes` - Their combined size
    fn on_files_discovered(&self, _files: usize, _bytes: u64) {}
}

/// Estimate how long the hashing phases will take for `files` files.
///
/// The model is 0.02 ms per file, with a quadratic penalty of 1/10000 per
/// file once the scan grows past 10 files.
///
/// # Examples
///
/// ```
/// use dupecheck::progress::estimate_scan_time;
/// use std::time::Duration;
///
/// assert_eq!(estimate_scan_time(0), Duration::ZERO);
/// assert_eq!(estimate_scan_time(10), Duration::from_micros(200));
/// assert_eq!(estimate_scan_time(10_000), Duration::from_millis(400));
/// ```
#[must_use]
pub fn estimate_scan_time(files: usize) -> Duration {
    const MILLIS_PER_FILE: f64 = 0.02;

    if files == 0 {
        return Duration::ZERO;
    }
    let n = files as f64;
    let millis = if files <= 10 {
        n * MILLIS_PER_FILE
    } else {
        MILLIS_PER_FILE * n * (1.0 + n / 10_000.0)
    };
    Duration::from_nanos((millis * 1_000_000.0).round() as u64)
}

/// Render an estimate as a short human-readable string.
///
/// # Examples
///
/// ```
/// use dupecheck::progress::format_estimate;
/// use std::time::Duration;
///
/// assert_eq!(format_estimate(Duration::from_micros(200)), "0.2ms");
/// assert_eq!(format_estimate(Duration::from_millis(2500)), "2.5s");
/// assert_eq!(format_estimate(Duration::from_secs(125)), "2.1m");
/// ```
#[must_use]
pub fn format_estimate(estimate: Duration) -> String {
    let secs = estimate.as_secs_f64();
    if secs < 1.0 {
        format!("{:.1}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}

/// Progress reporter using indicatif.
///
/// Manages one progress bar per phase of the duplicate detection pipeline.
pub struct Progress {
    multi: MultiProgress,
    walking: Mutex<Option<ProgressBar>>,
    quick: Mutex<Option<ProgressBar>>,
    full: Mutex<Option<ProgressBar>>,
    prefix: Mutex<String>,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Examples
    ///
    /// ```
    /// use dupecheck::progress::Progress;
    ///
    /// let progress = Progress::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            walking: Mutex::new(None),
            quick: Mutex::new(None),
            full: Mutex::new(None),
            prefix: Mutex::new(String::new()),
        }
    }

    fn walking_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn quick_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn full_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.green/blue}] {pos}/{len} ({percent}%) {msg} {per_sec} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn slot(&self, phase: &str) -> Option<&Mutex<Option<ProgressBar>>> {
        match phase {
            "walking" => Some(&self.walking),
            "quick" => Some(&self.quick),
            "full" => Some(&self.full),
            _ => None,
        }
    }

    /// Apply `f` to the bar of the most advanced running phase.
    fn with_active_bar(&self, f: impl FnOnce(&ProgressBar)) {
        for slot in [&self.full, &self.quick, &self.walking] {
            if let Ok(guard) = slot.lock() {
                if let Some(ref pb) = *guard {
                    f(pb);
                    return;
                }
            }
        }
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {

        let pb = match phase {
            "walking" => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::walking_style());
                pb.set_message("Walking directory");
                pb.enable_steady_tick(Duration::from_millis(100));
                pb
            }
            "quick" => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::quick_style());
                pb.set_message("Quick signatures");
                pb
            }
            "full" => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::full_style());
                pb.set_message("Full hashing");
                pb
            }
            other => {
                log::debug!("No progress bar for phase {}", other);
                return;
            }
        };

        if let Some(Ok(mut slot)) = self.slot(phase).map(Mutex::lock) {
            *slot = Some(pb);
        }
    }

    fn on_progress(&self, current: usize, path: &str) {

        let display_msg = match self.prefix.lock() {
            Ok(prefix) if !prefix.is_empty() => {
                format!("{}: {}", *prefix, truncate_path(path, 30))
            }
            _ => truncate_path(path, 30),
        };

        self.with_active_bar(|pb| {
            pb.set_position(current as u64);
            pb.set_message(display_msg);
        });
    }

    fn on_phase_end(&self, phase: &str) {

        let message = match phase {
            "walking" => "Walking complete",
            "quick" => "Quick signatures complete",
            "full" => "Full hashing complete",
            _ => return,
        };
        if let Some(Ok(mut slot)) = self.slot(phase).map(Mutex::lock) {
            if let Some(pb) = slot.take() {
                pb.finish_with_message(message);
            }
        }
        if phase == "walking" {
            if let Ok(mut prefix) = self.prefix.lock() {
                prefix.clear();
            }
        }
    }

    fn on_message(&self, message: &str) {

        if let Ok(mut prefix) = self.prefix.lock() {
            *prefix = message.to_string();
        }
        self.with_active_bar(|pb| pb.set_message(message.to_string()));
    }

    fn on_files_discovered(&self, files: usize, bytes: u64) {
        let estimate = format_estimate(estimate_scan_time(files));
        log::info!(
            "Discovered {} files ({}), estimated scan time {}",
            files,
            ByteSize::b(bytes),
            estimate
        );
        let _ = self.multi.println(format!(
            "Found {} files ({}). Estimated scan time: {}",
            files,
            ByteSize::b(bytes),
            estimate
        ));
    }
}

/// Truncate a path for display in the progress bar.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let name_len = file_name.chars().count();
    if name_len + 4 > max_len {
        let tail: String = file_name
            .chars()
            .skip(name_len.saturating_sub(max_len.saturating_sub(3)))
            .collect();
        return format!("...{}", tail);
    }

    format!(".../{}", file_name)
}
