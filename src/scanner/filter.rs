//! Inclusion predicates applied to discovered files.
//!
//! The walker consults an [`IncludeFilter`] for every regular file it finds.
//! Any `Fn(&Path) -> bool` closure is a filter, and [`ExtensionFilter`]
//! covers the common "only these file types" case.

use std::collections::HashSet;
use std::path::Path;

/// Image extensions recognised by `--only-images`.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "heic", "heif", "webp", "bmp"];

/// Decides whether a discovered file takes part in the scan.
pub trait IncludeFilter: Send + Sync {
    /// Return `true` if the file at `path` should be reported.
    fn includes(&self, path: &Path) -> bool;
}

impl<F> IncludeFilter for F
where
    F: Fn(&Path) -> bool + Send + Sync,
{
    fn includes(&self, path: &Path) -> bool {
        self(path)
    }
}

/// Case-insensitive file extension allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFilter {
    extensions: HashSet<String>,
}

impl ExtensionFilter {
    /// Build a filter from extensions, with or without a leading dot.
    ///
    /// # Example
    ///
    /// ```
    /// use dupecheck::scanner::{ExtensionFilter, IncludeFilter};
    /// use std::path::Path;
    ///
    /// let filter = ExtensionFilter::new([".RAW", "txt"]);
    /// assert!(filter.includes(Path::new("notes.TXT")));
    /// assert!(filter.includes(Path::new("shot.raw")));
    /// assert!(!filter.includes(Path::new("Makefile")));
    /// ```
    #[must_use]
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        Self { extensions }
    }

    /// The fixed set of recognised image extensions.
    #[must_use]
    pub fn images() -> Self {
        Self::new(IMAGE_EXTENSIONS.iter().copied())
    }

    /// Number of distinct extensions accepted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Check if no extension is accepted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

/// Text after the last dot of the file name.
///
/// Unlike [`Path::extension`], a dot-file such as `.png` has the extension
/// `png`.
fn extension_of(path: &Path) -> Option<&str> {
    match path.extension() {
        Some(ext) => ext.to_str(),
        None => path.file_name()?.to_str()?.strip_prefix('.'),
    }
}

impl IncludeFilter for ExtensionFilter {
    fn includes(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| self.extensions.contains(&ext.to_lowercase()))
    }
}
