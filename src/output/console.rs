//! Human-readable report grouped by directory.
//!
//! Each duplicate group is counted once for every directory holding at least
//! one of its files. A directory's duplicate count is the number of copies a
//! group has beyond the one kept, and its wasted space is that count times
//! the file size.
//!
//! ```text
//! 📁 DUPLICATE SUMMARY BY DIRECTORY
//! ├─ /photos/2023   2 duplicates (4.0 MiB wasted)
//! ├─ /backup        1 duplicates (2.0 MiB wasted)
//!
//! Total: 3 duplicate files could save 6.0 MiB
//!
//! 📂 DUPLICATES BY DIRECTORY:
//!
//! /photos/2023 (2 duplicates):
//!   Group 1: IMG_0001.jpg (3 copies, 2.0 MiB each)
//!     - /backup/IMG_0001.jpg
//!     - /photos/2023/IMG_0001.jpg
//!     - /photos/2023/IMG_0001 (1).jpg
//! ```

use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bytesize::ByteSize;
use yansi::{Condition, Paint, Style};

use crate::duplicates::DuplicateGroup;

/// Label used for files whose path has no parent component.
pub const CURRENT_DIRECTORY: &str = "(current directory)";

/// Duplicates touching one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryStats<'a> {
    /// Directory as displayed
    pub path: String,
    /// Copies beyond the kept one, summed over the groups touching it
    pub count: usize,
    /// Bytes those copies occupy
    pub wasted: u64,
    /// Groups with at least one file in this directory
    pub groups: Vec<&'a DuplicateGroup>,
}

fn directory_of(path: &Path) -> String {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.display().to_string(),
        _ => CURRENT_DIRECTORY.to_string(),
    }
}

fn sorted_files(group: &DuplicateGroup) -> Vec<&PathBuf> {
    let mut files: Vec<&PathBuf> = group.files.iter().collect();
    files.sort();
    files
}

/// Aggregate groups per directory.
///
/// The result is sorted by wasted space, largest first, then by path.
/// Groups inside a directory follow the same order.
#[must_use]
pub fn analyze_directories(groups: &[DuplicateGroup]) -> Vec<DirectoryStats<'_>> {
    let mut by_dir: HashMap<String, DirectoryStats<'_>> = HashMap::new();

    for group in groups.iter().filter(|g| g.len() >= 2) {
        let mut dirs: Vec<String> = group.files.iter().map(|f| directory_of(f)).collect();
        dirs.sort();
        dirs.dedup();

        for dir in dirs {
            let stats = by_dir.entry(dir.clone()).or_insert_with(|| DirectoryStats {
                path: dir,
                count: 0,
                wasted: 0,
                groups: Vec::new(),
            });
            stats.count += group.duplicate_count();
            stats.wasted += group.wasted_space();
            stats.groups.push(group);
        }
    }

    let mut dirs: Vec<DirectoryStats<'_>> = by_dir.into_values().collect();
    for stats in &mut dirs {
        stats.groups.sort_by(|a, b| {
            b.wasted_space()
                .cmp(&a.wasted_space())
                .then_with(|| sorted_files(a).cmp(&sorted_files(b)))
        });
    }
    dirs.sort_by(|a, b| b.wasted.cmp(&a.wasted).then_with(|| a.path.cmp(&b.path)));
    dirs
}

/// Text report over a set of duplicate groups.
#[derive(Debug, Clone)]
pub struct ConsoleReport<'a> {
    groups: &'a [DuplicateGroup],
    color: bool,
}

impl<'a> ConsoleReport<'a> {
    /// Create a report without colour.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup]) -> Self {
        Self {
            groups,
            color: false,
        }
    }

    /// Enable or disable ANSI colour.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn style(&self, style: Style) -> Style {
        let condition = if self.color {
            Condition::ALWAYS
        } else {
            Condition::NEVER
        };
        style.whenever(condition)
    }

    /// Write the report.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        if self.groups.iter().all(|g| g.len() < 2) {
            return writeln!(writer, "No duplicates found");
        }

        let dirs = analyze_directories(self.groups);
        self.write_summary(writer, &dirs)?;
        self.write_details(writer, &dirs)
    }

    /// Render the report into a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    fn write_summary<W: Write>(&self, writer: &mut W, dirs: &[DirectoryStats<'_>]) -> io::Result<()> {
        let heading = self.style(Style::new().bold());
        let dir = self.style(Style::new().cyan());
        let wasted = self.style(Style::new().yellow());
        writeln!(writer, "{}", "📁 DUPLICATE SUMMARY BY DIRECTORY".paint(heading))?;

        let mut total_count = 0;
        let mut total_wasted = 0;
        for stats in dirs {
            writeln!(
                writer,
                "├─ {}   {} duplicates ({} wasted)",
                stats.path.paint(dir),
                stats.count,
                ByteSize::b(stats.wasted).to_string().paint(wasted)
            )?;
            total_count += stats.count;
            total_wasted += stats.wasted;
        }

        writeln!(
            writer,
            "\nTotal: {} duplicate files could save {}\n",
            total_count,
            ByteSize::b(total_wasted)
                .to_string()
                .paint(self.style(Style::new().green().bold()))
        )
    }

    fn write_details<W: Write>(&self, writer: &mut W, dirs: &[DirectoryStats<'_>]) -> io::Result<()> {
        let heading = self.style(Style::new().bold());
        let dir = self.style(Style::new().cyan().bold());
        writeln!(writer, "{}\n", "📂 DUPLICATES BY DIRECTORY:".paint(heading))?;

        for stats in dirs {
            writeln!(
                writer,
                "{} ({} duplicates):",
                stats.path.paint(dir),
                stats.count
            )?;

            for (index, group) in stats.groups.iter().enumerate() {
                let files = sorted_files(group);
                let name = files
                    .first()
                    .and_then(|f| f.file_name())
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                writeln!(
                    writer,
                    "  Group {}: {} ({} copies, {} each)",
                    index + 1,
                    name.paint(heading),
                    group.len(),
                    ByteSize::b(group.size)
                )?;
                for file in files {
                    writeln!(writer, "    - {}", file.display())?;
                }
                writeln!(writer)?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }
}
