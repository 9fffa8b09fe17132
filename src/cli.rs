//! Command-line interface definitions for dupecheck.
//!
//! # Example
//!
//! ```bash
//! # Report duplicates under ~/Downloads
//! dupecheck ~/Downloads
//!
//! # Only look at photos, JSON output for scripting
//! dupecheck --only-images --output json ~/Pictures
//!
//! # Custom extensions, eight workers, debug logging
//! dupecheck -v -e raw -e dng -w 8 /mnt/archive
//! ```

use clap::{Args, Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Find files with byte-identical content.
///
/// Files are compared by size, then by a hash of their first 8 KiB, and
/// finally by a hash of their whole content.
#[derive(Debug, Parser)]
#[command(name = "dupecheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print errors as JSON objects on stderr
    #[arg(long)]
    pub json_errors: bool,

    #[command(flatten)]
    pub scan: ScanArgs,
}

/// Options controlling a scan.
#[derive(Debug, Clone, Args)]
pub struct ScanArgs {
    /// Directory to scan for duplicates
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Only consider image files (jpg, jpeg, png, gif, heic, heif, webp, bmp)
    #[arg(long)]
    pub only_images: bool,

    /// Only consider files with this extension (can be specified multiple times)
    #[arg(short = 'e', long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Worker threads per hashing phase (default: available parallelism)
    #[arg(short, long, value_name = "N", value_parser = parse_positive)]
    pub workers: Option<usize>,

    /// Capacity of the bounded work queue (default: 256)
    #[arg(long, value_name = "N", value_parser = parse_positive)]
    pub queue_capacity: Option<usize>,

    /// Require equal modification times for files to be compared
    ///
    /// Faster on large trees, but copies with a different mtime are missed.
    #[arg(long)]
    pub match_mtime: bool,

    /// Report format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Configuration file (default: platform config directory)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,
}

/// Report format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable report grouped by directory
    #[default]
    Text,
    /// JSON document for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse a count that must be at least one.
fn parse_positive(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("value must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("invalid number '{}': {}", s, e)),
    }
}
