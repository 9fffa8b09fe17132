//! dupecheck - duplicate file finder
//!
//! Finds files with byte-identical content under a directory tree. Candidates
//! are narrowed by size, then by a quick signature over the first bytes of
//! each file, and confirmed with a full-content xxHash64. The hashing stages
//! run on a bounded worker pool.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::duplicates::DuplicateFinder;
use crate::error::ExitCode;
use crate::output::{ConsoleReport, JsonOutput};
use crate::progress::Progress;

/// Run a scan as described by the parsed command line.
///
/// Duplicates are not an error: a completed scan returns
/// [`ExitCode::Success`] whether or not any were found.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded, the root cannot
/// be scanned, the scan is interrupted, or the report cannot be written.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let config = Config::load(cli.scan.config.as_deref())?.with_cli_overrides(&cli.scan);
    log::debug!("Effective configuration: {:?}", config);

    let handler = signal::install_handler().context("Failed to install signal handler")?;

    let mut finder_config = config.finder_config().with_shutdown_flag(handler.get_flag());
    let show_progress = !cli.quiet
        && config.progress
        && config.output == OutputFormat::Text
        && io::stderr().is_terminal();
    if show_progress {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new()));
    }

    let finder = DuplicateFinder::new(finder_config);
    let (groups, summary) = finder
        .find_duplicates(&cli.scan.path)
        .with_context(|| format!("Failed to scan {}", cli.scan.path.display()))?;

    log::info!(
        "{} duplicate groups, {} reclaimable, {:.1}% of scanned bytes",
        summary.duplicate_groups,
        summary.reclaimable_display(),
        summary.wasted_percentage()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match config.output {
        OutputFormat::Json => {
            JsonOutput::new(&groups, &summary, ExitCode::Success)
                .write_to(&mut out, true)
                .context("Failed to write JSON report")?;
        }
        OutputFormat::Text => {
            if !cli.quiet {
                let color = !cli.no_color && io::stdout().is_terminal();
                ConsoleReport::new(&groups)
                    .with_color(color)
                    .write_to(&mut out)
                    .context("Failed to write report")?;
            }
        }
    }
    out.flush().context("Failed to flush output")?;

    Ok(ExitCode::Success)
}
