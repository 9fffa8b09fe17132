//! Output formatters for duplicate scan results.
//!
//! - [`console`]: human-readable report grouped by directory
//! - [`json`]: machine-readable document for scripting
//!
//! # Example
//!
//! ```no_run
//! use dupecheck::duplicates::DuplicateFinder;
//! use dupecheck::error::ExitCode;
//! use dupecheck::output::{ConsoleReport, JsonOutput};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (groups, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! print!("{}", ConsoleReport::new(&groups).render());
//! println!("{}", JsonOutput::new(&groups, &summary, ExitCode::Success).to_json_pretty().unwrap());
//! ```

pub mod console;
pub mod json;

// Re-export main types
pub use console::{analyze_directories, ConsoleReport, DirectoryStats};
pub use json::{JsonOutput, JsonOutputError};
