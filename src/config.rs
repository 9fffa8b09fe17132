//! Application configuration management.
//!
//! Settings are layered with figment, lowest precedence first:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. A TOML file: `--config <FILE>`, or `config.toml` in the platform
//!    configuration directory
//! 3. Environment variables prefixed with `DUPECHECK_` (e.g.
//!    `DUPECHECK_WORKERS=8`)
//! 4. Command-line flags, applied by [`Config::with_cli_overrides`]
//!
//! ```toml
//! workers = 8
//! queue_capacity = 512
//! extensions = ["raw", "dng"]
//! match_mtime = false
//! output = "json"
//! progress = true
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::{OutputFormat, ScanArgs};
use crate::duplicates::pool::DEFAULT_QUEUE_CAPACITY;
use crate::duplicates::FinderConfig;
use crate::scanner::{ExtensionFilter, IncludeFilter, IMAGE_EXTENSIONS};

/// Prefix of environment variables read into the configuration.
pub const ENV_PREFIX: &str = "DUPECHECK_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Worker threads per hashing phase; `None` uses available parallelism.
    pub workers: Option<usize>,
    /// Capacity of the bounded work queue.
    pub queue_capacity: usize,
    /// Restrict the scan to image files.
    pub only_images: bool,
    /// Restrict the scan to these extensions.
    pub extensions: Vec<String>,
    /// Require equal modification times in the quick signature.
    pub match_mtime: bool,
    /// Report format.
    pub output: OutputFormat,
    /// Show progress bars.
    pub progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            only_images: false,
            extensions: Vec::new(),
            match_mtime: false,
            output: OutputFormat::Text,
            progress: true,
        }
    }
}

impl Config {
    /// Load the configuration.
    ///
    /// With an explicit `path`, the file must exist and parse. Without one,
    /// a broken file in the platform directory is logged and ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing or invalid.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.is_file() {
                    bail!("Config file not found: {}", path.display());
                }
                Self::figment(Some(path))
                    .extract()
                    .with_context(|| format!("Invalid config file {}", path.display()))
            }
            None => {
                let default_path = Self::config_path();
                match Self::figment(default_path.as_deref()).extract() {
                    Ok(config) => Ok(config),
                    Err(e) => {
                        log::debug!("Failed to load config, using defaults: {}", e);
                        Self::figment(None).extract().or_else(|e| {
                            log::debug!("Ignoring invalid {}* variables: {}", ENV_PREFIX, e);
                            Ok(Self::default())
                        })
                    }
                }
            }
        }
    }

    /// Build the provider stack for an optional TOML file.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Get the default platform-specific configuration path.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dupecheck", "dupecheck")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply command-line flags on top of the loaded values.
    #[must_use]
    pub fn with_cli_overrides(mut self, args: &ScanArgs) -> Self {
        if args.workers.is_some() {
            self.workers = args.workers;
        }
        if let Some(capacity) = args.queue_capacity {
            self.queue_capacity = capacity;
        }
        if let Some(output) = args.output {
            self.output = output;
        }
        if !args.extensions.is_empty() {
            self.extensions.clone_from(&args.extensions);
        }
        self.only_images |= args.only_images;
        self.match_mtime |= args.match_mtime;
        if args.no_progress {
            self.progress = false;
        }
        self
    }

    /// The inclusion filter implied by `only_images` and `extensions`.
    ///
    /// Both settings together accept the union of their extensions.
    #[must_use]
    pub fn include_filter(&self) -> Option<Arc<dyn IncludeFilter>> {
        if !self.only_images && self.extensions.is_empty() {
            return None;
        }
        let images = if self.only_images { IMAGE_EXTENSIONS } else { &[] };
        let filter = ExtensionFilter::new(
            images
                .iter()
                .map(|ext| (*ext).to_string())
                .chain(self.extensions.iter().cloned()),
        );
        if filter.is_empty() {
            log::warn!("Extension filter is empty, scanning all files");
            return None;
        }
        Some(Arc::new(filter))
    }

    /// Translate the settings into a [`FinderConfig`].
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        let mut config = FinderConfig::default()
            .with_queue_capacity(self.queue_capacity)
            .with_match_mtime(self.match_mtime);
        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }
        if let Some(filter) = self.include_filter() {
            config = config.with_include(filter);
        }
        config
    }
}
