//! Ctrl+C handling for graceful shutdown.
//!
//! A single `AtomicBool` is shared between the signal hook and the scan.
//! The walker, the pool producer and every pool worker poll it, so pressing
//! Ctrl+C lets in-flight reads finish, drains the queues and makes the scan
//! return [`FinderError::Interrupted`](crate::duplicates::FinderError).
//!
//! # Usage
//!
//! ```rust,no_run
//! use dupecheck::duplicates::FinderConfig;
//! use dupecheck::signal::install_handler;
//!
//! let handler = install_handler().expect("Failed to install signal handler");
//! let config = FinderConfig::default().with_shutdown_flag(handler.get_flag());
//! ```
//!
//! The binary exits with [`ExitCode::Interrupted`](crate::error::ExitCode)
//! (128 + SIGINT) after an interrupted scan.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

/// Shared shutdown flag.
///
/// Cloning the handler shares the flag.
#[derive(Debug, Clone)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a handler with no shutdown requested.
    #[must_use]
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// `true` once Ctrl+C was pressed or [`request_shutdown`](Self::request_shutdown) was called.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Manually request a shutdown.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Get the flag to hand to [`FinderConfig`](crate::duplicates::FinderConfig).
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Clear the flag so the handler can be reused.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

impl Default for ShutdownHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_HANDLER: OnceLock<ShutdownHandler> = OnceLock::new();
static INSTALL_LOCK: Mutex<()> = Mutex::new(());

/// Install a Ctrl+C hook that sets the shutdown flag.
///
/// The hook is registered once per process. Later calls, from any thread,
/// return the same handler with its flag cleared.
///
/// # Errors
///
/// Returns [`SignalError::InstallFailed`] if the hook cannot be registered,
/// for example because another Ctrl+C handler already owns the signal.
pub fn install_handler() -> Result<ShutdownHandler, SignalError> {
    let _guard = INSTALL_LOCK
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);

    if let Some(handler) = GLOBAL_HANDLER.get() {
        handler.reset();
        return Ok(handler.clone());
    }

    let handler = ShutdownHandler::new();
    let flag = handler.get_flag();

    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        let mut stderr = std::io::stderr();
        let _ = writeln!(stderr, "\nInterrupted. Finishing in-flight reads...");
        let _ = stderr.flush();
        log::info!("Shutdown signal received");
    })?;

    Ok(GLOBAL_HANDLER.get_or_init(|| handler).clone())
}
