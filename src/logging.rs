//! Logging initialization.
//!
//! Verbosity is driven by the global `-v`/`-q` flags; `GHSYNC_LOG` wins
//! over both when set. All log output goes to stderr so stdout stays
//! clean for machine-readable command output.

use crate::error::Result;
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the CLI verbosity flags.
const LOG_ENV: &str = "GHSYNC_LOG";

/// Initialize the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(verbose: u8, quiet: bool, no_color: bool) -> Result<()> {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(format!("ghsync={default_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(!no_color && std::io::stderr().is_terminal())
        .try_init()
        .map_err(|e| crate::error::SyncError::Config(format!("logging init failed: {e}")))?;

    Ok(())
}
