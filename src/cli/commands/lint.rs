//! Lint command implementation.
//!
//! Runs the validation gate over a dataset and reports the complete
//! finding list. `--fix` mints missing/malformed identities in place and
//! rewrites the file; everything else stays a hard error for a human to
//! correct.

use crate::cli::LintArgs;
use crate::config::RepoConfig;
use crate::error::{Result, SyncError};
use crate::format::{read_dataset, write_dataset};
use crate::validation::validate;
use std::path::Path;
use tracing::debug;

/// Execute the lint command.
///
/// # Errors
///
/// Returns `ValidationGate` when blocking findings remain, plus any
/// dataset read/write error.
pub fn execute(args: &LintArgs) -> Result<()> {
    // Lint works without an initialized config; constraints are simply
    // absent then.
    let config = RepoConfig::load_optional(Path::new("."))?.unwrap_or_default();

    let mut issues = read_dataset(&args.file)?;
    let aliased = config.apply_aliases(&mut issues);
    if aliased > 0 {
        debug!(aliased, "alias normalization applied");
    }

    let report = validate(&mut issues, &config, args.fix);

    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    for error in &report.errors {
        eprintln!("error: {error}");
    }

    if args.fix && report.fixed > 0 {
        write_dataset(&args.file, &issues)?;
        println!(
            "Minted {} identities and rewrote {}",
            report.fixed,
            args.file.display()
        );
    }

    if !report.is_valid() {
        return Err(SyncError::ValidationGate {
            errors: report.errors.len(),
        });
    }

    println!(
        "{} issues OK ({} warnings)",
        issues.len(),
        report.warnings.len()
    );
    Ok(())
}
