//! Import command implementation.
//!
//! Validation gate first: any blocking finding aborts before a single
//! transport call. Then one reconciliation run, with the summary printed
//! on stdout.

use crate::cli::ImportArgs;
use crate::config::RepoConfig;
use crate::error::{Result, SyncError};
use crate::format::read_dataset;
use crate::sync::{ImportOptions, Reconciler};
use crate::transport::GhCli;
use crate::util::progress::should_show_progress;
use crate::validation::validate;
use std::path::Path;

/// Execute the import command.
///
/// # Errors
///
/// Returns `ValidationGate` when the gate blocks, or the first transport
/// error from the reconciliation run.
pub fn execute(args: &ImportArgs) -> Result<()> {
    let dir = Path::new(".");
    let config = RepoConfig::load(dir)?;

    let mut issues = read_dataset(&args.file)?;
    config.apply_aliases(&mut issues);

    let report = validate(&mut issues, &config, false);
    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    if !report.is_valid() {
        for error in &report.errors {
            eprintln!("error: {error}");
        }
        return Err(SyncError::ValidationGate {
            errors: report.errors.len(),
        });
    }

    let gh = GhCli::new();
    let opts = ImportOptions {
        preview: args.dry_run,
        create_only: args.create_only,
        update_only: args.update_only,
        auto_labels: args.auto_labels,
        create_milestones: args.create_milestones,
        show_progress: should_show_progress(),
    };
    let summary = Reconciler::new(&gh, &config, opts).run(&issues)?;

    let prefix = if args.dry_run { "[dry-run] " } else { "" };
    println!(
        "{prefix}created: {}, updated: {}, skipped: {}",
        summary.created, summary.updated, summary.skipped
    );
    Ok(())
}
