//! Migrate command implementation.
//!
//! Interactive: requires a terminal, fails fast without one. The
//! normalized dataset and the (possibly extended) config are persisted
//! as the terminal step.

use crate::cli::MigrateArgs;
use crate::config::RepoConfig;
use crate::error::Result;
use crate::format::{read_dataset, write_dataset};
use crate::migrate::{TermChooser, migrate};
use std::path::Path;

/// Execute the migrate command.
///
/// # Errors
///
/// Returns `NotInteractive` outside a terminal, `Interrupted` on abort,
/// plus dataset/config read/write errors.
pub fn execute(args: &MigrateArgs) -> Result<()> {
    let dir = Path::new(".");
    let mut config = RepoConfig::load(dir)?;

    let mut issues = read_dataset(&args.file)?;
    // Previously recorded aliases normalize silently; only genuinely new
    // values prompt.
    config.apply_aliases(&mut issues);

    // Terminal precondition is checked before the first prompt.
    let mut chooser = TermChooser::new()?;
    let outcome = migrate(&mut issues, &mut config, &mut chooser)?;

    write_dataset(&args.file, &issues)?;
    config.save(dir)?;

    println!(
        "Migration done: {} fields rewritten, {} vocabulary additions, {} aliases recorded",
        outcome.rewritten, outcome.vocabulary_additions, outcome.aliases_recorded
    );
    Ok(())
}
