//! Shell completion generation.

use crate::cli::{Cli, CompletionsArgs};
use crate::error::Result;
use clap::CommandFactory;
use clap_complete::generate;
use std::io;

/// Execute the completions command.
///
/// # Errors
///
/// Infallible in practice; the signature matches the other commands.
pub fn execute(args: &CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    generate(args.shell, &mut cmd, "ghsync", &mut io::stdout());
    Ok(())
}
