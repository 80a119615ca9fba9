//! CLI definitions and entry point.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

pub mod commands;

/// Declarative sync between CSV/JSON issue datasets and GitHub issues
#[derive(Parser, Debug)]
#[command(name = "ghsync", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize ghsync.yaml for a repository
    Init(InitArgs),

    /// Write a starter dataset with freshly minted ids
    Template(TemplateArgs),

    /// Validate a dataset without touching the tracker
    Lint(LintArgs),

    /// Reconcile a dataset against the tracker
    Import(ImportArgs),

    /// Export the tracker's tracked issues into a dataset
    Export(ExportArgs),

    /// Interactively normalize out-of-vocabulary values
    Migrate(MigrateArgs),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Repository slug (owner/name)
    #[arg(long)]
    pub repo: String,

    /// Overwrite an existing config
    #[arg(long)]
    pub force: bool,

    /// Seed the scope vocabulary (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub scopes: Vec<String>,

    /// Seed the size vocabulary (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub sizes: Vec<String>,

    /// Seed the priority vocabulary (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub priorities: Vec<String>,

    /// Projects v2 board owner; provisions Scope/Size/Priority fields
    #[arg(long, requires = "project_number")]
    pub project_owner: Option<String>,

    /// Projects v2 board number
    #[arg(long, requires = "project_owner")]
    pub project_number: Option<u64>,
}

#[derive(Args, Debug)]
pub struct TemplateArgs {
    /// Output dataset path (.csv or .json)
    pub file: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct LintArgs {
    /// Dataset path (.csv or .json)
    pub file: PathBuf,

    /// Mint missing/malformed ids and rewrite the dataset
    #[arg(long)]
    pub fix: bool,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Dataset path (.csv or .json)
    pub file: PathBuf,

    /// Compute and report decisions without performing any remote call
    #[arg(long)]
    pub dry_run: bool,

    /// Only create unseen issues; never update matched ones
    #[arg(long)]
    pub create_only: bool,

    /// Only update matched issues; never create unseen ones
    #[arg(long, conflicts_with = "create_only")]
    pub update_only: bool,

    /// Mirror scope/size/priority onto labels
    #[arg(long)]
    pub auto_labels: bool,

    /// Create missing milestones instead of proceeding without them
    #[arg(long)]
    pub create_milestones: bool,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output dataset path (.csv or .json)
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Dataset path (.csv or .json)
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}
