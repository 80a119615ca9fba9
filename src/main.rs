use clap::Parser;
use ghsync::SyncError;
use ghsync::cli::commands;
use ghsync::cli::{Cli, Commands};
use ghsync::logging::init_logging;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.quiet, cli.no_color) {
        eprintln!("Failed to initialize logging: {e}");
        // Don't exit, just continue without logging
    }

    let result = match &cli.command {
        Commands::Init(args) => commands::init::execute(args),
        Commands::Template(args) => commands::template::execute(args),
        Commands::Lint(args) => commands::lint::execute(args),
        Commands::Import(args) => commands::import::execute(args),
        Commands::Export(args) => commands::export::execute(args),
        Commands::Migrate(args) => commands::migrate::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    };

    if let Err(e) = result {
        handle_error(&e);
    }
}

/// Print a human-readable error (and a recovery hint when one exists)
/// to stderr, then exit non-zero.
fn handle_error(err: &SyncError) -> ! {
    eprintln!("error: {err}");
    if let Some(hint) = err.suggestion() {
        eprintln!("hint: {hint}");
    }
    std::process::exit(err.exit_code());
}
