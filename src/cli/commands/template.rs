//! Template command implementation.
//!
//! Writes a starter dataset, CSV or JSON by extension, with freshly
//! minted identities so the file is importable as-is.

use crate::cli::TemplateArgs;
use crate::error::{Result, SyncError};
use crate::format::write_dataset;
use crate::model::Issue;
use crate::util::identity::generate_id;

/// Execute the template command.
///
/// # Errors
///
/// Refuses to overwrite an existing file without `--force`.
pub fn execute(args: &TemplateArgs) -> Result<()> {
    if args.file.exists() && !args.force {
        return Err(SyncError::Config(format!(
            "'{}' already exists (use --force to overwrite)",
            args.file.display()
        )));
    }

    let issues = template_issues();
    write_dataset(&args.file, &issues)?;
    println!(
        "Wrote template dataset with {} issues to {}",
        issues.len(),
        args.file.display()
    );
    Ok(())
}

fn template_issues() -> Vec<Issue> {
    vec![
        Issue {
            id: Some(generate_id()),
            title: "Example: wire up the frobnicator".to_string(),
            description: "Describe the work here.\n\nMultiple paragraphs are fine.".to_string(),
            milestone: None,
            scope: Some("core".to_string()),
            size: Some("small".to_string()),
            priority: None,
        },
        Issue {
            id: Some(generate_id()),
            title: "Example: document the frobnicator".to_string(),
            description: "Second example row.".to_string(),
            milestone: None,
            scope: None,
            size: None,
            priority: None,
        },
    ]
}
