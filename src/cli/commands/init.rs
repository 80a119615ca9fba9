//! Init command implementation.
//!
//! Writes `ghsync.yaml` into the working directory. When a Projects v2
//! board is named, the Scope/Size/Priority single-select fields are
//! provisioned (one-time setup) and the resulting descriptor is stored
//! so the reconcile path can consume the field/option ids directly.

use crate::cli::InitArgs;
use crate::config::RepoConfig;
use crate::error::{Result, SyncError};
use crate::model::ClassField;
use crate::sync::board;
use crate::transport::GhCli;
use std::path::Path;
use tracing::info;

/// Execute the init command.
///
/// # Errors
///
/// Returns `AlreadyInitialized` without `--force`, or transport errors
/// from board provisioning.
pub fn execute(args: &InitArgs) -> Result<()> {
    let dir = Path::new(".");
    let path = RepoConfig::path_in(dir);
    if path.exists() && !args.force {
        return Err(SyncError::AlreadyInitialized { path });
    }
    if !args.repo.contains('/') {
        return Err(SyncError::Config(format!(
            "repo must be an owner/name slug, got '{}'",
            args.repo
        )));
    }

    let mut config = RepoConfig::new(&args.repo);
    config.scopes = args.scopes.clone();
    config.sizes = args.sizes.clone();
    config.priorities = args.priorities.clone();

    if let (Some(owner), Some(number)) = (args.project_owner.as_deref(), args.project_number) {
        let gh = GhCli::new();
        let vocabularies: [(ClassField, &[String]); 3] = [
            (ClassField::Scope, &config.scopes),
            (ClassField::Size, &config.sizes),
            (ClassField::Priority, &config.priorities),
        ];
        let descriptor = board::ensure_fields(&gh, owner, number, &vocabularies)?;
        info!(owner, number, fields = descriptor.fields.len(), "board provisioned");
        config.project = Some(descriptor);
    }

    config.save(dir)?;
    println!("Initialized ghsync.yaml for {}", args.repo);
    Ok(())
}
