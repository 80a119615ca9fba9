//! The interactive migration assistant.
//!
//! Walks every issue and classification field whose value is missing
//! from the configured vocabulary, and asks the operator to either add
//! the value as-is, map it onto an existing vocabulary entry (recording
//! a persistent alias for future automatic normalization), or leave it
//! alone. A per-field cache ensures each out-of-vocabulary value is
//! resolved once per run even when it recurs across many issues.
//!
//! Selection goes through the [`Chooser`] seam: the real implementation
//! drives the terminal in raw mode, tests feed a scripted sequence.

mod chooser;

pub use chooser::{Chooser, ScriptedChooser, TermChooser};

use crate::config::RepoConfig;
use crate::error::{Result, SyncError};
use crate::model::{ClassField, Issue};
use std::collections::HashMap;
use tracing::{debug, info};

/// What the operator decided for one out-of-vocabulary value.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Resolution {
    /// Value was added to the vocabulary as-is.
    Added,
    /// Value maps onto this canonical vocabulary entry.
    MapTo(String),
    /// Value stays as it is.
    Keep,
}

/// Counters describing one migration run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationOutcome {
    /// Issue fields rewritten to a canonical value.
    pub rewritten: usize,
    /// Values appended to a vocabulary.
    pub vocabulary_additions: usize,
    /// Aliases recorded for future automatic normalization.
    pub aliases_recorded: usize,
}

/// Run the migration over the dataset, mutating both the issues and the
/// config in place. The caller persists both afterwards.
///
/// Fields with an empty vocabulary are unconstrained and never prompt.
///
/// # Errors
///
/// Returns `Interrupted` when the operator aborts a selection, or
/// whatever the chooser implementation fails with.
pub fn migrate(
    issues: &mut [Issue],
    config: &mut RepoConfig,
    chooser: &mut dyn Chooser,
) -> Result<MigrationOutcome> {
    let mut outcome = MigrationOutcome::default();
    let mut cache: HashMap<(ClassField, String), Resolution> = HashMap::new();

    for issue in issues.iter_mut() {
        for field in ClassField::ALL {
            let Some(value) = issue.class_value(field).map(ToString::to_string) else {
                continue;
            };
            let vocabulary = config.vocabulary(field);
            if vocabulary.is_empty() || vocabulary.iter().any(|v| *v == value) {
                continue;
            }

            let resolution = match cache.get(&(field, value.clone())) {
                Some(cached) => {
                    debug!(field = %field, value = %value, "reusing cached resolution");
                    cached.clone()
                }
                None => {
                    let fresh = resolve_value(chooser, config, field, &value, &mut outcome)?;
                    cache.insert((field, value.clone()), fresh.clone());
                    fresh
                }
            };

            if let Resolution::MapTo(canonical) = resolution {
                issue.set_class_value(field, Some(canonical));
                outcome.rewritten += 1;
            }
        }
    }

    info!(
        rewritten = outcome.rewritten,
        vocabulary_additions = outcome.vocabulary_additions,
        aliases_recorded = outcome.aliases_recorded,
        "migration pass complete"
    );
    Ok(outcome)
}

/// Ask the operator about one value and apply the config-side effect.
fn resolve_value(
    chooser: &mut dyn Chooser,
    config: &mut RepoConfig,
    field: ClassField,
    value: &str,
    outcome: &mut MigrationOutcome,
) -> Result<Resolution> {
    let prompt = format!("{field} value '{value}' is not in the configured vocabulary");
    let options = vec![
        format!("Add '{value}' to the {field} vocabulary"),
        "Map it to an existing value".to_string(),
        "Leave it unchanged".to_string(),
    ];

    match chooser.choose(&prompt, &options)? {
        0 => {
            config.vocabulary_mut(field).push(value.to_string());
            outcome.vocabulary_additions += 1;
            Ok(Resolution::Added)
        }
        1 => {
            let vocabulary = config.vocabulary(field).to_vec();
            let picked = chooser.choose(&format!("Map '{value}' to:"), &vocabulary)?;
            let canonical = vocabulary
                .get(picked)
                .cloned()
                .ok_or_else(|| SyncError::Config("selection out of range".to_string()))?;
            config
                .aliases
                .map_mut(field)
                .insert(value.to_string(), canonical.clone());
            outcome.aliases_recorded += 1;
            Ok(Resolution::MapTo(canonical))
        }
        _ => Ok(Resolution::Keep),
    }
}
