//! Configuration management for ghsync.
//!
//! `ghsync.yaml` lives alongside the dataset and holds the repository
//! slug, the three classification vocabularies, an optional milestone
//! allowlist, alias maps recorded by the migration assistant, and an
//! optional Projects-board descriptor. It is read at the start of every
//! command that needs it and written only by the init and migrate flows.

use crate::error::{Result, SyncError};
use crate::model::{ClassField, Issue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Config filename, resolved relative to the working directory.
pub const CONFIG_FILENAME: &str = "ghsync.yaml";

/// Repository-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RepoConfig {
    /// Repository slug, `owner/name`.
    pub repo: String,

    /// Classification vocabularies. An empty vocabulary leaves the
    /// matching field unconstrained.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sizes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub priorities: Vec<String>,

    /// Milestone allowlist; empty means unconstrained.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub milestones: Vec<String>,

    /// Out-of-vocabulary value -> canonical value, per field.
    #[serde(default, skip_serializing_if = "AliasMaps::is_empty")]
    pub aliases: AliasMaps,

    /// Optional Projects v2 board descriptor for field mirroring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectBoard>,
}

/// Alias maps keyed by classification field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AliasMaps {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scope: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub size: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub priority: BTreeMap<String, String>,
}

impl AliasMaps {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scope.is_empty() && self.size.is_empty() && self.priority.is_empty()
    }

    #[must_use]
    pub fn map(&self, field: ClassField) -> &BTreeMap<String, String> {
        match field {
            ClassField::Scope => &self.scope,
            ClassField::Size => &self.size,
            ClassField::Priority => &self.priority,
        }
    }

    pub fn map_mut(&mut self, field: ClassField) -> &mut BTreeMap<String, String> {
        match field {
            ClassField::Scope => &mut self.scope,
            ClassField::Size => &mut self.size,
            ClassField::Priority => &mut self.priority,
        }
    }
}

/// Projects v2 board descriptor, provisioned during `init`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectBoard {
    /// Board owner (user or organization login).
    pub owner: String,
    /// Board number as shown in its URL.
    pub number: u64,
    /// Opaque node id used by item-edit calls.
    pub id: String,
    /// Per-field descriptor, keyed by `scope`/`size`/`priority`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, BoardField>,
}

impl ProjectBoard {
    /// Descriptor for one classification field, if provisioned.
    #[must_use]
    pub fn field(&self, field: ClassField) -> Option<&BoardField> {
        self.fields.get(field.as_str())
    }
}

/// One provisioned single-select board field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardField {
    /// Field node id.
    pub id: String,
    /// Option value -> option id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

impl RepoConfig {
    /// Create a config for the given repository slug.
    #[must_use]
    pub fn new(repo: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            ..Self::default()
        }
    }

    /// Path of the config file within `dir`.
    #[must_use]
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILENAME)
    }

    /// Load the config from `dir`.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` when the file is missing, or a YAML/I/O
    /// error when it cannot be read.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = Self::path_in(dir);
        if !path.exists() {
            return Err(SyncError::NotInitialized);
        }
        let contents = fs::read_to_string(&path)?;
        let config: Self = serde_yaml::from_str(&contents)?;
        if config.repo.trim().is_empty() {
            return Err(SyncError::Config(format!(
                "'{}' is missing the repo slug",
                path.display()
            )));
        }
        Ok(config)
    }

    /// Load the config if present; `None` when not initialized.
    ///
    /// # Errors
    ///
    /// Returns an error only when a present file cannot be read or parsed.
    pub fn load_optional(dir: &Path) -> Result<Option<Self>> {
        match Self::load(dir) {
            Ok(config) => Ok(Some(config)),
            Err(SyncError::NotInitialized) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Persist the config into `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, dir: &Path) -> Result<()> {
        let path = Self::path_in(dir);
        let yaml = serde_yaml::to_string(self)?;
        fs::write(&path, yaml)?;
        Ok(())
    }

    /// Vocabulary for one classification field.
    #[must_use]
    pub fn vocabulary(&self, field: ClassField) -> &[String] {
        match field {
            ClassField::Scope => &self.scopes,
            ClassField::Size => &self.sizes,
            ClassField::Priority => &self.priorities,
        }
    }

    /// Mutable vocabulary for one classification field.
    pub fn vocabulary_mut(&mut self, field: ClassField) -> &mut Vec<String> {
        match field {
            ClassField::Scope => &mut self.scopes,
            ClassField::Size => &mut self.sizes,
            ClassField::Priority => &mut self.priorities,
        }
    }

    /// True when the value is in the field's vocabulary, or the
    /// vocabulary is empty (unconstrained).
    #[must_use]
    pub fn permits(&self, field: ClassField, value: &str) -> bool {
        let vocab = self.vocabulary(field);
        vocab.is_empty() || vocab.iter().any(|v| v == value)
    }

    /// Canonical value for an alias, if one is recorded.
    #[must_use]
    pub fn resolve_alias(&self, field: ClassField, value: &str) -> Option<&str> {
        self.aliases.map(field).get(value).map(String::as_str)
    }

    /// Rewrite aliased classification values in place.
    ///
    /// Returns the number of fields rewritten. Applied on every dataset
    /// load so aliases recorded by the migration assistant normalize
    /// future imports automatically.
    pub fn apply_aliases(&self, issues: &mut [Issue]) -> usize {
        let mut rewritten = 0;
        for issue in issues {
            for field in ClassField::ALL {
                let Some(value) = issue.class_value(field) else {
                    continue;
                };
                if let Some(canonical) = self.resolve_alias(field, value) {
                    let canonical = canonical.to_string();
                    tracing::debug!(field = %field, from = value, to = %canonical, "alias applied");
                    issue.set_class_value(field, Some(canonical));
                    rewritten += 1;
                }
            }
        }
        rewritten
    }
}
