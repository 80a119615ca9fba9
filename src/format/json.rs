//! JSON dataset reader/writer.
//!
//! The on-disk form wraps the records in a `{version, issues[]}`
//! envelope; a bare issue list is also accepted on read for backward
//! compatibility with earlier datasets.

use crate::error::{Result, SyncError};
use crate::model::Issue;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current envelope version.
pub const DATASET_VERSION: u32 = 1;

/// Versioned dataset envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub version: u32,
    pub issues: Vec<Issue>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DatasetFile {
    Envelope(Envelope),
    Bare(Vec<Issue>),
}

/// Serialize issues to a pretty-printed envelope document.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json(issues: &[Issue]) -> Result<String> {
    let envelope = Envelope {
        version: DATASET_VERSION,
        issues: issues.to_vec(),
    };
    let mut text = serde_json::to_string_pretty(&envelope)?;
    text.push('\n');
    Ok(text)
}

/// Parse a JSON dataset, enveloped or bare.
///
/// # Errors
///
/// Returns a `DatasetParse` error when the document is neither an
/// envelope nor a bare issue list. `path` is used for error reporting
/// only.
pub fn from_json(path: &Path, text: &str) -> Result<Vec<Issue>> {
    let parsed: DatasetFile =
        serde_json::from_str(text).map_err(|e| SyncError::DatasetParse {
            path: path.to_path_buf(),
            record: e.line(),
            reason: e.to_string(),
        })?;

    match parsed {
        DatasetFile::Envelope(envelope) => Ok(envelope.issues),
        DatasetFile::Bare(issues) => Ok(issues),
    }
}
