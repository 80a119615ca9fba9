//! Dataset file formats.
//!
//! The format is chosen by file extension: `.csv` for the tabular form,
//! `.json` for the enveloped form. Both directions exist for both.

pub mod csv;
pub mod json;

use crate::error::{Result, SyncError};
use crate::model::Issue;
use std::fs;
use std::path::Path;

/// Supported dataset formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Csv,
    Json,
}

impl DatasetFormat {
    /// Determine the format from a file extension.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFormat` for anything other than `.csv`/`.json`.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            _ => Err(SyncError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Read a dataset file, dispatching on extension.
///
/// # Errors
///
/// Returns an error for an unsupported extension, unreadable file, or
/// malformed content.
pub fn read_dataset(path: &Path) -> Result<Vec<Issue>> {
    let format = DatasetFormat::from_path(path)?;
    let text = fs::read_to_string(path)?;
    match format {
        DatasetFormat::Csv => csv::from_csv(path, &text),
        DatasetFormat::Json => json::from_json(path, &text),
    }
}

/// Write a dataset file, dispatching on extension.
///
/// # Errors
///
/// Returns an error for an unsupported extension or a failed write.
pub fn write_dataset(path: &Path, issues: &[Issue]) -> Result<()> {
    let format = DatasetFormat::from_path(path)?;
    let text = match format {
        DatasetFormat::Csv => csv::to_csv(issues),
        DatasetFormat::Json => json::to_json(issues)?,
    };
    fs::write(path, text)?;
    Ok(())
}
