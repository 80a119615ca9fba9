//! Error types and handling for ghsync.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Supports `anyhow` integration for wrapped one-off errors
//! - Provides recovery hints for user-facing errors
//! - All fatal errors exit with code 1

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for ghsync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    // === Configuration Errors ===
    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Workspace not initialized.
    #[error("No ghsync.yaml found: run 'ghsync init' first")]
    NotInitialized,

    /// Already initialized.
    #[error("Already initialized at '{path}'")]
    AlreadyInitialized { path: PathBuf },

    // === Dataset Errors ===
    /// Dataset file could not be parsed.
    #[error("Dataset parse error in '{path}' at record {record}: {reason}")]
    DatasetParse {
        path: PathBuf,
        record: usize,
        reason: String,
    },

    /// Dataset file extension is not a supported format.
    #[error("Unsupported dataset format: '{path}' (expected .csv or .json)")]
    UnsupportedFormat { path: PathBuf },

    // === Validation Errors ===
    /// Field validation failed.
    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    /// The validation gate blocked a reconciliation run.
    #[error("{errors} validation error(s) reported; no remote calls were made")]
    ValidationGate { errors: usize },

    // === Transport Errors ===
    /// The `gh` subprocess failed or could not be launched.
    #[error("gh {context} failed: {detail}")]
    Transport { context: String, detail: String },

    /// The `gh` subprocess produced output that could not be decoded.
    #[error("gh {context} returned malformed JSON: {reason}")]
    MalformedResponse { context: String, reason: String },

    // === Precondition Failures ===
    /// Interactive flow invoked without a capable terminal.
    #[error("Interactive mode requires a terminal (stdin is not a tty)")]
    NotInteractive,

    /// The user aborted an interactive selection.
    #[error("Aborted")]
    Interrupted,

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // === Wrapped errors ===
    /// Error with additional context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<SyncError>,
    },

    /// Wrapped anyhow error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SyncError {
    /// Attach a human-readable context line to an error.
    #[must_use]
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create a validation error for a specific field.
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a transport error from a call context and combined output.
    #[must_use]
    pub fn transport(context: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Transport {
            context: context.into(),
            detail: detail.into(),
        }
    }

    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run: ghsync init --repo <owner>/<name>"),
            Self::AlreadyInitialized { .. } => Some("Use --force to overwrite the config"),
            Self::ValidationGate { .. } => {
                Some("Fix the reported errors, or run 'ghsync lint --fix' to mint missing ids")
            }
            Self::NotInteractive => Some("Run 'ghsync migrate' from an interactive terminal"),
            Self::UnsupportedFormat { .. } => Some("Use a .csv or .json dataset file"),
            _ => None,
        }
    }

    /// Get the exit code for this error.
    ///
    /// All fatal errors exit with code 1.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        1
    }

}

/// Result type using `SyncError`.
pub type Result<T> = std::result::Result<T, SyncError>;
