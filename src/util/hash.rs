//! Content hashing for change detection.
//!
//! Uses SHA256 over stable ordered fields with null separators. The
//! digest covers exactly {description, scope, size, priority, milestone};
//! title and identity are excluded so retitles are free and the hash is
//! stable across identity assignment.

use sha2::{Digest, Sha256};

use crate::model::Issue;

/// Trait for types that can produce a deterministic content hash.
pub trait ContentHashable {
    /// Compute the content hash for this value.
    fn content_hash(&self) -> String;
}

impl ContentHashable for Issue {
    fn content_hash(&self) -> String {
        content_hash(self)
    }
}

/// Compute the SHA256 content hash for an issue.
#[must_use]
pub fn content_hash(issue: &Issue) -> String {
    content_hash_from_parts(
        &issue.description,
        issue.scope.as_deref(),
        issue.size.as_deref(),
        issue.priority.as_deref(),
        issue.milestone.as_deref(),
    )
}

/// Create a content hash from raw components (for export/verification).
#[must_use]
pub fn content_hash_from_parts(
    description: &str,
    scope: Option<&str>,
    size: Option<&str>,
    priority: Option<&str>,
    milestone: Option<&str>,
) -> String {
    let mut hasher = Sha256::new();

    let mut add_field = |value: &str| {
        if value.contains('\0') {
            hasher.update(value.replace('\0', " ").as_bytes());
        } else {
            hasher.update(value.as_bytes());
        }
        hasher.update(b"\x00");
    };

    add_field(description);
    add_field(scope.unwrap_or(""));
    add_field(size.unwrap_or(""));
    add_field(priority.unwrap_or(""));
    add_field(milestone.unwrap_or(""));

    format!("{:x}", hasher.finalize())
}
