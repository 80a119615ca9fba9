//! Core data types for ghsync.
//!
//! - `Issue` - one locally declared issue
//! - `RemoteIssue` - an issue as reported by `gh issue list`
//! - `ClassField` - the scope/size/priority classification axes

use serde::{Deserialize, Serialize};
use std::fmt;

/// One locally declared issue.
///
/// The `id` is a UUID v4 minted once and kept for the lifetime of the
/// issue across every file and tracker representation. The content hash
/// deliberately excludes `id` and `title`, so renames never trigger a
/// remote update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Issue {
    /// Stable identity token (UUID v4). Absent until minted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Human-readable title. Required, never content-hashed.
    pub title: String,
    /// Free-form description; part of the content hash.
    #[serde(default)]
    pub description: String,
    /// Optional milestone name, resolved remotely at reconcile time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone: Option<String>,
    /// Optional classification fields, validated against the configured
    /// vocabularies when those are non-empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

impl Issue {
    /// Read one classification field.
    #[must_use]
    pub fn class_value(&self, field: ClassField) -> Option<&str> {
        match field {
            ClassField::Scope => self.scope.as_deref(),
            ClassField::Size => self.size.as_deref(),
            ClassField::Priority => self.priority.as_deref(),
        }
    }

    /// Write one classification field.
    pub fn set_class_value(&mut self, field: ClassField, value: Option<String>) {
        let slot = match field {
            ClassField::Scope => &mut self.scope,
            ClassField::Size => &mut self.size,
            ClassField::Priority => &mut self.priority,
        };
        *slot = value;
    }
}

/// The three classification axes mirrored to labels and board fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassField {
    Scope,
    Size,
    Priority,
}

impl ClassField {
    pub const ALL: [Self; 3] = [Self::Scope, Self::Size, Self::Priority];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scope => "scope",
            Self::Size => "size",
            Self::Priority => "priority",
        }
    }

    /// Display name of the matching board field ("Scope", "Size", "Priority").
    #[must_use]
    pub const fn board_name(self) -> &'static str {
        match self {
            Self::Scope => "Scope",
            Self::Size => "Size",
            Self::Priority => "Priority",
        }
    }

    /// The `scope:`/`size:`/`priority:` label for a given value.
    #[must_use]
    pub fn label(self, value: &str) -> String {
        format!("{}:{value}", self.as_str())
    }
}

impl fmt::Display for ClassField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Milestone reference as embedded in `gh issue list --json` output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilestoneRef {
    pub title: String,
}

/// Label reference as embedded in `gh issue list --json` output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelRef {
    pub name: String,
}

/// One remote issue as fetched through the transport.
///
/// "Tracked" means the body carries a recognizable identity marker; only
/// tracked issues participate in reconciliation and export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteIssue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub milestone: Option<MilestoneRef>,
    #[serde(default)]
    pub labels: Vec<LabelRef>,
    #[serde(default)]
    pub url: String,
}

impl RemoteIssue {
    /// Milestone title, if any.
    #[must_use]
    pub fn milestone_title(&self) -> Option<&str> {
        self.milestone.as_ref().map(|m| m.title.as_str())
    }

    /// Extract the value of one classification label (`scope:x` -> `x`).
    #[must_use]
    pub fn class_label(&self, field: ClassField) -> Option<&str> {
        let prefix = format!("{}:", field.as_str());
        self.labels
            .iter()
            .find_map(|l| l.name.strip_prefix(&prefix))
    }
}

/// A milestone as listed by the repository milestones API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    pub number: u64,
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_value_round_trip() {
        let mut issue = Issue {
            title: "t".to_string(),
            ..Default::default()
        };
        issue.set_class_value(ClassField::Size, Some("large".to_string()));
        assert_eq!(issue.class_value(ClassField::Size), Some("large"));
        assert_eq!(issue.class_value(ClassField::Scope), None);
    }

    #[test]
    fn class_field_label() {
        assert_eq!(ClassField::Priority.label("high"), "priority:high");
    }

    #[test]
    fn remote_issue_class_label() {
        let remote = RemoteIssue {
            number: 1,
            title: "t".to_string(),
            body: String::new(),
            state: "open".to_string(),
            milestone: None,
            labels: vec![
                LabelRef {
                    name: "bug".to_string(),
                },
                LabelRef {
                    name: "scope:core".to_string(),
                },
            ],
            url: String::new(),
        };
        assert_eq!(remote.class_label(ClassField::Scope), Some("core"));
        assert_eq!(remote.class_label(ClassField::Size), None);
    }

    #[test]
    fn remote_issue_decodes_gh_json() {
        let json = r#"{
            "number": 42,
            "title": "Fix login",
            "body": "text",
            "state": "OPEN",
            "milestone": {"title": "v1.0"},
            "labels": [{"name": "scope:auth"}],
            "url": "https://github.com/acme/demo/issues/42"
        }"#;
        let remote: RemoteIssue = serde_json::from_str(json).expect("decode");
        assert_eq!(remote.number, 42);
        assert_eq!(remote.milestone_title(), Some("v1.0"));
        assert_eq!(remote.class_label(ClassField::Scope), Some("auth"));
    }

    #[test]
    fn remote_issue_tolerates_nulls() {
        let json = r#"{"number": 7, "title": "bare"}"#;
        let remote: RemoteIssue = serde_json::from_str(json).expect("decode");
        assert!(remote.body.is_empty());
        assert!(remote.milestone.is_none());
        assert!(remote.labels.is_empty());
    }

    #[test]
    fn issue_serde_skips_absent_fields() {
        let issue = Issue {
            title: "t".to_string(),
            description: "d".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_string(&issue).expect("serialize");
        assert!(!json.contains("milestone"));
        assert!(!json.contains("scope"));
    }
}
