//! The pre-flight validation gate.
//!
//! Runs before any reconciliation and blocks the pipeline on identity,
//! uniqueness, or vocabulary violations. The gate evaluates every issue
//! and accumulates all findings before returning, so a single run
//! surfaces the complete defect list.
//!
//! Autofix mints or regenerates identities in place and demotes those
//! findings to warnings. It never touches titles, classification fields,
//! or content; those remain hard errors requiring human correction.

use crate::config::RepoConfig;
use crate::model::{ClassField, Issue};
use crate::util::identity::{generate_id, is_valid_id};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// One validation finding, anchored to a dataset row.
#[derive(Debug, Clone)]
pub struct Finding {
    /// 1-based row within the dataset.
    pub row: usize,
    /// Field the finding is about.
    pub field: String,
    /// Human-readable message.
    pub message: String,
}

impl Finding {
    fn new(row: usize, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            row,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}: {}", self.row, self.field, self.message)
    }
}

/// Accumulated gate result.
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// Blocking findings; any entry aborts the run before transport.
    pub errors: Vec<Finding>,
    /// Non-blocking findings.
    pub warnings: Vec<Finding>,
    /// Number of identities minted or regenerated by autofix.
    pub fixed: usize,
}

impl ValidationReport {
    /// True when no blocking findings were recorded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate the desired issue set against the configured constraints.
///
/// With `autofix`, missing or malformed identities are replaced with
/// freshly minted UUIDs in place and reported as warnings instead of
/// errors.
pub fn validate(issues: &mut [Issue], config: &RepoConfig, autofix: bool) -> ValidationReport {
    let mut report = ValidationReport::default();

    for (i, issue) in issues.iter_mut().enumerate() {
        let row = i + 1;

        let id_ok = issue.id.as_deref().is_some_and(is_valid_id);
        if !id_ok {
            let what = match issue.id.as_deref() {
                None => "missing".to_string(),
                Some(found) => format!("malformed ('{found}')"),
            };
            if autofix {
                let minted = generate_id();
                debug!(row, id = %minted, "autofix minted identity");
                issue.id = Some(minted);
                report.fixed += 1;
                report
                    .warnings
                    .push(Finding::new(row, "id", format!("{what}; minted a fresh one")));
            } else {
                report.errors.push(Finding::new(
                    row,
                    "id",
                    format!("{what}; expected a UUID v4 (run 'ghsync lint --fix')"),
                ));
            }
        }

        if issue.title.trim().is_empty() {
            report
                .errors
                .push(Finding::new(row, "title", "cannot be empty"));
        }

        for field in ClassField::ALL {
            if let Some(value) = issue.class_value(field) {
                if !config.permits(field, value) {
                    report.errors.push(Finding::new(
                        row,
                        field.as_str(),
                        format!(
                            "'{value}' not in configured vocabulary [{}]",
                            config.vocabulary(field).join(", ")
                        ),
                    ));
                }
            }
        }

        match issue.milestone.as_deref() {
            None | Some("") => {
                report
                    .warnings
                    .push(Finding::new(row, "milestone", "no milestone set"));
            }
            Some(name) => {
                if !config.milestones.is_empty()
                    && !config.milestones.iter().any(|m| m == name)
                {
                    report.errors.push(Finding::new(
                        row,
                        "milestone",
                        format!(
                            "'{name}' not in configured allowlist [{}]",
                            config.milestones.join(", ")
                        ),
                    ));
                }
            }
        }
    }

    // Cross-set checks run after autofix so minted ids participate.
    report.errors.extend(duplicate_findings(
        issues.iter().map(|i| i.id.as_deref()),
        "id",
        "duplicate identity",
    ));
    report.warnings.extend(duplicate_findings(
        issues.iter().map(|i| {
            let t = i.title.trim();
            (!t.is_empty()).then_some(t)
        }),
        "title",
        "duplicate title",
    ));

    report
}

/// One finding per duplicated value, naming every row involved.
fn duplicate_findings<'a>(
    values: impl Iterator<Item = Option<&'a str>>,
    field: &str,
    what: &str,
) -> Vec<Finding> {
    let mut rows_by_value: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, value) in values.enumerate() {
        if let Some(value) = value {
            rows_by_value.entry(value).or_default().push(i + 1);
        }
    }

    rows_by_value
        .into_iter()
        .filter(|(_, rows)| rows.len() > 1)
        .map(|(value, rows)| {
            let rows_list = rows
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            Finding::new(
                rows[0],
                field,
                format!("{what} '{value}' shared by rows {rows_list}"),
            )
        })
        .collect()
}
