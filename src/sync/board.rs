//! Projects v2 board mirroring.
//!
//! When a board descriptor is configured, scope/size/priority are pushed
//! onto the board's single-select fields in addition to (or instead of)
//! labels. The board item list is memoized for the run and extended in
//! place after an item-add, the one operation known to change it.
//!
//! Field values arriving from `gh project item-list` come in several
//! JSON shapes; they are decoded once, at the parsing boundary, into the
//! tagged [`FieldValue`] enum rather than re-guessed at each call site.

use crate::config::{BoardField, ProjectBoard};
use crate::error::Result;
use crate::model::{ClassField, Issue};
use crate::transport::GhCli;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Per-run fetch bound for board items.
const ITEM_LIMIT: u32 = 500;

/// A board field value in any of the shapes `gh` emits.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    /// Plain string, e.g. `"scope": "core"`.
    Plain(String),
    /// Named option object, e.g. `{"name": "core", "id": "..."}`.
    Named { name: String },
    /// Nested value object, e.g. `{"value": {"name": "core"}}`.
    Nested { value: Box<FieldValue> },
    /// Anything else (numbers, nulls, unmodeled shapes).
    Other(serde_json::Value),
}

impl FieldValue {
    /// The textual value, when one exists.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Plain(text) => Some(text),
            Self::Named { name } => Some(name),
            Self::Nested { value } => value.as_text(),
            Self::Other(_) => None,
        }
    }
}

/// One item row from `gh project item-list --format json`.
#[derive(Debug, Clone, Deserialize)]
pub struct BoardItem {
    pub id: String,
    #[serde(default)]
    pub content: Option<ItemContent>,
    /// Remaining keys are the board's field columns.
    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldValue>,
}

/// Linked content of a board item.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemContent {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct ItemList {
    items: Vec<BoardItem>,
}

#[derive(Debug, Deserialize)]
struct AddedItem {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ProjectView {
    id: String,
}

#[derive(Debug, Deserialize)]
struct FieldList {
    fields: Vec<RemoteField>,
}

#[derive(Debug, Clone, Deserialize)]
struct RemoteField {
    id: String,
    name: String,
    #[serde(default)]
    options: Vec<FieldOption>,
}

#[derive(Debug, Clone, Deserialize)]
struct FieldOption {
    id: String,
    name: String,
}

/// Run-scoped board mirroring state.
pub struct BoardMirror<'a> {
    gh: &'a GhCli,
    desc: &'a ProjectBoard,
    preview: bool,
    items: Option<Vec<BoardItem>>,
}

impl<'a> BoardMirror<'a> {
    #[must_use]
    pub fn new(gh: &'a GhCli, desc: &'a ProjectBoard, preview: bool) -> Self {
        Self {
            gh,
            desc,
            preview,
            items: None,
        }
    }

    /// Mirror the issue's classification fields onto the board.
    ///
    /// Fields without a value or without a provisioned board field are
    /// skipped; a value with no matching option id is a warning, not a
    /// failure.
    ///
    /// # Errors
    ///
    /// Returns transport errors from the item lookup/add/edit calls.
    pub fn mirror(&mut self, issue: &Issue, issue_url: &str) -> Result<()> {
        let desc = self.desc;
        let targets: Vec<(ClassField, &BoardField, &str)> = ClassField::ALL
            .iter()
            .filter_map(|&field| {
                let value = issue.class_value(field)?;
                let board_field = desc.field(field)?;
                Some((field, board_field, value))
            })
            .collect();
        if targets.is_empty() {
            return Ok(());
        }

        if self.preview {
            info!(url = issue_url, fields = targets.len(), "[preview] would mirror board fields");
            return Ok(());
        }

        let item = self.item_for(issue_url)?;
        for (field, board_field, value) in targets {
            let Some(option_id) = board_field.options.get(value) else {
                warn!(
                    field = %field,
                    value,
                    "no board option id for value; field skipped"
                );
                continue;
            };

            let current = item
                .fields
                .get(field.as_str())
                .and_then(FieldValue::as_text);
            if current == Some(value) {
                debug!(field = %field, value, "board field already set");
                continue;
            }

            self.gh.invoke(&[
                "project",
                "item-edit",
                "--id",
                &item.id,
                "--project-id",
                &self.desc.id,
                "--field-id",
                &board_field.id,
                "--single-select-option-id",
                option_id,
            ])?;
            debug!(field = %field, value, "board field set");
        }
        Ok(())
    }

    /// Find the board item linked to `issue_url`, adding one if missing.
    fn item_for(&mut self, issue_url: &str) -> Result<BoardItem> {
        if self.items.is_none() {
            let number = self.desc.number.to_string();
            let limit = ITEM_LIMIT.to_string();
            let list: ItemList = self.gh.invoke_json(&[
                "project",
                "item-list",
                &number,
                "--owner",
                &self.desc.owner,
                "--format",
                "json",
                "--limit",
                &limit,
            ])?;
            debug!(count = list.items.len(), "fetched board items");
            self.items = Some(list.items);
        }

        let existing = self.items.as_deref().and_then(|items| {
            items
                .iter()
                .find(|item| {
                    item.content
                        .as_ref()
                        .is_some_and(|content| content.url == issue_url)
                })
                .cloned()
        });
        if let Some(item) = existing {
            return Ok(item);
        }

        let number = self.desc.number.to_string();
        let added: AddedItem = self.gh.invoke_json(&[
            "project",
            "item-add",
            &number,
            "--owner",
            &self.desc.owner,
            "--url",
            issue_url,
            "--format",
            "json",
        ])?;
        info!(url = issue_url, "added board item");

        let item = BoardItem {
            id: added.id,
            content: Some(ItemContent {
                url: issue_url.to_string(),
            }),
            fields: BTreeMap::new(),
        };
        if let Some(items) = self.items.as_mut() {
            items.push(item.clone());
        }
        Ok(item)
    }
}

/// One-time setup: make sure the Scope/Size/Priority single-select
/// fields exist with the configured vocabularies, and return the
/// descriptor the reconcile path consumes.
///
/// Fields whose vocabulary is empty are left alone. Existing fields are
/// reused as-is; option values are never created on an existing field,
/// only recorded when present.
///
/// # Errors
///
/// Returns transport errors from the view/field-list/field-create calls.
pub fn ensure_fields(
    gh: &GhCli,
    owner: &str,
    number: u64,
    vocabularies: &[(ClassField, &[String])],
) -> Result<ProjectBoard> {
    let number_arg = number.to_string();
    let view: ProjectView = gh.invoke_json(&[
        "project",
        "view",
        &number_arg,
        "--owner",
        owner,
        "--format",
        "json",
    ])?;

    let list: FieldList = gh.invoke_json(&[
        "project",
        "field-list",
        &number_arg,
        "--owner",
        owner,
        "--format",
        "json",
    ])?;
    let mut existing: BTreeMap<String, RemoteField> = list
        .fields
        .into_iter()
        .map(|f| (f.name.to_lowercase(), f))
        .collect();

    let mut fields = BTreeMap::new();
    for &(class_field, vocabulary) in vocabularies {
        if vocabulary.is_empty() {
            continue;
        }

        let key = class_field.as_str().to_string();
        let remote = match existing.remove(&key) {
            Some(found) => {
                debug!(field = %class_field, "board field already exists");
                found
            }
            None => {
                let options = vocabulary.join(",");
                let created: RemoteField = gh.invoke_json(&[
                    "project",
                    "field-create",
                    &number_arg,
                    "--owner",
                    owner,
                    "--name",
                    class_field.board_name(),
                    "--data-type",
                    "SINGLE_SELECT",
                    "--single-select-options",
                    &options,
                    "--format",
                    "json",
                ])?;
                info!(field = %class_field, "created board field");
                created
            }
        };

        let options = remote
            .options
            .iter()
            .map(|o| (o.name.clone(), o.id.clone()))
            .collect();
        fields.insert(
            key,
            BoardField {
                id: remote.id,
                options,
            },
        );
    }

    Ok(ProjectBoard {
        owner: owner.to_string(),
        number,
        id: view.id,
        fields,
    })
}
