//! The reconciliation engine.
//!
//! Given the desired issues from a dataset and the tracked issues
//! fetched from the remote, computes one decision per issue:
//!
//! ```text
//! UNSEEN            -> create   (identity not found remotely)
//! MATCHED_CHANGED   -> update   (identity found, stored hash differs)
//! MATCHED_UNCHANGED -> skip     (identity found, stored hash matches)
//! ```
//!
//! The engine performs exactly one bulk fetch per run; milestone and
//! board lookups are memoized on the `Reconciler` for the run's
//! lifetime, never across runs. In preview mode every mutating call
//! becomes a log line while classification and counts stay real, so the
//! preview is a faithful forecast.

pub mod board;

use crate::config::RepoConfig;
use crate::error::{Result, SyncError};
use crate::model::{ClassField, Issue, Milestone, RemoteIssue};
use crate::transport::GhCli;
use crate::util::hash::content_hash;
use crate::util::identity::{compose_body, extract_content_hash, extract_id};
use crate::util::progress::create_progress_bar;
use board::BoardMirror;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

/// Upper bound on the bulk fetch; the remote issue count is assumed to
/// stay within it.
pub const FETCH_LIMIT: u32 = 1000;

/// Modifiers for one reconciliation run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Log would-be actions instead of performing them.
    pub preview: bool,
    /// Force matched issues to skip.
    pub create_only: bool,
    /// Force unseen issues to skip.
    pub update_only: bool,
    /// Mirror scope/size/priority onto `scope:`/`size:`/`priority:` labels.
    pub auto_labels: bool,
    /// Create missing milestones instead of degrading.
    pub create_milestones: bool,
    /// Show a progress bar over the per-issue loop.
    pub show_progress: bool,
}

/// Counts returned by a reconciliation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// Per-issue classification against the remote index.
#[derive(Debug)]
enum IssueState<'a> {
    Unseen,
    MatchedUnchanged(&'a RemoteIssue),
    MatchedChanged(&'a RemoteIssue),
}

/// One reconciliation run against one repository.
///
/// All memoization (milestone list, board item list) lives here and dies
/// with the run.
pub struct Reconciler<'a> {
    gh: &'a GhCli,
    config: &'a RepoConfig,
    opts: ImportOptions,
    milestones: Option<Vec<Milestone>>,
    board: Option<BoardMirror<'a>>,
}

impl<'a> Reconciler<'a> {
    #[must_use]
    pub fn new(gh: &'a GhCli, config: &'a RepoConfig, opts: ImportOptions) -> Self {
        let board = config
            .project
            .as_ref()
            .map(|desc| BoardMirror::new(gh, desc, opts.preview));
        Self {
            gh,
            config,
            opts,
            milestones: None,
            board,
        }
    }

    /// Reconcile the desired issues against the remote state.
    ///
    /// # Errors
    ///
    /// Returns the first transport error, wrapped with the offending
    /// issue's context. Issues already created or updated stay that way;
    /// the identity+hash mechanism makes the next run idempotent.
    pub fn run(&mut self, issues: &[Issue]) -> Result<ImportSummary> {
        let remote = self.fetch_remote()?;
        let index = index_by_id(&remote);
        info!(
            remote = remote.len(),
            tracked = index.len(),
            desired = issues.len(),
            "fetched remote state"
        );

        let mut summary = ImportSummary::default();
        let pb = create_progress_bar(
            u64::try_from(issues.len()).unwrap_or(u64::MAX),
            "Reconciling",
            self.opts.show_progress,
        );

        for issue in issues {
            if let Err(err) = self.reconcile_one(issue, &index, &mut summary) {
                pb.finish_and_clear();
                let excerpt: String = issue.description.chars().take(80).collect();
                error!(
                    title = %issue.title,
                    excerpt = %excerpt,
                    "reconciliation aborted"
                );
                return Err(err.context(format!("while syncing '{}'", issue.title)));
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        info!(
            created = summary.created,
            updated = summary.updated,
            skipped = summary.skipped,
            preview = self.opts.preview,
            "reconciliation complete"
        );
        Ok(summary)
    }

    fn fetch_remote(&self) -> Result<Vec<RemoteIssue>> {
        fetch_remote_issues(self.gh, &self.config.repo)
    }

    fn reconcile_one(
        &mut self,
        issue: &Issue,
        index: &HashMap<String, &RemoteIssue>,
        summary: &mut ImportSummary,
    ) -> Result<()> {
        let id = issue
            .id
            .as_deref()
            .ok_or_else(|| SyncError::validation("id", "missing identity (gate not run?)"))?;
        let digest = content_hash(issue);

        match classify(index, id, &digest) {
            IssueState::Unseen if self.opts.update_only => {
                debug!(title = %issue.title, "unseen; skipped (update-only)");
                summary.skipped += 1;
            }
            IssueState::Unseen => {
                self.create(issue, id, &digest)?;
                summary.created += 1;
            }
            IssueState::MatchedChanged(remote) if self.opts.create_only => {
                debug!(number = remote.number, "changed; skipped (create-only)");
                summary.skipped += 1;
            }
            IssueState::MatchedChanged(remote) => {
                self.update(issue, remote, id, &digest)?;
                summary.updated += 1;
            }
            IssueState::MatchedUnchanged(remote) => {
                debug!(number = remote.number, title = %issue.title, "unchanged; skipped");
                summary.skipped += 1;
            }
        }
        Ok(())
    }

    fn create(&mut self, issue: &Issue, id: &str, digest: &str) -> Result<()> {
        let milestone = self.resolve_milestone(issue.milestone.as_deref())?;
        let body = compose_body(id, digest, &issue.description);

        if self.opts.preview {
            info!(title = %issue.title, milestone = ?milestone, "[preview] would create issue");
            return Ok(());
        }

        let mut args: Vec<&str> = vec![
            "issue",
            "create",
            "-R",
            &self.config.repo,
            "--title",
            &issue.title,
            "--body-file",
            "-",
        ];
        if let Some(name) = milestone.as_deref() {
            args.extend(["--milestone", name]);
        }
        let stdout = self.gh.invoke_with_input(&args, &body)?;

        let url = stdout.trim().lines().last().unwrap_or_default().to_string();
        let number = parse_issue_number(&url);
        info!(number = ?number, title = %issue.title, "created issue");

        self.mirror_classifications(issue, number, &url)
    }

    fn update(&mut self, issue: &Issue, remote: &RemoteIssue, id: &str, digest: &str) -> Result<()> {
        let milestone = self.resolve_milestone(issue.milestone.as_deref())?;
        let body = compose_body(id, digest, &issue.description);

        if self.opts.preview {
            info!(
                number = remote.number,
                title = %issue.title,
                "[preview] would update issue"
            );
            return Ok(());
        }

        let number = remote.number.to_string();
        let mut args: Vec<&str> = vec![
            "issue",
            "edit",
            &number,
            "-R",
            &self.config.repo,
            "--title",
            &issue.title,
            "--body-file",
            "-",
        ];
        if let Some(name) = milestone.as_deref() {
            args.extend(["--milestone", name]);
        }
        self.gh.invoke_with_input(&args, &body)?;
        info!(number = remote.number, title = %issue.title, "updated issue");

        self.mirror_classifications(issue, Some(remote.number), &remote.url)
    }

    /// Push scope/size/priority onto labels and/or the board.
    fn mirror_classifications(
        &mut self,
        issue: &Issue,
        number: Option<u64>,
        url: &str,
    ) -> Result<()> {
        if self.opts.auto_labels {
            let labels: Vec<String> = ClassField::ALL
                .iter()
                .filter_map(|&f| issue.class_value(f).map(|v| f.label(v)))
                .collect();
            match number {
                Some(number) if !labels.is_empty() => {
                    let number = number.to_string();
                    let joined = labels.join(",");
                    self.gh.invoke(&[
                        "issue",
                        "edit",
                        &number,
                        "-R",
                        &self.config.repo,
                        "--add-label",
                        &joined,
                    ])?;
                    debug!(number = %number, labels = %joined, "labels attached");
                }
                Some(_) => {}
                None => {
                    if !labels.is_empty() {
                        warn!(title = %issue.title, "issue number unknown; labels not attached");
                    }
                }
            }
        }

        if let Some(board) = self.board.as_mut() {
            if url.is_empty() {
                warn!(title = %issue.title, "issue url unknown; board not mirrored");
            } else {
                board.mirror(issue, url)?;
            }
        }
        Ok(())
    }

    /// Resolve a desired milestone name against the remote list.
    ///
    /// Listed once per run. A name that cannot be resolved or created is
    /// a warning, never a failure: milestone absence must not block
    /// issue creation.
    fn resolve_milestone(&mut self, desired: Option<&str>) -> Result<Option<String>> {
        let Some(name) = desired.filter(|n| !n.is_empty()) else {
            return Ok(None);
        };

        if self.milestones.is_none() {
            let path = format!("repos/{}/milestones?state=all&per_page=100", self.config.repo);
            let fetched: Vec<Milestone> = self.gh.invoke_json(&["api", &path])?;
            debug!(count = fetched.len(), "fetched milestone list");
            self.milestones = Some(fetched);
        }

        let known = self
            .milestones
            .as_deref()
            .and_then(|list| list.iter().find(|m| m.title == name));
        if let Some(found) = known {
            return Ok(Some(found.title.clone()));
        }

        if self.opts.create_milestones && !self.opts.preview {
            let path = format!("repos/{}/milestones", self.config.repo);
            let field = format!("title={name}");
            let created: Milestone =
                self.gh
                    .invoke_json(&["api", "-X", "POST", &path, "-f", &field])?;
            info!(title = %created.title, "created milestone");
            let title = created.title.clone();
            if let Some(cache) = self.milestones.as_mut() {
                cache.push(created);
            }
            return Ok(Some(title));
        }

        warn!(milestone = name, "milestone not found; proceeding without it");
        Ok(None)
    }
}

/// The single bulk fetch: every issue in the repository, any state,
/// bounded by [`FETCH_LIMIT`].
///
/// # Errors
///
/// Returns transport or decode errors from `gh issue list`.
pub fn fetch_remote_issues(gh: &GhCli, repo: &str) -> Result<Vec<RemoteIssue>> {
    let limit = FETCH_LIMIT.to_string();
    gh.invoke_json(&[
        "issue",
        "list",
        "-R",
        repo,
        "--state",
        "all",
        "--limit",
        &limit,
        "--json",
        "number,title,body,state,milestone,labels,url",
    ])
}

/// Decode a tracked remote issue back into its local declaration.
///
/// Returns `None` for untracked issues (no identity marker). The
/// description is the body with both markers removed; classification
/// fields come back from the `scope:`/`size:`/`priority:` labels.
#[must_use]
pub fn to_local_issue(remote: &RemoteIssue) -> Option<Issue> {
    let id = extract_id(&remote.body)?;
    let mut issue = Issue {
        id: Some(id),
        title: remote.title.clone(),
        description: crate::util::identity::strip_markers(&remote.body),
        milestone: remote.milestone_title().map(ToString::to_string),
        ..Issue::default()
    };
    for field in ClassField::ALL {
        let value = remote.class_label(field).map(ToString::to_string);
        issue.set_class_value(field, value);
    }
    Some(issue)
}

/// Index tracked remote issues by their embedded identity.
///
/// Identities compare case-insensitively; untracked issues (no marker)
/// are left out.
fn index_by_id(remote: &[RemoteIssue]) -> HashMap<String, &RemoteIssue> {
    let mut index = HashMap::new();
    for issue in remote {
        if let Some(id) = extract_id(&issue.body) {
            index.insert(id.to_lowercase(), issue);
        }
    }
    index
}

/// Classify one desired issue against the index.
fn classify<'a>(
    index: &HashMap<String, &'a RemoteIssue>,
    id: &str,
    digest: &str,
) -> IssueState<'a> {
    match index.get(&id.to_lowercase()) {
        None => IssueState::Unseen,
        Some(remote) => match extract_content_hash(&remote.body) {
            Some(stored) if stored.eq_ignore_ascii_case(digest) => {
                IssueState::MatchedUnchanged(remote)
            }
            _ => IssueState::MatchedChanged(remote),
        },
    }
}

/// Issue number from a `gh issue create` URL.
fn parse_issue_number(url: &str) -> Option<u64> {
    url.rsplit('/').next()?.parse().ok()
}
