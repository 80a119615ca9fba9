//! E2E tests for init, template, and export.

#![cfg(unix)]

mod common;

use common::{FIXED_ID, Workspace};
use ghsync::util::identity::compose_body;

#[test]
fn init_writes_config() {
    let ws = Workspace::new();

    let run = ws.run(["init", "--repo", "acme/demo"]);
    assert!(run.status.success(), "stderr: {}", run.stderr);

    let config = ws.read_file("ghsync.yaml");
    assert!(config.contains("repo: acme/demo"));
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let ws = Workspace::new();
    assert!(ws.run(["init", "--repo", "acme/demo"]).status.success());

    let second = ws.run(["init", "--repo", "acme/other"]);
    assert!(!second.status.success());
    assert!(
        second.stderr.contains("Already initialized"),
        "stderr: {}",
        second.stderr
    );

    let forced = ws.run(["init", "--repo", "acme/other", "--force"]);
    assert!(forced.status.success(), "stderr: {}", forced.stderr);
    assert!(ws.read_file("ghsync.yaml").contains("acme/other"));
}

#[test]
fn init_rejects_bare_repo_name() {
    let ws = Workspace::new();
    let run = ws.run(["init", "--repo", "demo"]);
    assert!(!run.status.success());
    assert!(run.stderr.contains("owner/name"), "stderr: {}", run.stderr);
}

#[test]
fn init_seeds_vocabularies() {
    let ws = Workspace::new();
    let run = ws.run([
        "init",
        "--repo",
        "acme/demo",
        "--scopes",
        "core,ui",
        "--sizes",
        "small,large",
    ]);
    assert!(run.status.success(), "stderr: {}", run.stderr);

    let config = ws.read_file("ghsync.yaml");
    assert!(config.contains("core"));
    assert!(config.contains("large"));
}

#[test]
fn init_provisions_board_fields() {
    let ws = Workspace::new();
    ws.write_file("project_view.json", r#"{"id": "PVT_board1", "number": 4}"#);
    ws.write_file(
        "project_field-list.json",
        r#"{"fields": [
            {"id": "PVTSSF_scope", "name": "Scope", "type": "ProjectV2SingleSelectField",
             "options": [{"id": "opt_core", "name": "core"}, {"id": "opt_ui", "name": "ui"}]}
        ]}"#,
    );
    ws.write_file(
        "project_field-create.json",
        r#"{"id": "PVTSSF_new", "name": "Size",
            "options": [{"id": "opt_small", "name": "small"}, {"id": "opt_large", "name": "large"}]}"#,
    );

    let run = ws.run([
        "init",
        "--repo",
        "acme/demo",
        "--scopes",
        "core,ui",
        "--sizes",
        "small,large",
        "--project-owner",
        "acme",
        "--project-number",
        "4",
    ]);
    assert!(run.status.success(), "stderr: {}", run.stderr);

    let config = ws.read_file("ghsync.yaml");
    // Existing Scope field reused, Size field created; option ids stored.
    assert!(config.contains("PVT_board1"));
    assert!(config.contains("PVTSSF_scope"));
    assert!(config.contains("opt_core"));
    assert!(config.contains("PVTSSF_new"));
    assert!(config.contains("opt_large"));

    // Only the missing field triggered a field-create call.
    let creates: Vec<_> = ws
        .gh_calls()
        .into_iter()
        .filter(|c| c.starts_with("project field-create"))
        .collect();
    assert_eq!(creates.len(), 1, "calls: {creates:?}");
    assert!(creates[0].contains("--name Size"));
}

#[test]
fn template_then_lint_round_trips() {
    let ws = Workspace::new();

    for name in ["starter.csv", "starter.json"] {
        let run = ws.run(["template", name]);
        assert!(run.status.success(), "stderr: {}", run.stderr);

        let lint = ws.run(["lint", name]);
        assert!(lint.status.success(), "{name} lint stderr: {}", lint.stderr);
    }
}

#[test]
fn template_refuses_to_overwrite() {
    let ws = Workspace::new();
    assert!(ws.run(["template", "starter.csv"]).status.success());

    let again = ws.run(["template", "starter.csv"]);
    assert!(!again.status.success());
    assert!(ws.run(["template", "starter.csv", "--force"]).status.success());
}

#[test]
fn export_writes_tracked_issues_only() {
    let ws = Workspace::initialized();
    let digest = "c".repeat(64);
    let tracked_body = compose_body(FIXED_ID, &digest, "tracked description");
    ws.write_file(
        "issue_list.json",
        &serde_json::json!([
            {
                "number": 5,
                "title": "Tracked one",
                "body": tracked_body,
                "state": "OPEN",
                "milestone": {"title": "v1.0"},
                "labels": [{"name": "scope:core"}, {"name": "bug"}],
                "url": "https://github.com/acme/demo/issues/5"
            },
            {
                "number": 6,
                "title": "Untracked",
                "body": "hand-written issue, no markers",
                "state": "OPEN",
                "milestone": null,
                "labels": [],
                "url": "https://github.com/acme/demo/issues/6"
            }
        ])
        .to_string(),
    );

    let run = ws.run(["export", "out.csv"]);
    assert!(run.status.success(), "stderr: {}", run.stderr);
    assert!(
        run.stdout.contains("Exported 1 tracked issues"),
        "stdout: {}",
        run.stdout
    );

    let out = ws.read_file("out.csv");
    assert!(out.contains(FIXED_ID));
    assert!(out.contains("Tracked one"));
    assert!(out.contains("tracked description"));
    assert!(out.contains("v1.0"));
    assert!(out.contains("core"));
    assert!(!out.contains("Untracked"));
    // Markers stay on the wire, not in the dataset.
    assert!(!out.contains("ghsync-id"));
}

#[test]
fn export_then_reimport_skips_everything() {
    // Scenario: create from a dataset, feed the created state back,
    // export it, and re-import the export; everything must skip.
    let ws = Workspace::initialized();
    let row = format!("{FIXED_ID},Round trip,,core,,,exported body");
    ws.write_file("issues.csv", &common::csv_dataset(&[&row]));

    let first = ws.run(["import", "issues.csv"]);
    assert!(first.status.success(), "stderr: {}", first.stderr);

    let body = ws.created_bodies().remove(0);
    ws.write_file(
        "issue_list.json",
        &serde_json::json!([{
            "number": 101,
            "title": "Round trip",
            "body": body,
            "state": "OPEN",
            "milestone": null,
            "labels": [{"name": "scope:core"}],
            "url": "https://github.com/acme/demo/issues/101"
        }])
        .to_string(),
    );

    let export = ws.run(["export", "exported.csv"]);
    assert!(export.status.success(), "stderr: {}", export.stderr);

    let reimport = ws.run(["import", "exported.csv"]);
    assert!(reimport.status.success(), "stderr: {}", reimport.stderr);
    assert!(
        reimport.stdout.contains("created: 0, updated: 0, skipped: 1"),
        "stdout: {}",
        reimport.stdout
    );
}

#[test]
fn migrate_outside_a_terminal_fails_fast() {
    let ws = Workspace::initialized();
    let row = format!("{FIXED_ID},One,,,,,x");
    ws.write_file("issues.csv", &common::csv_dataset(&[&row]));

    let run = ws.run(["migrate", "issues.csv"]);
    assert!(!run.status.success());
    assert!(
        run.stderr.contains("requires a terminal"),
        "stderr: {}",
        run.stderr
    );
}
