//! Shared e2e test harness.
//!
//! Each workspace is a tempdir with a stub `gh` executable on PATH. The
//! stub logs every invocation to `gh_calls.log`, serves canned JSON from
//! files in the workspace, and captures issue bodies arriving on stdin,
//! so tests can assert on the exact transport traffic.

#![allow(dead_code)]

use assert_cmd::Command;
use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[derive(Debug)]
pub struct GhsyncRun {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
}

pub struct Workspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    bin_dir: PathBuf,
}

/// Stub `gh` behavior, `__ROOT__` replaced with the workspace path:
/// - every call is appended to `gh_calls.log`
/// - `issue list` serves `issue_list.json`
/// - `issue create` captures stdin as `created_body_<n>.txt` and prints
///   an issue URL numbered after the capture count
/// - `issue edit <n>` captures stdin as `edited_body_<n>.txt` when a
///   body is piped
/// - `api .../milestones` serves `milestones.json`; the POST variant
///   echoes back the posted title
/// - `project *` serves `project_<sub>.json` when present, else `{}`
const GH_STUB: &str = r#"#!/bin/sh
ROOT="__ROOT__"
echo "$@" >> "$ROOT/gh_calls.log"
case "$1" in
  issue)
    case "$2" in
      list)
        cat "$ROOT/issue_list.json"
        ;;
      create)
        n=$(ls "$ROOT"/created_body_*.txt 2>/dev/null | wc -l)
        n=$((n + 1))
        cat - > "$ROOT/created_body_$n.txt"
        echo "https://github.com/acme/demo/issues/$((100 + n))"
        ;;
      edit)
        case "$*" in
          *"--body-file -"*) cat - > "$ROOT/edited_body_$3.txt" ;;
        esac
        ;;
    esac
    ;;
  api)
    case "$*" in
      *POST*milestones*)
        title=unknown
        for a in "$@"; do
          case "$a" in title=*) title="${a#title=}" ;; esac
        done
        echo "{\"number\": 9, \"title\": \"$title\"}"
        ;;
      *milestones*)
        cat "$ROOT/milestones.json"
        ;;
      *)
        echo '{}'
        ;;
    esac
    ;;
  project)
    if [ -f "$ROOT/project_$2.json" ]; then
      cat "$ROOT/project_$2.json"
    else
      echo '{}'
    fi
    ;;
esac
exit 0
"#;

impl Workspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = temp_dir.path().to_path_buf();
        let bin_dir = root.join("bin");
        fs::create_dir_all(&bin_dir).expect("bin dir");

        let stub = GH_STUB.replace("__ROOT__", &root.to_string_lossy());
        let gh_path = bin_dir.join("gh");
        fs::write(&gh_path, stub).expect("write gh stub");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&gh_path, fs::Permissions::from_mode(0o755)).expect("chmod");
        }

        let workspace = Self {
            temp_dir,
            root,
            bin_dir,
        };
        workspace.write_file("issue_list.json", "[]");
        workspace.write_file("milestones.json", "[]");
        workspace
    }

    /// Workspace with a `ghsync.yaml` for `acme/demo` already in place.
    pub fn initialized() -> Self {
        let workspace = Self::new();
        workspace.write_file("ghsync.yaml", "repo: acme/demo\n");
        workspace
    }

    pub fn write_file(&self, name: &str, content: &str) {
        fs::write(self.root.join(name), content).expect("write file");
    }

    pub fn read_file(&self, name: &str) -> String {
        fs::read_to_string(self.root.join(name)).expect("read file")
    }

    pub fn has_file(&self, name: &str) -> bool {
        self.root.join(name).exists()
    }

    /// All stub invocations so far, one argv line each.
    pub fn gh_calls(&self) -> Vec<String> {
        fs::read_to_string(self.root.join("gh_calls.log"))
            .map(|log| log.lines().map(ToString::to_string).collect())
            .unwrap_or_default()
    }

    pub fn clear_gh_calls(&self) {
        let _ = fs::remove_file(self.root.join("gh_calls.log"));
    }

    /// Bodies captured from `issue create`, in creation order.
    pub fn created_bodies(&self) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(&self.root)
            .expect("read dir")
            .filter_map(|e| {
                let name = e.expect("entry").file_name().to_string_lossy().into_owned();
                name.starts_with("created_body_").then_some(name)
            })
            .collect();
        names.sort();
        names.iter().map(|n| self.read_file(n)).collect()
    }

    pub fn run<I, S>(&self, args: I) -> GhsyncRun
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let path = std::env::var("PATH").unwrap_or_default();
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ghsync"));
        cmd.current_dir(&self.root);
        cmd.args(args);
        cmd.env("PATH", format!("{}:{path}", self.bin_dir.display()));
        cmd.env("NO_COLOR", "1");
        cmd.env("GHSYNC_LOG", "ghsync=debug");
        cmd.env("HOME", &self.root);

        let output = cmd.output().expect("run ghsync");
        GhsyncRun {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            status: output.status,
        }
    }
}

/// A valid UUID v4 usable as a fixed identity in fixtures.
pub const FIXED_ID: &str = "9b2f1d4e-7c3a-4f6b-8d1e-2a5c9e0f4b7a";
pub const OTHER_ID: &str = "1c0e9f8d-5b4a-4d2c-9e7f-6a3b2c1d0e9f";

/// Minimal CSV dataset with the fixed header and the given rows.
pub fn csv_dataset(rows: &[&str]) -> String {
    let mut text = String::from("id,title,milestone,scope,size,priority,description\n");
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    text
}
