//! Transport adapter for the `gh` CLI.
//!
//! This is the only module that spawns the external tracker tool. All
//! three public call shapes (plain, JSON-decoding, stdin-piping) funnel
//! through one retry-wrapped primitive; arguments are always passed as
//! discrete tokens, never through a shell.
//!
//! Rate-limit-flavored failures are retried with exponential backoff up
//! to a fixed attempt ceiling. Nothing else is retried: any other
//! failure surfaces immediately with the subprocess's combined output.

use crate::error::{Result, SyncError};
use serde::de::DeserializeOwned;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::{debug, warn};

/// Phrases that mark a failure as throttling rather than a hard error.
const RATE_LIMIT_SIGNATURES: &[&str] = &[
    "rate limit",
    "abuse detection",
    "was submitted too quickly",
    "try again later",
];

/// Retry behavior for rate-limited calls.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// First backoff delay; doubles on each further retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Backoff before the retry following attempt `attempt` (1-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * 2_u32.saturating_pow(attempt.saturating_sub(1))
    }
}

/// Handle to the external `gh` binary.
#[derive(Debug, Clone)]
pub struct GhCli {
    program: PathBuf,
    retry: RetryPolicy,
}

impl Default for GhCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GhCli {
    /// Adapter for the `gh` found on PATH with default retry policy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("gh"),
            retry: RetryPolicy::default(),
        }
    }

    /// Use a specific binary instead of `gh` on PATH.
    #[must_use]
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            retry: RetryPolicy::default(),
        }
    }

    /// Override the retry policy.
    #[must_use]
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Run `gh` with the given arguments and return its stdout.
    ///
    /// # Errors
    ///
    /// Returns a `Transport` error carrying the combined stderr/stdout
    /// text on launch failure or non-zero exit.
    pub fn invoke(&self, args: &[&str]) -> Result<String> {
        self.run_with_retry(args, None)
    }

    /// Run `gh` feeding `input` on stdin and return its stdout.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::invoke`].
    pub fn invoke_with_input(&self, args: &[&str], input: &str) -> Result<String> {
        self.run_with_retry(args, Some(input))
    }

    /// Run `gh` and decode its stdout as JSON.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::invoke`], plus `MalformedResponse`
    /// when stdout is not valid JSON for `T`.
    pub fn invoke_json<T: DeserializeOwned>(&self, args: &[&str]) -> Result<T> {
        let stdout = self.run_with_retry(args, None)?;
        serde_json::from_str(&stdout).map_err(|e| SyncError::MalformedResponse {
            context: call_context(args),
            reason: e.to_string(),
        })
    }

    /// The retry-wrapped primitive behind every public call shape.
    fn run_with_retry(&self, args: &[&str], input: Option<&str>) -> Result<String> {
        let mut attempt = 1;
        loop {
            match self.run_once(args, input) {
                Ok(stdout) => return Ok(stdout),
                Err(err) => {
                    let throttled = matches!(
                        &err,
                        SyncError::Transport { detail, .. } if is_rate_limited(detail)
                    );
                    if !throttled || attempt >= self.retry.max_attempts {
                        return Err(err);
                    }
                    let delay = self.retry.delay_after(attempt);
                    warn!(
                        context = %call_context(args),
                        attempt,
                        ?delay,
                        "rate limited; backing off"
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
            }
        }
    }

    /// Single subprocess execution, no retry.
    fn run_once(&self, args: &[&str], input: Option<&str>) -> Result<String> {
        let context = call_context(args);
        debug!(context = %context, "gh call");

        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .env("GH_NO_UPDATE_NOTIFIER", "1")
            .env("NO_COLOR", "1")
            .env("GH_PROMPT_DISABLED", "1")
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some((name, value)) = bridge_target(
            std::env::var("GH_TOKEN").ok().as_deref(),
            std::env::var("GITHUB_TOKEN").ok().as_deref(),
        ) {
            cmd.env(name, value);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| SyncError::transport(&context, format!("failed to launch: {e}")))?;

        if let Some(payload) = input {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| SyncError::transport(&context, "stdin unavailable"))?;
            stdin
                .write_all(payload.as_bytes())
                .map_err(|e| SyncError::transport(&context, format!("stdin write: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| SyncError::transport(&context, e.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if output.status.success() {
            return Ok(stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let mut detail = String::new();
        if !stderr.trim().is_empty() {
            detail.push_str(stderr.trim());
        }
        if !stdout.trim().is_empty() {
            if !detail.is_empty() {
                detail.push('\n');
            }
            detail.push_str(stdout.trim());
        }
        if detail.is_empty() {
            detail = format!("exit status {}", output.status.code().unwrap_or(-1));
        }
        Err(SyncError::transport(context, detail))
    }
}

/// Short human-readable context for a call, e.g. `issue list`.
fn call_context(args: &[&str]) -> String {
    args.iter()
        .take_while(|a| !a.starts_with('-'))
        .take(2)
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Does the error text carry a throttling signature?
#[must_use]
pub fn is_rate_limited(text: &str) -> bool {
    let lowered = text.to_lowercase();
    RATE_LIMIT_SIGNATURES
        .iter()
        .any(|sig| lowered.contains(sig))
}

/// Which token variable to mirror, given the two recognized variables.
///
/// When exactly one of `GH_TOKEN`/`GITHUB_TOKEN` is set, the other is
/// populated with the same value for the child process, so `gh`
/// authenticates regardless of which one the caller exported.
fn bridge_target(
    gh_token: Option<&str>,
    github_token: Option<&str>,
) -> Option<(&'static str, String)> {
    let gh_token = gh_token.filter(|v| !v.is_empty());
    let github_token = github_token.filter(|v| !v.is_empty());
    match (gh_token, github_token) {
        (Some(token), None) => Some(("GITHUB_TOKEN", token.to_string())),
        (None, Some(token)) => Some(("GH_TOKEN", token.to_string())),
        _ => None,
    }
}
