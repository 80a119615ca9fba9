//! ghsync: declarative sync between local issue datasets and GitHub.
//!
//! A dataset (CSV or JSON) declares the issues that should exist in a
//! repository's tracker. ghsync reconciles that declaration against the
//! remote state through the `gh` CLI: each issue carries a stable UUID
//! identity and a content hash embedded in its body, so re-importing an
//! unchanged dataset is a no-op and retitles never touch the remote.

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod migrate;
pub mod model;
pub mod sync;
pub mod transport;
pub mod util;
pub mod validation;

pub use error::{Result, SyncError};
