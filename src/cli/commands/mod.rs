//! Command implementations.

pub mod completions;
pub mod export;
pub mod import;
pub mod init;
pub mod lint;
pub mod migrate;
pub mod template;
