//! Shared utilities.
//!
//! - `identity` - UUID identity tokens and body marker codec
//! - `hash` - content hashing for change detection
//! - `progress` - terminal progress indicators

pub mod hash;
pub mod identity;
pub mod progress;

pub use hash::{ContentHashable, content_hash, content_hash_from_parts};
pub use identity::{
    compose_body, extract_content_hash, extract_id, generate_id, insert_content_hash, insert_id,
    is_valid_id, strip_markers,
};
