//! Identity tokens and body markers.
//!
//! Every tracked issue carries two HTML-comment markers at the top of its
//! remote body: the identity marker (a UUID v4) and the content-hash
//! marker. Comments are invisible in rendered views, survive hand edits
//! around them, and can be re-extracted case-insensitively.
//!
//! Insertion is idempotent: any pre-existing marker of the same kind is
//! removed before the new one is placed, so repeated application
//! converges instead of accumulating markers. The codec never validates
//! tokens; that is the validation gate's job.

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

/// Strict identity marker with a UUID-shaped token, for extraction.
static ID_EXTRACT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)<!--\s*ghsync-id\s*:\s*([0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12})\s*-->",
    )
    .expect("valid regex")
});

/// Any identity marker, however malformed its token, for removal and
/// position finding.
static ID_ANY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<!--\s*ghsync-id\s*:.*?-->").expect("valid regex"));

/// Identity marker plus its trailing end-of-line, for stripping.
static ID_STRIP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<!--\s*ghsync-id\s*:.*?-->[ \t]*\r?\n?").expect("valid regex"));

/// Strict content-hash marker with a 256-bit hex digest, for extraction.
static HASH_EXTRACT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<!--\s*ghsync-hash\s*:\s*([0-9a-f]{64})\s*-->").expect("valid regex")
});

/// Content-hash marker plus its trailing end-of-line, for stripping.
static HASH_STRIP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<!--\s*ghsync-hash\s*:.*?-->[ \t]*\r?\n?").expect("valid regex"));

/// Mint a fresh identity token (UUID v4).
#[must_use]
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Check a token against canonical UUID v4 textual form.
///
/// Accepts 8-4-4-4-12 hex groups with version nibble `4` and variant
/// nibble in `{8, 9, a, b}`, case-insensitive.
#[must_use]
pub fn is_valid_id(token: &str) -> bool {
    static V4: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$",
        )
        .expect("valid regex")
    });
    V4.is_match(token)
}

/// Extract the first identity marker's token, if any.
#[must_use]
pub fn extract_id(body: &str) -> Option<String> {
    ID_EXTRACT
        .captures(body)
        .map(|c| c[1].to_string())
}

/// Extract the first content-hash marker's digest, if any.
#[must_use]
pub fn extract_content_hash(body: &str) -> Option<String> {
    HASH_EXTRACT
        .captures(body)
        .map(|c| c[1].to_string())
}

/// Prepend an identity marker, removing any stale one first.
#[must_use]
pub fn insert_id(body: &str, id: &str) -> String {
    let stripped = ID_STRIP.replace_all(body, "");
    format!("<!-- ghsync-id: {id} -->\n{stripped}")
}

/// Insert a content-hash marker, removing any stale one first.
///
/// The hash marker is placed immediately after the identity marker when
/// one exists, otherwise at the top of the body.
#[must_use]
pub fn insert_content_hash(body: &str, digest: &str) -> String {
    let stripped = HASH_STRIP.replace_all(body, "").into_owned();
    let marker = format!("<!-- ghsync-hash: {digest} -->\n");

    let Some(found) = ID_ANY.find(&stripped) else {
        return format!("{marker}{stripped}");
    };

    let rest = &stripped[found.end()..];
    let eol = if rest.starts_with("\r\n") {
        2
    } else {
        usize::from(rest.starts_with('\n'))
    };
    let cut = found.end() + eol;

    let mut out = String::with_capacity(stripped.len() + marker.len() + 1);
    out.push_str(&stripped[..cut]);
    if eol == 0 {
        out.push('\n');
    }
    out.push_str(&marker);
    out.push_str(&stripped[cut..]);
    out
}

/// Compose a well-formed remote body: identity marker, hash marker, blank
/// line, description.
#[must_use]
pub fn compose_body(id: &str, digest: &str, description: &str) -> String {
    format!("<!-- ghsync-id: {id} -->\n<!-- ghsync-hash: {digest} -->\n\n{description}")
}

/// Remove both markers and the blank line separating them from the
/// description.
#[must_use]
pub fn strip_markers(body: &str) -> String {
    let no_id = ID_STRIP.replace_all(body, "");
    let no_hash = HASH_STRIP.replace_all(&no_id, "");
    no_hash.trim_start_matches(['\r', '\n']).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "9b2f1d4e-7c3a-4f6b-8d1e-2a5c9e0f4b7a";
    const HASH: &str = "0f1e2d3c4b5a69788766554433221100ffeeddccbbaa99887766554433221100";

    #[test]
    fn generated_ids_are_valid_v4() {
        for _ in 0..32 {
            let id = generate_id();
            assert!(is_valid_id(&id), "generated id not canonical: {id}");
        }
    }

    #[test]
    fn id_validation_accepts_canonical_forms() {
        assert!(is_valid_id(ID));
        assert!(is_valid_id(&ID.to_uppercase()));
    }

    #[test]
    fn id_validation_rejects_non_v4() {
        // Wrong version nibble
        assert!(!is_valid_id("9b2f1d4e-7c3a-1f6b-8d1e-2a5c9e0f4b7a"));
        // Wrong variant nibble
        assert!(!is_valid_id("9b2f1d4e-7c3a-4f6b-cd1e-2a5c9e0f4b7a"));
        // Not hex
        assert!(!is_valid_id("9b2f1d4e-7c3a-4f6b-8d1e-2a5c9e0f4bzz"));
        // Not grouped
        assert!(!is_valid_id("9b2f1d4e7c3a4f6b8d1e2a5c9e0f4b7a"));
        assert!(!is_valid_id(""));
    }

    #[test]
    fn extract_id_finds_marker_case_insensitively() {
        let body = format!("<!-- GHSYNC-ID: {} -->\nrest", ID.to_uppercase());
        assert_eq!(extract_id(&body), Some(ID.to_uppercase()));
    }

    #[test]
    fn extract_id_tolerates_whitespace() {
        let body = format!("<!--   ghsync-id :  {ID}   -->\nrest");
        assert_eq!(extract_id(&body), Some(ID.to_string()));
    }

    #[test]
    fn extract_id_absent_on_plain_body() {
        assert_eq!(extract_id("no markers here"), None);
        assert_eq!(extract_id(""), None);
    }

    #[test]
    fn extract_id_ignores_malformed_token() {
        assert_eq!(extract_id("<!-- ghsync-id: not-a-uuid -->"), None);
    }

    #[test]
    fn insert_id_round_trips() {
        let body = insert_id("some description", ID);
        assert_eq!(extract_id(&body), Some(ID.to_string()));
        assert!(body.ends_with("some description"));
    }

    #[test]
    fn insert_id_is_idempotent() {
        let once = insert_id("text", ID);
        let twice = insert_id(&once, ID);
        assert_eq!(once, twice);
        assert_eq!(twice.matches("ghsync-id").count(), 1);
    }

    #[test]
    fn insert_id_replaces_stale_marker() {
        let stale = "<!-- ghsync-id: 00000000-0000-4000-8000-000000000000 -->\nbody";
        let body = insert_id(stale, ID);
        assert_eq!(extract_id(&body), Some(ID.to_string()));
        assert_eq!(body.matches("ghsync-id").count(), 1);
    }

    #[test]
    fn insert_hash_goes_after_id_marker() {
        let body = insert_content_hash(&insert_id("desc", ID), HASH);
        let id_at = body.find("ghsync-id").expect("id marker");
        let hash_at = body.find("ghsync-hash").expect("hash marker");
        assert!(id_at < hash_at);
        assert!(hash_at < body.find("desc").expect("description"));
        assert_eq!(extract_content_hash(&body), Some(HASH.to_string()));
    }

    #[test]
    fn insert_hash_without_id_goes_on_top() {
        let body = insert_content_hash("desc", HASH);
        assert!(body.starts_with("<!-- ghsync-hash:"));
        assert_eq!(extract_content_hash(&body), Some(HASH.to_string()));
    }

    #[test]
    fn insert_hash_is_idempotent() {
        let base = insert_id("desc", ID);
        let once = insert_content_hash(&base, HASH);
        let twice = insert_content_hash(&once, HASH);
        assert_eq!(once, twice);
        assert_eq!(twice.matches("ghsync-hash").count(), 1);
    }

    #[test]
    fn insert_hash_handles_id_marker_without_newline() {
        let body = insert_content_hash(&format!("<!-- ghsync-id: {ID} -->"), HASH);
        assert_eq!(extract_id(&body), Some(ID.to_string()));
        assert_eq!(extract_content_hash(&body), Some(HASH.to_string()));
    }

    #[test]
    fn compose_body_is_well_formed() {
        let body = compose_body(ID, HASH, "the description");
        assert_eq!(extract_id(&body), Some(ID.to_string()));
        assert_eq!(extract_content_hash(&body), Some(HASH.to_string()));
        assert_eq!(strip_markers(&body), "the description");
    }

    #[test]
    fn strip_markers_preserves_interior_blank_lines() {
        let body = compose_body(ID, HASH, "para one\n\npara two");
        assert_eq!(strip_markers(&body), "para one\n\npara two");
    }
}
