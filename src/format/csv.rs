//! CSV dataset reader/writer.
//!
//! Fixed column order `id,title,milestone,scope,size,priority,description`
//! with standard quoting: fields containing a comma, quote, or line break
//! are quote-wrapped, quotes are escaped by doubling, and quoted fields
//! may span multiple physical lines.

use crate::error::{Result, SyncError};
use crate::model::Issue;
use std::path::Path;

/// Dataset columns, in file order.
pub const COLUMNS: &[&str] = &[
    "id",
    "title",
    "milestone",
    "scope",
    "size",
    "priority",
    "description",
];

/// Escape a CSV field value.
///
/// Wraps in double quotes if the value contains commas, quotes, or
/// newlines. Doubles any existing quotes within the value.
#[must_use]
pub fn escape_field(value: &str) -> String {
    let needs_quoting = value.contains(',')
        || value.contains('"')
        || value.contains('\n')
        || value.contains('\r');

    if needs_quoting {
        let escaped = value.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

/// Format one issue as a CSV row.
#[must_use]
pub fn format_issue_row(issue: &Issue) -> String {
    let fields = [
        issue.id.clone().unwrap_or_default(),
        issue.title.clone(),
        issue.milestone.clone().unwrap_or_default(),
        issue.scope.clone().unwrap_or_default(),
        issue.size.clone().unwrap_or_default(),
        issue.priority.clone().unwrap_or_default(),
        issue.description.clone(),
    ];
    fields
        .iter()
        .map(|f| escape_field(f))
        .collect::<Vec<_>>()
        .join(",")
}

/// Serialize issues to a complete CSV document.
#[must_use]
pub fn to_csv(issues: &[Issue]) -> String {
    let mut out = String::new();
    out.push_str(&COLUMNS.join(","));
    out.push('\n');
    for issue in issues {
        out.push_str(&format_issue_row(issue));
        out.push('\n');
    }
    out
}

/// Parse a CSV document into raw records.
///
/// # Errors
///
/// Returns `(record, reason)` on a malformed document, where `record` is
/// the 1-based record index.
fn parse_records(text: &str) -> std::result::Result<Vec<Vec<String>>, (usize, String)> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut after_quotes = false;
    let mut chars = text.chars().peekable();

    let flush_record =
        |records: &mut Vec<Vec<String>>, record: &mut Vec<String>, field: &mut String| {
            record.push(std::mem::take(field));
            records.push(std::mem::take(record));
        };

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                        after_quotes = true;
                    }
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() && !after_quotes => in_quotes = true,
            '"' => {
                return Err((
                    records.len() + 1,
                    "unexpected quote inside unquoted field".to_string(),
                ));
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                after_quotes = false;
            }
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                flush_record(&mut records, &mut record, &mut field);
                after_quotes = false;
            }
            '\n' => {
                flush_record(&mut records, &mut record, &mut field);
                after_quotes = false;
            }
            _ if after_quotes => {
                return Err((
                    records.len() + 1,
                    format!("unexpected character {c:?} after closing quote"),
                ));
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err((records.len() + 1, "unterminated quoted field".to_string()));
    }
    if !field.is_empty() || !record.is_empty() {
        flush_record(&mut records, &mut record, &mut field);
    }

    Ok(records)
}

fn opt(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

/// Parse a CSV document into issues.
///
/// # Errors
///
/// Returns a `DatasetParse` error for malformed quoting, a bad header,
/// or a row with the wrong column count. `path` is used for error
/// reporting only.
pub fn from_csv(path: &Path, text: &str) -> Result<Vec<Issue>> {
    let parse_err = |record: usize, reason: String| SyncError::DatasetParse {
        path: path.to_path_buf(),
        record,
        reason,
    };

    let records = parse_records(text).map_err(|(record, reason)| parse_err(record, reason))?;

    let Some((header, rows)) = records.split_first() else {
        return Ok(Vec::new());
    };
    let header_ok =
        header.len() == COLUMNS.len() && header.iter().zip(COLUMNS).all(|(h, c)| h == c);
    if !header_ok {
        return Err(parse_err(
            1,
            format!("expected header '{}', found '{}'", COLUMNS.join(","), header.join(",")),
        ));
    }

    let mut issues = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        if row.len() != COLUMNS.len() {
            return Err(parse_err(
                i + 2,
                format!("expected {} fields, found {}", COLUMNS.len(), row.len()),
            ));
        }
        let mut cols = row.iter().cloned();
        issues.push(Issue {
            id: opt(cols.next().unwrap_or_default()),
            title: cols.next().unwrap_or_default(),
            milestone: opt(cols.next().unwrap_or_default()),
            scope: opt(cols.next().unwrap_or_default()),
            size: opt(cols.next().unwrap_or_default()),
            priority: opt(cols.next().unwrap_or_default()),
            description: cols.next().unwrap_or_default(),
        });
    }

    Ok(issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn path() -> PathBuf {
        PathBuf::from("issues.csv")
    }

    fn make_issue(title: &str) -> Issue {
        Issue {
            id: Some("9b2f1d4e-7c3a-4f6b-8d1e-2a5c9e0f4b7a".to_string()),
            title: title.to_string(),
            description: "desc".to_string(),
            milestone: Some("v1.0".to_string()),
            scope: Some("core".to_string()),
            size: None,
            priority: None,
        }
    }

    #[test]
    fn test_escape_field_plain() {
        assert_eq!(escape_field("simple"), "simple");
        assert_eq!(escape_field("hello world"), "hello world");
    }

    #[test]
    fn test_escape_field_with_comma() {
        assert_eq!(escape_field("hello, world"), "\"hello, world\"");
    }

    #[test]
    fn test_escape_field_with_quotes() {
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_escape_field_with_newline() {
        assert_eq!(escape_field("line1\nline2"), "\"line1\nline2\"");
    }

    #[test]
    fn round_trip_simple() {
        let issues = vec![make_issue("First"), make_issue("Second")];
        let csv = to_csv(&issues);
        let parsed = from_csv(&path(), &csv).expect("parse");
        assert_eq!(parsed, issues);
    }

    #[test]
    fn round_trip_multiline_description() {
        let mut issue = make_issue("Tricky");
        issue.description = "line one\nline two, with comma\nand \"quotes\"".to_string();
        let csv = to_csv(std::slice::from_ref(&issue));
        let parsed = from_csv(&path(), &csv).expect("parse");
        assert_eq!(parsed, vec![issue]);
    }

    #[test]
    fn empty_optional_fields_read_as_none() {
        let csv = "id,title,milestone,scope,size,priority,description\n,Bare title,,,,,\n";
        let parsed = from_csv(&path(), csv).expect("parse");
        assert_eq!(parsed.len(), 1);
        assert!(parsed[0].id.is_none());
        assert!(parsed[0].milestone.is_none());
        assert_eq!(parsed[0].title, "Bare title");
        assert!(parsed[0].description.is_empty());
    }

    #[test]
    fn header_only_is_empty_dataset() {
        let csv = "id,title,milestone,scope,size,priority,description\n";
        assert!(from_csv(&path(), csv).expect("parse").is_empty());
    }

    #[test]
    fn empty_file_is_empty_dataset() {
        assert!(from_csv(&path(), "").expect("parse").is_empty());
    }

    #[test]
    fn wrong_header_is_rejected() {
        let err = from_csv(&path(), "id,name\n1,2\n").unwrap_err();
        assert!(err.to_string().contains("expected header"));
    }

    #[test]
    fn short_row_is_rejected() {
        let csv = "id,title,milestone,scope,size,priority,description\na,b\n";
        let err = from_csv(&path(), csv).unwrap_err();
        assert!(err.to_string().contains("record 2"));
    }

    #[test]
    fn unterminated_quote_is_rejected() {
        let csv = "id,title,milestone,scope,size,priority,description\n,\"open,,,,,\n";
        let err = from_csv(&path(), csv).unwrap_err();
        assert!(err.to_string().contains("unterminated"));
    }

    #[test]
    fn garbage_after_closing_quote_is_rejected() {
        let csv = "id,title,milestone,scope,size,priority,description\n,\"a\"b,,,,,\n";
        let err = from_csv(&path(), csv).unwrap_err();
        assert!(err.to_string().contains("after closing quote"));
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let csv = "id,title,milestone,scope,size,priority,description\r\n,Title,,,,,d\r\n";
        let parsed = from_csv(&path(), csv).expect("parse");
        assert_eq!(parsed[0].title, "Title");
        assert_eq!(parsed[0].description, "d");
    }
}
