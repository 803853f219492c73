//! Tests for the loader module

use super::*;
use crate::config::{DeclaredTypeRef, UnresolvedLinkPolicy};
use crate::error::Error;
use crate::types::Value;
use std::io::Write;
use tempfile::NamedTempFile;

// ============================================================================
// Config Loading Tests
// ============================================================================

#[test]
fn test_load_empty_config() {
    let config = load_config_from_str("").unwrap();
    assert_eq!(config.link_marker, "___NODE");
    assert!(config.mapping.is_empty());
}

#[test]
fn test_load_full_config() {
    let yaml = r#"
link_marker: ___LINK
file_kind: Asset
mapping:
  Post.author: Author
declared_types:
  Author:
    bio: String
    posts: "[Post]"
detect_dates: false
unresolved_links: skip_kind
"#;

    let config = load_config_from_str(yaml).unwrap();
    assert_eq!(config.link_marker, "___LINK");
    assert_eq!(config.file_kind, "Asset");
    assert_eq!(config.mapping["Post.author"], "Author");
    assert_eq!(
        config.declared_types["Author"]["posts"],
        DeclaredTypeRef::list(DeclaredTypeRef::named("Post"))
    );
    assert!(!config.detect_dates);
    assert!(config.detect_files);
    assert_eq!(config.unresolved_links, UnresolvedLinkPolicy::SkipKind);
}

#[test]
fn test_load_config_rejects_bad_mapping() {
    let yaml = r#"
mapping:
  author: Author
"#;
    let err = load_config_from_str(yaml).unwrap_err();
    assert!(matches!(err, Error::InvalidConfigValue { .. }));
}

#[test]
fn test_load_config_rejects_bad_type_ref() {
    let yaml = r#"
declared_types:
  Author:
    bio: "[String"
"#;
    assert!(load_config_from_str(yaml).is_err());
}

#[test]
fn test_load_config_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "file_kind: Asset").unwrap();

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.file_kind, "Asset");
}

#[test]
fn test_load_missing_file() {
    let err = load_config("/definitely/not/here.yaml").unwrap_err();
    assert!(matches!(err, Error::FileNotFound { .. }));
}

// ============================================================================
// Record Loading Tests
// ============================================================================

#[test]
fn test_load_records_json_array() {
    let input = r#"[
        {"id": "1", "kind": "Post", "fields": {"title": "Hello", "views": 3}},
        {"id": "2", "kind": "Post", "parent": "1"}
    ]"#;

    let records = load_records_from_str(input).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].str_field("title"), Some("Hello"));
    assert_eq!(records[0].field("views"), Some(&Value::Int(3)));
    assert_eq!(records[1].parent.as_deref(), Some("1"));
    assert!(records[1].fields.is_empty());
}

#[test]
fn test_load_records_ndjson() {
    let input = r#"
{"id": "1", "kind": "Post", "fields": {"title": "Hello"}}

{"id": "2", "kind": "Page", "fields": {"title": "About"}}
"#;

    let records = load_records_from_str(input).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].kind, "Page");
}

#[test]
fn test_load_records_reports_line() {
    let input = "{\"id\": \"1\", \"kind\": \"Post\"}\nnot json\n";
    let err = load_records_from_str(input).unwrap_err();
    assert!(err.to_string().contains("line 2"), "{err}");
}

#[test]
fn test_load_records_rejects_empty_kind() {
    let err = load_records_from_str(r#"[{"id": "1", "kind": ""}]"#).unwrap_err();
    assert!(err.to_string().contains("empty kind"));
}

#[test]
fn test_load_store_rejects_duplicates() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, r#"{{"id": "1", "kind": "Post"}}"#).unwrap();
    writeln!(file, r#"{{"id": "1", "kind": "Page"}}"#).unwrap();

    let err = load_store(file.path()).unwrap_err();
    assert!(matches!(err, Error::DuplicateRecord { .. }));
}
