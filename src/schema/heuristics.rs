//! Value heuristics and naming helpers
//!
//! Pure predicates over example values (date-like, file-like) and the
//! functions turning raw keys and paths into schema names.

use super::path::FieldPath;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

static DATE_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").unwrap());

static RELATIVE_FILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^/\\:*?<>|#\s][^\\:*?<>|#]*\.([A-Za-z0-9]*[A-Za-z][A-Za-z0-9]*)$").unwrap()
});

static NON_KEY_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").unwrap());

/// Extensions that usually end a domain name rather than a file
const DOMAIN_EXTENSIONS: &[&str] = &["com", "org", "net", "io", "dev", "app", "exe"];

/// Separator between the link marker and an alternate key (`a___NODE___slug`)
pub const ALTERNATE_KEY_SEPARATOR: &str = "___";

// ============================================================================
// Value heuristics
// ============================================================================

/// Check if a string is an ISO 8601 date or timestamp
pub fn is_date_like(s: &str) -> bool {
    if !DATE_PREFIX.is_match(s) {
        return false;
    }

    DateTime::parse_from_rfc3339(s).is_ok()
        || DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").is_ok()
        || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// Check if a string looks like a relative path to a file (`../img/a.png`)
pub fn looks_like_relative_file(s: &str) -> bool {
    if s.contains("://") || s.starts_with('/') {
        return false;
    }

    RELATIVE_FILE
        .captures(s)
        .and_then(|c| c.get(1))
        .is_some_and(|ext| !DOMAIN_EXTENSIONS.contains(&ext.as_str().to_ascii_lowercase().as_str()))
}

/// Join a relative path onto a directory, resolving `.` and `..`
pub fn join_path(dir: &str, relative: &str) -> String {
    let dir = dir.replace('\\', "/");
    let relative = relative.replace('\\', "/");

    let mut parts: Vec<&str> = Vec::new();
    for segment in dir.split('/').chain(relative.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }

    let joined = parts.join("/");
    if dir.starts_with('/') {
        format!("/{joined}")
    } else {
        joined
    }
}

// ============================================================================
// Link keys
// ============================================================================

/// A field key carrying the link marker: `author___NODE` or
/// `author___NODE___email`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkKey {
    /// Name the field is exposed under (`author`)
    pub field_name: String,
    /// Field of the target record matched instead of its id
    pub by: Option<String>,
}

impl LinkKey {
    pub fn parse(key: &str, marker: &str) -> Option<Self> {
        let pos = key.find(marker)?;
        let rest = &key[pos + marker.len()..];
        let by = rest
            .strip_prefix(ALTERNATE_KEY_SEPARATOR)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Some(Self {
            field_name: key[..pos].to_string(),
            by,
        })
    }
}

// ============================================================================
// Names
// ============================================================================

/// Make a raw key a valid field name.
///
/// Invalid characters become `_`, a leading digit gets a `_` prefix and the
/// reserved `__` prefix collapses to a single `_`.
pub fn create_key(key: &str) -> String {
    let replaced = NON_KEY_CHARS.replace_all(key, "_").into_owned();

    if replaced.starts_with("__") {
        return format!("_{}", replaced.trim_start_matches('_'));
    }
    if replaced.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("_{replaced}");
    }
    if replaced.is_empty() {
        return "_".to_string();
    }
    replaced
}

/// PascalCase a raw key: `cover_image` -> `CoverImage`
pub fn pascal_case(key: &str) -> String {
    key.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Base name of the object type inferred at `path`.
///
/// `MarkdownRemark` + `frontmatter.author___NODE` -> `MarkdownRemarkFrontmatterAuthor`.
/// The registry makes the final name unique.
pub fn object_type_name(path: &FieldPath, link_marker: &str) -> String {
    let mut name = path.kind().map(create_key).unwrap_or_default();
    for segment in path.segments() {
        let segment = segment.split(link_marker).next().unwrap_or(segment);
        name.push_str(&pascal_case(segment));
    }
    if name.is_empty() {
        "Object".to_string()
    } else {
        create_key(&name)
    }
}

/// Deterministic name of the union over `kinds` (already sorted)
pub fn union_type_name<'a>(kinds: impl IntoIterator<Item = &'a str>) -> String {
    let members: Vec<&str> = kinds.into_iter().collect();
    format!("Union_{}", members.join("__"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("2024-01-15", true ; "date")]
    #[test_case("2024-01-15T10:30:00Z", true ; "rfc3339")]
    #[test_case("2024-01-15T10:30:00.123+02:00", true ; "fraction and offset")]
    #[test_case("2024-01-15T10:30:00", true ; "naive timestamp")]
    #[test_case("2024-01-15 10:30:00", true ; "space separated")]
    #[test_case("2024-13-45", false ; "impossible date")]
    #[test_case("hello", false ; "word")]
    #[test_case("2024", false ; "year only")]
    #[test_case("2024-01-15 and more", false ; "trailing text")]
    fn test_is_date_like(input: &str, expected: bool) {
        assert_eq!(is_date_like(input), expected);
    }

    #[test_case("image.png", true ; "plain file")]
    #[test_case("../images/cover.jpg", true ; "parent dir")]
    #[test_case("./docs/readme.md", true ; "current dir")]
    #[test_case("/etc/passwd.txt", false ; "absolute")]
    #[test_case("https://example.com/a.png", false ; "url")]
    #[test_case("example.com", false ; "domain")]
    #[test_case("1.5", false ; "number")]
    #[test_case("just words", false ; "no extension")]
    fn test_looks_like_relative_file(input: &str, expected: bool) {
        assert_eq!(looks_like_relative_file(input), expected);
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("/site/content/posts", "../images/a.png"), "/site/content/images/a.png");
        assert_eq!(join_path("/site/posts", "./a.png"), "/site/posts/a.png");
        assert_eq!(join_path("C:\\site\\posts", "a.png"), "C:/site/posts/a.png");
    }

    #[test]
    fn test_link_key() {
        assert_eq!(
            LinkKey::parse("author___NODE", "___NODE"),
            Some(LinkKey {
                field_name: "author".to_string(),
                by: None
            })
        );
        assert_eq!(
            LinkKey::parse("author___NODE___email", "___NODE"),
            Some(LinkKey {
                field_name: "author".to_string(),
                by: Some("email".to_string())
            })
        );
        assert_eq!(LinkKey::parse("author", "___NODE"), None);
    }

    #[test_case("title", "title" ; "unchanged")]
    #[test_case("cover-image", "cover_image" ; "dash")]
    #[test_case("2nd", "_2nd" ; "leading digit")]
    #[test_case("__typename", "_typename" ; "reserved prefix")]
    #[test_case("a.b c", "a_b_c" ; "dots and spaces")]
    fn test_create_key(input: &str, expected: &str) {
        assert_eq!(create_key(input), expected);
    }

    #[test]
    fn test_object_type_name() {
        let path = FieldPath::root("MarkdownRemark")
            .child("frontmatter")
            .child("cover_image")
            .elements();
        assert_eq!(
            object_type_name(&path, "___NODE"),
            "MarkdownRemarkFrontmatterCoverImage"
        );

        let path = FieldPath::root("Post").child("author___NODE");
        assert_eq!(object_type_name(&path, "___NODE"), "PostAuthor");
    }

    #[test]
    fn test_union_type_name() {
        assert_eq!(union_type_name(["Page", "Post"]), "Union_Page__Post");
    }
}
