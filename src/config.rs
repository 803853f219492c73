//! Configuration types for a schema build
//!
//! This module contains the configuration structures driving inference:
//! link conventions, declared link mappings and declared field types.
//! Everything can be loaded from YAML (see [`crate::loader`]).

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

static TYPE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[_A-Za-z][_0-9A-Za-z]*$").unwrap());

// ============================================================================
// Declared Types
// ============================================================================

/// A declared field type: `Name`, `[Name]`, `[[Name]]`...
///
/// A trailing `!` (non-null marker) is accepted and discarded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DeclaredTypeRef {
    Named(String),
    List(Box<DeclaredTypeRef>),
}

impl DeclaredTypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        DeclaredTypeRef::Named(name.into())
    }

    pub fn list(inner: DeclaredTypeRef) -> Self {
        DeclaredTypeRef::List(Box::new(inner))
    }

    /// Innermost named type
    pub fn base_name(&self) -> &str {
        match self {
            DeclaredTypeRef::Named(name) => name,
            DeclaredTypeRef::List(inner) => inner.base_name(),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, DeclaredTypeRef::List(_))
    }
}

impl FromStr for DeclaredTypeRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let trimmed = trimmed.strip_suffix('!').unwrap_or(trimmed).trim();

        if let Some(inner) = trimmed.strip_prefix('[') {
            let inner = inner
                .strip_suffix(']')
                .ok_or_else(|| Error::invalid_type_ref(s, "unbalanced brackets"))?;
            return Ok(DeclaredTypeRef::list(inner.parse()?));
        }

        if TYPE_NAME.is_match(trimmed) {
            Ok(DeclaredTypeRef::Named(trimmed.to_string()))
        } else {
            Err(Error::invalid_type_ref(s, "not a valid type name"))
        }
    }
}

impl TryFrom<String> for DeclaredTypeRef {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<DeclaredTypeRef> for String {
    fn from(r: DeclaredTypeRef) -> Self {
        r.to_string()
    }
}

impl fmt::Display for DeclaredTypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredTypeRef::Named(name) => write!(f, "{name}"),
            DeclaredTypeRef::List(inner) => write!(f, "[{inner}]"),
        }
    }
}

/// Declared fields per type name (record kinds and nested object types)
pub type DeclaredTypes = BTreeMap<String, BTreeMap<String, DeclaredTypeRef>>;

// ============================================================================
// Link Policy
// ============================================================================

/// What a build pass does when a kind has an unresolvable link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedLinkPolicy {
    /// Fail the whole pass
    #[default]
    Abort,
    /// Drop the offending kind and rebuild without it
    SkipKind,
}

// ============================================================================
// Inference Config
// ============================================================================

/// Complete inference configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Field-name segment marking a link (`author___NODE`)
    #[serde(default = "default_link_marker")]
    pub link_marker: String,

    /// Record kind holding files
    #[serde(default = "default_file_kind")]
    pub file_kind: String,

    /// Directory field of file records
    #[serde(default = "default_file_dir_field")]
    pub file_dir_field: String,

    /// Absolute path field of file records
    #[serde(default = "default_file_path_field")]
    pub file_path_field: String,

    /// Declared links: `Kind.field.path` -> target kind.
    ///
    /// Fields of objects inside lists are keyed without brackets:
    /// `Post.authors.ref`, not `Post.authors[].ref`.
    #[serde(default)]
    pub mapping: BTreeMap<String, String>,

    /// Declared field types per type name
    #[serde(default)]
    pub declared_types: DeclaredTypes,

    /// Infer `Date` for date-looking strings
    #[serde(default = "default_true")]
    pub detect_dates: bool,

    /// Infer `File` links for relative paths pointing at file records
    #[serde(default = "default_true")]
    pub detect_files: bool,

    /// Bound on parent walks when looking for a root record
    #[serde(default = "default_max_ancestor_depth")]
    pub max_ancestor_depth: usize,

    /// Behaviour on unresolvable links
    #[serde(default)]
    pub unresolved_links: UnresolvedLinkPolicy,

    /// Top-level keys never inferred
    #[serde(default = "default_exclude_fields")]
    pub exclude_fields: Vec<String>,
}

fn default_link_marker() -> String {
    "___NODE".to_string()
}

fn default_file_kind() -> String {
    "File".to_string()
}

fn default_file_dir_field() -> String {
    "dir".to_string()
}

fn default_file_path_field() -> String {
    "absolutePath".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_ancestor_depth() -> usize {
    100
}

fn default_exclude_fields() -> Vec<String> {
    vec!["id".to_string(), "parent".to_string(), "children".to_string()]
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            link_marker: default_link_marker(),
            file_kind: default_file_kind(),
            file_dir_field: default_file_dir_field(),
            file_path_field: default_file_path_field(),
            mapping: BTreeMap::new(),
            declared_types: DeclaredTypes::new(),
            detect_dates: true,
            detect_files: true,
            max_ancestor_depth: default_max_ancestor_depth(),
            unresolved_links: UnresolvedLinkPolicy::default(),
            exclude_fields: default_exclude_fields(),
        }
    }
}

impl InferenceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a link mapping (`Kind.field` -> target kind)
    #[must_use]
    pub fn with_mapping(mut self, selector: impl Into<String>, target: impl Into<String>) -> Self {
        self.mapping.insert(selector.into(), target.into());
        self
    }

    /// Declare a field type
    #[must_use]
    pub fn with_declared_type(
        mut self,
        type_name: impl Into<String>,
        field: impl Into<String>,
        declared: DeclaredTypeRef,
    ) -> Self {
        self.declared_types
            .entry(type_name.into())
            .or_default()
            .insert(field.into(), declared);
        self
    }

    /// Set the unresolved link policy
    #[must_use]
    pub fn with_unresolved_links(mut self, policy: UnresolvedLinkPolicy) -> Self {
        self.unresolved_links = policy;
        self
    }

    /// Declared fields of a type, if any
    pub fn declared_fields(&self, type_name: &str) -> Option<&BTreeMap<String, DeclaredTypeRef>> {
        self.declared_types.get(type_name)
    }

    /// Check the configuration for values inference cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.link_marker.is_empty() {
            return Err(Error::invalid_value("link_marker", "cannot be empty"));
        }
        if self.file_kind.is_empty() {
            return Err(Error::invalid_value("file_kind", "cannot be empty"));
        }

        for (selector, target) in &self.mapping {
            if !selector.contains('.') {
                return Err(Error::invalid_value(
                    "mapping",
                    format!("'{selector}' must be qualified as Kind.field"),
                ));
            }
            if target.is_empty() {
                return Err(Error::invalid_value(
                    "mapping",
                    format!("'{selector}' has an empty target kind"),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("String", DeclaredTypeRef::named("String") ; "named")]
    #[test_case("[String]", DeclaredTypeRef::list(DeclaredTypeRef::named("String")) ; "list")]
    #[test_case("[Int!]!", DeclaredTypeRef::list(DeclaredTypeRef::named("Int")) ; "non null markers")]
    #[test_case(
        "[[Author]]",
        DeclaredTypeRef::list(DeclaredTypeRef::list(DeclaredTypeRef::named("Author"))) ;
        "nested list"
    )]
    fn test_parse_type_ref(input: &str, expected: DeclaredTypeRef) {
        assert_eq!(input.parse::<DeclaredTypeRef>().unwrap(), expected);
    }

    #[test_case("[String" ; "unbalanced")]
    #[test_case("my type" ; "space")]
    #[test_case("" ; "empty")]
    fn test_parse_invalid_type_ref(input: &str) {
        assert!(input.parse::<DeclaredTypeRef>().is_err());
    }

    #[test]
    fn test_type_ref_display() {
        let r: DeclaredTypeRef = "[[Author]!]".parse().unwrap();
        assert_eq!(r.to_string(), "[[Author]]");
        assert_eq!(r.base_name(), "Author");
        assert!(r.is_list());
    }

    #[test]
    fn test_defaults() {
        let config = InferenceConfig::default();
        assert_eq!(config.link_marker, "___NODE");
        assert_eq!(config.file_kind, "File");
        assert_eq!(config.max_ancestor_depth, 100);
        assert_eq!(config.unresolved_links, UnresolvedLinkPolicy::Abort);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unqualified_mapping() {
        let config = InferenceConfig::new().with_mapping("author", "AuthorYaml");
        assert!(config.validate().is_err());

        let config = InferenceConfig::new().with_mapping("Post.author", "AuthorYaml");
        assert!(config.validate().is_ok());
    }
}
