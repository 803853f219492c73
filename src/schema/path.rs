//! Field paths
//!
//! A [`FieldPath`] addresses a value inside the records of one kind, in the
//! `a.b[].c` notation used for conflict selectors and declared mappings.

use std::fmt;

/// Dot/bracket selector of a field, relative to a record kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
    kind: Option<String>,
    selector: String,
}

impl FieldPath {
    /// Root path of a record kind
    pub fn root(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            selector: String::new(),
        }
    }

    /// Root path not bound to a kind
    pub fn detached() -> Self {
        Self {
            kind: None,
            selector: String::new(),
        }
    }

    /// Path of a named child field
    #[must_use]
    pub fn child(&self, key: &str) -> Self {
        let selector = if self.selector.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.selector, key)
        };
        Self {
            kind: self.kind.clone(),
            selector,
        }
    }

    /// Path of the elements of a list field
    #[must_use]
    pub fn elements(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            selector: format!("{}[]", self.selector),
        }
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// Selector relative to the kind (`frontmatter.tags[]`)
    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn is_root(&self) -> bool {
        self.selector.is_empty()
    }

    /// Selector prefixed with the kind (`MarkdownRemark.frontmatter.author`)
    pub fn qualified(&self) -> String {
        match (&self.kind, self.selector.is_empty()) {
            (Some(kind), true) => kind.clone(),
            (Some(kind), false) => format!("{kind}.{}", self.selector),
            (None, _) => self.selector.clone(),
        }
    }

    /// Key of a declared mapping for this path (`Kind.a.b`); list brackets
    /// are dropped so fields of list elements map like plain nested fields
    pub fn mapping_key(&self) -> String {
        let selector = self.segments().collect::<Vec<_>>().join(".");
        match (&self.kind, selector.is_empty()) {
            (Some(kind), true) => kind.clone(),
            (Some(kind), false) => format!("{kind}.{selector}"),
            (None, _) => selector,
        }
    }

    /// Last field key, without list brackets
    pub fn leaf(&self) -> &str {
        let trimmed = self.selector.trim_end_matches("[]");
        trimmed.rsplit('.').next().unwrap_or(trimmed)
    }

    /// Field keys from the root, without list brackets
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.selector
            .split('.')
            .map(|s| s.trim_end_matches("[]"))
            .filter(|s| !s.is_empty())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_selector() {
        let path = FieldPath::root("MarkdownRemark")
            .child("frontmatter")
            .child("gallery")
            .elements()
            .child("image");

        assert_eq!(path.selector(), "frontmatter.gallery[].image");
        assert_eq!(path.qualified(), "MarkdownRemark.frontmatter.gallery[].image");
        assert_eq!(path.leaf(), "image");
        assert_eq!(path.mapping_key(), "MarkdownRemark.frontmatter.gallery.image");
        assert_eq!(
            path.segments().collect::<Vec<_>>(),
            vec!["frontmatter", "gallery", "image"]
        );
    }

    #[test]
    fn test_leaf_of_list() {
        let path = FieldPath::root("Post").child("tags").elements();
        assert_eq!(path.leaf(), "tags");
        assert!(!path.is_root());
        assert!(FieldPath::root("Post").is_root());
    }

    #[test]
    fn test_detached_path() {
        let path = FieldPath::detached().child("f");
        assert_eq!(path.kind(), None);
        assert_eq!(path.qualified(), "f");
    }
}
