//! Error types for node-schema
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Type conflicts found while merging examples are not errors: they are
//! collected by the [`ConflictTracker`](crate::schema::ConflictTracker) and
//! reported once a build pass ends.

use thiserror::Error;

/// The main error type for node-schema
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Invalid type reference '{reference}': {message}")]
    InvalidTypeRef { reference: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Record Store Errors
    // ============================================================================
    #[error("Duplicate record id: {id}")]
    DuplicateRecord { id: String },

    // ============================================================================
    // Inference Errors
    // ============================================================================
    #[error("Could not infer a type for '{selector}': {message}")]
    CannotInferType { selector: String, message: String },

    #[error("Could not resolve link '{selector}' on kind '{kind}': {message}")]
    UnresolvedLink {
        kind: String,
        selector: String,
        message: String,
    },

    #[error("Couldn't find a matching record kind '{target}' for mapping '{selector}'")]
    MappingTargetNotFound { selector: String, target: String },

    #[error("Empty schema: {message}")]
    EmptySchema { message: String },

    #[error("Unknown declared type: {name}")]
    UnknownDeclaredType { name: String },

    #[error("Declared type '{name}' refers to itself")]
    RecursiveDeclaredType { name: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid type reference error
    pub fn invalid_type_ref(reference: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTypeRef {
            reference: reference.into(),
            message: message.into(),
        }
    }

    /// Create a "cannot infer type" error
    pub fn cannot_infer(selector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CannotInferType {
            selector: selector.into(),
            message: message.into(),
        }
    }

    /// Create an unresolved link error
    pub fn unresolved_link(
        kind: impl Into<String>,
        selector: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::UnresolvedLink {
            kind: kind.into(),
            selector: selector.into(),
            message: message.into(),
        }
    }

    /// Create a mapping target error
    pub fn mapping_target(selector: impl Into<String>, target: impl Into<String>) -> Self {
        Self::MappingTargetNotFound {
            selector: selector.into(),
            target: target.into(),
        }
    }

    /// Create an empty schema error
    pub fn empty_schema(message: impl Into<String>) -> Self {
        Self::EmptySchema {
            message: message.into(),
        }
    }

    /// Record kind this error is scoped to, if the pass may go on without it.
    ///
    /// Only unresolved links are scoped to a kind; every other error aborts
    /// the whole build pass.
    pub fn skippable_kind(&self) -> Option<&str> {
        match self {
            Error::UnresolvedLink { kind, .. } => Some(kind),
            _ => None,
        }
    }

    /// Check if this error is scoped to a single record kind
    pub fn is_kind_scoped(&self) -> bool {
        self.skippable_kind().is_some()
    }
}

/// Result type alias for node-schema
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::mapping_target("MarkdownRemark.frontmatter.author", "AuthorYaml");
        assert_eq!(
            err.to_string(),
            "Couldn't find a matching record kind 'AuthorYaml' for mapping 'MarkdownRemark.frontmatter.author'"
        );

        let err = Error::unresolved_link("Post", "author___NODE", "no record with id \"x\"");
        assert_eq!(
            err.to_string(),
            "Could not resolve link 'author___NODE' on kind 'Post': no record with id \"x\""
        );
    }

    #[test]
    fn test_kind_scoped() {
        assert!(Error::unresolved_link("Post", "a", "b").is_kind_scoped());
        assert_eq!(
            Error::unresolved_link("Post", "a", "b").skippable_kind(),
            Some("Post")
        );

        assert!(!Error::mapping_target("Post.a", "Author").is_kind_scoped());
        assert!(!Error::empty_schema("nothing").is_kind_scoped());
        assert!(!Error::cannot_infer("a", "b").is_kind_scoped());
        assert!(!Error::config("test").is_kind_scoped());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
