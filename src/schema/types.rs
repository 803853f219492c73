//! Schema types
//!
//! The type graph produced by a build pass. Object and list types are
//! shared through the [`TypeRegistry`](super::TypeRegistry), so two fields
//! inferring the same named type hold the same [`TypeRef`].

use crate::types::Record;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// Shared handle to a built type
pub type TypeRef = Arc<TypeNode>;

/// Built-in scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ScalarKind {
    Boolean,
    Int,
    Float,
    String,
    Date,
}

impl ScalarKind {
    pub const ALL: [ScalarKind; 5] = [
        ScalarKind::Boolean,
        ScalarKind::Int,
        ScalarKind::Float,
        ScalarKind::String,
        ScalarKind::Date,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Boolean => "Boolean",
            ScalarKind::Int => "Int",
            ScalarKind::Float => "Float",
            ScalarKind::String => "String",
            ScalarKind::Date => "Date",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A node of the type graph
#[derive(Debug, Clone, PartialEq)]
pub enum TypeNode {
    Scalar(ScalarKind),
    List(TypeRef),
    Object(ObjectType),
    /// Link to the type of a record kind, by name
    Link(String),
    /// Link to one of several record kinds
    UnionLink(UnionType),
}

impl TypeNode {
    /// Registry name: `String`, `[Post]`, `MarkdownRemarkFrontmatter`...
    pub fn name(&self) -> String {
        match self {
            TypeNode::Scalar(kind) => kind.name().to_string(),
            TypeNode::List(item) => format!("[{}]", item.name()),
            TypeNode::Object(object) => object.name.clone(),
            TypeNode::Link(target) => target.clone(),
            TypeNode::UnionLink(union) => union.name.clone(),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, TypeNode::List(_))
    }

    pub fn as_object(&self) -> Option<&ObjectType> {
        match self {
            TypeNode::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_union(&self) -> Option<&UnionType> {
        match self {
            TypeNode::UnionLink(union) => Some(union),
            _ => None,
        }
    }

    /// Element type of a list
    pub fn item(&self) -> Option<&TypeRef> {
        match self {
            TypeNode::List(item) => Some(item),
            _ => None,
        }
    }

    /// Type under all list wrappers
    pub fn innermost(&self) -> &TypeNode {
        match self {
            TypeNode::List(item) => item.innermost(),
            other => other,
        }
    }

    /// True when the innermost type links to records
    pub fn is_link(&self) -> bool {
        matches!(
            self.innermost(),
            TypeNode::Link(_) | TypeNode::UnionLink(_)
        )
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for TypeNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(tag = "kind", rename_all = "snake_case")]
        enum View<'a> {
            Scalar {
                name: &'static str,
            },
            List {
                of: String,
            },
            Object {
                name: &'a str,
                fields: &'a BTreeMap<String, Field>,
            },
            Link {
                target: &'a str,
            },
            Union {
                name: &'a str,
                members: &'a BTreeSet<String>,
            },
        }

        let view = match self {
            TypeNode::Scalar(kind) => View::Scalar { name: kind.name() },
            TypeNode::List(item) => View::List { of: item.name() },
            TypeNode::Object(object) => View::Object {
                name: &object.name,
                fields: &object.fields,
            },
            TypeNode::Link(target) => View::Link { target },
            TypeNode::UnionLink(union) => View::Union {
                name: &union.name,
                members: &union.members,
            },
        };
        view.serialize(serializer)
    }
}

/// Named object type
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectType {
    pub name: String,
    pub fields: BTreeMap<String, Field>,
}

impl ObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }
}

/// Union over the types of several record kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionType {
    pub name: String,
    pub members: BTreeSet<String>,
}

impl UnionType {
    /// Member type of a resolved record, dispatched on its kind
    pub fn resolve_type(&self, record: &Record) -> Option<&str> {
        self.members.get(record.kind.as_str()).map(String::as_str)
    }
}

/// Where a field's value comes from at query time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum FieldSource {
    /// Plain value stored under `key`
    Value { key: String },
    /// Record id (or value of field `by`) stored under `key`
    Link { key: String, by: Option<String> },
    /// Record id of kind `kind`, from a declared mapping
    Mapping { key: String, kind: String },
    /// Path relative to the owning file record
    File { key: String },
}

impl FieldSource {
    pub fn value(key: impl Into<String>) -> Self {
        FieldSource::Value { key: key.into() }
    }

    /// Raw record key holding the field
    pub fn key(&self) -> &str {
        match self {
            FieldSource::Value { key }
            | FieldSource::Link { key, .. }
            | FieldSource::Mapping { key, .. }
            | FieldSource::File { key } => key,
        }
    }
}

/// A field of an object type
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub ty: TypeRef,
    pub source: FieldSource,
}

impl Field {
    pub fn new(ty: TypeRef, source: FieldSource) -> Self {
        Self { ty, source }
    }

    /// Field of a declared type; declared record kinds are linked by id
    pub fn declared(key: impl Into<String>, ty: TypeRef) -> Self {
        let key = key.into();
        let source = if ty.is_link() {
            FieldSource::Link { key, by: None }
        } else {
            FieldSource::Value { key }
        };
        Self { ty, source }
    }

    /// Type name as printed in the schema
    pub fn type_name(&self) -> String {
        self.ty.name()
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct View<'a> {
            #[serde(rename = "type")]
            ty: String,
            #[serde(flatten)]
            source: &'a FieldSource,
        }

        View {
            ty: self.ty.name(),
            source: &self.source,
        }
        .serialize(serializer)
    }
}
