//! Schema inference module
//!
//! Infers a named type graph from the records of a store.
//!
//! # Features
//!
//! - **Example Merging**: Folds all records of a kind into one example per field
//! - **Conflict Tracking**: Reports fields whose types disagree across records
//! - **Type Building**: Links, declared mappings, files, dates, lists and nested objects
//! - **Type Registry**: Named, shared types with memoized lists and unions
//! - **Resolution**: Follows links, mappings and file paths at query time

mod builder;
mod conflict;
mod example;
mod heuristics;
mod merge;
mod pass;
mod path;
mod registry;
mod resolve;
mod types;

pub use builder::TypeBuilder;
pub use conflict::{log_conflicts, ConflictEntry, ConflictSample, ConflictTracker, ConflictType};
pub use example::{Example, ExampleKind};
pub use heuristics::{
    create_key, is_date_like, join_path, looks_like_relative_file, object_type_name, pascal_case,
    union_type_name, LinkKey,
};
pub use merge::ExampleMerger;
pub use pass::{build_schema, Schema, SchemaBuilder};
pub use path::FieldPath;
pub use registry::TypeRegistry;
pub use resolve::{Resolved, Resolver};
pub use types::{Field, FieldSource, ObjectType, ScalarKind, TypeNode, TypeRef, UnionType};
