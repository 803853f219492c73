// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]

//! # node-schema
//!
//! Schema inference for heterogeneous record collections.
//!
//! Records are grouped by kind. All records of a kind are merged into one
//! example per field, fields whose types disagree are reported as conflicts
//! and left out, and the rest become a graph of named types: scalars,
//! lists, nested objects, and links between record kinds.
//!
//! ## Features
//!
//! - **Example Merging**: Order-independent fold of every record of a kind
//! - **Conflict Reports**: Every type seen at a conflicting field, with a sample and its record
//! - **Links**: `field___NODE` naming, declared mappings, unions over several kinds
//! - **Files**: Relative paths resolved against the owning file record
//! - **Declared Types**: Override or extend inferred fields from configuration
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use node_schema::{build_schema, InferenceConfig, MemoryStore, Record, Result};
//! use serde_json::json;
//!
//! fn main() -> Result<()> {
//!     let store = MemoryStore::from_records([
//!         Record::from_json("1", "Post", json!({"title": "Hello", "author___NODE": "2"})),
//!         Record::from_json("2", "Author", json!({"name": "Jo"})),
//!     ])?;
//!
//!     let schema = build_schema(&store, InferenceConfig::default())?;
//!     println!("{}", schema.to_sdl());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐   ┌────────────────┐   ┌──────────────┐   ┌──────────────┐
//! │  RecordStore  │──▶│ ExampleMerger  │──▶│ TypeBuilder  │──▶│ TypeRegistry │
//! │ (by id, kind) │   │       │        │   │ links, files │   │ named types  │
//! └───────────────┘   │ ConflictTracker│   │ dates, lists │   └──────┬───────┘
//!                     └────────────────┘   └──────────────┘          │
//!                                                              Schema + report
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Record data model and common type aliases
pub mod types;

/// Inference configuration
pub mod config;

/// Record storage
pub mod store;

/// Example merging, conflict tracking and type building
pub mod schema;

/// Configuration and record file loading
pub mod loader;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{DeclaredTypeRef, InferenceConfig, UnresolvedLinkPolicy};
pub use loader::{load_config, load_records, load_store};
pub use schema::{build_schema, ConflictEntry, Schema, SchemaBuilder};
pub use store::{MemoryStore, RecordStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
