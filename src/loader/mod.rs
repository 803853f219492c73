//! Loader module
//!
//! Read inference configuration and record collections from disk.
//!
//! # Overview
//!
//! The loader module provides:
//! - `load_config` - YAML (or JSON) inference configuration, validated
//! - `load_records` - records as a JSON array or newline-delimited JSON
//! - `load_store` - records ingested into a [`MemoryStore`](crate::store::MemoryStore)

mod parser;

pub use parser::{load_config, load_config_from_str, load_records, load_records_from_str, load_store};

#[cfg(test)]
mod tests;
