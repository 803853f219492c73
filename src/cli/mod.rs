//! CLI module
//!
//! Command-line interface for schema inference.
//!
//! # Commands
//!
//! - `infer` - Build the schema of a record file
//! - `conflicts` - Report conflicting field types without building types
//! - `validate` - Check an inference configuration

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
