//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Schema inference for record collections
#[derive(Parser, Debug)]
#[command(name = "node-schema")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Inference configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Infer the schema of a record file
    Infer {
        /// Records file (JSON array or NDJSON)
        #[arg(short, long)]
        records: PathBuf,
    },

    /// Report conflicting field types
    Conflicts {
        /// Records file (JSON array or NDJSON)
        #[arg(short, long)]
        records: PathBuf,
    },

    /// Validate the inference configuration
    Validate,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON
    Json,
    /// Indented JSON
    Pretty,
    /// Schema definition language (infer only)
    Sdl,
}
