//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::InferenceConfig;
use crate::error::{Result, ResultExt};
use crate::loader::{load_config, load_store};
use crate::schema::SchemaBuilder;
use crate::types::JsonValue;
use serde_json::json;
use std::path::Path;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command, printing its output
    pub fn run(&self) -> Result<()> {
        let output = self.execute()?;
        println!("{output}");
        Ok(())
    }

    /// Run the CLI command and return its output
    pub fn execute(&self) -> Result<String> {
        match &self.cli.command {
            Commands::Infer { records } => self.infer(records),
            Commands::Conflicts { records } => self.conflicts(records),
            Commands::Validate => self.validate(),
        }
    }

    /// Load configuration, defaulting when no file is given
    fn load_config(&self) -> Result<InferenceConfig> {
        match &self.cli.config {
            Some(path) => load_config(path),
            None => Ok(InferenceConfig::default()),
        }
    }

    fn infer(&self, records: &Path) -> Result<String> {
        let config = self.load_config()?;
        let store = load_store(records)
            .with_context(|| format!("Failed to load records from '{}'", records.display()))?;
        info!(records = store.len(), "inferring schema");

        let schema = SchemaBuilder::new(&store, config).build()?;
        match self.cli.format {
            OutputFormat::Sdl => Ok(schema.to_sdl()),
            _ => self.render(&serde_json::to_value(&schema)?),
        }
    }

    fn conflicts(&self, records: &Path) -> Result<String> {
        let config = self.load_config()?;
        let store = load_store(records)
            .with_context(|| format!("Failed to load records from '{}'", records.display()))?;

        let conflicts = SchemaBuilder::new(&store, config).collect_conflicts()?;
        if self.cli.format == OutputFormat::Sdl {
            let lines: Vec<String> = conflicts.iter().map(ToString::to_string).collect();
            return Ok(lines.join("\n"));
        }
        self.render(&json!({ "conflicts": conflicts }))
    }

    fn validate(&self) -> Result<String> {
        let config = self.load_config()?;
        config.validate()?;

        self.render(&json!({
            "valid": true,
            "link_marker": config.link_marker,
            "mappings": config.mapping.len(),
            "declared_types": config.declared_types.len(),
        }))
    }

    fn render(&self, msg: &JsonValue) -> Result<String> {
        let rendered = match self.cli.format {
            OutputFormat::Pretty => serde_json::to_string_pretty(msg)?,
            OutputFormat::Json | OutputFormat::Sdl => serde_json::to_string(msg)?,
        };
        Ok(rendered)
    }
}
