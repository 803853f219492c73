//! Parsers for configuration and record files
//!
//! Configuration is YAML; JSON files parse as well since JSON is valid YAML.
//! Records are either one JSON array or one JSON object per line.

use crate::config::InferenceConfig;
use crate::error::{Error, Result};
use crate::store::MemoryStore;
use crate::types::Record;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read a file, mapping a missing file to [`Error::FileNotFound`]
fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::config(format!("Failed to read '{}': {e}", path.display()))
        }
    })
}

/// Load an inference configuration file
///
/// # Examples
///
/// ```ignore
/// let config = load_config("inference.yaml")?;
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<InferenceConfig> {
    let path = path.as_ref();
    let content = read_file(path)?;
    let config = load_config_from_str(&content)?;
    debug!(path = %path.display(), "loaded inference config");
    Ok(config)
}

/// Load an inference configuration from a YAML string
pub fn load_config_from_str(yaml: &str) -> Result<InferenceConfig> {
    // An empty document means "all defaults"
    if yaml.trim().is_empty() {
        return Ok(InferenceConfig::default());
    }

    let config: InferenceConfig = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse inference config: {e}")))?;

    config.validate()?;
    Ok(config)
}

/// Load records from a JSON array or NDJSON file
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let content = read_file(path)?;
    let records = load_records_from_str(&content)?;
    debug!(path = %path.display(), records = records.len(), "loaded records");
    Ok(records)
}

/// Parse records from a JSON array or from one JSON object per line
pub fn load_records_from_str(input: &str) -> Result<Vec<Record>> {
    let trimmed = input.trim_start();

    let records: Vec<Record> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed)
            .map_err(|e| Error::config(format!("Invalid records JSON: {e}")))?
    } else {
        input
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                serde_json::from_str(line)
                    .map_err(|e| Error::config(format!("Invalid record on line {}: {e}", n + 1)))
            })
            .collect::<Result<_>>()?
    };

    for record in &records {
        validate_record(record)?;
    }
    Ok(records)
}

/// Load records and ingest them into an in-memory store
pub fn load_store(path: impl AsRef<Path>) -> Result<MemoryStore> {
    MemoryStore::from_records(load_records(path)?)
}

fn validate_record(record: &Record) -> Result<()> {
    if record.id.is_empty() {
        return Err(Error::config("Record id cannot be empty"));
    }
    if record.kind.is_empty() {
        return Err(Error::config(format!(
            "Record '{}' has an empty kind",
            record.id
        )));
    }
    Ok(())
}
