//! Rendering of synthesized definitions as YAML or JSON documents.
//!
//! Both formats share one document shape:
//!
//! ```yaml
//! definitions:
//!   pet:
//!     type: object
//!     ...
//! ```

use crate::schema::Definitions;
use anyhow::{Context, Result};
use log::debug;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// The top-level output document.
#[derive(Debug, Serialize)]
pub struct DefinitionsDocument<'a> {
    pub definitions: &'a Definitions,
}

impl<'a> DefinitionsDocument<'a> {
    pub fn new(definitions: &'a Definitions) -> Self {
        Self { definitions }
    }
}

/// Serializes definitions to YAML.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml(definitions: &Definitions) -> Result<String> {
    debug!("Serializing {} definitions to YAML", definitions.len());
    serde_yaml::to_string(&DefinitionsDocument::new(definitions))
        .context("Failed to serialize definitions to YAML")
}

/// Serializes definitions to pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json(definitions: &Definitions) -> Result<String> {
    debug!("Serializing {} definitions to JSON", definitions.len());
    serde_json::to_string_pretty(&DefinitionsDocument::new(definitions))
        .context("Failed to serialize definitions to JSON")
}

/// Writes `content` to `path`, creating parent directories as needed and
/// replacing any existing file.
///
/// # Errors
///
/// Returns an error if a directory cannot be created or the file cannot be
/// written.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;
    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
