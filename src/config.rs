//! Pass configuration.
//!
//! Every setting has a default, so a configuration file only needs to list what it
//! changes:
//!
//! ```yaml
//! envelope_types: [ResponseEntity, Json]
//! report_file_name: endpoints.txt
//! ```

use crate::declaration::{is_qualified, simple_name_of};
use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;
use std::path::Path;

/// Settings for a resolution pass.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompassConfig {
    /// Generic wrapper types whose single type argument is the actual payload
    pub envelope_types: Vec<String>,
    /// Names of the universal top type; as a type argument it means "no argument",
    /// as a superclass it ends the inheritance walk
    pub top_types: Vec<String>,
    /// File name of the report inside the output directory
    pub report_file_name: String,
}

impl Default for CompassConfig {
    fn default() -> Self {
        Self {
            envelope_types: ["ResponseEntity", "HttpEntity", "RequestEntity", "Json"]
                .into_iter()
                .map(String::from)
                .collect(),
            top_types: ["_", "Object", "java.lang.Object"]
                .into_iter()
                .map(String::from)
                .collect(),
            report_file_name: "routes".to_string(),
        }
    }
}

impl CompassConfig {
    /// Loads a configuration file; `.json` files are read as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading configuration: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration: {}", path.display()))?;

        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("Invalid JSON configuration: {}", path.display()))?,
            _ => serde_yaml::from_str(&content)
                .with_context(|| format!("Invalid YAML configuration: {}", path.display()))?,
        };

        debug!("Configuration: {:?}", config);
        Ok(config)
    }

    pub fn is_envelope(&self, name: &str) -> bool {
        matches_any(&self.envelope_types, name)
    }

    pub fn is_top_type(&self, name: &str) -> bool {
        matches_any(&self.top_types, name)
    }
}

/// Exact match, or a match of `name`'s simple name against an unqualified entry.
fn matches_any(entries: &[String], name: &str) -> bool {
    let simple = simple_name_of(name);
    entries
        .iter()
        .any(|entry| entry == name || (!is_qualified(entry) && entry == simple))
}
