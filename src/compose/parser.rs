//! Docker Compose file parser
//!
//! Existing compose files are kept as untyped YAML so that keys this crate
//! knows nothing about survive a parse/emit cycle untouched.

use crate::error::{ConvertError, Result};
use serde_yaml::{Mapping, Value};
use std::path::Path;

/// Compose file parser
pub struct ComposeParser;

impl ComposeParser {
    /// Parse compose file from path
    pub fn parse_file(path: &Path) -> Result<Value> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_str(&content)
    }

    /// Parse compose file from string
    pub fn parse_str(content: &str) -> Result<Value> {
        serde_yaml::from_str(content)
            .map_err(|e| ConvertError::Yaml(format!("Failed to parse YAML: {}", e)))
    }

    /// Borrow the non-empty `services` mapping of a parsed document
    pub fn services_mut(document: &mut Value) -> Result<&mut Mapping> {
        let services = document
            .as_mapping_mut()
            .and_then(|root| root.get_mut("services"))
            .ok_or_else(|| {
                ConvertError::InvalidComposeFormat("no services section found".to_string())
            })?;

        match services.as_mapping_mut() {
            Some(mapping) if !mapping.is_empty() => Ok(mapping),
            Some(_) | None => Err(ConvertError::InvalidComposeFormat(
                "services section is empty".to_string(),
            )),
        }
    }
}
