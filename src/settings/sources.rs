//! Override sources: TOML text and files as settings-override documents.

use crate::error::SettingsError;
use serde_json::Value;
use std::path::Path;

/// Parse TOML text into a settings-override tree.
pub fn overrides_from_toml_str(text: &str) -> Result<Value, SettingsError> {
    let doc: toml::Value = toml::from_str(text)
        .map_err(|e| SettingsError::Source(format!("TOML parse error: {}", e)))?;
    serde_json::to_value(doc).map_err(|e| SettingsError::Source(e.to_string()))
}

/// Read and parse a TOML file into a settings-override tree.
pub fn overrides_from_toml_file(path: &Path) -> Result<Value, SettingsError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| SettingsError::Source(format!("Failed to read {}: {}", path.display(), e)))?;
    overrides_from_toml_str(&text)
}
