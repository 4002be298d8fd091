//! Settings System
//!
//! The merged configuration document that governs logging, option
//! definitions, and help text. Defaults are a process-wide read-only
//! template; every construction deep-clones the template and merges the
//! caller's overrides into the copy under the rules in [`merge`].

use crate::error::SettingsError;
use crate::logging::LogMethodConfig;
use crate::options::OptionDefinition;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::OnceLock;

mod merge;
mod sources;

pub use merge::{merge, ValueKind};
pub use sources::{overrides_from_toml_file, overrides_from_toml_str};

/// Root settings document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Tool name: argv command name and help header
    #[serde(default = "default_name")]
    pub name: String,

    /// Tool description shown in the first help section
    #[serde(default)]
    pub description: String,

    /// Log method definitions, keyed by method name
    #[serde(default)]
    pub logging: BTreeMap<String, LogMethodConfig>,

    /// Option definitions consumed by the argument binder
    #[serde(default)]
    pub option_definitions: Vec<OptionDefinition>,

    /// Allow `--force` to suppress `throws` escalation
    #[serde(default = "default_true")]
    pub allow_force_no_throw: bool,

    /// Unrecognized keys, preserved for callers
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_name() -> String {
    "tool".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        // The built-in document always deserializes into Settings.
        serde_json::from_value(default_document()).expect("built-in defaults deserialize")
    }
}

impl Settings {
    /// Merge the built-in defaults with caller overrides and deserialize the
    /// combined tree into a typed document.
    pub fn merged(overrides: &Value) -> Result<Self, SettingsError> {
        let tree = merge(default_document(), overrides)?;
        Self::from_value(tree)
    }

    /// Deserialize an already-merged tree.
    pub fn from_value(tree: Value) -> Result<Self, SettingsError> {
        serde_json::from_value(tree).map_err(|e| SettingsError::Invalid(e.to_string()))
    }
}

/// Built-in default settings document. Initialized once per process and
/// deep-cloned for every merge; the shared template is never mutated.
pub fn default_document() -> Value {
    static DEFAULTS: OnceLock<Value> = OnceLock::new();
    DEFAULTS.get_or_init(build_default_document).clone()
}

fn build_default_document() -> Value {
    json!({
        "name": "tool",
        "description": "",
        "allow_force_no_throw": true,
        "logging": {
            "log":   { "verbose": false },
            "info":  { "verbose": true, "color": "green" },
            "debug": { "verbose": true, "color": "cyan", "stamp": true },
            "warn":  { "verbose": false, "prefix": "WARN", "color": "yellow" },
            "error": { "verbose": false, "prefix": "ERROR", "color": "red", "throws": true }
        },
        "option_definitions": [
            { "name": "help", "type": "boolean", "alias": "h",
              "description": "Show this help screen and exit" },
            { "name": "verbose", "type": "boolean", "alias": "v",
              "description": "Enable verbose output" },
            { "name": "quiet", "type": "boolean", "alias": "q",
              "description": "Suppress all output" },
            { "name": "force", "type": "boolean", "alias": "f",
              "description": "Keep going where an error would abort" }
        ]
    })
}
