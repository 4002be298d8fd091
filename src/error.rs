//! Error types for the keel CLI chassis.

use crate::settings::ValueKind;
use serde_json::Value;
use thiserror::Error;

/// Settings merge and deserialization errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings overrides must be a mapping, got {0}")]
    InvalidArgument(ValueKind),

    #[error("Type mismatch for settings key '{key}': default is {expected}, override is {found}")]
    TypeMismatch {
        key: String,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("Structure mismatch for settings key '{key}': cannot merge {found} into {expected}")]
    StructureMismatch {
        key: String,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("Invalid settings document: {0}")]
    Invalid(String),

    #[error("Settings source error: {0}")]
    Source(String),
}

/// Host-level errors: log-method generation and invocation, option parsing,
/// and prompt pass-throughs
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Log method '{0}' collides with a reserved host name")]
    LogMethodCollision(String),

    #[error("Unknown log method: {0}")]
    UnknownLogMethod(String),

    #[error("Log method '{method}' escalated")]
    Escalation { method: String, args: Vec<Value> },

    #[error("Option parsing failed: {0}")]
    OptionParse(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),
}
