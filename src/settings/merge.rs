//! Merge rules: defaults copy, override order, kind compatibility.
//!
//! Overrides win for scalars, sequences concatenate (defaults first), and
//! mappings combine recursively. A kind conflict aborts the whole merge;
//! keys already processed stay merged in the working copy, later keys are
//! never reached.

use crate::error::SettingsError;
use serde_json::Value;
use std::fmt;
use tracing::trace;

/// Shape classification of a settings value, determined once per value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    Sequence,
    Mapping,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Sequence,
            Value::Object(_) => ValueKind::Mapping,
        }
    }

    fn is_container(self) -> bool {
        matches!(self, ValueKind::Sequence | ValueKind::Mapping)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "boolean",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Sequence => "sequence",
            ValueKind::Mapping => "mapping",
        };
        f.write_str(name)
    }
}

/// Merge `overrides` into a working copy of `defaults` and return it.
/// `overrides` is never mutated.
pub fn merge(defaults: Value, overrides: &Value) -> Result<Value, SettingsError> {
    if !overrides.is_object() {
        return Err(SettingsError::InvalidArgument(ValueKind::of(overrides)));
    }
    let mut merged = defaults;
    merge_mapping(&mut merged, overrides, "")?;
    Ok(merged)
}

fn merge_mapping(target: &mut Value, overrides: &Value, path: &str) -> Result<(), SettingsError> {
    // Callers guarantee both sides are mappings.
    let (Value::Object(target_map), Value::Object(override_map)) = (target, overrides) else {
        return Err(SettingsError::Invalid(format!(
            "merge_mapping called on non-mapping at '{}'",
            path
        )));
    };
    for (key, incoming) in override_map {
        let key_path = if path.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", path, key)
        };
        match target_map.get_mut(key) {
            // New keys are always accepted, no kind check.
            None => {
                trace!(key = %key_path, "settings key added");
                target_map.insert(key.clone(), incoming.clone());
            }
            Some(existing) => merge_value(existing, incoming, &key_path)?,
        }
    }
    Ok(())
}

fn merge_value(existing: &mut Value, incoming: &Value, key: &str) -> Result<(), SettingsError> {
    let expected = ValueKind::of(existing);
    let found = ValueKind::of(incoming);
    if expected != found {
        if expected.is_container() && found.is_container() {
            return Err(SettingsError::StructureMismatch {
                key: key.to_string(),
                expected,
                found,
            });
        }
        return Err(SettingsError::TypeMismatch {
            key: key.to_string(),
            expected,
            found,
        });
    }
    match (existing, incoming) {
        (Value::Array(target), Value::Array(addition)) => {
            // Order-preserving concatenation, duplicates allowed.
            target.extend(addition.iter().cloned());
        }
        (existing @ Value::Object(_), incoming) => merge_mapping(existing, incoming, key)?,
        (existing, incoming) => {
            trace!(key = %key, "settings key overridden");
            *existing = incoming.clone();
        }
    }
    Ok(())
}
