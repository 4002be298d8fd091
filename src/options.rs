//! Option definitions and the argv binder.
//!
//! Translates the merged option definitions into a clap command, parses the
//! process arguments once, and exposes the result as an options bag. The
//! merge guarantees `option_definitions` is always the concatenation of the
//! default and caller definitions, so parsing sees the union.

use crate::error::ToolError;
use crate::settings::Settings;
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Value shape of a parsed option
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    #[default]
    String,
    Boolean,
    Number,
}

/// One option-definition record, consumed by the binder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionDefinition {
    /// Long flag name and bag key
    pub name: String,

    /// Value shape; `type` in the settings document
    #[serde(rename = "type", default)]
    pub kind: OptionKind,

    /// Single-character short flag
    #[serde(default)]
    pub alias: Option<char>,

    /// Collect repeated occurrences into a sequence
    #[serde(default)]
    pub multiple: bool,

    /// Catch-all positional: unflagged operands land here
    #[serde(default)]
    pub default_option: bool,

    /// Applied when the option is absent from argv
    #[serde(default)]
    pub default_value: Option<Value>,

    /// Help text for the option list
    #[serde(default)]
    pub description: String,
}

/// Parsed options bag: option name to value, plus the two runtime flags.
/// Rebuilt once per construction; only the failure path touches `force`
/// afterwards.
#[derive(Debug, Clone, Default)]
pub struct Options {
    values: BTreeMap<String, Value>,
    force: bool,
    help: bool,
}

impl Options {
    /// Empty bag; the construction-failure path reports against this.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse `argv` (binary name first) against the merged definitions.
    pub fn bind<I, S>(settings: &Settings, argv: I) -> Result<Self, ToolError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let definitions = effective_definitions(settings);

        let mut command = Command::new(settings.name.clone())
            .disable_help_flag(true)
            .disable_version_flag(true);
        for def in &definitions {
            command = command.arg(build_arg(def));
        }

        let matches = command
            .try_get_matches_from(argv.into_iter().map(Into::into))
            .map_err(|e| ToolError::OptionParse(e.to_string()))?;

        let mut values = BTreeMap::new();
        for def in &definitions {
            if let Some(value) = extract(def, &matches)? {
                values.insert(def.name.clone(), value);
            }
        }

        let mut options = Options {
            values,
            force: false,
            help: false,
        };
        options.force = options.flag("force");
        options.help = options.flag("help");
        debug!(parsed = options.values.len(), "bound process arguments");
        Ok(options)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Boolean option value, false when absent or non-boolean.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(Value::Bool(true)))
    }

    pub fn verbose(&self) -> bool {
        self.flag("verbose")
    }

    pub fn quiet(&self) -> bool {
        self.flag("quiet")
    }

    pub fn force(&self) -> bool {
        self.force
    }

    pub fn help(&self) -> bool {
        self.help
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn set_force(&mut self, force: bool) {
        self.force = force;
    }
}

/// Definitions in merge order with later records replacing earlier ones of
/// the same name, so a caller can redefine a default option.
pub fn effective_definitions(settings: &Settings) -> Vec<&OptionDefinition> {
    let mut ordered: Vec<&OptionDefinition> = Vec::new();
    for def in &settings.option_definitions {
        if let Some(slot) = ordered.iter_mut().find(|d| d.name == def.name) {
            *slot = def;
        } else {
            ordered.push(def);
        }
    }
    ordered
}

fn build_arg(def: &OptionDefinition) -> Arg {
    let mut arg = Arg::new(def.name.clone()).help(def.description.clone());
    if def.default_option {
        arg = arg
            .num_args(0..)
            .value_name(def.name.to_uppercase());
    } else {
        arg = arg.long(def.name.clone());
        if let Some(alias) = def.alias {
            arg = arg.short(alias);
        }
        match def.kind {
            OptionKind::Boolean => {
                arg = arg.action(ArgAction::SetTrue);
            }
            OptionKind::String | OptionKind::Number => {
                arg = arg.action(if def.multiple {
                    ArgAction::Append
                } else {
                    ArgAction::Set
                });
            }
        }
    }
    if !matches!(def.kind, OptionKind::Boolean) {
        if let Some(default) = &def.default_value {
            arg = arg.default_value(default_to_string(default));
        }
    }
    arg
}

fn default_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn extract(def: &OptionDefinition, matches: &ArgMatches) -> Result<Option<Value>, ToolError> {
    if matches!(def.kind, OptionKind::Boolean) && !def.default_option {
        return Ok(if matches.get_flag(&def.name) {
            Some(Value::Bool(true))
        } else {
            None
        });
    }
    if def.multiple || def.default_option {
        let raw: Vec<&String> = matches
            .get_many::<String>(&def.name)
            .map(|v| v.collect())
            .unwrap_or_default();
        if raw.is_empty() {
            return Ok(None);
        }
        let items = raw
            .iter()
            .map(|s| coerce(def, s))
            .collect::<Result<Vec<Value>, ToolError>>()?;
        if def.default_option && !def.multiple && items.len() == 1 {
            return Ok(items.into_iter().next());
        }
        return Ok(Some(Value::Array(items)));
    }
    matches
        .get_one::<String>(&def.name)
        .map(|s| coerce(def, s))
        .transpose()
}

fn coerce(def: &OptionDefinition, raw: &str) -> Result<Value, ToolError> {
    match def.kind {
        OptionKind::Boolean => Ok(Value::Bool(raw.parse().unwrap_or(true))),
        OptionKind::String => Ok(Value::String(raw.to_string())),
        OptionKind::Number => {
            let number = raw.parse::<f64>().map_err(|_| {
                ToolError::OptionParse(format!("Invalid number for --{}: {}", def.name, raw))
            })?;
            serde_json::Number::from_f64(number)
                .map(Value::Number)
                .ok_or_else(|| {
                    ToolError::OptionParse(format!("Invalid number for --{}: {}", def.name, raw))
                })
        }
    }
}
