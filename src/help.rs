//! Help rendering: the two-section document built from finalized settings.
//!
//! Rendering is pure; printing and the exit policy live on the host.

use crate::options::{effective_definitions, OptionDefinition, OptionKind};
use crate::settings::Settings;
use comfy_table::presets::NOTHING;
use comfy_table::Table;
use owo_colors::OwoColorize;

/// One section of the help screen.
#[derive(Debug, Clone)]
pub enum HelpSection {
    /// Free text: tool name header and description content.
    Content { header: String, content: String },
    /// Option list rendered as an aligned, borderless table.
    OptionList {
        header: String,
        definitions: Vec<OptionDefinition>,
    },
}

/// Two-section help document.
#[derive(Debug, Clone)]
pub struct HelpDocument {
    sections: Vec<HelpSection>,
}

impl HelpDocument {
    /// Build the standard document: description section, then options.
    pub fn from_settings(settings: &Settings) -> Self {
        let definitions = effective_definitions(settings)
            .into_iter()
            .cloned()
            .collect();
        HelpDocument {
            sections: vec![
                HelpSection::Content {
                    header: settings.name.clone(),
                    content: settings.description.clone(),
                },
                HelpSection::OptionList {
                    header: "Options".to_string(),
                    definitions,
                },
            ],
        }
    }

    pub fn sections(&self) -> &[HelpSection] {
        &self.sections
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            match section {
                HelpSection::Content { header, content } => {
                    out.push_str(&format!("\n{}\n", header.bold().underline()));
                    if !content.is_empty() {
                        out.push_str(&format!("\n  {}\n", content));
                    }
                }
                HelpSection::OptionList {
                    header,
                    definitions,
                } => {
                    out.push_str(&format!("\n{}\n\n", header.bold().underline()));
                    let mut table = Table::new();
                    table.load_preset(NOTHING);
                    for def in definitions {
                        table.add_row(vec![format_invocation(def), def.description.clone()]);
                    }
                    out.push_str(&table.to_string());
                    out.push('\n');
                }
            }
        }
        out
    }
}

fn format_invocation(def: &OptionDefinition) -> String {
    if def.default_option {
        return format!("[{}...]", def.name);
    }
    let value_hint = match def.kind {
        OptionKind::Boolean => "",
        OptionKind::String => " <string>",
        OptionKind::Number => " <number>",
    };
    match def.alias {
        Some(alias) => format!("-{}, --{}{}", alias, def.name, value_hint),
        None => format!("    --{}{}", def.name, value_hint),
    }
}
