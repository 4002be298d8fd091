//! Terminal line-reading pass-throughs over dialoguer.

use crate::error::ToolError;
use dialoguer::{Confirm, Input, Select};

/// Yes/no confirmation.
pub fn confirm(message: &str) -> Result<bool, ToolError> {
    Confirm::new()
        .with_prompt(message)
        .interact()
        .map_err(prompt_error)
}

/// Free-text line input.
pub fn input(message: &str) -> Result<String, ToolError> {
    Input::<String>::new()
        .with_prompt(message)
        .interact_text()
        .map_err(prompt_error)
}

/// Pick one of `items`; returns the selected index.
pub fn select(message: &str, items: &[&str]) -> Result<usize, ToolError> {
    Select::new()
        .with_prompt(message)
        .items(items)
        .default(0)
        .interact()
        .map_err(prompt_error)
}

fn prompt_error(e: dialoguer::Error) -> ToolError {
    ToolError::Prompt(e.to_string())
}
