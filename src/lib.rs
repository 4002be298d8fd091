//! Keel: CLI Chassis
//!
//! Settings merging, derived log methods, option parsing, and help rendering
//! for command-line tools. A [`tool::Tool`] owns the merged settings
//! document, the parsed options bag, and the log methods generated from
//! declarative configuration.

pub mod error;
pub mod help;
pub mod logging;
pub mod options;
pub mod prompt;
pub mod settings;
pub mod tool;
