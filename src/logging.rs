//! Log Factory
//!
//! Derives named log methods from the merged `logging` settings sub-tree.
//! Each method conditionally writes colorized, optionally prefixed and
//! timestamped output to a console channel, and can escalate into an error
//! after its output has been produced.

use crate::error::ToolError;
use crate::options::Options;
use crate::settings::Settings;
use chrono::Local;
use owo_colors::{AnsiColors, OwoColorize};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Method names that can never be generated; they belong to the host's own
/// surface. Checked per method at generation time, so the first collision in
/// name order aborts generation of everything after it.
pub const RESERVED_METHOD_NAMES: &[&str] = &["settings", "options", "help"];

/// Per-method logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogMethodConfig {
    /// Output only when the host runs with verbose enabled
    #[serde(default)]
    pub verbose: bool,

    /// Extra element prepended before the message arguments
    #[serde(default)]
    pub prefix: Option<String>,

    /// ANSI color name applied to string elements
    #[serde(default)]
    pub color: Option<String>,

    /// Prepend a local date-time element
    #[serde(default)]
    pub stamp: bool,

    /// Escalate into an error after the output is produced
    #[serde(default)]
    pub throws: bool,
}

/// Console channel a method dispatches to. Method names that do not name a
/// channel fall back to `Log`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Log,
    Info,
    Debug,
    Trace,
    Warn,
    Error,
}

impl Channel {
    pub fn for_method(name: &str) -> Self {
        match name {
            "info" => Channel::Info,
            "debug" => Channel::Debug,
            "trace" => Channel::Trace,
            "warn" => Channel::Warn,
            "error" => Channel::Error,
            _ => Channel::Log,
        }
    }

    /// Channels that write to stderr rather than stdout.
    pub fn is_stderr(self) -> bool {
        matches!(self, Channel::Warn | Channel::Error)
    }
}

/// Output seam between generated methods and the terminal.
pub trait ConsoleSink: Send + Sync {
    /// Write one output line assembled from `elements` to `channel`.
    fn write(&self, channel: Channel, elements: &[String]);
}

/// Standard-stream sink: warn/error to stderr, the rest to stdout.
#[derive(Debug, Default)]
pub struct StandardSink;

impl ConsoleSink for StandardSink {
    fn write(&self, channel: Channel, elements: &[String]) {
        let line = elements.join(" ");
        if channel.is_stderr() {
            let _ = writeln!(std::io::stderr(), "{}", line);
        } else {
            let _ = writeln!(std::io::stdout(), "{}", line);
        }
    }
}

/// In-memory sink recording exact element sequences. Test double.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<(Channel, Vec<String>)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(Channel, Vec<String>)> {
        self.lines.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl ConsoleSink for MemorySink {
    fn write(&self, channel: Channel, elements: &[String]) {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((channel, elements.to_vec()));
    }
}

/// Generated log methods, keyed by name. Derived once from finalized
/// settings; immutable afterwards.
pub struct Logger {
    methods: BTreeMap<String, LogMethodConfig>,
    allow_force_no_throw: bool,
    sink: Arc<dyn ConsoleSink>,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("methods", &self.methods)
            .field("allow_force_no_throw", &self.allow_force_no_throw)
            .field("sink", &"<dyn ConsoleSink>")
            .finish()
    }
}

impl Logger {
    /// Generate methods from the `logging` sub-tree.
    pub fn from_settings(settings: &Settings, sink: Arc<dyn ConsoleSink>) -> Result<Self, ToolError> {
        let mut methods = BTreeMap::new();
        for (name, config) in &settings.logging {
            if RESERVED_METHOD_NAMES.contains(&name.as_str()) {
                return Err(ToolError::LogMethodCollision(name.clone()));
            }
            debug!(method = %name, "generated log method");
            methods.insert(name.clone(), config.clone());
        }
        Ok(Self {
            methods,
            allow_force_no_throw: settings.allow_force_no_throw,
            sink,
        })
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    /// Invoke the named method with heterogeneous arguments.
    ///
    /// Output is produced only when the visibility gate passes; a gated call
    /// is a silent no-op and never escalates. With `throws` configured, the
    /// call returns an escalation error carrying the original arguments after
    /// the output has been written, unless `allow_force_no_throw` and the
    /// force flag together suppress it.
    pub fn emit(&self, method: &str, args: &[Value], options: &Options) -> Result<(), ToolError> {
        let config = self
            .methods
            .get(method)
            .ok_or_else(|| ToolError::UnknownLogMethod(method.to_string()))?;

        let visible = (!config.verbose || options.verbose()) && !options.quiet();
        if !visible {
            return Ok(());
        }

        let color = config.color.as_deref().and_then(parse_color);
        let mut elements: Vec<String> = args.iter().map(|arg| render_element(arg, color)).collect();
        if let Some(prefix) = config.prefix.as_deref() {
            if !prefix.trim().is_empty() {
                elements.insert(0, apply_color(prefix, color));
            }
        }
        if config.stamp {
            let stamp = format!("[{}]", Local::now().format("%Y-%m-%d %H:%M:%S"));
            elements.insert(0, apply_color(&stamp, color));
        }
        self.sink.write(Channel::for_method(method), &elements);

        if config.throws && !(self.allow_force_no_throw && options.force()) {
            return Err(ToolError::Escalation {
                method: method.to_string(),
                args: args.to_vec(),
            });
        }
        Ok(())
    }
}

/// Colorize string content one level deep. A single string is replaced;
/// sequence elements and mapping values are colorized in place when they are
/// strings; everything else is left untouched. Nested structures are never
/// descended into.
pub fn colorize(value: &mut Value, color: &str) {
    let Some(color) = parse_color(color) else {
        return;
    };
    match value {
        Value::String(s) => *s = s.color(color).to_string(),
        Value::Array(items) => {
            for item in items.iter_mut() {
                if let Value::String(s) = item {
                    *s = s.color(color).to_string();
                }
            }
        }
        Value::Object(map) => {
            for (_, item) in map.iter_mut() {
                if let Value::String(s) = item {
                    *s = s.color(color).to_string();
                }
            }
        }
        _ => {}
    }
}

fn render_element(arg: &Value, color: Option<AnsiColors>) -> String {
    match arg {
        Value::String(s) => apply_color(s, color),
        // Structured arguments render as compact JSON, uncolorized.
        other => other.to_string(),
    }
}

fn apply_color(text: &str, color: Option<AnsiColors>) -> String {
    match color {
        Some(color) => text.color(color).to_string(),
        None => text.to_string(),
    }
}

/// Recognized color names; anything else disables colorization.
fn parse_color(name: &str) -> Option<AnsiColors> {
    let color = match name.to_ascii_lowercase().as_str() {
        "black" => AnsiColors::Black,
        "red" => AnsiColors::Red,
        "green" => AnsiColors::Green,
        "yellow" => AnsiColors::Yellow,
        "blue" => AnsiColors::Blue,
        "magenta" => AnsiColors::Magenta,
        "cyan" => AnsiColors::Cyan,
        "white" => AnsiColors::White,
        "bright_black" | "gray" | "grey" => AnsiColors::BrightBlack,
        "bright_red" => AnsiColors::BrightRed,
        "bright_green" => AnsiColors::BrightGreen,
        "bright_yellow" => AnsiColors::BrightYellow,
        "bright_blue" => AnsiColors::BrightBlue,
        "bright_magenta" => AnsiColors::BrightMagenta,
        "bright_cyan" => AnsiColors::BrightCyan,
        "bright_white" => AnsiColors::BrightWhite,
        _ => return None,
    };
    Some(color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings(overrides: Value) -> Settings {
        Settings::merged(&overrides).unwrap()
    }

    fn options(settings: &Settings, argv: &[&str]) -> Options {
        Options::bind(settings, argv.iter().copied()).unwrap()
    }

    fn logger(settings: &Settings) -> (Logger, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let logger = Logger::from_settings(settings, sink.clone()).unwrap();
        (logger, sink)
    }

    #[test]
    fn test_warn_emits_stamp_prefix_and_message() {
        let settings = settings(json!({
            "logging": { "warn": { "verbose": true, "stamp": true } }
        }));
        let opts = options(&settings, &["tool", "--verbose"]);
        let (logger, sink) = logger(&settings);

        logger.emit("warn", &[json!("disk low")], &opts).unwrap();

        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        let (channel, elements) = &lines[0];
        assert_eq!(*channel, Channel::Warn);
        assert_eq!(elements.len(), 3);
        assert!(elements[0].contains('['), "stamp element: {:?}", elements[0]);
        assert_eq!(elements[1], "WARN".color(AnsiColors::Yellow).to_string());
        assert_eq!(elements[2], "disk low".color(AnsiColors::Yellow).to_string());
    }

    #[test]
    fn test_quiet_suppresses_all_output() {
        let settings = settings(json!({}));
        let opts = options(&settings, &["tool", "--quiet", "--verbose"]);
        let (logger, sink) = logger(&settings);

        logger.emit("warn", &[json!("nope")], &opts).unwrap();
        logger.emit("log", &[json!("nope")], &opts).unwrap();
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_quiet_gates_escalation_too() {
        let settings = settings(json!({ "allow_force_no_throw": false }));
        let opts = options(&settings, &["tool", "--quiet"]);
        let (logger, sink) = logger(&settings);

        // error is configured with throws, but a gated call never escalates.
        logger.emit("error", &[json!("hidden")], &opts).unwrap();
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_verbose_method_hidden_without_verbose_option() {
        let settings = settings(json!({}));
        let opts = options(&settings, &["tool"]);
        let (logger, sink) = logger(&settings);

        logger.emit("debug", &[json!("detail")], &opts).unwrap();
        assert!(sink.lines().is_empty());

        logger.emit("log", &[json!("always")], &opts).unwrap();
        assert_eq!(sink.lines().len(), 1);
    }

    #[test]
    fn test_throws_escalates_after_output_with_payload() {
        let settings = settings(json!({ "allow_force_no_throw": false }));
        let opts = options(&settings, &["tool"]);
        let (logger, sink) = logger(&settings);

        let args = vec![json!("boom"), json!({ "code": 3 })];
        let err = logger.emit("error", &args, &opts).unwrap_err();

        // Output first, escalation second, payload intact.
        assert_eq!(sink.lines().len(), 1);
        match err {
            ToolError::Escalation {
                method,
                args: payload,
            } => {
                assert_eq!(method, "error");
                assert_eq!(payload, args);
            }
            other => panic!("expected escalation, got {:?}", other),
        }
    }

    #[test]
    fn test_force_suppresses_escalation() {
        let settings = settings(json!({}));
        let opts = options(&settings, &["tool", "--force"]);
        let (logger, sink) = logger(&settings);

        logger.emit("error", &[json!("survivable")], &opts).unwrap();
        assert_eq!(sink.lines().len(), 1);
    }

    #[test]
    fn test_force_alone_is_not_enough_when_disallowed() {
        let settings = settings(json!({ "allow_force_no_throw": false }));
        let opts = options(&settings, &["tool", "--force"]);
        let (logger, _sink) = logger(&settings);

        assert!(logger.emit("error", &[json!("fatal")], &opts).is_err());
    }

    #[test]
    fn test_channel_fallback_to_log() {
        let settings = settings(json!({
            "logging": { "shout": { "verbose": false } }
        }));
        let opts = options(&settings, &["tool"]);
        let (logger, sink) = logger(&settings);

        logger.emit("shout", &[json!("hey")], &opts).unwrap();
        assert_eq!(sink.lines()[0].0, Channel::Log);
    }

    #[test]
    fn test_unknown_method_is_an_error() {
        let settings = settings(json!({}));
        let opts = options(&settings, &["tool"]);
        let (logger, _sink) = logger(&settings);

        let err = logger.emit("missing", &[], &opts).unwrap_err();
        assert!(matches!(err, ToolError::UnknownLogMethod(ref name) if name == "missing"));
    }

    #[test]
    fn test_reserved_name_collides() {
        let settings = settings(json!({
            "logging": { "options": { "verbose": false } }
        }));
        let err = Logger::from_settings(&settings, Arc::new(MemorySink::new())).unwrap_err();
        assert!(matches!(err, ToolError::LogMethodCollision(ref name) if name == "options"));
    }

    #[test]
    fn test_unrecognized_color_leaves_args_unmodified() {
        let settings = settings(json!({
            "logging": { "plain": { "verbose": false, "color": "tangerine" } }
        }));
        let opts = options(&settings, &["tool"]);
        let (logger, sink) = logger(&settings);

        logger.emit("plain", &[json!("as-is")], &opts).unwrap();
        assert_eq!(sink.lines()[0].1, vec!["as-is".to_string()]);
    }

    #[test]
    fn test_blank_prefix_is_skipped() {
        let settings = settings(json!({
            "logging": { "bare": { "verbose": false, "prefix": "   " } }
        }));
        let opts = options(&settings, &["tool"]);
        let (logger, sink) = logger(&settings);

        logger.emit("bare", &[json!("only")], &opts).unwrap();
        assert_eq!(sink.lines()[0].1.len(), 1);
    }

    #[test]
    fn test_structured_args_render_as_json() {
        let settings = settings(json!({}));
        let opts = options(&settings, &["tool"]);
        let (logger, sink) = logger(&settings);

        logger.emit("log", &[json!({ "disk": "sda1" }), json!(42)], &opts).unwrap();
        assert_eq!(
            sink.lines()[0].1,
            vec!["{\"disk\":\"sda1\"}".to_string(), "42".to_string()]
        );
    }

    #[test]
    fn test_colorize_single_string() {
        let mut value = json!("hi");
        colorize(&mut value, "red");
        assert_eq!(value, json!("hi".color(AnsiColors::Red).to_string()));
    }

    #[test]
    fn test_colorize_one_level_deep_only() {
        let mut value = json!(["a", 1, { "nested": "b" }]);
        colorize(&mut value, "blue");
        assert_eq!(value[0], json!("a".color(AnsiColors::Blue).to_string()));
        assert_eq!(value[1], json!(1));
        // Nested structures are untouched.
        assert_eq!(value[2], json!({ "nested": "b" }));
    }

    #[test]
    fn test_colorize_mapping_values() {
        let mut value = json!({ "s": "x", "n": 2, "inner": { "s": "y" } });
        colorize(&mut value, "green");
        assert_eq!(value["s"], json!("x".color(AnsiColors::Green).to_string()));
        assert_eq!(value["n"], json!(2));
        assert_eq!(value["inner"], json!({ "s": "y" }));
    }

    #[test]
    fn test_colorize_unknown_color_is_noop() {
        let mut value = json!("hi");
        colorize(&mut value, "plaid");
        assert_eq!(value, json!("hi"));
    }

    #[test]
    fn test_channel_for_method() {
        assert_eq!(Channel::for_method("error"), Channel::Error);
        assert_eq!(Channel::for_method("info"), Channel::Info);
        assert_eq!(Channel::for_method("anything"), Channel::Log);
        assert!(Channel::Error.is_stderr());
        assert!(!Channel::Info.is_stderr());
    }
}
