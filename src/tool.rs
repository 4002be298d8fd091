//! Host object: merged settings, parsed options, and generated log methods.
//!
//! Construction runs merge, log-method generation, and option binding
//! strictly in that order, each completing before the next. Any failure is
//! caught at the top of [`Tool::new`], reported through the best-available
//! logger, and redirected into help display and process exit 0; construction
//! never returns a half-initialized host.

use crate::error::ToolError;
use crate::help::HelpDocument;
use crate::logging::{ConsoleSink, Logger, StandardSink};
use crate::options::Options;
use crate::settings::Settings;
use serde_json::Value;
use std::process;
use std::sync::Arc;
use tracing::debug;

/// The per-invocation host: one instance per tool run.
#[derive(Debug)]
pub struct Tool {
    settings: Settings,
    options: Options,
    logger: Logger,
}

impl Tool {
    /// Construct from override settings, process argv, and the standard
    /// console sink. Displays help and exits 0 on a `--help` request or on
    /// any construction failure.
    pub fn new(overrides: &Value) -> Self {
        match Self::try_new(overrides, std::env::args(), Arc::new(StandardSink)) {
            Ok(tool) => {
                if tool.options.help() {
                    tool.show_help();
                }
                tool
            }
            Err(e) => fail_to_help(overrides, e),
        }
    }

    /// The construction pipeline without the exit policy, for embedding and
    /// tests. `argv` must carry the binary name first.
    pub fn try_new<I, S>(
        overrides: &Value,
        argv: I,
        sink: Arc<dyn ConsoleSink>,
    ) -> Result<Self, ToolError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let settings = Settings::merged(overrides)?;
        let logger = Logger::from_settings(&settings, sink)?;
        let options = Options::bind(&settings, argv)?;
        debug!(name = %settings.name, methods = settings.logging.len(), "tool constructed");
        Ok(Self {
            settings,
            options,
            logger,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Invoke a generated log method. The escalation outcome is the return
    /// value; see [`Logger::emit`].
    pub fn emit(&self, method: &str, args: &[Value]) -> Result<(), ToolError> {
        self.logger.emit(method, args, &self.options)
    }

    /// Render the two-section help screen to stdout and exit 0.
    pub fn show_help(&self) -> ! {
        show_help_for(&self.settings)
    }
}

fn show_help_for(settings: &Settings) -> ! {
    println!("{}", HelpDocument::from_settings(settings).render());
    process::exit(0);
}

/// Construction-failure policy: force-suppress further escalation, report
/// through the best-available logger, then help and exit 0.
fn fail_to_help(overrides: &Value, error: ToolError) -> ! {
    debug!(error = ?error, "construction failed");

    // The merge itself may have been the failing stage; fall back to the
    // built-in defaults so reporting and help still have a document.
    let settings = Settings::merged(overrides).unwrap_or_default();

    let mut options = Options::empty();
    options.set_force(true);

    match Logger::from_settings(&settings, Arc::new(StandardSink)) {
        Ok(logger) if logger.has_method("error") => {
            // force is set, so a throws-configured error method cannot
            // escalate again while reporting.
            let _ = logger.emit("error", &[Value::String(error.to_string())], &options);
        }
        _ => eprintln!("{}", error),
    }

    show_help_for(&settings);
}
