//! Keel demonstration binary.
//!
//! A minimal greeting tool assembled on the chassis. Override settings come
//! from the KEEL_SETTINGS environment variable (a JSON document); options and
//! help come from the merged definitions.

use keel::tool::Tool;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env("KEEL_LOG").unwrap_or_else(|_| EnvFilter::new("off")))
        .with_writer(std::io::stderr)
        .init();

    let overrides = match std::env::var("KEEL_SETTINGS") {
        // Non-JSON text is passed through verbatim so the chassis reports it
        // as an invalid settings argument.
        Ok(raw) => serde_json::from_str(&raw).unwrap_or(Value::String(raw)),
        Err(_) => json!({
            "name": "greet",
            "description": "Greet someone from the command line.",
            "option_definitions": [
                { "name": "who", "type": "string", "alias": "w",
                  "default_value": "world", "description": "Name to greet" }
            ],
            "logging": {
                "shout": { "verbose": false, "prefix": "GREET", "color": "green" },
                "detail": { "verbose": true, "color": "cyan", "stamp": true }
            }
        }),
    };

    let tool = Tool::new(&overrides);

    let who = tool
        .options()
        .get("who")
        .and_then(Value::as_str)
        .unwrap_or("world")
        .to_string();

    // KEEL_SETTINGS may have replaced the demo document entirely, so only
    // address methods that survived the merge.
    if tool.settings().logging.contains_key("detail") {
        tool.emit("detail", &[json!("settings merged"), json!({ "who": who })])?;
    }
    let greeting = json!(format!("hello, {}", who));
    if tool.settings().logging.contains_key("shout") {
        tool.emit("shout", &[greeting])?;
    } else {
        tool.emit("log", &[greeting])?;
    }
    Ok(())
}
