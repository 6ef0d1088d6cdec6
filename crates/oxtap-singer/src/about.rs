//! The `--about` document: tap identity, capabilities and settings.

use serde::Serialize;
use serde_json::{Value, json};
use std::fmt::Write;

/// Tap name as advertised to orchestrators.
pub const TAP_NAME: &str = "tap-openexchangerates";

/// Capabilities advertised by `--about`.
pub const CAPABILITIES: [&str; 4] = ["catalog", "state", "discover", "about"];

/// Description of the tap and its settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct About {
    /// Tap name.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Tap version.
    pub version: &'static str,
    /// Supported Singer capabilities.
    pub capabilities: Vec<&'static str>,
    /// JSON schema of the config file.
    pub settings: Value,
}

impl Default for About {
    fn default() -> Self {
        Self {
            name: TAP_NAME,
            description: "Singer tap for daily historical exchange rates from Open Exchange Rates",
            version: env!("CARGO_PKG_VERSION"),
            capabilities: CAPABILITIES.to_vec(),
            settings: settings_schema(),
        }
    }
}

impl About {
    /// Renders the document as Markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# `{}`\n", self.name);
        let _ = writeln!(out, "{}\n", self.description);
        let _ = writeln!(out, "Version: {}\n", self.version);

        out.push_str("## Capabilities\n\n");
        for capability in &self.capabilities {
            let _ = writeln!(out, "* `{capability}`");
        }

        out.push_str("\n## Settings\n\n");
        out.push_str("| Setting | Required | Default | Description |\n");
        out.push_str("|:--------|:--------:|:-------:|:------------|\n");

        let required: Vec<&str> = self.settings["required"]
            .as_array()
            .map(|r| r.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        if let Some(properties) = self.settings["properties"].as_object() {
            for (name, property) in properties {
                let default = property
                    .get("default")
                    .map_or_else(|| "None".to_string(), ToString::to_string);
                let _ = writeln!(
                    out,
                    "| {name} | {} | {default} | {} |",
                    if required.contains(&name.as_str()) { "True" } else { "False" },
                    property["description"].as_str().unwrap_or_default()
                );
            }
        }

        out
    }
}

/// Returns the JSON schema of the tap configuration.
#[must_use]
pub fn settings_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "app_id": {
                "type": "string",
                "secret": true,
                "description": "Your unique App ID"
            },
            "start_date": {
                "type": "string",
                "format": "date",
                "description": "The requested start date in YYYY-MM-DD format (alias: date)"
            },
            "symbols": {
                "type": "array",
                "items": {"type": "string"},
                "description": "Limit results to specific currencies (3-letter codes)"
            },
            "base": {
                "type": "string",
                "description": "Change base currency (3-letter code, default: USD)"
            },
            "user_agent": {
                "type": "string",
                "description": "User agent to use in the request"
            },
            "api_url": {
                "type": "string",
                "default": oxtap_types::DEFAULT_API_URL,
                "description": "API root URL"
            }
        },
        "required": ["app_id", "start_date"]
    })
}
