//! Output formatting for CLI commands.

use serde_json::json;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Plain text.
    #[default]
    Text,
    /// JSON object.
    Json,
}

impl OutputFormat {
    /// Parses a format name; unknown names fall back to text.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Formats an agent answer.
#[must_use]
pub fn format_response(response: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!("{response}\n"),
        OutputFormat::Json => format!("{}\n", json!({ "response": response })),
    }
}
