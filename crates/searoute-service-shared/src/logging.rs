//! Structured logging setup for the route planning service.
//!
//! # Environment Variables
//!
//! - `LOG_FORMAT`: output format, either `json` (default) or `text`
//! - `RUST_LOG`: log level filter (default: `info`)

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON structured logging (default, production).
    #[default]
    Json,
    /// Human-readable text logging (development).
    Text,
}

impl LogFormat {
    /// Parse from a string; "text" and "pretty" select text output, any
    /// other value falls back to JSON.
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "text" | "pretty" => LogFormat::Text,
            _ => LogFormat::Json,
        }
    }
}

/// Configuration for the logging system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Log level filter, e.g. "info" or "searoute_lib=debug".
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        let format = std::env::var("LOG_FORMAT")
            .map(|v| LogFormat::parse(&v))
            .unwrap_or(LogFormat::Json);
        let level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self { format, level }
    }
}

/// Install the tracing subscriber. Call once at startup.
///
/// Service identity is carried by the emitting target and the deployment
/// metadata, not injected per entry.
pub fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Text => {
            registry.with(fmt::layer().pretty()).init();
        }
        LogFormat::Json => {
            let json_layer = fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false);
            registry.with(json_layer).init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("TEXT"), LogFormat::Text);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Text);
        assert_eq!(LogFormat::parse("anything-else"), LogFormat::Json);
    }

    #[test]
    fn default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, "info");
    }
}
