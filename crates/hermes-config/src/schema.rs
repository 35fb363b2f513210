//! Configuration section schemas.

use hermes_telemetry::LogConfig;
use serde::{Deserialize, Serialize};

/// Default body buffering limit: 10 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Gateway behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GatewaySettings {
    /// Reuse a valid incoming `X-Correlation-ID` instead of generating one.
    #[serde(default)]
    pub trust_incoming_correlation_id: bool,

    /// Log request and response bodies at `TRACE`.
    #[serde(default)]
    pub log_bodies: bool,

    /// Largest body, in bytes, buffered for transformation.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            trust_incoming_correlation_id: false,
            log_bodies: false,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Log level or `EnvFilter` directive (e.g. `info,hermes_json=debug`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include ANSI color codes in output.
    #[serde(default)]
    pub ansi_enabled: bool,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
            include_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl From<&LoggingSection> for LogConfig {
    fn from(section: &LoggingSection) -> Self {
        Self {
            level: section.level.clone(),
            json_format: section.format == LogFormat::Json,
            ansi: section.ansi_enabled,
            file_line_info: section.include_location,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_defaults() {
        let settings = GatewaySettings::default();
        assert!(!settings.trust_incoming_correlation_id);
        assert!(!settings.log_bodies);
        assert_eq!(settings.max_body_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_logging_defaults() {
        let logging = LoggingSection::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, LogFormat::Json);
    }

    #[test]
    fn test_log_config_from_section() {
        let section = LoggingSection {
            level: "debug".to_string(),
            format: LogFormat::Pretty,
            ansi_enabled: true,
            include_location: true,
        };
        let config = LogConfig::from(&section);
        assert_eq!(config.level, "debug");
        assert!(!config.json_format);
        assert!(config.ansi);
        assert!(config.file_line_info);
    }

    #[test]
    fn test_partial_section_uses_defaults() {
        let settings: GatewaySettings = toml::from_str("log_bodies = true").unwrap();
        assert!(settings.log_bodies);
        assert_eq!(settings.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<LoggingSection, _> = toml::from_str("colour = true");
        assert!(result.is_err());
    }
}
