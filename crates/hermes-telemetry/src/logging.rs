//! Structured logging for Hermes.
//!
//! One global subscriber: an [`EnvFilter`] in front of a single `fmt`
//! layer, JSON in production and pretty in development.
//!
//! ```rust,ignore
//! use hermes_telemetry::logging::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::default())?;
//! tracing::info!(correlation_id = %id, route_id = "users", "Matched route");
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// Environment variable that, when set, replaces [`LogConfig::level`].
pub const LOG_ENV_VAR: &str = "HERMES_LOG";

/// Subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Install nothing when `false`.
    pub enabled: bool,

    /// `EnvFilter` directive, e.g. `info,hermes_json=debug`.
    pub level: String,

    /// JSON lines instead of pretty output.
    pub json_format: bool,

    /// Colors, pretty output only.
    pub ansi: bool,

    /// Source file and line on every event.
    pub file_line_info: bool,

    /// Thread ids on every event.
    pub thread_ids: bool,

    /// Module path on every event.
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            ansi: false,
            file_line_info: false,
            thread_ids: false,
            include_target: true,
        }
    }
}

impl LogConfig {
    /// Pretty, colored, `debug` level output with source locations.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            json_format: false,
            ansi: true,
            file_line_info: true,
            ..Self::default()
        }
    }

    /// Returns this configuration with `level` taken from `HERMES_LOG` when
    /// that variable is set and non-blank.
    #[must_use]
    pub fn with_env_level(mut self) -> Self {
        if let Some(level) = std::env::var(LOG_ENV_VAR)
            .ok()
            .filter(|level| !level.trim().is_empty())
        {
            self.level = level;
        }
        self
    }

    fn fmt_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let layer = fmt::layer()
            .with_file(self.file_line_info)
            .with_line_number(self.file_line_info)
            .with_thread_ids(self.thread_ids)
            .with_target(self.include_target)
            .with_span_events(FmtSpan::NONE);

        if self.json_format {
            layer.json().flatten_event(true).boxed()
        } else {
            layer.pretty().with_ansi(self.ansi).boxed()
        }
    }
}

/// Installs the global subscriber described by `config`.
///
/// # Errors
///
/// Fails with [`TelemetryError::InvalidFilter`] when `level` does not parse
/// and [`TelemetryError::LoggingInit`] when a subscriber is already set.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;

    tracing_subscriber::registry()
        .with(config.fmt_layer())
        .with(filter)
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

/// Parses a filter directive.
///
/// # Errors
///
/// Fails with [`TelemetryError::InvalidFilter`] naming the directive.
pub fn create_env_filter(directive: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(directive).map_err(|e| TelemetryError::InvalidFilter {
        filter: directive.to_string(),
        reason: e.to_string(),
    })
}
