//! Observability for the Hermes gateway.
//!
//! - **Logging**: structured JSON or pretty logs via `tracing-subscriber`
//! - **Metrics**: counter names and descriptions for the `metrics` facade
//!
//! Every log line about a request carries `correlation_id`; rule-level
//! lines add `route_id`, `rule_type` and `phase`.
//!
//! # Example
//!
//! ```rust,ignore
//! use hermes_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development()).expect("logging");
//! hermes_telemetry::metrics::describe_metrics();
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig, LOG_ENV_VAR};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
