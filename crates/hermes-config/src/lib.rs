//! Typed configuration for the Hermes gateway.
//!
//! This crate provides a strongly-typed configuration system with support for:
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Overview
//!
//! [`HermesConfig`] holds three sections:
//!
//! - [`GatewaySettings`] - correlation id trust, body logging, body size limit
//! - [`LoggingSection`] - log level and format
//! - `routes` - the ordered route table, each entry a
//!   [`RouteDefinition`](hermes_core::RouteDefinition)
//!
//! # Example
//!
//! ```no_run
//! use hermes_config::ConfigLoader;
//!
//! # fn main() -> Result<(), hermes_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_file("hermes.toml")?
//!     .with_env_prefix("HERMES")
//!     .load()?;
//!
//! println!("{} routes loaded", config.routes.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! Section keys are snake_case; route and rule keys keep the PascalCase
//! names of the route files.
//!
//! ```toml
//! [gateway]
//! trust_incoming_correlation_id = false
//! log_bodies = false
//! max_body_bytes = 10485760
//!
//! [logging]
//! level = "info"
//! format = "json"
//!
//! [[routes]]
//! RouteId = "users"
//! MatchPath = "/api/users/{id}"
//! DestinationPrefix = "http://users.internal"
//! Direction = "Incoming"
//!
//! [[routes.Transformations]]
//! Type = "ValidateHeader"
//! HeaderName = "X-Api-Key"
//! Required = true
//!
//! [[routes.ResponseTransformations]]
//! Type = "InjectMetadata"
//! JsonPath = "$"
//! Metadata = { processedAt = "{{timestamp}}" }
//! ```
//!
//! # Environment Variable Overrides
//!
//! The `gateway` and `logging` sections can be overridden via environment
//! variables using the format `PREFIX__SECTION__KEY`. For example:
//!
//! - `HERMES__GATEWAY__LOG_BODIES=true`
//! - `HERMES__GATEWAY__MAX_BODY_BYTES=1048576`
//! - `HERMES__LOGGING__LEVEL=debug`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::HermesConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
