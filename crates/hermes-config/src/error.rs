//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating a [`HermesConfig`](crate::HermesConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No file at the given path.
    #[error("configuration file not found: {}", path.display())]
    FileNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("cannot read {}", path.display())]
    Read {
        /// The unreadable path.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax or shape error.
    #[error("invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON syntax or shape error.
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// Neither `toml` nor `json`.
    #[error("unsupported configuration format: {format}")]
    UnsupportedFormat {
        /// The rejected format name or path.
        format: String,
    },

    /// A gateway or logging setting is out of range.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Dotted path of the setting.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A route entry cannot be loaded into the route table.
    #[error("route #{index} ('{route_id}'): {reason}")]
    InvalidRoute {
        /// Position in the `routes` list.
        index: usize,
        /// The entry's `RouteId`, possibly blank.
        route_id: String,
        /// What is wrong with it.
        reason: String,
    },

    /// An environment override holds a value of the wrong type.
    #[error("environment override {var}: {reason}")]
    EnvOverride {
        /// The environment variable name.
        var: String,
        /// Expected type.
        reason: String,
    },

    /// A `.env` file exists but could not be loaded.
    #[error("failed to load .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
}

impl ConfigError {
    pub(crate) fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    pub(crate) fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_route(index: usize, route_id: &str, reason: impl Into<String>) -> Self {
        Self::InvalidRoute {
            index,
            route_id: route_id.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn env_override(var: impl Into<String>, expected: &str) -> Self {
        Self::EnvOverride {
            var: var.into(),
            reason: format!("expected {expected}"),
        }
    }
}
