//! Mutation errors.

use thiserror::Error;

/// Result type for the `try_*` operations.
pub type MutationResult<T> = Result<T, MutationError>;

/// Why a mutation could not be applied.
#[derive(Debug, Error)]
pub enum MutationError {
    /// The input is not valid JSON.
    #[error("invalid JSON document: {0}")]
    Parse(#[source] serde_json::Error),

    /// The path expression is malformed or uses unsupported syntax.
    #[error("invalid JSON path '{path}': {reason}")]
    InvalidPath {
        /// The path as written.
        path: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The path resolved to no nodes.
    #[error("no nodes found at path '{path}'")]
    NoMatch {
        /// The path as written.
        path: String,
    },

    /// The mutated document could not be serialized.
    #[error("failed to serialize JSON document: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl MutationError {
    pub(crate) fn invalid_path(path: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn no_match(path: &str) -> Self {
        Self::NoMatch {
            path: path.to_string(),
        }
    }

    /// Returns a short kind label, used in logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Parse(_) => "parse",
            Self::InvalidPath { .. } => "invalid_path",
            Self::NoMatch { .. } => "no_match",
            Self::Serialize(_) => "serialize",
        }
    }
}
