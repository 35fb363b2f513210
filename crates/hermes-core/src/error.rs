//! Error types for Hermes pipelines.
//!
//! Hermes distinguishes exactly two severities:
//!
//! | Severity | Variant | Effect |
//! |---|---|---|
//! | [`Severity::Fatal`] | [`HermesError::MissingRequiredHeader`] | Request aborted with 400, never forwarded |
//! | [`Severity::Recoverable`] | [`HermesError::RuleFailed`] | Rule skipped, pipeline continues |
//!
//! An unmatched route or an unknown rule type is not an error at all.

use http::StatusCode;
use thiserror::Error;

/// Result type alias using [`HermesError`].
pub type HermesResult<T> = Result<T, HermesError>;

/// How a pipeline reacts to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Abort the request: no further rules run and nothing is forwarded.
    Fatal,
    /// Skip the failing rule and continue with the next one.
    Recoverable,
}

/// Errors raised while applying transformation rules.
#[derive(Error, Debug)]
pub enum HermesError {
    /// A header marked as required is absent from the request.
    #[error("Required header '{header}' is missing")]
    MissingRequiredHeader {
        /// The header that was required.
        header: String,
    },

    /// A single rule could not be applied.
    #[error("Rule {rule_type} failed: {reason}")]
    RuleFailed {
        /// The `Type` discriminator of the failing rule.
        rule_type: &'static str,
        /// Human-readable failure description.
        reason: String,
    },
}

impl HermesError {
    /// Creates a missing-header error.
    #[must_use]
    pub fn missing_header(header: impl Into<String>) -> Self {
        Self::MissingRequiredHeader {
            header: header.into(),
        }
    }

    /// Creates a rule failure.
    #[must_use]
    pub fn rule_failed(rule_type: &'static str, reason: impl Into<String>) -> Self {
        Self::RuleFailed {
            rule_type,
            reason: reason.into(),
        }
    }

    /// Returns the severity of this error.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::MissingRequiredHeader { .. } => Severity::Fatal,
            Self::RuleFailed { .. } => Severity::Recoverable,
        }
    }

    /// Returns true if this error aborts the request.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self.severity(), Severity::Fatal)
    }

    /// Returns the HTTP status code the caller receives for this error.
    ///
    /// Recoverable errors never reach the caller; they map to 500 only so
    /// that the function is total.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingRequiredHeader { .. } => StatusCode::BAD_REQUEST,
            Self::RuleFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a stable machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingRequiredHeader { .. } => "MISSING_REQUIRED_HEADER",
            Self::RuleFailed { .. } => "RULE_FAILED",
        }
    }
}
