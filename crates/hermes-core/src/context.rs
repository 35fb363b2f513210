//! Correlation identifiers.
//!
//! A [`CorrelationId`] is generated once per request and reused by the
//! request pipeline, the response pipeline and every log line concerning
//! that request.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unique identifier for each in-flight request, using UUID v7.
///
/// UUID v7 is time-ordered, which keeps correlated log lines sortable.
///
/// # Example
///
/// ```
/// use hermes_core::CorrelationId;
///
/// let id = CorrelationId::new();
/// assert_eq!(id.to_string().len(), 36);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Creates a new unique correlation ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `CorrelationId` from an existing UUID.
    ///
    /// Used when an upstream caller already assigned an id.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parses a correlation ID from its hyphenated string form.
    ///
    /// Returns `None` if the value is not a valid UUID.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value).ok().map(Self)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for CorrelationId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<CorrelationId> for Uuid {
    fn from(id: CorrelationId) -> Self {
        id.0
    }
}
