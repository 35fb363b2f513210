//! Route definitions.

use serde::{Deserialize, Serialize};

use crate::rule::TransformationRule;

/// Which way traffic flows through a route.
///
/// The tag is informational: it shows up in logs and in
/// `is_incoming`/`is_outgoing` lookups but never changes what the
/// pipelines do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Direction {
    /// External caller into an internal service.
    #[default]
    Incoming,
    /// Internal service out to an external API.
    Outgoing,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Incoming => f.write_str("Incoming"),
            Self::Outgoing => f.write_str("Outgoing"),
        }
    }
}

/// An entry of the route table.
///
/// Built once from configuration at startup and shared read-only across
/// all concurrent requests. Field names on the wire follow the PascalCase
/// convention of the route files (`RouteId`, `MatchPath`, ...).
///
/// # Example
///
/// ```
/// use hermes_core::{Direction, RouteDefinition};
///
/// let route: RouteDefinition = serde_json::from_str(r#"{
///     "RouteId": "payments",
///     "MatchPath": "/api/payments/{**rest}",
///     "DestinationPrefix": "https://payments.internal",
///     "Direction": "Outgoing"
/// }"#).unwrap();
///
/// assert_eq!(route.route_id, "payments");
/// assert_eq!(route.direction, Direction::Outgoing);
/// assert!(route.transformations.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RouteDefinition {
    /// Unique route identifier, used in logs and metrics.
    pub route_id: String,

    /// Human description.
    #[serde(default)]
    pub description: String,

    /// Path template. May contain `{name}` placeholders or a trailing
    /// `{**name}` catch-all.
    pub match_path: String,

    /// Destination prefix handed to the forwarding layer. Opaque here.
    #[serde(default)]
    pub destination_prefix: String,

    /// Informational direction tag.
    #[serde(default)]
    pub direction: Direction,

    /// Request rules, applied in order.
    #[serde(default)]
    pub transformations: Vec<TransformationRule>,

    /// Response rules, applied in order.
    #[serde(default)]
    pub response_transformations: Vec<TransformationRule>,
}

impl RouteDefinition {
    /// Creates a route with no rules.
    #[must_use]
    pub fn new(route_id: impl Into<String>, match_path: impl Into<String>) -> Self {
        Self {
            route_id: route_id.into(),
            description: String::new(),
            match_path: match_path.into(),
            destination_prefix: String::new(),
            direction: Direction::Incoming,
            transformations: Vec::new(),
            response_transformations: Vec::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the destination prefix.
    #[must_use]
    pub fn with_destination(mut self, destination_prefix: impl Into<String>) -> Self {
        self.destination_prefix = destination_prefix.into();
        self
    }

    /// Sets the direction tag.
    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Appends a request rule.
    #[must_use]
    pub fn with_request_rule(mut self, rule: TransformationRule) -> Self {
        self.transformations.push(rule);
        self
    }

    /// Appends a response rule.
    #[must_use]
    pub fn with_response_rule(mut self, rule: TransformationRule) -> Self {
        self.response_transformations.push(rule);
        self
    }

    /// Returns true if the route carries at least one response rule.
    #[must_use]
    pub fn has_response_rules(&self) -> bool {
        !self.response_transformations.is_empty()
    }
}
