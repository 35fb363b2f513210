//! The route table.

use std::sync::Arc;

use hermes_core::{Direction, RouteDefinition};
use thiserror::Error;

use crate::pattern::{PatternError, RoutePattern};

/// Errors building a [`RouteTable`].
#[derive(Debug, Error)]
pub enum RouteTableError {
    /// A route's pattern failed to compile.
    #[error("route '{route_id}': {source}")]
    InvalidPattern {
        /// The route carrying the pattern.
        route_id: String,
        /// Compilation failure.
        #[source]
        source: PatternError,
    },
}

#[derive(Debug)]
struct Entry {
    pattern: RoutePattern,
    route: Arc<RouteDefinition>,
}

/// An immutable, ordered list of routes.
///
/// Lookups are a linear scan in configuration order. The table holds no
/// interior mutability, so a single instance can be shared across threads
/// behind an [`Arc`] without locking.
#[derive(Debug, Default)]
pub struct RouteTable {
    entries: Vec<Entry>,
}

impl RouteTable {
    /// Compiles every route pattern, keeping configuration order.
    ///
    /// # Errors
    ///
    /// Returns [`RouteTableError::InvalidPattern`] for the first route whose
    /// pattern cannot be compiled.
    pub fn new(routes: Vec<RouteDefinition>) -> Result<Self, RouteTableError> {
        let entries = routes
            .into_iter()
            .map(|route| {
                let pattern = RoutePattern::compile(&route.match_path).map_err(|source| {
                    RouteTableError::InvalidPattern {
                        route_id: route.route_id.clone(),
                        source,
                    }
                })?;
                tracing::debug!(
                    route_id = %route.route_id,
                    match_path = %route.match_path,
                    kind = pattern.kind(),
                    "Registered route"
                );
                Ok(Entry {
                    pattern,
                    route: Arc::new(route),
                })
            })
            .collect::<Result<Vec<_>, RouteTableError>>()?;

        Ok(Self { entries })
    }

    /// Returns the first route whose pattern matches `path`.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<&Arc<RouteDefinition>> {
        self.entries
            .iter()
            .find(|entry| entry.pattern.matches(path))
            .map(|entry| &entry.route)
    }

    /// Returns true if `path` resolves to an `Incoming` route.
    #[must_use]
    pub fn is_incoming(&self, path: &str) -> bool {
        self.direction_of(path) == Some(Direction::Incoming)
    }

    /// Returns true if `path` resolves to an `Outgoing` route.
    #[must_use]
    pub fn is_outgoing(&self, path: &str) -> bool {
        self.direction_of(path) == Some(Direction::Outgoing)
    }

    fn direction_of(&self, path: &str) -> Option<Direction> {
        self.resolve(path).map(|route| route.direction)
    }

    /// Returns the routes in table order.
    pub fn routes(&self) -> impl Iterator<Item = &RouteDefinition> {
        self.entries.iter().map(|entry| entry.route.as_ref())
    }

    /// Returns the number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no routes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
