//! Per-request pipeline state.
//!
//! One [`MiddlewareContext`] exists per in-flight request. It is threaded
//! through every stage explicitly and dropped when the request completes.

use hermes_core::{CorrelationId, RouteDefinition};
use std::sync::Arc;
use std::time::Instant;

/// Context that flows through the middleware pipeline.
///
/// # Example
///
/// ```
/// use hermes_core::RouteDefinition;
/// use hermes_middleware::context::MiddlewareContext;
/// use std::sync::Arc;
///
/// let mut ctx = MiddlewareContext::new();
/// assert!(ctx.route().is_none());
///
/// ctx.set_route(Arc::new(RouteDefinition::new("users", "/users/{id}")));
/// assert_eq!(ctx.route_id(), Some("users"));
/// ```
#[derive(Debug)]
pub struct MiddlewareContext {
    /// Identifier shared by both pipelines and every log line of this request.
    correlation_id: CorrelationId,

    /// The route resolved for this request, if any.
    route: Option<Arc<RouteDefinition>>,

    /// When the request started processing.
    started_at: Instant,
}

impl MiddlewareContext {
    /// Creates a new context with a fresh correlation id.
    #[must_use]
    pub fn new() -> Self {
        Self::with_correlation_id(CorrelationId::new())
    }

    /// Creates a context with a specific correlation id.
    #[must_use]
    pub fn with_correlation_id(correlation_id: CorrelationId) -> Self {
        Self {
            correlation_id,
            route: None,
            started_at: Instant::now(),
        }
    }

    /// Returns the correlation id.
    #[must_use]
    pub fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }

    /// Sets the correlation id.
    ///
    /// This should only be called by the correlation id stage.
    pub fn set_correlation_id(&mut self, correlation_id: CorrelationId) {
        self.correlation_id = correlation_id;
    }

    /// Returns the resolved route, if any.
    #[must_use]
    pub fn route(&self) -> Option<&Arc<RouteDefinition>> {
        self.route.as_ref()
    }

    /// Returns the resolved route's id, if any.
    #[must_use]
    pub fn route_id(&self) -> Option<&str> {
        self.route.as_deref().map(|route| route.route_id.as_str())
    }

    /// Records the resolved route.
    pub fn set_route(&mut self, route: Arc<RouteDefinition>) {
        self.route = Some(route);
    }

    /// Returns when the request started processing.
    #[must_use]
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }
}

impl Default for MiddlewareContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context_has_no_route() {
        let ctx = MiddlewareContext::new();
        assert!(ctx.route().is_none());
        assert!(ctx.route_id().is_none());
    }

    #[test]
    fn test_with_correlation_id() {
        let id = CorrelationId::new();
        let ctx = MiddlewareContext::with_correlation_id(id);
        assert_eq!(ctx.correlation_id(), id);
    }

    #[test]
    fn test_set_correlation_id() {
        let mut ctx = MiddlewareContext::new();
        let id = CorrelationId::new();
        ctx.set_correlation_id(id);
        assert_eq!(ctx.correlation_id(), id);
    }

    #[test]
    fn test_elapsed_is_monotonic() {
        let ctx = MiddlewareContext::new();
        let first = ctx.elapsed();
        assert!(ctx.elapsed() >= first);
        assert!(ctx.started_at() <= Instant::now());
    }
}
