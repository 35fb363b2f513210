//! Correlation id middleware.
//!
//! Every request gets one correlation id, shared by both pipelines and every
//! log line about the request.
//!
//! ## Sources
//!
//! 1. **X-Correlation-ID header**: used when trusted and a valid UUID
//! 2. **Generated UUID v7**: otherwise
//!
//! The id is stored in the [`MiddlewareContext`], inserted into the request's
//! extensions for the forwarder, and echoed on the response.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response};
use hermes_core::CorrelationId;
use http::header::HeaderValue;

/// The header name for correlation id propagation.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Middleware that generates or propagates correlation ids.
///
/// # Example
///
/// ```ignore
/// use hermes_middleware::stages::CorrelationIdMiddleware;
///
/// let edge = CorrelationIdMiddleware::new();
/// let internal = CorrelationIdMiddleware::trust_incoming();
/// ```
#[derive(Debug, Clone, Default)]
pub struct CorrelationIdMiddleware {
    /// Whether to reuse an incoming `X-Correlation-ID` header.
    trust_incoming: bool,
}

impl CorrelationIdMiddleware {
    /// Creates a middleware that always generates a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a middleware that reuses valid incoming ids.
    #[must_use]
    pub fn trust_incoming() -> Self {
        Self {
            trust_incoming: true,
        }
    }

    fn extract(&self, request: &Request) -> Option<CorrelationId> {
        if !self.trust_incoming {
            return None;
        }

        request
            .headers()
            .get(CORRELATION_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(CorrelationId::parse)
    }
}

impl Middleware for CorrelationIdMiddleware {
    fn name(&self) -> &'static str {
        "correlation_id"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        mut request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let correlation_id = self.extract(&request).unwrap_or_else(CorrelationId::new);
            ctx.set_correlation_id(correlation_id);
            request.extensions_mut().insert(correlation_id);

            let mut response = next.run(ctx, request).await;

            if let Ok(value) = HeaderValue::from_str(&correlation_id.to_string()) {
                response.headers_mut().insert(CORRELATION_ID_HEADER, value);
            }
            response
        })
    }
}
