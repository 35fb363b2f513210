//! Response transformation middleware.
//!
//! Wraps the forwarding call. The forwarded response is always captured
//! into a [`BufferedBody`]; the route is then resolved again for the
//! original path and its response rules run over the captured text, each
//! rule's output feeding the next. Without response rules the captured
//! bytes go back out unchanged.
//!
//! This stage never fails a request. Rule failures are logged and skipped.

use crate::body::BufferedBody;
use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::rules::{self, RuleScope};
use crate::types::{Request, Response};
use hermes_core::RulePhase;
use hermes_router::RouteTable;
use std::sync::Arc;

/// Middleware that applies response rules of the resolved route.
#[derive(Debug, Clone)]
pub struct ResponseTransformMiddleware {
    routes: Arc<RouteTable>,
    max_body_bytes: usize,
}

impl ResponseTransformMiddleware {
    /// Creates the stage over a shared route table.
    ///
    /// Responses larger than `max_body_bytes` are returned untransformed.
    #[must_use]
    pub fn new(routes: Arc<RouteTable>, max_body_bytes: usize) -> Self {
        Self {
            routes,
            max_body_bytes,
        }
    }
}

impl Middleware for ResponseTransformMiddleware {
    fn name(&self) -> &'static str {
        "response_transform"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let path = request.uri().path().to_owned();
            let response = next.run(ctx, request).await;
            let correlation_id = ctx.correlation_id();

            let (mut parts, body) = response.into_parts();
            let mut captured = match BufferedBody::collect(body, self.max_body_bytes).await {
                Ok(captured) => captured,
                Err(oversized) => {
                    tracing::warn!(
                        correlation_id = %correlation_id,
                        size = oversized.size,
                        limit = oversized.limit,
                        "Response body too large, skipping response rules"
                    );
                    return Response::from_parts(parts, oversized.body);
                }
            };

            let Some(route) = self.routes.resolve(&path) else {
                return Response::from_parts(parts, captured.into_full());
            };
            if !route.has_response_rules() {
                return Response::from_parts(parts, captured.into_full());
            }

            if captured.as_text().is_none() {
                tracing::warn!(
                    correlation_id = %correlation_id,
                    route_id = %route.route_id,
                    "Response body is not valid UTF-8, skipping response rules"
                );
                return Response::from_parts(parts, captured.into_full());
            }

            let scope = RuleScope {
                phase: RulePhase::Response,
                route_id: &route.route_id,
                correlation_id,
            };
            for rule in &route.response_transformations {
                let outcome = rules::apply_response_rule(rule, &mut captured);
                scope.record(rule, &outcome);
            }

            captured.sync_content_length(&mut parts.headers);
            Response::from_parts(parts, captured.into_full())
        })
    }
}
