//! Request transformation middleware.
//!
//! Resolves the route for the request path and applies the route's request
//! rules in declaration order:
//!
//! 1. No route matches: the request passes through untouched
//! 2. The body is buffered once if any rule reads it
//! 3. Each rule runs; a recoverable failure is logged and skipped
//! 4. A missing required header ends the request with `400` and the rest
//!    of the chain, forwarding included, never runs
//! 5. If a rule rewrote the body, `Content-Length` is set to match it

use crate::body::BufferedBody;
use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::rules::{self, RuleScope};
use crate::types::{Request, Response, ResponseExt};
use hermes_core::RulePhase;
use hermes_router::RouteTable;
use hermes_telemetry::metrics::{REQUESTS_ABORTED_TOTAL, ROUTE_MATCHES_TOTAL};
use std::sync::Arc;

/// Middleware that applies request rules of the resolved route.
#[derive(Debug, Clone)]
pub struct RequestTransformMiddleware {
    routes: Arc<RouteTable>,
    max_body_bytes: usize,
}

impl RequestTransformMiddleware {
    /// Creates the stage over a shared route table.
    ///
    /// Bodies larger than `max_body_bytes` are forwarded without body rules.
    #[must_use]
    pub fn new(routes: Arc<RouteTable>, max_body_bytes: usize) -> Self {
        Self {
            routes,
            max_body_bytes,
        }
    }
}

impl Middleware for RequestTransformMiddleware {
    fn name(&self) -> &'static str {
        "request_transform"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let resolved = self.routes.resolve(request.uri().path()).cloned();
            let Some(route) = resolved else {
                tracing::debug!(
                    correlation_id = %ctx.correlation_id(),
                    path = request.uri().path(),
                    "No matching route, passing through"
                );
                return next.run(ctx, request).await;
            };

            metrics::counter!(ROUTE_MATCHES_TOTAL, "route_id" => route.route_id.clone()).increment(1);
            ctx.set_route(route.clone());

            let scope = RuleScope {
                phase: RulePhase::Request,
                route_id: &route.route_id,
                correlation_id: ctx.correlation_id(),
            };
            tracing::debug!(
                correlation_id = %scope.correlation_id,
                route_id = scope.route_id,
                rules = route.transformations.len(),
                "Matched route"
            );

            let (mut parts, body) = request.into_parts();

            let (mut buffered, passthrough) =
                if route.transformations.iter().any(|rule| rule.touches_body()) {
                    match BufferedBody::collect(body, self.max_body_bytes).await {
                        Ok(body) => (Some(body), None),
                        Err(oversized) => {
                            tracing::warn!(
                                correlation_id = %scope.correlation_id,
                                route_id = scope.route_id,
                                size = oversized.size,
                                limit = oversized.limit,
                                "Request body too large, skipping body rules"
                            );
                            (None, Some(oversized.body))
                        }
                    }
                } else {
                    (None, Some(body))
                };

            for rule in &route.transformations {
                let outcome = rules::apply_request_rule(rule, &mut parts, buffered.as_mut());
                scope.record(rule, &outcome);

                if let Err(error) = outcome {
                    if error.is_fatal() {
                        metrics::counter!(REQUESTS_ABORTED_TOTAL, "route_id" => route.route_id.clone())
                            .increment(1);
                        return Response::json_error(
                            error.status_code(),
                            error.code(),
                            &error.to_string(),
                        );
                    }
                }
            }

            let body = match buffered {
                Some(buffered) => {
                    buffered.sync_content_length(&mut parts.headers);
                    buffered.into_full()
                }
                None => passthrough.unwrap_or_default(),
            };

            next.run(ctx, Request::from_parts(parts, body)).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use hermes_core::{RouteDefinition, TransformationRule};
    use http::header::CONTENT_LENGTH;
    use http::{Request as HttpRequest, Response as HttpResponse, StatusCode};
    use http_body_util::{BodyExt, Full};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    fn rule(value: Value) -> TransformationRule {
        serde_json::from_value(value).unwrap()
    }

    fn stage(routes: Vec<RouteDefinition>, limit: usize) -> RequestTransformMiddleware {
        RequestTransformMiddleware::new(Arc::new(RouteTable::new(routes).unwrap()), limit)
    }

    fn post(uri: &str, body: &'static str) -> Request {
        HttpRequest::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_LENGTH, body.len())
            .body(Full::new(Bytes::from(body)))
            .unwrap()
    }

    /// Runs the stage and returns the response and the request that reached the handler.
    async fn run(stage: &RequestTransformMiddleware, request: Request) -> (MiddlewareContext, Response, Option<(http::request::Parts, Bytes)>) {
        let forwarded = Arc::new(Mutex::new(None));
        let slot = forwarded.clone();
        let next = Next::handler(move |_ctx: &mut MiddlewareContext, req: Request| -> BoxFuture<'static, Response> {
            Box::pin(async move {
                let (parts, body) = req.into_parts();
                let bytes = body.collect().await.unwrap().to_bytes();
                *slot.lock().unwrap() = Some((parts, bytes));
                HttpResponse::new(Full::new(Bytes::new()))
            })
        });

        let mut ctx = MiddlewareContext::new();
        let response = stage.process(&mut ctx, request, next).await;
        let forwarded = forwarded.lock().unwrap().take();
        (ctx, response, forwarded)
    }

    #[tokio::test]
    async fn test_unmatched_path_passes_through() {
        let stage = stage(vec![RouteDefinition::new("orders", "/orders")], 1024);
        let (ctx, response, forwarded) = run(&stage, post("/users?x=1", "{\"a\":1}")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(ctx.route().is_none());
        let (parts, body) = forwarded.unwrap();
        assert_eq!(parts.uri, "/users?x=1");
        assert_eq!(body, Bytes::from("{\"a\":1}"));
    }

    #[tokio::test]
    async fn test_missing_required_header_aborts_before_forwarding() {
        let called = Arc::new(AtomicBool::new(false));
        let flag = called.clone();
        let stage = stage(
            vec![RouteDefinition::new("secure", "/secure/{**rest}").with_request_rule(rule(
                json!({"Type": "ValidateHeader", "HeaderName": "X-Api-Key", "Required": true}),
            ))],
            1024,
        );

        let next = Next::handler(move |_ctx: &mut MiddlewareContext, _req: Request| -> BoxFuture<'static, Response> {
            flag.store(true, Ordering::SeqCst);
            Box::pin(async { HttpResponse::new(Full::new(Bytes::new())) })
        });
        let mut ctx = MiddlewareContext::new();
        let response = stage.process(&mut ctx, post("/secure/data", ""), next).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(!called.load(Ordering::SeqCst));
        let body: Value =
            serde_json::from_slice(&response.into_body().collect().await.unwrap().to_bytes()).unwrap();
        assert_eq!(body["error"]["code"], "MISSING_REQUIRED_HEADER");
    }

    #[tokio::test]
    async fn test_rules_apply_in_order_and_failures_are_isolated() {
        let stage = stage(
            vec![RouteDefinition::new("users", "/users/{id}")
                .with_request_rule(rule(json!({"Type": "AddHeader", "HeaderName": "X-Source", "HeaderValue": "hermes"})))
                .with_request_rule(rule(json!({"Type": "RemoveJsonField", "FieldToRemove": "$.missing"})))
                .with_request_rule(rule(json!({"Type": "MaskSensitiveData", "JsonPaths": ["$.card"]})))
                .with_request_rule(rule(json!({"Type": "ModifyQueryParam", "ParamName": "v", "ParamValue": "2"})))],
            1024,
        );

        let (ctx, _, forwarded) = run(&stage, post("/users/42?v=1", r#"{"card":"4111111111111111"}"#)).await;
        let (parts, body) = forwarded.unwrap();

        assert_eq!(ctx.route_id(), Some("users"));
        assert_eq!(parts.headers["x-source"], "hermes");
        assert_eq!(parts.uri.query(), Some("v=2"));
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({"card": "************1111"}));
    }

    #[tokio::test]
    async fn test_content_length_follows_body() {
        let stage = stage(
            vec![RouteDefinition::new("trim", "/trim")
                .with_request_rule(rule(json!({"Type": "RemoveJsonField", "FieldToRemove": "$.debug"})))],
            1024,
        );

        let (_, _, forwarded) = run(&stage, post("/trim", r#"{"keep":1,"debug":{"trace":"long value"}}"#)).await;
        let (parts, body) = forwarded.unwrap();

        assert_eq!(body, Bytes::from(r#"{"keep":1}"#));
        assert_eq!(parts.headers[CONTENT_LENGTH], body.len().to_string().as_str());
    }

    #[tokio::test]
    async fn test_bodiless_request_gets_no_content_length() {
        let stage = stage(
            vec![RouteDefinition::new("trim", "/trim")
                .with_request_rule(rule(json!({"Type": "RemoveJsonField", "FieldToRemove": "$.debug"})))],
            1024,
        );
        let get = HttpRequest::builder()
            .method("GET")
            .uri("/trim")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let (ctx, _, forwarded) = run(&stage, get).await;
        let (parts, body) = forwarded.unwrap();

        assert_eq!(ctx.route_id(), Some("trim"));
        assert!(body.is_empty());
        assert!(parts.headers.get(CONTENT_LENGTH).is_none());
    }

    #[tokio::test]
    async fn test_oversized_body_skips_body_rules() {
        let stage = stage(
            vec![RouteDefinition::new("trim", "/trim")
                .with_request_rule(rule(json!({"Type": "RemoveJsonField", "FieldToRemove": "$.debug"})))
                .with_request_rule(rule(json!({"Type": "AddHeader", "HeaderName": "X-Seen", "HeaderValue": "1"})))],
            8,
        );

        let original = r#"{"keep":1,"debug":true}"#;
        let (_, _, forwarded) = run(&stage, post("/trim", original)).await;
        let (parts, body) = forwarded.unwrap();

        assert_eq!(body, Bytes::from(original));
        assert_eq!(parts.headers["x-seen"], "1");
    }

    #[test]
    fn test_middleware_name() {
        assert_eq!(stage(Vec::new(), 1).name(), "request_transform");
    }
}
