//! Exchange logging middleware.
//!
//! Logs a summary of each request on the way in and of the final response
//! on the way out:
//!
//! - request: `method`, `path`, `query`, `headers` (names only), `body_bytes`
//! - response: `status_code`, `duration_ms`, `body_bytes`
//!
//! Body contents are logged only at `TRACE` and only when enabled with
//! [`ExchangeLoggingMiddleware::with_bodies`]. Request bodies can hold the
//! values that masking rules hide downstream.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response};
use bytes::Bytes;
use http::HeaderMap;
use http_body::Body;
use http_body_util::{BodyExt, Full};
use tracing::Level;

/// Middleware that logs request and response summaries.
#[derive(Debug, Clone, Default)]
pub struct ExchangeLoggingMiddleware {
    log_bodies: bool,
}

fn header_names(headers: &HeaderMap) -> String {
    headers
        .keys()
        .map(http::HeaderName::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

async fn drain(body: Full<Bytes>) -> Bytes {
    match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(never) => match never {},
    }
}

impl ExchangeLoggingMiddleware {
    /// Creates a middleware that logs summaries only.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a middleware that also logs body contents at `TRACE`.
    #[must_use]
    pub fn with_bodies() -> Self {
        Self { log_bodies: true }
    }

    fn logs_bodies(&self) -> bool {
        self.log_bodies && tracing::enabled!(Level::TRACE)
    }
}

impl Middleware for ExchangeLoggingMiddleware {
    fn name(&self) -> &'static str {
        "exchange_logging"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let correlation_id = ctx.correlation_id();

            tracing::info!(
                correlation_id = %correlation_id,
                method = %request.method(),
                path = request.uri().path(),
                query = request.uri().query().unwrap_or_default(),
                headers = %header_names(request.headers()),
                body_bytes = request.body().size_hint().lower(),
                "Incoming request"
            );

            let request = if self.logs_bodies() {
                let (parts, body) = request.into_parts();
                let bytes = drain(body).await;
                tracing::trace!(
                    correlation_id = %correlation_id,
                    body = %String::from_utf8_lossy(&bytes),
                    "Request body"
                );
                Request::from_parts(parts, Full::new(bytes))
            } else {
                request
            };

            let response = next.run(ctx, request).await;

            tracing::info!(
                correlation_id = %correlation_id,
                route_id = ctx.route_id().unwrap_or("none"),
                status_code = response.status().as_u16(),
                duration_ms = ctx.elapsed().as_secs_f64() * 1000.0,
                body_bytes = response.body().size_hint().lower(),
                "Outgoing response"
            );

            if self.logs_bodies() {
                let (parts, body) = response.into_parts();
                let bytes = drain(body).await;
                tracing::trace!(
                    correlation_id = %correlation_id,
                    body = %String::from_utf8_lossy(&bytes),
                    "Response body"
                );
                return Response::from_parts(parts, Full::new(bytes));
            }
            response
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Request as HttpRequest, Response as HttpResponse, StatusCode};

    fn request(body: &'static str) -> Request {
        HttpRequest::builder()
            .method("POST")
            .uri("/orders?expand=items")
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from(body)))
            .unwrap()
    }

    #[tokio::test]
    async fn test_passes_request_and_response_through() {
        for middleware in [ExchangeLoggingMiddleware::new(), ExchangeLoggingMiddleware::with_bodies()] {
            let mut ctx = MiddlewareContext::new();
            let next = Next::handler(|_ctx: &mut MiddlewareContext, req: Request| -> BoxFuture<'static, Response> {
                Box::pin(async move {
                    let body = drain(req.into_body()).await;
                    assert_eq!(body, Bytes::from("{\"id\":1}"));
                    HttpResponse::builder()
                        .status(StatusCode::CREATED)
                        .body(Full::new(Bytes::from("created")))
                        .unwrap()
                })
            });

            let response = middleware.process(&mut ctx, request("{\"id\":1}"), next).await;
            assert_eq!(response.status(), StatusCode::CREATED);
            assert_eq!(drain(response.into_body()).await, Bytes::from("created"));
        }
    }

    #[test]
    fn test_header_names_only() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer secret".parse().unwrap());
        headers.append("accept", "a".parse().unwrap());
        headers.append("accept", "b".parse().unwrap());

        let names = header_names(&headers);
        assert!(!names.contains("secret"));
        assert_eq!(names.matches("accept").count(), 1);
    }

    #[test]
    fn test_bodies_off_by_default() {
        assert!(!ExchangeLoggingMiddleware::new().logs_bodies());
    }
}
