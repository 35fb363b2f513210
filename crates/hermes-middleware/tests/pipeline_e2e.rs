//! End-to-end pipeline integration tests.
//!
//! These tests run all four stages together in their fixed order:
//!
//! 1. Correlation ID - Generate/propagate the correlation id
//! 2. Exchange Logging - Request/response summaries
//! 3. Request Transform - Route resolution and request rules
//! 4. Response Transform - Response rules over the forwarded response

use bytes::Bytes;
use hermes_core::{CorrelationId, RouteDefinition, TransformationRule};
use hermes_middleware::{
    context::MiddlewareContext,
    pipeline::Pipeline,
    stages::{
        CorrelationIdMiddleware, ExchangeLoggingMiddleware, RequestTransformMiddleware,
        ResponseTransformMiddleware, CORRELATION_ID_HEADER,
    },
    BoxFuture, Request, Response,
};
use hermes_router::RouteTable;
use http::header::CONTENT_LENGTH;
use http::{Request as HttpRequest, Response as HttpResponse, StatusCode};
use http_body_util::{BodyExt, Full};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

const LIMIT: usize = 1024 * 1024;

/// What the forwarding handler received.
#[derive(Debug, Clone)]
struct Forwarded {
    uri: String,
    headers: http::HeaderMap,
    body: Bytes,
    correlation_id: Option<CorrelationId>,
}

type Captured = Arc<Mutex<Vec<Forwarded>>>;

fn rule(value: Value) -> TransformationRule {
    serde_json::from_value(value).unwrap()
}

fn pipeline(routes: Vec<RouteDefinition>) -> Pipeline {
    let routes = Arc::new(RouteTable::new(routes).unwrap());
    Pipeline::builder()
        .add_pre_handler_stage(CorrelationIdMiddleware::trust_incoming())
        .add_pre_handler_stage(ExchangeLoggingMiddleware::new())
        .add_pre_handler_stage(RequestTransformMiddleware::new(routes.clone(), LIMIT))
        .add_post_handler_stage(ResponseTransformMiddleware::new(routes, LIMIT))
        .build()
}

/// A forwarder that records the request and answers with `upstream`.
fn forwarder(
    captured: &Captured,
    upstream: &'static str,
) -> impl FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'static {
    let captured = captured.clone();
    move |_ctx: &mut MiddlewareContext, request: Request| -> BoxFuture<'static, Response> {
        Box::pin(async move {
            let correlation_id = request.extensions().get::<CorrelationId>().copied();
            let (parts, body) = request.into_parts();
            let body = body.collect().await.unwrap().to_bytes();
            captured.lock().unwrap().push(Forwarded {
                uri: parts.uri.to_string(),
                headers: parts.headers,
                body,
                correlation_id,
            });

            HttpResponse::builder()
                .status(StatusCode::OK)
                .header("content-type", "application/json")
                .header(CONTENT_LENGTH, upstream.len())
                .body(Full::new(Bytes::from_static(upstream.as_bytes())))
                .unwrap()
        })
    }
}

fn post(uri: &str, body: &'static str) -> Request {
    HttpRequest::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header(CONTENT_LENGTH, body.len())
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn secure_route() -> RouteDefinition {
    RouteDefinition::new("secure", "/api/secure/{**rest}")
        .with_request_rule(rule(json!({"Type": "ValidateHeader", "HeaderName": "X-Api-Key", "Required": true})))
        .with_request_rule(rule(json!({"Type": "AddHeader", "HeaderName": "X-Gateway", "HeaderValue": "hermes"})))
}

#[tokio::test]
async fn test_missing_required_header_aborts_without_forwarding() {
    let captured = Captured::default();
    let response = pipeline(vec![secure_route()])
        .process(
            MiddlewareContext::new(),
            post("/api/secure/data", "{}"),
            forwarder(&captured, "{}"),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().contains_key(CORRELATION_ID_HEADER));
    assert!(captured.lock().unwrap().is_empty());

    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "MISSING_REQUIRED_HEADER");
}

#[tokio::test]
async fn test_present_header_runs_remaining_rules() {
    let captured = Captured::default();
    let mut request = post("/api/secure/data", "{}");
    request
        .headers_mut()
        .insert("x-api-key", "k".parse().unwrap());

    let response = pipeline(vec![secure_route()])
        .process(MiddlewareContext::new(), request, forwarder(&captured, "{}"))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let forwarded = captured.lock().unwrap();
    assert_eq!(forwarded.len(), 1);
    assert_eq!(forwarded[0].headers["x-gateway"], "hermes");
}

#[tokio::test]
async fn test_failing_rule_does_not_stop_the_others() {
    let route = RouteDefinition::new("users", "/api/users/{id}")
        .with_request_rule(rule(json!({"Type": "MaskSensitiveData", "JsonPaths": ["$.ssn"]})))
        .with_request_rule(rule(json!({"Type": "ModifyJsonBody", "JsonPath": "$.nothing.here", "NewValue": "x"})))
        .with_request_rule(rule(json!({"Type": "RenameJsonField", "OldFieldName": "fullName", "NewFieldName": "name"})));

    let captured = Captured::default();
    pipeline(vec![route])
        .process(
            MiddlewareContext::new(),
            post("/api/users/9", r#"{"ssn":"123456789","fullName":"Ada"}"#),
            forwarder(&captured, "{}"),
        )
        .await;

    let forwarded = captured.lock().unwrap();
    let body: Value = serde_json::from_slice(&forwarded[0].body).unwrap();
    assert_eq!(body, json!({"ssn": "*******89", "name": "Ada"}));
    assert_eq!(
        forwarded[0].headers[CONTENT_LENGTH],
        forwarded[0].body.len().to_string().as_str()
    );
}

#[tokio::test]
async fn test_response_timestamp_is_real_time() {
    let route = RouteDefinition::new("orders", "/api/orders").with_response_rule(rule(json!({
        "Type": "InjectMetadata",
        "JsonPath": "$",
        "Metadata": {"ts": "{{timestamp}}", "source": "hermes"}
    })));

    let captured = Captured::default();
    let before = chrono::Utc::now();
    let response = pipeline(vec![route])
        .process(
            MiddlewareContext::new(),
            post("/api/orders", "{}"),
            forwarder(&captured, r#"{"id":1}"#),
        )
        .await;

    let body = json_body(response).await;
    assert_eq!(body["id"], 1);
    assert_eq!(body["source"], "hermes");

    let ts = body["ts"].as_str().unwrap();
    assert_ne!(ts, "{{timestamp}}");
    let ts = chrono::DateTime::parse_from_rfc3339(ts).unwrap();
    assert!(ts >= before - chrono::Duration::seconds(1));
}

#[tokio::test]
async fn test_unmatched_route_is_untouched() {
    let captured = Captured::default();
    let response = pipeline(vec![secure_route()])
        .process(
            MiddlewareContext::new(),
            post("/public/ping?x=%20y", r#"{ "a" : 1 }"#),
            forwarder(&captured, r#"{ "pong" : true }"#),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(body, Bytes::from_static(br#"{ "pong" : true }"#));

    let forwarded = captured.lock().unwrap();
    assert_eq!(forwarded[0].uri, "/public/ping?x=%20y");
    assert_eq!(forwarded[0].body, Bytes::from_static(br#"{ "a" : 1 }"#));
}

#[tokio::test]
async fn test_query_param_is_rewritten() {
    let route = RouteDefinition::new("search", "/api/search")
        .with_request_rule(rule(json!({"Type": "ModifyQueryParam", "ParamName": "api-version", "ParamValue": "2024-01"})));

    let captured = Captured::default();
    pipeline(vec![route])
        .process(
            MiddlewareContext::new(),
            post("/api/search?q=rust&api-version=2019", ""),
            forwarder(&captured, "{}"),
        )
        .await;

    let forwarded = captured.lock().unwrap();
    assert_eq!(forwarded[0].uri, "/api/search?q=rust&api-version=2024-01");
}

#[tokio::test]
async fn test_correlation_id_reaches_forwarder_and_response() {
    let incoming = "01890a5d-ac96-774b-bcce-b302099a8057";
    let mut request = post("/anything", "");
    request
        .headers_mut()
        .insert(CORRELATION_ID_HEADER, incoming.parse().unwrap());

    let captured = Captured::default();
    let response = pipeline(Vec::new())
        .process(MiddlewareContext::new(), request, forwarder(&captured, "{}"))
        .await;

    assert_eq!(response.headers()[CORRELATION_ID_HEADER], incoming);
    let forwarded = captured.lock().unwrap();
    assert_eq!(
        forwarded[0].correlation_id.map(|id| id.to_string()).as_deref(),
        Some(incoming)
    );
}

#[tokio::test]
async fn test_concurrent_requests_are_independent() {
    let pipeline = Arc::new(pipeline(vec![secure_route()]));
    let captured = Captured::default();

    let mut handles = Vec::new();
    for i in 0..16 {
        let pipeline = pipeline.clone();
        let captured = captured.clone();
        handles.push(tokio::spawn(async move {
            let mut request = post("/api/secure/x", "{}");
            if i % 2 == 0 {
                request.headers_mut().insert("x-api-key", "k".parse().unwrap());
            }
            pipeline
                .process(MiddlewareContext::new(), request, forwarder(&captured, "{}"))
                .await
                .status()
        }));
    }

    let mut ok = 0;
    for handle in handles {
        if handle.await.unwrap() == StatusCode::OK {
            ok += 1;
        }
    }
    assert_eq!(ok, 8);
    assert_eq!(captured.lock().unwrap().len(), 8);
}
