//! The boundary to the forwarding layer.

use hermes_core::{CorrelationId, Direction};
use hermes_middleware::{BoxFuture, Request, Response};

/// A transformed request ready to leave the gateway.
#[derive(Debug)]
pub struct ForwardRequest {
    /// Destination prefix of the resolved route, `None` for unmatched
    /// requests. Hermes does not interpret it.
    pub destination_prefix: Option<String>,

    /// Direction tag of the resolved route.
    pub direction: Option<Direction>,

    /// Correlation id of the request. Also present in the request's
    /// extensions.
    pub correlation_id: CorrelationId,

    /// The request after request rules ran.
    pub request: Request,
}

/// Sends transformed requests on and returns the downstream response.
///
/// Timeouts, retries and cancellation belong to the implementation. When
/// the returned future is dropped, no response rules run.
///
/// Any `Fn(ForwardRequest) -> BoxFuture<'static, Response>` closure is a
/// forwarder.
pub trait Forwarder: Send + Sync + 'static {
    /// Forwards one request.
    fn forward(&self, request: ForwardRequest) -> BoxFuture<'static, Response>;
}

impl<F> Forwarder for F
where
    F: Fn(ForwardRequest) -> BoxFuture<'static, Response> + Send + Sync + 'static,
{
    fn forward(&self, request: ForwardRequest) -> BoxFuture<'static, Response> {
        self(request)
    }
}
