//! Pipeline assembly.

use std::sync::Arc;

use hermes_config::{ConfigError, GatewaySettings, HermesConfig};
use hermes_core::RouteDefinition;
use hermes_middleware::stages::{
    CorrelationIdMiddleware, ExchangeLoggingMiddleware, RequestTransformMiddleware,
    ResponseTransformMiddleware,
};
use hermes_middleware::{MiddlewareContext, Pipeline, Request, Response};
use hermes_router::{RouteTable, RouteTableError};
use hermes_telemetry::{init_logging, metrics::describe_metrics, LogConfig, TelemetryResult};
use thiserror::Error;

use crate::forward::{ForwardRequest, Forwarder};

/// Errors raised while building a [`Gateway`].
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A route pattern did not compile.
    #[error(transparent)]
    Routes(#[from] RouteTableError),
}

/// The assembled transformation pipeline.
///
/// Built once at startup and shared across requests; the route table is
/// immutable for the lifetime of the gateway.
///
/// # Example
///
/// ```rust,ignore
/// use hermes::{ConfigLoader, Gateway};
///
/// let config = ConfigLoader::new().with_file("hermes.toml")?.load()?;
/// let gateway = Gateway::from_config(&config)?;
///
/// let response = gateway.handle(request, forwarder.clone()).await;
/// ```
pub struct Gateway {
    routes: Arc<RouteTable>,
    pipeline: Pipeline,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("routes", &self.routes.len())
            .field("stages", &self.pipeline.stage_names())
            .finish()
    }
}

impl Gateway {
    /// Builds a gateway from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Config` if the configuration is invalid and
    /// `GatewayError::Routes` if a match pattern does not compile.
    pub fn from_config(config: &HermesConfig) -> Result<Self, GatewayError> {
        config.validate()?;
        Self::new(config.routes.clone(), &config.gateway)
    }

    /// Builds a gateway from routes and settings.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Routes` if a match pattern does not compile.
    pub fn new(
        routes: Vec<RouteDefinition>,
        settings: &GatewaySettings,
    ) -> Result<Self, GatewayError> {
        let routes = Arc::new(RouteTable::new(routes)?);

        let correlation = if settings.trust_incoming_correlation_id {
            CorrelationIdMiddleware::trust_incoming()
        } else {
            CorrelationIdMiddleware::new()
        };
        let logging = if settings.log_bodies {
            ExchangeLoggingMiddleware::with_bodies()
        } else {
            ExchangeLoggingMiddleware::new()
        };

        let pipeline = Pipeline::builder()
            .add_pre_handler_stage(correlation)
            .add_pre_handler_stage(logging)
            .add_pre_handler_stage(RequestTransformMiddleware::new(
                routes.clone(),
                settings.max_body_bytes,
            ))
            .add_post_handler_stage(ResponseTransformMiddleware::new(
                routes.clone(),
                settings.max_body_bytes,
            ))
            .build();

        tracing::info!(
            routes = routes.len(),
            stages = ?pipeline.stage_names(),
            "Gateway ready"
        );

        Ok(Self { routes, pipeline })
    }

    /// Returns the route table.
    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Returns the names of the pipeline stages in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.pipeline.stage_names()
    }

    /// Runs one request through both pipelines and the forwarder.
    ///
    /// Never fails: an aborted request comes back as a `400` response that
    /// was never forwarded.
    pub async fn handle<F: Forwarder>(&self, request: Request, forwarder: Arc<F>) -> Response {
        self.pipeline
            .process(MiddlewareContext::new(), request, move |ctx, request| {
                let route = ctx.route();
                forwarder.forward(ForwardRequest {
                    destination_prefix: route.map(|r| r.destination_prefix.clone()),
                    direction: route.map(|r| r.direction),
                    correlation_id: ctx.correlation_id(),
                    request,
                })
            })
            .await
    }
}

/// Installs the global subscriber from the `[logging]` section and
/// describes the standard metrics.
///
/// A non-blank `HERMES_LOG` variable overrides the configured level.
///
/// # Errors
///
/// Returns an error if the level directive is invalid or a subscriber is
/// already installed.
pub fn init_telemetry(config: &HermesConfig) -> TelemetryResult<()> {
    init_logging(&LogConfig::from(&config.logging).with_env_level())?;
    describe_metrics();
    Ok(())
}
