//! Fixed-order middleware pipeline.
//!
//! The pipeline consists of 4 stages in a fixed order:
//!
//! 1. **Correlation ID** - Generate or propagate the correlation id (UUID v7)
//! 2. **Exchange Logging** - Log the request and the final response
//! 3. **Request Transform** - Resolve the route and apply request rules
//! 4. **Response Transform** - Apply response rules to the forwarded response
//!
//! Stages 1-3 run before the forwarding handler and stage 4 wraps it
//! directly, so request rules always run before response rules.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response};
use std::sync::Arc;

/// A type-erased middleware that can be stored in a vector.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// An immutable chain of stages ending in a handler.
///
/// # Example
///
/// ```ignore
/// use hermes_middleware::pipeline::Pipeline;
/// use hermes_middleware::stages::{CorrelationIdMiddleware, ResponseTransformMiddleware};
///
/// let pipeline = Pipeline::builder()
///     .add_pre_handler_stage(CorrelationIdMiddleware::new())
///     .add_post_handler_stage(ResponseTransformMiddleware::new(routes, limit))
///     .build();
///
/// let response = pipeline.process(MiddlewareContext::new(), request, forward).await;
/// ```
pub struct Pipeline {
    /// Stages that run before the handler (stages 1-3).
    pre_handler_stages: Vec<BoxedMiddleware>,

    /// Stages that wrap the handler directly (stage 4).
    post_handler_stages: Vec<BoxedMiddleware>,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Processes a request through every stage and the handler.
    pub async fn process<H>(&self, mut ctx: MiddlewareContext, request: Request, handler: H) -> Response
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'static,
    {
        let next = self.build_chain(handler);
        next.run(&mut ctx, request).await
    }

    fn build_chain<'a, H>(&'a self, handler: H) -> Next<'a>
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'a,
    {
        let mut next = Next::handler(handler);

        for middleware in self.post_handler_stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }

        for middleware in self.pre_handler_stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }

        next
    }

    /// Returns the names of all stages in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.pre_handler_stages
            .iter()
            .chain(&self.post_handler_stages)
            .map(|mw| mw.name())
            .collect()
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.pre_handler_stages.len() + self.post_handler_stages.len()
    }
}

/// Builder for constructing a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    pre_handler_stages: Vec<BoxedMiddleware>,
    post_handler_stages: Vec<BoxedMiddleware>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a stage that runs before the handler.
    #[must_use]
    pub fn add_pre_handler_stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.pre_handler_stages.push(Arc::new(middleware));
        self
    }

    /// Adds a stage that wraps the handler.
    #[must_use]
    pub fn add_post_handler_stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.post_handler_stages.push(Arc::new(middleware));
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            pre_handler_stages: self.pre_handler_stages,
            post_handler_stages: self.post_handler_stages,
        }
    }
}
