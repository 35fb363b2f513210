//! # Hermes Middleware
//!
//! The request/response transformation pipeline of the Hermes gateway.
//!
//! ## Pipeline Stages
//!
//! ```text
//! Request → CorrelationId → ExchangeLogging → RequestTransform ─┐
//!                                                                ↓
//!                                             ResponseTransform → Forwarder
//!                                                                ↓
//! Response ← CorrelationId ← ExchangeLogging ← RequestTransform ←┘
//! ```
//!
//! | Stage | Middleware         | Purpose                                         |
//! |-------|--------------------|-------------------------------------------------|
//! | 1     | Correlation ID     | Generate/propagate the correlation id (UUID v7) |
//! | 2     | Exchange Logging   | Log request and response summaries              |
//! | 3     | Request Transform  | Resolve the route, apply request rules, abort on a missing required header |
//! | 4     | Response Transform | Capture the forwarded response, apply response rules |
//!
//! A request whose path matches no route passes through every stage
//! unchanged. Only a missing required header stops a request; every
//! other rule failure is logged and skipped.
//!
//! ## Example
//!
//! ```ignore
//! use hermes_middleware::stages::*;
//!
//! let pipeline = Pipeline::builder()
//!     .add_pre_handler_stage(CorrelationIdMiddleware::new())
//!     .add_pre_handler_stage(ExchangeLoggingMiddleware::new())
//!     .add_pre_handler_stage(RequestTransformMiddleware::new(routes.clone(), limit))
//!     .add_post_handler_stage(ResponseTransformMiddleware::new(routes, limit))
//!     .build();
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod body;
pub mod context;
pub mod middleware;
pub mod pipeline;
pub mod query;
mod rules;
pub mod stages;
pub mod types;

// Re-export main types at crate root
pub use body::{BufferedBody, OversizedBody};
pub use context::MiddlewareContext;
pub use middleware::{BoxFuture, Middleware, Next};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use query::QueryParams;
pub use types::{Request, Response, ResponseExt};
