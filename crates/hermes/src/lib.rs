//! # Hermes
//!
//! **In-path HTTP transformation layer**
//!
//! Hermes sits between a client and a forwarding layer. For each request it
//! resolves a route by path, applies that route's request rules (header
//! validation and injection, query rewriting, JSON body mutation), hands the
//! request to a [`Forwarder`], then applies the route's response rules to
//! whatever comes back.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use hermes::prelude::*;
//!
//! let config = ConfigLoader::new()
//!     .with_file("hermes.toml")?
//!     .with_env_prefix("HERMES")
//!     .load()?;
//! hermes::init_telemetry(&config)?;
//!
//! let gateway = Gateway::from_config(&config)?;
//! let forwarder = Arc::new(|req: ForwardRequest| -> BoxFuture<'static, Response> {
//!     Box::pin(async move { send_upstream(req).await })
//! });
//!
//! let response = gateway.handle(request, forwarder).await;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Request → CorrelationId → ExchangeLogging → RequestTransform ─┐
//!                                                              ↓
//!                                     ResponseTransform → Forwarder
//!                                              ↓
//! Response ←──────────────────────────────────┘
//! ```
//!
//! A failed rule is logged and skipped. The one exception is a missing
//! required header, which stops the request with `400 Bad Request` before
//! anything is forwarded.

#![doc(html_root_url = "https://docs.rs/hermes/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use hermes_config as config;
pub use hermes_core as core;
pub use hermes_json as json;
pub use hermes_middleware as middleware;
pub use hermes_router as router;
pub use hermes_telemetry as telemetry;

mod forward;
mod gateway;

pub use forward::{ForwardRequest, Forwarder};
pub use gateway::{init_telemetry, Gateway, GatewayError};

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use hermes::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{ForwardRequest, Forwarder, Gateway, GatewayError};

    pub use hermes_config::{ConfigError, ConfigLoader, HermesConfig};
    pub use hermes_core::{
        CorrelationId, Direction, HermesError, HermesResult, RouteDefinition, TransformationRule,
    };
    pub use hermes_middleware::{BoxFuture, Request, Response};
}
