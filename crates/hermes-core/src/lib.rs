//! # Hermes Core
//!
//! Core types shared by every Hermes crate:
//!
//! - [`CorrelationId`] - UUID v7 identifier threaded through both pipelines
//! - [`RouteDefinition`] - An immutable route table entry
//! - [`TransformationRule`] - The closed set of request/response mutation rules
//! - [`HermesError`] - Fatal vs recoverable pipeline outcomes

#![doc(html_root_url = "https://docs.rs/hermes-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod route;
mod rule;

pub use context::CorrelationId;
pub use error::{HermesError, HermesResult, Severity};
pub use route::{Direction, RouteDefinition};
pub use rule::{RulePhase, TransformationRule};
