//! Pipeline stages.
//!
//! The four stages run in a fixed order and cannot be reordered.
//!
//! ## Pre-Handler Stages (1-3)
//!
//! 1. [`correlation_id`] - Generate/propagate the correlation id
//! 2. [`exchange_logging`] - Log request and response summaries
//! 3. [`request_transform`] - Resolve the route and apply request rules
//!
//! ## Post-Handler Stage (4)
//!
//! 4. [`response_transform`] - Capture the forwarded response and apply response rules

pub mod correlation_id;
pub mod exchange_logging;
pub mod request_transform;
pub mod response_transform;

// Re-export main types
pub use correlation_id::{CorrelationIdMiddleware, CORRELATION_ID_HEADER};
pub use exchange_logging::ExchangeLoggingMiddleware;
pub use request_transform::RequestTransformMiddleware;
pub use response_transform::ResponseTransformMiddleware;
