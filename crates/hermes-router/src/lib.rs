//! Route resolution for Hermes.
//!
//! A [`RouteTable`] is built once from configuration and answers one
//! question per request: which route, if any, applies to this path?
//!
//! Routes are tried in configuration order and the **first** match wins.
//! There is no specificity ranking: a catch-all listed before a more
//! specific template shadows it.
//!
//! # Pattern kinds
//!
//! | Pattern | Kind | Matches |
//! |---------|------|---------|
//! | `/api/internal/{**rest}` | catch-all | any path starting with `/api/internal/` |
//! | `/api/{id}/details` | template | `/api/42/details`, not `/api/42/43/details` |
//! | `/health` | exact | `/health`, `/HEALTH` |
//!
//! All comparisons are case-insensitive.
//!
//! # Example
//!
//! ```rust
//! use hermes_core::{Direction, RouteDefinition};
//! use hermes_router::RouteTable;
//!
//! let table = RouteTable::new(vec![
//!     RouteDefinition::new("internal", "/api/internal/{**rest}"),
//!     RouteDefinition::new("details", "/api/{id}/details").with_direction(Direction::Outgoing),
//! ])
//! .unwrap();
//!
//! assert_eq!(table.resolve("/api/internal/a/b").unwrap().route_id, "internal");
//! assert!(table.is_outgoing("/api/42/details"));
//! assert!(table.resolve("/api/external/x").is_none());
//! ```

mod pattern;
mod table;

pub use pattern::{PatternError, RoutePattern};
pub use table::{RouteTable, RouteTableError};
