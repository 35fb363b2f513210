//! Metric definitions for Hermes.
//!
//! Counters are emitted through the `metrics` facade. No exporter is
//! installed here; the host picks one, and without one every counter is a
//! no-op.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `hermes_route_matches_total` | Counter | `route_id` | Requests that resolved to a route |
//! | `hermes_rules_applied_total` | Counter | `phase`, `rule_type` | Rules that ran without error |
//! | `hermes_rule_failures_total` | Counter | `phase`, `rule_type` | Rules that failed and were skipped |
//! | `hermes_requests_aborted_total` | Counter | `route_id` | Requests rejected by header validation |

use metrics::{describe_counter, Unit};

/// Requests that resolved to a route.
pub const ROUTE_MATCHES_TOTAL: &str = "hermes_route_matches_total";

/// Rules that ran without error.
pub const RULES_APPLIED_TOTAL: &str = "hermes_rules_applied_total";

/// Rules that failed and were skipped.
pub const RULE_FAILURES_TOTAL: &str = "hermes_rule_failures_total";

/// Requests rejected by header validation.
pub const REQUESTS_ABORTED_TOTAL: &str = "hermes_requests_aborted_total";

/// Registers descriptions of the standard metrics with the installed recorder.
///
/// Call once after installing an exporter.
pub fn describe_metrics() {
    describe_counter!(
        ROUTE_MATCHES_TOTAL,
        Unit::Count,
        "Requests that resolved to a route"
    );
    describe_counter!(
        RULES_APPLIED_TOTAL,
        Unit::Count,
        "Transformation rules that ran without error"
    );
    describe_counter!(
        RULE_FAILURES_TOTAL,
        Unit::Count,
        "Transformation rules that failed and were skipped"
    );
    describe_counter!(
        REQUESTS_ABORTED_TOTAL,
        Unit::Count,
        "Requests rejected by a missing required header"
    );
}
