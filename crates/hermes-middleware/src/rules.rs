//! Rule application shared by the transform stages.
//!
//! Each function applies exactly one rule and reports the outcome;
//! logging and metrics for that outcome happen in [`RuleScope::record`].

use hermes_core::{CorrelationId, HermesError, HermesResult, RulePhase, TransformationRule};
use hermes_json::MutationError;
use hermes_telemetry::metrics::{RULES_APPLIED_TOTAL, RULE_FAILURES_TOTAL};
use http::header::{HeaderName, HeaderValue};
use http::request::Parts;
use http::uri::{PathAndQuery, Uri};

use crate::body::BufferedBody;
use crate::query::QueryParams;

/// What happened when a rule was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Applied {
    /// The rule rewrote something.
    Changed,
    /// The rule ran and left everything as it was.
    Unchanged,
    /// The rule does not apply in this phase, or its type is unknown.
    Unsupported,
}

/// Identifies the request and route a rule runs for.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RuleScope<'a> {
    pub(crate) phase: RulePhase,
    pub(crate) route_id: &'a str,
    pub(crate) correlation_id: CorrelationId,
}

impl RuleScope<'_> {
    /// Logs and counts the outcome of one rule.
    pub(crate) fn record(&self, rule: &TransformationRule, outcome: &HermesResult<Applied>) {
        let phase = self.phase.as_str();
        let label = rule.metric_label();

        match outcome {
            Ok(Applied::Unsupported) => {
                tracing::warn!(
                    correlation_id = %self.correlation_id,
                    route_id = self.route_id,
                    rule_type = rule.rule_type(),
                    phase,
                    "Unknown transformation type, skipping"
                );
            }
            Ok(applied) => {
                tracing::debug!(
                    correlation_id = %self.correlation_id,
                    route_id = self.route_id,
                    rule_type = label,
                    phase,
                    changed = *applied == Applied::Changed,
                    "Applied transformation"
                );
                metrics::counter!(RULES_APPLIED_TOTAL, "phase" => phase, "rule_type" => label)
                    .increment(1);
            }
            Err(error) if error.is_fatal() => {
                tracing::warn!(
                    correlation_id = %self.correlation_id,
                    route_id = self.route_id,
                    rule_type = label,
                    error = %error,
                    "Request rejected"
                );
            }
            Err(error) => {
                tracing::error!(
                    correlation_id = %self.correlation_id,
                    route_id = self.route_id,
                    rule_type = label,
                    phase,
                    error = %error,
                    "Transformation failed, continuing with next rule"
                );
                metrics::counter!(RULE_FAILURES_TOTAL, "phase" => phase, "rule_type" => label)
                    .increment(1);
            }
        }
    }
}

fn failed(rule: &TransformationRule, reason: impl Into<String>) -> HermesError {
    HermesError::rule_failed(rule.metric_label(), reason)
}

/// Runs a text mutation over a buffered body.
///
/// Absent, blank and unchanged bodies are left alone.
fn rewrite_body<F>(
    rule: &TransformationRule,
    body: Option<&mut BufferedBody>,
    mutate: F,
) -> HermesResult<Applied>
where
    F: FnOnce(&str) -> Result<String, MutationError>,
{
    let Some(body) = body else {
        return Ok(Applied::Unchanged);
    };
    if body.is_blank() {
        return Ok(Applied::Unchanged);
    }

    let text = body
        .as_text()
        .ok_or_else(|| failed(rule, "body is not valid UTF-8"))?;
    let output = mutate(text).map_err(|error| failed(rule, error.to_string()))?;
    if output == text {
        return Ok(Applied::Unchanged);
    }

    body.replace(output);
    Ok(Applied::Changed)
}

fn set_query_param(parts: &mut Parts, name: &str, value: &str) -> Result<(), String> {
    let mut params = QueryParams::parse(parts.uri.query().unwrap_or_default());
    params.set(name, value);

    let path_and_query = PathAndQuery::try_from(format!("{}?{params}", parts.uri.path()))
        .map_err(|error| error.to_string())?;
    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.path_and_query = Some(path_and_query);
    parts.uri = Uri::from_parts(uri_parts).map_err(|error| error.to_string())?;
    Ok(())
}

/// Applies one request-side rule.
///
/// `body` is `None` when the route has no body rules or the body was too
/// large to buffer.
pub(crate) fn apply_request_rule(
    rule: &TransformationRule,
    parts: &mut Parts,
    body: Option<&mut BufferedBody>,
) -> HermesResult<Applied> {
    match rule {
        TransformationRule::ValidateHeader {
            header_name: Some(name),
            required: true,
        } => {
            if parts.headers.contains_key(name.as_str()) {
                Ok(Applied::Unchanged)
            } else {
                Err(HermesError::missing_header(name.as_str()))
            }
        }
        TransformationRule::ValidateHeader { .. } => Ok(Applied::Unchanged),

        TransformationRule::AddHeader {
            header_name: Some(name),
            header_value: Some(value),
        } => {
            let header = HeaderName::from_bytes(name.as_bytes())
                .map_err(|error| failed(rule, format!("invalid header name '{name}': {error}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|error| failed(rule, format!("invalid value for '{name}': {error}")))?;
            parts.headers.insert(header, value);
            Ok(Applied::Changed)
        }

        TransformationRule::ModifyQueryParam {
            param_name: Some(name),
            param_value: Some(value),
        } => {
            set_query_param(parts, name, value).map_err(|reason| failed(rule, reason))?;
            Ok(Applied::Changed)
        }

        TransformationRule::ModifyJsonBody {
            json_path: Some(path),
            old_value,
            new_value: Some(new_value),
        } => rewrite_body(rule, body, |text| {
            hermes_json::try_modify_value(text, path, old_value.as_deref(), new_value)
        }),

        TransformationRule::MaskSensitiveData { json_paths } if !json_paths.is_empty() => {
            rewrite_body(rule, body, |text| hermes_json::try_mask_fields(text, json_paths))
        }

        TransformationRule::RemoveJsonField {
            field_to_remove: Some(path),
        } => rewrite_body(rule, body, |text| hermes_json::try_remove_field(text, path)),

        TransformationRule::RenameJsonField {
            old_field_name: Some(old_name),
            new_field_name: Some(new_name),
        } => rewrite_body(rule, body, |text| {
            hermes_json::try_rename_field(text, old_name, new_name)
        }),

        TransformationRule::InjectMetadata { .. }
        | TransformationRule::ModifyJsonValue { .. }
        | TransformationRule::Unknown { .. } => Ok(Applied::Unsupported),

        // Recognized request rules with a required field missing.
        _ => Ok(Applied::Unchanged),
    }
}

/// Applies one response-side rule to the captured body.
pub(crate) fn apply_response_rule(
    rule: &TransformationRule,
    body: &mut BufferedBody,
) -> HermesResult<Applied> {
    match rule {
        TransformationRule::InjectMetadata {
            json_path: Some(path),
            metadata,
        } => rewrite_body(rule, Some(body), |text| {
            hermes_json::try_inject_metadata(text, path, metadata)
        }),

        TransformationRule::ModifyJsonValue {
            json_path: Some(path),
            old_value,
            new_value: Some(new_value),
        } => rewrite_body(rule, Some(body), |text| {
            hermes_json::try_modify_value(text, path, old_value.as_deref(), new_value)
        }),

        TransformationRule::InjectMetadata { .. } | TransformationRule::ModifyJsonValue { .. } => {
            Ok(Applied::Unchanged)
        }

        _ => Ok(Applied::Unsupported),
    }
}
