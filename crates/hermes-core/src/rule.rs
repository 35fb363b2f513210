//! Transformation rules.
//!
//! A rule is a closed sum type with one variant per `Type` discriminator.
//! On the wire every rule is a flat object carrying `Type` plus whichever
//! of the optional fields that type reads; the conversion goes through
//! [`RawRule`] so that absent fields turn the rule into a no-op instead of
//! failing deserialization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which pipeline a rule runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RulePhase {
    /// Applied before forwarding.
    Request,
    /// Applied to the forwarded response.
    Response,
}

impl RulePhase {
    /// Returns the phase name used as a metric label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Response => "response",
        }
    }
}

impl std::fmt::Display for RulePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declarative mutation step.
///
/// # Example
///
/// ```
/// use hermes_core::TransformationRule;
///
/// let rule: TransformationRule = serde_json::from_str(
///     r#"{"Type": "RemoveJsonField", "FieldToRemove": "$.secret"}"#,
/// ).unwrap();
///
/// assert_eq!(rule.rule_type(), "RemoveJsonField");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRule", into = "RawRule")]
pub enum TransformationRule {
    /// Abort with 400 when a required header is absent.
    ValidateHeader {
        /// Header to look for.
        header_name: Option<String>,
        /// Whether absence is fatal.
        required: bool,
    },
    /// Set (overwrite) a request header.
    AddHeader {
        /// Header to set.
        header_name: Option<String>,
        /// Value to set.
        header_value: Option<String>,
    },
    /// Conditionally replace values in the request body.
    ModifyJsonBody {
        /// Nodes to replace.
        json_path: Option<String>,
        /// Only replace nodes whose text equals this, when set.
        old_value: Option<String>,
        /// Replacement, always written as a JSON string.
        new_value: Option<String>,
    },
    /// Overwrite or insert a query parameter.
    ModifyQueryParam {
        /// Parameter name.
        param_name: Option<String>,
        /// Parameter value.
        param_value: Option<String>,
    },
    /// Mask string values in the request body.
    MaskSensitiveData {
        /// Paths processed in order.
        json_paths: Vec<String>,
    },
    /// Delete a property from the request body.
    RemoveJsonField {
        /// Path of the property to delete.
        field_to_remove: Option<String>,
    },
    /// Rename a property everywhere in the request body.
    RenameJsonField {
        /// Name to look for at any depth.
        old_field_name: Option<String>,
        /// Replacement name.
        new_field_name: Option<String>,
    },
    /// Merge metadata into response body objects.
    InjectMetadata {
        /// Objects to merge into.
        json_path: Option<String>,
        /// Keys to merge. `"{{timestamp}}"` values are expanded at injection.
        metadata: Map<String, Value>,
    },
    /// Conditionally replace values in the response body.
    ModifyJsonValue {
        /// Nodes to replace.
        json_path: Option<String>,
        /// Only replace nodes whose text equals this, when set.
        old_value: Option<String>,
        /// Replacement, always written as a JSON string.
        new_value: Option<String>,
    },
    /// A `Type` this version does not recognize. Logged and skipped.
    Unknown {
        /// The unrecognized discriminator.
        rule_type: String,
    },
}

impl TransformationRule {
    /// Returns the `Type` discriminator.
    #[must_use]
    pub fn rule_type(&self) -> &str {
        match self {
            Self::ValidateHeader { .. } => "ValidateHeader",
            Self::AddHeader { .. } => "AddHeader",
            Self::ModifyJsonBody { .. } => "ModifyJsonBody",
            Self::ModifyQueryParam { .. } => "ModifyQueryParam",
            Self::MaskSensitiveData { .. } => "MaskSensitiveData",
            Self::RemoveJsonField { .. } => "RemoveJsonField",
            Self::RenameJsonField { .. } => "RenameJsonField",
            Self::InjectMetadata { .. } => "InjectMetadata",
            Self::ModifyJsonValue { .. } => "ModifyJsonValue",
            Self::Unknown { rule_type } => rule_type,
        }
    }

    /// Returns a static label suitable for metrics.
    ///
    /// Unknown types share one label so that arbitrary configuration cannot
    /// grow label cardinality.
    #[must_use]
    pub const fn metric_label(&self) -> &'static str {
        match self {
            Self::ValidateHeader { .. } => "ValidateHeader",
            Self::AddHeader { .. } => "AddHeader",
            Self::ModifyJsonBody { .. } => "ModifyJsonBody",
            Self::ModifyQueryParam { .. } => "ModifyQueryParam",
            Self::MaskSensitiveData { .. } => "MaskSensitiveData",
            Self::RemoveJsonField { .. } => "RemoveJsonField",
            Self::RenameJsonField { .. } => "RenameJsonField",
            Self::InjectMetadata { .. } => "InjectMetadata",
            Self::ModifyJsonValue { .. } => "ModifyJsonValue",
            Self::Unknown { .. } => "Unknown",
        }
    }

    /// Returns true if this rule reads or rewrites the body.
    #[must_use]
    pub const fn touches_body(&self) -> bool {
        matches!(
            self,
            Self::ModifyJsonBody { .. }
                | Self::MaskSensitiveData { .. }
                | Self::RemoveJsonField { .. }
                | Self::RenameJsonField { .. }
                | Self::InjectMetadata { .. }
                | Self::ModifyJsonValue { .. }
        )
    }
}

/// Flat wire representation of a rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct RawRule {
    #[serde(rename = "Type")]
    rule_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    header_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    header_value: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    json_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    old_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    new_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    param_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    param_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    json_paths: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    field_to_remove: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    old_field_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    new_field_name: Option<String>,
}

impl From<RawRule> for TransformationRule {
    fn from(raw: RawRule) -> Self {
        match raw.rule_type.as_str() {
            "ValidateHeader" => Self::ValidateHeader {
                header_name: raw.header_name,
                required: raw.required,
            },
            "AddHeader" => Self::AddHeader {
                header_name: raw.header_name,
                header_value: raw.header_value,
            },
            "ModifyJsonBody" => Self::ModifyJsonBody {
                json_path: raw.json_path,
                old_value: raw.old_value,
                new_value: raw.new_value,
            },
            "ModifyQueryParam" => Self::ModifyQueryParam {
                param_name: raw.param_name,
                param_value: raw.param_value,
            },
            "MaskSensitiveData" => Self::MaskSensitiveData {
                json_paths: raw.json_paths.unwrap_or_default(),
            },
            "RemoveJsonField" => Self::RemoveJsonField {
                field_to_remove: raw.field_to_remove,
            },
            "RenameJsonField" => Self::RenameJsonField {
                old_field_name: raw.old_field_name,
                new_field_name: raw.new_field_name,
            },
            "InjectMetadata" => Self::InjectMetadata {
                json_path: raw.json_path,
                metadata: raw.metadata.unwrap_or_default(),
            },
            "ModifyJsonValue" => Self::ModifyJsonValue {
                json_path: raw.json_path,
                old_value: raw.old_value,
                new_value: raw.new_value,
            },
            _ => Self::Unknown {
                rule_type: raw.rule_type,
            },
        }
    }
}

impl From<TransformationRule> for RawRule {
    fn from(rule: TransformationRule) -> Self {
        let rule_type = rule.rule_type().to_string();
        let raw = Self {
            rule_type,
            ..Self::default()
        };
        match rule {
            TransformationRule::ValidateHeader {
                header_name,
                required,
            } => Self {
                header_name,
                required,
                ..raw
            },
            TransformationRule::AddHeader {
                header_name,
                header_value,
            } => Self {
                header_name,
                header_value,
                ..raw
            },
            TransformationRule::ModifyJsonBody {
                json_path,
                old_value,
                new_value,
            }
            | TransformationRule::ModifyJsonValue {
                json_path,
                old_value,
                new_value,
            } => Self {
                json_path,
                old_value,
                new_value,
                ..raw
            },
            TransformationRule::ModifyQueryParam {
                param_name,
                param_value,
            } => Self {
                param_name,
                param_value,
                ..raw
            },
            TransformationRule::MaskSensitiveData { json_paths } => Self {
                json_paths: Some(json_paths),
                ..raw
            },
            TransformationRule::RemoveJsonField { field_to_remove } => Self {
                field_to_remove,
                ..raw
            },
            TransformationRule::RenameJsonField {
                old_field_name,
                new_field_name,
            } => Self {
                old_field_name,
                new_field_name,
                ..raw
            },
            TransformationRule::InjectMetadata {
                json_path,
                metadata,
            } => Self {
                json_path,
                metadata: Some(metadata),
                ..raw
            },
            TransformationRule::Unknown { .. } => raw,
        }
    }
}
