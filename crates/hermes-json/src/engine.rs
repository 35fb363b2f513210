//! The five document mutations.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::error::{MutationError, MutationResult};
use crate::mask::mask_value;
use crate::path::{get_mut, is_property, JsonPath, Step};

/// Metadata value replaced with the current UTC time at injection.
pub const TIMESTAMP_PLACEHOLDER: &str = "{{timestamp}}";

fn parse_document(json: &str) -> MutationResult<Value> {
    serde_json::from_str(json).map_err(MutationError::Parse)
}

/// Serializes the document, or hands back the input when nothing changed.
fn finish(original: &str, document: &Value, changed: bool) -> MutationResult<String> {
    if changed {
        serde_json::to_string(document).map_err(MutationError::Serialize)
    } else {
        Ok(original.to_string())
    }
}

fn best_effort(operation: &'static str, original: &str, result: MutationResult<String>) -> String {
    match result {
        Ok(output) => output,
        Err(MutationError::NoMatch { path }) => {
            tracing::warn!(operation, json_path = %path, "No nodes found at path");
            original.to_string()
        }
        Err(error) => {
            tracing::error!(operation, error = %error, "JSON mutation failed");
            original.to_string()
        }
    }
}

/// Textual form of a node, as compared against an expected old value.
///
/// Strings are unquoted, `null` is empty, containers are compact JSON.
fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn located(document: &Value, path: &str) -> MutationResult<Vec<Vec<Step>>> {
    let locations = JsonPath::parse(path)?.locate(document);
    if locations.is_empty() {
        return Err(MutationError::no_match(path));
    }
    Ok(locations)
}

/// Replaces property values at `path` with `new_value`, written as a string.
///
/// When `old_value` is set, only nodes whose textual form equals it are
/// replaced. Array elements are never replaced, even when addressed
/// directly: only values held by an object property qualify.
pub fn try_modify_value(
    json: &str,
    path: &str,
    old_value: Option<&str>,
    new_value: &str,
) -> MutationResult<String> {
    let mut document = parse_document(json)?;
    let locations = located(&document, path)?;

    let mut changed = false;
    for location in locations.iter().filter(|l| is_property(l)) {
        let Some(node) = get_mut(&mut document, location) else {
            continue;
        };
        if old_value.map_or(true, |expected| text_of(node) == expected) {
            *node = Value::String(new_value.to_string());
            changed = true;
        }
    }

    finish(json, &document, changed)
}

/// Best-effort [`try_modify_value`].
pub fn modify_value(json: &str, path: &str, old_value: Option<&str>, new_value: &str) -> String {
    best_effort(
        "modify_value",
        json,
        try_modify_value(json, path, old_value, new_value),
    )
}

/// Merges `metadata` into every object at `path`, stamping `now` for
/// `"{{timestamp}}"` values.
pub fn try_inject_metadata_at(
    json: &str,
    path: &str,
    metadata: &Map<String, Value>,
    now: DateTime<Utc>,
) -> MutationResult<String> {
    let mut document = parse_document(json)?;
    let locations = located(&document, path)?;

    let stamp = now.to_rfc3339_opts(SecondsFormat::Micros, true);
    let resolved: Vec<(&String, Value)> = metadata
        .iter()
        .map(|(key, value)| match value {
            Value::String(s) if s == TIMESTAMP_PLACEHOLDER => (key, Value::String(stamp.clone())),
            other => (key, other.clone()),
        })
        .collect();

    let mut changed = false;
    for location in &locations {
        if let Some(Value::Object(target)) = get_mut(&mut document, location) {
            for (key, value) in &resolved {
                target.insert((*key).clone(), value.clone());
                changed = true;
            }
        }
    }

    finish(json, &document, changed)
}

/// [`try_inject_metadata_at`] with the current time.
pub fn try_inject_metadata(
    json: &str,
    path: &str,
    metadata: &Map<String, Value>,
) -> MutationResult<String> {
    try_inject_metadata_at(json, path, metadata, Utc::now())
}

/// Best-effort [`try_inject_metadata`].
pub fn inject_metadata(json: &str, path: &str, metadata: &Map<String, Value>) -> String {
    best_effort(
        "inject_metadata",
        json,
        try_inject_metadata(json, path, metadata),
    )
}

fn masked(value: &Value) -> Option<Value> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    if text.trim().is_empty() {
        return None;
    }
    Some(Value::String(mask_value(&text)))
}

/// Masks scalar property values at each path, in order.
///
/// Only object property values are masked; array elements are skipped.
/// Strings, numbers and booleans are masked through their text form and
/// become strings. Objects, arrays, `null` and blank strings are left as
/// they are, so a path that names a container does not mask its children.
///
/// A path that resolves nothing is skipped. A malformed path fails the
/// whole operation.
pub fn try_mask_fields<S: AsRef<str>>(json: &str, paths: &[S]) -> MutationResult<String> {
    let mut document = parse_document(json)?;

    let mut changed = false;
    for path in paths {
        let locations = JsonPath::parse(path.as_ref())?.locate(&document);
        for location in locations.iter().filter(|l| is_property(l)) {
            let Some(node) = get_mut(&mut document, location) else {
                continue;
            };
            if let Some(replacement) = masked(node) {
                if replacement != *node {
                    *node = replacement;
                    changed = true;
                }
            }
        }
    }

    finish(json, &document, changed)
}

/// Best-effort [`try_mask_fields`].
pub fn mask_fields<S: AsRef<str>>(json: &str, paths: &[S]) -> String {
    best_effort("mask_fields", json, try_mask_fields(json, paths))
}

/// Deletes every property addressed by `path`.
pub fn try_remove_field(json: &str, path: &str) -> MutationResult<String> {
    let mut document = parse_document(json)?;
    let locations = located(&document, path)?;

    let mut changed = false;
    for location in &locations {
        let Some((Step::Key(key), parent)) = location.split_last() else {
            continue;
        };
        if let Some(Value::Object(map)) = get_mut(&mut document, parent) {
            changed |= map.remove(key).is_some();
        }
    }

    finish(json, &document, changed)
}

/// Best-effort [`try_remove_field`].
pub fn remove_field(json: &str, path: &str) -> String {
    best_effort("remove_field", json, try_remove_field(json, path))
}

/// Rebuilds `value` with every `old_name` member renamed to `new_name`.
///
/// A renamed value is moved as-is. When the object already holds
/// `new_name`, the renamed value replaces it.
fn rename_in(value: Value, old_name: &str, new_name: &str, renamed: &mut usize) -> Value {
    match value {
        Value::Object(map) => {
            let mut rebuilt = Map::new();
            let mut moved = None;
            for (key, child) in map {
                if key == old_name {
                    moved = Some(child);
                } else {
                    rebuilt.insert(key, rename_in(child, old_name, new_name, renamed));
                }
            }
            if let Some(child) = moved {
                *renamed += 1;
                rebuilt.insert(new_name.to_string(), child);
            }
            Value::Object(rebuilt)
        }
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| rename_in(item, old_name, new_name, renamed))
                .collect(),
        ),
        scalar => scalar,
    }
}

/// Renames every member called `old_name`, at any depth.
pub fn try_rename_field(json: &str, old_name: &str, new_name: &str) -> MutationResult<String> {
    let document = parse_document(json)?;
    if old_name == new_name {
        return Ok(json.to_string());
    }

    let mut renamed = 0;
    let document = rename_in(document, old_name, new_name, &mut renamed);
    tracing::trace!(old_name, new_name, renamed, "Renamed JSON members");

    finish(json, &document, renamed > 0)
}

/// Best-effort [`try_rename_field`].
pub fn rename_field(json: &str, old_name: &str, new_name: &str) -> String {
    best_effort(
        "rename_field",
        json,
        try_rename_field(json, old_name, new_name),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn parsed(text: &str) -> Value {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn test_modify_value_with_matching_old_value() {
        let out = modify_value(r#"{"a":{"b":"old"}}"#, "$.a.b", Some("old"), "new");
        assert_eq!(parsed(&out), json!({"a": {"b": "new"}}));
    }

    #[test]
    fn test_modify_value_with_other_old_value_is_unchanged() {
        let input = r#"{"a":{"b":"old"}}"#;
        assert_eq!(modify_value(input, "$.a.b", Some("other"), "new"), input);
    }

    #[test]
    fn test_modify_value_without_guard_replaces_all_matches() {
        let out = modify_value(
            r#"{"items":[{"s":"a"},{"s":"b"}]}"#,
            "$.items[*].s",
            None,
            "x",
        );
        assert_eq!(parsed(&out), json!({"items": [{"s": "x"}, {"s": "x"}]}));
    }

    #[test]
    fn test_modify_value_writes_strings() {
        let out = modify_value(r#"{"count":5}"#, "$.count", Some("5"), "6");
        assert_eq!(parsed(&out), json!({"count": "6"}));
    }

    #[test]
    fn test_modify_value_compares_textual_forms() {
        let out = modify_value(r#"{"flag":true,"gone":null}"#, "$.flag", Some("true"), "yes");
        assert_eq!(parsed(&out)["flag"], json!("yes"));

        let out = modify_value(r#"{"flag":true,"gone":null}"#, "$.gone", Some(""), "back");
        assert_eq!(parsed(&out)["gone"], json!("back"));
    }

    #[test]
    fn test_modify_value_skips_array_elements() {
        let input = r#"{"tags":["old","old"]}"#;
        assert_eq!(modify_value(input, "$.tags[0]", None, "new"), input);
        assert_eq!(modify_value(input, "$.tags[*]", Some("old"), "new"), input);
    }

    #[test]
    fn test_modify_value_errors() {
        assert!(matches!(
            try_modify_value("not json", "$.a", None, "x"),
            Err(MutationError::Parse(_))
        ));
        assert!(matches!(
            try_modify_value("{}", "$.a", None, "x"),
            Err(MutationError::NoMatch { .. })
        ));
        assert!(matches!(
            try_modify_value("{}", "$[?(@.a)]", None, "x"),
            Err(MutationError::InvalidPath { .. })
        ));
        assert_eq!(modify_value("not json", "$.a", None, "x"), "not json");
    }

    #[test]
    fn test_inject_metadata_merges_and_overwrites() {
        let metadata = json!({"source": "hermes", "version": 2})
            .as_object()
            .cloned()
            .unwrap();
        let out = inject_metadata(r#"{"data":{"source":"upstream","id":1}}"#, "$.data", &metadata);
        assert_eq!(
            parsed(&out),
            json!({"data": {"source": "hermes", "id": 1, "version": 2}})
        );
    }

    #[test]
    fn test_inject_metadata_at_root() {
        let metadata = json!({"gateway": true}).as_object().cloned().unwrap();
        let out = inject_metadata(r#"{"a":1}"#, "$", &metadata);
        assert_eq!(parsed(&out), json!({"a": 1, "gateway": true}));
    }

    #[test]
    fn test_inject_metadata_expands_timestamp() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap();
        let metadata = json!({"ts": "{{timestamp}}", "note": "{{other}}"})
            .as_object()
            .cloned()
            .unwrap();

        let out = try_inject_metadata_at("{}", "$", &metadata, now).unwrap();
        let doc = parsed(&out);
        assert_eq!(doc["ts"], json!("2026-03-01T12:30:00.000000Z"));
        assert_eq!(doc["note"], json!("{{other}}"));
        assert!(DateTime::parse_from_rfc3339(doc["ts"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_inject_metadata_skips_non_objects() {
        let metadata = json!({"k": 1}).as_object().cloned().unwrap();
        let input = r#"{"list":[1,2]}"#;
        assert_eq!(inject_metadata(input, "$.list", &metadata), input);
    }

    #[test]
    fn test_inject_metadata_no_match_returns_input() {
        let metadata = json!({"k": 1}).as_object().cloned().unwrap();
        let input = r#"{"a":1}"#;
        assert!(matches!(
            try_inject_metadata(input, "$.missing", &metadata),
            Err(MutationError::NoMatch { .. })
        ));
        assert_eq!(inject_metadata(input, "$.missing", &metadata), input);
    }

    #[test]
    fn test_mask_fields_card_number() {
        let out = mask_fields(r#"{"card":"4111111111111111"}"#, &["$.card"]);
        let card = parsed(&out)["card"].as_str().unwrap().to_string();
        assert_eq!(card.len(), 16);
        assert!(card.ends_with("1111"));
        assert!(card[..12].chars().all(|c| c == '*'));
    }

    #[test]
    fn test_mask_fields_short_value() {
        let out = mask_fields(r#"{"pin":"12"}"#, &["$.pin"]);
        assert_eq!(parsed(&out), json!({"pin": "**"}));
    }

    #[test]
    fn test_mask_fields_multiple_paths_and_scalars() {
        let paths = vec!["$.ssn".to_string(), "$.missing".to_string(), "$..cvv".to_string()];
        let out = mask_fields(
            r#"{"ssn":"123456789","payment":{"cvv":737},"keep":"x"}"#,
            &paths,
        );
        assert_eq!(
            parsed(&out),
            json!({"ssn": "*******89", "payment": {"cvv": "***"}, "keep": "x"})
        );
    }

    #[test]
    fn test_mask_fields_leaves_blank_null_and_containers() {
        let input = r#"{"a":"","b":null,"c":{"d":"secret"}}"#;
        assert_eq!(mask_fields(input, &["$.a", "$.b", "$.c"]), input);
    }

    #[test]
    fn test_mask_fields_skips_arrays_and_their_elements() {
        let input = r#"{"pins":["1234","5678"],"nested":{"list":[[1]]}}"#;
        assert_eq!(
            mask_fields(input, &["$.pins", "$.pins[0]", "$.pins[*]", "$.nested.list"]),
            input
        );
    }

    #[test]
    fn test_mask_fields_invalid_path_fails_whole_operation() {
        let input = r#"{"a":"secret-value"}"#;
        assert!(try_mask_fields(input, &["$.a", "$[1:2]"]).is_err());
        assert_eq!(mask_fields(input, &["$.a", "$[1:2]"]), input);
    }

    #[test]
    fn test_remove_field() {
        let out = remove_field(r#"{"a":1,"b":2}"#, "$.b");
        assert_eq!(parsed(&out), json!({"a": 1}));

        let again = remove_field(&out, "$.b");
        assert_eq!(again, out);
    }

    #[test]
    fn test_remove_field_everywhere() {
        let out = remove_field(
            r#"{"token":"t","inner":{"token":"u","keep":1}}"#,
            "$..token",
        );
        assert_eq!(parsed(&out), json!({"inner": {"keep": 1}}));
    }

    #[test]
    fn test_remove_field_ignores_array_elements() {
        let input = r#"{"list":[1,2]}"#;
        assert_eq!(remove_field(input, "$.list[0]"), input);
    }

    #[test]
    fn test_rename_field_at_every_depth() {
        let out = rename_field(r#"{"x":{"old":1},"arr":[{"old":2}]}"#, "old", "new");
        assert_eq!(parsed(&out), json!({"x": {"new": 1}, "arr": [{"new": 2}]}));
    }

    #[test]
    fn test_rename_field_collision_keeps_renamed_value() {
        let out = rename_field(r#"{"old":1,"new":2}"#, "old", "new");
        assert_eq!(parsed(&out), json!({"new": 1}));
    }

    #[test]
    fn test_rename_field_no_match_returns_input() {
        let input = r#"{ "a" : 1 }"#;
        assert_eq!(rename_field(input, "old", "new"), input);
        assert_eq!(rename_field(input, "a", "a"), input);
    }

    #[test]
    fn test_rename_field_invalid_json() {
        assert!(try_rename_field("[1,", "a", "b").is_err());
        assert_eq!(rename_field("[1,", "a", "b"), "[1,");
    }
}
