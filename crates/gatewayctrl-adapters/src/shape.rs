// crates/gatewayctrl-adapters/src/shape.rs
// ============================================================================
// Module: Payload Shaping
// Description: JSON helpers shared by vendor adapters.
// Purpose: Read vendor responses and build vendor payloads without panics.
// Dependencies: gatewayctrl-core, serde_json
// ============================================================================

//! ## Overview
//! Vendor responses are untrusted JSON. These helpers read optional fields by
//! JSON pointer and treat anything missing or mistyped as absent, leaving each
//! adapter to decide which fields are mandatory.

use gatewayctrl_core::ApiSpec;
use gatewayctrl_core::GatewayError;
use serde_json::Map;
use serde_json::Value;

/// Reads a string (or number rendered as a string) at a JSON pointer.
#[must_use]
pub fn json_str(value: &Value, pointer: &str) -> Option<String> {
    value.pointer(pointer).and_then(|found| match found {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

/// Reads an unsigned integer at a JSON pointer.
#[must_use]
pub fn json_u64(value: &Value, pointer: &str) -> Option<u64> {
    value.pointer(pointer).and_then(Value::as_u64)
}

/// Reads an array at a JSON pointer, treating absence as empty.
#[must_use]
pub fn json_array<'a>(value: &'a Value, pointer: &str) -> &'a [Value] {
    value.pointer(pointer).and_then(Value::as_array).map_or(&[], Vec::as_slice)
}

/// Converts JSON strings in an array into uppercase method names.
#[must_use]
pub fn methods_from(values: &[Value]) -> Vec<String> {
    values.iter().filter_map(Value::as_str).map(str::to_ascii_uppercase).collect()
}

/// Merges override fields into a JSON object payload.
pub fn merge_overrides(payload: &mut Value, overrides: &Map<String, Value>) {
    if let Value::Object(target) = payload {
        for (key, value) in overrides {
            target.insert(key.clone(), value.clone());
        }
    }
}

/// Returns the object at a JSON pointer (`""` for the root) for editing.
///
/// # Errors
///
/// Returns [`GatewayError::UnexpectedResponse`] when the value is missing or
/// not an object.
pub fn object_at<'a>(
    value: &'a mut Value,
    pointer: &str,
    what: &str,
) -> Result<&'a mut Map<String, Value>, GatewayError> {
    value
        .pointer_mut(pointer)
        .and_then(Value::as_object_mut)
        .ok_or_else(|| GatewayError::unexpected(format!("{what} is not an object")))
}

/// Returns the child object under `key`, inserting an empty one if absent.
///
/// # Errors
///
/// Returns [`GatewayError::UnexpectedResponse`] when the child exists but is
/// not an object.
pub fn child_object<'a>(
    parent: &'a mut Map<String, Value>,
    key: &str,
    what: &str,
) -> Result<&'a mut Map<String, Value>, GatewayError> {
    parent
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| GatewayError::unexpected(format!("{what} is not an object")))
}

/// Returns the trimmed spec name.
///
/// # Errors
///
/// Returns [`GatewayError::Validation`] when the name is blank.
pub fn required_name(spec: &ApiSpec) -> Result<&str, GatewayError> {
    let name = spec.name.trim();
    if name.is_empty() {
        return Err(GatewayError::Validation("api name is required".to_string()));
    }
    Ok(name)
}

/// Returns the trimmed backend URL.
///
/// # Errors
///
/// Returns [`GatewayError::Validation`] naming the vendor when absent.
pub fn required_backend<'a>(spec: &'a ApiSpec, vendor: &str) -> Result<&'a str, GatewayError> {
    nonblank(spec.backend.as_deref()).ok_or_else(|| {
        GatewayError::Validation(format!("{vendor} apis require a backend url"))
    })
}

/// Returns the normalized base path.
///
/// # Errors
///
/// Returns [`GatewayError::Validation`] naming the vendor when absent.
pub fn required_base_path(spec: &ApiSpec, vendor: &str) -> Result<String, GatewayError> {
    spec.normalized_base_path().ok_or_else(|| {
        GatewayError::Validation(format!("{vendor} apis require a base path"))
    })
}

/// Returns the trimmed value when it is present and not blank.
#[must_use]
pub fn nonblank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use serde_json::json;

    use super::*;

    #[test]
    fn json_helpers_read_nested_values() {
        let value = json!({"proxy": {"listen_path": "/orders", "port": 8080}, "list": [1, 2]});
        assert_eq!(json_str(&value, "/proxy/listen_path").as_deref(), Some("/orders"));
        assert_eq!(json_str(&value, "/proxy/port").as_deref(), Some("8080"));
        assert_eq!(json_u64(&value, "/proxy/port"), Some(8080));
        assert_eq!(json_array(&value, "/list").len(), 2);
        assert!(json_array(&value, "/missing").is_empty());
    }

    #[test]
    fn overrides_replace_generated_fields() {
        let mut payload = json!({"name": "orders", "retries": 5});
        let overrides = json!({"retries": 2, "tags": ["team-a"]});
        merge_overrides(&mut payload, overrides.as_object().unwrap_or(&Map::new()));
        assert_eq!(payload["retries"], json!(2));
        assert_eq!(payload["tags"], json!(["team-a"]));
    }

    #[test]
    fn object_editing_rejects_non_objects() {
        let mut listing = json!(["not", "an", "object"]);
        assert!(matches!(
            object_at(&mut listing, "", "api"),
            Err(GatewayError::UnexpectedResponse { .. })
        ));

        let mut definition = json!({"name": "orders", "proxy": "inline"});
        let root = object_at(&mut definition, "", "api").unwrap();
        assert!(child_object(root, "proxy", "proxy").is_err());
        child_object(root, "auth", "auth").unwrap().insert("use_param".to_string(), json!(true));
        assert_eq!(definition["auth"]["use_param"], json!(true));
    }

    #[test]
    fn required_fields_reject_blanks() {
        let mut spec = ApiSpec::new("  ");
        assert!(required_name(&spec).is_err());
        spec.backend = Some(" ".to_string());
        assert!(required_backend(&spec, "kong").is_err());
        spec.backend = Some("http://upstream".to_string());
        assert_eq!(required_backend(&spec, "kong").ok(), Some("http://upstream"));
    }
}
