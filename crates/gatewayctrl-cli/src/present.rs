// crates/gatewayctrl-cli/src/present.rs
// ============================================================================
// Module: CLI Presentation
// Description: Argument parsing and display shaping for gateway records.
// Purpose: Keep credential values off the terminal.
// Dependencies: gatewayctrl-core, serde_json
// ============================================================================

//! ## Overview
//! Converts stored gateway configs into JSON for display with every
//! credential value masked, and parses `key=value` command-line pairs.
//!
//! Security posture: terminal output is treated as untrusted; credentials are
//! never echoed, whether or not their names are registered as sensitive.

// ============================================================================
// SECTION: Imports
// ============================================================================

use gatewayctrl_core::GatewayConfig;
use gatewayctrl_core::SensitiveFieldNames;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Placeholder printed in place of secret values.
pub const MASK: &str = "********";

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses a `key=value` argument. The value may itself contain `=`.
///
/// # Errors
///
/// Returns a message when the separator is missing or the key is blank.
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(format!("expected key=value, got `{raw}`"));
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in `{raw}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

// ============================================================================
// SECTION: Display
// ============================================================================

/// Renders a config for display with secrets masked.
///
/// Every credential value is masked. Additional config values are masked when
/// their name is sensitive.
#[must_use]
pub fn masked_config(config: &GatewayConfig, sensitive: &SensitiveFieldNames) -> Value {
    let credentials: Map<String, Value> =
        config.credentials.keys().map(|key| (key.clone(), Value::from(MASK))).collect();
    let additional: Map<String, Value> = config
        .additional_config
        .iter()
        .map(|(key, value)| {
            let shown = if sensitive.contains(key) { MASK } else { value.as_str() };
            (key.clone(), Value::from(shown))
        })
        .collect();
    json!({
        "id": config.id.as_ref().map(|id| id.as_str().to_string()),
        "name": config.name,
        "type": config.gateway_type.as_str(),
        "baseUrl": config.base_url,
        "tlsVerify": config.tls_verify,
        "certificatePath": config.certificate_path.as_ref().map(|path| path.display().to_string()),
        "credentials": credentials,
        "additionalConfig": additional,
    })
}

/// Reduces a gateway name to characters safe for a file name.
#[must_use]
pub fn file_stem_for(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
        .collect();
    if stem.is_empty() { "gateway".to_string() } else { stem }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Tests assert on known-good fixtures.")]

    use gatewayctrl_core::GatewayConfig;
    use gatewayctrl_core::GatewayId;
    use gatewayctrl_core::SensitiveFieldNames;

    use super::MASK;
    use super::file_stem_for;
    use super::masked_config;
    use super::parse_key_value;

    #[test]
    fn key_value_keeps_equals_in_value() {
        let (key, value) = parse_key_value("token=a=b=").unwrap();
        assert_eq!(key, "token");
        assert_eq!(value, "a=b=");
    }

    #[test]
    fn key_value_rejects_missing_separator_and_blank_key() {
        assert!(parse_key_value("apiKey").is_err());
        assert!(parse_key_value(" =value").is_err());
    }

    #[test]
    fn masked_config_hides_credentials_and_sensitive_options() {
        let mut config = GatewayConfig::new("Kong-Dev", "kong", "http://localhost:8001")
            .with_credential("apiKey", "abc123")
            .with_credential("workspaceLabel", "not-listed-but-still-hidden")
            .with_option("clientSecret", "s3cr3t")
            .with_option("workspace", "default");
        config.id = Some(GatewayId::new("gw-1"));

        let shown = masked_config(&config, &SensitiveFieldNames::default());
        let rendered = shown.to_string();

        assert!(!rendered.contains("abc123"));
        assert!(!rendered.contains("not-listed-but-still-hidden"));
        assert!(!rendered.contains("s3cr3t"));
        assert_eq!(shown["credentials"]["apiKey"], MASK);
        assert_eq!(shown["additionalConfig"]["workspace"], "default");
        assert_eq!(shown["id"], "gw-1");
        assert_eq!(shown["type"], "kong");
    }

    #[test]
    fn file_stem_replaces_path_characters() {
        assert_eq!(file_stem_for("../Kong Dev"), "___Kong_Dev");
        assert_eq!(file_stem_for(""), "gateway");
    }
}
