// crates/gatewayctrl-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for docs and `gatewayctrl config example`.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The example spells out every section with its default value, except where
//! noted in comments.

/// Returns a canonical example `gatewayctrl.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[store]
path = "gatewayctrl.db"
certificate_dir = "certificates"
journal_mode = "wal"
sync_mode = "full"
busy_timeout_ms = 5000

[credentials]
key_env = "GATEWAYCTRL_ENCRYPTION_KEY"
# "required" refuses to store sensitive fields when the key is absent.
policy = "opt_out"
# sensitive_fields = ["password", "apiKey"]
extra_sensitive_fields = ["client_secret"]

[http]
timeout_ms = 10000
connect_timeout_ms = 5000
max_response_bytes = 8388608
max_pages = 1000
page_size = 100
# user_agent = "gatewayctrl/0.1"

[audit]
sink = "stderr"
# sink = "file"
# path = "gatewayctrl-audit.jsonl"
"#,
    )
}
