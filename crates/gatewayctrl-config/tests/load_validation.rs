//! Config load validation tests for gatewayctrl-config.
// crates/gatewayctrl-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards and section validation.
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

#![allow(clippy::use_debug, reason = "Test-only diagnostics are permitted.")]

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use gatewayctrl_config::AuditSinkKind;
use gatewayctrl_config::ConfigError;
use gatewayctrl_config::GatewayCtrlConfig;
use gatewayctrl_config::config_toml_example;
use gatewayctrl_core::NoopAuditSink;
use gatewayctrl_credentials::EncryptionPolicy;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<GatewayCtrlConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn write_config(content: &[u8]) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(content).map_err(|err| err.to_string())?;
    Ok(file)
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(GatewayCtrlConfig::load(Some(path)), "config path component too long")
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let file = write_config(&vec![b'#'; 1_048_577])?;
    assert_invalid(GatewayCtrlConfig::load(Some(file.path())), "config file exceeds size limit")
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let file = write_config(&[0xFF, 0xFE, 0xFF])?;
    assert_invalid(GatewayCtrlConfig::load(Some(file.path())), "config file must be utf-8")
}

#[test]
fn load_rejects_missing_explicit_file() -> TestResult {
    let path = Path::new("/nonexistent/gatewayctrl.toml");
    assert_invalid(GatewayCtrlConfig::load(Some(path)), "config io error")
}

#[test]
fn load_rejects_unknown_fields() -> TestResult {
    let file = write_config(b"[http]\nretries = 3\n")?;
    assert_invalid(GatewayCtrlConfig::load(Some(file.path())), "config parse error")
}

#[test]
fn example_config_loads() -> TestResult {
    let file = write_config(config_toml_example().as_bytes())?;
    let config = GatewayCtrlConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.credentials.policy != EncryptionPolicy::OptOut
        || config.audit.sink != AuditSinkKind::Stderr
    {
        return Err("example defaults changed".to_string());
    }
    if !config.sensitive_field_names().contains("client_secret") {
        return Err("extra sensitive field missing".to_string());
    }
    Ok(())
}

#[test]
fn http_bounds_are_enforced() -> TestResult {
    assert_invalid(GatewayCtrlConfig::from_toml("[http]\ntimeout_ms = 0\n"), "http.timeout_ms")?;
    assert_invalid(GatewayCtrlConfig::from_toml("[http]\npage_size = 5000\n"), "http.page_size")?;
    assert_invalid(
        GatewayCtrlConfig::from_toml("[http]\ntimeout_ms = 1000\nconnect_timeout_ms = 2000\n"),
        "must not exceed",
    )
}

#[test]
fn http_settings_follow_config() -> TestResult {
    let config = GatewayCtrlConfig::from_toml("[http]\ntimeout_ms = 2500\nuser_agent = \"ops/1\"\n")
        .map_err(|err| err.to_string())?;
    let settings = config.http_settings();
    if settings.timeout != Duration::from_millis(2500) || settings.user_agent != "ops/1" {
        return Err(format!("unexpected settings {settings:?}"));
    }
    Ok(())
}

#[test]
fn file_sink_requires_path() -> TestResult {
    assert_invalid(GatewayCtrlConfig::from_toml("[audit]\nsink = \"file\"\n"), "audit.path")
}

#[test]
fn key_env_must_be_a_variable_name() -> TestResult {
    assert_invalid(
        GatewayCtrlConfig::from_toml("[credentials]\nkey_env = \"KEY; rm -rf\"\n"),
        "credentials.key_env",
    )
}

#[test]
fn unset_key_variable_disables_encryption() -> TestResult {
    let config = GatewayCtrlConfig::from_toml(
        "[credentials]\nkey_env = \"GATEWAYCTRL_TEST_KEY_THAT_IS_NEVER_SET\"\n",
    )
    .map_err(|err| err.to_string())?;
    let sealer = config.field_sealer(&NoopAuditSink).map_err(|err| err.to_string())?;
    if sealer.store().is_enabled() {
        return Err("encryption should be disabled".to_string());
    }
    Ok(())
}
