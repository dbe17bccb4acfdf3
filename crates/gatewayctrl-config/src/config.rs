// crates/gatewayctrl-config/src/config.rs
// ============================================================================
// Module: GatewayCtrl Configuration
// Description: Configuration loading and validation for GatewayCtrl hosts.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: gatewayctrl-core, gatewayctrl-credentials, gatewayctrl-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Unknown fields and out-of-range values fail closed. When no path is given,
//! no `GATEWAYCTRL_CONFIG` is set, and `gatewayctrl.toml` is absent from the
//! working directory, built-in defaults apply.
//! Security posture: config inputs are untrusted. The encryption key itself is
//! never part of the file; only the name of the environment variable holding it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use gatewayctrl_core::AuditSink;
use gatewayctrl_core::FileAuditSink;
use gatewayctrl_core::HttpSettings;
use gatewayctrl_core::NoopAuditSink;
use gatewayctrl_core::SensitiveFieldNames;
use gatewayctrl_core::StderrAuditSink;
use gatewayctrl_credentials::CredentialStore;
use gatewayctrl_credentials::DEFAULT_KEY_ENV;
use gatewayctrl_credentials::EncryptionPolicy;
use gatewayctrl_credentials::FieldSealer;
use gatewayctrl_store_sqlite::SqliteStoreConfig;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "gatewayctrl.toml";
/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "GATEWAYCTRL_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of configured sensitive field names.
pub(crate) const MAX_SENSITIVE_FIELDS: usize = 256;
/// Maximum length of a sensitive field name.
pub(crate) const MAX_FIELD_NAME_LENGTH: usize = 128;
/// Default request timeout (ms).
pub(crate) const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Default connect timeout (ms).
pub(crate) const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;
/// Minimum request or connect timeout (ms).
pub(crate) const MIN_TIMEOUT_MS: u64 = 100;
/// Maximum request timeout (ms).
pub(crate) const MAX_TIMEOUT_MS: u64 = 300_000;
/// Maximum connect timeout (ms).
pub(crate) const MAX_CONNECT_TIMEOUT_MS: u64 = 60_000;
/// Default response size limit.
pub(crate) const DEFAULT_MAX_RESPONSE_BYTES: usize = 8 * 1024 * 1024;
/// Smallest accepted response size limit.
pub(crate) const MIN_MAX_RESPONSE_BYTES: usize = 1024;
/// Largest accepted response size limit.
pub(crate) const MAX_MAX_RESPONSE_BYTES: usize = 64 * 1024 * 1024;
/// Default page budget per listing.
pub(crate) const DEFAULT_MAX_PAGES: usize = 1_000;
/// Largest accepted page budget.
pub(crate) const MAX_MAX_PAGES: usize = 100_000;
/// Default vendor page size.
pub(crate) const DEFAULT_PAGE_SIZE: usize = 100;
/// Largest accepted vendor page size.
pub(crate) const MAX_PAGE_SIZE: usize = 1_000;
/// Maximum User-Agent length.
pub(crate) const MAX_USER_AGENT_LENGTH: usize = 256;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// GatewayCtrl host configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayCtrlConfig {
    /// Config repository storage.
    #[serde(default)]
    pub store: SqliteStoreConfig,
    /// Credential protection.
    #[serde(default)]
    pub credentials: CredentialsConfig,
    /// Outbound vendor request bounds.
    #[serde(default)]
    pub http: HttpConfig,
    /// Audit event routing.
    #[serde(default)]
    pub audit: AuditConfig,
}

/// Credential protection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialsConfig {
    /// Environment variable holding the base64 encryption key.
    #[serde(default = "default_key_env")]
    pub key_env: String,
    /// Behavior when sensitive fields are saved without a key.
    #[serde(default)]
    pub policy: EncryptionPolicy,
    /// Replacement for the built-in sensitive field names.
    #[serde(default)]
    pub sensitive_fields: Option<Vec<String>>,
    /// Names appended to the effective sensitive field names.
    #[serde(default)]
    pub extra_sensitive_fields: Vec<String>,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            key_env: default_key_env(),
            policy: EncryptionPolicy::default(),
            sensitive_fields: None,
            extra_sensitive_fields: Vec::new(),
        }
    }
}

/// Returns the default key variable name.
fn default_key_env() -> String {
    DEFAULT_KEY_ENV.to_string()
}

/// Outbound HTTP bounds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    /// Total time per request (ms).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Connect timeout (ms).
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Maximum response body size.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
    /// Maximum pages drained per listing.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    /// Page size requested from vendors.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Optional User-Agent override.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            max_pages: DEFAULT_MAX_PAGES,
            page_size: DEFAULT_PAGE_SIZE,
            user_agent: None,
        }
    }
}

/// Returns the default request timeout.
const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Returns the default connect timeout.
const fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

/// Returns the default response size limit.
const fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

/// Returns the default page budget.
const fn default_max_pages() -> usize {
    DEFAULT_MAX_PAGES
}

/// Returns the default page size.
const fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

/// Audit sink selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to `audit.path`.
    File,
    /// Discard events.
    None,
}

/// Audit routing settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Sink kind.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Log file for the `file` sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl GatewayCtrlConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(resolved) = resolve_path(path)? else {
            return Ok(Self::default());
        };
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml(content)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_store(&self.store)?;
        self.credentials.validate()?;
        self.http.validate()?;
        self.audit.validate()
    }

    /// Returns the outbound request bounds.
    #[must_use]
    pub fn http_settings(&self) -> HttpSettings {
        let defaults = HttpSettings::default();
        HttpSettings {
            timeout: Duration::from_millis(self.http.timeout_ms),
            connect_timeout: Duration::from_millis(self.http.connect_timeout_ms),
            max_response_bytes: self.http.max_response_bytes,
            max_pages: self.http.max_pages,
            page_size: self.http.page_size,
            user_agent: self.http.user_agent.clone().unwrap_or(defaults.user_agent),
        }
    }

    /// Returns the effective sensitive field names.
    #[must_use]
    pub fn sensitive_field_names(&self) -> SensitiveFieldNames {
        let base = self
            .credentials
            .sensitive_fields
            .as_ref()
            .map_or_else(SensitiveFieldNames::default, SensitiveFieldNames::new);
        base.extended(&self.credentials.extra_sensitive_fields)
    }

    /// Builds the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the audit log cannot be opened.
    pub fn audit_sink(&self) -> Result<Arc<dyn AuditSink>, ConfigError> {
        match (self.audit.sink, &self.audit.path) {
            (AuditSinkKind::Stderr, _) => Ok(Arc::new(StderrAuditSink)),
            (AuditSinkKind::None, _) => Ok(Arc::new(NoopAuditSink)),
            (AuditSinkKind::File, Some(path)) => {
                let sink =
                    FileAuditSink::new(path).map_err(|err| ConfigError::Io(err.to_string()))?;
                Ok(Arc::new(sink))
            }
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for the file sink".to_string()))
            }
        }
    }

    /// Builds the field sealer, reading the key from the configured variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the variable holds a malformed key.
    pub fn field_sealer(&self, audit: &dyn AuditSink) -> Result<FieldSealer, ConfigError> {
        let store = CredentialStore::from_env(&self.credentials.key_env, audit)
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;
        Ok(FieldSealer::new(store, self.sensitive_field_names(), self.credentials.policy))
    }
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates the store section.
fn validate_store(store: &SqliteStoreConfig) -> Result<(), ConfigError> {
    validate_path_string("store.path", &store.path.to_string_lossy())?;
    validate_path_string("store.certificate_dir", &store.certificate_dir.to_string_lossy())?;
    if store.busy_timeout_ms == 0 {
        return Err(ConfigError::Invalid(
            "store.busy_timeout_ms must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

impl CredentialsConfig {
    /// Validates credential settings.
    fn validate(&self) -> Result<(), ConfigError> {
        let key_env = self.key_env.trim();
        if key_env.is_empty()
            || key_env != self.key_env
            || !key_env.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        {
            return Err(ConfigError::Invalid(
                "credentials.key_env must be a plain environment variable name".to_string(),
            ));
        }
        let names = self.sensitive_fields.iter().flatten().chain(&self.extra_sensitive_fields);
        let mut count = 0_usize;
        for name in names {
            count += 1;
            if name.trim().is_empty() || name.len() > MAX_FIELD_NAME_LENGTH {
                return Err(ConfigError::Invalid(format!(
                    "sensitive field names must be 1-{MAX_FIELD_NAME_LENGTH} characters"
                )));
            }
        }
        if count > MAX_SENSITIVE_FIELDS {
            return Err(ConfigError::Invalid(format!(
                "at most {MAX_SENSITIVE_FIELDS} sensitive field names are allowed"
            )));
        }
        Ok(())
    }
}

impl HttpConfig {
    /// Validates request bounds.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_TIMEOUT_MS ..= MAX_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "http.timeout_ms must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}"
            )));
        }
        if !(MIN_TIMEOUT_MS ..= MAX_CONNECT_TIMEOUT_MS).contains(&self.connect_timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "http.connect_timeout_ms must be between {MIN_TIMEOUT_MS} and \
                 {MAX_CONNECT_TIMEOUT_MS}"
            )));
        }
        if self.connect_timeout_ms > self.timeout_ms {
            return Err(ConfigError::Invalid(
                "http.connect_timeout_ms must not exceed http.timeout_ms".to_string(),
            ));
        }
        if !(MIN_MAX_RESPONSE_BYTES ..= MAX_MAX_RESPONSE_BYTES).contains(&self.max_response_bytes) {
            return Err(ConfigError::Invalid(format!(
                "http.max_response_bytes must be between {MIN_MAX_RESPONSE_BYTES} and \
                 {MAX_MAX_RESPONSE_BYTES}"
            )));
        }
        if !(1 ..= MAX_MAX_PAGES).contains(&self.max_pages) {
            return Err(ConfigError::Invalid(format!(
                "http.max_pages must be between 1 and {MAX_MAX_PAGES}"
            )));
        }
        if !(1 ..= MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(ConfigError::Invalid(format!(
                "http.page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        if let Some(agent) = &self.user_agent
            && (agent.trim().is_empty() || agent.len() > MAX_USER_AGENT_LENGTH)
        {
            return Err(ConfigError::Invalid(format!(
                "http.user_agent must be 1-{MAX_USER_AGENT_LENGTH} characters"
            )));
        }
        Ok(())
    }
}

impl AuditConfig {
    /// Validates audit routing.
    fn validate(&self) -> Result<(), ConfigError> {
        match (&self.sink, &self.path) {
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for the file sink".to_string()))
            }
            (AuditSinkKind::File, Some(path)) => {
                validate_path_string("audit.path", &path.to_string_lossy())
            }
            _ => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults; `None` means
/// the default file is absent and built-in defaults apply.
fn resolve_path(path: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = path {
        return Ok(Some(path.to_path_buf()));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(Some(PathBuf::from(env_path)));
    }
    let default = PathBuf::from(DEFAULT_CONFIG_NAME);
    Ok(default.is_file().then_some(default))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use super::*;

    #[test]
    fn defaults_validate() {
        GatewayCtrlConfig::default().validate().unwrap();
    }

    #[test]
    fn replacement_names_drop_defaults() {
        let config = GatewayCtrlConfig::from_toml(
            "[credentials]\nsensitive_fields = [\"pin\"]\nextra_sensitive_fields = [\"otp\"]\n",
        )
        .unwrap();
        let names = config.sensitive_field_names();
        assert!(names.contains("PIN"));
        assert!(names.contains("otp"));
        assert!(!names.contains("password"));
    }

    #[test]
    fn extra_names_extend_defaults() {
        let config =
            GatewayCtrlConfig::from_toml("[credentials]\nextra_sensitive_fields = [\"pin\"]\n")
                .unwrap();
        let names = config.sensitive_field_names();
        assert!(names.contains("pin"));
        assert!(names.contains("secretAccessKey"));
    }
}
