// crates/gatewayctrl-core/src/core/config.rs
// ============================================================================
// Module: Gateway Configuration Model
// Description: Connection parameters for one configured gateway instance.
// Purpose: Define the record owned by the config repository and read by adapters.
// Dependencies: serde, url
// ============================================================================

//! ## Overview
//! [`GatewayConfig`] carries the identity and connection parameters of one
//! gateway. Secret values live in `credentials`; vendor-specific non-secret
//! parameters live in `additional_config`. Which field names count as secret is
//! decided by an injected [`SensitiveFieldNames`] set rather than by the
//! adapters themselves.
//!
//! Security posture: `Debug` output never includes credential values.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use url::Url;

use crate::core::identifiers::GatewayId;
use crate::core::identifiers::GatewayType;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum length of a gateway display name.
pub const MAX_GATEWAY_NAME_LENGTH: usize = 128;
/// Maximum length of a gateway base URL.
pub const MAX_BASE_URL_LENGTH: usize = 2048;
/// Maximum number of entries in either field map.
pub const MAX_CONFIG_FIELDS: usize = 64;

/// Field names encrypted at rest unless the operator configures otherwise.
pub const DEFAULT_SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "secretAccessKey",
    "sessionToken",
    "authorizationSecret",
    "apiKey",
    "adminToken",
    "token",
    "clientSecret",
    "aws_secret_access_key",
    "tyk_auth_secret",
    "api_key",
];

// ============================================================================
// SECTION: Gateway Config
// ============================================================================

/// Identity and connection parameters for one configured gateway instance.
///
/// # Invariants
/// - `id` is `None` only before the first repository save.
/// - `gateway_type` is immutable once the record exists.
/// - `certificate_path` is honored only when `tls_verify` is true.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GatewayConfig {
    /// Repository-assigned identifier.
    #[serde(default)]
    pub id: Option<GatewayId>,
    /// Operator-chosen label, unique among stored configs.
    pub name: String,
    /// Registered vendor key.
    #[serde(rename = "type")]
    pub gateway_type: GatewayType,
    /// Management API endpoint.
    #[serde(default)]
    pub base_url: String,
    /// Whether server certificates are validated.
    #[serde(default = "default_tls_verify")]
    pub tls_verify: bool,
    /// Optional trusted CA certificate (PEM).
    #[serde(default)]
    pub certificate_path: Option<PathBuf>,
    /// Vendor credential fields.
    #[serde(default)]
    pub credentials: BTreeMap<String, String>,
    /// Vendor-specific non-secret parameters.
    #[serde(default)]
    pub additional_config: BTreeMap<String, String>,
}

/// Returns the default TLS verification flag.
const fn default_tls_verify() -> bool {
    true
}

impl GatewayConfig {
    /// Creates an unsaved config with TLS verification enabled and empty maps.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        gateway_type: impl Into<GatewayType>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            gateway_type: gateway_type.into(),
            base_url: base_url.into(),
            tls_verify: true,
            certificate_path: None,
            credentials: BTreeMap::new(),
            additional_config: BTreeMap::new(),
        }
    }

    /// Adds a credential field, returning the updated config.
    #[must_use]
    pub fn with_credential(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.credentials.insert(key.into(), value.into());
        self
    }

    /// Adds an additional config field, returning the updated config.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_config.insert(key.into(), value.into());
        self
    }

    /// Looks up a secret, falling back to `additional_config` for records
    /// written before secrets were split out of it.
    #[must_use]
    pub fn secret(&self, key: &str) -> Option<&str> {
        self.credentials
            .get(key)
            .or_else(|| self.additional_config.get(key))
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Looks up a non-secret option.
    #[must_use]
    pub fn option(&self, key: &str) -> Option<&str> {
        self.additional_config.get(key).map(String::as_str).filter(|value| !value.trim().is_empty())
    }

    /// Returns the lightweight listing view of this config.
    #[must_use]
    pub fn summary(&self) -> Option<GatewayConfigSummary> {
        self.id.as_ref().map(|id| GatewayConfigSummary {
            id: id.clone(),
            name: self.name.clone(),
            gateway_type: self.gateway_type.clone(),
            base_url: self.base_url.clone(),
        })
    }

    /// Validates shape constraints shared by every vendor.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated constraint.
    pub fn validate(&self) -> Result<(), String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("gateway name must be non-empty".to_string());
        }
        if name.len() > MAX_GATEWAY_NAME_LENGTH {
            return Err(format!("gateway name exceeds {MAX_GATEWAY_NAME_LENGTH} characters"));
        }
        if name != self.name {
            return Err("gateway name must not have surrounding whitespace".to_string());
        }
        if self.gateway_type.as_str().is_empty() {
            return Err("gateway type must be non-empty".to_string());
        }
        if self.base_url.len() > MAX_BASE_URL_LENGTH {
            return Err("base url exceeds length limit".to_string());
        }
        if !self.base_url.is_empty() {
            let url = Url::parse(&self.base_url).map_err(|_| "base url is invalid".to_string())?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err("base url must use http or https".to_string());
            }
            if !url.username().is_empty() || url.password().is_some() {
                return Err("base url must not embed credentials".to_string());
            }
        }
        if self.credentials.len() > MAX_CONFIG_FIELDS
            || self.additional_config.len() > MAX_CONFIG_FIELDS
        {
            return Err(format!("config maps are limited to {MAX_CONFIG_FIELDS} fields"));
        }
        if self.credentials.keys().chain(self.additional_config.keys()).any(|key| key.is_empty()) {
            return Err("config field names must be non-empty".to_string());
        }
        Ok(())
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("gateway_type", &self.gateway_type)
            .field("base_url", &self.base_url)
            .field("tls_verify", &self.tls_verify)
            .field("certificate_path", &self.certificate_path)
            .field("credentials", &self.credentials.keys().collect::<Vec<_>>())
            .field("additional_config", &self.additional_config.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Listing view of a stored config; never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfigSummary {
    /// Repository-assigned identifier.
    pub id: GatewayId,
    /// Operator-chosen label.
    pub name: String,
    /// Registered vendor key.
    #[serde(rename = "type")]
    pub gateway_type: GatewayType,
    /// Management API endpoint.
    pub base_url: String,
}

// ============================================================================
// SECTION: Sensitive Field Names
// ============================================================================

/// Field names whose values must be encrypted at rest.
///
/// # Invariants
/// - Membership checks are ASCII case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensitiveFieldNames {
    /// Lowercased field names.
    names: BTreeSet<String>,
}

impl SensitiveFieldNames {
    /// Creates a set from arbitrary field names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|name| name.as_ref().trim().to_ascii_lowercase())
                .filter(|name| !name.is_empty())
                .collect(),
        }
    }

    /// Returns a set with no names; nothing is treated as sensitive.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            names: BTreeSet::new(),
        }
    }

    /// Returns a copy extended with additional names.
    #[must_use]
    pub fn extended<I, S>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names = self.names.clone();
        names.extend(Self::new(extra).names);
        Self {
            names,
        }
    }

    /// Returns true when `field` names a sensitive value.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.names.contains(&field.trim().to_ascii_lowercase())
    }

    /// Returns the number of names in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true when the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates the normalized names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl Default for SensitiveFieldNames {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVE_FIELDS)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
