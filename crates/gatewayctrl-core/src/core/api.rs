// crates/gatewayctrl-core/src/core/api.rs
// ============================================================================
// Module: Normalized API Model
// Description: Vendor-agnostic API records, create/update specs, and metrics.
// Purpose: Provide the shapes every adapter returns or accepts.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! [`NormalizedApi`] is built fresh from each vendor response and never
//! persisted; the gateway remains the source of truth. Only the operation
//! surface is normalized. Vendor concepts that have no common shape (plugins,
//! policies, stages) travel untouched in `vendor_detail`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::core::identifiers::ApiId;

// ============================================================================
// SECTION: Normalized API
// ============================================================================

/// Vendor-agnostic view of one API registered on a gateway.
///
/// # Invariants
/// - `methods` are uppercase HTTP verbs; empty means "any method".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedApi {
    /// Vendor-assigned identifier.
    pub id: ApiId,
    /// Display name.
    pub name: String,
    /// Public base path or context.
    pub base_path: Option<String>,
    /// Declared HTTP methods.
    pub methods: Vec<String>,
    /// Upstream target URL.
    pub backend: Option<String>,
    /// Passthrough bag of vendor fields the host may render.
    pub vendor_detail: Value,
}

impl NormalizedApi {
    /// Creates a record with only identity populated.
    #[must_use]
    pub fn new(id: impl Into<ApiId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            base_path: None,
            methods: Vec::new(),
            backend: None,
            vendor_detail: Value::Null,
        }
    }
}

// ============================================================================
// SECTION: API Spec
// ============================================================================

/// Caller-supplied description of an API to create or update.
///
/// Fields a vendor requires but the caller omits yield a validation error from
/// the adapter; `vendor_overrides` are merged into the vendor payload as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiSpec {
    /// Display name.
    pub name: String,
    /// Public base path or context.
    pub base_path: Option<String>,
    /// Declared HTTP methods.
    pub methods: Vec<String>,
    /// Upstream target URL.
    pub backend: Option<String>,
    /// Version label for vendors that version APIs.
    pub version: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Vendor payload fields merged over the generated payload.
    pub vendor_overrides: Map<String, Value>,
}

impl ApiSpec {
    /// Creates a spec with only a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the methods uppercased with blanks removed.
    #[must_use]
    pub fn normalized_methods(&self) -> Vec<String> {
        self.methods
            .iter()
            .map(|method| method.trim().to_ascii_uppercase())
            .filter(|method| !method.is_empty())
            .collect()
    }

    /// Returns the base path with a leading slash, if one was supplied.
    #[must_use]
    pub fn normalized_base_path(&self) -> Option<String> {
        let path = self.base_path.as_deref()?.trim();
        if path.is_empty() {
            return None;
        }
        if path.starts_with('/') { Some(path.to_string()) } else { Some(format!("/{path}")) }
    }
}

// ============================================================================
// SECTION: Metrics
// ============================================================================

/// Point-in-time metrics snapshot for one API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMetrics {
    /// API the snapshot describes.
    pub api_id: ApiId,
    /// Named numeric counters.
    pub counters: BTreeMap<String, u64>,
    /// Vendor-specific detail.
    pub detail: Value,
}

// ============================================================================
// SECTION: Connection Test
// ============================================================================

/// Outcome of a liveness and authentication probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionTestResult {
    /// Gateway reachable and credentials accepted.
    Success,
    /// Gateway rejected the credentials.
    AuthenticationFailed,
    /// Gateway could not be reached or did not answer in time.
    NetworkUnreachable,
    /// Server certificate was not trusted.
    TlsValidationFailed,
    /// Gateway answered but the configuration cannot serve it.
    UnsupportedConfiguration,
}

impl ConnectionTestResult {
    /// Returns true for [`ConnectionTestResult::Success`].
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns the stable label for the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::AuthenticationFailed => "authentication_failed",
            Self::NetworkUnreachable => "network_unreachable",
            Self::TlsValidationFailed => "tls_validation_failed",
            Self::UnsupportedConfiguration => "unsupported_configuration",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_path_gains_leading_slash() {
        let mut spec = ApiSpec::new("orders");
        spec.base_path = Some("orders".to_string());
        assert_eq!(spec.normalized_base_path().as_deref(), Some("/orders"));
        spec.base_path = Some("  ".to_string());
        assert_eq!(spec.normalized_base_path(), None);
    }

    #[test]
    fn methods_are_uppercased() {
        let mut spec = ApiSpec::new("orders");
        spec.methods = vec!["get".to_string(), " ".to_string(), "Post".to_string()];
        assert_eq!(spec.normalized_methods(), vec!["GET", "POST"]);
    }
}
