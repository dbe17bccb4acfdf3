// crates/gatewayctrl-core/src/interfaces/mod.rs
// ============================================================================
// Module: GatewayCtrl Interfaces
// Description: Adapter and repository contracts plus the shared error taxonomy.
// Purpose: Define the seams between hosts, vendor adapters, and storage.
// Dependencies: crate::core, crate::runtime, thiserror
// ============================================================================

//! ## Overview
//! [`GatewayAdapter`] is the capability set every vendor implements.
//! [`ConfigRepository`] persists gateway configs. Both report failures through
//! a closed taxonomy ([`GatewayError`], [`RepositoryError`]); transport and
//! library errors never cross these boundaries in their raw form.
//!
//! Security posture: error messages are surfaced to operators and must never
//! embed credential values.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::ApiId;
use crate::core::ApiMetrics;
use crate::core::ApiSpec;
use crate::core::ConnectionTestResult;
use crate::core::GatewayConfig;
use crate::core::GatewayConfigSummary;
use crate::core::GatewayId;
use crate::core::GatewayType;
use crate::core::NormalizedApi;
use crate::core::PageCursor;
use crate::runtime::ApiStream;

// ============================================================================
// SECTION: Gateway Errors
// ============================================================================

/// Failures reported by adapters and the adapter factory.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Messages never contain credential values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Input is malformed or missing vendor-required fields.
    #[error("validation error: {0}")]
    Validation(String),
    /// Vendor already holds an API with the same identity.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Target does not exist on the vendor.
    #[error("not found: {0}")]
    NotFound(String),
    /// Vendor rejected the credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Transport failure or timeout.
    #[error("network error: {0}")]
    Network(String),
    /// Server certificate was not trusted.
    #[error("tls validation failed: {0}")]
    TlsValidation(String),
    /// Vendor does not offer the requested capability.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
    /// No adapter is registered for the gateway type.
    #[error("unknown gateway type: {0}")]
    UnknownGatewayType(String),
    /// Vendor answered with something no other variant describes.
    #[error(
        "unexpected response{}: {message}",
        .status.map(|code| format!(" (status {code})")).unwrap_or_default()
    )]
    UnexpectedResponse {
        /// HTTP status when one was received.
        status: Option<u16>,
        /// Short description of the response.
        message: String,
    },
}

impl GatewayError {
    /// Returns the stable label for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Conflict(_) => "conflict",
            Self::NotFound(_) => "not_found",
            Self::Unauthorized(_) => "unauthorized",
            Self::Network(_) => "network",
            Self::TlsValidation(_) => "tls_validation",
            Self::UnsupportedOperation(_) => "unsupported_operation",
            Self::UnknownGatewayType(_) => "unknown_gateway_type",
            Self::UnexpectedResponse {
                ..
            } => "unexpected_response",
        }
    }

    /// Builds an [`GatewayError::UnexpectedResponse`] without a status.
    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            status: None,
            message: message.into(),
        }
    }

    /// Classifies a probe failure into a connection test outcome.
    #[must_use]
    pub const fn connection_outcome(&self) -> ConnectionTestResult {
        match self {
            Self::Unauthorized(_) => ConnectionTestResult::AuthenticationFailed,
            Self::Network(_) => ConnectionTestResult::NetworkUnreachable,
            Self::TlsValidation(_) => ConnectionTestResult::TlsValidationFailed,
            _ => ConnectionTestResult::UnsupportedConfiguration,
        }
    }
}

// ============================================================================
// SECTION: Gateway Adapter
// ============================================================================

/// Capability set implemented once per vendor.
///
/// Implementations are bound to one [`GatewayConfig`] at construction and
/// perform no network I/O until an operation is invoked. Every operation that
/// touches the network honors the config's TLS settings and the process-wide
/// timeouts.
///
/// # Invariants
/// - Implementations hold no mutable state shared with other instances.
/// - `gateway_type` equals the registry key the adapter was built for.
pub trait GatewayAdapter: Send + Sync {
    /// Returns the vendor key the adapter serves.
    fn gateway_type(&self) -> &GatewayType;

    /// Performs the cheapest authenticated call the vendor offers.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] describing why the probe failed.
    fn check_connection(&self) -> Result<(), GatewayError>;

    /// Probes the gateway and classifies the outcome.
    fn test_connection(&self) -> ConnectionTestResult {
        match self.check_connection() {
            Ok(()) => ConnectionTestResult::Success,
            Err(err) => err.connection_outcome(),
        }
    }

    /// Returns a lazy stream over every API on the gateway.
    ///
    /// Each call starts a fresh traversal; the stream drains vendor pagination
    /// as it is consumed.
    fn list_apis(&self) -> ApiStream<'_>;

    /// Creates an API from a spec.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] for missing vendor fields and
    /// [`GatewayError::Conflict`] when the API already exists.
    fn create_api(&self, spec: &ApiSpec) -> Result<NormalizedApi, GatewayError>;

    /// Replaces an existing API definition.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] when `id` does not exist.
    fn update_api(&self, id: &ApiId, spec: &ApiSpec) -> Result<NormalizedApi, GatewayError>;

    /// Deletes an API.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] when `id` is already gone.
    fn delete_api(&self, id: &ApiId) -> Result<(), GatewayError>;

    /// Returns a metrics snapshot for an API.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnsupportedOperation`] when the vendor exposes
    /// no analytics.
    fn api_metrics(&self, id: &ApiId) -> Result<ApiMetrics, GatewayError> {
        Err(GatewayError::UnsupportedOperation(format!(
            "{} does not expose metrics for {id}",
            self.gateway_type()
        )))
    }
}

// ============================================================================
// SECTION: Pagination Source
// ============================================================================

/// One page of APIs fetched from a vendor.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiPage {
    /// APIs on this page.
    pub items: Vec<NormalizedApi>,
    /// Cursor for the next page; `None` ends the traversal.
    pub next: Option<PageCursor>,
}

impl ApiPage {
    /// Creates a page that ends the traversal.
    #[must_use]
    pub const fn last(items: Vec<NormalizedApi>) -> Self {
        Self {
            items,
            next: None,
        }
    }
}

/// Fetches vendor pages on demand.
pub trait PageSource {
    /// Fetches the page at `cursor`; `None` requests the first page.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the page cannot be fetched or decoded.
    fn fetch_page(&mut self, cursor: Option<&PageCursor>) -> Result<ApiPage, GatewayError>;
}

// ============================================================================
// SECTION: Config Repository
// ============================================================================

/// Config repository errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Decryption failures are never converted into empty values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// Config failed validation.
    #[error("invalid gateway config: {0}")]
    Validation(String),
    /// Another config already uses the name.
    #[error("gateway name already in use: {0}")]
    Conflict(String),
    /// No config with the identifier exists.
    #[error("gateway config not found: {0}")]
    NotFound(String),
    /// Encryption is required but no key is configured.
    #[error("encryption unavailable: {0}")]
    EncryptionUnavailable(String),
    /// A stored value could not be decrypted under the current key.
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),
    /// Filesystem failure.
    #[error("config repository io error: {0}")]
    Io(String),
    /// Storage engine failure.
    #[error("config repository storage error: {0}")]
    Storage(String),
    /// Stored data failed integrity checks.
    #[error("config repository corruption: {0}")]
    Corrupt(String),
    /// Stored data version is incompatible.
    #[error("config repository version mismatch: {0}")]
    VersionMismatch(String),
}

impl RepositoryError {
    /// Returns the stable label for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Conflict(_) => "conflict",
            Self::NotFound(_) => "not_found",
            Self::EncryptionUnavailable(_) => "encryption_unavailable",
            Self::DecryptionFailed(_) => "decryption_failed",
            Self::Io(_) => "io",
            Self::Storage(_) => "storage",
            Self::Corrupt(_) => "corrupt",
            Self::VersionMismatch(_) => "version_mismatch",
        }
    }
}

/// Result of a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReceipt {
    /// Identifier of the stored config.
    pub id: GatewayId,
    /// True when the save created a new record.
    pub created: bool,
    /// Sensitive fields stored readable because encryption is disabled.
    pub plaintext_fields: Vec<String>,
}

/// Persistent store of gateway configs.
///
/// # Invariants
/// - Names are unique across stored configs.
/// - `load` returns decrypted values; `list_all` never decrypts.
pub trait ConfigRepository {
    /// Inserts or updates a config, assigning an id on first save.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Conflict`] when the name is taken and
    /// [`RepositoryError::Validation`] when the config is malformed.
    fn save(&self, config: &GatewayConfig) -> Result<SaveReceipt, RepositoryError>;

    /// Loads a config with sensitive fields decrypted.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] when absent and
    /// [`RepositoryError::DecryptionFailed`] when a value cannot be decrypted.
    fn load(&self, id: &GatewayId) -> Result<GatewayConfig, RepositoryError>;

    /// Lists every stored config without touching secrets.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] when the store cannot be read.
    fn list_all(&self) -> Result<Vec<GatewayConfigSummary>, RepositoryError>;

    /// Deletes a config and its managed certificate; absent ids are a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] when the store cannot be written.
    fn delete(&self, id: &GatewayId) -> Result<(), RepositoryError>;
}
