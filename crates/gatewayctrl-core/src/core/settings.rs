// crates/gatewayctrl-core/src/core/settings.rs
// ============================================================================
// Module: Outbound HTTP Settings
// Description: Process-wide bounds applied to every vendor call.
// Purpose: Keep timeout and size limits uniform across adapters.
// Dependencies: std
// ============================================================================

//! ## Overview
//! [`HttpSettings`] is handed to each adapter at construction. Adapters do not
//! choose their own timeouts; the shared HTTP scaffolding applies these values.

use std::time::Duration;

/// Default total request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default maximum response body size.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 8 * 1024 * 1024;
/// Default maximum number of pages drained per listing.
pub const DEFAULT_MAX_PAGES: usize = 1_000;
/// Default page size requested from vendors that paginate.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Bounds applied to outbound vendor requests.
///
/// # Invariants
/// - All durations and limits are non-zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    /// Total time allowed per request.
    pub timeout: Duration,
    /// Time allowed to establish a connection.
    pub connect_timeout: Duration,
    /// Maximum response body size in bytes.
    pub max_response_bytes: usize,
    /// Maximum pages drained in a single listing.
    pub max_pages: usize,
    /// Page size requested from paginating vendors.
    pub page_size: usize,
    /// User-Agent header value.
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            max_pages: DEFAULT_MAX_PAGES,
            page_size: DEFAULT_PAGE_SIZE,
            user_agent: format!("gatewayctrl/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
