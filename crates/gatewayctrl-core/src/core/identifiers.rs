// crates/gatewayctrl-core/src/core/identifiers.rs
// ============================================================================
// Module: GatewayCtrl Identifiers
// Description: Opaque identifiers for gateway configs, vendor types, and APIs.
// Purpose: Provide strongly typed, serializable IDs with stable string forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Identifiers are opaque and serialize as plain strings. [`GatewayType`] is
//! the only identifier with normalization: vendor keys are trimmed and
//! lowercased so `"Kong"` and `"kong"` select the same adapter.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Identifier of a stored gateway configuration.
///
/// # Invariants
/// - Assigned by the config repository on first save and never changed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GatewayId(String);

impl GatewayId {
    /// Creates a gateway identifier from an existing string form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GatewayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for GatewayId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for GatewayId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Registered vendor key selecting an adapter implementation.
///
/// # Invariants
/// - Stored trimmed and ASCII-lowercased.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct GatewayType(String);

impl GatewayType {
    /// Creates a normalized vendor key.
    #[must_use]
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(key.as_ref().trim().to_ascii_lowercase())
    }

    /// Returns the vendor key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GatewayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for GatewayType {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for GatewayType {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<GatewayType> for String {
    fn from(value: GatewayType) -> Self {
        value.0
    }
}

/// Vendor-assigned identifier of an API registered on a gateway.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiId(String);

impl ApiId {
    /// Creates an API identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ApiId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ApiId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Opaque vendor pagination cursor (offset, page number, or continuation token).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageCursor(String);

impl PageCursor {
    /// Creates a cursor from its vendor-specific string form.
    #[must_use]
    pub fn new(cursor: impl Into<String>) -> Self {
        Self(cursor.into())
    }

    /// Returns the cursor as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
