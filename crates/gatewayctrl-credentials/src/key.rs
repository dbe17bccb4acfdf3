// crates/gatewayctrl-credentials/src/key.rs
// ============================================================================
// Module: Encryption Key
// Description: Symmetric key material for credential protection.
// Purpose: Parse, generate, and hold the process encryption key.
// Dependencies: base64, rand
// ============================================================================

//! ## Overview
//! The key is 32 random bytes supplied as standard base64. It is read once at
//! start-up, kept in memory, and never written to storage or logs.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::CredentialError;

/// Key length in bytes.
pub const KEY_LEN: usize = 32;

/// Symmetric key used by the credential store.
///
/// # Invariants
/// - Always exactly [`KEY_LEN`] bytes.
/// - `Debug` never prints key material.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKey([u8; KEY_LEN]);

impl EncryptionKey {
    /// Wraps raw key bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Parses a base64-encoded key.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::InvalidKey`] when the input is not base64 or
    /// does not decode to exactly [`KEY_LEN`] bytes.
    pub fn from_base64(encoded: &str) -> Result<Self, CredentialError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|_| CredentialError::InvalidKey("key is not valid base64".to_string()))?;
        let array: [u8; KEY_LEN] = bytes.try_into().map_err(|bytes: Vec<u8>| {
            CredentialError::InvalidKey(format!(
                "key must decode to {KEY_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    /// Generates a fresh random key.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0_u8; KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Returns the base64 form suitable for the key environment variable.
    #[must_use]
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Returns the raw key bytes.
    pub(crate) const fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::use_debug,
        reason = "Test-only assertions are permitted."
    )]

    use super::*;

    #[test]
    fn base64_round_trips() {
        let key = EncryptionKey::generate();
        assert_eq!(EncryptionKey::from_base64(&key.to_base64()).unwrap(), key);
    }

    #[test]
    fn short_keys_are_rejected() {
        let err = EncryptionKey::from_base64(&STANDARD.encode([1_u8; 16])).unwrap_err();
        assert!(err.to_string().contains("32 bytes"));
    }

    #[test]
    fn non_base64_is_rejected() {
        assert!(matches!(
            EncryptionKey::from_base64("not*base64"),
            Err(CredentialError::InvalidKey(_))
        ));
    }

    #[test]
    fn debug_is_redacted() {
        let key = EncryptionKey::from_bytes([7_u8; KEY_LEN]);
        assert_eq!(format!("{key:?}"), "EncryptionKey(<redacted>)");
    }
}
