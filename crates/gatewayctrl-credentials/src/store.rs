// crates/gatewayctrl-credentials/src/store.rs
// ============================================================================
// Module: Credential Store
// Description: Encrypts and decrypts individual credential values.
// Purpose: Protect secrets at rest while keeping legacy plaintext readable.
// Dependencies: base64, chacha20poly1305, rand, gatewayctrl-core
// ============================================================================

//! ## Overview
//! [`CredentialStore`] is a pure transform bound to an optional key. Encrypted
//! values carry the [`ENCRYPTED_MARKER`] prefix followed by base64 of
//! `nonce || ciphertext || tag` (XChaCha20-Poly1305, 24-byte random nonce).
//! Values without the marker are legacy plaintext and pass through `decrypt`
//! unchanged; values with the marker either decrypt under the current key or
//! fail with [`CredentialError::DecryptionFailed`]. Nothing is ever decoded to
//! an empty or partial value.
//!
//! Security posture: the key is read-only after construction and the store is
//! safe to share across threads without locking.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chacha20poly1305::Key;
use chacha20poly1305::KeyInit;
use chacha20poly1305::XChaCha20Poly1305;
use chacha20poly1305::XNonce;
use chacha20poly1305::aead::Aead;
use chacha20poly1305::aead::Payload;
use gatewayctrl_core::AuditSink;
use gatewayctrl_core::CredentialAuditEvent;
use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::CredentialError;
use crate::key::EncryptionKey;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Prefix identifying an encrypted value.
pub const ENCRYPTED_MARKER: &str = "enc:v1:";
/// Default environment variable holding the base64 key.
pub const DEFAULT_KEY_ENV: &str = "GATEWAYCTRL_ENCRYPTION_KEY";
/// Nonce length for XChaCha20-Poly1305.
const NONCE_LEN: usize = 24;
/// Authentication tag length.
const TAG_LEN: usize = 16;
/// Associated data binding ciphertexts to the value format version.
const AAD: &[u8] = b"gatewayctrl:credential:v1";

// ============================================================================
// SECTION: Encrypted Value
// ============================================================================

/// Stored form of an encrypted credential value.
///
/// # Invariants
/// - The inner string always starts with [`ENCRYPTED_MARKER`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncryptedValue(String);

impl EncryptedValue {
    /// Wraps a stored string if it bears the encrypted marker.
    #[must_use]
    pub fn parse(stored: &str) -> Option<Self> {
        is_encrypted(stored).then(|| Self(stored.to_string()))
    }

    /// Returns the stored string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the value, returning the stored string form.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for EncryptedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns true when a stored value bears the encrypted marker.
#[must_use]
pub fn is_encrypted(stored: &str) -> bool {
    stored.starts_with(ENCRYPTED_MARKER)
}

// ============================================================================
// SECTION: Credential Store
// ============================================================================

/// Symmetric transform for sensitive field values.
///
/// # Invariants
/// - `is_enabled` is fixed for the lifetime of the store.
/// - A value produced by `encrypt` always round-trips under the same key.
#[derive(Clone)]
pub struct CredentialStore {
    /// Cipher bound to the configured key.
    cipher: Option<XChaCha20Poly1305>,
}

impl CredentialStore {
    /// Creates a store; `None` disables encryption.
    #[must_use]
    pub fn new(key: Option<&EncryptionKey>) -> Self {
        Self {
            cipher: key.map(|key| XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()))),
        }
    }

    /// Creates a store with encryption disabled.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            cipher: None,
        }
    }

    /// Creates a store from the raw value of the key source.
    ///
    /// An absent or blank value disables encryption and records a warning
    /// event; a malformed value is an error.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::InvalidKey`] when the value is malformed.
    pub fn from_key_source(
        raw: Option<&str>,
        source_name: &str,
        audit: &dyn AuditSink,
    ) -> Result<Self, CredentialError> {
        match raw.map(str::trim).filter(|value| !value.is_empty()) {
            None => {
                audit.record_credential(&CredentialAuditEvent {
                    detail: Some(format!(
                        "{source_name} is not set; credentials will be stored as plaintext"
                    )),
                    ..CredentialAuditEvent::new("encryption_disabled")
                });
                Ok(Self::disabled())
            }
            Some(encoded) => {
                let key = EncryptionKey::from_base64(encoded)
                    .map_err(|err| CredentialError::InvalidKey(format!("{source_name}: {err}")))?;
                audit.record_credential(&CredentialAuditEvent {
                    detail: Some(format!("key loaded from {source_name}")),
                    ..CredentialAuditEvent::new("encryption_enabled")
                });
                Ok(Self::new(Some(&key)))
            }
        }
    }

    /// Creates a store from an environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::InvalidKey`] when the variable holds a
    /// malformed key.
    pub fn from_env(var: &str, audit: &dyn AuditSink) -> Result<Self, CredentialError> {
        let raw = std::env::var(var).ok();
        Self::from_key_source(raw.as_deref(), var, audit)
    }

    /// Returns true when a key is configured.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.cipher.is_some()
    }

    /// Encrypts a plaintext value under a fresh random nonce.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::EncryptionUnavailable`] when no key is configured.
    pub fn encrypt(&self, plaintext: &str) -> Result<EncryptedValue, CredentialError> {
        let cipher = self.cipher.as_ref().ok_or_else(|| {
            CredentialError::EncryptionUnavailable("no encryption key configured".to_string())
        })?;
        let mut nonce = [0_u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);
        let sealed = cipher
            .encrypt(
                XNonce::from_slice(&nonce),
                Payload {
                    msg: plaintext.as_bytes(),
                    aad: AAD,
                },
            )
            .map_err(|_| {
                CredentialError::EncryptionUnavailable("cipher rejected input".to_string())
            })?;
        let mut blob = Vec::with_capacity(NONCE_LEN + sealed.len());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&sealed);
        Ok(EncryptedValue(format!("{ENCRYPTED_MARKER}{}", STANDARD.encode(blob))))
    }

    /// Decrypts a stored value; values without the marker pass through.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::DecryptionFailed`] when a marked value is
    /// malformed, was produced under another key, or no key is configured.
    pub fn decrypt(&self, stored: &str) -> Result<String, CredentialError> {
        let Some(encoded) = stored.strip_prefix(ENCRYPTED_MARKER) else {
            return Ok(stored.to_string());
        };
        let cipher = self.cipher.as_ref().ok_or_else(|| {
            CredentialError::DecryptionFailed(
                "value is encrypted but no encryption key is configured".to_string(),
            )
        })?;
        let blob = STANDARD.decode(encoded).map_err(|_| {
            CredentialError::DecryptionFailed("encrypted value is not valid base64".to_string())
        })?;
        if blob.len() < NONCE_LEN + TAG_LEN {
            return Err(CredentialError::DecryptionFailed(
                "encrypted value is truncated".to_string(),
            ));
        }
        let (nonce, sealed) = blob.split_at(NONCE_LEN);
        let plaintext = cipher
            .decrypt(
                XNonce::from_slice(nonce),
                Payload {
                    msg: sealed,
                    aad: AAD,
                },
            )
            .map_err(|_| {
                CredentialError::DecryptionFailed(
                    "authentication failed; the key changed or the value is corrupt".to_string(),
                )
            })?;
        String::from_utf8(plaintext).map_err(|_| {
            CredentialError::DecryptionFailed("decrypted value is not valid UTF-8".to_string())
        })
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore").field("enabled", &self.is_enabled()).finish()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
