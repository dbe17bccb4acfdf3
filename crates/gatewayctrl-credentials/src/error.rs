// crates/gatewayctrl-credentials/src/error.rs
// ============================================================================
// Module: Credential Errors
// Description: Failures raised while protecting credential fields.
// Purpose: Keep crypto failures inside the shared repository taxonomy.
// Dependencies: gatewayctrl-core, thiserror
// ============================================================================

use gatewayctrl_core::RepositoryError;
use thiserror::Error;

/// Credential protection errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Messages never include plaintext or key material.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// No key is configured.
    #[error("encryption unavailable: {0}")]
    EncryptionUnavailable(String),
    /// Value could not be decrypted under the current key.
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),
    /// Supplied key material is malformed.
    #[error("invalid encryption key: {0}")]
    InvalidKey(String),
    /// Value carries the encrypted marker but cannot be stored as given.
    #[error("invalid credential value: {0}")]
    InvalidValue(String),
}

impl From<CredentialError> for RepositoryError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::EncryptionUnavailable(message) => Self::EncryptionUnavailable(message),
            CredentialError::DecryptionFailed(message) => Self::DecryptionFailed(message),
            CredentialError::InvalidKey(message) => Self::EncryptionUnavailable(message),
            CredentialError::InvalidValue(message) => Self::Validation(message),
        }
    }
}
