// crates/gatewayctrl-credentials/src/lib.rs
// ============================================================================
// Module: GatewayCtrl Credentials
// Description: Encryption at rest for sensitive gateway config fields.
// Purpose: Provide the credential store and field sealing used by repositories.
// Dependencies: gatewayctrl-core, chacha20poly1305, base64, rand
// ============================================================================

//! ## Overview
//! This crate protects secrets stored in gateway configs. [`CredentialStore`]
//! encrypts single values under a process key; [`FieldSealer`] applies it to
//! field maps according to the injected sensitive-name set and the
//! [`EncryptionPolicy`].
//! Invariants:
//! - Legacy plaintext values pass through decryption unchanged.
//! - Marked values never decrypt to a silently wrong or empty plaintext.
//!
//! Security posture: key material and plaintext never appear in errors, audit
//! events, or `Debug` output.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod error;
pub mod key;
pub mod sealer;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::CredentialError;
pub use key::EncryptionKey;
pub use key::KEY_LEN;
pub use sealer::EncryptionPolicy;
pub use sealer::FieldSealer;
pub use sealer::SealedFields;
pub use store::CredentialStore;
pub use store::DEFAULT_KEY_ENV;
pub use store::ENCRYPTED_MARKER;
pub use store::EncryptedValue;
pub use store::is_encrypted;
