// crates/gatewayctrl-credentials/src/sealer.rs
// ============================================================================
// Module: Field Sealer
// Description: Applies the credential store to whole config field maps.
// Purpose: Encrypt sensitive fields on write and decrypt marked fields on read.
// Dependencies: gatewayctrl-core, serde
// ============================================================================

//! ## Overview
//! [`FieldSealer`] combines a [`CredentialStore`], the injected
//! [`SensitiveFieldNames`], and an [`EncryptionPolicy`]. Sealing encrypts every
//! sensitive field; when no key is configured the policy decides between
//! storing plaintext (reported back to the caller) and refusing the write.
//! Unsealing decrypts every marked value regardless of its field name.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use gatewayctrl_core::SensitiveFieldNames;
use serde::Deserialize;
use serde::Serialize;

use crate::error::CredentialError;
use crate::store::CredentialStore;
use crate::store::is_encrypted;

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Behavior when sensitive fields are written without a configured key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncryptionPolicy {
    /// Store plaintext and report the affected fields.
    #[default]
    OptOut,
    /// Refuse the write.
    Required,
}

// ============================================================================
// SECTION: Field Sealer
// ============================================================================

/// Field map after sealing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedFields {
    /// Values ready for storage.
    pub fields: BTreeMap<String, String>,
    /// Sensitive field names stored readable.
    pub plaintext_fields: Vec<String>,
}

/// Encrypts and decrypts config field maps.
///
/// # Invariants
/// - With a key configured, no sensitive field is ever returned unencrypted by `seal`.
#[derive(Debug, Clone)]
pub struct FieldSealer {
    /// Value transform.
    store: CredentialStore,
    /// Names treated as sensitive.
    names: SensitiveFieldNames,
    /// Behavior without a key.
    policy: EncryptionPolicy,
}

impl FieldSealer {
    /// Creates a sealer.
    #[must_use]
    pub const fn new(
        store: CredentialStore,
        names: SensitiveFieldNames,
        policy: EncryptionPolicy,
    ) -> Self {
        Self {
            store,
            names,
            policy,
        }
    }

    /// Returns the underlying credential store.
    #[must_use]
    pub const fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Returns the sensitive field names.
    #[must_use]
    pub const fn sensitive_names(&self) -> &SensitiveFieldNames {
        &self.names
    }

    /// Returns the encryption policy.
    #[must_use]
    pub const fn policy(&self) -> EncryptionPolicy {
        self.policy
    }

    /// Prepares a field map for storage.
    ///
    /// Values bearing the encrypted marker are kept only when they decrypt
    /// under the current key; any other marked value is encrypted as
    /// plaintext.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::EncryptionUnavailable`] when a sensitive
    /// field is present, no key is configured, and the policy is
    /// [`EncryptionPolicy::Required`]. Returns
    /// [`CredentialError::InvalidValue`] when a marked value does not decrypt
    /// and no key is configured to encrypt it.
    pub fn seal(&self, fields: &BTreeMap<String, String>) -> Result<SealedFields, CredentialError> {
        let mut sealed = BTreeMap::new();
        let mut plaintext_fields = Vec::new();
        for (name, value) in fields {
            let stored = if value.is_empty() {
                value.clone()
            } else if is_encrypted(value) {
                self.seal_marked(name, value)?
            } else if !self.names.contains(name) {
                value.clone()
            } else if self.store.is_enabled() {
                self.store.encrypt(value)?.into_string()
            } else if self.policy == EncryptionPolicy::Required {
                return Err(CredentialError::EncryptionUnavailable(format!(
                    "field {name} is sensitive and encryption is required"
                )));
            } else {
                plaintext_fields.push(name.clone());
                value.clone()
            };
            sealed.insert(name.clone(), stored);
        }
        Ok(SealedFields {
            fields: sealed,
            plaintext_fields,
        })
    }

    /// Keeps a marked value that decrypts under the current key and encrypts
    /// any other marked value as plaintext.
    fn seal_marked(&self, name: &str, value: &str) -> Result<String, CredentialError> {
        if self.store.is_enabled() {
            if self.store.decrypt(value).is_ok() {
                return Ok(value.to_string());
            }
            return Ok(self.store.encrypt(value)?.into_string());
        }
        if self.policy == EncryptionPolicy::Required && self.names.contains(name) {
            return Err(CredentialError::EncryptionUnavailable(format!(
                "field {name} is sensitive and encryption is required"
            )));
        }
        Err(CredentialError::InvalidValue(format!(
            "field {name} looks encrypted but no encryption key is configured"
        )))
    }

    /// Decrypts every marked value in a stored field map.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::DecryptionFailed`] naming the first field
    /// that cannot be decrypted.
    pub fn unseal(
        &self,
        fields: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>, CredentialError> {
        fields
            .iter()
            .map(|(name, value)| {
                let plain = self.store.decrypt(value).map_err(|err| match err {
                    CredentialError::DecryptionFailed(reason) => {
                        CredentialError::DecryptionFailed(format!("field {name}: {reason}"))
                    }
                    other => other,
                })?;
                Ok((name.clone(), plain))
            })
            .collect()
    }

    /// Returns the sensitive fields currently stored readable.
    #[must_use]
    pub fn plaintext_sensitive_fields(&self, fields: &BTreeMap<String, String>) -> Vec<String> {
        fields
            .iter()
            .filter(|(name, value)| {
                self.names.contains(name) && !value.is_empty() && !is_encrypted(value)
            })
            .map(|(name, _)| name.clone())
            .collect()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use super::*;
    use crate::key::EncryptionKey;

    fn fields() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("apiKey".to_string(), "abc123".to_string()),
            ("username".to_string(), "admin".to_string()),
        ])
    }

    #[test]
    fn seal_encrypts_only_sensitive_fields() {
        let sealer = FieldSealer::new(
            CredentialStore::new(Some(&EncryptionKey::generate())),
            SensitiveFieldNames::default(),
            EncryptionPolicy::OptOut,
        );
        let sealed = sealer.seal(&fields()).unwrap();
        assert!(is_encrypted(&sealed.fields["apiKey"]));
        assert_eq!(sealed.fields["username"], "admin");
        assert!(sealed.plaintext_fields.is_empty());
        assert_eq!(sealer.unseal(&sealed.fields).unwrap(), fields());
    }

    #[test]
    fn opt_out_reports_plaintext_fields() {
        let sealer = FieldSealer::new(
            CredentialStore::disabled(),
            SensitiveFieldNames::default(),
            EncryptionPolicy::OptOut,
        );
        let sealed = sealer.seal(&fields()).unwrap();
        assert_eq!(sealed.fields, fields());
        assert_eq!(sealed.plaintext_fields, vec!["apiKey".to_string()]);
    }

    #[test]
    fn required_policy_refuses_plaintext() {
        let sealer = FieldSealer::new(
            CredentialStore::disabled(),
            SensitiveFieldNames::default(),
            EncryptionPolicy::Required,
        );
        assert!(matches!(
            sealer.seal(&fields()),
            Err(CredentialError::EncryptionUnavailable(_))
        ));
    }

    #[test]
    fn unseal_decrypts_marked_values_outside_the_name_set() {
        let store = CredentialStore::new(Some(&EncryptionKey::generate()));
        let wide = FieldSealer::new(
            store.clone(),
            SensitiveFieldNames::new(["vaultToken"]),
            EncryptionPolicy::OptOut,
        );
        let narrow =
            FieldSealer::new(store, SensitiveFieldNames::empty(), EncryptionPolicy::OptOut);
        let input = BTreeMap::from([("vaultToken".to_string(), "s3cret".to_string())]);
        let sealed = wide.seal(&input).unwrap();
        assert_eq!(narrow.unseal(&sealed.fields).unwrap(), input);
    }

    #[test]
    fn marked_literals_are_encrypted_under_the_current_key() {
        let sealer = FieldSealer::new(
            CredentialStore::new(Some(&EncryptionKey::generate())),
            SensitiveFieldNames::default(),
            EncryptionPolicy::Required,
        );
        let input = BTreeMap::from([
            ("apiKey".to_string(), "enc:v1:my-literal-password".to_string()),
            ("description".to_string(), "enc:v1:not-base64".to_string()),
        ]);
        let sealed = sealer.seal(&input).unwrap();
        assert_ne!(sealed.fields["apiKey"], "enc:v1:my-literal-password");
        assert!(is_encrypted(&sealed.fields["apiKey"]));
        assert_eq!(sealer.unseal(&sealed.fields).unwrap(), input);

        let resealed = sealer.seal(&sealed.fields).unwrap();
        assert_eq!(resealed.fields, sealed.fields);
    }

    #[test]
    fn marked_literals_without_a_key_are_rejected() {
        let sealer = FieldSealer::new(
            CredentialStore::disabled(),
            SensitiveFieldNames::default(),
            EncryptionPolicy::OptOut,
        );
        let input = BTreeMap::from([("apiKey".to_string(), "enc:v1:abc".to_string())]);
        assert!(matches!(sealer.seal(&input), Err(CredentialError::InvalidValue(_))));
    }

    #[test]
    fn unseal_names_the_failing_field() {
        let sealer = FieldSealer::new(
            CredentialStore::new(Some(&EncryptionKey::generate())),
            SensitiveFieldNames::default(),
            EncryptionPolicy::OptOut,
        );
        let other = FieldSealer::new(
            CredentialStore::new(Some(&EncryptionKey::generate())),
            SensitiveFieldNames::default(),
            EncryptionPolicy::OptOut,
        );
        let sealed = sealer.seal(&fields()).unwrap();
        let err = other.unseal(&sealed.fields).unwrap_err();
        assert!(err.to_string().contains("apiKey"));
    }
}
