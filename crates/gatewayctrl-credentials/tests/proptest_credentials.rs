// crates/gatewayctrl-credentials/tests/proptest_credentials.rs
// ============================================================================
// Module: Credential Store Property Tests
// Description: Round-trip, legacy pass-through, and key-mismatch properties.
// ============================================================================
//! ## Overview
//! Property checks over arbitrary plaintext for the credential store.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::BTreeMap;

use gatewayctrl_core::RepositoryError;
use gatewayctrl_core::SensitiveFieldNames;
use gatewayctrl_credentials::CredentialError;
use gatewayctrl_credentials::CredentialStore;
use gatewayctrl_credentials::ENCRYPTED_MARKER;
use gatewayctrl_credentials::EncryptionKey;
use gatewayctrl_credentials::EncryptionPolicy;
use gatewayctrl_credentials::FieldSealer;
use proptest::prelude::*;

fn key_from(seed: u8) -> EncryptionKey {
    EncryptionKey::from_bytes([seed; 32])
}

proptest! {
    #[test]
    fn decrypt_inverts_encrypt(plaintext in any::<String>(), seed in any::<u8>()) {
        let store = CredentialStore::new(Some(&key_from(seed)));
        let sealed = store.encrypt(&plaintext).unwrap();
        prop_assert_eq!(store.decrypt(sealed.as_str()).unwrap(), plaintext);
    }

    #[test]
    fn legacy_plaintext_passes_through(plaintext in any::<String>()) {
        prop_assume!(!plaintext.starts_with(ENCRYPTED_MARKER));
        let store = CredentialStore::new(Some(&key_from(9)));
        prop_assert_eq!(store.decrypt(&plaintext).unwrap(), plaintext.clone());
        prop_assert_eq!(CredentialStore::disabled().decrypt(&plaintext).unwrap(), plaintext);
    }

    #[test]
    fn mismatched_key_never_yields_plaintext(
        plaintext in any::<String>(),
        first in any::<u8>(),
        second in any::<u8>(),
    ) {
        prop_assume!(first != second);
        let sealed = CredentialStore::new(Some(&key_from(first))).encrypt(&plaintext).unwrap();
        let result = CredentialStore::new(Some(&key_from(second))).decrypt(sealed.as_str());
        prop_assert!(matches!(result, Err(CredentialError::DecryptionFailed(_))));
    }

    #[test]
    fn sealed_sensitive_values_differ_from_plaintext(value in "[ -~]{1,64}") {
        let sealer = FieldSealer::new(
            CredentialStore::new(Some(&key_from(3))),
            SensitiveFieldNames::default(),
            EncryptionPolicy::Required,
        );
        let fields = BTreeMap::from([("password".to_string(), value.clone())]);
        let sealed = sealer.seal(&fields).unwrap();
        prop_assert_ne!(&sealed.fields["password"], &value);
        prop_assert_eq!(sealer.unseal(&sealed.fields).unwrap(), fields);
    }
}

#[test]
fn credential_errors_map_into_repository_taxonomy() {
    let unavailable: RepositoryError =
        CredentialError::EncryptionUnavailable("no key".to_string()).into();
    assert!(matches!(unavailable, RepositoryError::EncryptionUnavailable(_)));
    let failed: RepositoryError = CredentialError::DecryptionFailed("bad tag".to_string()).into();
    assert!(matches!(failed, RepositoryError::DecryptionFailed(_)));
}
