// crates/gatewayctrl-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for bounded reads and input assembly in the CLI.
// Purpose: Ensure file inputs fail closed and flags overlay spec files.
// Dependencies: gatewayctrl-cli main helpers, tempfile
// ============================================================================

//! ## Overview
//! Validates `read_bytes_with_limit`, API spec assembly and certificate import.
//!
//! Security posture: CLI inputs are untrusted; size limits must fail closed.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;

use tempfile::TempDir;

use super::ApiSpecArgs;
use super::ReadLimitError;
use super::build_api_spec;
use super::install_certificate;
use super::read_bytes_with_limit;

// ============================================================================
// SECTION: Bounded Reads
// ============================================================================

#[test]
fn read_bytes_with_limit_allows_small_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("small.bin");
    fs::write(&path, b"ok").unwrap();

    let bytes = read_bytes_with_limit(&path, 8).expect("read small file");
    assert_eq!(bytes, b"ok");
}

#[test]
fn read_bytes_with_limit_rejects_large_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("large.bin");
    fs::write(&path, vec![0_u8; 16]).unwrap();

    match read_bytes_with_limit(&path, 8) {
        Err(ReadLimitError::TooLarge {
            size,
            limit,
        }) => {
            assert_eq!(size, 16);
            assert_eq!(limit, 8);
        }
        other => panic!("expected TooLarge, got {other:?}"),
    }
}

#[test]
fn read_bytes_with_limit_reports_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = read_bytes_with_limit(&dir.path().join("absent.json"), 8);
    assert!(matches!(result, Err(ReadLimitError::Io(_))));
}

// ============================================================================
// SECTION: API Spec Assembly
// ============================================================================

#[test]
fn flags_override_spec_file_fields() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("orders.json");
    fs::write(
        &path,
        r#"{"name":"orders","basePath":"/orders","methods":["GET"],"backend":"http://a:9000"}"#,
    )
    .unwrap();

    let spec = build_api_spec(ApiSpecArgs {
        spec_file: Some(path),
        backend: Some("http://b:9000".to_string()),
        methods: vec!["get".to_string(), "post".to_string()],
        ..ApiSpecArgs::default()
    })
    .unwrap();

    assert_eq!(spec.name, "orders");
    assert_eq!(spec.base_path.as_deref(), Some("/orders"));
    assert_eq!(spec.backend.as_deref(), Some("http://b:9000"));
    assert_eq!(spec.normalized_methods(), vec!["GET".to_string(), "POST".to_string()]);
}

#[test]
fn spec_without_name_is_rejected() {
    let err = build_api_spec(ApiSpecArgs {
        base_path: Some("/orders".to_string()),
        ..ApiSpecArgs::default()
    })
    .unwrap_err();
    assert!(err.to_string().contains("name"));
}

#[test]
fn malformed_spec_file_names_the_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{not json").unwrap();

    let err = build_api_spec(ApiSpecArgs {
        spec_file: Some(path.clone()),
        ..ApiSpecArgs::default()
    })
    .unwrap_err();
    assert!(err.to_string().contains(&path.display().to_string()));
}

// ============================================================================
// SECTION: Certificate Import
// ============================================================================

#[test]
fn certificates_are_copied_under_unique_names() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("ca.pem");
    fs::write(&source, "-----BEGIN CERTIFICATE-----\n").unwrap();
    let managed = dir.path().join("certificates");

    let first = install_certificate(&managed, "Kong Dev", &source).unwrap();
    let second = install_certificate(&managed, "Kong Dev", &source).unwrap();

    assert_ne!(first, second);
    assert!(first.starts_with(&managed));
    let file_name = first.file_name().unwrap().to_string_lossy().to_string();
    assert!(file_name.starts_with("Kong_Dev-"));
    assert_eq!(fs::read_to_string(&second).unwrap(), "-----BEGIN CERTIFICATE-----\n");
}
