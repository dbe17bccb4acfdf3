// crates/gatewayctrl-adapters/tests/transport.rs
// ============================================================================
// Module: Adapter Transport Tests
// Description: Connection tests against stalled and TLS-terminating vendors.
// Purpose: Ensure timeouts are bounded and TLS trust fails closed.
// ============================================================================

//! ## Overview
//! These tests run real sockets on loopback: one vendor accepts and never
//! answers, another terminates TLS with a freshly generated self-signed
//! certificate.

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
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use std::io::Read;
use std::io::Write;
use std::net::SocketAddr;
use std::net::TcpListener;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use gatewayctrl_adapters::AdapterFactory;
use gatewayctrl_core::ConnectionTestResult;
use gatewayctrl_core::GatewayConfig;
use gatewayctrl_core::HttpSettings;
use gatewayctrl_core::NoopAuditSink;
use rcgen::generate_simple_self_signed;
use rustls::ServerConfig;
use rustls::ServerConnection;
use rustls::StreamOwned;
use rustls::pki_types::CertificateDer;
use rustls::pki_types::PrivateKeyDer;
use rustls::pki_types::PrivatePkcs8KeyDer;

use crate::common::fast_settings;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Kong config pointed at `base_url`.
fn kong(base_url: &str, tls_verify: bool) -> GatewayConfig {
    let mut config =
        GatewayConfig::new("Kong-Edge", "kong", base_url).with_credential("apiKey", "abc123");
    config.tls_verify = tls_verify;
    config
}

/// Runs a connection test with the given client settings.
fn test_connection(config: &GatewayConfig, settings: HttpSettings) -> ConnectionTestResult {
    AdapterFactory::with_builtin_adapters(settings, Arc::new(NoopAuditSink))
        .create(config)
        .unwrap()
        .test_connection()
}

/// Accepts one connection and holds it open without answering until the
/// returned sender is dropped.
fn start_silent_vendor() -> (SocketAddr, mpsc::Sender<()>, thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (release, released) = mpsc::channel::<()>();
    let handle = thread::spawn(move || {
        if let Ok((stream, _)) = listener.accept() {
            let _ = released.recv_timeout(Duration::from_secs(10));
            drop(stream);
        }
    });
    (addr, release, handle)
}

/// Serves one HTTPS request with a self-signed `localhost` certificate.
fn start_tls_vendor() -> (SocketAddr, thread::JoinHandle<()>) {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    let rcgen::CertifiedKey {
        cert,
        signing_key,
    } = generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    let cert_der = CertificateDer::from(cert);
    let key_der = PrivateKeyDer::from(PrivatePkcs8KeyDer::from(signing_key.serialize_der()));
    let config = Arc::new(
        ServerConfig::builder()
            .with_no_client_auth()
            .with_single_cert(vec![cert_der], key_der)
            .unwrap(),
    );

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        if let Ok((tcp, _)) = listener.accept() {
            let connection = ServerConnection::new(config).unwrap();
            let mut stream = StreamOwned::new(connection, tcp);
            let mut buf = [0_u8; 4096];
            let _ = stream.read(&mut buf);
            let body = br#"{"data":[]}"#;
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\
                 Connection: close\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(body);
            let _ = stream.flush();
        }
    });
    (addr, handle)
}

// ============================================================================
// SECTION: Timeouts
// ============================================================================

#[test]
fn silent_vendor_times_out_as_network_unreachable() {
    let (addr, release, handle) = start_silent_vendor();
    let settings = HttpSettings {
        timeout: Duration::from_millis(500),
        connect_timeout: Duration::from_millis(500),
        ..HttpSettings::default()
    };

    let started = Instant::now();
    let result = test_connection(&kong(&format!("http://{addr}"), true), settings);
    let elapsed = started.elapsed();
    drop(release);
    handle.join().unwrap();

    assert_eq!(result, ConnectionTestResult::NetworkUnreachable);
    assert!(elapsed < Duration::from_secs(5), "timeout not enforced: {elapsed:?}");
}

// ============================================================================
// SECTION: TLS
// ============================================================================

#[test]
fn self_signed_vendor_fails_tls_validation_when_verifying() {
    let (addr, handle) = start_tls_vendor();
    let url = format!("https://localhost:{}", addr.port());
    let result = test_connection(&kong(&url, true), fast_settings());
    handle.join().unwrap();
    assert_eq!(result, ConnectionTestResult::TlsValidationFailed);
}

#[test]
fn self_signed_vendor_is_accepted_without_verification() {
    let (addr, handle) = start_tls_vendor();
    let url = format!("https://localhost:{}", addr.port());
    let result = test_connection(&kong(&url, false), fast_settings());
    handle.join().unwrap();
    assert_eq!(result, ConnectionTestResult::Success);
}
