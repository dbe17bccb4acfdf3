// crates/gatewayctrl-adapters/src/lib.rs
// ============================================================================
// Module: GatewayCtrl Adapters
// Description: Vendor adapters, the adapter factory, and shared HTTP scaffolding.
// Purpose: Translate the adapter contract into each vendor's management API.
// Dependencies: gatewayctrl-core, reqwest, rustls, serde_json, hmac, sha2, time
// ============================================================================

//! ## Overview
//! One module per vendor (AWS, Kong, WSO2, Tyk, Gravitee) implements
//! [`gatewayctrl_core::GatewayAdapter`]. All of them go through
//! [`http::VendorClient`], which owns the timeout, TLS, redirect, and response
//! size policy and maps every failure into [`gatewayctrl_core::GatewayError`].
//! [`AdapterFactory`] selects a vendor by config type and wraps the adapter in
//! an [`AuditedAdapter`].
//! Invariants:
//! - Building an adapter performs no network I/O.
//! - No transport error type crosses the contract boundary.
//! - Nothing retries automatically.
//!
//! Security posture: vendor responses are untrusted and size-limited;
//! credentials never appear in errors, audit events, or `Debug` output.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audited;
pub mod aws;
pub mod factory;
pub mod gravitee;
pub mod http;
pub mod kong;
pub mod probe;
pub mod shape;
pub mod sigv4;
pub mod tyk;
pub mod wso2;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audited::AuditedAdapter;
pub use aws::AWS_TYPE;
pub use aws::AwsAdapter;
pub use factory::AdapterConstructor;
pub use factory::AdapterFactory;
pub use gravitee::GRAVITEE_TYPE;
pub use gravitee::GraviteeAdapter;
pub use http::RequestAuth;
pub use http::VendorClient;
pub use http::VendorRequest;
pub use kong::KONG_TYPE;
pub use kong::KongAdapter;
pub use probe::ProbeOutcome;
pub use probe::ProbeReport;
pub use probe::probe_gateways;
pub use sigv4::SigV4Signer;
pub use sigv4::SigningCredentials;
pub use tyk::TYK_TYPE;
pub use tyk::TykAdapter;
pub use wso2::WSO2_TYPE;
pub use wso2::Wso2Adapter;
