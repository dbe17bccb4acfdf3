// crates/gatewayctrl-core/src/lib.rs
// ============================================================================
// Module: GatewayCtrl Core
// Description: Data model, adapter contract, and error taxonomy for GatewayCtrl.
// Purpose: Provide backend-agnostic types shared by adapters, stores, and hosts.
// Dependencies: serde, serde_json, thiserror, url
// ============================================================================

//! ## Overview
//! GatewayCtrl normalizes lifecycle operations across structurally different
//! API-gateway management APIs. This crate holds the pieces every other crate
//! agrees on: the gateway config model, the [`GatewayAdapter`] capability set,
//! the [`ConfigRepository`] contract, the lazy [`ApiStream`], and audit sinks.
//! Invariants:
//! - No network or storage code lives here.
//! - Errors crossing a contract boundary are [`GatewayError`] or [`RepositoryError`].
//!
//! Security posture: configs carry credentials; `Debug` output and audit
//! events are redacted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AdapterAuditEvent;
pub use audit::AuditSink;
pub use audit::CredentialAuditEvent;
pub use audit::FileAuditSink;
pub use audit::InMemoryAuditSink;
pub use audit::NoopAuditSink;
pub use audit::RepositoryAuditEvent;
pub use audit::StderrAuditSink;
pub use crate::core::*;
pub use interfaces::ApiPage;
pub use interfaces::ConfigRepository;
pub use interfaces::GatewayAdapter;
pub use interfaces::GatewayError;
pub use interfaces::PageSource;
pub use interfaces::RepositoryError;
pub use interfaces::SaveReceipt;
pub use runtime::ApiStream;
