// crates/gatewayctrl-config/src/lib.rs
// ============================================================================
// Module: GatewayCtrl Config Library
// Description: Canonical host config model, validation, and component builders.
// Purpose: Single source of truth for gatewayctrl.toml semantics.
// Dependencies: gatewayctrl-core, gatewayctrl-credentials, gatewayctrl-store-sqlite, toml
// ============================================================================

//! ## Overview
//! `gatewayctrl-config` defines the configuration model for GatewayCtrl hosts.
//! It validates strictly and turns a loaded config into the pieces a host
//! wires together: HTTP settings, the field sealer, and the audit sink.
//!
//! Security posture: config inputs are untrusted; key material never lives in
//! the file.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
