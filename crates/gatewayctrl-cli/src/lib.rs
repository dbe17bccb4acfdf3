// crates/gatewayctrl-cli/src/lib.rs
// ============================================================================
// Module: GatewayCtrl CLI Library
// Description: Shared helpers for the gatewayctrl binary.
// Purpose: Expose the message catalog and output shaping for reuse in tests.
// Dependencies: gatewayctrl-core, serde_json
// ============================================================================

//! ## Overview
//! Library half of the `gatewayctrl` binary: the message catalog behind the
//! [`t!`] macro and the helpers that shape gateway records for display.

pub mod i18n;
pub mod present;
