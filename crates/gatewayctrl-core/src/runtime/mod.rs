// crates/gatewayctrl-core/src/runtime/mod.rs
// ============================================================================
// Module: GatewayCtrl Runtime Helpers
// Description: Runtime machinery shared by adapter implementations.
// Purpose: Expose the lazy API listing stream.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

pub mod pagination;

pub use pagination::ApiStream;
