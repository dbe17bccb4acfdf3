// crates/gatewayctrl-store-sqlite/src/lib.rs
// ============================================================================
// Module: GatewayCtrl SQLite Store
// Description: SQLite implementation of the gateway config repository.
// Purpose: Persist gateway configs durably with sealed sensitive fields.
// Dependencies: gatewayctrl-core, gatewayctrl-credentials, rusqlite
// ============================================================================

//! ## Overview
//! [`SqliteConfigRepository`] implements [`gatewayctrl_core::ConfigRepository`]
//! with one row per gateway and a transaction around every write.

pub mod store;

pub use store::SqliteConfigRepository;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
