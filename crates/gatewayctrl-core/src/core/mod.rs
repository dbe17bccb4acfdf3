// crates/gatewayctrl-core/src/core/mod.rs
// ============================================================================
// Module: GatewayCtrl Core Model
// Description: Data model shared by adapters, repositories, and hosts.
// Purpose: Group identifiers, configs, API records, and HTTP settings.
// Dependencies: serde, serde_json, url
// ============================================================================

//! ## Overview
//! Core model types are plain data. They hold no network handles or storage
//! state and are safe to clone across threads.

pub mod api;
pub mod config;
pub mod identifiers;
pub mod settings;

pub use api::ApiMetrics;
pub use api::ApiSpec;
pub use api::ConnectionTestResult;
pub use api::NormalizedApi;
pub use config::DEFAULT_SENSITIVE_FIELDS;
pub use config::GatewayConfig;
pub use config::GatewayConfigSummary;
pub use config::SensitiveFieldNames;
pub use identifiers::ApiId;
pub use identifiers::GatewayId;
pub use identifiers::GatewayType;
pub use identifiers::PageCursor;
pub use settings::HttpSettings;
