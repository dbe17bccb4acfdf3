// crates/gatewayctrl-adapters/src/factory.rs
// ============================================================================
// Module: Adapter Factory
// Description: Registry mapping vendor keys to adapter constructors.
// Purpose: Build audited, config-bound adapters without network I/O.
// Dependencies: gatewayctrl-core
// ============================================================================

//! ## Overview
//! The factory owns a map from [`GatewayType`] to constructor. It is filled
//! once at start-up (usually through [`AdapterFactory::with_builtin_adapters`])
//! and then only read, so it can be shared behind an `Arc` without locking.
//! [`AdapterFactory::create`] validates the config shape, runs the constructor,
//! and wraps the result in an [`AuditedAdapter`]. Constructors must not touch
//! the network.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use gatewayctrl_core::AuditSink;
use gatewayctrl_core::GatewayAdapter;
use gatewayctrl_core::GatewayConfig;
use gatewayctrl_core::GatewayError;
use gatewayctrl_core::GatewayType;
use gatewayctrl_core::HttpSettings;
use gatewayctrl_core::NoopAuditSink;

use crate::audited::AuditedAdapter;
use crate::aws::AWS_TYPE;
use crate::aws::AwsAdapter;
use crate::gravitee::GRAVITEE_TYPE;
use crate::gravitee::GraviteeAdapter;
use crate::kong::KONG_TYPE;
use crate::kong::KongAdapter;
use crate::tyk::TYK_TYPE;
use crate::tyk::TykAdapter;
use crate::wso2::WSO2_TYPE;
use crate::wso2::Wso2Adapter;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Constructor producing an adapter bound to one config.
pub type AdapterConstructor = Arc<
    dyn Fn(&GatewayConfig, &HttpSettings) -> Result<Box<dyn GatewayAdapter>, GatewayError>
        + Send
        + Sync,
>;

/// Vendor registry and adapter builder.
///
/// # Invariants
/// - Every adapter returned by `create` reports the type it was registered under.
/// - `create` performs no network I/O.
pub struct AdapterFactory {
    /// Constructors keyed by vendor.
    constructors: BTreeMap<GatewayType, AdapterConstructor>,
    /// Request bounds passed to every constructor.
    settings: HttpSettings,
    /// Sink for adapter audit events.
    audit: Arc<dyn AuditSink>,
}

impl AdapterFactory {
    /// Creates an empty factory.
    #[must_use]
    pub fn new(settings: HttpSettings, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            constructors: BTreeMap::new(),
            settings,
            audit,
        }
    }

    /// Creates a factory with every built-in vendor registered.
    #[must_use]
    pub fn with_builtin_adapters(settings: HttpSettings, audit: Arc<dyn AuditSink>) -> Self {
        let mut factory = Self::new(settings, audit);
        factory.register_builtin_adapters();
        factory
    }

    /// Registers the built-in vendors.
    pub fn register_builtin_adapters(&mut self) {
        self.register_adapter(AWS_TYPE, |config, settings| {
            Ok(Box::new(AwsAdapter::new(config, settings)?))
        });
        self.register_adapter(KONG_TYPE, |config, settings| {
            Ok(Box::new(KongAdapter::new(config, settings)?))
        });
        self.register_adapter(WSO2_TYPE, |config, settings| {
            Ok(Box::new(Wso2Adapter::new(config, settings)?))
        });
        self.register_adapter(TYK_TYPE, |config, settings| {
            Ok(Box::new(TykAdapter::new(config, settings)?))
        });
        self.register_adapter(GRAVITEE_TYPE, |config, settings| {
            Ok(Box::new(GraviteeAdapter::new(config, settings)?))
        });
    }

    /// Adds or replaces the constructor for a vendor key.
    ///
    /// Returns true when an existing registration was replaced.
    pub fn register_adapter<F>(
        &mut self,
        gateway_type: impl Into<GatewayType>,
        constructor: F,
    ) -> bool
    where
        F: Fn(&GatewayConfig, &HttpSettings) -> Result<Box<dyn GatewayAdapter>, GatewayError>
            + Send
            + Sync
            + 'static,
    {
        self.constructors.insert(gateway_type.into(), Arc::new(constructor)).is_some()
    }

    /// Builds an audited adapter for a config.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnknownGatewayType`] when the type is not
    /// registered and [`GatewayError::Validation`] when the config shape is
    /// invalid for the vendor.
    pub fn create(&self, config: &GatewayConfig) -> Result<Box<dyn GatewayAdapter>, GatewayError> {
        let Some(constructor) = self.constructors.get(&config.gateway_type) else {
            return Err(GatewayError::UnknownGatewayType(config.gateway_type.to_string()));
        };
        config.validate().map_err(GatewayError::Validation)?;
        let adapter = constructor(config, &self.settings)?;
        if adapter.gateway_type() != &config.gateway_type {
            return Err(GatewayError::Validation(format!(
                "adapter registered for {} reports type {}",
                config.gateway_type,
                adapter.gateway_type()
            )));
        }
        Ok(Box::new(AuditedAdapter::new(adapter, config, Arc::clone(&self.audit))))
    }

    /// Returns the registered vendor keys in sorted order.
    #[must_use]
    pub fn registered_types(&self) -> Vec<GatewayType> {
        self.constructors.keys().cloned().collect()
    }

    /// Returns true when a vendor key is registered.
    #[must_use]
    pub fn supports(&self, gateway_type: &GatewayType) -> bool {
        self.constructors.contains_key(gateway_type)
    }

    /// Returns the request bounds handed to constructors.
    #[must_use]
    pub const fn settings(&self) -> &HttpSettings {
        &self.settings
    }
}

impl Default for AdapterFactory {
    fn default() -> Self {
        Self::with_builtin_adapters(HttpSettings::default(), Arc::new(NoopAuditSink))
    }
}

impl fmt::Debug for AdapterFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterFactory")
            .field("types", &self.constructors.keys().collect::<Vec<_>>())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
