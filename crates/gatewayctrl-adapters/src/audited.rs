// crates/gatewayctrl-adapters/src/audited.rs
// ============================================================================
// Module: Audited Adapter
// Description: Decorator that records an audit event per adapter operation.
// Purpose: Keep logging out of vendor code.
// Dependencies: gatewayctrl-core
// ============================================================================

//! ## Overview
//! [`AuditedAdapter`] wraps any [`GatewayAdapter`] and emits one
//! [`AdapterAuditEvent`] per call with the outcome, error kind, and duration.
//! The identity it reports is a copy of the config with every credential and
//! option removed, so the decorator never holds secrets.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use gatewayctrl_core::AdapterAuditEvent;
use gatewayctrl_core::ApiId;
use gatewayctrl_core::ApiMetrics;
use gatewayctrl_core::ApiSpec;
use gatewayctrl_core::ApiStream;
use gatewayctrl_core::AuditSink;
use gatewayctrl_core::ConnectionTestResult;
use gatewayctrl_core::GatewayAdapter;
use gatewayctrl_core::GatewayConfig;
use gatewayctrl_core::GatewayError;
use gatewayctrl_core::GatewayType;
use gatewayctrl_core::NormalizedApi;

// ============================================================================
// SECTION: Decorator
// ============================================================================

/// Adapter wrapper that audits every operation.
pub struct AuditedAdapter {
    /// Wrapped vendor adapter.
    inner: Box<dyn GatewayAdapter>,
    /// Config identity with secrets stripped.
    identity: GatewayConfig,
    /// Event destination.
    audit: Arc<dyn AuditSink>,
}

impl AuditedAdapter {
    /// Wraps `inner`, reporting events for `config`.
    #[must_use]
    pub fn new(
        inner: Box<dyn GatewayAdapter>,
        config: &GatewayConfig,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        let mut identity = config.clone();
        identity.credentials.clear();
        identity.additional_config.clear();
        Self {
            inner,
            identity,
            audit,
        }
    }

    /// Runs an operation and records its outcome.
    fn observe<T>(
        &self,
        operation: &'static str,
        api_id: Option<&ApiId>,
        call: impl FnOnce() -> Result<T, GatewayError>,
    ) -> Result<T, GatewayError> {
        let started = Instant::now();
        let result = call();
        let event = AdapterAuditEvent::new(
            &self.identity,
            operation,
            api_id.map(ToString::to_string),
            started.elapsed(),
        );
        let event = match &result {
            Ok(_) => event,
            Err(err) => event.with_error(err.kind(), err.to_string()),
        };
        self.audit.record_adapter(&event);
        result
    }
}

impl GatewayAdapter for AuditedAdapter {
    fn gateway_type(&self) -> &GatewayType {
        self.inner.gateway_type()
    }

    fn check_connection(&self) -> Result<(), GatewayError> {
        self.observe("check_connection", None, || self.inner.check_connection())
    }

    fn test_connection(&self) -> ConnectionTestResult {
        let started = Instant::now();
        let outcome = self.inner.test_connection();
        let event =
            AdapterAuditEvent::new(&self.identity, "test_connection", None, started.elapsed())
                .with_outcome(outcome.as_str());
        self.audit.record_adapter(&event);
        outcome
    }

    fn list_apis(&self) -> ApiStream<'_> {
        let event = AdapterAuditEvent::new(&self.identity, "list_apis", None, Duration::ZERO)
            .with_outcome("started");
        self.audit.record_adapter(&event);
        self.inner.list_apis()
    }

    fn create_api(&self, spec: &ApiSpec) -> Result<NormalizedApi, GatewayError> {
        self.observe("create_api", None, || self.inner.create_api(spec))
    }

    fn update_api(&self, id: &ApiId, spec: &ApiSpec) -> Result<NormalizedApi, GatewayError> {
        self.observe("update_api", Some(id), || self.inner.update_api(id, spec))
    }

    fn delete_api(&self, id: &ApiId) -> Result<(), GatewayError> {
        self.observe("delete_api", Some(id), || self.inner.delete_api(id))
    }

    fn api_metrics(&self, id: &ApiId) -> Result<ApiMetrics, GatewayError> {
        self.observe("api_metrics", Some(id), || self.inner.api_metrics(id))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use gatewayctrl_core::ApiPage;
    use gatewayctrl_core::InMemoryAuditSink;

    use super::*;

    /// Adapter whose connection check always fails authentication.
    struct Rejecting(GatewayType);

    impl GatewayAdapter for Rejecting {
        fn gateway_type(&self) -> &GatewayType {
            &self.0
        }

        fn check_connection(&self) -> Result<(), GatewayError> {
            Err(GatewayError::Unauthorized("invalid key".to_string()))
        }

        fn list_apis(&self) -> ApiStream<'_> {
            ApiStream::from_fn(|_| Ok(ApiPage::last(Vec::new())), 1)
        }

        fn create_api(&self, _spec: &ApiSpec) -> Result<NormalizedApi, GatewayError> {
            Err(GatewayError::Conflict("exists".to_string()))
        }

        fn update_api(&self, id: &ApiId, _spec: &ApiSpec) -> Result<NormalizedApi, GatewayError> {
            Ok(NormalizedApi::new(id.clone(), "x"))
        }

        fn delete_api(&self, _id: &ApiId) -> Result<(), GatewayError> {
            Ok(())
        }
    }

    fn audited(sink: &Arc<InMemoryAuditSink>) -> AuditedAdapter {
        let config = GatewayConfig::new("Kong-Dev", "kong", "http://localhost:8001")
            .with_credential("apiKey", "abc123");
        let sink: Arc<dyn AuditSink> = sink.clone();
        AuditedAdapter::new(Box::new(Rejecting(GatewayType::new("kong"))), &config, sink)
    }

    #[test]
    fn test_connection_records_classified_outcome() {
        let sink = Arc::new(InMemoryAuditSink::new());
        let adapter = audited(&sink);
        assert_eq!(adapter.test_connection(), ConnectionTestResult::AuthenticationFailed);
        let events = sink.events_named("adapter_call");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["outcome"], "authentication_failed");
        assert!(!events[0].to_string().contains("abc123"));
    }

    /// Adapter with its own connection classification.
    struct SelfClassifying(GatewayType);

    impl GatewayAdapter for SelfClassifying {
        fn gateway_type(&self) -> &GatewayType {
            &self.0
        }

        fn check_connection(&self) -> Result<(), GatewayError> {
            Ok(())
        }

        fn test_connection(&self) -> ConnectionTestResult {
            ConnectionTestResult::UnsupportedConfiguration
        }

        fn list_apis(&self) -> ApiStream<'_> {
            ApiStream::from_fn(|_| Ok(ApiPage::last(Vec::new())), 1)
        }

        fn create_api(&self, spec: &ApiSpec) -> Result<NormalizedApi, GatewayError> {
            Ok(NormalizedApi::new("x", spec.name.clone()))
        }

        fn update_api(&self, id: &ApiId, _spec: &ApiSpec) -> Result<NormalizedApi, GatewayError> {
            Ok(NormalizedApi::new(id.clone(), "x"))
        }

        fn delete_api(&self, _id: &ApiId) -> Result<(), GatewayError> {
            Ok(())
        }
    }

    #[test]
    fn test_connection_uses_the_inner_classification() {
        let sink = Arc::new(InMemoryAuditSink::new());
        let config = GatewayConfig::new("custom", "custom", "http://localhost:8001");
        let audit: Arc<dyn AuditSink> = sink.clone();
        let inner = Box::new(SelfClassifying(GatewayType::new("custom")));
        let adapter = AuditedAdapter::new(inner, &config, audit);
        assert_eq!(adapter.test_connection(), ConnectionTestResult::UnsupportedConfiguration);
        assert_eq!(sink.events_named("adapter_call")[0]["outcome"], "unsupported_configuration");
    }

    #[test]
    fn failures_and_successes_are_both_recorded() {
        let sink = Arc::new(InMemoryAuditSink::new());
        let adapter = audited(&sink);
        assert!(adapter.create_api(&ApiSpec::new("orders")).is_err());
        assert!(adapter.delete_api(&ApiId::new("svc")).is_ok());
        let events = sink.events();
        assert_eq!(events[0]["outcome"], "error");
        assert_eq!(events[0]["error_kind"], "conflict");
        assert_eq!(events[1]["outcome"], "ok");
        assert_eq!(events[1]["api_id"], "svc");
    }
}
