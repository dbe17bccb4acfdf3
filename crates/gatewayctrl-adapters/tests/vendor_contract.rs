// crates/gatewayctrl-adapters/tests/vendor_contract.rs
// ============================================================================
// Module: Vendor Adapter Contract Tests
// Description: Adapter behavior against in-process mock vendor APIs.
// Purpose: Check error classification, pagination draining, and vendor flows.
// ============================================================================

//! ## Overview
//! Every test builds adapters through [`AdapterFactory`] so the audited
//! decorator and shared HTTP scaffolding are exercised end to end.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use gatewayctrl_adapters::AdapterFactory;
use gatewayctrl_core::ApiId;
use gatewayctrl_core::ApiSpec;
use gatewayctrl_core::AuditSink;
use gatewayctrl_core::ConnectionTestResult;
use gatewayctrl_core::GatewayAdapter;
use gatewayctrl_core::GatewayConfig;
use gatewayctrl_core::GatewayError;
use gatewayctrl_core::HttpSettings;
use gatewayctrl_core::InMemoryAuditSink;
use gatewayctrl_core::NoopAuditSink;
use serde_json::Value;
use serde_json::json;

use crate::common::MockVendor;
use crate::common::closed_port_url;
use crate::common::fast_settings;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn factory() -> AdapterFactory {
    AdapterFactory::with_builtin_adapters(fast_settings(), Arc::new(NoopAuditSink))
}

fn adapter(config: &GatewayConfig) -> Box<dyn GatewayAdapter> {
    factory().create(config).unwrap()
}

fn kong(base_url: &str) -> GatewayConfig {
    GatewayConfig::new("Kong-Dev", "kong", base_url).with_credential("apiKey", "abc123")
}

/// Config carrying every credential any built-in vendor needs.
fn universal(gateway_type: &str, base_url: &str) -> GatewayConfig {
    GatewayConfig::new(format!("{gateway_type}-gw"), gateway_type, base_url)
        .with_credential("apiKey", "k")
        .with_credential("username", "admin")
        .with_credential("password", "admin")
        .with_credential("authorizationSecret", "s")
        .with_credential("accessKeyId", "AKID")
        .with_credential("secretAccessKey", "secret")
        .with_credential("token", "t")
}

// ============================================================================
// SECTION: Factory
// ============================================================================

#[test]
fn factory_builds_every_registered_type() {
    let factory = factory();
    let types = factory.registered_types();
    let names: Vec<&str> = types.iter().map(|gateway_type| gateway_type.as_str()).collect();
    assert_eq!(names, vec!["aws", "gravitee", "kong", "tyk", "wso2"]);
    for gateway_type in &types {
        let config = universal(gateway_type.as_str(), "http://127.0.0.1:9");
        let adapter = factory.create(&config).unwrap();
        assert_eq!(adapter.gateway_type(), gateway_type);
    }
}

#[test]
fn unknown_vendor_type_is_rejected() {
    let config = GatewayConfig::new("mystery", "unknown-vendor", "http://localhost:1");
    let err = factory().create(&config).err().unwrap();
    assert_eq!(err, GatewayError::UnknownGatewayType("unknown-vendor".to_string()));
}

#[test]
fn registration_replaces_existing_vendor() {
    let mut factory = factory();
    let replaced = factory.register_adapter("kong", |_, _| {
        Err(GatewayError::UnsupportedOperation("kong disabled".to_string()))
    });
    assert!(replaced);
    assert!(matches!(
        factory.create(&kong("http://localhost:8001")),
        Err(GatewayError::UnsupportedOperation(_))
    ));
}

#[test]
fn missing_certificate_file_fails_construction() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = kong("https://localhost:8444");
    config.certificate_path = Some(dir.path().join("absent.pem"));
    assert!(matches!(factory().create(&config), Err(GatewayError::Validation(_))));
}

// ============================================================================
// SECTION: Connection Tests
// ============================================================================

#[test]
fn wrong_credentials_report_authentication_failed() {
    let mock =
        MockVendor::start(|_| (401, json!({"message": "Invalid authentication credentials"})));
    let result = adapter(&kong(&mock.base_url)).test_connection();
    assert_eq!(result, ConnectionTestResult::AuthenticationFailed);
    let requests = mock.requests();
    assert_eq!(requests[0].header("apikey"), Some("abc123"));
    assert!(requests[0].url.starts_with("/services?size=1"));
}

#[test]
fn closed_port_reports_network_unreachable() {
    let result = adapter(&kong(&closed_port_url())).test_connection();
    assert_eq!(result, ConnectionTestResult::NetworkUnreachable);
}

#[test]
fn server_errors_report_unsupported_configuration() {
    let mock = MockVendor::start(|_| (503, json!({"message": "upstream down"})));
    let adapter = adapter(&kong(&mock.base_url));
    assert_eq!(adapter.test_connection(), ConnectionTestResult::UnsupportedConfiguration);
    let err = adapter.delete_api(&ApiId::new("svc")).unwrap_err();
    assert!(matches!(err, GatewayError::UnexpectedResponse { status: Some(503), .. }));
}

#[test]
fn connection_tests_are_audited_without_secrets() {
    let mock = MockVendor::start(|_| (403, json!({"message": "forbidden"})));
    let sink = Arc::new(InMemoryAuditSink::new());
    let audit: Arc<dyn AuditSink> = sink.clone();
    let factory = AdapterFactory::with_builtin_adapters(fast_settings(), audit);
    let adapter = factory.create(&kong(&mock.base_url)).unwrap();
    assert_eq!(adapter.test_connection(), ConnectionTestResult::AuthenticationFailed);
    let events = sink.events_named("adapter_call");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["operation"], "test_connection");
    assert_eq!(events[0]["gateway_name"], "Kong-Dev");
    assert!(!events[0].to_string().contains("abc123"));
}

// ============================================================================
// SECTION: Kong
// ============================================================================

#[test]
fn kong_listing_drains_every_page_on_each_call() {
    let mock = MockVendor::start(|request| {
        if request.path() == "/routes" {
            if request.url.contains("offset=routes-2") {
                return (
                    200,
                    json!({
                        "data": [{"id": "r-3", "paths": ["/c"], "service": {"id": "svc-3"}}],
                        "offset": null
                    }),
                );
            }
            return (
                200,
                json!({
                    "data": [
                        {
                            "id": "r-1",
                            "paths": ["/a"],
                            "methods": ["get"],
                            "service": {"id": "svc-1"}
                        },
                        {"id": "r-2", "paths": ["/b"], "service": {"id": "svc-2"}}
                    ],
                    "offset": "routes-2"
                }),
            );
        }
        if request.url.contains("offset=page-2") {
            (200, json!({"data": [{"id": "svc-3", "name": "c"}], "offset": null}))
        } else {
            (
                200,
                json!({
                    "data": [{"id": "svc-1", "name": "a"}, {"id": "svc-2", "name": "b"}],
                    "offset": "page-2"
                }),
            )
        }
    });
    let adapter = adapter(&kong(&mock.base_url));
    let first = adapter.list_apis().try_collect().unwrap();
    let ids: Vec<&str> = first.iter().map(|api| api.id.as_str()).collect();
    assert_eq!(ids, vec!["svc-1", "svc-2", "svc-3"]);
    let paths: Vec<Option<&str>> = first.iter().map(|api| api.base_path.as_deref()).collect();
    assert_eq!(paths, vec![Some("/a"), Some("/b"), Some("/c")]);
    assert_eq!(first[0].methods, vec!["GET".to_string()]);
    let requests = mock.requests();
    assert_eq!(requests.len(), 4);
    assert_eq!(requests.iter().filter(|request| request.path() == "/routes").count(), 2);
    let second = adapter.list_apis().try_collect().unwrap();
    assert_eq!(second, first);
    assert_eq!(mock.requests().len(), 8);
}

#[test]
fn kong_duplicate_service_is_a_conflict() {
    let mock = MockVendor::start(|_| {
        (409, json!({"message": "UNIQUE violation detected on '{name=\"orders\"}'"}))
    });
    let mut spec = ApiSpec::new("orders");
    spec.backend = Some("http://orders:8080".to_string());
    let err = adapter(&kong(&mock.base_url)).create_api(&spec).unwrap_err();
    assert!(matches!(err, GatewayError::Conflict(_)));
}

#[test]
fn kong_create_builds_service_then_route() {
    let mock = MockVendor::start(|request| {
        if request.is("POST", "/services") {
            (
                201,
                json!({
                    "id": "svc-9", "name": "orders", "protocol": "http",
                    "host": "orders", "port": 8080
                }),
            )
        } else {
            (201, json!({"id": "route-1", "paths": ["/orders"], "methods": ["GET"]}))
        }
    });
    let mut spec = ApiSpec::new("orders");
    spec.backend = Some("http://orders:8080".to_string());
    spec.base_path = Some("/orders".to_string());
    spec.methods = vec!["get".to_string()];
    let api = adapter(&kong(&mock.base_url)).create_api(&spec).unwrap();
    assert_eq!(api.id.as_str(), "svc-9");
    assert_eq!(api.base_path.as_deref(), Some("/orders"));
    assert_eq!(api.methods, vec!["GET".to_string()]);
    let requests = mock.requests();
    assert!(requests[1].is("POST", "/services/svc-9/routes"));
    assert_eq!(requests[1].json()["methods"], json!(["GET"]));
}

#[test]
fn kong_route_failure_rolls_back_service() {
    let mock = MockVendor::start(|request| {
        if request.is("POST", "/services") {
            (201, json!({"id": "svc-9", "name": "orders", "host": "orders"}))
        } else if request.method == "POST" {
            (400, json!({"message": "schema violation (paths: should start with: /)"}))
        } else {
            (204, Value::Null)
        }
    });
    let mut spec = ApiSpec::new("orders");
    spec.backend = Some("http://orders".to_string());
    let err = adapter(&kong(&mock.base_url)).create_api(&spec).unwrap_err();
    assert!(matches!(err, GatewayError::Validation(_)));
    let requests = mock.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests[2].is("DELETE", "/services/svc-9"));
}

#[test]
fn kong_delete_removes_routes_then_service() {
    let mock = MockVendor::start(|request| {
        if request.method == "GET" {
            (200, json!({"data": [{"id": "r1"}, {"id": "r2"}]}))
        } else {
            (204, Value::Null)
        }
    });
    adapter(&kong(&mock.base_url)).delete_api(&ApiId::new("svc-1")).unwrap();
    let requests = mock.requests();
    assert!(requests[1].is("DELETE", "/routes/r1"));
    assert!(requests[2].is("DELETE", "/routes/r2"));
    assert!(requests[3].is("DELETE", "/services/svc-1"));
}

#[test]
fn kong_delete_of_missing_service_is_not_found() {
    let mock = MockVendor::start(|_| (404, json!({"message": "Not found"})));
    let err = adapter(&kong(&mock.base_url)).delete_api(&ApiId::new("gone")).unwrap_err();
    assert!(matches!(err, GatewayError::NotFound(_)));
}

#[test]
fn kong_metrics_count_routes_and_plugins() {
    let mock = MockVendor::start(|request| match request.path() {
        "/services/svc-1" => (200, json!({"id": "svc-1", "name": "orders"})),
        "/services/svc-1/routes" => (200, json!({"data": [{"id": "r1"}]})),
        _ => (
            200,
            json!({"data": [
                {"name": "rate-limiting", "enabled": true},
                {"name": "cors", "enabled": false}
            ]}),
        ),
    });
    let metrics = adapter(&kong(&mock.base_url)).api_metrics(&ApiId::new("svc-1")).unwrap();
    assert_eq!(metrics.counters["routes"], 1);
    assert_eq!(metrics.counters["plugins"], 2);
    assert_eq!(metrics.counters["enabled_plugins"], 1);
}

// ============================================================================
// SECTION: Other Vendors
// ============================================================================

#[test]
fn vendors_without_analytics_report_unsupported_metrics() {
    for gateway_type in ["aws", "tyk", "gravitee"] {
        let adapter = adapter(&universal(gateway_type, &closed_port_url()));
        let err = adapter.api_metrics(&ApiId::new("any")).unwrap_err();
        assert!(matches!(err, GatewayError::UnsupportedOperation(_)), "{gateway_type}: {err}");
    }
}

#[test]
fn tyk_mutations_trigger_hot_reload() {
    let mock = MockVendor::start(|request| {
        if request.is("POST", "/tyk/apis") {
            (200, json!({"key": "abc", "status": "ok", "action": "added"}))
        } else {
            (200, json!({"status": "ok"}))
        }
    });
    let config = GatewayConfig::new("tyk", "tyk", &mock.base_url)
        .with_credential("authorizationSecret", "s3cret");
    let mut spec = ApiSpec::new("orders");
    spec.base_path = Some("/orders/".to_string());
    spec.backend = Some("http://orders".to_string());
    let api = adapter(&config).create_api(&spec).unwrap();
    assert_eq!(api.id.as_str(), "abc");
    let requests = mock.requests();
    assert_eq!(requests[0].header("x-tyk-authorization"), Some("s3cret"));
    assert_eq!(requests[0].json()["proxy"]["target_url"], "http://orders");
    assert!(requests[1].is("GET", "/tyk/reload/group"));
}

#[test]
fn wso2_listing_pages_by_offset_until_total() {
    let mock = MockVendor::start(|request| {
        let list = if request.url.contains("offset=0") {
            json!([
                {"id": "a", "name": "A", "context": "/a"},
                {"id": "b", "name": "B", "context": "/b"}
            ])
        } else {
            json!([{"id": "c", "name": "C", "context": "/c"}])
        };
        (200, json!({"list": list, "pagination": {"total": 3}}))
    });
    let config = GatewayConfig::new("wso2", "wso2", &mock.base_url)
        .with_credential("username", "admin")
        .with_credential("password", "s3cret");
    let settings = HttpSettings {
        page_size: 2,
        ..fast_settings()
    };
    let factory = AdapterFactory::with_builtin_adapters(settings, Arc::new(NoopAuditSink));
    let apis = factory.create(&config).unwrap().list_apis().try_collect().unwrap();
    assert_eq!(apis.len(), 3);
    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].path(), "/api/am/publisher/v4/apis");
    assert!(requests[1].url.contains("offset=2"));
    let authorization = requests[0].header("authorization").unwrap();
    let encoded = authorization.strip_prefix("Basic ").unwrap();
    assert_eq!(STANDARD.decode(encoded).unwrap(), b"admin:s3cret");
}

#[test]
fn gravitee_calls_are_environment_scoped() {
    let mock = MockVendor::start(|_| (200, json!({"data": [], "pagination": {"pageCount": 0}})));
    let config = GatewayConfig::new("gravitee", "gravitee", &mock.base_url)
        .with_credential("token", "t0k")
        .with_option("environmentId", "staging");
    adapter(&config).check_connection().unwrap();
    let requests = mock.requests();
    assert_eq!(
        requests[0].path(),
        "/management/v2/organizations/DEFAULT/environments/staging/apis"
    );
    assert_eq!(requests[0].header("authorization"), Some("Bearer t0k"));
}

#[test]
fn non_object_update_responses_are_rejected_without_panicking() {
    let mock = MockVendor::start(|_| (200, json!(["not", "an", "object"])));
    for gateway_type in ["wso2", "tyk", "gravitee"] {
        let result = adapter(&universal(gateway_type, &mock.base_url))
            .update_api(&ApiId::new("abc"), &ApiSpec::new("renamed"));
        assert!(
            matches!(result, Err(GatewayError::UnexpectedResponse { .. })),
            "{gateway_type}: {result:?}"
        );
    }
}

#[test]
fn malformed_nested_definitions_are_rejected_on_update() {
    let tyk_mock = MockVendor::start(|_| (200, json!({"api_id": "x", "proxy": "inline"})));
    let mut spec = ApiSpec::new("renamed");
    spec.base_path = Some("/orders".to_string());
    let result = adapter(&universal("tyk", &tyk_mock.base_url)).update_api(&ApiId::new("x"), &spec);
    assert!(matches!(result, Err(GatewayError::UnexpectedResponse { .. })), "{result:?}");
    assert!(tyk_mock.requests().iter().all(|request| request.method == "GET"));

    let gravitee_mock = MockVendor::start(|_| {
        (200, json!({"id": "g", "endpointGroups": [{"endpoints": [{"configuration": "inline"}]}]}))
    });
    let mut spec = ApiSpec::new("renamed");
    spec.backend = Some("http://orders".to_string());
    let gravitee = adapter(&universal("gravitee", &gravitee_mock.base_url));
    let result = gravitee.update_api(&ApiId::new("g"), &spec);
    assert!(matches!(result, Err(GatewayError::UnexpectedResponse { .. })), "{result:?}");
}

#[test]
fn aws_requests_are_signed() {
    let mock = MockVendor::start(|_| {
        (403, json!({"message": "The security token included in the request is invalid."}))
    });
    let config = GatewayConfig::new("aws", "aws", &mock.base_url)
        .with_credential("accessKeyId", "AKIDEXAMPLE")
        .with_credential("secretAccessKey", "secret")
        .with_option("region", "eu-west-1");
    assert_eq!(adapter(&config).test_connection(), ConnectionTestResult::AuthenticationFailed);
    let requests = mock.requests();
    let authorization = requests[0].header("authorization").unwrap();
    assert!(authorization.starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/"));
    assert!(authorization.contains("/eu-west-1/apigateway/aws4_request"));
    assert!(requests[0].header("x-amz-date").is_some());
}
