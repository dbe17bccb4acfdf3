// crates/gatewayctrl-adapters/src/wso2.rs
// ============================================================================
// Module: WSO2 Adapter
// Description: WSO2 API Manager Publisher v4 adapter.
// Purpose: Map the adapter contract onto the Publisher REST API.
// Dependencies: gatewayctrl-core, reqwest, serde_json
// ============================================================================

//! ## Overview
//! Talks to `/api/am/publisher/v4` with HTTP basic authentication. Listing
//! pages by `offset`/`limit` and stops at the reported total, on an empty page,
//! or on a short page. Updates are read-modify-write because the Publisher API
//! replaces the whole definition on `PUT`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use gatewayctrl_core::ApiId;
use gatewayctrl_core::ApiMetrics;
use gatewayctrl_core::ApiPage;
use gatewayctrl_core::ApiSpec;
use gatewayctrl_core::ApiStream;
use gatewayctrl_core::GatewayAdapter;
use gatewayctrl_core::GatewayConfig;
use gatewayctrl_core::GatewayError;
use gatewayctrl_core::GatewayType;
use gatewayctrl_core::HttpSettings;
use gatewayctrl_core::NormalizedApi;
use gatewayctrl_core::PageCursor;
use reqwest::Method;
use serde_json::Value;
use serde_json::json;

use crate::http::RequestAuth;
use crate::http::VendorClient;
use crate::http::VendorRequest;
use crate::http::option_value;
use crate::http::optional_secret;
use crate::http::path_segment;
use crate::http::require_secret;
use crate::shape::json_array;
use crate::shape::json_str;
use crate::shape::json_u64;
use crate::shape::merge_overrides;
use crate::shape::nonblank;
use crate::shape::object_at;
use crate::shape::required_base_path;
use crate::shape::required_name;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Registry key for WSO2.
pub const WSO2_TYPE: &str = "wso2";

/// Publisher API prefix appended to the configured base URL.
const PUBLISHER_PREFIX: &str = "/api/am/publisher/v4";

/// Version used when an [`ApiSpec`] names none.
const DEFAULT_API_VERSION: &str = "1.0.0";

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// WSO2 API Manager adapter.
#[derive(Debug)]
pub struct Wso2Adapter {
    /// Registry key.
    gateway_type: GatewayType,
    /// Publisher API client.
    client: VendorClient,
    /// APIs requested per page.
    page_size: usize,
    /// Page budget for one listing.
    max_pages: usize,
}

impl Wso2Adapter {
    /// Builds an adapter without touching the network.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] when credentials are missing or the
    /// base URL is invalid.
    pub fn new(config: &GatewayConfig, settings: &HttpSettings) -> Result<Self, GatewayError> {
        let username = option_value(config, &["username"])
            .or_else(|| optional_secret(config, &["username"]))
            .ok_or_else(|| {
                GatewayError::Validation("wso2 credential username is required".to_string())
            })?;
        let password = require_secret(config, &["password"])?;
        let base = format!("{}{PUBLISHER_PREFIX}", config.base_url.trim().trim_end_matches('/'));
        Ok(Self {
            gateway_type: GatewayType::new(WSO2_TYPE),
            client: VendorClient::new(config, settings, &base, RequestAuth::Basic {
                username,
                password,
            })?,
            page_size: settings.page_size.max(1),
            max_pages: settings.max_pages,
        })
    }

    /// Fetches one API definition.
    fn fetch_api(&self, id: &ApiId) -> Result<Value, GatewayError> {
        self.client.get(format!("/apis/{}", path_segment(id.as_str())))
    }
}

impl GatewayAdapter for Wso2Adapter {
    fn gateway_type(&self) -> &GatewayType {
        &self.gateway_type
    }

    fn check_connection(&self) -> Result<(), GatewayError> {
        self.client.execute(&VendorRequest::get("/apis").query("limit", 1)).map(|_| ())
    }

    fn list_apis(&self) -> ApiStream<'_> {
        let limit = self.page_size;
        ApiStream::from_fn(
            move |cursor: Option<&PageCursor>| {
                let offset = match cursor {
                    Some(cursor) => cursor.as_str().parse::<usize>().map_err(|_| {
                        GatewayError::unexpected("wso2 offset cursor is not a number")
                    })?,
                    None => 0,
                };
                let request =
                    VendorRequest::get("/apis").query("offset", offset).query("limit", limit);
                let body = self.client.execute(&request)?;
                let list = json_array(&body, "/list");
                let items = list.iter().map(normalize_api).collect::<Result<Vec<_>, _>>()?;
                let fetched = offset.saturating_add(list.len());
                let total =
                    json_u64(&body, "/pagination/total").or_else(|| json_u64(&body, "/count"));
                let exhausted = list.is_empty()
                    || list.len() < limit
                    || total.is_some_and(|total| fetched as u64 >= total);
                Ok(ApiPage {
                    items,
                    next: (!exhausted).then(|| PageCursor::new(fetched.to_string())),
                })
            },
            self.max_pages,
        )
    }

    fn create_api(&self, spec: &ApiSpec) -> Result<NormalizedApi, GatewayError> {
        let name = required_name(spec)?;
        let context = required_base_path(spec, WSO2_TYPE)?;
        let version = nonblank(spec.version.as_deref()).unwrap_or(DEFAULT_API_VERSION);
        let mut payload = json!({"name": name, "context": context, "version": version});
        apply_spec(&mut payload, spec);
        let created = self.client.send_json(Method::POST, "/apis", &payload)?;
        normalize_api(&created)
    }

    fn update_api(&self, id: &ApiId, spec: &ApiSpec) -> Result<NormalizedApi, GatewayError> {
        let mut payload = self.fetch_api(id)?;
        let fields = object_at(&mut payload, "", "wso2 api")?;
        if let Some(name) = nonblank(Some(spec.name.as_str())) {
            fields.insert("name".to_string(), json!(name));
        }
        if let Some(context) = spec.normalized_base_path() {
            fields.insert("context".to_string(), json!(context));
        }
        if let Some(version) = nonblank(spec.version.as_deref()) {
            fields.insert("version".to_string(), json!(version));
        }
        apply_spec(&mut payload, spec);
        let updated = self.client.send_json(
            Method::PUT,
            format!("/apis/{}", path_segment(id.as_str())),
            &payload,
        )?;
        normalize_api(&updated)
    }

    fn delete_api(&self, id: &ApiId) -> Result<(), GatewayError> {
        self.client.delete(format!("/apis/{}", path_segment(id.as_str())))
    }

    fn api_metrics(&self, id: &ApiId) -> Result<ApiMetrics, GatewayError> {
        let api = self.fetch_api(id)?;
        let subscriptions = self.client.execute(
            &VendorRequest::get("/subscriptions").query("apiId", id.as_str()).query("limit", 1),
        )?;
        let count = json_u64(&subscriptions, "/pagination/total")
            .or_else(|| json_u64(&subscriptions, "/count"))
            .unwrap_or(0);
        Ok(ApiMetrics {
            api_id: id.clone(),
            counters: BTreeMap::from([("subscriptions".to_string(), count)]),
            detail: json!({
                "lifecycleStatus": api.get("lifecycleStatus").cloned().unwrap_or(Value::Null),
                "version": api.get("version").cloned().unwrap_or(Value::Null),
            }),
        })
    }
}

// ============================================================================
// SECTION: Payload Shaping
// ============================================================================

/// Writes optional spec fields and overrides into a Publisher payload.
fn apply_spec(payload: &mut Value, spec: &ApiSpec) {
    if let Some(description) = nonblank(spec.description.as_deref()) {
        payload["description"] = json!(description);
    }
    if let Some(backend) = nonblank(spec.backend.as_deref()) {
        payload["endpointConfig"] = json!({
            "endpoint_type": "http",
            "production_endpoints": {"url": backend},
            "sandbox_endpoints": {"url": backend},
        });
    }
    let methods = spec.normalized_methods();
    if !methods.is_empty() {
        payload["operations"] = methods
            .iter()
            .map(|verb| {
                json!({"target": "/*", "verb": verb, "authType": "Application & Application User"})
            })
            .collect();
    }
    merge_overrides(payload, &spec.vendor_overrides);
}

/// Converts a Publisher API object into a normalized API.
fn normalize_api(api: &Value) -> Result<NormalizedApi, GatewayError> {
    let id = json_str(api, "/id").ok_or_else(|| GatewayError::unexpected("wso2 api without id"))?;
    let name = json_str(api, "/name").unwrap_or_else(|| id.clone());
    let mut normalized = NormalizedApi::new(id, name);
    normalized.base_path = json_str(api, "/context");
    normalized.backend = json_str(api, "/endpointConfig/production_endpoints/url");
    let mut methods: Vec<String> = json_array(api, "/operations")
        .iter()
        .filter_map(|operation| json_str(operation, "/verb"))
        .map(|verb| verb.to_ascii_uppercase())
        .collect();
    methods.sort();
    methods.dedup();
    normalized.methods = methods;
    normalized.vendor_detail = api.clone();
    Ok(normalized)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use super::*;

    #[test]
    fn normalizes_context_endpoint_and_verbs() {
        let api = json!({
            "id": "a1", "name": "Orders", "context": "/orders",
            "endpointConfig": {"production_endpoints": {"url": "http://orders:8080"}},
            "operations": [{"verb": "get"}, {"verb": "POST"}, {"verb": "GET"}]
        });
        let normalized = normalize_api(&api).unwrap();
        assert_eq!(normalized.base_path.as_deref(), Some("/orders"));
        assert_eq!(normalized.backend.as_deref(), Some("http://orders:8080"));
        assert_eq!(normalized.methods, vec!["GET".to_string(), "POST".to_string()]);
    }

    #[test]
    fn constructor_requires_basic_credentials() {
        let config = GatewayConfig::new("wso2", WSO2_TYPE, "https://localhost:9443")
            .with_option("username", "admin");
        let err = Wso2Adapter::new(&config, &HttpSettings::default()).unwrap_err();
        assert!(matches!(err, GatewayError::Validation(message) if message.contains("password")));
    }

    #[test]
    fn spec_fields_shape_the_payload() {
        let mut spec = ApiSpec::new("Orders");
        spec.backend = Some("http://orders:8080".to_string());
        spec.methods = vec!["get".to_string()];
        let mut payload = json!({"name": "Orders"});
        apply_spec(&mut payload, &spec);
        assert_eq!(payload["endpointConfig"]["production_endpoints"]["url"], "http://orders:8080");
        assert_eq!(payload["operations"][0]["verb"], "GET");
    }
}
