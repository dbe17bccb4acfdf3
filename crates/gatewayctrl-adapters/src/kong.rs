// crates/gatewayctrl-adapters/src/kong.rs
// ============================================================================
// Module: Kong Adapter
// Description: Kong Admin API adapter (services and routes).
// Purpose: Map the adapter contract onto Kong services with attached routes.
// Dependencies: gatewayctrl-core, reqwest, serde_json
// ============================================================================

//! ## Overview
//! A normalized API is a Kong service. Its public path and methods live on the
//! service's first route, so creation is two calls: the service, then a route
//! bound to it. When the route call fails the service is deleted again so no
//! half-created API stays behind. Listings drain `/routes` once per traversal
//! and join routes to services by `service.id`.
//!
//! Authentication is optional: `apiKey` is sent as the `apikey` header (key-auth
//! on the admin API) and `adminToken` as `Kong-Admin-Token` (Kong Enterprise
//! RBAC).

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
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::http::RequestAuth;
use crate::http::VendorClient;
use crate::http::VendorRequest;
use crate::http::optional_secret;
use crate::http::path_segment;
use crate::shape::json_array;
use crate::shape::json_str;
use crate::shape::merge_overrides;
use crate::shape::methods_from;
use crate::shape::nonblank;
use crate::shape::required_backend;
use crate::shape::required_name;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Registry key for Kong.
pub const KONG_TYPE: &str = "kong";

/// Largest page size the Admin API accepts.
const MAX_KONG_PAGE_SIZE: usize = 1_000;

/// Override key holding route fields instead of service fields.
const ROUTE_OVERRIDE_KEY: &str = "route";

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// Kong Admin API adapter.
#[derive(Debug)]
pub struct KongAdapter {
    /// Registry key.
    gateway_type: GatewayType,
    /// Admin API client.
    client: VendorClient,
    /// Services requested per page.
    page_size: usize,
    /// Page budget for one listing.
    max_pages: usize,
}

impl KongAdapter {
    /// Builds an adapter without touching the network.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] when the base URL or certificate is invalid.
    pub fn new(config: &GatewayConfig, settings: &HttpSettings) -> Result<Self, GatewayError> {
        let mut headers = Vec::new();
        if let Some(key) = optional_secret(config, &["apiKey", "api_key"]) {
            headers.push(("apikey".to_string(), key));
        }
        if let Some(token) = optional_secret(config, &["adminToken", "admin_token"]) {
            headers.push(("Kong-Admin-Token".to_string(), token));
        }
        let auth =
            if headers.is_empty() { RequestAuth::None } else { RequestAuth::Headers(headers) };
        Ok(Self {
            gateway_type: GatewayType::new(KONG_TYPE),
            client: VendorClient::new(config, settings, &config.base_url, auth)?,
            page_size: settings.page_size.clamp(1, MAX_KONG_PAGE_SIZE),
            max_pages: settings.max_pages,
        })
    }

    /// Fetches the routes bound to a service.
    fn service_routes(&self, id: &str) -> Result<Vec<Value>, GatewayError> {
        let request = VendorRequest::get(format!("/services/{}/routes", path_segment(id)))
            .query("size", MAX_KONG_PAGE_SIZE);
        let body = self.client.execute(&request)?;
        Ok(json_array(&body, "/data").to_vec())
    }

    /// Drains `/routes` and keeps the first route of each service.
    fn routes_by_service(&self) -> Result<BTreeMap<String, Value>, GatewayError> {
        let mut index = BTreeMap::new();
        let mut offset: Option<String> = None;
        for _ in 0..self.max_pages.max(1) {
            let mut request = VendorRequest::get("/routes").query("size", MAX_KONG_PAGE_SIZE);
            if let Some(offset) = &offset {
                request = request.query("offset", offset.as_str());
            }
            let body = self.client.execute(&request)?;
            for route in json_array(&body, "/data") {
                if let Some(service_id) = json_str(route, "/service/id") {
                    index.entry(service_id).or_insert_with(|| route.clone());
                }
            }
            offset = json_str(&body, "/offset");
            if offset.is_none() {
                return Ok(index);
            }
        }
        Err(GatewayError::unexpected(format!(
            "kong route listing exceeded {} pages",
            self.max_pages
        )))
    }

    /// Creates a route for a service.
    fn create_route(&self, service_id: &str, route: &Value) -> Result<Value, GatewayError> {
        self.client.send_json(
            Method::POST,
            format!("/services/{}/routes", path_segment(service_id)),
            route,
        )
    }
}

impl GatewayAdapter for KongAdapter {
    fn gateway_type(&self) -> &GatewayType {
        &self.gateway_type
    }

    fn check_connection(&self) -> Result<(), GatewayError> {
        self.client.execute(&VendorRequest::get("/services").query("size", 1)).map(|_| ())
    }

    fn list_apis(&self) -> ApiStream<'_> {
        let page_size = self.page_size;
        let mut routes: Option<BTreeMap<String, Value>> = None;
        ApiStream::from_fn(
            move |cursor: Option<&PageCursor>| {
                let index = match routes.take() {
                    Some(index) => index,
                    None => self.routes_by_service()?,
                };
                let mut request = VendorRequest::get("/services").query("size", page_size);
                if let Some(cursor) = cursor {
                    request = request.query("offset", cursor.as_str());
                }
                let body = self.client.execute(&request)?;
                let items = json_array(&body, "/data")
                    .iter()
                    .map(|service| {
                        let mut api = normalize_service(service)?;
                        if let Some(route) = index.get(api.id.as_str()) {
                            apply_route(&mut api, route);
                        }
                        Ok(api)
                    })
                    .collect::<Result<Vec<_>, GatewayError>>()?;
                routes = Some(index);
                Ok(ApiPage {
                    items,
                    next: json_str(&body, "/offset").map(PageCursor::new),
                })
            },
            self.max_pages,
        )
    }

    fn create_api(&self, spec: &ApiSpec) -> Result<NormalizedApi, GatewayError> {
        let name = required_name(spec)?;
        let backend = required_backend(spec, KONG_TYPE)?;
        let (service_overrides, route_overrides) = split_overrides(&spec.vendor_overrides);
        let mut service_payload = json!({"name": name, "url": backend});
        merge_overrides(&mut service_payload, &service_overrides);
        let service = self.client.send_json(Method::POST, "/services", &service_payload)?;
        let mut api = normalize_service(&service)?;

        let route_payload = route_payload(spec, &route_overrides);
        match self.create_route(api.id.as_str(), &route_payload) {
            Ok(route) => {
                apply_route(&mut api, &route);
                Ok(api)
            }
            Err(err) => {
                let _ = self.client.delete(format!("/services/{}", path_segment(api.id.as_str())));
                Err(err)
            }
        }
    }

    fn update_api(&self, id: &ApiId, spec: &ApiSpec) -> Result<NormalizedApi, GatewayError> {
        let (service_overrides, route_overrides) = split_overrides(&spec.vendor_overrides);
        let mut service_payload = Value::Object(Map::new());
        if let Some(name) = nonblank(Some(spec.name.as_str())) {
            service_payload["name"] = json!(name);
        }
        if let Some(backend) = nonblank(spec.backend.as_deref()) {
            service_payload["url"] = json!(backend);
        }
        merge_overrides(&mut service_payload, &service_overrides);
        let service = self.client.send_json(
            Method::PATCH,
            format!("/services/{}", path_segment(id.as_str())),
            &service_payload,
        )?;
        let mut api = normalize_service(&service)?;

        let touches_route = spec.normalized_base_path().is_some()
            || !spec.normalized_methods().is_empty()
            || !route_overrides.is_empty();
        let routes = self.service_routes(id.as_str())?;
        let route = match (touches_route, routes.first().and_then(|route| json_str(route, "/id"))) {
            (true, Some(route_id)) => Some(self.client.send_json(
                Method::PATCH,
                format!("/routes/{}", path_segment(&route_id)),
                &route_payload(spec, &route_overrides),
            )?),
            (true, None) => {
                Some(self.create_route(id.as_str(), &route_payload(spec, &route_overrides))?)
            }
            (false, _) => routes.first().cloned(),
        };
        if let Some(route) = route {
            apply_route(&mut api, &route);
        }
        Ok(api)
    }

    fn delete_api(&self, id: &ApiId) -> Result<(), GatewayError> {
        for route in self.service_routes(id.as_str())? {
            if let Some(route_id) = json_str(&route, "/id") {
                match self.client.delete(format!("/routes/{}", path_segment(&route_id))) {
                    Ok(()) | Err(GatewayError::NotFound(_)) => {}
                    Err(err) => return Err(err),
                }
            }
        }
        self.client.delete(format!("/services/{}", path_segment(id.as_str())))
    }

    fn api_metrics(&self, id: &ApiId) -> Result<ApiMetrics, GatewayError> {
        let segment = path_segment(id.as_str());
        let service = self.client.get(format!("/services/{segment}"))?;
        let routes = self.service_routes(id.as_str())?;
        let plugins_body = self.client.get(format!("/services/{segment}/plugins"))?;
        let plugins = json_array(&plugins_body, "/data");
        let enabled = plugins
            .iter()
            .filter(|plugin| plugin.get("enabled").and_then(Value::as_bool).unwrap_or(true))
            .count();
        let counters = BTreeMap::from([
            ("routes".to_string(), routes.len() as u64),
            ("plugins".to_string(), plugins.len() as u64),
            ("enabled_plugins".to_string(), enabled as u64),
        ]);
        let plugin_names: Vec<String> =
            plugins.iter().filter_map(|plugin| json_str(plugin, "/name")).collect();
        Ok(ApiMetrics {
            api_id: id.clone(),
            counters,
            detail: json!({"service": service, "plugins": plugin_names}),
        })
    }
}

// ============================================================================
// SECTION: Payload Shaping
// ============================================================================

/// Splits overrides into service fields and route fields.
fn split_overrides(overrides: &Map<String, Value>) -> (Map<String, Value>, Map<String, Value>) {
    let mut service = overrides.clone();
    let route = match service.remove(ROUTE_OVERRIDE_KEY) {
        Some(Value::Object(route)) => route,
        _ => Map::new(),
    };
    (service, route)
}

/// Builds a route payload from an [`ApiSpec`].
fn route_payload(spec: &ApiSpec, overrides: &Map<String, Value>) -> Value {
    let path = spec.normalized_base_path().unwrap_or_else(|| "/".to_string());
    let mut payload = json!({"paths": [path], "strip_path": true});
    let methods = spec.normalized_methods();
    if !methods.is_empty() {
        payload["methods"] = json!(methods);
    }
    merge_overrides(&mut payload, overrides);
    payload
}

/// Converts a Kong service object into a normalized API.
fn normalize_service(service: &Value) -> Result<NormalizedApi, GatewayError> {
    let id = json_str(service, "/id")
        .ok_or_else(|| GatewayError::unexpected("kong service without id"))?;
    let name = json_str(service, "/name").unwrap_or_else(|| id.clone());
    let mut api = NormalizedApi::new(id, name);
    api.backend = json_str(service, "/host").map(|host| {
        let protocol = json_str(service, "/protocol").unwrap_or_else(|| "http".to_string());
        let port = json_str(service, "/port").map(|port| format!(":{port}")).unwrap_or_default();
        let path = json_str(service, "/path").unwrap_or_default();
        format!("{protocol}://{host}{port}{path}")
    });
    api.vendor_detail = service.clone();
    Ok(api)
}

/// Copies path and methods from a route onto the API.
fn apply_route(api: &mut NormalizedApi, route: &Value) {
    api.base_path = json_str(route, "/paths/0");
    api.methods = methods_from(json_array(route, "/methods"));
    if let Value::Object(detail) = &mut api.vendor_detail {
        detail.insert("route".to_string(), route.clone());
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
