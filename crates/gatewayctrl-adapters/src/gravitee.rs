// crates/gatewayctrl-adapters/src/gravitee.rs
// ============================================================================
// Module: Gravitee Adapter
// Description: Gravitee APIM Management API v2 adapter.
// Purpose: Map the adapter contract onto environment-scoped v4 proxy APIs.
// Dependencies: gatewayctrl-core, reqwest, serde_json
// ============================================================================

//! ## Overview
//! Every call is scoped to
//! `/management/v2/organizations/{org}/environments/{env}`; both identifiers
//! default to `DEFAULT`. Authentication is basic or bearer, chosen by
//! `authType` or inferred from which credentials are present. Listing pages by
//! `page`/`perPage` until the reported `pageCount` is reached.

// ============================================================================
// SECTION: Imports
// ============================================================================

use gatewayctrl_core::ApiId;
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
use crate::shape::json_array;
use crate::shape::json_str;
use crate::shape::json_u64;
use crate::shape::merge_overrides;
use crate::shape::nonblank;
use crate::shape::required_backend;
use crate::shape::required_base_path;
use crate::shape::required_name;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Registry key for Gravitee.
pub const GRAVITEE_TYPE: &str = "gravitee";

/// Organization and environment used when none is configured.
const DEFAULT_SCOPE: &str = "DEFAULT";

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// Gravitee Management API adapter.
#[derive(Debug)]
pub struct GraviteeAdapter {
    /// Registry key.
    gateway_type: GatewayType,
    /// Environment-scoped client.
    client: VendorClient,
    /// APIs requested per page.
    page_size: usize,
    /// Page budget for one listing.
    max_pages: usize,
}

impl GraviteeAdapter {
    /// Builds an adapter without touching the network.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] when no usable credentials are
    /// configured or the base URL is invalid.
    pub fn new(config: &GatewayConfig, settings: &HttpSettings) -> Result<Self, GatewayError> {
        let organization = option_value(config, &["organizationId", "organization_id"])
            .unwrap_or_else(|| DEFAULT_SCOPE.to_string());
        let environment = option_value(config, &["environmentId", "environment_id"])
            .unwrap_or_else(|| DEFAULT_SCOPE.to_string());
        let base = format!(
            "{}/management/v2/organizations/{}/environments/{}",
            config.base_url.trim().trim_end_matches('/'),
            path_segment(&organization),
            path_segment(&environment),
        );
        Ok(Self {
            gateway_type: GatewayType::new(GRAVITEE_TYPE),
            client: VendorClient::new(config, settings, &base, gravitee_auth(config)?)?,
            page_size: settings.page_size.max(1),
            max_pages: settings.max_pages,
        })
    }

    /// Path of one API.
    fn api_path(id: &ApiId) -> String {
        format!("/apis/{}", path_segment(id.as_str()))
    }
}

impl GatewayAdapter for GraviteeAdapter {
    fn gateway_type(&self) -> &GatewayType {
        &self.gateway_type
    }

    fn check_connection(&self) -> Result<(), GatewayError> {
        self.client.execute(&VendorRequest::get("/apis").query("perPage", 1)).map(|_| ())
    }

    fn list_apis(&self) -> ApiStream<'_> {
        let per_page = self.page_size;
        ApiStream::from_fn(
            move |cursor: Option<&PageCursor>| {
                let page = match cursor {
                    Some(cursor) => cursor.as_str().parse::<u64>().map_err(|_| {
                        GatewayError::unexpected("gravitee page cursor is not a number")
                    })?,
                    None => 1,
                };
                let request =
                    VendorRequest::get("/apis").query("page", page).query("perPage", per_page);
                let body = self.client.execute(&request)?;
                let items = json_array(&body, "/data")
                    .iter()
                    .map(normalize_api)
                    .collect::<Result<Vec<_>, _>>()?;
                let page_count = json_u64(&body, "/pagination/pageCount").unwrap_or(page);
                let next = (page < page_count && !items.is_empty())
                    .then(|| PageCursor::new(page.saturating_add(1).to_string()));
                Ok(ApiPage {
                    items,
                    next,
                })
            },
            self.max_pages,
        )
    }

    fn create_api(&self, spec: &ApiSpec) -> Result<NormalizedApi, GatewayError> {
        let name = required_name(spec)?;
        let path = required_base_path(spec, GRAVITEE_TYPE)?;
        let target = required_backend(spec, GRAVITEE_TYPE)?;
        let version = nonblank(spec.version.as_deref()).unwrap_or("1.0");
        let mut payload = json!({
            "name": name,
            "apiVersion": version,
            "definitionVersion": "V4",
            "type": "PROXY",
            "description": spec.description.clone().unwrap_or_default(),
            "listeners": [{
                "type": "HTTP",
                "paths": [{"path": path}],
                "entrypoints": [{"type": "http-proxy"}],
            }],
            "endpointGroups": [{
                "name": "default-group",
                "type": "http-proxy",
                "endpoints": [{
                    "name": "default",
                    "type": "http-proxy",
                    "weight": 1,
                    "inheritConfiguration": false,
                    "configuration": {"target": target},
                }],
            }],
        });
        merge_overrides(&mut payload, &spec.vendor_overrides);
        let created = self.client.send_json(Method::POST, "/apis", &payload)?;
        normalize_api(&created)
    }

    fn update_api(&self, id: &ApiId, spec: &ApiSpec) -> Result<NormalizedApi, GatewayError> {
        let mut payload = self.client.get(Self::api_path(id))?;
        if !payload.is_object() {
            return Err(GatewayError::unexpected("gravitee api is not an object"));
        }
        if let Some(name) = nonblank(Some(spec.name.as_str())) {
            payload["name"] = json!(name);
        }
        if let Some(version) = nonblank(spec.version.as_deref()) {
            payload["apiVersion"] = json!(version);
        }
        if let Some(description) = nonblank(spec.description.as_deref()) {
            payload["description"] = json!(description);
        }
        if let Some(path) = spec.normalized_base_path()
            && let Some(paths) = payload.pointer_mut("/listeners/0/paths")
        {
            *paths = json!([{"path": path}]);
        }
        if let Some(target) = nonblank(spec.backend.as_deref())
            && let Some(configuration) =
                payload.pointer_mut("/endpointGroups/0/endpoints/0/configuration")
        {
            configuration
                .as_object_mut()
                .ok_or_else(|| {
                    GatewayError::unexpected("gravitee endpoint configuration is not an object")
                })?
                .insert("target".to_string(), json!(target));
        }
        merge_overrides(&mut payload, &spec.vendor_overrides);
        let updated = self.client.send_json(Method::PUT, Self::api_path(id), &payload)?;
        normalize_api(&updated)
    }

    fn delete_api(&self, id: &ApiId) -> Result<(), GatewayError> {
        self.client.delete(Self::api_path(id))
    }
}

// ============================================================================
// SECTION: Authentication
// ============================================================================

/// Resolves the configured authentication scheme.
fn gravitee_auth(config: &GatewayConfig) -> Result<RequestAuth, GatewayError> {
    let username = optional_secret(config, &["username"]);
    let password = optional_secret(config, &["password"]);
    let token = optional_secret(config, &["token"]);
    let auth_type = optional_secret(config, &["authType", "auth_type"])
        .map(|value| value.to_ascii_lowercase());
    match (auth_type.as_deref(), username, password, token) {
        (Some("basic") | None, Some(username), Some(password), _) => Ok(RequestAuth::Basic {
            username,
            password,
        }),
        (Some("bearer") | None, _, _, Some(token)) => Ok(RequestAuth::Bearer(token)),
        (Some("basic"), ..) => Err(GatewayError::Validation(
            "gravitee basic auth requires username and password".to_string(),
        )),
        (Some("bearer"), ..) => {
            Err(GatewayError::Validation("gravitee bearer auth requires token".to_string()))
        }
        (Some(other), ..) => {
            Err(GatewayError::Validation(format!("gravitee auth type {other} is not supported")))
        }
        (None, ..) => Err(GatewayError::Validation(
            "gravitee requires username and password or a bearer token".to_string(),
        )),
    }
}

// ============================================================================
// SECTION: Payload Shaping
// ============================================================================

/// Converts a v2 API object into a normalized API.
fn normalize_api(api: &Value) -> Result<NormalizedApi, GatewayError> {
    let id = json_str(api, "/id")
        .ok_or_else(|| GatewayError::unexpected("gravitee api without id"))?;
    let name = json_str(api, "/name").unwrap_or_else(|| id.clone());
    let mut normalized = NormalizedApi::new(id, name);
    normalized.base_path = json_str(api, "/listeners/0/paths/0/path")
        .or_else(|| json_str(api, "/proxy/virtualHosts/0/path"));
    normalized.backend = json_str(api, "/endpointGroups/0/endpoints/0/configuration/target")
        .or_else(|| json_str(api, "/proxy/groups/0/endpoints/0/target"));
    normalized.vendor_detail = api.clone();
    Ok(normalized)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
