// crates/gatewayctrl-adapters/src/aws.rs
// ============================================================================
// Module: AWS Adapter
// Description: Amazon API Gateway (REST APIs) management adapter.
// Purpose: Map the adapter contract onto `/restapis` with SigV4 signed calls.
// Dependencies: gatewayctrl-core, reqwest, serde_json, time
// ============================================================================

//! ## Overview
//! Calls the regional `apigateway` control-plane endpoint directly and signs
//! each request with [`SigV4Signer`]. `baseUrl` may be left empty to use
//! `https://apigateway.{region}.amazonaws.com`. Metrics would require
//! CloudWatch, so they are reported as unsupported.

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
use time::OffsetDateTime;

use crate::http::RequestAuth;
use crate::http::VendorClient;
use crate::http::VendorRequest;
use crate::http::option_value;
use crate::http::optional_secret;
use crate::http::path_segment;
use crate::http::require_secret;
use crate::shape::json_array;
use crate::shape::json_str;
use crate::shape::merge_overrides;
use crate::shape::nonblank;
use crate::shape::required_name;
use crate::sigv4::SigV4Signer;
use crate::sigv4::SigningCredentials;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Registry key for AWS API Gateway.
pub const AWS_TYPE: &str = "aws";

/// Region used when none is configured.
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

/// SigV4 service name.
const SERVICE: &str = "apigateway";

/// Largest `limit` the `GetRestApis` call accepts.
const MAX_AWS_PAGE_SIZE: usize = 500;

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// Amazon API Gateway adapter.
#[derive(Debug)]
pub struct AwsAdapter {
    /// Registry key.
    gateway_type: GatewayType,
    /// Unauthenticated client; signing happens per request.
    client: VendorClient,
    /// Request signer.
    signer: SigV4Signer,
    /// APIs requested per page.
    page_size: usize,
    /// Page budget for one listing.
    max_pages: usize,
}

impl AwsAdapter {
    /// Builds an adapter without touching the network.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] when keys are missing or the
    /// endpoint is invalid.
    pub fn new(config: &GatewayConfig, settings: &HttpSettings) -> Result<Self, GatewayError> {
        let region =
            option_value(config, &["region"]).unwrap_or_else(|| DEFAULT_AWS_REGION.to_string());
        let credentials = SigningCredentials {
            access_key_id: require_secret(config, &["accessKeyId", "aws_access_key_id"])?,
            secret_access_key: require_secret(
                config,
                &["secretAccessKey", "aws_secret_access_key"],
            )?,
            session_token: optional_secret(config, &["sessionToken", "aws_session_token"]),
        };
        let endpoint = nonblank(Some(config.base_url.as_str())).map_or_else(
            || format!("https://{SERVICE}.{region}.amazonaws.com"),
            ToString::to_string,
        );
        Ok(Self {
            gateway_type: GatewayType::new(AWS_TYPE),
            client: VendorClient::new(config, settings, &endpoint, RequestAuth::None)?,
            signer: SigV4Signer::new(credentials, region, SERVICE),
            page_size: settings.page_size.clamp(1, MAX_AWS_PAGE_SIZE),
            max_pages: settings.max_pages,
        })
    }

    /// Signs and sends a request.
    fn signed(&self, mut request: VendorRequest) -> Result<Value, GatewayError> {
        let url = self.client.url_for(&request)?;
        let body = request.body.as_deref().unwrap_or_default();
        let headers =
            self.signer.sign(request.method.as_str(), &url, body, OffsetDateTime::now_utc())?;
        request.headers.extend(headers);
        self.client.execute(&request)
    }

    /// Path of one REST API.
    fn api_path(id: &ApiId) -> String {
        format!("/restapis/{}", path_segment(id.as_str()))
    }
}

impl GatewayAdapter for AwsAdapter {
    fn gateway_type(&self) -> &GatewayType {
        &self.gateway_type
    }

    fn check_connection(&self) -> Result<(), GatewayError> {
        self.signed(VendorRequest::get("/restapis").query("limit", 1)).map(|_| ())
    }

    fn list_apis(&self) -> ApiStream<'_> {
        let limit = self.page_size;
        ApiStream::from_fn(
            move |cursor: Option<&PageCursor>| {
                let mut request = VendorRequest::get("/restapis").query("limit", limit);
                if let Some(cursor) = cursor {
                    request = request.query("position", cursor.as_str());
                }
                let body = self.signed(request)?;
                let items = rest_api_items(&body)
                    .iter()
                    .map(normalize_rest_api)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ApiPage {
                    items,
                    next: json_str(&body, "/position").map(PageCursor::new),
                })
            },
            self.max_pages,
        )
    }

    fn create_api(&self, spec: &ApiSpec) -> Result<NormalizedApi, GatewayError> {
        let name = required_name(spec)?;
        let mut payload = json!({"name": name});
        if let Some(description) = nonblank(spec.description.as_deref()) {
            payload["description"] = json!(description);
        }
        if let Some(version) = nonblank(spec.version.as_deref()) {
            payload["version"] = json!(version);
        }
        merge_overrides(&mut payload, &spec.vendor_overrides);
        let created = self.signed(VendorRequest::new(Method::POST, "/restapis").json(&payload))?;
        normalize_rest_api(&created)
    }

    fn update_api(&self, id: &ApiId, spec: &ApiSpec) -> Result<NormalizedApi, GatewayError> {
        let mut operations = Vec::new();
        if let Some(name) = nonblank(Some(spec.name.as_str())) {
            operations.push(json!({"op": "replace", "path": "/name", "value": name}));
        }
        if let Some(description) = nonblank(spec.description.as_deref()) {
            operations.push(json!({"op": "replace", "path": "/description", "value": description}));
        }
        if let Some(version) = nonblank(spec.version.as_deref()) {
            operations.push(json!({"op": "replace", "path": "/version", "value": version}));
        }
        if operations.is_empty() {
            return Err(GatewayError::Validation(
                "aws update requires a name, description, or version".to_string(),
            ));
        }
        let mut payload = json!({"patchOperations": operations});
        merge_overrides(&mut payload, &spec.vendor_overrides);
        let updated =
            self.signed(VendorRequest::new(Method::PATCH, Self::api_path(id)).json(&payload))?;
        normalize_rest_api(&updated)
    }

    fn delete_api(&self, id: &ApiId) -> Result<(), GatewayError> {
        self.signed(VendorRequest::delete(Self::api_path(id))).map(|_| ())
    }
}

// ============================================================================
// SECTION: Payload Shaping
// ============================================================================

/// Returns the REST API items from either the plain or HAL response shape.
fn rest_api_items(body: &Value) -> &[Value] {
    ["/item", "/items", "/_embedded/item"]
        .iter()
        .map(|pointer| json_array(body, pointer))
        .find(|items| !items.is_empty())
        .unwrap_or_default()
}

/// Converts a REST API resource into a normalized API.
fn normalize_rest_api(api: &Value) -> Result<NormalizedApi, GatewayError> {
    let id = json_str(api, "/id")
        .ok_or_else(|| GatewayError::unexpected("aws rest api without id"))?;
    let name = json_str(api, "/name").unwrap_or_else(|| id.clone());
    let mut normalized = NormalizedApi::new(id, name);
    normalized.vendor_detail = api.clone();
    Ok(normalized)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
