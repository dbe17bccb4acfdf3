// crates/gatewayctrl-adapters/src/tyk.rs
// ============================================================================
// Module: Tyk Adapter
// Description: Tyk Gateway API adapter for classic API definitions.
// Purpose: Map the adapter contract onto `/tyk/apis` with hot reloads.
// Dependencies: gatewayctrl-core, reqwest, serde_json
// ============================================================================

//! ## Overview
//! The Tyk Gateway API authenticates with the `x-tyk-authorization` header and
//! returns every definition in one response. Definition changes only take
//! effect after a reload, so each successful mutation is followed by
//! `GET /tyk/reload/group`; a failed reload is reported to the caller.

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
use reqwest::Method;
use serde_json::Value;
use serde_json::json;

use crate::http::RequestAuth;
use crate::http::VendorClient;
use crate::http::path_segment;
use crate::http::require_secret;
use crate::shape::child_object;
use crate::shape::json_str;
use crate::shape::merge_overrides;
use crate::shape::nonblank;
use crate::shape::object_at;
use crate::shape::required_backend;
use crate::shape::required_base_path;
use crate::shape::required_name;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Registry key for Tyk.
pub const TYK_TYPE: &str = "tyk";

/// Hot reload endpoint for the whole gateway group.
const RELOAD_PATH: &str = "/tyk/reload/group";

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// Tyk Gateway API adapter.
#[derive(Debug)]
pub struct TykAdapter {
    /// Registry key.
    gateway_type: GatewayType,
    /// Gateway API client.
    client: VendorClient,
}

impl TykAdapter {
    /// Builds an adapter without touching the network.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] when the authorization secret is
    /// missing or the base URL is invalid.
    pub fn new(config: &GatewayConfig, settings: &HttpSettings) -> Result<Self, GatewayError> {
        let secret = require_secret(config, &["authorizationSecret", "tyk_auth_secret"])?;
        let auth = RequestAuth::Headers(vec![("x-tyk-authorization".to_string(), secret)]);
        Ok(Self {
            gateway_type: GatewayType::new(TYK_TYPE),
            client: VendorClient::new(config, settings, &config.base_url, auth)?,
        })
    }

    /// Applies pending definition changes.
    fn reload(&self) -> Result<(), GatewayError> {
        self.client.get(RELOAD_PATH).map(|_| ())
    }

    /// Path of one definition.
    fn api_path(id: &ApiId) -> String {
        format!("/tyk/apis/{}", path_segment(id.as_str()))
    }
}

impl GatewayAdapter for TykAdapter {
    fn gateway_type(&self) -> &GatewayType {
        &self.gateway_type
    }

    fn check_connection(&self) -> Result<(), GatewayError> {
        let body = self.client.get("/tyk/apis")?;
        if body.is_array() {
            Ok(())
        } else {
            Err(GatewayError::unexpected("tyk api listing is not an array"))
        }
    }

    fn list_apis(&self) -> ApiStream<'_> {
        ApiStream::from_fn(
            move |_| {
                let body = self.client.get("/tyk/apis")?;
                let definitions = body
                    .as_array()
                    .ok_or_else(|| GatewayError::unexpected("tyk api listing is not an array"))?;
                let items =
                    definitions.iter().map(normalize_definition).collect::<Result<Vec<_>, _>>()?;
                Ok(ApiPage::last(items))
            },
            1,
        )
    }

    fn create_api(&self, spec: &ApiSpec) -> Result<NormalizedApi, GatewayError> {
        let name = required_name(spec)?;
        let listen_path = required_base_path(spec, TYK_TYPE)?;
        let target = required_backend(spec, TYK_TYPE)?;
        let mut definition = json!({
            "name": name,
            "active": true,
            "use_keyless": true,
            "proxy": {
                "listen_path": listen_path,
                "target_url": target,
                "strip_listen_path": true,
            },
            "version_data": {
                "not_versioned": true,
                "versions": {"Default": {"name": "Default"}},
            },
        });
        merge_overrides(&mut definition, &spec.vendor_overrides);
        let response = self.client.send_json(Method::POST, "/tyk/apis", &definition)?;
        let key = json_str(&response, "/key")
            .ok_or_else(|| GatewayError::unexpected("tyk create response without key"))?;
        self.reload()?;
        definition["api_id"] = json!(key);
        normalize_definition(&definition)
    }

    fn update_api(&self, id: &ApiId, spec: &ApiSpec) -> Result<NormalizedApi, GatewayError> {
        let mut definition = self.client.get(Self::api_path(id))?;
        let fields = object_at(&mut definition, "", "tyk api definition")?;
        if let Some(name) = nonblank(Some(spec.name.as_str())) {
            fields.insert("name".to_string(), json!(name));
        }
        let listen_path = spec.normalized_base_path();
        let target = nonblank(spec.backend.as_deref());
        if listen_path.is_some() || target.is_some() {
            let proxy = child_object(fields, "proxy", "tyk proxy definition")?;
            if let Some(listen_path) = listen_path {
                proxy.insert("listen_path".to_string(), json!(listen_path));
            }
            if let Some(target) = target {
                proxy.insert("target_url".to_string(), json!(target));
            }
        }
        merge_overrides(&mut definition, &spec.vendor_overrides);
        self.client.send_json(Method::PUT, Self::api_path(id), &definition)?;
        self.reload()?;
        object_at(&mut definition, "", "tyk api definition")?
            .insert("api_id".to_string(), json!(id.as_str()));
        normalize_definition(&definition)
    }

    fn delete_api(&self, id: &ApiId) -> Result<(), GatewayError> {
        self.client.delete(Self::api_path(id))?;
        self.reload()
    }
}

// ============================================================================
// SECTION: Payload Shaping
// ============================================================================

/// Converts a classic API definition into a normalized API.
fn normalize_definition(definition: &Value) -> Result<NormalizedApi, GatewayError> {
    let id = json_str(definition, "/api_id")
        .or_else(|| json_str(definition, "/id"))
        .ok_or_else(|| GatewayError::unexpected("tyk api definition without api_id"))?;
    let name = json_str(definition, "/name").unwrap_or_else(|| id.clone());
    let mut api = NormalizedApi::new(id, name);
    api.base_path = json_str(definition, "/proxy/listen_path");
    api.backend = json_str(definition, "/proxy/target_url");
    api.vendor_detail = definition.clone();
    Ok(api)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
