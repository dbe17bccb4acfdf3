// crates/gatewayctrl-adapters/src/http.rs
// ============================================================================
// Module: Vendor HTTP Scaffolding
// Description: Shared blocking HTTP client, auth, and error mapping for adapters.
// Purpose: Enforce TLS, timeout, and size policy once for every vendor call.
// Dependencies: gatewayctrl-core, reqwest, rustls, serde_json, url
// ============================================================================

//! ## Overview
//! Every adapter talks to its vendor through a [`VendorClient`]. The client is
//! built from the gateway config and the process [`HttpSettings`]: it applies
//! the total and connect timeouts, never follows redirects, honors
//! `tls_verify` and `certificate_path`, and caps response bodies. Failures are
//! translated into [`GatewayError`] here so no transport error type reaches a
//! caller:
//! - 400/422 map to `Validation`, 401/403 to `Unauthorized`, 404 to
//!   `NotFound`, 409 to `Conflict`, any other non-2xx to `UnexpectedResponse`.
//! - Certificate trust failures map to `TlsValidation`; connect failures and
//!   timeouts map to `Network`.
//!
//! Nothing here retries. Building a client performs no network I/O.
//!
//! Security posture: vendor responses are untrusted; bodies are size-limited
//! and error messages never echo request credentials.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::Read;

use gatewayctrl_core::GatewayConfig;
use gatewayctrl_core::GatewayError;
use gatewayctrl_core::HttpSettings;
use reqwest::Certificate;
use reqwest::Method;
use reqwest::blocking::Client;
use reqwest::blocking::RequestBuilder;
use reqwest::blocking::Response;
use reqwest::header::ACCEPT;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde_json::Value;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum characters of a vendor error message kept in a [`GatewayError`].
const MAX_VENDOR_MESSAGE_CHARS: usize = 256;

// ============================================================================
// SECTION: Authentication
// ============================================================================

/// Authentication scheme attached to every request of a client.
#[derive(Clone)]
pub enum RequestAuth {
    /// No credentials.
    None,
    /// Static headers such as API keys.
    Headers(Vec<(String, String)>),
    /// HTTP basic authentication.
    Basic {
        /// Account name.
        username: String,
        /// Account password.
        password: String,
    },
    /// Bearer token.
    Bearer(String),
}

impl RequestAuth {
    /// Attaches the credentials to a request.
    fn apply(&self, builder: RequestBuilder) -> RequestBuilder {
        match self {
            Self::None => builder,
            Self::Headers(headers) => headers.iter().fold(builder, |builder, (name, value)| {
                builder.header(name.as_str(), value.as_str())
            }),
            Self::Basic {
                username,
                password,
            } => builder.basic_auth(username, Some(password)),
            Self::Bearer(token) => builder.bearer_auth(token),
        }
    }

    /// Returns the scheme label.
    #[must_use]
    pub const fn scheme(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Headers(_) => "headers",
            Self::Basic {
                ..
            } => "basic",
            Self::Bearer(_) => "bearer",
        }
    }
}

impl fmt::Debug for RequestAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Headers(headers) => f
                .debug_tuple("Headers")
                .field(&headers.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>())
                .finish(),
            other => f.write_str(other.scheme()),
        }
    }
}

// ============================================================================
// SECTION: Requests
// ============================================================================

/// One vendor request relative to a client's base URL.
#[derive(Debug, Clone)]
pub struct VendorRequest {
    /// HTTP method.
    pub method: Method,
    /// Path appended to the base URL.
    pub path: String,
    /// Query parameters in order.
    pub query: Vec<(String, String)>,
    /// Serialized JSON body.
    pub body: Option<Vec<u8>>,
    /// Extra headers for this request only.
    pub headers: Vec<(String, String)>,
}

impl VendorRequest {
    /// Creates a request without query, body, or extra headers.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: Vec::new(),
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Creates a DELETE request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    /// Sets a JSON body.
    #[must_use]
    pub fn json(mut self, body: &Value) -> Self {
        self.body = Some(body.to_string().into_bytes());
        self
    }
}

// ============================================================================
// SECTION: Vendor Client
// ============================================================================

/// Blocking HTTP client bound to one gateway's base URL and credentials.
///
/// # Invariants
/// - Redirects are never followed.
/// - Every request is bounded by the configured timeouts.
/// - Response bodies larger than `max_response_bytes` fail closed.
#[derive(Debug)]
pub struct VendorClient {
    /// Underlying HTTP client with TLS and timeout policy applied.
    client: Client,
    /// Base URL all request paths are appended to.
    base_url: Url,
    /// Credentials attached to each request.
    auth: RequestAuth,
    /// Response body limit.
    max_response_bytes: usize,
}

impl VendorClient {
    /// Builds a client for a gateway.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] when the base URL is invalid or the
    /// trust certificate cannot be read.
    pub fn new(
        config: &GatewayConfig,
        settings: &HttpSettings,
        base_url: &str,
        auth: RequestAuth,
    ) -> Result<Self, GatewayError> {
        let base_url = parse_base_url(base_url)?;
        let client = build_http_client(config, settings)?;
        Ok(Self {
            client,
            base_url,
            auth,
            max_response_bytes: settings.max_response_bytes,
        })
    }

    /// Returns the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves the absolute URL of a request.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] when the joined URL is invalid.
    pub fn url_for(&self, request: &VendorRequest) -> Result<Url, GatewayError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let joined = if request.path.is_empty() {
            base.to_string()
        } else if request.path.starts_with('/') {
            format!("{base}{}", request.path)
        } else {
            format!("{base}/{}", request.path)
        };
        let mut url = Url::parse(&joined).map_err(|_| {
            GatewayError::Validation(format!("invalid request path {}", request.path))
        })?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(
                request.query.iter().map(|(name, value)| (name.as_str(), value.as_str())),
            );
        }
        Ok(url)
    }

    /// Sends a request and decodes the JSON response.
    ///
    /// Empty bodies decode to [`Value::Null`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] classified from the status or transport failure.
    pub fn execute(&self, request: &VendorRequest) -> Result<Value, GatewayError> {
        let url = self.url_for(request)?;
        let mut builder =
            self.client.request(request.method.clone(), url).header(ACCEPT, "application/json");
        builder = self.auth.apply(builder);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body.clone());
        }
        let mut response = builder.send().map_err(|err| classify_transport(&err))?;
        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let body =
                read_response_limited(&mut response, self.max_response_bytes).unwrap_or_default();
            return Err(status_error(status, &body));
        }
        let body = read_response_limited(&mut response, self.max_response_bytes)?;
        parse_json_body(&body)
    }

    /// Sends a GET request.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] classified from the status or transport failure.
    pub fn get(&self, path: impl Into<String>) -> Result<Value, GatewayError> {
        self.execute(&VendorRequest::get(path))
    }

    /// Sends a request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] classified from the status or transport failure.
    pub fn send_json(
        &self,
        method: Method,
        path: impl Into<String>,
        body: &Value,
    ) -> Result<Value, GatewayError> {
        self.execute(&VendorRequest::new(method, path).json(body))
    }

    /// Sends a DELETE request.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] classified from the status or transport failure.
    pub fn delete(&self, path: impl Into<String>) -> Result<(), GatewayError> {
        self.execute(&VendorRequest::delete(path)).map(|_| ())
    }
}

// ============================================================================
// SECTION: Client Construction
// ============================================================================

/// Parses and validates a vendor base URL.
///
/// # Errors
///
/// Returns [`GatewayError::Validation`] for unsupported or malformed URLs.
pub fn parse_base_url(raw: &str) -> Result<Url, GatewayError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(GatewayError::Validation("base url is required".to_string()));
    }
    let url = Url::parse(trimmed)
        .map_err(|_| GatewayError::Validation(format!("base url is invalid: {trimmed}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(GatewayError::Validation("base url must use http or https".to_string()));
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(GatewayError::Validation("base url must not embed credentials".to_string()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(GatewayError::Validation(
            "base url must not carry a query or fragment".to_string(),
        ));
    }
    Ok(url)
}

/// Builds the blocking client with timeout, redirect, and TLS policy applied.
fn build_http_client(
    config: &GatewayConfig,
    settings: &HttpSettings,
) -> Result<Client, GatewayError> {
    let mut builder = Client::builder()
        .timeout(settings.timeout)
        .connect_timeout(settings.connect_timeout)
        .user_agent(settings.user_agent.clone())
        .redirect(Policy::none());
    if !config.tls_verify {
        builder = builder.danger_accept_invalid_certs(true);
    } else if let Some(path) = &config.certificate_path {
        let pem = fs::read(path).map_err(|err| {
            GatewayError::Validation(format!("cannot read certificate {}: {err}", path.display()))
        })?;
        let certificate = Certificate::from_pem(&pem).map_err(|_| {
            GatewayError::Validation(format!("certificate {} is not valid PEM", path.display()))
        })?;
        builder = builder.add_root_certificate(certificate);
    }
    builder.build().map_err(|err| {
        GatewayError::Validation(format!("http client build failed: {}", root_cause(&err)))
    })
}

// ============================================================================
// SECTION: Error Mapping
// ============================================================================

/// Maps a non-2xx status and its body into the error taxonomy.
#[must_use]
pub fn status_error(status: u16, body: &[u8]) -> GatewayError {
    let detail = vendor_message(body).unwrap_or_else(|| format!("vendor returned status {status}"));
    match status {
        400 | 422 => GatewayError::Validation(detail),
        401 | 403 => GatewayError::Unauthorized(detail),
        404 => GatewayError::NotFound(detail),
        409 => GatewayError::Conflict(detail),
        _ => GatewayError::UnexpectedResponse {
            status: Some(status),
            message: detail,
        },
    }
}

/// Maps a transport failure into the error taxonomy.
#[must_use]
pub fn classify_transport(err: &reqwest::Error) -> GatewayError {
    if let Some(reason) = tls_failure(err) {
        return GatewayError::TlsValidation(reason);
    }
    let cause = root_cause(err);
    if err.is_timeout() {
        GatewayError::Network(format!("request timed out: {cause}"))
    } else if err.is_connect() {
        GatewayError::Network(format!("connection failed: {cause}"))
    } else if err.is_builder() {
        GatewayError::Validation(format!("request could not be built: {cause}"))
    } else {
        GatewayError::Network(format!("request failed: {cause}"))
    }
}

/// Returns a description when the error chain contains a TLS trust failure.
pub(crate) fn tls_failure(err: &(dyn StdError + 'static)) -> Option<String> {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(node) = current {
        if let Some(tls) = node.downcast_ref::<rustls::Error>() {
            return Some(tls.to_string());
        }
        if let Some(io) = node.downcast_ref::<std::io::Error>()
            && let Some(inner) = io.get_ref()
            && let Some(tls) = inner.downcast_ref::<rustls::Error>()
        {
            return Some(tls.to_string());
        }
        current = node.source();
    }
    let chain = chain_text(err).to_ascii_lowercase();
    if chain.contains("certificate") || chain.contains("handshake") {
        return Some(root_cause(err));
    }
    None
}

/// Returns the display text of the deepest error in the chain.
fn root_cause(err: &(dyn StdError + 'static)) -> String {
    let mut current = err;
    while let Some(next) = current.source() {
        current = next;
    }
    current.to_string()
}

/// Joins every message in the error chain.
fn chain_text(err: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut current = err.source();
    while let Some(next) = current {
        parts.push(next.to_string());
        current = next.source();
    }
    parts.join(": ")
}

/// Extracts a short human-readable message from a vendor error body.
fn vendor_message(body: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let message = serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|value| {
            ["message", "error_description", "description", "errorMessage", "error"]
                .iter()
                .find_map(|key| value.get(*key).and_then(Value::as_str).map(ToString::to_string))
        })
        .unwrap_or_else(|| text.to_string());
    Some(message.chars().take(MAX_VENDOR_MESSAGE_CHARS).collect())
}

// ============================================================================
// SECTION: Body Handling
// ============================================================================

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(
    response: &mut Response,
    max_bytes: usize,
) -> Result<Vec<u8>, GatewayError> {
    let expected_len = response.content_length();
    let max_bytes_u64 = u64::try_from(max_bytes)
        .map_err(|_| GatewayError::unexpected("response size limit exceeds u64"))?;
    if let Some(expected) = expected_len
        && expected > max_bytes_u64
    {
        return Err(GatewayError::unexpected("vendor response exceeds size limit"));
    }
    let mut buf = Vec::new();
    let limit = max_bytes_u64.saturating_add(1);
    let mut handle = response.take(limit);
    handle
        .read_to_end(&mut buf)
        .map_err(|err| GatewayError::Network(format!("failed to read response: {err}")))?;
    if buf.len() > max_bytes {
        return Err(GatewayError::unexpected("vendor response exceeds size limit"));
    }
    Ok(buf)
}

/// Decodes a JSON body; empty bodies decode to null.
fn parse_json_body(body: &[u8]) -> Result<Value, GatewayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body)
        .map_err(|_| GatewayError::unexpected("vendor response is not valid JSON"))
}

// ============================================================================
// SECTION: Shared Adapter Helpers
// ============================================================================

/// Returns the first non-empty secret among `keys`.
///
/// # Errors
///
/// Returns [`GatewayError::Validation`] naming the primary key when none is set.
pub fn require_secret(config: &GatewayConfig, keys: &[&str]) -> Result<String, GatewayError> {
    optional_secret(config, keys).ok_or_else(|| {
        GatewayError::Validation(format!(
            "{} credential {} is required",
            config.gateway_type,
            keys.first().copied().unwrap_or("secret")
        ))
    })
}

/// Returns the first non-empty secret among `keys`.
#[must_use]
pub fn optional_secret(config: &GatewayConfig, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| config.secret(key)).map(ToString::to_string)
}

/// Returns the first non-empty option among `keys`.
#[must_use]
pub fn option_value(config: &GatewayConfig, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| config.option(key)).map(ToString::to_string)
}

/// Percent-encodes a value for use as a single path segment.
#[must_use]
pub fn path_segment(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

// ============================================================================
// SECTION: Tests
// ============================================================================
