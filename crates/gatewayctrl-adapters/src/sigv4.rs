// crates/gatewayctrl-adapters/src/sigv4.rs
// ============================================================================
// Module: AWS Signature Version 4
// Description: Request signing for the AWS API Gateway management API.
// Purpose: Produce the date, token, and authorization headers for one request.
// Dependencies: hmac, sha2, hex, time, url
// ============================================================================

//! ## Overview
//! Implements the header-based SigV4 scheme. The signer only sees the final
//! request URL, method, and body; it never touches the network. Signed headers
//! are `host` and `x-amz-date`, plus `x-amz-security-token` when temporary
//! credentials are used.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use gatewayctrl_core::GatewayError;
use hmac::Mac as _;
use sha2::Digest as _;
use sha2::Sha256;
use time::OffsetDateTime;
use time::UtcOffset;
use url::Url;

use crate::http::path_segment;

// ============================================================================
// SECTION: Types
// ============================================================================

/// HMAC-SHA256 instance used by the signing key chain.
type HmacSha256 = hmac::Hmac<Sha256>;

/// Signing algorithm label.
const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// AWS credentials used to sign requests.
#[derive(Clone)]
pub struct SigningCredentials {
    /// Access key id.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Session token for temporary credentials.
    pub session_token: Option<String>,
}

impl fmt::Debug for SigningCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// SigV4 signer bound to a region and service.
#[derive(Debug, Clone)]
pub struct SigV4Signer {
    /// Credentials.
    credentials: SigningCredentials,
    /// AWS region, e.g. `us-east-1`.
    region: String,
    /// Service name, e.g. `apigateway`.
    service: String,
}

impl SigV4Signer {
    /// Creates a signer.
    #[must_use]
    pub fn new(
        credentials: SigningCredentials,
        region: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            region: region.into(),
            service: service.into(),
        }
    }

    /// Returns the headers to attach to a request signed at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] when the URL has no host.
    pub fn sign(
        &self,
        method: &str,
        url: &Url,
        body: &[u8],
        now: OffsetDateTime,
    ) -> Result<Vec<(String, String)>, GatewayError> {
        let now = now.to_offset(UtcOffset::UTC);
        let date = format!("{:04}{:02}{:02}", now.year(), u8::from(now.month()), now.day());
        let amz_date =
            format!("{date}T{:02}{:02}{:02}Z", now.hour(), now.minute(), now.second());
        let host = canonical_host(url)?;

        let mut canonical_headers = vec![("host", host), ("x-amz-date", amz_date.clone())];
        if let Some(token) = &self.credentials.session_token {
            canonical_headers.push(("x-amz-security-token", token.clone()));
        }
        let signed_headers =
            canonical_headers.iter().map(|(name, _)| *name).collect::<Vec<_>>().join(";");
        let header_block: String = canonical_headers
            .iter()
            .map(|(name, value)| format!("{name}:{}\n", value.trim()))
            .collect();

        let canonical_request = format!(
            "{}\n{}\n{}\n{header_block}\n{signed_headers}\n{}",
            method.to_ascii_uppercase(),
            canonical_uri(url),
            canonical_query(url),
            sha256_hex(body),
        );
        let scope = format!("{date}/{}/{}/aws4_request", self.region, self.service);
        let request_digest = sha256_hex(canonical_request.as_bytes());
        let string_to_sign = format!("{ALGORITHM}\n{amz_date}\n{scope}\n{request_digest}");

        let secret = format!("AWS4{}", self.credentials.secret_access_key);
        let k_date = hmac(secret.as_bytes(), date.as_bytes())?;
        let k_region = hmac(&k_date, self.region.as_bytes())?;
        let k_service = hmac(&k_region, self.service.as_bytes())?;
        let k_signing = hmac(&k_service, b"aws4_request")?;
        let signature = hex::encode(hmac(&k_signing, string_to_sign.as_bytes())?);

        let mut headers = vec![("x-amz-date".to_string(), amz_date)];
        if let Some(token) = &self.credentials.session_token {
            headers.push(("x-amz-security-token".to_string(), token.clone()));
        }
        headers.push((
            "authorization".to_string(),
            format!(
                "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, \
                 Signature={signature}",
                self.credentials.access_key_id
            ),
        ));
        Ok(headers)
    }
}

// ============================================================================
// SECTION: Canonical Form
// ============================================================================

/// Returns `host[:port]` as sent in the Host header.
fn canonical_host(url: &Url) -> Result<String, GatewayError> {
    let host = url
        .host_str()
        .ok_or_else(|| GatewayError::Validation("signed request url has no host".to_string()))?;
    Ok(url.port().map_or_else(|| host.to_string(), |port| format!("{host}:{port}")))
}

/// Encodes each path segment of the already-encoded path once more.
fn canonical_uri(url: &Url) -> String {
    let path = url.path();
    if path.is_empty() {
        return "/".to_string();
    }
    path.split('/').map(path_segment).collect::<Vec<_>>().join("/")
}

/// Sorted, RFC 3986 encoded query string.
fn canonical_query(url: &Url) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(name, value)| (path_segment(&name), path_segment(&value)))
        .collect();
    pairs.sort();
    pairs.iter().map(|(name, value)| format!("{name}={value}")).collect::<Vec<_>>().join("&")
}

/// Hex SHA-256 digest.
fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// HMAC-SHA256 of `data` under `key`.
fn hmac(key: &[u8], data: &[u8]) -> Result<Vec<u8>, GatewayError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|_| GatewayError::Validation("invalid signing key".to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::use_debug,
        reason = "Test-only assertions are permitted."
    )]

    use super::*;

    fn signer(session_token: Option<&str>) -> SigV4Signer {
        SigV4Signer::new(
            SigningCredentials {
                access_key_id: "AKIDEXAMPLE".to_string(),
                secret_access_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string(),
                session_token: session_token.map(ToString::to_string),
            },
            "us-east-1",
            "service",
        )
    }

    fn at() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_440_938_160).unwrap()
    }

    fn header<'a>(headers: &'a [(String, String)], name: &str) -> &'a str {
        headers.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str()).unwrap()
    }

    #[test]
    fn signs_vanilla_get() {
        let url = Url::parse("https://example.amazonaws.com/").unwrap();
        let headers = signer(None).sign("GET", &url, b"", at()).unwrap();
        assert_eq!(header(&headers, "x-amz-date"), "20150830T123600Z");
        assert_eq!(
            header(&headers, "authorization"),
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request, \
             SignedHeaders=host;x-amz-date, \
             Signature=5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31"
        );
    }

    #[test]
    fn query_parameters_are_sorted_before_signing() {
        let url = Url::parse("https://example.amazonaws.com/?Param2=value2&Param1=value1").unwrap();
        assert_eq!(canonical_query(&url), "Param1=value1&Param2=value2");
        let headers = signer(None).sign("GET", &url, b"", at()).unwrap();
        assert!(header(&headers, "authorization").ends_with(
            "Signature=b97d918cfa904a5beff61c982a1b6f458b799221646efd99d3219ec94cdf2500"
        ));
    }

    #[test]
    fn session_token_is_signed() {
        let url = Url::parse("https://example.amazonaws.com/restapis").unwrap();
        let headers = signer(Some("token")).sign("GET", &url, b"", at()).unwrap();
        assert_eq!(header(&headers, "x-amz-security-token"), "token");
        assert!(
            header(&headers, "authorization")
                .contains("SignedHeaders=host;x-amz-date;x-amz-security-token")
        );
    }

    #[test]
    fn non_default_ports_are_part_of_the_host() {
        let url = Url::parse("http://127.0.0.1:8080/restapis").unwrap();
        assert_eq!(canonical_host(&url).unwrap(), "127.0.0.1:8080");
        let url = Url::parse("https://apigateway.us-east-1.amazonaws.com:443/").unwrap();
        assert_eq!(canonical_host(&url).unwrap(), "apigateway.us-east-1.amazonaws.com");
    }

    #[test]
    fn debug_hides_secrets() {
        let rendered = format!("{:?}", signer(Some("token")));
        assert!(!rendered.contains("wJalr"));
        assert!(!rendered.contains("\"token\""));
    }
}
