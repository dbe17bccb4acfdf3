// crates/gatewayctrl-adapters/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: In-process mock vendor management API for adapter tests.
// Purpose: Script vendor responses and record the requests adapters send.
// Dependencies: tiny_http, serde_json
// ============================================================================

//! ## Overview
//! [`MockVendor`] serves scripted JSON responses on a loopback port and keeps
//! every request it saw. The server thread stops when the mock is dropped.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    dead_code,
    reason = "Test-only helpers; not every test binary uses every helper."
)]

use std::io::Read;
use std::net::TcpListener;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use gatewayctrl_core::HttpSettings;
use serde_json::Value;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Recorded Requests
// ============================================================================

/// Request observed by the mock.
#[derive(Debug, Clone)]
pub struct Recorded {
    /// HTTP method.
    pub method: String,
    /// Path and query.
    pub url: String,
    /// Header name/value pairs, names lowercased.
    pub headers: Vec<(String, String)>,
    /// Raw body.
    pub body: String,
}

impl Recorded {
    /// Returns the first header value with `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers.iter().find(|(key, _)| *key == name).map(|(_, value)| value.as_str())
    }

    /// Returns the path without the query.
    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or_default()
    }

    /// Returns true when the request is `method` on exactly `path`.
    pub fn is(&self, method: &str, path: &str) -> bool {
        self.method == method && self.path() == path
    }

    /// Parses the body as JSON.
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

// ============================================================================
// SECTION: Mock Vendor
// ============================================================================

/// Scripted handler: request in, status and JSON body out.
type Handler = dyn Fn(&Recorded) -> (u16, Value) + Send + 'static;

/// Loopback vendor API.
pub struct MockVendor {
    /// Base URL clients should use.
    pub base_url: String,
    /// Requests in arrival order.
    requests: Arc<Mutex<Vec<Recorded>>>,
    /// Shutdown flag.
    stop: Arc<AtomicBool>,
    /// Server thread.
    handle: Option<thread::JoinHandle<()>>,
}

impl MockVendor {
    /// Starts a mock answering every request with `handler`.
    pub fn start(handler: impl Fn(&Recorded) -> (u16, Value) + Send + 'static) -> Self {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let stop = Arc::new(AtomicBool::new(false));
        let handler: Box<Handler> = Box::new(handler);
        let handle = {
            let requests = Arc::clone(&requests);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                while !stop.load(Ordering::SeqCst) {
                    let Ok(Some(mut request)) = server.recv_timeout(Duration::from_millis(20))
                    else {
                        continue;
                    };
                    let mut body = String::new();
                    let _ = request.as_reader().read_to_string(&mut body);
                    let recorded = Recorded {
                        method: request.method().to_string(),
                        url: request.url().to_string(),
                        headers: request
                            .headers()
                            .iter()
                            .map(|header| {
                                let name = header.field.to_string().to_ascii_lowercase();
                                (name, header.value.to_string())
                            })
                            .collect(),
                        body,
                    };
                    let (status, payload) = handler(&recorded);
                    requests.lock().unwrap().push(recorded);
                    let text = if payload.is_null() { String::new() } else { payload.to_string() };
                    let content_type =
                        Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
                    let response = Response::from_string(text)
                        .with_status_code(status)
                        .with_header(content_type);
                    let _ = request.respond(response);
                }
            })
        };
        Self {
            base_url: format!("http://{addr}"),
            requests,
            stop,
            handle: Some(handle),
        }
    }

    /// Returns the requests seen so far.
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for MockVendor {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Settings with short bounds so failing tests finish quickly.
pub fn fast_settings() -> HttpSettings {
    HttpSettings {
        timeout: Duration::from_secs(3),
        connect_timeout: Duration::from_secs(1),
        ..HttpSettings::default()
    }
}

/// Returns a loopback URL nothing is listening on.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
