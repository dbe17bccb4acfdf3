// crates/gatewayctrl-core/src/audit.rs
// ============================================================================
// Module: GatewayCtrl Audit Logging
// Description: Structured audit events for adapter calls, credential handling,
//              and repository changes.
// Purpose: Emit redacted JSON-lines records without a logging framework.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Components never print. They hand typed events to an [`AuditSink`], and the
//! host decides where the JSON lines go (stderr, a file, memory, nowhere).
//! Events carry field names, ids, and error kinds; they never carry secret
//! values.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use serde_json::Value;

use crate::core::GatewayConfig;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Adapter operation audit event.
#[derive(Debug, Clone, Serialize)]
pub struct AdapterAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Gateway identifier when the config has been saved.
    pub gateway_id: Option<String>,
    /// Gateway display name.
    pub gateway_name: String,
    /// Vendor key.
    pub gateway_type: String,
    /// Contract operation name.
    pub operation: &'static str,
    /// Target API when the operation has one.
    pub api_id: Option<String>,
    /// Outcome label.
    pub outcome: &'static str,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Error message (never contains secrets).
    pub error_message: Option<String>,
    /// Wall-clock duration of the call.
    pub duration_ms: u128,
}

impl AdapterAuditEvent {
    /// Builds an event for an operation on `config`.
    #[must_use]
    pub fn new(
        config: &GatewayConfig,
        operation: &'static str,
        api_id: Option<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            event: "adapter_call",
            timestamp_ms: now_millis(),
            gateway_id: config.id.as_ref().map(ToString::to_string),
            gateway_name: config.name.clone(),
            gateway_type: config.gateway_type.to_string(),
            operation,
            api_id,
            outcome: "ok",
            error_kind: None,
            error_message: None,
            duration_ms: elapsed.as_millis(),
        }
    }

    /// Sets the outcome label.
    #[must_use]
    pub const fn with_outcome(mut self, outcome: &'static str) -> Self {
        self.outcome = outcome;
        self
    }

    /// Marks the event as failed with an error kind and message.
    #[must_use]
    pub fn with_error(mut self, kind: &'static str, message: String) -> Self {
        self.outcome = "error";
        self.error_kind = Some(kind);
        self.error_message = Some(message);
        self
    }
}

/// Credential protection audit event.
#[derive(Debug, Clone, Serialize)]
pub struct CredentialAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Action label (`encryption_enabled`, `encryption_disabled`, `plaintext_stored`).
    pub action: &'static str,
    /// Gateway the action applies to, when any.
    pub gateway_name: Option<String>,
    /// Affected field names.
    pub fields: Vec<String>,
    /// Operator-facing detail.
    pub detail: Option<String>,
}

impl CredentialAuditEvent {
    /// Builds a credential event.
    #[must_use]
    pub fn new(action: &'static str) -> Self {
        Self {
            event: "credential_protection",
            timestamp_ms: now_millis(),
            action,
            gateway_name: None,
            fields: Vec::new(),
            detail: None,
        }
    }

    /// Records that sensitive fields of a gateway were stored readable.
    #[must_use]
    pub fn plaintext_stored(gateway_name: &str, fields: Vec<String>) -> Self {
        Self {
            gateway_name: Some(gateway_name.to_string()),
            fields,
            detail: Some(
                "no encryption key configured; sensitive fields stored as plaintext".to_string(),
            ),
            ..Self::new("plaintext_stored")
        }
    }
}

/// Config repository audit event.
#[derive(Debug, Clone, Serialize)]
pub struct RepositoryAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Action label (`created`, `updated`, `deleted`, `cleared`, `resealed`).
    pub action: &'static str,
    /// Gateway identifier when the action targets one record.
    pub gateway_id: Option<String>,
    /// Gateway name when known.
    pub gateway_name: Option<String>,
    /// Records affected by bulk actions.
    pub count: Option<usize>,
}

impl RepositoryAuditEvent {
    /// Builds an event targeting a single record.
    #[must_use]
    pub fn record(action: &'static str, gateway_id: &str, gateway_name: Option<&str>) -> Self {
        Self {
            event: "config_repository",
            timestamp_ms: now_millis(),
            action,
            gateway_id: Some(gateway_id.to_string()),
            gateway_name: gateway_name.map(ToString::to_string),
            count: None,
        }
    }

    /// Builds an event for a bulk action.
    #[must_use]
    pub fn bulk(action: &'static str, count: usize) -> Self {
        Self {
            event: "config_repository",
            timestamp_ms: now_millis(),
            action,
            gateway_id: None,
            gateway_name: None,
            count: Some(count),
        }
    }
}

/// Returns the current time in milliseconds since the epoch.
fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for GatewayCtrl events.
pub trait AuditSink: Send + Sync {
    /// Record an adapter audit event.
    fn record_adapter(&self, _event: &AdapterAuditEvent) {}

    /// Record a credential protection audit event.
    fn record_credential(&self, _event: &CredentialAuditEvent) {}

    /// Record a config repository audit event.
    fn record_repository(&self, _event: &RepositoryAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record_adapter(&self, event: &AdapterAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }

    fn record_credential(&self, event: &CredentialAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }

    fn record_repository(&self, event: &RepositoryAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that appends JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Serializes and appends one event.
    fn append<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl AuditSink for FileAuditSink {
    fn record_adapter(&self, event: &AdapterAuditEvent) {
        self.append(event);
    }

    fn record_credential(&self, event: &CredentialAuditEvent) {
        self.append(event);
    }

    fn record_repository(&self, event: &RepositoryAuditEvent) {
        self.append(event);
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {}

/// Audit sink that keeps events in memory as JSON values.
#[derive(Default)]
pub struct InMemoryAuditSink {
    /// Captured events in arrival order.
    events: Mutex<Vec<Value>>,
}

impl InMemoryAuditSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the captured events.
    #[must_use]
    pub fn events(&self) -> Vec<Value> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    /// Returns captured events whose `event` field equals `name`.
    #[must_use]
    pub fn events_named(&self, name: &str) -> Vec<Value> {
        self.events()
            .into_iter()
            .filter(|event| event.get("event").and_then(Value::as_str) == Some(name))
            .collect()
    }

    /// Serializes and stores one event.
    fn push<T: Serialize>(&self, event: &T) {
        if let Ok(value) = serde_json::to_value(event)
            && let Ok(mut events) = self.events.lock()
        {
            events.push(value);
        }
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record_adapter(&self, event: &AdapterAuditEvent) {
        self.push(event);
    }

    fn record_credential(&self, event: &CredentialAuditEvent) {
        self.push(event);
    }

    fn record_repository(&self, event: &RepositoryAuditEvent) {
        self.push(event);
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use super::*;

    #[test]
    fn adapter_event_serializes_error_fields() {
        let config = GatewayConfig::new("Kong-Dev", "kong", "http://localhost:8001")
            .with_credential("apiKey", "abc123");
        let api_id = Some("svc".to_string());
        let event = AdapterAuditEvent::new(&config, "delete_api", api_id, Duration::from_millis(5))
            .with_error("not_found", "not found: svc".to_string());
        let sink = InMemoryAuditSink::new();
        sink.record_adapter(&event);
        let events = sink.events_named("adapter_call");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["outcome"], "error");
        assert_eq!(events[0]["error_kind"], "not_found");
        assert!(!events[0].to_string().contains("abc123"));
    }

    #[test]
    fn file_sink_appends_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.log");
        let sink = FileAuditSink::new(&path).unwrap();
        sink.record_repository(&RepositoryAuditEvent::record("created", "id-1", Some("kong")));
        sink.record_credential(&CredentialAuditEvent::new("encryption_disabled"));
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"], "config_repository");
    }
}
