// crates/gatewayctrl-cli/src/i18n.rs
// ============================================================================
// Module: CLI Message Catalog
// Description: Message catalog and substitution utilities for the CLI.
// Purpose: Centralize user-facing strings so output stays consistent.
// Dependencies: Standard library collections and formatting utilities.
// ============================================================================

//! ## Overview
//! Every line the `gatewayctrl` binary prints goes through the [`t!`](crate::t)
//! macro and this catalog.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to the key itself to avoid panics.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// One named value for a message placeholder, built by [`macro@crate::t`].
#[derive(Clone)]
pub struct MessageArg {
    /// Placeholder name without braces.
    pub key: &'static str,
    /// Rendered value.
    pub value: String,
}

impl MessageArg {
    /// Pairs a placeholder name with its rendered value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Static catalog entries.
const CATALOG_ITEMS: &[(&str, &str)] = &[
    ("main.version", "gatewayctrl {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("output.serialize_failed", "Failed to render output: {error}"),
    (
        "input.read_too_large",
        "Refusing to read {kind} at {path} because it is {size} bytes (limit {limit}).",
    ),
    ("input.read_failed", "Failed to read {kind} at {path}: {error}"),
    ("input.parse_failed", "Failed to parse {kind} at {path}: {error}"),
    ("input.kind.api_spec", "API spec"),
    ("input.kind.certificate", "certificate"),
    ("config.load_failed", "Failed to load config: {error}"),
    ("config.validate.ok", "Config valid."),
    ("setup.audit_failed", "Failed to open audit sink: {error}"),
    ("setup.credentials_failed", "Failed to initialize credential protection: {error}"),
    ("setup.store_failed", "Failed to open config store: {error}"),
    ("key.generated.note", "Export this value as {env} to enable credential encryption."),
    ("gateway.not_found", "No gateway named {name}."),
    ("gateway.unknown_type", "Unknown gateway type {vendor}; see `gatewayctrl types`."),
    ("gateway.repository_failed", "Config repository error ({kind}): {error}"),
    ("gateway.saved", "Saved gateway {name} ({id})."),
    (
        "gateway.saved.plaintext",
        "Warning: no encryption key configured; stored {fields} as plaintext. Set {env} and run \
         `gatewayctrl gateway reseal`.",
    ),
    ("gateway.deleted", "Deleted gateway {name}."),
    ("gateway.delete.absent", "No gateway named {name}; nothing to delete."),
    ("gateway.cleared", "Removed {count} gateway(s)."),
    ("gateway.clear.confirm", "Refusing to remove every gateway without --yes."),
    ("gateway.resealed", "Re-encrypted {count} gateway(s)."),
    ("gateway.list.empty", "No gateways configured."),
    ("gateway.list.row", "{name}\t{vendor}\t{url}\t{id}"),
    ("gateway.certificate.copy_failed", "Failed to store certificate in {dir}: {error}"),
    ("gateway.test.result", "{name}: {result}"),
    ("gateway.probe.row", "{name}\t{vendor}\t{outcome}\t{elapsed_ms}ms"),
    ("adapter.create_failed", "Cannot build adapter for {name} ({kind}): {error}"),
    ("adapter.call_failed", "Gateway call failed ({kind}): {error}"),
    ("api.spec.missing_name", "An API name is required (--name or a spec file)."),
    ("api.deleted", "Deleted API {id} on {name}."),
    ("types.row", "{vendor}"),
];

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Looks up `key` and fills each `{name}` placeholder from `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = messages().get(key).copied().unwrap_or(key);
    args.into_iter().fold(template.to_string(), |message, arg| {
        message.replace(&format!("{{{}}}", arg.key), &arg.value)
    })
}

/// Catalog index, built on first use.
fn messages() -> &'static HashMap<&'static str, &'static str> {
    static MESSAGES: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    MESSAGES.get_or_init(|| CATALOG_ITEMS.iter().copied().collect())
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Renders a catalog message: `t!("gateway.saved", name = n, id = id)`.
///
/// Values only need `ToString`. Unknown keys render as the key itself.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #[test]
    fn placeholders_are_substituted() {
        let message = crate::t!("gateway.saved", name = "Kong-Dev", id = "42");
        assert_eq!(message, "Saved gateway Kong-Dev (42).");
    }

    #[test]
    fn unknown_keys_fall_back_to_the_key() {
        assert_eq!(crate::t!("no.such.key"), "no.such.key");
    }
}
