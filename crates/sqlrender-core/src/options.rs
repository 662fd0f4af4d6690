//! Plugin option resolution
//!
//! The plugin configuration blob is read two ways: a typed [`Options`] the
//! generator itself consumes, and a free-form [`PluginOptions`] mapping that
//! templates query through `GetPluginOption`.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Typed view of the plugin configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Name of the generated file
    #[serde(deserialize_with = "null_as_empty")]
    pub filename: String,

    /// Output directory; passed through for the caller, unused here
    #[serde(deserialize_with = "null_as_empty")]
    pub out: String,
}

/// `null` leaves a string field at its zero value
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Free-form view of the plugin configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginOptions(BTreeMap<String, serde_json::Value>);

impl PluginOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an option by key
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.0.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: serde_json::Value) -> &mut Self {
        self.0.insert(name.into(), value);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

}

impl From<BTreeMap<String, serde_json::Value>> for PluginOptions {
    fn from(map: BTreeMap<String, serde_json::Value>) -> Self {
        Self(map)
    }
}

/// How a malformed free-form configuration is handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionsPolicy {
    /// Malformed configuration aborts the generation call
    #[default]
    Strict,

    /// Malformed configuration degrades to an empty mapping
    Lenient,
}

/// Both views of one configuration blob
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedOptions {
    pub options: Options,
    pub plugin_options: PluginOptions,
}

/// Option resolution errors
#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("failed to unmarshal plugin options: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("failed to unmarshal plugin options: expected a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// Resolve raw plugin configuration bytes
///
/// Empty input (or JSON `null`) yields zero values. A typed decode failure
/// always falls back to `Options::default()`. A free-form decode failure is an
/// error under [`OptionsPolicy::Strict`] and an empty mapping otherwise.
pub fn resolve_options(raw: &[u8], policy: OptionsPolicy) -> Result<ResolvedOptions, OptionsError> {
    if raw.is_empty() {
        return Ok(ResolvedOptions::default());
    }

    let value = match serde_json::from_slice::<serde_json::Value>(raw) {
        Ok(value) => value,
        Err(e) => return degrade(OptionsError::Malformed(e), policy, Options::default()),
    };

    let options = decode_typed(&value);

    match decode_free_form(value) {
        Ok(plugin_options) => Ok(ResolvedOptions { options, plugin_options }),
        Err(e) => degrade(e, policy, options),
    }
}

fn degrade(
    error: OptionsError,
    policy: OptionsPolicy,
    options: Options,
) -> Result<ResolvedOptions, OptionsError> {
    match policy {
        OptionsPolicy::Strict => Err(error),
        OptionsPolicy::Lenient => {
            tracing::warn!(error = %error, "ignoring malformed plugin options");
            Ok(ResolvedOptions {
                options,
                plugin_options: PluginOptions::default(),
            })
        }
    }
}

fn decode_typed(value: &serde_json::Value) -> Options {
    if !value.is_object() {
        return Options::default();
    }

    Options::deserialize(value).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "plugin options do not match the expected shape, using defaults");
        Options::default()
    })
}

fn decode_free_form(value: serde_json::Value) -> Result<PluginOptions, OptionsError> {
    match value {
        serde_json::Value::Null => Ok(PluginOptions::default()),
        serde_json::Value::Object(map) => Ok(PluginOptions(map.into_iter().collect())),
        serde_json::Value::Array(_) => Err(OptionsError::NotAnObject("an array")),
        serde_json::Value::String(_) => Err(OptionsError::NotAnObject("a string")),
        serde_json::Value::Number(_) => Err(OptionsError::NotAnObject("a number")),
        serde_json::Value::Bool(_) => Err(OptionsError::NotAnObject("a boolean")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_input_yields_defaults() {
        let resolved = resolve_options(b"", OptionsPolicy::Strict).unwrap();
        assert_eq!(resolved.options.filename, "");
        assert_eq!(resolved.options.out, "");
        assert!(resolved.plugin_options.is_empty());
    }

    #[test]
    fn object_populates_both_views() {
        let raw = br#"{"filename": "queries.rs", "out": "src/db", "package": "db", "emit_json": true}"#;
        let resolved = resolve_options(raw, OptionsPolicy::Strict).unwrap();

        assert_eq!(resolved.options.filename, "queries.rs");
        assert_eq!(resolved.options.out, "src/db");
        assert_eq!(resolved.plugin_options.len(), 4);
        assert_eq!(resolved.plugin_options.get("package"), Some(&json!("db")));
        assert_eq!(resolved.plugin_options.get("emit_json"), Some(&json!(true)));
        assert_eq!(resolved.plugin_options.get("missing"), None);
    }

    #[test]
    fn typed_mismatch_degrades_to_defaults() {
        // filename has the wrong type; the free-form view still decodes
        let raw = br#"{"filename": 42, "package": "db"}"#;
        let resolved = resolve_options(raw, OptionsPolicy::Strict).unwrap();

        assert_eq!(resolved.options, Options::default());
        assert_eq!(resolved.plugin_options.get("filename"), Some(&json!(42)));
    }

    #[test]
    fn null_field_keeps_the_others() {
        let raw = br#"{"filename":"out.txt","out":null}"#;
        let resolved = resolve_options(raw, OptionsPolicy::Strict).unwrap();

        assert_eq!(resolved.options.filename, "out.txt");
        assert_eq!(resolved.options.out, "");
        assert_eq!(resolved.plugin_options.get("out"), Some(&serde_json::Value::Null));
    }

    #[test]
    fn malformed_is_fatal_under_strict_policy() {
        let err = resolve_options(b"not json", OptionsPolicy::Strict).unwrap_err();
        assert!(matches!(err, OptionsError::Malformed(_)));

        let err = resolve_options(b"[1, 2]", OptionsPolicy::Strict).unwrap_err();
        assert!(matches!(err, OptionsError::NotAnObject("an array")));
        assert!(err.to_string().contains("expected a JSON object"));
    }

    #[test]
    fn malformed_degrades_under_lenient_policy() {
        let resolved = resolve_options(b"[1, 2]", OptionsPolicy::Lenient).unwrap();
        assert_eq!(resolved.options, Options::default());
        assert!(resolved.plugin_options.is_empty());
    }

    #[test]
    fn null_is_treated_as_empty() {
        let resolved = resolve_options(b"null", OptionsPolicy::Strict).unwrap();
        assert_eq!(resolved, ResolvedOptions::default());
    }

    #[test]
    fn policy_parses_lowercase() {
        let policy: OptionsPolicy = serde_json::from_str(r#""lenient""#).unwrap();
        assert_eq!(policy, OptionsPolicy::Lenient);
        assert_eq!(OptionsPolicy::default(), OptionsPolicy::Strict);
    }
}
