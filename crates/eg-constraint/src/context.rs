// context.rs — The open key/value context attached to every operation.
//
// Callers describe an operation with arbitrary facts ("is_external",
// "user_authorized", "path", ...). Constraint predicates read these facts
// through typed accessors that treat missing keys as defined defaults —
// an absent flag is false, an absent string is None. Predicates must never
// need to error on a missing key.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Arbitrary key/value facts supplied by the caller alongside an operation.
///
/// Immutable once handed to the engine; built up front via [`with`] or
/// collected from an iterator of pairs.
///
/// [`with`]: OperationContext::with
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationContext(HashMap<String, Value>);

impl OperationContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert: `OperationContext::new().with("is_external", true)`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Raw value lookup.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Read a boolean flag. Absent or non-boolean values read as `false`.
    pub fn flag(&self, key: &str) -> bool {
        self.0.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Read a string value. Absent or non-string values read as `None`.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Read a string array. Absent keys read as an empty list.
    pub fn texts(&self, key: &str) -> Vec<&str> {
        self.0
            .get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// The primary resource this operation touches, if declared.
    ///
    /// Checked in order: `resource`, `path`, `url` — the keys the drift
    /// detector's repetition check keys on.
    pub fn resource(&self) -> Option<&str> {
        self.text("resource")
            .or_else(|| self.text("path"))
            .or_else(|| self.text("url"))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for OperationContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_flag_reads_false() {
        let ctx = OperationContext::new();
        assert!(!ctx.flag("is_external"));
    }

    #[test]
    fn non_boolean_flag_reads_false() {
        let ctx = OperationContext::new().with("is_external", "yes");
        assert!(!ctx.flag("is_external"));
    }

    #[test]
    fn resource_prefers_explicit_resource_key() {
        let ctx = OperationContext::new()
            .with("path", "/data/a.json")
            .with("resource", "db://users");
        assert_eq!(ctx.resource(), Some("db://users"));
    }

    #[test]
    fn resource_falls_back_to_path_then_url() {
        let ctx = OperationContext::new().with("url", "https://example.com");
        assert_eq!(ctx.resource(), Some("https://example.com"));
    }

    #[test]
    fn context_serializes_as_flat_map() {
        let ctx = OperationContext::new()
            .with("user_authorized", true)
            .with("path", "/tmp/x");
        let json = serde_json::to_string(&ctx).unwrap();
        let restored: OperationContext = serde_json::from_str(&json).unwrap();
        assert!(restored.flag("user_authorized"));
        assert_eq!(restored.text("path"), Some("/tmp/x"));
    }
}
