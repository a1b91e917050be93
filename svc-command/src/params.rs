//! Parameter store
//!
//! Ordered, case-sensitive key/value storage for command configuration.
//! Pure storage: validation lives in [`crate::validation`].

use serde_json::{Map, Value};

/// Reserved key holding the pending request headers as a nested object
pub const HEADERS_KEY: &str = "headers";

/// Ordered key/value bag owned by a single command.
///
/// Iteration yields entries in insertion order; overwriting a key keeps its
/// original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterStore {
    entries: Map<String, Value>,
}

impl ParameterStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Get a string value
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    /// Set a value, replacing any existing one in place
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Check whether a key is present
    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove a value, preserving the order of the remaining entries
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    /// Iterate over entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The pending header object, if one is stored
    pub fn header_store(&self) -> Option<&Map<String, Value>> {
        self.entries.get(HEADERS_KEY).and_then(Value::as_object)
    }

    /// Make sure the header entry holds an object.
    ///
    /// A non-object value under the reserved key is replaced in place.
    pub(crate) fn ensure_header_store(&mut self) {
        match self.entries.get(HEADERS_KEY) {
            Some(Value::Object(_)) => return,
            Some(other) => tracing::warn!(
                found = %other,
                "Replacing non-object '{}' parameter with an empty header store",
                HEADERS_KEY
            ),
            None => {}
        }
        let store = Value::Object(Map::new());
        self.entries.insert(HEADERS_KEY.to_string(), store);
    }

    /// Set a pending request header
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.ensure_header_store();
        if let Some(Value::Object(headers)) = self.entries.get_mut(HEADERS_KEY) {
            headers.insert(name.into(), Value::String(value.into()));
        }
    }
}

impl From<Map<String, Value>> for ParameterStore {
    fn from(entries: Map<String, Value>) -> Self {
        Self { entries }
    }
}

impl<K, V> FromIterator<(K, V)> for ParameterStore
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (key, value) in iter {
            store.set(key, value);
        }
        store
    }
}
