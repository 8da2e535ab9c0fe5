//! Entities returned by option endpoints

use serde::Deserialize;
use serde::Serialize;

use super::Value;

/// A single record returned by a remote option endpoint.
///
/// Entities are arbitrary JSON objects. The field configuration decides which
/// keys carry the option label, the option value, and the category.
///
/// # Example
///
/// ```
/// use assetform_lib::model::{Entity, Value};
///
/// let entity = Entity::from_json(serde_json::json!({"id": 7, "name": "North Campus"})).unwrap();
/// assert_eq!(entity.value_of("id"), Value::from(7i64));
/// assert_eq!(entity.label_of("name"), "North Campus");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity(serde_json::Map<String, serde_json::Value>);

impl Entity {
    /// Creates an empty entity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a JSON value, returning `None` unless it is an object.
    pub fn from_json(json: serde_json::Value) -> Option<Self> {
        match json {
            serde_json::Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Sets a key, returning `self` for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns the raw JSON at `key`.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    /// Returns the value at `key` as a form [`Value`], or `Null` when missing.
    pub fn value_of(&self, key: &str) -> Value {
        self.0.get(key).map(Value::from).unwrap_or(Value::Null)
    }

    /// Returns the display label at `key`.
    ///
    /// Strings are returned as-is, other scalars are stringified, and a
    /// missing key yields an empty label.
    pub fn label_of(&self, key: &str) -> String {
        match self.0.get(key) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Null) | None => String::new(),
            Some(other) => Value::from(other).to_param(),
        }
    }

    /// Returns `true` if the entity's `category` field equals `category`.
    pub fn in_category(&self, category: &str) -> bool {
        matches!(self.0.get("category"), Some(serde_json::Value::String(c)) if c == category)
    }

    /// Returns the underlying JSON object.
    pub fn as_map(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.0
    }

    /// Consumes the entity, returning the underlying JSON object.
    pub fn into_json(self) -> serde_json::Value {
        serde_json::Value::Object(self.0)
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Entity {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_json_rejects_non_objects() {
        assert!(Entity::from_json(json!([1, 2])).is_none());
        assert!(Entity::from_json(json!("x")).is_none());
        assert!(Entity::from_json(json!({})).is_some());
    }

    #[test]
    fn test_label_of_stringifies_scalars() {
        let entity = Entity::new().with("code", 12).with("name", "Dock");
        assert_eq!(entity.label_of("code"), "12");
        assert_eq!(entity.label_of("name"), "Dock");
        assert_eq!(entity.label_of("missing"), "");
    }

    #[test]
    fn test_in_category_exact_match() {
        let entity = Entity::new().with("category", "Laptop");
        assert!(entity.in_category("Laptop"));
        assert!(!entity.in_category("laptop"));
        assert!(!Entity::new().in_category("Laptop"));
    }
}
