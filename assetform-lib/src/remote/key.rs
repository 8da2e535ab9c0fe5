//! Cache keys for remote option sets.

use serde::Serialize;

use crate::model::FieldSpec;
use crate::model::Value;
use crate::model::ValueMap;

/// A deterministic, order-stable identifier for one remote option set.
///
/// Keys partition fetched results by the inputs that produced them, so a
/// response for a superseded upstream value lands under a key nobody reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CacheKey(Vec<String>);

impl CacheKey {
    /// Creates a key from its parts.
    pub fn new(parts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(parts.into_iter().map(Into::into).collect())
    }

    /// The key's parts, in order.
    pub fn parts(&self) -> &[String] {
        &self.0
    }

    /// The first part, which is the field name for derived keys.
    pub fn field(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// Builds the cache key for a remote field.
///
/// An explicit `queryKeyParts` is used verbatim. Otherwise the key is
/// `[name, upstream value (if present), key=value for each non-empty
/// additional parameter]`. Parameters carry their name so two different
/// parameter sets never produce the same key.
pub fn build_cache_key(spec: &FieldSpec, values: &ValueMap) -> CacheKey {
    if let Some(parts) = &spec.remote.query_key_parts {
        return CacheKey::new(parts.iter().cloned());
    }

    let mut parts = vec![spec.name.clone()];

    if let Some(dep) = &spec.depends_on
        && let Some(value) = values.get(&dep.field).filter(|v| !v.is_blank())
    {
        parts.push(value.to_param());
    }

    parts.extend(
        spec.remote
            .additional_params
            .iter()
            .filter(|(_, v)| is_present_param(v))
            .map(|(k, v)| format!("{}={}", k, v.to_param())),
    );

    CacheKey(parts)
}

/// Parameters with a null or empty-string value are skipped.
pub(crate) fn is_present_param(value: &Value) -> bool {
    !value.is_null() && !value.to_param().is_empty()
}
