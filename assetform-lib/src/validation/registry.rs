//! Registry of named custom validators.

use std::collections::HashMap;
use std::sync::Arc;

use crate::model::Value;
use crate::model::ValueMap;

use super::Clock;

/// A custom validator: returns an error message, or `None` when valid.
///
/// Validators are pure: they see the field's value, every form value, and the
/// injected clock, and nothing else.
pub type CustomValidator = Arc<dyn Fn(&Value, &ValueMap, &dyn Clock) -> Option<String> + Send + Sync>;

/// Lookup table for `{"rule": "custom", "name": ...}` references.
///
/// # Example
///
/// ```
/// use assetform_lib::validation::ValidatorRegistry;
///
/// let registry = ValidatorRegistry::new().with("assetTag", |value, _, _| {
///     match value.as_str() {
///         Some(tag) if !tag.starts_with("AT-") => Some("Asset tags start with AT-".into()),
///         _ => None,
///     }
/// });
/// assert!(registry.contains("assetTag"));
/// ```
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    validators: HashMap<String, CustomValidator>,
}

impl ValidatorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a validator under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&Value, &ValueMap, &dyn Clock) -> Option<String> + Send + Sync + 'static,
    {
        self.validators.insert(name.into(), Arc::new(f));
    }

    /// Registers a validator, returning `self` for chaining.
    pub fn with<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value, &ValueMap, &dyn Clock) -> Option<String> + Send + Sync + 'static,
    {
        self.register(name, f);
        self
    }

    /// Looks up a validator.
    pub fn get(&self, name: &str) -> Option<CustomValidator> {
        self.validators.get(name).cloned()
    }

    /// Returns `true` if a validator is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.validators.keys().collect();
        names.sort();
        f.debug_struct("ValidatorRegistry")
            .field("validators", &names)
            .finish()
    }
}
