//! Per-form mutable state.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use uuid::Uuid;

use crate::model::Value;
use crate::model::ValueMap;
use crate::validation::FieldError;

/// Unique identifier for a form instance.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FormId(Uuid);

impl FormId {
    /// Create a new unique form ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for FormId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for FormId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Values, touched set and errors of one form instance.
///
/// Owned by exactly one [`Form`](super::Form); two open forms built from the
/// same fields never share state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    /// Current value per field.
    pub values: ValueMap,
    /// Fields blurred at least once.
    pub touched: BTreeSet<String>,
    /// Current error per field. Absent means valid.
    pub errors: BTreeMap<String, FieldError>,
}

impl FormState {
    /// State seeded with initial values.
    pub fn with_values(values: ValueMap) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    /// Current value of a field, `Null` if unset.
    pub fn value(&self, name: &str) -> &Value {
        self.values.get(name).unwrap_or(&Value::Null)
    }

    /// Stores or clears the error for a field.
    pub fn set_error(&mut self, name: &str, error: Option<FieldError>) {
        match error {
            Some(error) => {
                self.errors.insert(name.to_string(), error);
            }
            None => {
                self.errors.remove(name);
            }
        }
    }
}

/// Display status of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStatus {
    /// Not yet blurred or validated.
    Pristine,
    /// Validated without error.
    Valid,
    /// Validated with an error.
    Invalid,
}

impl FieldStatus {
    /// Returns `true` if the field carries an error.
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid)
    }
}
