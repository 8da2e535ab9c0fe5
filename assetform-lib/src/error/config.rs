//! Configuration error types

/// Errors raised while constructing a field set, form or stepper.
///
/// These indicate a defect in the field definitions and are never recoverable
/// at runtime. They surface at construction time so tests catch them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A field was declared with an empty name.
    #[error("Field at position {index} has an empty name")]
    EmptyName { index: usize },

    /// Two fields share the same name.
    #[error("Duplicate field name '{name}'")]
    DuplicateName { name: String },

    /// A field references a name that does not exist in the field set.
    #[error("Field '{field}' references unknown field '{reference}' via {via}")]
    UnknownReference {
        field: String,
        reference: String,
        via: &'static str,
    },

    /// A field references itself.
    #[error("Field '{field}' references itself via {via}")]
    SelfReference { field: String, via: &'static str },

    /// The dependency graph contains a cycle.
    #[error("Dependency cycle: {}", path.join(" -> "))]
    Cycle { path: Vec<String> },

    /// A remote-backed field has no API URL.
    #[error("Field '{field}' is remote-backed but has no apiUrl")]
    MissingApiUrl { field: String },

    /// A `pattern` rule could not be compiled.
    #[error("Field '{field}' has invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        field: String,
        pattern: String,
        message: String,
    },

    /// A `custom` rule names a validator that is not registered.
    #[error("Field '{field}' uses unregistered validator '{name}'")]
    UnknownValidator { field: String, name: String },

    /// A step lists a field that is not part of the form.
    #[error("Step '{step}' lists unknown field '{field}'")]
    UnknownStepField { step: String, field: String },

    /// A field is listed by more than one step.
    #[error("Field '{field}' appears in more than one step")]
    FieldInMultipleSteps { field: String },

    /// A stepper was built without any steps.
    #[error("Stepper requires at least one step")]
    EmptySteps,

    /// The field definitions could not be parsed.
    #[error("Field definition parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
