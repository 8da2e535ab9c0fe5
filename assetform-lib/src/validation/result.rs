use serde::Serialize;

/// The check a [`FieldError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Required,
    Rule,
    /// Comparison against another field's value.
    CrossField,
}

/// One failed check on one field. Only the first failing check per field is
/// reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field_name: String,
    /// Message shown to the user.
    pub message: String,
    pub kind: ErrorKind,
}

impl FieldError {
    pub fn new(field_name: impl Into<String>, message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            field_name: field_name.into(),
            message: message.into(),
            kind,
        }
    }

    pub fn required(field_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field_name, message, ErrorKind::Required)
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field_name, self.message)
    }
}

/// Outcome of validating a group of fields, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ValidationResult {
    #[default]
    Valid,
    /// Never holds an empty list.
    Invalid(Vec<FieldError>),
}

impl ValidationResult {
    pub fn from_errors(errors: Vec<FieldError>) -> Self {
        errors.into_iter().collect()
    }

    pub fn is_valid(&self) -> bool {
        *self == Self::Valid
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    pub fn errors(&self) -> &[FieldError] {
        if let Self::Invalid(errors) = self {
            errors
        } else {
            &[]
        }
    }

    pub fn first_error(&self) -> Option<&FieldError> {
        self.errors().first()
    }

    pub fn error_for(&self, field: &str) -> Option<&FieldError> {
        self.errors().iter().find(|e| e.field_name == field)
    }
}

impl FromIterator<FieldError> for ValidationResult {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        let errors: Vec<FieldError> = iter.into_iter().collect();
        if errors.is_empty() {
            Self::Valid
        } else {
            Self::Invalid(errors)
        }
    }
}
