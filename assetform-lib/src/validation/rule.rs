//! Serializable validator references.

use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigError;
use crate::model::Value;

/// A named validation rule attached to a field.
///
/// Rules are data, so field definitions stay serializable. They are compiled
/// into closures by [`RuleSet::compile`](super::RuleSet::compile). Every rule
/// except [`Rule::RequiredIf`] passes on a blank value; use `required` on the
/// field for presence checks.
///
/// In JSON a rule is tagged by `rule`:
///
/// ```json
/// {"rule": "minLength", "min": 3}
/// {"rule": "notBeforeField", "field": "validFrom", "message": "Must end after it starts"}
/// {"rule": "custom", "name": "assetTag"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Rule {
    /// Minimum length in characters (strings) or items (arrays).
    MinLength {
        min: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Maximum length in characters (strings) or items (arrays).
    MaxLength {
        max: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// The string must match a regular expression.
    Pattern {
        pattern: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// The string must be a valid email address.
    Email {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// The number must lie within `[min, max]`.
    Range {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// The date must not be later than today.
    NotInFuture {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// The date must not be earlier than today.
    NotInPast {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// The date must not be earlier than another field's date.
    NotBeforeField {
        field: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// The date must not be later than another field's date.
    NotAfterField {
        field: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// The value must strictly equal another field's value.
    MatchesField {
        field: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// The value is required while another field holds `value`
    /// (or, when `value` is an array, one of its members).
    RequiredIf {
        field: String,
        value: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// A validator registered by name in a
    /// [`ValidatorRegistry`](super::ValidatorRegistry).
    Custom { name: String },
}

impl Rule {
    /// `minLength` with the default message.
    pub fn min_length(min: usize) -> Self {
        Self::MinLength { min, message: None }
    }

    /// `maxLength` with the default message.
    pub fn max_length(max: usize) -> Self {
        Self::MaxLength { max, message: None }
    }

    /// `pattern` with a message.
    pub fn pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            message: Some(message.into()),
        }
    }

    /// `email` with the default message.
    pub fn email() -> Self {
        Self::Email { message: None }
    }

    /// `range` with the default message.
    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        Self::Range {
            min,
            max,
            message: None,
        }
    }

    /// `notInFuture` with the default message.
    pub fn not_in_future() -> Self {
        Self::NotInFuture { message: None }
    }

    /// `notInPast` with the default message.
    pub fn not_in_past() -> Self {
        Self::NotInPast { message: None }
    }

    /// `notBeforeField` with the default message.
    pub fn not_before_field(field: impl Into<String>) -> Self {
        Self::NotBeforeField {
            field: field.into(),
            message: None,
        }
    }

    /// `notAfterField` with the default message.
    pub fn not_after_field(field: impl Into<String>) -> Self {
        Self::NotAfterField {
            field: field.into(),
            message: None,
        }
    }

    /// `matchesField` with the default message.
    pub fn matches_field(field: impl Into<String>) -> Self {
        Self::MatchesField {
            field: field.into(),
            message: None,
        }
    }

    /// `requiredIf` with the default message.
    pub fn required_if(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::RequiredIf {
            field: field.into(),
            value: value.into(),
            message: None,
        }
    }

    /// `custom` reference.
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom { name: name.into() }
    }

    /// Replaces the rule's message. No-op for `custom`.
    pub fn with_message(mut self, msg: impl Into<String>) -> Self {
        let msg = Some(msg.into());
        match &mut self {
            Self::MinLength { message, .. }
            | Self::MaxLength { message, .. }
            | Self::Pattern { message, .. }
            | Self::Email { message }
            | Self::Range { message, .. }
            | Self::NotInFuture { message }
            | Self::NotInPast { message }
            | Self::NotBeforeField { message, .. }
            | Self::NotAfterField { message, .. }
            | Self::MatchesField { message, .. }
            | Self::RequiredIf { message, .. } => *message = msg,
            Self::Custom { .. } => {}
        }
        self
    }

    /// The other field this rule reads, if any.
    pub fn field_reference(&self) -> Option<&str> {
        match self {
            Self::NotBeforeField { field, .. }
            | Self::NotAfterField { field, .. }
            | Self::MatchesField { field, .. }
            | Self::RequiredIf { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Checks the parts of the rule that can be checked without a registry.
    pub(crate) fn check_config(&self, field: &str) -> Result<(), ConfigError> {
        if let Self::Pattern { pattern, .. } = self {
            regex::Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                field: field.to_string(),
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_tagged() {
        let rules: Vec<Rule> = serde_json::from_str(
            r#"[
                {"rule": "minLength", "min": 3},
                {"rule": "notBeforeField", "field": "validFrom", "message": "Too early"},
                {"rule": "requiredIf", "field": "status", "value": ["retired", "lost"]},
                {"rule": "custom", "name": "assetTag"}
            ]"#,
        )
        .unwrap();
        assert_eq!(rules[0], Rule::min_length(3));
        assert_eq!(
            rules[1],
            Rule::not_before_field("validFrom").with_message("Too early")
        );
        assert_eq!(rules[2].field_reference(), Some("status"));
        assert_eq!(rules[3], Rule::custom("assetTag"));
    }

    #[test]
    fn test_check_config_rejects_bad_pattern() {
        let rule = Rule::pattern("([a-z", "bad");
        assert!(matches!(
            rule.check_config("code"),
            Err(ConfigError::InvalidPattern { .. })
        ));
        assert!(Rule::pattern("^[A-Z]{2}-\\d+$", "ok").check_config("code").is_ok());
    }
}
