//! Validated field collections

use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use crate::dependency::check_graph;
use crate::error::ConfigError;

use super::FieldKind;
use super::FieldSpec;

/// An ordered, construction-checked set of fields.
///
/// Construction rejects empty or duplicate names, references to unknown
/// fields, self references, dependency cycles, invalid patterns and
/// autocomplete fields without an endpoint. Specs are never mutated after
/// construction.
///
/// # Example
///
/// ```
/// use assetform_lib::model::{FieldKind, FieldSet, FieldSpec};
///
/// let fields = FieldSet::new(vec![
///     FieldSpec::new("campusId", FieldKind::Select),
///     FieldSpec::new("locationId", FieldKind::ApiAutocomplete)
///         .api_url("/locations/campus/")
///         .depends_on("campusId", "campusId"),
/// ])
/// .unwrap();
/// assert_eq!(fields.len(), 2);
///
/// let broken = FieldSet::new(vec![
///     FieldSpec::new("locationId", FieldKind::ApiAutocomplete)
///         .api_url("/locations/campus/")
///         .depends_on("campusId", "campusId"),
/// ]);
/// assert!(broken.is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSet {
    fields: Vec<FieldSpec>,
    index: HashMap<String, usize>,
}

impl FieldSet {
    /// Validates and wraps a list of fields.
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self, ConfigError> {
        check_graph(&fields)?;

        for spec in &fields {
            if spec.kind == FieldKind::ApiAutocomplete && !spec.is_remote() {
                return Err(ConfigError::MissingApiUrl {
                    field: spec.name.clone(),
                });
            }
            for rule in &spec.validation {
                rule.check_config(&spec.name)?;
            }
        }

        let index = fields
            .iter()
            .enumerate()
            .map(|(i, spec)| (spec.name.clone(), i))
            .collect();

        Ok(Self { fields, index })
    }

    /// Parses a JSON array of fields and validates it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let fields: Vec<FieldSpec> = serde_json::from_str(json)?;
        Self::new(fields)
    }

    /// Looks up a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    /// Returns `true` if a field with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Iterates over fields in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldSpec> {
        self.fields.iter()
    }

    /// Field names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if there are no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `(dependent, upstream)` pairs for every `dependsOn` declaration.
    pub fn dependency_edges(&self) -> Vec<(&str, &str)> {
        self.fields
            .iter()
            .filter_map(|f| {
                f.depends_on
                    .as_ref()
                    .map(|d| (f.name.as_str(), d.field.as_str()))
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a FieldSet {
    type Item = &'a FieldSpec;
    type IntoIter = std::slice::Iter<'a, FieldSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// One page of a multi-step form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSpec {
    /// Step heading.
    pub title: String,
    /// Names of the fields shown on this step.
    pub fields: Vec<String>,
}

impl StepSpec {
    /// Creates a step.
    pub fn new(title: impl Into<String>, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            title: title.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// A form definition as authored in JSON.
///
/// Accepts either a bare field array or an object with `fields` and
/// optional `steps`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum RawDefinition {
    Fields(Vec<FieldSpec>),
    Full {
        fields: Vec<FieldSpec>,
        #[serde(default)]
        steps: Vec<StepSpec>,
    },
}

/// A parsed and validated form definition.
#[derive(Debug, Clone, PartialEq)]
pub struct FormDefinition {
    /// The fields.
    pub fields: FieldSet,
    /// Steps, empty for single-page forms.
    pub steps: Vec<StepSpec>,
}

impl FormDefinition {
    /// Parses and validates a definition.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawDefinition = serde_json::from_str(json)?;
        let (fields, steps) = match raw {
            RawDefinition::Fields(fields) => (fields, Vec::new()),
            RawDefinition::Full { fields, steps } => (fields, steps),
        };
        Ok(Self {
            fields: FieldSet::new(fields)?,
            steps,
        })
    }

    /// Returns `true` if the definition declares steps.
    pub fn is_multi_step(&self) -> bool {
        !self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Rule;

    #[test]
    fn test_missing_api_url() {
        let result = FieldSet::new(vec![FieldSpec::new("loc", FieldKind::ApiAutocomplete)]);
        assert_eq!(
            result,
            Err(ConfigError::MissingApiUrl {
                field: "loc".into()
            })
        );
    }

    #[test]
    fn test_invalid_pattern_fails_at_load() {
        let result = FieldSet::new(vec![
            FieldSpec::new("code", FieldKind::Text).rule(Rule::pattern("[", "bad")),
        ]);
        assert!(matches!(result, Err(ConfigError::InvalidPattern { .. })));
    }

    #[test]
    fn test_from_json_parse_error() {
        let result = FieldSet::from_json(r#"[{"name": "a", "kind": "slider"}]"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_definition_accepts_both_shapes() {
        let bare = FormDefinition::from_json(r#"[{"name": "a", "kind": "text"}]"#).unwrap();
        assert!(!bare.is_multi_step());

        let full = FormDefinition::from_json(
            r#"{
                "fields": [{"name": "a", "kind": "text"}, {"name": "b", "kind": "number"}],
                "steps": [{"title": "One", "fields": ["a"]}, {"title": "Two", "fields": ["b"]}]
            }"#,
        )
        .unwrap();
        assert!(full.is_multi_step());
        assert_eq!(full.steps[1].fields, vec!["b".to_string()]);
    }

    #[test]
    fn test_dependency_edges() {
        let set = FieldSet::new(vec![
            FieldSpec::new("campusId", FieldKind::Select),
            FieldSpec::new("locationId", FieldKind::ApiAutocomplete)
                .api_url("/locations/campus/")
                .depends_on("campusId", "campusId"),
        ])
        .unwrap();
        assert_eq!(set.dependency_edges(), vec![("locationId", "campusId")]);
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["campusId", "locationId"]);
    }
}
