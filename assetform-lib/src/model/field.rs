//! Declarative field configuration

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::validation::Rule;

use super::Value;

/// Widget family of a field.
///
/// Each kind is rendered by its own [`FieldRenderer`](crate::engine::FieldRenderer)
/// registered in a [`RendererRegistry`](crate::engine::RendererRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    /// Single-line text input.
    Text,
    /// Numeric input.
    Number,
    /// Date picker.
    Date,
    /// Single-choice dropdown with static options.
    Select,
    /// Multi-choice dropdown with static options.
    MultiSelect,
    /// Radio button group.
    Radio,
    /// Single checkbox.
    Checkbox,
    /// Multi-line text input.
    Textarea,
    /// Searchable dropdown backed by a remote endpoint.
    ApiAutocomplete,
    /// Picker for uploaded/attached documents.
    DocumentSelector,
    /// Editable table of nested rows.
    CompositeTable,
}

impl FieldKind {
    /// Every field kind, in declaration order.
    pub const ALL: [FieldKind; 11] = [
        FieldKind::Text,
        FieldKind::Number,
        FieldKind::Date,
        FieldKind::Select,
        FieldKind::MultiSelect,
        FieldKind::Radio,
        FieldKind::Checkbox,
        FieldKind::Textarea,
        FieldKind::ApiAutocomplete,
        FieldKind::DocumentSelector,
        FieldKind::CompositeTable,
    ];

    /// Returns `true` for kinds whose value is a collection.
    pub fn is_multi_valued(&self) -> bool {
        matches!(self, FieldKind::MultiSelect | FieldKind::CompositeTable)
    }

    /// Returns `true` for kinds that choose from a static `options` list.
    pub fn has_static_options(&self) -> bool {
        matches!(
            self,
            FieldKind::Select | FieldKind::MultiSelect | FieldKind::Radio
        )
    }
}

/// One static choice of a select, radio or multi-select field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Stored value.
    pub value: Value,
    /// Display text.
    pub label: String,
}

impl SelectOption {
    /// Creates a new option.
    pub fn new(value: impl Into<Value>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Declares that a field's remote data is gated on another field's value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependsOn {
    /// The upstream field.
    pub field: String,
    /// Query parameter name used when the value is not appended as a path segment.
    pub param_key: String,
}

/// Visibility predicate.
///
/// The field is visible iff the referenced field's value strictly equals
/// `value`, or, when `value` is an array, is a member of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowIf {
    /// The field whose value is tested.
    pub field: String,
    /// Expected scalar, or set of accepted scalars.
    pub value: Value,
}

impl ShowIf {
    /// Tests the predicate against the referenced field's current value.
    pub fn matches(&self, current: &Value) -> bool {
        match &self.value {
            Value::Array(accepted) => accepted.iter().any(|v| v.strict_eq(current)),
            expected => expected.strict_eq(current),
        }
    }
}

fn default_label_key() -> String {
    "name".to_string()
}

fn default_value_key() -> String {
    "id".to_string()
}

/// Parameters for resolving options from a remote endpoint.
///
/// These keys sit directly on the field in JSON (`apiUrl`, `labelKey`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSource {
    /// Base endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// Explicit cache key, used verbatim for shared option sets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_key_parts: Option<Vec<String>>,
    /// Entity key holding the display label.
    #[serde(default = "default_label_key")]
    pub label_key: String,
    /// Entity key holding the stored value.
    #[serde(default = "default_value_key")]
    pub value_key: String,
    /// Dot-separated path to the item array in the response body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_path: Option<String>,
    /// Only entities whose `category` equals this are kept.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_category: Option<String>,
    /// Extra query parameters. Null and empty-string values are skipped.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_params: BTreeMap<String, Value>,
}

impl Default for RemoteSource {
    fn default() -> Self {
        Self {
            api_url: None,
            query_key_parts: None,
            label_key: default_label_key(),
            value_key: default_value_key(),
            data_path: None,
            filter_category: None,
            additional_params: BTreeMap::new(),
        }
    }
}

/// One form field's declaration.
///
/// # Example
///
/// ```
/// use assetform_lib::model::{FieldKind, FieldSpec};
///
/// let location = FieldSpec::new("locationId", FieldKind::ApiAutocomplete)
///     .label("Location")
///     .required()
///     .api_url("/locations/campus/")
///     .depends_on("campusId", "campusId");
/// assert!(location.is_remote());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    /// Unique key within the form.
    pub name: String,
    /// Display label.
    #[serde(default)]
    pub label: String,
    /// Placeholder text.
    #[serde(default)]
    pub placeholder: String,
    /// Widget family.
    pub kind: FieldKind,
    /// Whether a non-blank value is required while the field is visible.
    #[serde(default)]
    pub required: bool,
    /// Static choices.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    /// Remote data dependency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<DependsOn>,
    /// Visibility predicate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_if: Option<ShowIf>,
    /// Named validation rules, run in order after the required check.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation: Vec<Rule>,
    /// Remote resolution parameters.
    #[serde(flatten)]
    pub remote: RemoteSource,
}

impl FieldSpec {
    /// Creates a field with the given name and kind.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: String::new(),
            placeholder: String::new(),
            kind,
            required: false,
            options: Vec::new(),
            depends_on: None,
            show_if: None,
            validation: Vec::new(),
            remote: RemoteSource::default(),
        }
    }

    /// Sets the label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the placeholder.
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Marks the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the static options.
    pub fn options(mut self, options: impl IntoIterator<Item = SelectOption>) -> Self {
        self.options = options.into_iter().collect();
        self
    }

    /// Declares a remote dependency on another field.
    pub fn depends_on(mut self, field: impl Into<String>, param_key: impl Into<String>) -> Self {
        self.depends_on = Some(DependsOn {
            field: field.into(),
            param_key: param_key.into(),
        });
        self
    }

    /// Declares a visibility predicate.
    pub fn show_if(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.show_if = Some(ShowIf {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Appends a validation rule.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.validation.push(rule);
        self
    }

    /// Sets the remote endpoint.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.remote.api_url = Some(url.into());
        self
    }

    /// Sets an explicit cache key.
    pub fn query_key(mut self, parts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.remote.query_key_parts = Some(parts.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the label and value keys used to project entities into choices.
    pub fn keys(mut self, label_key: impl Into<String>, value_key: impl Into<String>) -> Self {
        self.remote.label_key = label_key.into();
        self.remote.value_key = value_key.into();
        self
    }

    /// Sets the dot-separated response path to the item array.
    pub fn data_path(mut self, path: impl Into<String>) -> Self {
        self.remote.data_path = Some(path.into());
        self
    }

    /// Sets the category filter.
    pub fn filter_category(mut self, category: impl Into<String>) -> Self {
        self.remote.filter_category = Some(category.into());
        self
    }

    /// Adds an extra query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.remote.additional_params.insert(key.into(), value.into());
        self
    }

    /// Returns `true` if options come from a remote endpoint.
    pub fn is_remote(&self) -> bool {
        self.remote.api_url.is_some()
    }

    /// Returns the label, falling back to the name.
    pub fn display_name(&self) -> &str {
        if self.label.is_empty() {
            &self.name
        } else {
            &self.label
        }
    }

    /// The empty value stored when this field is cleared.
    pub fn empty_value(&self) -> Value {
        if self.kind.is_multi_valued() {
            Value::Array(Vec::new())
        } else {
            Value::Null
        }
    }
}
