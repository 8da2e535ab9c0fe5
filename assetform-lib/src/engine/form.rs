//! The form engine.

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::Arc;

use crate::dependency::FieldGate;
use crate::dependency::dependency_gate;
use crate::dependency::dependents_closure;
use crate::dependency::resolve_visible;
use crate::error::ConfigError;
use crate::model::Entity;
use crate::model::FieldSet;
use crate::model::FieldSpec;
use crate::model::Value;
use crate::model::ValueMap;
use crate::remote::OptionProvider;
use crate::remote::OptionRequest;
use crate::remote::RemoteOptionSet;
use crate::remote::merge_selected;
use crate::remote::resolve_request;
use crate::validation::Clock;
use crate::validation::FieldError;
use crate::validation::Rule;
use crate::validation::RuleSet;
use crate::validation::SystemClock;
use crate::validation::ValidationResult;
use crate::validation::ValidatorRegistry;

use super::FieldStatus;
use super::FieldView;
use super::FormId;
use super::FormState;
use super::RenderContext;
use super::RendererRegistry;

/// Outcome of [`Form::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum Submission<R> {
    /// Validation passed and the handler ran.
    Submitted(R),
    /// Validation failed; the handler was not called.
    Rejected(ValidationResult),
}

impl<R> Submission<R> {
    /// Returns `true` if the handler ran.
    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted(_))
    }

    /// The handler's result, if it ran.
    pub fn submitted(self) -> Option<R> {
        match self {
            Self::Submitted(r) => Some(r),
            Self::Rejected(_) => None,
        }
    }
}

/// Builder for [`Form`].
pub struct FormBuilder {
    fields: Arc<FieldSet>,
    validators: ValidatorRegistry,
    clock: Arc<dyn Clock>,
    initial_values: ValueMap,
}

impl FormBuilder {
    /// Registry used to resolve `custom` rules.
    pub fn validators(mut self, registry: ValidatorRegistry) -> Self {
        self.validators = registry;
        self
    }

    /// Time source for date rules.
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Values the form starts with and returns to on [`Form::reset`].
    pub fn initial_values(mut self, values: ValueMap) -> Self {
        self.initial_values = values;
        self
    }

    /// Compiles the rules and builds the form.
    ///
    /// Fails if a `custom` rule names an unregistered validator.
    pub fn build(self) -> Result<Form, ConfigError> {
        let rules = RuleSet::compile(&self.fields, &self.validators)?;
        let id = FormId::new();
        log::debug!("Form {} built with {} fields", id, self.fields.len());

        Ok(Form {
            id,
            fields: self.fields,
            rules: Arc::new(rules),
            clock: self.clock,
            state: FormState::with_values(self.initial_values.clone()),
            initial: self.initial_values,
            options: HashMap::new(),
            selected: HashMap::new(),
        })
    }
}

/// One live form instance.
///
/// Holds the values, touched set and errors of a single form. Every change
/// goes through [`set_value`](Self::set_value), which clears the stored
/// values of fields whose remote data depended on the changed field.
///
/// # Example
///
/// ```
/// use assetform_lib::engine::Form;
/// use assetform_lib::model::{FieldKind, FieldSet, FieldSpec};
///
/// let fields = FieldSet::new(vec![
///     FieldSpec::new("campusId", FieldKind::Select).required(),
///     FieldSpec::new("locationId", FieldKind::ApiAutocomplete)
///         .api_url("/locations/campus/")
///         .depends_on("campusId", "campusId"),
/// ])
/// .unwrap();
///
/// let mut form = Form::builder(fields).build().unwrap();
/// form.set_value("campusId", "7");
/// form.set_value("locationId", 12);
/// form.set_value("campusId", "9");
/// assert!(form.value("locationId").is_null());
///
/// let submitted = form.submit(|values| values.len());
/// assert!(submitted.is_submitted());
/// ```
pub struct Form {
    id: FormId,
    fields: Arc<FieldSet>,
    rules: Arc<RuleSet>,
    clock: Arc<dyn Clock>,
    state: FormState,
    initial: ValueMap,
    options: HashMap<String, RemoteOptionSet>,
    selected: HashMap<String, Entity>,
}

impl Form {
    /// Starts building a form over a field set.
    pub fn builder(fields: impl Into<Arc<FieldSet>>) -> FormBuilder {
        FormBuilder {
            fields: fields.into(),
            validators: ValidatorRegistry::new(),
            clock: Arc::new(SystemClock),
            initial_values: ValueMap::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Identifier of this form instance, used in log lines.
    pub fn id(&self) -> FormId {
        self.id
    }

    /// The field declarations the form was built from.
    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    /// Values, touched set and errors.
    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Current values of every field that has one.
    pub fn values(&self) -> &ValueMap {
        &self.state.values
    }

    /// Current value of a field, `Null` if unset.
    pub fn value(&self, name: &str) -> &Value {
        self.state.value(name)
    }

    /// Current errors, in field-name order.
    pub fn errors(&self) -> impl Iterator<Item = &FieldError> {
        self.state.errors.values()
    }

    /// Current error of a field.
    pub fn error(&self, name: &str) -> Option<&FieldError> {
        self.state.errors.get(name)
    }

    /// Returns `true` once a field has been blurred or validated with an error.
    pub fn is_touched(&self, name: &str) -> bool {
        self.state.touched.contains(name)
    }

    /// Options last applied to a remote field.
    pub fn options(&self, name: &str) -> Option<&RemoteOptionSet> {
        self.options.get(name)
    }

    /// Entity remembered by [`select_item`](Self::select_item).
    pub fn selected_item(&self, name: &str) -> Option<&Entity> {
        self.selected.get(name)
    }

    // =========================================================================
    // Value changes
    // =========================================================================

    /// Sets a field's value.
    ///
    /// Every field whose `dependsOn` chain leads back to `name` is cleared
    /// along with its error, remembered selection and options. Returns the
    /// cleared fields, nearest first.
    ///
    /// Touched fields whose outcome reads the changed field are re-validated:
    /// the field itself, fields with a cross-field rule naming it, and fields
    /// whose `showIf` points at it. A field hidden by the change loses its error.
    pub fn set_value(&mut self, name: &str, value: impl Into<Value>) -> Vec<String> {
        let value = value.into();
        let Some(spec) = self.fields.get(name) else {
            log::warn!("Form {}: ignoring value for unknown field '{}'", self.id, name);
            return Vec::new();
        };

        let value_key = &spec.remote.value_key;
        if self
            .selected
            .get(name)
            .is_some_and(|item| !item.value_of(value_key).strict_eq(&value))
        {
            self.selected.remove(name);
        }
        self.state.values.insert(name.to_string(), value);

        let cleared = dependents_closure(self.fields.fields(), name);
        for dependent in &cleared {
            let empty = self
                .fields
                .get(dependent)
                .map(FieldSpec::empty_value)
                .unwrap_or_default();
            self.state.values.insert(dependent.clone(), empty);
            self.state.errors.remove(dependent);
            self.selected.remove(dependent);
            self.options.remove(dependent);
        }
        if !cleared.is_empty() {
            log::debug!(
                "Form {}: '{}' changed, cleared {}",
                self.id,
                name,
                cleared.join(", ")
            );
        }

        self.revalidate_affected(name, &cleared);
        cleared
    }

    fn revalidate_affected(&mut self, name: &str, cleared: &[String]) {
        let changed = |field: &str| field == name || cleared.iter().any(|c| c == field);
        let affected: Vec<String> = self
            .fields
            .iter()
            .filter(|spec| !cleared.contains(&spec.name))
            .filter(|spec| self.is_touched(&spec.name) || self.state.errors.contains_key(&spec.name))
            .filter(|spec| {
                spec.name == name
                    || spec.show_if.as_ref().is_some_and(|s| changed(&s.field))
                    || spec.validation.iter().filter_map(Rule::field_reference).any(changed)
            })
            .map(|spec| spec.name.clone())
            .collect();

        for field in affected {
            self.revalidate(&field);
        }
    }

    /// Selects an entity for a remote field.
    ///
    /// The value becomes the entity's `valueKey` and the entity is kept so it
    /// stays in the option list even when a later fetch does not return it.
    pub fn select_item(&mut self, name: &str, item: Entity) -> Vec<String> {
        let Some(spec) = self.fields.get(name) else {
            log::warn!("Form {}: ignoring selection for unknown field '{}'", self.id, name);
            return Vec::new();
        };
        let value_key = spec.remote.value_key.clone();
        let value = item.value_of(&value_key);

        let cleared = self.set_value(name, value.clone());
        if let Some(set) = self.options.get_mut(name) {
            let items = std::mem::take(&mut set.items);
            set.items = merge_selected(items, Some(&item), &value, &value_key);
        }
        self.selected.insert(name.to_string(), item);
        cleared
    }

    /// Restores the initial values and forgets touched state, errors,
    /// selections and options.
    pub fn reset(&mut self) {
        self.state = FormState::with_values(self.initial.clone());
        self.options.clear();
        self.selected.clear();
    }

    /// Returns `true` if any value differs from the initial values.
    pub fn is_dirty(&self) -> bool {
        let names: BTreeSet<&String> = self.state.values.keys().chain(self.initial.keys()).collect();
        names.into_iter().any(|name| {
            let initial = self.initial.get(name).unwrap_or(&Value::Null);
            !self.value(name).strict_eq(initial)
        })
    }

    // =========================================================================
    // Validation
    // =========================================================================

    fn validate_one(&self, spec: &FieldSpec) -> Option<FieldError> {
        self.rules
            .validate_field(spec, &self.state.values, self.clock.as_ref())
    }

    fn revalidate(&mut self, name: &str) -> Option<&FieldError> {
        let error = self.fields.get(name).and_then(|spec| self.validate_one(spec));
        self.state.set_error(name, error);
        self.state.errors.get(name)
    }

    /// Marks a field touched and validates it.
    pub fn blur(&mut self, name: &str) -> Option<&FieldError> {
        if !self.fields.contains(name) {
            return None;
        }
        self.state.touched.insert(name.to_string());
        self.revalidate(name)
    }

    /// Validates every field regardless of touched state.
    ///
    /// Hidden fields end up without an error.
    pub fn validate_all(&mut self) -> bool {
        let names: Vec<String> = self.fields.names().map(String::from).collect();
        self.validate_fields(&names).is_valid()
    }

    /// Validates the named fields, storing their errors.
    ///
    /// Fields that fail are marked touched so their errors are displayed.
    pub fn validate_fields(&mut self, names: &[String]) -> ValidationResult {
        let mut errors = Vec::new();
        for name in names {
            let Some(spec) = self.fields.get(name) else {
                continue;
            };
            let error = self.validate_one(spec);
            if let Some(error) = &error {
                self.state.touched.insert(name.clone());
                errors.push(error.clone());
            }
            self.state.set_error(name, error);
        }
        ValidationResult::from_errors(errors)
    }

    /// Validates everything and hands a snapshot of the values to `handler`.
    ///
    /// Every field is marked touched. Nothing is submitted unless every
    /// field passes.
    pub fn submit<R>(&mut self, handler: impl FnOnce(ValueMap) -> R) -> Submission<R> {
        let names: Vec<String> = self.fields.names().map(String::from).collect();
        self.state.touched.extend(names.iter().cloned());

        match self.validate_fields(&names) {
            ValidationResult::Valid => {
                log::info!("Form {} submitted", self.id);
                Submission::Submitted(handler(self.state.values.clone()))
            }
            rejected => {
                log::info!(
                    "Form {} submit rejected: {} invalid fields",
                    self.id,
                    rejected.errors().len()
                );
                Submission::Rejected(rejected)
            }
        }
    }

    /// Display status of a field.
    pub fn status(&self, name: &str) -> FieldStatus {
        if self.state.errors.contains_key(name) {
            FieldStatus::Invalid
        } else if self.is_touched(name) {
            FieldStatus::Valid
        } else {
            FieldStatus::Pristine
        }
    }

    // =========================================================================
    // Dependencies and remote options
    // =========================================================================

    /// Names of the currently visible fields.
    pub fn visible(&self) -> BTreeSet<String> {
        resolve_visible(self.fields.fields(), &self.state.values)
    }

    /// The dependency gate of a field.
    pub fn gate(&self, name: &str) -> Option<FieldGate> {
        let spec = self.fields.get(name)?;
        Some(dependency_gate(spec, self.fields.fields(), &self.state.values))
    }

    /// The request a remote field would issue for the current values.
    pub fn option_request(&self, name: &str) -> Option<OptionRequest> {
        let spec = self.fields.get(name).filter(|s| s.is_remote())?;
        Some(resolve_request(spec, &self.state.values))
    }

    /// Resolves and applies the options of a remote field.
    ///
    /// The form is borrowed across the fetch. Hosts that keep editing while a
    /// fetch is outstanding should instead take an [`option_request`](Self::option_request),
    /// run [`OptionProvider::load`] themselves and hand the result to
    /// [`apply_options`](Self::apply_options).
    pub async fn load_options(&mut self, name: &str, provider: &OptionProvider) -> Option<&RemoteOptionSet> {
        let spec = self.fields.get(name).filter(|s| s.is_remote())?.clone();
        let request = resolve_request(&spec, &self.state.values);
        let values = self.state.values.clone();
        let selected = self.selected.get(name).cloned();

        if request.fetch_enabled {
            self.options
                .insert(name.to_string(), RemoteOptionSet::loading(&request));
        }
        let set = provider
            .load(&spec, &request, &values, selected.as_ref())
            .await;
        self.apply_options(set);
        self.options.get(name)
    }

    /// Applies fetched options to their field.
    ///
    /// The set is discarded (returning `false`) when its cache key no longer
    /// matches the field's current request, i.e. the values that produced it
    /// have since changed.
    pub fn apply_options(&mut self, set: RemoteOptionSet) -> bool {
        let Some(request) = self.option_request(&set.field) else {
            return false;
        };
        if request.cache_key != set.cache_key {
            log::debug!(
                "Form {}: discarding stale options for '{}' ({} != {})",
                self.id,
                set.field,
                set.cache_key,
                request.cache_key
            );
            return false;
        }
        self.options.insert(set.field.clone(), set);
        true
    }

    /// Render descriptors of the visible fields, in declaration order.
    pub fn views(&self, registry: &RendererRegistry) -> Vec<FieldView> {
        let visible = self.visible();
        self.fields
            .iter()
            .filter(|spec| visible.contains(&spec.name))
            .map(|spec| {
                let gate = dependency_gate(spec, self.fields.fields(), &self.state.values);
                registry.render(&RenderContext {
                    spec,
                    value: self.value(&spec.name),
                    gate: &gate,
                    options: self.options.get(&spec.name),
                    error: self.state.errors.get(&spec.name),
                })
            })
            .collect()
    }
}

impl std::fmt::Debug for Form {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Form")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("options", &self.options.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
