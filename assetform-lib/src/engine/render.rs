//! Headless render dispatch.
//!
//! Each [`FieldKind`] maps to one [`FieldRenderer`] in a [`RendererRegistry`].
//! Renderers produce a [`Widget`] descriptor; the registry wraps it with the
//! parts every field shares (label, placeholder, disabled state, error) into a
//! [`FieldView`]. The host UI turns views into actual widgets.

use std::collections::HashMap;

use serde::Serialize;

use crate::dependency::FieldGate;
use crate::model::FieldKind;
use crate::model::FieldSpec;
use crate::model::SelectOption;
use crate::model::Value;
use crate::remote::RemoteOptionSet;
use crate::validation::FieldError;

/// Everything a renderer may read about one field.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// The field being rendered.
    pub spec: &'a FieldSpec,
    /// Its current value.
    pub value: &'a Value,
    /// Its dependency gate.
    pub gate: &'a FieldGate,
    /// Remote options, for remote fields that have loaded any.
    pub options: Option<&'a RemoteOptionSet>,
    /// Its current error.
    pub error: Option<&'a FieldError>,
}

/// Widget descriptor produced by a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "widget", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Widget {
    TextInput,
    TextArea,
    NumberInput,
    DatePicker,
    Dropdown {
        options: Vec<SelectOption>,
        multiple: bool,
    },
    RadioGroup {
        options: Vec<SelectOption>,
    },
    Checkbox {
        checked: bool,
    },
    Autocomplete {
        options: Vec<SelectOption>,
        loading: bool,
        error: Option<String>,
    },
    DocumentPicker {
        selected: usize,
    },
    Table {
        rows: usize,
    },
    /// Free-form descriptor from a host-registered renderer.
    Custom {
        name: String,
        props: serde_json::Value,
    },
}

/// Render capability for one field kind.
pub trait FieldRenderer: Send + Sync {
    /// Builds the widget descriptor for a field.
    fn render(&self, ctx: &RenderContext<'_>) -> Widget;
}

impl<F> FieldRenderer for F
where
    F: Fn(&RenderContext<'_>) -> Widget + Send + Sync,
{
    fn render(&self, ctx: &RenderContext<'_>) -> Widget {
        self(ctx)
    }
}

/// A rendered field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldView {
    pub name: String,
    pub label: String,
    pub placeholder: String,
    pub required: bool,
    pub disabled: bool,
    pub value: Value,
    pub error: Option<String>,
    pub widget: Widget,
}

// =============================================================================
// Default renderers
// =============================================================================

struct TextRenderer;

impl FieldRenderer for TextRenderer {
    fn render(&self, _ctx: &RenderContext<'_>) -> Widget {
        Widget::TextInput
    }
}

struct TextareaRenderer;

impl FieldRenderer for TextareaRenderer {
    fn render(&self, _ctx: &RenderContext<'_>) -> Widget {
        Widget::TextArea
    }
}

struct NumberRenderer;

impl FieldRenderer for NumberRenderer {
    fn render(&self, _ctx: &RenderContext<'_>) -> Widget {
        Widget::NumberInput
    }
}

struct DateRenderer;

impl FieldRenderer for DateRenderer {
    fn render(&self, _ctx: &RenderContext<'_>) -> Widget {
        Widget::DatePicker
    }
}

struct SelectRenderer {
    multiple: bool,
}

impl FieldRenderer for SelectRenderer {
    fn render(&self, ctx: &RenderContext<'_>) -> Widget {
        Widget::Dropdown {
            options: ctx.spec.options.clone(),
            multiple: self.multiple,
        }
    }
}

struct RadioRenderer;

impl FieldRenderer for RadioRenderer {
    fn render(&self, ctx: &RenderContext<'_>) -> Widget {
        Widget::RadioGroup {
            options: ctx.spec.options.clone(),
        }
    }
}

struct CheckboxRenderer;

impl FieldRenderer for CheckboxRenderer {
    fn render(&self, ctx: &RenderContext<'_>) -> Widget {
        Widget::Checkbox {
            checked: ctx.value.is_truthy(),
        }
    }
}

struct AutocompleteRenderer;

impl FieldRenderer for AutocompleteRenderer {
    fn render(&self, ctx: &RenderContext<'_>) -> Widget {
        let remote = &ctx.spec.remote;
        match ctx.options {
            Some(set) => Widget::Autocomplete {
                options: set.choices(&remote.label_key, &remote.value_key),
                loading: set.is_loading(),
                error: set.error().map(ToString::to_string),
            },
            None => Widget::Autocomplete {
                options: Vec::new(),
                loading: false,
                error: None,
            },
        }
    }
}

struct DocumentRenderer;

impl FieldRenderer for DocumentRenderer {
    fn render(&self, ctx: &RenderContext<'_>) -> Widget {
        let selected = match ctx.value {
            Value::Array(items) => items.len(),
            v if v.is_blank() => 0,
            _ => 1,
        };
        Widget::DocumentPicker { selected }
    }
}

struct TableRenderer;

impl FieldRenderer for TableRenderer {
    fn render(&self, ctx: &RenderContext<'_>) -> Widget {
        Widget::Table {
            rows: ctx.value.as_array().map_or(0, <[Value]>::len),
        }
    }
}

fn default_renderer(kind: FieldKind) -> Box<dyn FieldRenderer> {
    match kind {
        FieldKind::Text => Box::new(TextRenderer),
        FieldKind::Textarea => Box::new(TextareaRenderer),
        FieldKind::Number => Box::new(NumberRenderer),
        FieldKind::Date => Box::new(DateRenderer),
        FieldKind::Select => Box::new(SelectRenderer { multiple: false }),
        FieldKind::MultiSelect => Box::new(SelectRenderer { multiple: true }),
        FieldKind::Radio => Box::new(RadioRenderer),
        FieldKind::Checkbox => Box::new(CheckboxRenderer),
        FieldKind::ApiAutocomplete => Box::new(AutocompleteRenderer),
        FieldKind::DocumentSelector => Box::new(DocumentRenderer),
        FieldKind::CompositeTable => Box::new(TableRenderer),
    }
}

/// Lookup table from field kind to renderer.
///
/// Starts with a renderer for every kind; hosts replace individual entries
/// with [`register`](Self::register).
pub struct RendererRegistry {
    renderers: HashMap<FieldKind, Box<dyn FieldRenderer>>,
}

impl RendererRegistry {
    /// Create a registry with the built-in renderers.
    pub fn new() -> Self {
        Self {
            renderers: FieldKind::ALL
                .iter()
                .map(|&kind| (kind, default_renderer(kind)))
                .collect(),
        }
    }

    /// Replace the renderer for a kind.
    pub fn register(&mut self, kind: FieldKind, renderer: impl FieldRenderer + 'static) {
        self.renderers.insert(kind, Box::new(renderer));
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, kind: FieldKind, renderer: impl FieldRenderer + 'static) -> Self {
        self.register(kind, renderer);
        self
    }

    /// Renders one field.
    pub fn render(&self, ctx: &RenderContext<'_>) -> FieldView {
        let spec = ctx.spec;
        let widget = match self.renderers.get(&spec.kind) {
            Some(renderer) => renderer.render(ctx),
            None => default_renderer(spec.kind).render(ctx),
        };

        let placeholder = match ctx.gate {
            FieldGate::Blocked { placeholder, .. } => placeholder.clone(),
            FieldGate::Ready => spec.placeholder.clone(),
        };

        FieldView {
            name: spec.name.clone(),
            label: spec.display_name().to_string(),
            placeholder,
            required: spec.required,
            disabled: ctx.gate.is_disabled(),
            value: ctx.value.clone(),
            error: ctx.error.map(|e| e.message.clone()),
            widget,
        }
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("kinds", &self.renderers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Entity;
    use crate::remote::CacheKey;
    use crate::remote::FetchStatus;

    fn ctx<'a>(spec: &'a FieldSpec, value: &'a Value, gate: &'a FieldGate) -> RenderContext<'a> {
        RenderContext {
            spec,
            value,
            gate,
            options: None,
            error: None,
        }
    }

    #[test]
    fn test_every_kind_has_a_renderer() {
        let registry = RendererRegistry::new();
        for kind in FieldKind::ALL {
            let spec = FieldSpec::new("f", kind);
            let view = registry.render(&ctx(&spec, &Value::Null, &FieldGate::Ready));
            assert_eq!(view.name, "f");
        }
    }

    #[test]
    fn test_blocked_gate_disables_and_sets_placeholder() {
        let spec = FieldSpec::new("locationId", FieldKind::ApiAutocomplete)
            .placeholder("Pick a location")
            .api_url("/locations/campus/");
        let gate = FieldGate::Blocked {
            upstream: "campusId".into(),
            placeholder: "Select Campus first".into(),
        };
        let view = RendererRegistry::new().render(&ctx(&spec, &Value::Null, &gate));
        assert!(view.disabled);
        assert_eq!(view.placeholder, "Select Campus first");
    }

    #[test]
    fn test_autocomplete_projects_loaded_options() {
        let spec = FieldSpec::new("ownerId", FieldKind::ApiAutocomplete)
            .api_url("/users")
            .keys("fullName", "id");
        let set = RemoteOptionSet {
            field: "ownerId".into(),
            items: vec![Entity::new().with("id", 9).with("fullName", "Ada")],
            cache_key: CacheKey::new(["ownerId"]),
            fetch_enabled: true,
            status: FetchStatus::Ready,
            cache: Default::default(),
        };
        let mut context = ctx(&spec, &Value::Null, &FieldGate::Ready);
        context.options = Some(&set);

        let view = RendererRegistry::new().render(&context);
        assert_eq!(
            view.widget,
            Widget::Autocomplete {
                options: vec![SelectOption::new(9i64, "Ada")],
                loading: false,
                error: None,
            }
        );
    }

    #[test]
    fn test_custom_renderer_replaces_default() {
        fn calendar(ctx: &RenderContext<'_>) -> Widget {
            Widget::Custom {
                name: "calendar".into(),
                props: serde_json::json!({"field": ctx.spec.name}),
            }
        }

        let registry = RendererRegistry::new().with(FieldKind::Date, calendar);
        let spec = FieldSpec::new("purchasedOn", FieldKind::Date);
        let view = registry.render(&ctx(&spec, &Value::Null, &FieldGate::Ready));
        assert!(matches!(view.widget, Widget::Custom { ref name, .. } if name == "calendar"));
    }
}
