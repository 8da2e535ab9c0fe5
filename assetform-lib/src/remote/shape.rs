//! Extraction, filtering and selection merging of fetched options.

use crate::model::Entity;
use crate::model::FieldSpec;
use crate::model::Value;
use crate::model::ValueMap;

/// Extracts the item array from a response body.
///
/// With a `data_path`, each dot-separated segment is walked into the body and
/// any missing segment yields an empty list. Without one, the body's `data`
/// member is read; a body that is itself an array is accepted as-is.
/// Non-object items are dropped.
pub fn extract_items(body: &serde_json::Value, data_path: Option<&str>) -> Vec<Entity> {
    let target = match data_path {
        Some(path) => path
            .split('.')
            .filter(|segment| !segment.is_empty())
            .try_fold(body, |node, segment| node.get(segment)),
        None if body.is_array() => Some(body),
        None => body.get("data"),
    };

    target
        .and_then(serde_json::Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| Entity::from_json(item.clone()))
                .collect()
        })
        .unwrap_or_default()
}

/// Keeps only entities whose `category` equals `category` exactly.
pub fn filter_by_category(items: Vec<Entity>, category: Option<&str>) -> Vec<Entity> {
    match category {
        Some(category) => items
            .into_iter()
            .filter(|item| item.in_category(category))
            .collect(),
        None => items,
    }
}

/// Drops entities whose `value_key` repeats an earlier entity's.
///
/// Values are compared with [`Value::strict_eq`], the same equality the
/// selection merge uses, so `7` and `7.0` are one option. Entities without the
/// key are kept.
pub fn dedupe_by_value_key(items: Vec<Entity>, value_key: &str) -> Vec<Entity> {
    let mut seen: Vec<Value> = Vec::new();
    items
        .into_iter()
        .filter(|item| {
            let value = item.value_of(value_key);
            if value.is_null() {
                return true;
            }
            if seen.iter().any(|v| v.strict_eq(&value)) {
                return false;
            }
            seen.push(value);
            true
        })
        .collect()
}

/// Prepends `selected` if the current `value` is not among `items`.
///
/// Keeps a previously chosen option visible after the page or filter that
/// surfaced it changes. Nothing happens without both a selected entity and
/// a non-blank value.
pub fn merge_selected(
    mut items: Vec<Entity>,
    selected: Option<&Entity>,
    value: &Value,
    value_key: &str,
) -> Vec<Entity> {
    let Some(selected) = selected else {
        return items;
    };
    if value.is_blank() {
        return items;
    }

    let present = items
        .iter()
        .any(|item| item.value_of(value_key).strict_eq(value));
    if !present {
        items.insert(0, selected.clone());
    }
    items
}

/// Runs extraction, category filter, de-duplication and selection merge.
pub fn shape_options(
    spec: &FieldSpec,
    body: &serde_json::Value,
    values: &ValueMap,
    selected: Option<&Entity>,
) -> Vec<Entity> {
    let remote = &spec.remote;
    let items = extract_items(body, remote.data_path.as_deref());
    let items = filter_by_category(items, remote.filter_category.as_deref());
    let items = dedupe_by_value_key(items, &remote.value_key);
    let current = values.get(&spec.name).unwrap_or(&Value::Null);
    merge_selected(items, selected, current, &remote.value_key)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::FieldKind;

    fn ids(items: &[Entity]) -> Vec<Value> {
        items.iter().map(|e| e.value_of("id")).collect()
    }

    #[test]
    fn test_extract_default_data_member() {
        let body = json!({"data": [{"id": 1}, {"id": 2}, 3]});
        assert_eq!(ids(&extract_items(&body, None)), vec![Value::Int(1), Value::Int(2)]);
        assert!(extract_items(&json!({"items": []}), None).is_empty());
        assert_eq!(extract_items(&json!([{"id": 5}]), None).len(), 1);
    }

    #[test]
    fn test_extract_data_path() {
        let body = json!({"data": {"users": [{"id": "u1"}]}});
        assert_eq!(extract_items(&body, Some("data.users")).len(), 1);
        assert!(extract_items(&body, Some("data.groups")).is_empty());
        assert!(extract_items(&body, Some("data.users.0")).is_empty());
        assert!(extract_items(&json!({"data": "nope"}), Some("data")).is_empty());
    }

    #[test]
    fn test_category_filter() {
        let items = vec![
            Entity::new().with("id", 1).with("category", "Laptop"),
            Entity::new().with("id", 2).with("category", "Monitor"),
            Entity::new().with("id", 3),
        ];
        assert_eq!(ids(&filter_by_category(items.clone(), Some("Laptop"))), vec![Value::Int(1)]);
        assert_eq!(filter_by_category(items, None).len(), 3);
    }

    #[test]
    fn test_merge_prepends_missing_selection_once() {
        let fetched = vec![Entity::new().with("id", 2), Entity::new().with("id", 3)];
        let selected = Entity::new().with("id", 1).with("name", "Old pick");

        let merged = merge_selected(fetched.clone(), Some(&selected), &Value::Int(1), "id");
        assert_eq!(ids(&merged), vec![Value::Int(1), Value::Int(2), Value::Int(3)]);

        let merged = merge_selected(fetched.clone(), Some(&selected), &Value::Int(3), "id");
        assert_eq!(merged, fetched);

        let merged = merge_selected(fetched.clone(), None, &Value::Int(1), "id");
        assert_eq!(merged, fetched);

        let merged = merge_selected(fetched.clone(), Some(&selected), &Value::Null, "id");
        assert_eq!(merged, fetched);
    }

    #[test]
    fn test_shape_options_has_no_duplicate_values() {
        let spec = FieldSpec::new("assetId", FieldKind::ApiAutocomplete)
            .api_url("/assets")
            .data_path("data.assets")
            .filter_category("Laptop");
        let body = json!({"data": {"assets": [
            {"id": 1, "category": "Laptop"},
            {"id": 1, "category": "Laptop"},
            {"id": 2, "category": "Phone"},
            {"id": 4, "category": "Laptop"}
        ]}});
        let mut values = ValueMap::new();
        values.insert("assetId".into(), Value::Int(4));
        let selected = Entity::new().with("id", 4).with("category", "Laptop");

        let items = shape_options(&spec, &body, &values, Some(&selected));
        assert_eq!(ids(&items), vec![Value::Int(1), Value::Int(4)]);
    }

    #[test]
    fn test_dedupe_agrees_with_selection_equality() {
        let items = vec![
            Entity::new().with("id", 7),
            Entity::new().with("id", 7.0),
            Entity::new().with("id", "7"),
            Entity::new().with("name", "no id"),
            Entity::new().with("name", "also no id"),
        ];
        let deduped = dedupe_by_value_key(items, "id");
        assert_eq!(deduped.len(), 4);
        assert_eq!(deduped[0].value_of("id"), Value::Int(7));

        let merged = merge_selected(deduped.clone(), Some(&Entity::new().with("id", 7)), &Value::Float(7.0), "id");
        assert_eq!(merged, deduped);
    }
}
