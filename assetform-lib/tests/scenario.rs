//! End-to-end form flows: cascading fields, stale results, hidden fields.

mod common;

use std::sync::Arc;

use assetform_lib::engine::Form;
use assetform_lib::engine::RendererRegistry;
use assetform_lib::engine::Submission;
use assetform_lib::model::FieldSet;
use assetform_lib::model::Value;
use assetform_lib::remote::OptionProvider;
use assetform_lib::validation::FixedClock;
use assetform_lib::validation::ValidatorRegistry;
use common::MockFetcher;
use serde_json::json;

const ASSET_FORM: &str = r#"[
    {"name": "campusId", "label": "Campus", "kind": "select", "required": true,
     "options": [{"value": "7", "label": "North"}, {"value": "9", "label": "South"}]},
    {"name": "locationId", "label": "Location", "kind": "apiAutocomplete",
     "apiUrl": "/locations/campus/", "labelKey": "locationName",
     "dependsOn": {"field": "campusId", "paramKey": "campusId"}},
    {"name": "isConsigned", "kind": "checkbox"},
    {"name": "consigneeId", "label": "Consignee", "kind": "apiAutocomplete", "required": true,
     "apiUrl": "/users", "dataPath": "data.users", "labelKey": "fullName",
     "showIf": {"field": "isConsigned", "value": true}},
    {"name": "validFrom", "label": "Valid from", "kind": "date",
     "validation": [{"rule": "notInFuture"}]},
    {"name": "validUntil", "label": "Valid until", "kind": "date",
     "validation": [{"rule": "notBeforeField", "field": "validFrom"}]},
    {"name": "serial", "kind": "text",
     "validation": [{"rule": "custom", "name": "serialFormat"}]}
]"#;

fn form() -> Form {
    let fields = FieldSet::from_json(ASSET_FORM).unwrap();
    let validators = ValidatorRegistry::new().with("serialFormat", |value, _, _| {
        let serial = value.as_str()?;
        (!serial.starts_with("SN-")).then(|| "Serial must start with SN-".to_string())
    });
    Form::builder(fields)
        .validators(validators)
        .clock(FixedClock::on(2024, 6, 1))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_campus_switch_discards_superseded_options() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .body("/locations/campus/7", json!({"data": [{"id": 1, "locationName": "Lab"}]}))
            .body("/locations/campus/9", json!({"data": [{"id": 2, "locationName": "Dock"}]})),
    );
    let provider = OptionProvider::from_arc(fetcher.clone());
    let mut form = form();

    form.set_value("campusId", "7");
    let seven = form.option_request("locationId").unwrap();
    assert!(seven.fetch_enabled);
    assert_eq!(seven.url.as_deref(), Some("/locations/campus/7"));

    form.set_value("locationId", 1);
    form.set_value("campusId", "9");
    assert!(form.value("locationId").is_null());
    let nine = form.option_request("locationId").unwrap();
    assert_eq!(nine.url.as_deref(), Some("/locations/campus/9"));

    // The fetch for "7" resolves after the switch.
    let spec = form.fields().get("locationId").unwrap().clone();
    let late = provider.load(&spec, &seven, form.values(), None).await;
    assert_eq!(late.items.len(), 1);
    assert!(!form.apply_options(late));

    let current = form.load_options("locationId", &provider).await.unwrap();
    assert_eq!(current.items[0].value_of("id"), Value::Int(2));
    assert_eq!(fetcher.urls(), vec!["/locations/campus/7", "/locations/campus/9"]);
}

#[tokio::test]
async fn test_failed_fetch_renders_error_without_blocking() {
    let provider = OptionProvider::new(MockFetcher::new());
    let mut form = form();
    form.set_value("campusId", "7");

    let set = form.load_options("locationId", &provider).await.unwrap();
    assert!(set.is_error());

    let views = form.views(&RendererRegistry::new());
    let location = views.iter().find(|v| v.name == "locationId").unwrap();
    assert!(!location.disabled);
    assert!(form.submit(|_| ()).is_submitted());
}

#[test]
fn test_hidden_required_field_does_not_block_submit() {
    let mut form = form();
    form.set_value("campusId", "9");
    form.set_value("isConsigned", false);
    assert!(!form.visible().contains("consigneeId"));
    assert!(form.submit(|_| ()).is_submitted());

    form.set_value("isConsigned", true);
    let Submission::Rejected(result) = form.submit(|_| ()) else {
        panic!("visible required consignee must block submit");
    };
    assert_eq!(result.errors().len(), 1);
    assert_eq!(result.first_error().unwrap().message, "Consignee is required");
}

#[test]
fn test_cross_field_dates_and_custom_rule() {
    let mut form = form();
    form.set_value("campusId", "7");
    form.set_value("validFrom", "2024-05-10");
    form.set_value("validUntil", "2024-05-01");
    form.set_value("serial", "X-1");

    let Submission::Rejected(result) = form.submit(|_| ()) else {
        panic!("invalid dates and serial must block submit");
    };
    assert!(result.error_for("validUntil").is_some());
    assert_eq!(
        result.error_for("serial").unwrap().message,
        "Serial must start with SN-"
    );

    form.set_value("validUntil", "2024-05-10");
    form.set_value("serial", "SN-1");
    assert!(form.submit(|_| ()).is_submitted());

    form.set_value("validFrom", "2024-07-01");
    assert!(form.error("validFrom").is_some());
}

const ROOM_FORM: &str = r#"[
    {"name": "campusId", "label": "Campus", "kind": "select"},
    {"name": "buildingIds", "label": "Buildings", "kind": "multiSelect",
     "dependsOn": {"field": "campusId", "paramKey": "campusId"}},
    {"name": "roomId", "label": "Room", "kind": "apiAutocomplete", "apiUrl": "/rooms",
     "dependsOn": {"field": "buildingIds", "paramKey": "buildingIds"}}
]"#;

#[tokio::test]
async fn test_emptied_upstream_gates_dependents() {
    let fields = FieldSet::from_json(ROOM_FORM).unwrap();
    let mut form = Form::builder(fields).build().unwrap();
    form.set_value("campusId", "7");
    form.set_value("buildingIds", Value::Array(vec![Value::from("b1")]));
    assert!(form.gate("roomId").unwrap().is_ready());
    assert!(form.option_request("roomId").unwrap().fetch_enabled);

    form.set_value("campusId", "9");
    assert_eq!(form.value("buildingIds"), &Value::Array(Vec::new()));
    assert!(form.gate("roomId").unwrap().is_disabled());

    let request = form.option_request("roomId").unwrap();
    assert!(!request.fetch_enabled);
    assert!(request.url.is_none());

    let fetcher = Arc::new(MockFetcher::new());
    let provider = OptionProvider::from_arc(fetcher.clone());
    let set = form.load_options("roomId", &provider).await.unwrap();
    assert!(set.items.is_empty());
    assert!(!set.fetch_enabled);
    assert_eq!(fetcher.calls(), 0);

    form.set_value("buildingIds", "   ");
    assert!(form.gate("roomId").unwrap().is_disabled());
}
