//! Multi-step definitions loaded from JSON.

use assetform_lib::engine::Form;
use assetform_lib::engine::StepBlocked;
use assetform_lib::engine::Stepper;
use assetform_lib::model::FormDefinition;

const ALLOCATION: &str = r#"{
    "fields": [
        {"name": "assetId", "label": "Asset", "kind": "text", "required": true},
        {"name": "assigneeEmail", "label": "Assignee email", "kind": "text", "required": true,
         "validation": [{"rule": "email"}]},
        {"name": "accessories", "kind": "multiSelect",
         "options": [{"value": "charger", "label": "Charger"}, {"value": "bag", "label": "Bag"}]},
        {"name": "notes", "kind": "textarea", "validation": [{"rule": "maxLength", "max": 20}]}
    ],
    "steps": [
        {"title": "Asset", "fields": ["assetId"]},
        {"title": "Assignee", "fields": ["assigneeEmail", "accessories"]},
        {"title": "Review", "fields": ["notes"]}
    ]
}"#;

fn stepper() -> Stepper {
    let definition = FormDefinition::from_json(ALLOCATION).unwrap();
    let form = Form::builder(definition.fields).build().unwrap();
    Stepper::new(form, definition.steps).unwrap()
}

#[test]
fn test_next_with_invalid_required_field_stays_put() {
    let mut stepper = stepper();
    let Err(StepBlocked::Invalid(result)) = stepper.next() else {
        panic!("empty asset must block the first step");
    };
    assert_eq!(result.errors().len(), 1);
    assert_eq!(stepper.current(), 0);
    assert!(stepper.form().is_touched("assetId"));
}

#[test]
fn test_walk_through_and_submit() {
    let mut stepper = stepper();
    stepper.form_mut().set_value("assetId", "LT-0042");
    assert_eq!(stepper.next(), Ok(1));

    stepper.form_mut().set_value("assigneeEmail", "not-an-email");
    assert!(stepper.next().is_err());
    assert_eq!(stepper.current(), 1);

    stepper.form_mut().set_value("assigneeEmail", "ada@example.com");
    assert_eq!(stepper.next(), Ok(2));
    assert_eq!(stepper.next(), Err(StepBlocked::AtEnd));

    assert_eq!(stepper.go_to(0), Ok(0));
    assert!(stepper.is_completed(1));
    assert_eq!(stepper.go_to(2), Err(StepBlocked::NotReachable { target: 2 }));
    assert_eq!(stepper.go_to(1), Ok(1));
    assert_eq!(stepper.go_to(2), Ok(2));

    let snapshot = stepper.submit(|values| values).submitted().unwrap();
    assert_eq!(snapshot.get("assetId").and_then(|v| v.as_str()), Some("LT-0042"));
}

#[test]
fn test_earlier_step_invalidated_later_blocks_submit() {
    let mut stepper = stepper();
    stepper.form_mut().set_value("assetId", "LT-0042");
    stepper.next().unwrap();
    stepper.form_mut().set_value("assigneeEmail", "ada@example.com");
    stepper.next().unwrap();

    stepper.form_mut().set_value("assetId", "");
    assert!(!stepper.submit(|_| ()).is_submitted());
    assert!(stepper.form().error("assetId").is_some());
}
