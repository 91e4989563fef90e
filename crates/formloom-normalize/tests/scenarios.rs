use std::collections::HashSet;

use formloom_core::FieldType;
use formloom_normalize::{NormalizeError, ServiceType, SourceFormat, detect_format, normalize};
use serde_json::{Value, json};

fn none() -> HashSet<String> {
    HashSet::new()
}

#[test]
fn quick_check_simple_object() {
    let input = json!({"title": "Quick Check", "fields": {"age": {"type": "number"}}});
    let result = normalize(&input, &none()).unwrap();

    assert_eq!(result.slug, "quick-check");
    assert_eq!(result.metadata.original_format, SourceFormat::SimpleObject);
    assert_eq!(result.form_data.pages.len(), 1);
    let elements = &result.form_data.pages[0].elements;
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].id, "age");
    assert_eq!(elements[0].field_type, FieldType::Number);
    assert_eq!(result.metadata.page_count, 1);
    assert_eq!(result.metadata.field_count, 1);
    assert_eq!(result.structure, result.form_data);
    assert!(result.is_active);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["metadata"]["original_format"], "simple-object");
    assert_eq!(json["form_data"]["flowConfig"]["title"], "Quick Check");
}

#[test]
fn slug_collides_with_existing() {
    let existing: HashSet<String> = ["weight-loss-intake".to_string()].into();
    let input = json!({"title": "Weight Loss Intake", "fields": [{"id": "goal"}]});
    let result = normalize(&input, &existing).unwrap();
    assert_eq!(result.slug, "weight-loss-intake-2");
}

#[test]
fn rejects_non_object_inputs() {
    assert_eq!(normalize(&Value::Null, &none()), Err(NormalizeError::NullInput));
    assert_eq!(normalize(&json!([]), &none()), Err(NormalizeError::ArrayInput));
    assert_eq!(
        normalize(&json!("form"), &none()),
        Err(NormalizeError::NotAnObject("string"))
    );
    assert_eq!(
        normalize(&json!(3), &none()),
        Err(NormalizeError::NotAnObject("number"))
    );
}

#[test]
fn rejects_unrecognized_shape() {
    let input = json!({"title": "Nothing here", "author": "someone"});
    assert_eq!(normalize(&input, &none()), Err(NormalizeError::UnrecognizedFormat));
    assert_eq!(detect_format(&input), None);
}

#[test]
fn rejects_missing_title() {
    let input = json!({"pages": [{"elements": []}]});
    assert_eq!(normalize(&input, &none()), Err(NormalizeError::MissingTitle));
}

#[test]
fn detect_without_normalizing() {
    assert_eq!(detect_format(&json!({"pages": []})), Some(SourceFormat::PageBased));
    assert_eq!(detect_format(&json!({"steps": []})), Some(SourceFormat::StepBased));
    assert_eq!(detect_format(&json!({"fields": []})), Some(SourceFormat::SimpleObject));
    assert_eq!(detect_format(&json!([])), None);
}

fn step_document() -> Value {
    json!({
        "flowConfig": {
            "title": "Wellness Consultation",
            "description": "Tell us about yourself",
            "theme": "calm"
        },
        "category": "consultation",
        "categoryId": "cat-7",
        "validation": {"submitOnce": true},
        "steps": [
            {
                "id": "basics",
                "title": "Basics",
                "fields": [
                    {"name": "full_name", "type": "input", "required": true},
                    {"name": "phone", "type": "telephone"},
                    {"type": "composite", "children": [
                        {"name": "height", "type": "numeric", "min": 100, "max": 250},
                        {"name": "weight", "type": "numeric", "validation": {"minimum": 30}}
                    ]}
                ]
            },
            {
                "id": "goals",
                "fields": [
                    {"name": "goal", "type": "radiobutton", "options": ["Lose", "Gain", "Maintain"]},
                    {"name": "phone", "type": "tel", "label": "Backup phone"},
                    {"name": "mood", "type": "emoji-scale"}
                ],
                "conditionalLogic": {
                    "rules": [
                        {"field": "weight", "operator": ">", "value": 120},
                        {"field": "goal", "operator": "equals", "value": "Lose"}
                    ],
                    "logic": "all",
                    "action": "show",
                    "target": "goals"
                },
                "completion": {
                    "webhook": {"url": "https://example.test/hook"},
                    "message": {"text": "Thanks!"},
                    "crm": {"list": "leads"}
                }
            }
        ]
    })
}

#[test]
fn step_based_document() {
    let result = normalize(&step_document(), &none()).unwrap();
    let data = &result.form_data;

    assert_eq!(result.metadata.original_format, SourceFormat::StepBased);
    assert_eq!(result.title, "Wellness Consultation");
    assert_eq!(result.description, "Tell us about yourself");
    assert_eq!(result.service_type, Some(ServiceType::Paid));
    assert_eq!(result.category_id.as_deref(), Some("cat-7"));
    assert_eq!(data.flow_config.theme, "calm");
    assert_eq!(data.flow_config.estimated_time, 2);
    assert_eq!(data.validation["submitOnce"], true);

    let ids: Vec<_> = data.elements().map(|e| e.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["full_name", "phone", "height", "weight", "goal", "phone_2", "mood"]
    );
    let types: Vec<_> = data.elements().map(|e| e.field_type).collect();
    assert_eq!(
        types,
        vec![
            FieldType::Text,
            FieldType::Tel,
            FieldType::Number,
            FieldType::Number,
            FieldType::Radio,
            FieldType::Tel,
            FieldType::Text,
        ]
    );

    assert_eq!(data.conditionals.len(), 1);
    assert_eq!(data.conditionals[0]["logic"], "and");
    assert_eq!(data.conditionals[0]["rules"][0]["operator"], "greater_than");

    let types: Vec<_> = data
        .completion_actions
        .iter()
        .map(|a| a["type"].as_str().unwrap())
        .collect();
    assert_eq!(types, vec!["message", "webhook", "crm"]);
}

#[test]
fn normalizing_form_data_is_idempotent() {
    for input in [
        step_document(),
        json!({"title": "Quick Check", "fields": {"age": {"type": "number"}}}),
        json!({
            "title": "Paged",
            "pages": [{"title": "Only", "elements": [
                {"id": "x", "type": "dropdown", "options": [" A ", {"text": "B", "value": 2}]},
                {"id": "x"},
                {"type": "upload", "accept": "image/*,.pdf"}
            ]}],
            "conditionals": [{"id": "c", "rules": []}],
            "completionActions": [{"type": "redirect", "order": 0}]
        }),
    ] {
        let first = normalize(&input, &none()).unwrap();
        let again_input = serde_json::to_value(&first.form_data).unwrap();
        let second = normalize(&again_input, &none()).unwrap();

        assert_eq!(second.metadata.original_format, SourceFormat::PageBased);
        assert_eq!(second.form_data, first.form_data);
        assert_eq!(second.title, first.title);
        assert_eq!(second.slug, first.slug);
    }
}

#[test]
fn converted_schema_passes_integrity_and_validation() {
    let result = normalize(&step_document(), &none()).unwrap();
    let schema = result.to_schema();
    assert_eq!(schema.check_integrity(), Ok(()));
    assert_eq!(schema.sections.len(), 2);
    assert_eq!(schema.field_count(), result.metadata.field_count);
    assert_eq!(schema.category.as_deref(), Some("paid"));
    assert!(
        formloom_core::validate_schema(&schema)
            .iter()
            .all(|issue| issue.severity != formloom_core::Severity::Error)
    );
}

#[test]
fn flat_map_metadata_blocks_are_not_fields() {
    let input = json!({
        "title": "Intake",
        "flowConfig": {"title": "Intake", "type": "wizard"},
        "validation": {"type": "strict"},
        "age": {"type": "number"}
    });
    let result = normalize(&input, &none()).unwrap();

    let ids: Vec<_> = result.form_data.elements().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["age"]);
    assert_eq!(result.metadata.field_count, 1);
    assert_eq!(result.form_data.flow_config.estimated_time, 1);
    assert_eq!(result.form_data.validation["type"], "strict");
}
