//! Element parsing: one loosely-shaped source field to one [`Element`].

use std::collections::HashSet;

use formloom_core::{FieldOption, FieldType};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::loose::{self, Object};
use crate::mapping::{is_group_type, map_field_type, map_validation};
use crate::model::Element;

const TYPE_KEYS: &[&str] = &["type", "fieldType", "field_type", "inputType"];

/// Hands out document-unique ids, suffixing repeats with `_2`, `_3`, ...
#[derive(Debug, Default)]
pub(crate) struct IdAllocator {
    taken: HashSet<String>,
}

impl IdAllocator {
    pub(crate) fn claim(&mut self, base: &str) -> String {
        if self.taken.insert(base.to_string()) {
            return base.to_string();
        }
        let mut n = 2u32;
        loop {
            let candidate = format!("{base}_{n}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// `(map key, value)` pairs from either an array or an object of fields.
pub(crate) fn entries(value: &Value) -> Vec<(Option<&str>, &Value)> {
    match value {
        Value::Array(items) => items.iter().map(|v| (None, v)).collect(),
        Value::Object(map) => map.iter().map(|(k, v)| (Some(k.as_str()), v)).collect(),
        _ => Vec::new(),
    }
}

/// Collects the elements of one page.
pub(crate) struct PageElements<'a> {
    page_no: usize,
    flatten_groups: bool,
    ids: &'a mut IdAllocator,
    elements: Vec<Element>,
}

impl<'a> PageElements<'a> {
    pub(crate) fn new(page_no: usize, flatten_groups: bool, ids: &'a mut IdAllocator) -> Self {
        Self {
            page_no,
            flatten_groups,
            ids,
            elements: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, key: Option<&str>, raw: &Value) {
        if self.flatten_groups
            && let Some(children) = group_children(raw)
        {
            debug!(page = self.page_no, children = children.len(), "flattening field group");
            for (child_key, child) in children {
                self.push(child_key, child);
            }
            return;
        }
        let position = self.elements.len() + 1;
        if let Some(element) = parse_element(raw, key, self.page_no, position, self.ids) {
            self.elements.push(element);
        }
    }

    pub(crate) fn extend(&mut self, source: &Value) {
        for (key, raw) in entries(source) {
            self.push(key, raw);
        }
    }

    pub(crate) fn finish(self) -> Vec<Element> {
        self.elements
    }
}

fn group_children(raw: &Value) -> Option<Vec<(Option<&str>, &Value)>> {
    let obj = raw.as_object()?;
    let kind = loose::text(obj, TYPE_KEYS)?;
    if !is_group_type(kind) {
        return None;
    }
    let nested = ["fields", "children", "elements"]
        .iter()
        .find_map(|k| obj.get(*k).filter(|v| v.is_array() || v.is_object()))?;
    Some(entries(nested))
}

/// Parse one source field. `key` is the map key when fields came from an
/// object. Returns `None` for values that cannot describe a field.
pub(crate) fn parse_element(
    raw: &Value,
    key: Option<&str>,
    page_no: usize,
    position: usize,
    ids: &mut IdAllocator,
) -> Option<Element> {
    match raw {
        Value::Object(obj) => Some(parse_object(obj, key, page_no, position, ids)),
        // `{"email": "email"}`: key is the id, value is the type.
        Value::String(kind) if key.is_some() => {
            let mut obj = Map::new();
            obj.insert("type".into(), Value::String(kind.clone()));
            Some(parse_object(&obj, key, page_no, position, ids))
        }
        // `["name", "email"]`: a bare id.
        Value::String(id) if !id.trim().is_empty() => {
            let mut obj = Map::new();
            obj.insert("id".into(), Value::String(id.trim().to_string()));
            Some(parse_object(&obj, None, page_no, position, ids))
        }
        other => {
            warn!(
                page = page_no,
                position,
                kind = loose::kind_name(other),
                "skipping element that is not an object"
            );
            None
        }
    }
}

fn parse_object(
    obj: &Object,
    key: Option<&str>,
    page_no: usize,
    position: usize,
    ids: &mut IdAllocator,
) -> Element {
    let base = loose::text(obj, &["id", "name", "key"])
        .or(key)
        .map(str::to_string)
        .unwrap_or_else(|| format!("field_{page_no}_{position}"));
    let id = ids.claim(&base);

    let field_type = match loose::text(obj, TYPE_KEYS) {
        Some(name) => map_field_type(name).unwrap_or_else(|| {
            warn!(field = %id, source_type = name, "unknown field type, using text");
            FieldType::Text
        }),
        None => FieldType::Text,
    };

    let label = loose::text(obj, &["label", "title", "question"])
        .map(str::to_string)
        .unwrap_or_else(|| loose::humanize(&base));

    let validation = match obj.get("validation") {
        Some(Value::Object(rules)) => map_validation(rules),
        Some(Value::Null) | None => Map::new(),
        Some(other) => {
            warn!(field = %id, kind = loose::kind_name(other), "ignoring non-object validation");
            Map::new()
        }
    };

    Element {
        field_type,
        label,
        required: loose::flag(obj, &["required", "isRequired"]).unwrap_or(false),
        placeholder: loose::text(obj, &["placeholder"]).map(str::to_string),
        help_text: loose::text(obj, &["help_text", "helpText", "description", "hint"])
            .map(str::to_string),
        options: loose::array(obj, &["options", "choices"])
            .map(|items| items.iter().filter_map(parse_option).collect())
            .unwrap_or_default(),
        validation,
        min: loose::number(obj, &["min"]),
        max: loose::number(obj, &["max"]),
        step: loose::number(obj, &["step"]),
        rows: loose::number(obj, &["rows"])
            .filter(|r| *r >= 1.0)
            .map(|r| r as u32),
        accept: obj.get("accept").map(parse_accept).unwrap_or_default(),
        id,
    }
}

fn parse_option(raw: &Value) -> Option<FieldOption> {
    match raw {
        Value::String(s) if !s.trim().is_empty() => {
            Some(FieldOption::new(s.trim(), s.trim()))
        }
        Value::Number(n) => Some(FieldOption::new(n.to_string(), n.to_string())),
        Value::Object(obj) => {
            let label = loose::text(obj, &["label", "text", "name"]).map(str::to_string);
            let value = loose::scalar(obj, &["value", "id", "key"]);
            match (label, value) {
                (Some(label), Some(value)) => Some(FieldOption::new(label, value)),
                (Some(only), None) | (None, Some(only)) => Some(FieldOption::new(only.clone(), only)),
                (None, None) => None,
            }
        }
        _ => None,
    }
}

fn parse_accept(raw: &Value) -> Vec<String> {
    let parts: Vec<&str> = match raw {
        Value::String(s) => s.split(',').collect(),
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };
    parts
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
