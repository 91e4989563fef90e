//! Format detection: an ordered list of adapters, each pairing a shape
//! predicate with a transform into canonical pages.
//!
//! The first adapter whose [`FormatAdapter::matches`] accepts the input wins,
//! so more specific shapes come first.

use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::element::{IdAllocator, PageElements};
use crate::loose::{self, Object};
use crate::mapping::{map_logic, map_operator};
use crate::model::{Page, SourceFormat};

/// Completion action types in the order they run. Unlisted types follow
/// alphabetically.
pub const COMPLETION_ORDER: [&str; 6] = [
    "message",
    "email",
    "sms",
    "webhook",
    "notification",
    "redirect",
];

const FIELD_KEYS: &[&str] = &["elements", "fields", "questions"];

/// Pages, conditionals and completion actions extracted from one document.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Layout {
    pub pages: Vec<Page>,
    pub conditionals: Vec<Value>,
    pub completion_actions: Vec<Value>,
}

pub trait FormatAdapter: Sync {
    fn format(&self) -> SourceFormat;

    fn matches(&self, input: &Object) -> bool;

    /// Lenient: malformed pieces are skipped or defaulted, never fatal.
    fn transform(&self, input: &Object) -> Layout;
}

const ADAPTERS: &[&dyn FormatAdapter] = &[&PageBased, &StepBased, &SimpleObject];

/// The first adapter that accepts `input`.
pub fn detect(input: &Object) -> Option<&'static dyn FormatAdapter> {
    ADAPTERS.iter().copied().find(|a| a.matches(input))
}

// ── Page-based ──

/// `{"pages": [{"id", "title", "elements": [...]}]}`.
pub struct PageBased;

impl FormatAdapter for PageBased {
    fn format(&self) -> SourceFormat {
        SourceFormat::PageBased
    }

    fn matches(&self, input: &Object) -> bool {
        input.get("pages").is_some_and(Value::is_array)
    }

    fn transform(&self, input: &Object) -> Layout {
        let mut layout = Layout {
            conditionals: verbatim(input, &["conditionals"]),
            completion_actions: verbatim(input, &["completionActions", "completion_actions"]),
            ..Layout::default()
        };
        let mut element_ids = IdAllocator::default();
        let mut page_ids = IdAllocator::default();
        for (i, raw) in loose::array(input, &["pages"]).into_iter().flatten().enumerate() {
            let Some(obj) = raw.as_object() else {
                warn!(page = i + 1, "skipping page that is not an object");
                continue;
            };
            layout
                .pages
                .push(build_page(obj, i + 1, false, &mut page_ids, &mut element_ids));
        }
        layout
    }
}

// ── Step-based ──

/// `{"steps": [...]}` with per-step `conditionalLogic`, grouped fields and
/// `completion` blocks.
pub struct StepBased;

impl FormatAdapter for StepBased {
    fn format(&self) -> SourceFormat {
        SourceFormat::StepBased
    }

    fn matches(&self, input: &Object) -> bool {
        input.get("steps").is_some_and(Value::is_array)
    }

    fn transform(&self, input: &Object) -> Layout {
        let mut layout = Layout {
            conditionals: verbatim(input, &["conditionals"]),
            completion_actions: verbatim(input, &["completionActions", "completion_actions"]),
            ..Layout::default()
        };
        let mut element_ids = IdAllocator::default();
        let mut page_ids = IdAllocator::default();
        for (i, raw) in loose::array(input, &["steps"]).into_iter().flatten().enumerate() {
            let Some(obj) = raw.as_object() else {
                warn!(step = i + 1, "skipping step that is not an object");
                continue;
            };
            let page = build_page(obj, i + 1, true, &mut page_ids, &mut element_ids);

            if let Some(logic) = loose::first(obj, &["conditionalLogic", "conditional_logic"]) {
                layout.conditionals.extend(translate_logic(logic, &page.id));
            }
            if let Some(completion) = obj.get("completion").and_then(Value::as_object) {
                let start = layout.completion_actions.len();
                layout
                    .completion_actions
                    .extend(completion_actions(completion, &page.id, start));
            }
            layout.pages.push(page);
        }
        layout
    }
}

/// Translate a step's `conditionalLogic` (one rule object, a `rules` +
/// `logic` object, or an array of either) into canonical conditionals.
pub(crate) fn translate_logic(logic: &Value, page_id: &str) -> Vec<Value> {
    let blocks: Vec<&Object> = match logic {
        Value::Object(obj) => vec![obj],
        Value::Array(items) => items.iter().filter_map(Value::as_object).collect(),
        other => {
            warn!(page = page_id, kind = loose::kind_name(other), "ignoring conditionalLogic");
            Vec::new()
        }
    };
    blocks
        .into_iter()
        .enumerate()
        .filter_map(|(i, block)| translate_block(block, page_id, i + 1))
        .collect()
}

fn translate_block(block: &Object, page_id: &str, n: usize) -> Option<Value> {
    let rules: Vec<Value> = match loose::array(block, &["rules", "conditions"]) {
        Some(items) => items
            .iter()
            .filter_map(Value::as_object)
            .filter_map(translate_rule)
            .collect(),
        None => translate_rule(block).into_iter().collect(),
    };
    if rules.is_empty() {
        warn!(page = page_id, block = n, "conditional logic without usable rules");
        return None;
    }

    let id = loose::text(block, &["id"])
        .map(str::to_string)
        .unwrap_or_else(|| format!("cond_{page_id}_{n}"));
    let action = loose::text(block, &["action", "effect"])
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| "show".to_string());
    let target = loose::text(block, &["target", "targetStep", "goTo", "goto", "nextStep"])
        .unwrap_or(page_id);

    Some(json!({
        "id": id,
        "page": page_id,
        "logic": map_logic(loose::text(block, &["logic", "combinator", "match"])),
        "rules": rules,
        "action": action,
        "target": target,
    }))
}

fn translate_rule(rule: &Object) -> Option<Value> {
    let field = loose::text(rule, &["field", "fieldId", "field_id", "question"])?;
    let operator = map_operator(loose::text(rule, &["operator", "op", "condition"]).unwrap_or("equals"));
    Some(json!({
        "field": field,
        "operator": operator,
        "value": rule.get("value").cloned().unwrap_or(Value::Null),
    }))
}

/// Ordered `{type, step, order, config}` entries from a `completion` object
/// keyed by action type. `start` is the first `order` value to assign.
pub(crate) fn completion_actions(completion: &Object, page_id: &str, start: usize) -> Vec<Value> {
    let rank = |key: &str| {
        COMPLETION_ORDER
            .iter()
            .position(|known| *known == key)
            .unwrap_or(COMPLETION_ORDER.len())
    };
    let mut keys: Vec<&String> = completion.keys().collect();
    keys.sort_by(|a, b| rank(a).cmp(&rank(b)).then_with(|| a.cmp(b)));
    keys.into_iter()
        .enumerate()
        .map(|(i, key)| {
            json!({
                "type": key,
                "step": page_id,
                "order": start + i,
                "config": completion[key],
            })
        })
        .collect()
}

// ── Simple object ──

/// A bare field map: `{"fields": {...}}`, `{"fields": [...]}`, or top-level
/// keys whose values are objects with a `type`.
pub struct SimpleObject;

pub const SIMPLE_PAGE_ID: &str = "page_1";

impl FormatAdapter for SimpleObject {
    fn format(&self) -> SourceFormat {
        SourceFormat::SimpleObject
    }

    fn matches(&self, input: &Object) -> bool {
        input
            .get("fields")
            .is_some_and(|f| f.is_object() || f.is_array())
            || flat_fields(input).next().is_some()
    }

    fn transform(&self, input: &Object) -> Layout {
        let mut element_ids = IdAllocator::default();
        let mut elements = PageElements::new(1, false, &mut element_ids);
        match input.get("fields") {
            Some(fields @ (Value::Object(_) | Value::Array(_))) => elements.extend(fields),
            _ => {
                for (key, raw) in flat_fields(input) {
                    elements.push(Some(key), raw);
                }
            }
        }
        let elements = elements.finish();
        debug!(elements = elements.len(), "wrapped field map in a single page");

        Layout {
            pages: vec![Page {
                id: SIMPLE_PAGE_ID.to_string(),
                title: "Page 1".to_string(),
                description: String::new(),
                elements,
            }],
            conditionals: verbatim(input, &["conditionals"]),
            completion_actions: verbatim(input, &["completionActions", "completion_actions"]),
        }
    }
}

/// Top-level keys that carry document metadata, never fields.
const RESERVED_KEYS: &[&str] = &[
    "flowConfig",
    "flow_config",
    "validation",
    "conditionals",
    "completionActions",
    "completion_actions",
    "title",
    "name",
    "description",
    "category",
    "categoryId",
    "category_id",
    "settings",
];

fn flat_fields(input: &Object) -> impl Iterator<Item = (&str, &Value)> {
    input.iter().filter_map(|(k, v)| {
        if RESERVED_KEYS.contains(&k.as_str()) {
            return None;
        }
        let typed = v.as_object()?.get("type")?.is_string();
        typed.then_some((k.as_str(), v))
    })
}

// ── Shared ──

fn build_page(
    obj: &Object,
    page_no: usize,
    flatten_groups: bool,
    page_ids: &mut IdAllocator,
    element_ids: &mut IdAllocator,
) -> Page {
    let default_id = format!("page_{page_no}");
    let id = page_ids.claim(loose::text(obj, &["id"]).unwrap_or(&default_id));
    let title = loose::text(obj, &["title", "name"])
        .map(str::to_string)
        .unwrap_or_else(|| format!("Page {page_no}"));

    let mut elements = PageElements::new(page_no, flatten_groups, element_ids);
    if let Some(source) = FIELD_KEYS.iter().find_map(|k| obj.get(*k)) {
        elements.extend(source);
    }

    Page {
        id,
        title,
        description: loose::text(obj, &["description"]).unwrap_or_default().to_string(),
        elements: elements.finish(),
    }
}

fn verbatim(input: &Object, keys: &[&str]) -> Vec<Value> {
    loose::array(input, keys).cloned().unwrap_or_default()
}
