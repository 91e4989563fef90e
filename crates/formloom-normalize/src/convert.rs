//! Build an editable [`FormSchema`] from a normalization result.

use formloom_core::{
    Condition, ConditionalRule, Field, FieldKind, FieldValidation, FormSchema, Operator,
    RuleEffect, Section,
};
use serde_json::{Map, Value};
use tracing::debug;

use crate::loose::{self, as_f64};
use crate::model::{Element, NormalizationResult};

impl NormalizationResult {
    /// One section per page and one field per element. Conditionals whose
    /// target is a field and whose action is a field effect become rules on
    /// that field; page-level conditionals stay in `form_data` only.
    pub fn to_schema(&self) -> FormSchema {
        let data = &self.form_data;
        let mut schema = FormSchema::new(self.title.clone());
        schema.description = self.description.clone();
        schema.version = data.flow_config.version.clone();
        schema.category = self.service_type.map(|s| s.as_str().to_string());
        schema.settings.multi_step = data.pages.len() > 1;
        schema.settings.success_message = data.flow_config.completion_message.clone();

        schema.sections = data
            .pages
            .iter()
            .map(|page| {
                let mut section = Section::new(page.id.clone(), page.title.clone());
                section.description = page.description.clone();
                section.fields = page.elements.iter().map(to_field).collect();
                section.renumber_fields();
                section
            })
            .collect();
        schema.renumber_sections();

        for conditional in &data.conditionals {
            let Some((target, rule)) = field_rule(conditional) else {
                continue;
            };
            match schema.field_mut(target) {
                Some(field) => field.conditions.push(rule),
                None => debug!(target, "conditional does not target a field"),
            }
        }
        schema
    }
}

fn to_field(element: &Element) -> Field {
    let mut field = Field::with_id(element.id.clone(), element.field_type);
    field.label = element.label.clone();
    field.required = element.required;
    field.placeholder = element.placeholder.clone().unwrap_or_default();
    field.help_text = element.help_text.clone();

    let rules = &element.validation;
    let lower = element.min.or_else(|| rules.get("min").and_then(as_f64));
    let upper = element.max.or_else(|| rules.get("max").and_then(as_f64));

    match &mut field.kind {
        FieldKind::Number { min, max, step } => {
            *min = lower;
            *max = upper;
            *step = element.step;
        }
        FieldKind::Range { min, max, step } => {
            *min = lower.unwrap_or(*min);
            *max = upper.unwrap_or(*max);
            *step = element.step.unwrap_or(*step);
        }
        FieldKind::Textarea { rows } => {
            *rows = element.rows.unwrap_or(*rows);
        }
        FieldKind::Rating { max } => {
            if let Some(upper) = upper.filter(|m| *m >= 1.0) {
                *max = upper as u32;
            }
        }
        FieldKind::File { accept, .. } => {
            accept.clone_from(&element.accept);
        }
        _ => {}
    }
    if let Some(options) = field.kind.options_mut() {
        options.clone_from(&element.options);
    }

    let validation = field_validation(rules);
    field.validation = (!validation.is_empty()).then_some(validation);
    field
}

fn field_validation(rules: &Map<String, Value>) -> FieldValidation {
    let length = |key: &str| {
        rules
            .get(key)
            .and_then(as_f64)
            .filter(|n| *n >= 0.0)
            .map(|n| n as u32)
    };
    FieldValidation {
        min_length: length("min_length"),
        max_length: length("max_length"),
        pattern: loose::text(rules, &["pattern"]).map(str::to_string),
        message: loose::text(rules, &["message"]).map(str::to_string),
    }
}

/// `(target field id, rule)` for a canonical conditional with a field-level
/// action and parseable rules.
fn field_rule(conditional: &Value) -> Option<(&str, ConditionalRule)> {
    let obj = conditional.as_object()?;
    let effect = match loose::text(obj, &["action"])? {
        "show" => RuleEffect::Show,
        "hide" => RuleEffect::Hide,
        "require" => RuleEffect::Require,
        "disable" => RuleEffect::Disable,
        _ => return None,
    };
    let target = loose::text(obj, &["target"])?;

    let comparisons: Vec<Condition> = loose::array(obj, &["rules"])?
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|rule| {
            let field = loose::text(rule, &["field"])?;
            let operator: Operator =
                serde_json::from_value(rule.get("operator")?.clone()).ok()?;
            let value = rule.get("value").cloned().unwrap_or(Value::Null);
            Some(Condition::compare(field, operator, value))
        })
        .collect();
    if comparisons.is_empty() {
        return None;
    }
    let condition = match loose::text(obj, &["logic"]) {
        Some("or") => Condition::Any(comparisons),
        _ => Condition::All(comparisons),
    };
    Some((target, ConditionalRule::new(effect, condition)))
}
