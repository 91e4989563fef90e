//! Conditional rules and their evaluator.
//!
//! A field carries a list of [`ConditionalRule`]s. Each rule has an effect
//! (show, hide, require, disable) and a condition tree built from
//! `{field, operator, value}` comparisons combined with `all` (AND) and
//! `any` (OR). Conditions are evaluated against an answer map keyed by field
//! id.
//!
//! # Missing answers
//!
//! A comparison whose field has no entry in the answer map evaluates to
//! `false`, whatever the operator. A `show` rule over a missing answer
//! therefore hides its field, and a `hide`, `require` or `disable` rule over
//! a missing answer does not fire.
//!
//! The evaluator is pure and keeps no state between calls.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::field::Field;
use crate::schema::{Section, SectionTrigger};

/// Answer data keyed by field id.
pub type Answers = Map<String, Value>;

/// What a rule changes about its field when its condition holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleEffect {
    Show,
    Hide,
    Require,
    Disable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    Contains,
    IsEmpty,
    IsNotEmpty,
}

/// Boolean condition tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    All(Vec<Condition>),
    Any(Vec<Condition>),
    Compare {
        field: String,
        operator: Operator,
        #[serde(default)]
        value: Value,
    },
}

impl Condition {
    pub fn compare(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Condition::Compare {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Every field id referenced by a comparison in this tree.
    pub fn referenced_fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Condition::All(children) | Condition::Any(children) => {
                for child in children {
                    child.collect_fields(out);
                }
            }
            Condition::Compare { field, .. } => out.push(field),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalRule {
    pub id: String,
    pub effect: RuleEffect,
    pub condition: Condition,
}

impl ConditionalRule {
    pub fn new(effect: RuleEffect, condition: Condition) -> Self {
        Self {
            id: crate::ids::new_id("rule"),
            effect,
            condition,
        }
    }
}

/// Effective presentation state of a field for one answer map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldState {
    pub visible: bool,
    pub required: bool,
    pub disabled: bool,
}

/// Whether the field should be rendered.
///
/// `true` when the field has no show/hide rules. Otherwise every `show` rule
/// must hold and no `hide` rule may hold.
pub fn should_show(field: &Field, answers: &Answers) -> bool {
    field.conditions.iter().all(|rule| match rule.effect {
        RuleEffect::Show => evaluate_condition(&rule.condition, answers),
        RuleEffect::Hide => !evaluate_condition(&rule.condition, answers),
        RuleEffect::Require | RuleEffect::Disable => true,
    })
}

/// The field's static `required` flag, or any `require` rule that holds.
pub fn should_require(field: &Field, answers: &Answers) -> bool {
    field.required || any_rule_holds(field, RuleEffect::Require, answers)
}

/// The field's static `disabled` flag, or any `disable` rule that holds.
pub fn should_disable(field: &Field, answers: &Answers) -> bool {
    field.disabled || any_rule_holds(field, RuleEffect::Disable, answers)
}

pub fn evaluate(field: &Field, answers: &Answers) -> FieldState {
    FieldState {
        visible: should_show(field, answers),
        required: should_require(field, answers),
        disabled: should_disable(field, answers),
    }
}

fn any_rule_holds(field: &Field, effect: RuleEffect, answers: &Answers) -> bool {
    field
        .conditions
        .iter()
        .filter(|rule| rule.effect == effect)
        .any(|rule| evaluate_condition(&rule.condition, answers))
}

/// Evaluate a condition tree, short-circuiting left to right.
///
/// An empty `all` holds; an empty `any` does not.
pub fn evaluate_condition(condition: &Condition, answers: &Answers) -> bool {
    match condition {
        Condition::All(children) => children.iter().all(|c| evaluate_condition(c, answers)),
        Condition::Any(children) => children.iter().any(|c| evaluate_condition(c, answers)),
        Condition::Compare {
            field,
            operator,
            value,
        } => match answers.get(field) {
            Some(answer) => compare(answer, *operator, value),
            None => false,
        },
    }
}

/// Section triggers whose condition holds, in declaration order.
pub fn fired_triggers<'a>(section: &'a Section, answers: &Answers) -> Vec<&'a SectionTrigger> {
    section
        .triggers
        .iter()
        .filter(|trigger| evaluate_condition(&trigger.when, answers))
        .collect()
}

fn compare(answer: &Value, operator: Operator, expected: &Value) -> bool {
    match operator {
        Operator::Equals => loose_eq(answer, expected),
        Operator::NotEquals => !loose_eq(answer, expected),
        Operator::GreaterThan => match (as_number(answer), as_number(expected)) {
            (Some(a), Some(b)) => a > b,
            _ => false,
        },
        Operator::LessThan => match (as_number(answer), as_number(expected)) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        },
        Operator::Contains => match answer {
            Value::String(s) => s.contains(scalar_text(expected).as_str()),
            Value::Array(items) => items.iter().any(|item| loose_eq(item, expected)),
            _ => false,
        },
        Operator::IsEmpty => is_empty(answer),
        Operator::IsNotEmpty => !is_empty(answer),
    }
}

/// Numbers compare numerically, with numeric strings coerced; everything
/// else falls back to structural equality.
fn loose_eq(a: &Value, b: &Value) -> bool {
    if (a.is_number() || b.is_number())
        && let (Some(x), Some(y)) = (as_number(a), as_number(b))
    {
        return x == y;
    }
    a == b
}

fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn scalar_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_empty(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;
    use serde_json::json;

    fn answers(v: Value) -> Answers {
        v.as_object().cloned().unwrap()
    }

    fn field_with(rules: Vec<ConditionalRule>) -> Field {
        let mut field = Field::with_id("follow_up", FieldType::Text);
        field.conditions = rules;
        field
    }

    fn senior_rule() -> ConditionalRule {
        ConditionalRule::new(
            RuleEffect::Show,
            Condition::compare("age", Operator::GreaterThan, 65),
        )
    }

    #[test]
    fn show_rule_over_threshold() {
        let field = field_with(vec![senior_rule()]);
        assert!(should_show(&field, &answers(json!({"age": 70}))));
        assert!(!should_show(&field, &answers(json!({"age": 40}))));
    }

    #[test]
    fn missing_answer_hides_show_rule_field() {
        let field = field_with(vec![senior_rule()]);
        assert!(!should_show(&field, &Answers::new()));
    }

    #[test]
    fn missing_answer_does_not_fire_hide_rule() {
        let field = field_with(vec![ConditionalRule::new(
            RuleEffect::Hide,
            Condition::compare("consent", Operator::Equals, "no"),
        )]);
        assert!(should_show(&field, &Answers::new()));
        assert!(!should_show(&field, &answers(json!({"consent": "no"}))));
    }

    #[test]
    fn missing_answer_is_not_empty_either() {
        let cond = Condition::compare("notes", Operator::IsEmpty, Value::Null);
        assert!(!evaluate_condition(&cond, &Answers::new()));
        assert!(evaluate_condition(&cond, &answers(json!({"notes": "  "}))));
    }

    #[test]
    fn no_rules_yields_static_defaults() {
        let mut field = field_with(Vec::new());
        field.required = true;
        let state = evaluate(&field, &Answers::new());
        assert_eq!(
            state,
            FieldState {
                visible: true,
                required: true,
                disabled: false
            }
        );
    }

    #[test]
    fn require_and_disable_rules() {
        let field = field_with(vec![
            ConditionalRule::new(
                RuleEffect::Require,
                Condition::compare("smoker", Operator::Equals, true),
            ),
            ConditionalRule::new(
                RuleEffect::Disable,
                Condition::compare("locked", Operator::IsNotEmpty, Value::Null),
            ),
        ]);
        let a = answers(json!({"smoker": true}));
        assert!(should_require(&field, &a));
        assert!(!should_disable(&field, &a));

        let b = answers(json!({"smoker": false, "locked": "yes"}));
        assert!(!should_require(&field, &b));
        assert!(should_disable(&field, &b));
    }

    #[test]
    fn static_required_is_not_undone_by_rules() {
        let mut field = field_with(vec![ConditionalRule::new(
            RuleEffect::Require,
            Condition::compare("x", Operator::Equals, 1),
        )]);
        field.required = true;
        assert!(should_require(&field, &Answers::new()));
    }

    #[test]
    fn all_and_any_short_circuit_semantics() {
        let a = answers(json!({"age": 30, "country": "UK"}));
        let all = Condition::All(vec![
            Condition::compare("age", Operator::GreaterThan, 18),
            Condition::compare("country", Operator::Equals, "UK"),
        ]);
        assert!(evaluate_condition(&all, &a));

        let any = Condition::Any(vec![
            Condition::compare("age", Operator::LessThan, 18),
            Condition::compare("country", Operator::Equals, "FR"),
        ]);
        assert!(!evaluate_condition(&any, &a));

        assert!(evaluate_condition(&Condition::All(vec![]), &a));
        assert!(!evaluate_condition(&Condition::Any(vec![]), &a));
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let a = answers(json!({"age": "70"}));
        assert!(evaluate_condition(
            &Condition::compare("age", Operator::GreaterThan, 65),
            &a
        ));
        assert!(evaluate_condition(
            &Condition::compare("age", Operator::Equals, 70),
            &a
        ));
        assert!(!evaluate_condition(
            &Condition::compare("age", Operator::GreaterThan, "lots"),
            &a
        ));
    }

    #[test]
    fn contains_on_strings_and_arrays() {
        let a = answers(json!({"goals": ["sleep", "weight"], "bio": "runs daily"}));
        assert!(evaluate_condition(
            &Condition::compare("goals", Operator::Contains, "weight"),
            &a
        ));
        assert!(!evaluate_condition(
            &Condition::compare("goals", Operator::Contains, "diet"),
            &a
        ));
        assert!(evaluate_condition(
            &Condition::compare("bio", Operator::Contains, "daily"),
            &a
        ));
    }

    #[test]
    fn not_equals_and_emptiness() {
        let a = answers(json!({"plan": "basic", "tags": [], "extra": {}}));
        assert!(evaluate_condition(
            &Condition::compare("plan", Operator::NotEquals, "pro"),
            &a
        ));
        assert!(evaluate_condition(
            &Condition::compare("tags", Operator::IsEmpty, Value::Null),
            &a
        ));
        assert!(evaluate_condition(
            &Condition::compare("extra", Operator::IsEmpty, Value::Null),
            &a
        ));
        assert!(!evaluate_condition(
            &Condition::compare("plan", Operator::IsEmpty, Value::Null),
            &a
        ));
    }

    #[test]
    fn condition_wire_format() {
        let cond: Condition = serde_json::from_value(json!({
            "any": [
                {"compare": {"field": "age", "operator": "greater_than", "value": 65}},
                {"all": []}
            ]
        }))
        .unwrap();
        assert_eq!(cond.referenced_fields(), vec!["age"]);
    }
}
