//! Plain-text rendering of validation issues and evaluated field states.
//!
//! `render_*` build the text so it can be tested; `print_*` write it to
//! stdout.

use formloom_core::{Answers, FormSchema, ValidationIssue, evaluate, fired_triggers};

const LABEL_WIDTH: usize = 28;

// ── Public API ──

pub fn print_issues(issues: &[ValidationIssue]) {
    print!("{}", render_issues(issues));
}

pub fn print_evaluation(schema: &FormSchema, answers: &Answers) {
    print!("{}", render_evaluation(schema, answers));
}

// ── Rendering ──

pub fn render_issues(issues: &[ValidationIssue]) -> String {
    if issues.is_empty() {
        return "No issues found.\n".to_string();
    }
    let width = issues
        .iter()
        .map(|i| i.location.len())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for issue in issues {
        out.push_str(&format!(
            "{:<7}  {:<width$}  {}\n",
            issue.severity.to_string(),
            issue.location,
            issue.message,
        ));
    }
    out
}

/// One card per section: each field with its visible, required and disabled
/// state, followed by the section's fired triggers.
pub fn render_evaluation(schema: &FormSchema, answers: &Answers) -> String {
    let mut out = format!("=== {} ===\n", schema.title);
    for section in &schema.sections {
        out.push_str(&format!("\n-- {} --\n", section.title));
        for field in &section.fields {
            let state = evaluate(field, answers);
            out.push_str(&format!(
                "  {:<LABEL_WIDTH$} {}{}{}\n",
                truncate(&field.id, LABEL_WIDTH),
                if state.visible { "visible" } else { "hidden" },
                if state.required { ", required" } else { "" },
                if state.disabled { ", disabled" } else { "" },
            ));
        }
        for trigger in fired_triggers(section, answers) {
            if trigger.tags.is_empty() {
                out.push_str(&format!("  trigger {} fired\n", trigger.id));
            } else {
                out.push_str(&format!(
                    "  trigger {} fired: {}\n",
                    trigger.id,
                    trigger.tags.join(", ")
                ));
            }
        }
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let head: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{head}…")
}

#[cfg(test)]
mod tests {
    use super::*;
    use formloom_core::{
        Condition, ConditionalRule, Field, FieldType, Operator, RuleEffect, Section,
        SectionTrigger, Severity, validate_schema,
    };
    use serde_json::json;

    fn schema() -> FormSchema {
        let mut schema = FormSchema::new("Screening");
        let mut section = Section::new("s1", "About you");
        section.fields.push(Field::with_id("age", FieldType::Number));
        let mut senior = Field::with_id("senior_discount", FieldType::Checkbox);
        senior.conditions.push(ConditionalRule::new(
            RuleEffect::Show,
            Condition::compare("age", Operator::GreaterThan, 65),
        ));
        senior.conditions.push(ConditionalRule::new(
            RuleEffect::Require,
            Condition::compare("age", Operator::GreaterThan, 80),
        ));
        section.fields.push(senior);
        section.renumber_fields();
        section.triggers.push(SectionTrigger {
            id: "t_senior".into(),
            when: Condition::compare("age", Operator::GreaterThan, 65),
            tags: vec!["senior".into(), "discount".into()],
        });
        schema.sections.push(section);
        schema
    }

    #[test]
    fn evaluation_lists_states_and_triggers() {
        let answers = json!({"age": 85}).as_object().unwrap().clone();
        let text = render_evaluation(&schema(), &answers);
        assert!(text.starts_with("=== Screening ==="));
        assert!(text.contains("senior_discount"));
        assert!(text.contains("visible, required"));
        assert!(text.contains("trigger t_senior fired: senior, discount"));
    }

    #[test]
    fn missing_answer_hides_and_fires_nothing() {
        let text = render_evaluation(&schema(), &Answers::new());
        assert!(text.contains("hidden"));
        assert!(!text.contains("trigger"));
    }

    #[test]
    fn issues_are_aligned_rows() {
        let issues = validate_schema(&FormSchema::new(""));
        let text = render_issues(&issues);
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().all(|l| l.starts_with("error")));
        assert_eq!(issues[0].severity, Severity::Error);
    }

    #[test]
    fn no_issues_message() {
        assert_eq!(render_issues(&[]), "No issues found.\n");
    }

    #[test]
    fn long_ids_are_truncated() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
