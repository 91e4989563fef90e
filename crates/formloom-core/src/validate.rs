//! Static schema validation.
//!
//! Produces a list of issues; never fails. Callers decide what to block on
//! (e.g. refuse to publish while any [`Severity::Error`] is present).

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::field::Field;
use crate::schema::FormSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Dotted path to the offending element, e.g. `sections.<id>`.
    pub location: String,
    pub message: String,
    pub severity: Severity,
}

impl ValidationIssue {
    fn error(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
            severity: Severity::Error,
        }
    }

    fn warning(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
            severity: Severity::Warning,
        }
    }
}

pub fn validate_schema(schema: &FormSchema) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if schema.title.trim().is_empty() {
        issues.push(ValidationIssue::error("title", "Form title is required"));
    }
    if schema.sections.is_empty() {
        issues.push(ValidationIssue::error(
            "sections",
            "Form must have at least one section",
        ));
    }

    let known = schema.field_ids();
    for section in &schema.sections {
        if section.fields.is_empty() {
            issues.push(ValidationIssue::warning(
                format!("sections.{}", section.id),
                format!("Section \"{}\" has no fields", section.title),
            ));
        }
        for trigger in &section.triggers {
            for referenced in trigger.when.referenced_fields() {
                if !known.contains(referenced) {
                    issues.push(ValidationIssue::warning(
                        format!("sections.{}.triggers.{}", section.id, trigger.id),
                        format!("Trigger references unknown field \"{referenced}\""),
                    ));
                }
            }
        }
        for field in &section.fields {
            check_field(field, &known, &mut issues);
        }
    }

    issues
}

fn check_field(field: &Field, known: &HashSet<&str>, issues: &mut Vec<ValidationIssue>) {
    let location = format!("fields.{}", field.id);

    if let Some(options) = field.kind.options() {
        if options.is_empty() {
            issues.push(ValidationIssue::warning(
                &location,
                format!("Field \"{}\" has no options", field.label),
            ));
        }
        let mut seen = HashSet::new();
        for option in options {
            if !seen.insert(option.value.as_str()) {
                issues.push(ValidationIssue::warning(
                    format!("{location}.options"),
                    format!("Duplicate option value \"{}\"", option.value),
                ));
            }
        }
    }

    if !field.kind.has_finite_numbers() {
        issues.push(ValidationIssue::error(
            &location,
            "Numeric bounds and step must be finite numbers",
        ));
    }

    if let Some((Some(min), Some(max))) = field.kind.bounds()
        && min > max
    {
        issues.push(ValidationIssue::error(
            &location,
            format!("Minimum {min} is greater than maximum {max}"),
        ));
    }

    for rule in &field.conditions {
        for referenced in rule.condition.referenced_fields() {
            if !known.contains(referenced) {
                issues.push(ValidationIssue::warning(
                    format!("{location}.conditions.{}", rule.id),
                    format!("Rule references unknown field \"{referenced}\""),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldKind, FieldOption, FieldType};
    use crate::rules::{Condition, ConditionalRule, Operator, RuleEffect};
    use crate::schema::Section;

    fn with_section(fields: Vec<Field>) -> FormSchema {
        let mut schema = FormSchema::new("Intake");
        let mut section = Section::new("s1", "Main");
        section.fields = fields;
        section.renumber_fields();
        schema.sections.push(section);
        schema
    }

    #[test]
    fn empty_title_and_no_sections_are_errors() {
        let schema = FormSchema::new("   ");
        let issues = validate_schema(&schema);
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.severity == Severity::Error));
        assert_eq!(issues[0].location, "title");
        assert_eq!(issues[1].location, "sections");
    }

    #[test]
    fn empty_section_is_warning() {
        let schema = with_section(Vec::new());
        let issues = validate_schema(&schema);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].location, "sections.s1");
    }

    #[test]
    fn valid_schema_has_no_issues() {
        let schema = with_section(vec![Field::with_id("name", FieldType::Text)]);
        assert!(validate_schema(&schema).is_empty());
    }

    #[test]
    fn duplicate_option_values_warn() {
        let mut field = Field::with_id("colour", FieldType::Radio);
        field.kind = FieldKind::Radio {
            options: vec![FieldOption::new("Red", "red"), FieldOption::new("Crimson", "red")],
        };
        let issues = validate_schema(&with_section(vec![field]));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].location, "fields.colour.options");
    }

    #[test]
    fn non_finite_bounds_are_error() {
        let mut field = Field::with_id("score", FieldType::Number);
        field.kind = FieldKind::Number {
            min: Some(f64::NAN),
            max: Some(10.0),
            step: None,
        };
        let issues = validate_schema(&with_section(vec![field]));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Error);
        assert!(issues[0].message.contains("finite"));
    }

    #[test]
    fn inverted_bounds_are_error() {
        let mut field = Field::with_id("score", FieldType::Range);
        field.kind = FieldKind::Range {
            min: 10.0,
            max: 1.0,
            step: 1.0,
        };
        let issues = validate_schema(&with_section(vec![field]));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Error);
    }

    #[test]
    fn dangling_rule_reference_warns() {
        let mut field = Field::with_id("follow_up", FieldType::Text);
        field.conditions.push(ConditionalRule::new(
            RuleEffect::Show,
            Condition::compare("ghost", Operator::Equals, 1),
        ));
        let issues = validate_schema(&with_section(vec![field]));
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("ghost"));
    }
}
