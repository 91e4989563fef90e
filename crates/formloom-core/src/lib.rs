//! Core types for Formloom: the form schema document, field kinds,
//! conditional rules and their evaluator, and static schema validation.

pub mod error;
pub mod field;
pub mod ids;
pub mod rules;
pub mod schema;
pub mod validate;

pub use error::IntegrityError;
pub use field::{Field, FieldKind, FieldOption, FieldType, FieldValidation, FieldWidth};
pub use rules::{
    Answers, Condition, ConditionalRule, FieldState, Operator, RuleEffect, evaluate,
    evaluate_condition, fired_triggers, should_disable, should_require, should_show,
};
pub use schema::{FormSchema, FormSettings, Section, SectionTrigger};
pub use validate::{Severity, ValidationIssue, validate_schema};
