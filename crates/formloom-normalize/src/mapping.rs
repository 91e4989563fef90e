//! Fixed alias tables from loosely-named source vocabulary to canonical names.

use formloom_core::FieldType;
use serde_json::{Map, Value};
use tracing::warn;

use crate::loose::compact;
use crate::model::ServiceType;

/// Canonical field type for a source type name, or `None` when the name is
/// not in the table. Canonical names map to themselves.
pub fn map_field_type(source: &str) -> Option<FieldType> {
    let key = compact(source);
    let mapped = match key.as_str() {
        "text" | "input" | "textbox" | "textfield" | "string" | "shorttext" | "shortanswer" => {
            FieldType::Text
        }
        "textarea" | "longtext" | "longanswer" | "paragraph" | "multiline" | "comment"
        | "comments" => FieldType::Textarea,
        "email" | "emailaddress" => FieldType::Email,
        "tel" | "phone" | "telephone" | "phonenumber" | "mobile" => FieldType::Tel,
        "number" | "numeric" | "integer" | "int" | "float" | "decimal" => FieldType::Number,
        "password" => FieldType::Password,
        "url" | "link" | "website" | "uri" => FieldType::Url,
        "date" | "datepicker" | "dob" | "birthdate" => FieldType::Date,
        "datetime" | "datetimelocal" | "timestamp" => FieldType::DateTime,
        "time" | "timepicker" => FieldType::Time,
        "select" | "dropdown" | "combobox" | "picklist" => FieldType::Select,
        "multiselect" | "multipleselect" | "multidropdown" | "tags" => FieldType::Multiselect,
        "radio" | "radiobutton" | "radiobuttons" | "radiogroup" | "singlechoice"
        | "multiplechoice" | "yesno" => FieldType::Radio,
        "checkbox" | "checkboxes" | "checkboxgroup" | "boolean" | "bool" | "toggle"
        | "consent" => FieldType::Checkbox,
        "file" | "fileupload" | "upload" | "attachment" | "image" => FieldType::File,
        "range" | "slider" => FieldType::Range,
        "color" | "colour" | "colorpicker" => FieldType::Color,
        "hidden" => FieldType::Hidden,
        "sectionheader" | "heading" | "header" | "title" => FieldType::SectionHeader,
        "divider" | "separator" | "hr" => FieldType::Divider,
        "htmlcontent" | "html" | "content" | "statictext" | "info" => FieldType::HtmlContent,
        "signature" | "esignature" => FieldType::Signature,
        "rating" | "stars" | "starrating" => FieldType::Rating,
        "matrix" | "grid" | "likert" => FieldType::Matrix,
        _ => return None,
    };
    Some(mapped)
}

/// Source type names that denote a container of nested fields.
pub fn is_group_type(source: &str) -> bool {
    matches!(
        compact(source).as_str(),
        "group" | "composite" | "fieldset" | "row"
    )
}

/// Canonical validation key for a source key; unknown keys map to
/// themselves.
pub fn validation_key(source: &str) -> &str {
    match source {
        "minLength" | "minlength" | "min_length" => "min_length",
        "maxLength" | "maxlength" | "max_length" => "max_length",
        "minimum" | "minValue" | "min_value" | "min" => "min",
        "maximum" | "maxValue" | "max_value" | "max" => "max",
        "regex" | "pattern" => "pattern",
        "errorMessage" | "error_message" | "message" => "message",
        other => other,
    }
}

/// Rename every key of a source validation object through
/// [`validation_key`], keeping values untouched.
pub fn map_validation(source: &Map<String, Value>) -> Map<String, Value> {
    source
        .iter()
        .map(|(k, v)| (validation_key(k).to_string(), v.clone()))
        .collect()
}

/// Canonical comparison operator name. Unknown operators pass through and
/// are logged.
pub fn map_operator(source: &str) -> String {
    let canonical = match compact(source).as_str() {
        "equals" | "equal" | "eq" | "is" => "equals",
        "notequals" | "notequal" | "neq" | "ne" | "isnot" => "not_equals",
        "greaterthan" | "gt" | "above" | "morethan" => "greater_than",
        "lessthan" | "lt" | "below" => "less_than",
        "contains" | "includes" | "has" => "contains",
        "isempty" | "empty" | "blank" => "is_empty",
        "isnotempty" | "notempty" | "filled" | "notblank" => "is_not_empty",
        "" => match source.trim() {
            "=" | "==" | "===" => "equals",
            "!=" | "!==" | "<>" => "not_equals",
            ">" => "greater_than",
            "<" => "less_than",
            _ => {
                warn!(operator = source, "unrecognized condition operator");
                return source.to_string();
            }
        },
        _ => {
            warn!(operator = source, "unrecognized condition operator");
            return source.to_string();
        }
    };
    canonical.to_string()
}

/// `and`/`or` from the many spellings of rule combinators. Defaults to `and`.
pub fn map_logic(source: Option<&str>) -> &'static str {
    match source.map(compact).as_deref() {
        Some("or" | "any" | "some") => "or",
        Some("") => match source.map(str::trim) {
            Some("||") => "or",
            _ => "and",
        },
        _ => "and",
    }
}

/// Service classification from a source category name.
pub fn map_service_type(source: &str) -> Option<ServiceType> {
    match source.trim().to_ascii_lowercase().as_str() {
        "consultation" | "paid" => Some(ServiceType::Paid),
        "intake" | "assessment" | "free" => Some(ServiceType::Free),
        _ => None,
    }
}
