//! Field definitions: the closed set of field types and their
//! type-specific attributes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids;
use crate::rules::ConditionalRule;

/// Payload-free field discriminant, serialized with kebab-case wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    Text,
    Textarea,
    Email,
    Tel,
    Number,
    Password,
    Url,
    Date,
    DateTime,
    Time,
    Select,
    Multiselect,
    Radio,
    Checkbox,
    File,
    Range,
    Color,
    Hidden,
    SectionHeader,
    Divider,
    HtmlContent,
    Signature,
    Rating,
    Matrix,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown field type: {0}")]
pub struct ParseFieldTypeError(pub String);

impl FieldType {
    pub const ALL: [FieldType; 24] = [
        FieldType::Text,
        FieldType::Textarea,
        FieldType::Email,
        FieldType::Tel,
        FieldType::Number,
        FieldType::Password,
        FieldType::Url,
        FieldType::Date,
        FieldType::DateTime,
        FieldType::Time,
        FieldType::Select,
        FieldType::Multiselect,
        FieldType::Radio,
        FieldType::Checkbox,
        FieldType::File,
        FieldType::Range,
        FieldType::Color,
        FieldType::Hidden,
        FieldType::SectionHeader,
        FieldType::Divider,
        FieldType::HtmlContent,
        FieldType::Signature,
        FieldType::Rating,
        FieldType::Matrix,
    ];

    /// Wire name, identical to the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Email => "email",
            FieldType::Tel => "tel",
            FieldType::Number => "number",
            FieldType::Password => "password",
            FieldType::Url => "url",
            FieldType::Date => "date",
            FieldType::DateTime => "date-time",
            FieldType::Time => "time",
            FieldType::Select => "select",
            FieldType::Multiselect => "multiselect",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
            FieldType::File => "file",
            FieldType::Range => "range",
            FieldType::Color => "color",
            FieldType::Hidden => "hidden",
            FieldType::SectionHeader => "section-header",
            FieldType::Divider => "divider",
            FieldType::HtmlContent => "html-content",
            FieldType::Signature => "signature",
            FieldType::Rating => "rating",
            FieldType::Matrix => "matrix",
        }
    }

    /// Human-readable name, used as the label of freshly created fields.
    pub fn display_name(self) -> &'static str {
        match self {
            FieldType::Text => "Text Input",
            FieldType::Textarea => "Text Area",
            FieldType::Email => "Email",
            FieldType::Tel => "Phone",
            FieldType::Number => "Number",
            FieldType::Password => "Password",
            FieldType::Url => "URL",
            FieldType::Date => "Date",
            FieldType::DateTime => "Date & Time",
            FieldType::Time => "Time",
            FieldType::Select => "Dropdown",
            FieldType::Multiselect => "Multi Select",
            FieldType::Radio => "Radio Buttons",
            FieldType::Checkbox => "Checkboxes",
            FieldType::File => "File Upload",
            FieldType::Range => "Range Slider",
            FieldType::Color => "Color Picker",
            FieldType::Hidden => "Hidden Field",
            FieldType::SectionHeader => "Section Header",
            FieldType::Divider => "Divider",
            FieldType::HtmlContent => "HTML Content",
            FieldType::Signature => "Signature",
            FieldType::Rating => "Rating",
            FieldType::Matrix => "Matrix",
        }
    }

    /// Types whose answers are picked from an option list.
    pub fn is_choice(self) -> bool {
        matches!(
            self,
            FieldType::Select | FieldType::Multiselect | FieldType::Radio | FieldType::Checkbox
        )
    }

    /// False for purely presentational types that never collect an answer.
    pub fn is_input(self) -> bool {
        !matches!(
            self,
            FieldType::SectionHeader | FieldType::Divider | FieldType::HtmlContent
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = ParseFieldTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseFieldTypeError(s.to_string()))
    }
}

/// A label/value pair offered by choice-type fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
}

impl FieldOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Field type together with its type-specific attributes.
///
/// Serialized internally tagged on `type`, and flattened into [`Field`], so a
/// field reads as `{"id": ..., "type": "number", "min": 0, "max": 100, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FieldKind {
    Text,
    Textarea {
        rows: u32,
    },
    Email,
    Tel,
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step: Option<f64>,
    },
    Password,
    Url,
    Date,
    DateTime,
    Time,
    Select {
        #[serde(default)]
        options: Vec<FieldOption>,
    },
    Multiselect {
        #[serde(default)]
        options: Vec<FieldOption>,
    },
    Radio {
        #[serde(default)]
        options: Vec<FieldOption>,
    },
    Checkbox {
        #[serde(default)]
        options: Vec<FieldOption>,
    },
    File {
        #[serde(default)]
        accept: Vec<String>,
        #[serde(default)]
        multiple: bool,
    },
    Range {
        min: f64,
        max: f64,
        #[serde(default = "default_step")]
        step: f64,
    },
    Color,
    Hidden,
    SectionHeader,
    Divider,
    HtmlContent {
        #[serde(default)]
        html: String,
    },
    Signature,
    Rating {
        max: u32,
    },
    Matrix {
        #[serde(default)]
        rows: Vec<String>,
        #[serde(default)]
        columns: Vec<FieldOption>,
    },
}

fn default_step() -> f64 {
    1.0
}

const DEFAULT_ROWS: u32 = 4;
const DEFAULT_MIN: f64 = 0.0;
const DEFAULT_MAX: f64 = 100.0;
const DEFAULT_RATING_MAX: u32 = 5;

fn placeholder_options() -> Vec<FieldOption> {
    vec![
        FieldOption::new("Option 1", "option_1"),
        FieldOption::new("Option 2", "option_2"),
    ]
}

impl FieldKind {
    /// Type-appropriate defaults: two placeholder options for choice types,
    /// 0–100 bounds for number and range, four rows for text areas.
    pub fn default_for(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Text => FieldKind::Text,
            FieldType::Textarea => FieldKind::Textarea { rows: DEFAULT_ROWS },
            FieldType::Email => FieldKind::Email,
            FieldType::Tel => FieldKind::Tel,
            FieldType::Number => FieldKind::Number {
                min: Some(DEFAULT_MIN),
                max: Some(DEFAULT_MAX),
                step: None,
            },
            FieldType::Password => FieldKind::Password,
            FieldType::Url => FieldKind::Url,
            FieldType::Date => FieldKind::Date,
            FieldType::DateTime => FieldKind::DateTime,
            FieldType::Time => FieldKind::Time,
            FieldType::Select => FieldKind::Select {
                options: placeholder_options(),
            },
            FieldType::Multiselect => FieldKind::Multiselect {
                options: placeholder_options(),
            },
            FieldType::Radio => FieldKind::Radio {
                options: placeholder_options(),
            },
            FieldType::Checkbox => FieldKind::Checkbox {
                options: placeholder_options(),
            },
            FieldType::File => FieldKind::File {
                accept: Vec::new(),
                multiple: false,
            },
            FieldType::Range => FieldKind::Range {
                min: DEFAULT_MIN,
                max: DEFAULT_MAX,
                step: default_step(),
            },
            FieldType::Color => FieldKind::Color,
            FieldType::Hidden => FieldKind::Hidden,
            FieldType::SectionHeader => FieldKind::SectionHeader,
            FieldType::Divider => FieldKind::Divider,
            FieldType::HtmlContent => FieldKind::HtmlContent {
                html: String::new(),
            },
            FieldType::Signature => FieldKind::Signature,
            FieldType::Rating => FieldKind::Rating {
                max: DEFAULT_RATING_MAX,
            },
            FieldType::Matrix => FieldKind::Matrix {
                rows: vec!["Row 1".to_string(), "Row 2".to_string()],
                columns: vec![
                    FieldOption::new("Column 1", "column_1"),
                    FieldOption::new("Column 2", "column_2"),
                ],
            },
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            FieldKind::Text => FieldType::Text,
            FieldKind::Textarea { .. } => FieldType::Textarea,
            FieldKind::Email => FieldType::Email,
            FieldKind::Tel => FieldType::Tel,
            FieldKind::Number { .. } => FieldType::Number,
            FieldKind::Password => FieldType::Password,
            FieldKind::Url => FieldType::Url,
            FieldKind::Date => FieldType::Date,
            FieldKind::DateTime => FieldType::DateTime,
            FieldKind::Time => FieldType::Time,
            FieldKind::Select { .. } => FieldType::Select,
            FieldKind::Multiselect { .. } => FieldType::Multiselect,
            FieldKind::Radio { .. } => FieldType::Radio,
            FieldKind::Checkbox { .. } => FieldType::Checkbox,
            FieldKind::File { .. } => FieldType::File,
            FieldKind::Range { .. } => FieldType::Range,
            FieldKind::Color => FieldType::Color,
            FieldKind::Hidden => FieldType::Hidden,
            FieldKind::SectionHeader => FieldType::SectionHeader,
            FieldKind::Divider => FieldType::Divider,
            FieldKind::HtmlContent { .. } => FieldType::HtmlContent,
            FieldKind::Signature => FieldType::Signature,
            FieldKind::Rating { .. } => FieldType::Rating,
            FieldKind::Matrix { .. } => FieldType::Matrix,
        }
    }

    /// Option list for choice types, `None` for everything else.
    pub fn options(&self) -> Option<&[FieldOption]> {
        match self {
            FieldKind::Select { options }
            | FieldKind::Multiselect { options }
            | FieldKind::Radio { options }
            | FieldKind::Checkbox { options } => Some(options),
            _ => None,
        }
    }

    pub fn options_mut(&mut self) -> Option<&mut Vec<FieldOption>> {
        match self {
            FieldKind::Select { options }
            | FieldKind::Multiselect { options }
            | FieldKind::Radio { options }
            | FieldKind::Checkbox { options } => Some(options),
            _ => None,
        }
    }

    /// Numeric bounds for number and range types.
    pub fn bounds(&self) -> Option<(Option<f64>, Option<f64>)> {
        match self {
            FieldKind::Number { min, max, .. } => Some((*min, *max)),
            FieldKind::Range { min, max, .. } => Some((Some(*min), Some(*max))),
            _ => None,
        }
    }

    /// False when a numeric bound or step is NaN or infinite. JSON has no
    /// encoding for those values.
    pub fn has_finite_numbers(&self) -> bool {
        match self {
            FieldKind::Number { min, max, step } => {
                [min, max, step].into_iter().flatten().all(|n| n.is_finite())
            }
            FieldKind::Range { min, max, step } => {
                min.is_finite() && max.is_finite() && step.is_finite()
            }
            _ => true,
        }
    }
}

/// Horizontal space a field occupies in the rendered layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldWidth {
    #[default]
    Full,
    Half,
    Third,
    Quarter,
}

/// Declared field-level constraints on the submitted answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FieldValidation {
    pub fn is_empty(&self) -> bool {
        self == &FieldValidation::default()
    }
}

/// A single typed input definition within a section.
///
/// `id` is unique across the whole schema, not just the owning section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub label: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default)]
    pub width: FieldWidth,
    #[serde(default)]
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ConditionalRule>,
}

impl Field {
    /// Create a field of the given type with a fresh id and default attributes.
    pub fn new(field_type: FieldType) -> Self {
        Self::with_id(ids::new_id("field"), field_type)
    }

    pub fn with_id(id: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: id.into(),
            kind: FieldKind::default_for(field_type),
            label: field_type.display_name().to_string(),
            placeholder: String::new(),
            required: false,
            disabled: false,
            readonly: false,
            width: FieldWidth::Full,
            order: 0,
            help_text: None,
            validation: None,
            conditions: Vec::new(),
        }
    }

    pub fn field_type(&self) -> FieldType {
        self.kind.field_type()
    }
}
