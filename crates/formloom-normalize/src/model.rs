//! Canonical output of normalization.
//!
//! `FormData` is the storage payload. Its JSON shape is itself valid
//! page-based input, which is what makes normalization idempotent.

use std::fmt;

use chrono::{DateTime, Utc};
use formloom_core::{FieldOption, FieldType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceFormat {
    PageBased,
    StepBased,
    SimpleObject,
}

impl SourceFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceFormat::PageBased => "page-based",
            SourceFormat::StepBased => "step-based",
            SourceFormat::SimpleObject => "simple-object",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Free,
    Paid,
}

impl ServiceType {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceType::Free => "free",
            ServiceType::Paid => "paid",
        }
    }
}

/// Form-level presentation metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowConfig {
    pub title: String,
    pub description: String,
    pub version: String,
    pub completion_message: String,
    /// Minutes.
    pub estimated_time: u32,
    pub theme: String,
}

/// One normalized input element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub validation: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accept: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormData {
    pub flow_config: FlowConfig,
    pub pages: Vec<Page>,
    /// Canonical conditionals: `{ id, page, logic, rules, action, target }`.
    #[serde(default)]
    pub conditionals: Vec<Value>,
    /// Ordered `{ type, step, order, config }` entries.
    #[serde(default)]
    pub completion_actions: Vec<Value>,
    /// Form-level validation settings, carried through untouched.
    #[serde(default)]
    pub validation: Map<String, Value>,
}

impl FormData {
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.pages.iter().flat_map(|p| p.elements.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationMetadata {
    pub original_format: SourceFormat,
    pub normalized_at: DateTime<Utc>,
    pub page_count: usize,
    pub field_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationResult {
    pub title: String,
    pub description: String,
    pub slug: String,
    pub category_id: Option<String>,
    pub is_active: bool,
    pub service_type: Option<ServiceType>,
    pub form_data: FormData,
    /// Same payload as `form_data`, kept for consumers that read it under
    /// this name.
    pub structure: FormData,
    pub metadata: NormalizationMetadata,
}
