//! Form-level metadata: title, flow configuration, service classification.
//!
//! Every lookup tries the `flowConfig` block first and falls back to the
//! top level of the document.

use formloom_core::schema::DEFAULT_VERSION;

use crate::loose::{self, Object};
use crate::mapping::map_service_type;
use crate::model::{Element, FlowConfig, ServiceType};

pub const DEFAULT_COMPLETION_MESSAGE: &str = "Thank you for completing this form.";
pub const DEFAULT_THEME: &str = "default";

/// Input fields answered per minute when estimating completion time.
const FIELDS_PER_MINUTE: usize = 4;

struct Sources<'a> {
    flow: Option<&'a Object>,
    top: &'a Object,
}

impl<'a> Sources<'a> {
    fn of(input: &'a Object) -> Self {
        Self {
            flow: loose::first(input, &["flowConfig", "flow_config"]).and_then(|v| v.as_object()),
            top: input,
        }
    }

    fn text(&self, keys: &[&str]) -> Option<&'a str> {
        self.flow
            .and_then(|flow| loose::text(flow, keys))
            .or_else(|| loose::text(self.top, keys))
    }

    fn scalar(&self, keys: &[&str]) -> Option<String> {
        self.flow
            .and_then(|flow| loose::scalar(flow, keys))
            .or_else(|| loose::scalar(self.top, keys))
    }

    fn number(&self, keys: &[&str]) -> Option<f64> {
        self.flow
            .and_then(|flow| loose::number(flow, keys))
            .or_else(|| loose::number(self.top, keys))
    }
}

/// The document title, or `None` when nothing usable is present.
pub fn resolve_title(input: &Object) -> Option<String> {
    Sources::of(input)
        .text(&["title", "name"])
        .map(str::to_string)
}

pub fn flow_config<'e>(
    input: &Object,
    title: &str,
    elements: impl Iterator<Item = &'e Element>,
) -> FlowConfig {
    let sources = Sources::of(input);
    let estimated_time = sources
        .number(&["estimatedTime", "estimated_time"])
        .filter(|m| *m > 0.0)
        .map(|m| m.round() as u32)
        .unwrap_or_else(|| {
            estimate_minutes(elements.filter(|e| e.field_type.is_input()).count())
        });

    FlowConfig {
        title: title.to_string(),
        description: sources.text(&["description"]).unwrap_or_default().to_string(),
        version: sources
            .scalar(&["version"])
            .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
        completion_message: sources
            .text(&["completionMessage", "completion_message"])
            .unwrap_or(DEFAULT_COMPLETION_MESSAGE)
            .to_string(),
        estimated_time,
        theme: sources.text(&["theme"]).unwrap_or(DEFAULT_THEME).to_string(),
    }
}

/// One minute per four input fields, at least one minute.
pub fn estimate_minutes(input_fields: usize) -> u32 {
    input_fields.div_ceil(FIELDS_PER_MINUTE).max(1) as u32
}

pub fn service_type(input: &Object) -> Option<ServiceType> {
    Sources::of(input)
        .text(&["service_type", "serviceType", "category", "formType", "form_type"])
        .and_then(map_service_type)
}

pub fn category_id(input: &Object) -> Option<String> {
    loose::scalar(input, &["category_id", "categoryId"])
}

pub fn is_active(input: &Object) -> bool {
    loose::flag(input, &["is_active", "isActive", "active"]).unwrap_or(true)
}
