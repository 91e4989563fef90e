//! Normalization of externally-authored form JSON.
//!
//! [`normalize`] classifies an arbitrary document as page-based, step-based
//! or a simple field map, maps it onto canonical pages and elements, and
//! derives metadata and a unique slug. Normalization is all-or-nothing at
//! the document level and lenient at the field level: unknown field types
//! become text inputs and malformed pieces are skipped with a warning.

mod convert;
pub mod detect;
mod element;
mod error;
mod loose;
pub mod mapping;
pub mod metadata;
pub mod model;
pub mod slug;

use std::collections::HashSet;

use chrono::Utc;
use serde_json::Value;
use tracing::info;

pub use detect::{FormatAdapter, Layout};
pub use error::NormalizeError;
pub use model::{
    Element, FlowConfig, FormData, NormalizationMetadata, NormalizationResult, Page, ServiceType,
    SourceFormat,
};
pub use slug::{slugify, unique_slug};

/// Classify `input` without transforming it. `None` for non-objects and
/// unrecognized shapes.
pub fn detect_format(input: &Value) -> Option<SourceFormat> {
    detect::detect(input.as_object()?).map(|adapter| adapter.format())
}

/// Normalize `input` into the canonical representation, choosing a slug
/// that is not in `existing_slugs`.
pub fn normalize(
    input: &Value,
    existing_slugs: &HashSet<String>,
) -> Result<NormalizationResult, NormalizeError> {
    let obj = match input {
        Value::Object(obj) => obj,
        Value::Null => return Err(NormalizeError::NullInput),
        Value::Array(_) => return Err(NormalizeError::ArrayInput),
        other => return Err(NormalizeError::NotAnObject(loose::kind_name(other))),
    };
    let adapter = detect::detect(obj).ok_or(NormalizeError::UnrecognizedFormat)?;
    let title = metadata::resolve_title(obj).ok_or(NormalizeError::MissingTitle)?;

    let layout = adapter.transform(obj);
    let flow_config = metadata::flow_config(
        obj,
        &title,
        layout.pages.iter().flat_map(|p| p.elements.iter()),
    );
    let form_data = FormData {
        pages: layout.pages,
        conditionals: layout.conditionals,
        completion_actions: layout.completion_actions,
        validation: obj
            .get("validation")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default(),
        flow_config,
    };

    let slug = unique_slug(&title, existing_slugs);
    let metadata = NormalizationMetadata {
        original_format: adapter.format(),
        normalized_at: Utc::now(),
        page_count: form_data.pages.len(),
        field_count: form_data.elements().count(),
    };
    info!(
        format = %metadata.original_format,
        pages = metadata.page_count,
        fields = metadata.field_count,
        slug = %slug,
        "normalized form"
    );

    Ok(NormalizationResult {
        description: form_data.flow_config.description.clone(),
        slug,
        category_id: metadata::category_id(obj),
        is_active: metadata::is_active(obj),
        service_type: metadata::service_type(obj),
        structure: form_data.clone(),
        form_data,
        metadata,
        title,
    })
}
