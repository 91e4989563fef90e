//! Versioned export envelope for handing a schema to a persistence layer.

use chrono::{DateTime, Utc};
use formloom_core::{FormSchema, IntegrityError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const EXPORT_FORMAT_VERSION: &str = "1.0";

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported export format version: {0}")]
    UnsupportedVersion(String),

    #[error("schema failed integrity check: {0}")]
    Integrity(#[from] IntegrityError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportEnvelope {
    pub format_version: String,
    pub exported_at: DateTime<Utc>,
    pub schema: FormSchema,
}

impl ExportEnvelope {
    pub fn new(schema: FormSchema) -> Self {
        Self {
            format_version: EXPORT_FORMAT_VERSION.to_string(),
            exported_at: Utc::now(),
            schema,
        }
    }

    pub fn to_json(&self) -> Result<String, TransferError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Parse and check an exported document.
///
/// Accepts any `1.x` format version. The embedded schema must pass
/// [`FormSchema::check_integrity`].
pub fn parse_envelope(serialized: &str) -> Result<ExportEnvelope, TransferError> {
    let envelope: ExportEnvelope = serde_json::from_str(serialized)?;
    let major = envelope.format_version.split('.').next().unwrap_or_default();
    if major != "1" {
        return Err(TransferError::UnsupportedVersion(envelope.format_version));
    }
    envelope.schema.check_integrity()?;
    Ok(envelope)
}
