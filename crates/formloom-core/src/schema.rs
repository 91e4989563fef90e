//! The form schema document: sections, fields, settings and usage counters.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::IntegrityError;
use crate::field::Field;
use crate::ids;
use crate::rules::Condition;

pub const DEFAULT_VERSION: &str = "1.0.0";

/// Form-wide behaviour flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSettings {
    pub multi_step: bool,
    pub show_progress: bool,
    pub save_progress: bool,
    pub allow_partial_submission: bool,
    pub submit_button_text: String,
    pub success_message: String,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            multi_step: false,
            show_progress: true,
            save_progress: false,
            allow_partial_submission: false,
            submit_button_text: "Submit".to_string(),
            success_message: "Thank you for your submission.".to_string(),
        }
    }
}

/// Per-section trigger: when `when` holds against the answers, the section
/// reports `tags` to downstream recommendation logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionTrigger {
    pub id: String,
    pub when: Condition,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// An ordered group of fields. `fields[i].order == i` at all times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub order: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<SectionTrigger>,
}

impl Section {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            fields: Vec::new(),
            order: 0,
            triggers: Vec::new(),
        }
    }

    /// Rewrite every field's `order` to its position.
    pub fn renumber_fields(&mut self) {
        for (i, field) in self.fields.iter_mut().enumerate() {
            field.order = i as u32;
        }
    }

    pub fn field_index(&self, field_id: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.id == field_id)
    }
}

/// Root form document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_version")]
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub settings: FormSettings,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub submission_count: u64,
    #[serde(default)]
    pub view_count: u64,
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

impl FormSchema {
    /// Empty schema with default settings and zeroed usage counters.
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ids::new_id("form"),
            title: title.into(),
            description: String::new(),
            version: default_version(),
            created_at: now,
            updated_at: now,
            created_by: None,
            sections: Vec::new(),
            settings: FormSettings::default(),
            tags: Vec::new(),
            category: None,
            is_published: false,
            submission_count: 0,
            view_count: 0,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    // ── Lookup ──

    pub fn section_index(&self, section_id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == section_id)
    }

    pub fn section(&self, section_id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == section_id)
    }

    pub fn section_mut(&mut self, section_id: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.id == section_id)
    }

    /// Locate a field by id across all sections: `(section index, field index)`.
    pub fn find_field(&self, field_id: &str) -> Option<(usize, usize)> {
        self.sections
            .iter()
            .enumerate()
            .find_map(|(si, s)| s.field_index(field_id).map(|fi| (si, fi)))
    }

    pub fn field(&self, field_id: &str) -> Option<&Field> {
        let (si, fi) = self.find_field(field_id)?;
        Some(&self.sections[si].fields[fi])
    }

    pub fn field_mut(&mut self, field_id: &str) -> Option<&mut Field> {
        let (si, fi) = self.find_field(field_id)?;
        Some(&mut self.sections[si].fields[fi])
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.sections.iter().flat_map(|s| s.fields.iter())
    }

    pub fn field_ids(&self) -> HashSet<&str> {
        self.fields().map(|f| f.id.as_str()).collect()
    }

    pub fn field_count(&self) -> usize {
        self.sections.iter().map(|s| s.fields.len()).sum()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.section_index(id).is_some() || self.find_field(id).is_some()
    }

    // ── Ordering ──

    /// Rewrite every section's `order` to its position.
    pub fn renumber_sections(&mut self) {
        for (i, section) in self.sections.iter_mut().enumerate() {
            section.order = i as u32;
        }
    }

    /// Check the structural invariants: unique section ids, field ids unique
    /// across the whole schema, and stored `order` values matching positions.
    pub fn check_integrity(&self) -> Result<(), IntegrityError> {
        let mut section_ids = HashSet::new();
        let mut field_ids = HashSet::new();

        for (si, section) in self.sections.iter().enumerate() {
            if !section_ids.insert(section.id.as_str()) {
                return Err(IntegrityError::DuplicateSection(section.id.clone()));
            }
            if section.order as usize != si {
                return Err(IntegrityError::SectionOrder {
                    id: section.id.clone(),
                    order: section.order,
                    position: si,
                });
            }
            for (fi, field) in section.fields.iter().enumerate() {
                if !field_ids.insert(field.id.as_str()) {
                    return Err(IntegrityError::DuplicateField(field.id.clone()));
                }
                if field.order as usize != fi {
                    return Err(IntegrityError::FieldOrder {
                        id: field.id.clone(),
                        order: field.order,
                        position: fi,
                    });
                }
            }
        }
        Ok(())
    }
}
