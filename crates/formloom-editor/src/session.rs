//! The editor session: one explicitly owned editing context over a schema.
//!
//! Every state change bumps [`Editor::revision`] and goes through a
//! copy-on-write [`Arc`], so an observer holding a handle from
//! [`Editor::schema_handle`] keeps its old snapshot and sees a new pointer on
//! the next read. Operations that reference an unknown id do nothing: they
//! leave the schema, selection, dirty flag and history untouched.
//!
//! Discrete structural edits (add, delete, move, duplicate) record a history
//! snapshot. `update_*` calls do not; callers that want an undo boundary
//! after a burst of updates call [`Editor::save_to_history`].

use std::sync::Arc;

use formloom_core::{
    ConditionalRule, Field, FieldKind, FieldType, FieldValidation, FieldWidth, FormSchema,
    FormSettings, Section, SectionTrigger, ValidationIssue, ids, validate_schema,
};
use tracing::{debug, info, warn};

use crate::history::{DEFAULT_HISTORY_CAPACITY, History};
use crate::transfer::{ExportEnvelope, TransferError, parse_envelope};

const COPY_SUFFIX: &str = " (Copy)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorConfig {
    pub history_capacity: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

/// What the operator currently has selected. At most one thing at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    None,
    Field(String),
    Section(String),
}

#[derive(Debug, Clone, Default)]
pub struct SectionPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub triggers: Option<Vec<SectionTrigger>>,
}

/// Partial update for a field. `id` and `order` are owned by the editor and
/// cannot be patched.
#[derive(Debug, Clone, Default)]
pub struct FieldPatch {
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub help_text: Option<Option<String>>,
    pub required: Option<bool>,
    pub disabled: Option<bool>,
    pub readonly: Option<bool>,
    pub width: Option<FieldWidth>,
    pub kind: Option<FieldKind>,
    pub validation: Option<Option<FieldValidation>>,
    pub conditions: Option<Vec<ConditionalRule>>,
}

#[derive(Debug, Clone, Default)]
pub struct SchemaPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub tags: Option<Vec<String>>,
    pub category: Option<Option<String>>,
    pub settings: Option<FormSettings>,
}

pub struct Editor {
    schema: Arc<FormSchema>,
    selection: Selection,
    dirty: bool,
    validation_errors: Vec<ValidationIssue>,
    history: History,
    revision: u64,
}

impl Editor {
    /// Open a session on `schema` with default configuration.
    pub fn new(schema: FormSchema) -> Self {
        Self::with_config(schema, EditorConfig::default())
    }

    pub fn with_config(schema: FormSchema, config: EditorConfig) -> Self {
        let history = History::new(&schema, config.history_capacity);
        Self {
            schema: Arc::new(schema),
            selection: Selection::None,
            dirty: false,
            validation_errors: Vec::new(),
            history,
            revision: 0,
        }
    }

    /// Open a session on a fresh, empty schema.
    pub fn create(title: impl Into<String>) -> Self {
        Self::new(FormSchema::new(title))
    }

    // ── Observation ──

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    /// Shared handle to the current schema. Later edits never mutate the
    /// schema behind a handle that is still held.
    pub fn schema_handle(&self) -> Arc<FormSchema> {
        Arc::clone(&self.schema)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_field_id(&self) -> Option<&str> {
        match &self.selection {
            Selection::Field(id) => Some(id),
            _ => None,
        }
    }

    pub fn selected_section_id(&self) -> Option<&str> {
        match &self.selection {
            Selection::Section(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn validation_errors(&self) -> &[ValidationIssue] {
        &self.validation_errors
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ── Sections ──

    /// Append a section, select it, and return its id.
    pub fn add_section(&mut self, title: &str, description: Option<&str>) -> String {
        let id = ids::unique_id("section", |candidate| self.schema.contains_id(candidate));
        let schema = self.schema_mut();
        let mut section = Section::new(id.clone(), title);
        section.description = description.unwrap_or_default().to_string();
        section.order = schema.sections.len() as u32;
        schema.sections.push(section);

        self.selection = Selection::Section(id.clone());
        self.finish("add_section", true);
        id
    }

    pub fn update_section(&mut self, section_id: &str, patch: SectionPatch) -> bool {
        let Some(si) = self.schema.section_index(section_id) else {
            debug!(section_id, "update_section: no such section");
            return false;
        };
        let section = &mut self.schema_mut().sections[si];
        if let Some(title) = patch.title {
            section.title = title;
        }
        if let Some(description) = patch.description {
            section.description = description;
        }
        if let Some(triggers) = patch.triggers {
            section.triggers = triggers;
        }
        self.finish("update_section", false);
        true
    }

    pub fn delete_section(&mut self, section_id: &str) -> bool {
        let Some(si) = self.schema.section_index(section_id) else {
            debug!(section_id, "delete_section: no such section");
            return false;
        };
        let schema = self.schema_mut();
        let removed = schema.sections.remove(si);
        schema.renumber_sections();

        let clear = match &self.selection {
            Selection::Section(id) => *id == removed.id,
            Selection::Field(id) => removed.field_index(id).is_some(),
            Selection::None => false,
        };
        if clear {
            self.selection = Selection::None;
        }
        self.finish("delete_section", true);
        true
    }

    /// Move a section to `new_index` (clamped) and renumber every section.
    pub fn move_section(&mut self, section_id: &str, new_index: usize) -> bool {
        let Some(from) = self.schema.section_index(section_id) else {
            debug!(section_id, "move_section: no such section");
            return false;
        };
        let schema = self.schema_mut();
        let section = schema.sections.remove(from);
        let to = new_index.min(schema.sections.len());
        schema.sections.insert(to, section);
        schema.renumber_sections();

        self.finish("move_section", true);
        true
    }

    // ── Fields ──

    /// Insert a default field of `field_type` into a section at `index`
    /// (clamped; appended when `None`), select it, and return its id.
    pub fn add_field(
        &mut self,
        section_id: &str,
        field_type: FieldType,
        index: Option<usize>,
    ) -> Option<String> {
        let Some(si) = self.schema.section_index(section_id) else {
            debug!(section_id, "add_field: no such section");
            return None;
        };
        let id = ids::unique_id("field", |candidate| self.schema.contains_id(candidate));
        let section = &mut self.schema_mut().sections[si];
        let at = index.map_or(section.fields.len(), |i| i.min(section.fields.len()));
        section.fields.insert(at, Field::with_id(id.clone(), field_type));
        section.renumber_fields();

        self.selection = Selection::Field(id.clone());
        self.finish("add_field", true);
        Some(id)
    }

    pub fn update_field(&mut self, field_id: &str, patch: FieldPatch) -> bool {
        let Some((si, fi)) = self.schema.find_field(field_id) else {
            debug!(field_id, "update_field: no such field");
            return false;
        };
        if let Some(kind) = &patch.kind
            && !kind.has_finite_numbers()
        {
            warn!(field_id, "update_field: rejected non-finite numeric bounds");
            return false;
        }
        apply_field_patch(&mut self.schema_mut().sections[si].fields[fi], patch);
        self.finish("update_field", false);
        true
    }

    pub fn delete_field(&mut self, field_id: &str) -> bool {
        let Some((si, fi)) = self.schema.find_field(field_id) else {
            debug!(field_id, "delete_field: no such field");
            return false;
        };
        let section = &mut self.schema_mut().sections[si];
        section.fields.remove(fi);
        section.renumber_fields();

        if self.selected_field_id() == Some(field_id) {
            self.selection = Selection::None;
        }
        self.finish("delete_field", true);
        true
    }

    /// Move a field into `target_section_id` at `new_index` (clamped). The
    /// source and target sections are both renumbered before returning.
    pub fn move_field(&mut self, field_id: &str, target_section_id: &str, new_index: usize) -> bool {
        let (Some((si, fi)), Some(ti)) = (
            self.schema.find_field(field_id),
            self.schema.section_index(target_section_id),
        ) else {
            debug!(field_id, target_section_id, "move_field: unknown field or section");
            return false;
        };
        let schema = self.schema_mut();
        let field = schema.sections[si].fields.remove(fi);
        schema.sections[si].renumber_fields();

        let target = &mut schema.sections[ti];
        let at = new_index.min(target.fields.len());
        target.fields.insert(at, field);
        target.renumber_fields();

        self.finish("move_field", true);
        true
    }

    /// Insert a copy of a field right after it, with a fresh id and a
    /// `(Copy)` label suffix, select it, and return its id.
    pub fn duplicate_field(&mut self, field_id: &str) -> Option<String> {
        let Some((si, fi)) = self.schema.find_field(field_id) else {
            debug!(field_id, "duplicate_field: no such field");
            return None;
        };
        let id = ids::unique_id("field", |candidate| self.schema.contains_id(candidate));
        let section = &mut self.schema_mut().sections[si];
        let mut copy = section.fields[fi].clone();
        copy.id = id.clone();
        copy.label.push_str(COPY_SUFFIX);
        for rule in &mut copy.conditions {
            rule.id = ids::new_id("rule");
        }
        section.fields.insert(fi + 1, copy);
        section.renumber_fields();

        self.selection = Selection::Field(id.clone());
        self.finish("duplicate_field", true);
        Some(id)
    }

    // ── Selection ──

    /// Select a field (clearing any section selection), or clear the
    /// selection with `None`. Unknown ids are ignored.
    pub fn select_field(&mut self, field_id: Option<&str>) {
        match field_id {
            Some(id) if self.schema.find_field(id).is_none() => {
                debug!(field_id = id, "select_field: no such field");
            }
            Some(id) => self.set_selection(Selection::Field(id.to_string())),
            None => self.set_selection(Selection::None),
        }
    }

    /// Select a section (clearing any field selection), or clear the
    /// selection with `None`. Unknown ids are ignored.
    pub fn select_section(&mut self, section_id: Option<&str>) {
        match section_id {
            Some(id) if self.schema.section_index(id).is_none() => {
                debug!(section_id = id, "select_section: no such section");
            }
            Some(id) => self.set_selection(Selection::Section(id.to_string())),
            None => self.set_selection(Selection::None),
        }
    }

    fn set_selection(&mut self, selection: Selection) {
        if self.selection != selection {
            self.selection = selection;
            self.revision += 1;
        }
    }

    // ── Schema-level ──

    pub fn update_schema_meta(&mut self, patch: SchemaPatch) {
        let schema = self.schema_mut();
        if let Some(title) = patch.title {
            schema.title = title;
        }
        if let Some(description) = patch.description {
            schema.description = description;
        }
        if let Some(version) = patch.version {
            schema.version = version;
        }
        if let Some(tags) = patch.tags {
            schema.tags = tags;
        }
        if let Some(category) = patch.category {
            schema.category = category;
        }
        if let Some(settings) = patch.settings {
            schema.settings = settings;
        }
        self.finish("update_schema_meta", false);
    }

    /// Recompute and store the validation issues for the current schema.
    pub fn validate(&mut self) -> &[ValidationIssue] {
        self.validation_errors = validate_schema(&self.schema);
        self.revision += 1;
        debug!(issues = self.validation_errors.len(), "validated schema");
        &self.validation_errors
    }

    /// Clear the dirty flag once an external collaborator has persisted the
    /// schema.
    pub fn mark_saved(&mut self) {
        if self.dirty {
            self.dirty = false;
            self.revision += 1;
        }
    }

    // ── History ──

    /// Record the current schema as an undo point.
    pub fn save_to_history(&mut self) {
        self.history.record(&self.schema);
        self.revision += 1;
    }

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        let restored = snapshot.clone();
        self.restore(restored, "undo");
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        let restored = snapshot.clone();
        self.restore(restored, "redo");
        true
    }

    fn restore(&mut self, schema: FormSchema, op: &'static str) {
        self.schema = Arc::new(schema);
        self.selection = Selection::None;
        self.dirty = true;
        self.revision += 1;
        debug!(op, index = self.history.index(), "restored snapshot");
    }

    // ── Persistence boundary ──

    /// Serialize the current schema inside a versioned envelope.
    pub fn export_schema(&self) -> Result<String, TransferError> {
        ExportEnvelope::new(FormSchema::clone(&self.schema)).to_json()
    }

    /// Replace the schema with one from an exported envelope.
    ///
    /// Returns `false` and leaves the session untouched if the document does
    /// not parse, has an unsupported version, or fails the integrity check.
    /// A successful import is recorded in history, so it can be undone.
    pub fn import_schema(&mut self, serialized: &str) -> bool {
        match parse_envelope(serialized) {
            Ok(envelope) => {
                info!(
                    schema_id = %envelope.schema.id,
                    sections = envelope.schema.sections.len(),
                    "imported schema"
                );
                self.schema = Arc::new(envelope.schema);
                self.selection = Selection::None;
                self.validation_errors.clear();
                self.dirty = true;
                self.revision += 1;
                self.history.record(&self.schema);
                true
            }
            Err(err) => {
                warn!(error = %err, "rejected schema import");
                false
            }
        }
    }

    // ── Internals ──

    fn schema_mut(&mut self) -> &mut FormSchema {
        Arc::make_mut(&mut self.schema)
    }

    fn finish(&mut self, op: &'static str, record: bool) {
        self.schema_mut().touch();
        self.dirty = true;
        self.revision += 1;
        if record {
            self.history.record(&self.schema);
        }
        debug!(op, revision = self.revision, "schema edited");
    }
}

fn apply_field_patch(field: &mut Field, patch: FieldPatch) {
    if let Some(label) = patch.label {
        field.label = label;
    }
    if let Some(placeholder) = patch.placeholder {
        field.placeholder = placeholder;
    }
    if let Some(help_text) = patch.help_text {
        field.help_text = help_text;
    }
    if let Some(required) = patch.required {
        field.required = required;
    }
    if let Some(disabled) = patch.disabled {
        field.disabled = disabled;
    }
    if let Some(readonly) = patch.readonly {
        field.readonly = readonly;
    }
    if let Some(width) = patch.width {
        field.width = width;
    }
    if let Some(kind) = patch.kind {
        field.kind = kind;
    }
    if let Some(validation) = patch.validation {
        field.validation = validation;
    }
    if let Some(conditions) = patch.conditions {
        field.conditions = conditions;
    }
}
