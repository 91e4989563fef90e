//! Editing layer: an explicit editor session over a [`FormSchema`], a
//! bounded snapshot history for undo/redo, and the versioned export envelope.
//!
//! [`FormSchema`]: formloom_core::FormSchema

pub mod history;
pub mod session;
pub mod transfer;

pub use history::{DEFAULT_HISTORY_CAPACITY, History, HistorySnapshot};
pub use session::{Editor, EditorConfig, FieldPatch, SchemaPatch, SectionPatch, Selection};
pub use transfer::{EXPORT_FORMAT_VERSION, ExportEnvelope, TransferError, parse_envelope};
