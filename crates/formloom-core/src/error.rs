use thiserror::Error;

/// Structural invariant violations detected by [`FormSchema::check_integrity`].
///
/// [`FormSchema::check_integrity`]: crate::FormSchema::check_integrity
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    #[error("duplicate section id: {0}")]
    DuplicateSection(String),

    #[error("duplicate field id: {0}")]
    DuplicateField(String),

    #[error("section {id} has order {order} but sits at position {position}")]
    SectionOrder {
        id: String,
        order: u32,
        position: usize,
    },

    #[error("field {id} has order {order} but sits at position {position}")]
    FieldOrder {
        id: String,
        order: u32,
        position: usize,
    },
}
