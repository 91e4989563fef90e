use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("input is null")]
    NullInput,

    #[error("input is an array, expected a form object")]
    ArrayInput,

    #[error("input is a {0}, expected a form object")]
    NotAnObject(&'static str),

    #[error("unrecognized form format: expected `pages`, `steps`, or a field map")]
    UnrecognizedFormat,

    #[error("no usable title found for slug generation")]
    MissingTitle,
}
