use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid entity id: {0:?}")]
    InvalidId(String),

    #[error("timestamp out of range: {0}")]
    TimestampOutOfRange(i64),

    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    #[error("key template {template:?} is missing the {placeholder} placeholder")]
    MissingPlaceholder {
        template: String,
        placeholder: &'static str,
    },
}
