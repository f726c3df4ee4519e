/// Errors from key-value store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The key holds a structure of a different kind than the operation expects.
    #[error("wrong type for key {key}: expected {expected}, found {found}")]
    WrongType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// An increment targeted a hash field whose value is not an integer.
    #[error("hash field {key}/{field} is not an integer")]
    NotAnInteger { key: String, field: String },

    /// A score was NaN.
    #[error("invalid score for {key}/{member}: {score}")]
    InvalidScore {
        key: String,
        member: String,
        score: f64,
    },

    /// A scan was resumed with a cursor the backend never issued.
    #[error("invalid scan cursor {0}")]
    InvalidCursor(u64),

    /// Connectivity or protocol failure in the backend.
    #[error("backend error: {0}")]
    Backend(String),

    /// An internal lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
