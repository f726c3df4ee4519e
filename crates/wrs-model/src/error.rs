//! Error types for model operations.

use thiserror::Error;
use wrs_store::StoreError;
use wrs_types::{EntityId, TypeError};

/// Errors that can occur while manipulating records and their groupings.
///
/// Conditions that are plain failure results rather than errors (an invalid
/// reorder request, removing a non-member, a rename whose source removal
/// finds nothing) are reported through return values instead.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The name is already claimed in the container and dedupe was not requested.
    #[error("duplicate name {name:?} in {container}")]
    DuplicateName { container: String, name: String },

    /// Dedupe ran out of suffixes before finding a free name.
    #[error("no free name for {name:?} in {container} after {attempts} attempts")]
    DupeSuffixExhausted {
        container: String,
        name: String,
        attempts: u32,
    },

    /// A stored value could not be coerced to the requested type.
    #[error("property {key} = {value:?} is not a valid {expected}")]
    InvalidProperty {
        key: String,
        value: String,
        expected: &'static str,
    },

    /// Midpoint insertion could not find a score between two neighbours, even
    /// after rebalancing.
    #[error("no score left before {anchor} in {collection}")]
    PrecisionExhausted { collection: String, anchor: EntityId },

    /// Configuration is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Failure reported by the key-value store, propagated unchanged.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("type error: {0}")]
    Type(#[from] TypeError),

    /// I/O error while reading configuration.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for model operations.
pub type ModelResult<T> = std::result::Result<T, ModelError>;
