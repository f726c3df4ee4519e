//! Entity kinds.
//!
//! The model layer never names a concrete kind. Each kind defined by a
//! consumer (user, collection, recording, ...) implements [`EntityKind`] to
//! supply its type tag and, if it deviates from the defaults, its key
//! templates.

use wrs_types::KeyTemplate;

/// A kind of stored entity.
///
/// ```
/// use wrs_model::EntityKind;
///
/// struct Recording;
///
/// impl EntityKind for Recording {
///     const TYPE_TAG: &'static str = "rec";
/// }
/// ```
pub trait EntityKind: Send + Sync + 'static {
    /// Tag substituted for `{type}` in every key of this kind.
    const TYPE_TAG: &'static str;

    /// Key of the property hash.
    fn info_template() -> KeyTemplate {
        KeyTemplate::INFO
    }

    /// Scan pattern matching every key owned by one entity of this kind.
    fn all_keys_template() -> KeyTemplate {
        KeyTemplate::ALL
    }
}

/// A kind whose entities act as named containers of other entities.
pub trait ContainerKind: EntityKind {
    /// Key of the name map.
    fn children_template() -> KeyTemplate {
        KeyTemplate::CHILDREN
    }
}
