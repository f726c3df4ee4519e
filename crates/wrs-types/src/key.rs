//! Store key templates.
//!
//! Every structure in the store lives under a key derived from the owning
//! entity's type tag and id, e.g. `"{type}:{id}:info"` renders to
//! `"coll:3f9a...:info"`. Templates never name a concrete kind; the tag is
//! supplied at render time.

use std::borrow::Cow;
use std::fmt;

use crate::error::TypeError;
use crate::id::EntityId;

const TYPE_PLACEHOLDER: &str = "{type}";
const ID_PLACEHOLDER: &str = "{id}";

/// A store key parameterized by `{type}` and `{id}`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct KeyTemplate(Cow<'static, str>);

impl KeyTemplate {
    /// Property hash of an entity.
    pub const INFO: KeyTemplate = KeyTemplate::from_static("{type}:{id}:info");
    /// Name map of a named container.
    pub const CHILDREN: KeyTemplate = KeyTemplate::from_static("{type}:{id}:children");
    /// Sorted structure of an ordered collection.
    pub const ORDER: KeyTemplate = KeyTemplate::from_static("{type}:{id}:order");
    /// Set of an unordered collection.
    pub const MEMBERS: KeyTemplate = KeyTemplate::from_static("{type}:{id}:members");
    /// Scan pattern matching every key owned by an entity.
    pub const ALL: KeyTemplate = KeyTemplate::from_static("{type}:{id}:*");

    /// A template known at compile time. Not validated.
    pub const fn from_static(template: &'static str) -> Self {
        Self(Cow::Borrowed(template))
    }

    /// A template built at runtime. Must mention `{id}`; `{type}` is optional
    /// for keys that are already scoped by a literal prefix.
    pub fn parse(template: impl Into<String>) -> Result<Self, TypeError> {
        let template = template.into();
        if !template.contains(ID_PLACEHOLDER) {
            return Err(TypeError::MissingPlaceholder {
                template,
                placeholder: ID_PLACEHOLDER,
            });
        }
        Ok(Self(Cow::Owned(template)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substitute the type tag and id.
    pub fn render(&self, type_tag: &str, id: &EntityId) -> String {
        // `{type}` first so an id can never inject a placeholder.
        self.0
            .replace(TYPE_PLACEHOLDER, type_tag)
            .replace(ID_PLACEHOLDER, id.as_str())
    }
}

impl fmt::Debug for KeyTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyTemplate({:?})", self.0)
    }
}

impl fmt::Display for KeyTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
