use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Number of random bytes behind a generated [`EntityId`].
const GENERATED_ID_BYTES: usize = 8;

/// Opaque, immutable identifier of a stored entity.
///
/// Ids are generated once at creation time and never change afterwards. The
/// store treats them as plain strings; the only reserved value is the
/// wildcard `"*"`, which collection membership checks refuse to answer for.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// The wildcard id used by callers to mean "any entity".
    pub const WILDCARD: &'static str = "*";

    /// Generate a fresh random id (16 lowercase hex characters).
    pub fn generate() -> Self {
        let mut bytes = [0u8; GENERATED_ID_BYTES];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        Self(hex::encode(bytes))
    }

    /// Wrap an existing id read back from the store.
    ///
    /// Rejects empty ids and ids containing `:` or whitespace, which would
    /// break key templates.
    pub fn parse(s: impl Into<String>) -> Result<Self, TypeError> {
        let s = s.into();
        if s.is_empty() || s.contains(':') || s.chars().any(char::is_whitespace) {
            return Err(TypeError::InvalidId(s));
        }
        Ok(Self(s))
    }

    /// Wrap a string without validation. Intended for ids the store itself
    /// handed back (name-map values, collection members).
    pub fn from_raw(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the empty id or the wildcard id.
    pub fn is_blank_or_wildcard(&self) -> bool {
        self.0.is_empty() || self.0 == Self::WILDCARD
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An entity id together with the type tag of its kind.
///
/// This is what capability checks receive: enough to identify the entity and
/// discriminate between kinds, without handing out store access.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub type_tag: String,
    pub id: EntityId,
}

impl EntityRef {
    pub fn new(type_tag: impl Into<String>, id: EntityId) -> Self {
        Self {
            type_tag: type_tag.into(),
            id,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.type_tag, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_hex_and_distinct() {
        let a = EntityId::generate();
        let b = EntityId::generate();
        assert_eq!(a.as_str().len(), GENERATED_ID_BYTES * 2);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn parse_rejects_key_breaking_ids() {
        assert!(EntityId::parse("").is_err());
        assert!(EntityId::parse("a:b").is_err());
        assert!(EntityId::parse("a b").is_err());
        assert_eq!(EntityId::parse("abc").unwrap().as_str(), "abc");
    }

    #[test]
    fn wildcard_detection() {
        assert!(EntityId::from_raw("*").is_blank_or_wildcard());
        assert!(EntityId::from_raw("").is_blank_or_wildcard());
        assert!(!EntityId::from_raw("x1").is_blank_or_wildcard());
    }

    #[test]
    fn serde_is_transparent() {
        let id = EntityId::from_raw("deadbeef");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"deadbeef\"");
        let back: EntityId = serde_json::from_str("\"deadbeef\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn entity_ref_display() {
        let r = EntityRef::new("coll", EntityId::from_raw("c1"));
        assert_eq!(r.to_string(), "coll:c1");
    }
}
