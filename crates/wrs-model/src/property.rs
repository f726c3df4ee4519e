//! Property values and well-known property keys.
//!
//! A record's property hash stores every value as a string. A fixed set of
//! keys is integer-valued and is decoded as such on load; booleans are
//! encoded as `"0"`/`"1"`.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use wrs_types::Timestamp;

use crate::error::{ModelError, ModelResult};

pub const SIZE: &str = "size";
pub const CREATED_AT: &str = "created_at";
pub const UPDATED_AT: &str = "updated_at";
pub const RECORDED_AT: &str = "recorded_at";
pub const OWNER: &str = "owner";
pub const PUBLIC: &str = "public";

/// Keys decoded as integers when a record is loaded.
pub const INT_KEYS: [&str; 4] = [SIZE, CREATED_AT, UPDATED_AT, RECORDED_AT];

/// Cached property snapshot of a record.
pub type Properties = BTreeMap<String, PropertyValue>;

/// A single property value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Int(i64),
    Text(String),
}

/// Type a read should coerce its result to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyType {
    Text,
    Int,
    Bool,
}

/// Options for [`crate::EntityRecord::get`].
#[derive(Clone, Copy, Debug, Default)]
pub struct GetOptions {
    /// Coerce the value (stored or default) to this type.
    pub coerce: Option<PropertyType>,
    /// Re-read the field from the store even if it is cached. Has no effect
    /// once the record is fully loaded.
    pub refresh: bool,
}

impl GetOptions {
    pub fn refreshed() -> Self {
        Self {
            coerce: None,
            refresh: true,
        }
    }

    pub fn coerced(ty: PropertyType) -> Self {
        Self {
            coerce: Some(ty),
            refresh: false,
        }
    }

    pub fn with_refresh(mut self) -> Self {
        self.refresh = true;
        self
    }
}

impl PropertyValue {
    /// Decode a raw stored value, honouring [`INT_KEYS`]. An integer key
    /// whose value does not parse stays text.
    pub fn from_stored(key: &str, raw: String) -> Self {
        if INT_KEYS.contains(&key) {
            if let Ok(n) = raw.trim().parse::<i64>() {
                return PropertyValue::Int(n);
            }
        }
        PropertyValue::Text(raw)
    }

    /// Encode for the store.
    pub fn to_stored(&self) -> String {
        match self {
            PropertyValue::Int(n) => n.to_string(),
            PropertyValue::Text(s) => s.clone(),
        }
    }

    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            PropertyValue::Int(n) => Cow::Owned(n.to_string()),
            PropertyValue::Text(s) => Cow::Borrowed(s),
        }
    }

    /// Integer view; text is parsed leniently.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(n) => Some(*n),
            PropertyValue::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            PropertyValue::Int(n) => *n != 0,
            PropertyValue::Text(s) => parse_bool(s),
        }
    }

    /// Convert to `ty`, failing if the value cannot represent it.
    pub fn coerce(self, key: &str, ty: PropertyType) -> ModelResult<Self> {
        match ty {
            PropertyType::Text => Ok(PropertyValue::Text(self.to_stored())),
            PropertyType::Bool => Ok(PropertyValue::from(self.as_bool())),
            PropertyType::Int => match self.as_int() {
                Some(n) => Ok(PropertyValue::Int(n)),
                None => Err(ModelError::InvalidProperty {
                    key: key.to_string(),
                    value: self.to_stored(),
                    expected: "integer",
                }),
            },
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Int(n) => write!(f, "{n}"),
            PropertyValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for PropertyValue {
    fn from(n: i64) -> Self {
        PropertyValue::Int(n)
    }
}

impl From<u64> for PropertyValue {
    fn from(n: u64) -> Self {
        PropertyValue::Int(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<Timestamp> for PropertyValue {
    fn from(ts: Timestamp) -> Self {
        PropertyValue::Int(ts.as_secs())
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Text(bool_to_stored(b).to_string())
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

/// Parse the loose boolean forms found in property hashes.
pub fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Stored form of a boolean.
pub fn bool_to_stored(b: bool) -> &'static str {
    if b {
        "1"
    } else {
        "0"
    }
}
