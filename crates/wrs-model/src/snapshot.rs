use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use wrs_types::IsoStyle;

/// Options for [`crate::EntityRecord::serialize`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SerializeOptions {
    /// Add `duration = recorded_at - created_at` (0 when never recorded).
    pub include_duration: bool,
    /// Timestamp separator; falls back to the context's configured style.
    pub iso_style: Option<IsoStyle>,
}

impl SerializeOptions {
    pub fn with_duration() -> Self {
        Self {
            include_duration: true,
            iso_style: None,
        }
    }
}

/// Caller-facing copy of a record's properties.
///
/// Holds every stored property plus the derived `id`, `timespan`, and
/// optionally `duration` fields, with `created_at`/`updated_at` rendered as
/// ISO-8601 strings.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RecordSnapshot(BTreeMap<String, Value>);

impl RecordSnapshot {
    pub(crate) fn new(fields: BTreeMap<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(Value::as_i64)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.0
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone().into_iter().collect())
    }
}
