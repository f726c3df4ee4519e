use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// How the date and time halves of an ISO-8601 string are joined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsoStyle {
    /// `2024-03-01T12:00:00`
    #[default]
    TSeparator,
    /// `2024-03-01 12:00:00`
    Space,
}

/// Unix timestamp in whole seconds (UTC).
///
/// Stored as a plain integer field in property hashes; only rendered as an
/// ISO-8601 string when a record is serialized for callers.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs)
    }

    /// The current wall-clock time.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Self(secs as i64)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn as_secs(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Whole seconds from `earlier` to `self` (negative if `earlier` is later).
    pub fn seconds_since(&self, earlier: Timestamp) -> i64 {
        self.0 - earlier.0
    }

    /// Render as an ISO-8601 string without fractional seconds or offset.
    pub fn to_iso(&self, style: IsoStyle) -> Result<String, TypeError> {
        let dt = DateTime::from_timestamp(self.0, 0).ok_or(TypeError::TimestampOutOfRange(self.0))?;
        let fmt = match style {
            IsoStyle::TSeparator => "%Y-%m-%dT%H:%M:%S",
            IsoStyle::Space => "%Y-%m-%d %H:%M:%S",
        };
        Ok(dt.format(fmt).to_string())
    }

    /// Parse the decimal form used in property hashes.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| TypeError::InvalidTimestamp(s.to_string()))
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({}s)", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Timestamp {
    fn from(secs: i64) -> Self {
        Self(secs)
    }
}
