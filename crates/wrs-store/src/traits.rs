use std::collections::BTreeMap;

use crate::error::StoreResult;

/// One end of a score range for sorted-structure queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScoreBound {
    Inclusive(f64),
    Exclusive(f64),
    NegInfinity,
    PosInfinity,
}

impl ScoreBound {
    /// Returns `true` if `score` lies on the permitted side of this bound when
    /// used as a lower bound.
    pub fn admits_from_below(&self, score: f64) -> bool {
        match *self {
            ScoreBound::Inclusive(b) => score >= b,
            ScoreBound::Exclusive(b) => score > b,
            ScoreBound::NegInfinity => true,
            ScoreBound::PosInfinity => false,
        }
    }

    /// Returns `true` if `score` lies on the permitted side of this bound when
    /// used as an upper bound.
    pub fn admits_from_above(&self, score: f64) -> bool {
        match *self {
            ScoreBound::Inclusive(b) => score <= b,
            ScoreBound::Exclusive(b) => score < b,
            ScoreBound::NegInfinity => false,
            ScoreBound::PosInfinity => true,
        }
    }
}

/// One batch of a cursor-driven key scan.
///
/// A `cursor` of `0` means the scan is complete.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanPage {
    pub cursor: u64,
    pub keys: Vec<String>,
}

/// Remote key-value store offering hash, sorted, and set structures.
///
/// All implementations must satisfy these invariants:
/// - Every method is a single blocking round-trip and is atomic on its own.
/// - Nothing groups several calls into a transaction; callers that need
///   stronger guarantees coordinate externally.
/// - Reading a missing key behaves as reading an empty structure.
/// - A structure emptied by a removal is deleted.
/// - Rank ranges use inclusive `stop` and accept negative indices counting
///   from the end (`-1` is the last element).
/// - Backend failures are surfaced as errors, never retried.
pub trait KeyValueStore: Send + Sync {
    // ---- Hashes ----

    /// Read one field. Returns `Ok(None)` if the key or field is absent.
    fn hget(&self, key: &str, field: &str) -> StoreResult<Option<String>>;

    /// Read every field of a hash.
    fn hgetall(&self, key: &str) -> StoreResult<BTreeMap<String, String>>;

    /// Set one field, creating the hash if needed. Returns `true` if the
    /// field is new.
    fn hset(&self, key: &str, field: &str, value: &str) -> StoreResult<bool>;

    /// Set several fields in one call.
    fn hset_many(&self, key: &str, fields: &[(String, String)]) -> StoreResult<()>;

    /// Set a field only if it is absent. Returns `true` if the write happened.
    fn hsetnx(&self, key: &str, field: &str, value: &str) -> StoreResult<bool>;

    /// Delete fields. Returns how many existed.
    fn hdel(&self, key: &str, fields: &[&str]) -> StoreResult<u64>;

    /// Atomically add `delta` to an integer field (absent counts as 0) and
    /// return the new value.
    fn hincrby(&self, key: &str, field: &str, delta: i64) -> StoreResult<i64>;

    /// Number of fields in a hash.
    fn hlen(&self, key: &str) -> StoreResult<u64>;

    // ---- Sorted structures ----

    /// Add or rescore members. Returns how many members were new.
    fn zadd(&self, key: &str, members: &[(f64, &str)]) -> StoreResult<u64>;

    /// Members by ascending rank over `[start, stop]`.
    fn zrange(&self, key: &str, start: i64, stop: i64) -> StoreResult<Vec<String>>;

    /// Members with scores by ascending rank over `[start, stop]`.
    fn zrange_with_scores(
        &self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> StoreResult<Vec<(String, f64)>>;

    /// Members with scores by descending rank over `[start, stop]`.
    fn zrevrange_with_scores(
        &self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> StoreResult<Vec<(String, f64)>>;

    /// Members with scores between `max` and `min`, highest first, skipping
    /// `offset` matches and returning at most `count`.
    fn zrevrangebyscore(
        &self,
        key: &str,
        max: ScoreBound,
        min: ScoreBound,
        offset: usize,
        count: usize,
    ) -> StoreResult<Vec<(String, f64)>>;

    /// Score of one member, or `Ok(None)` if it is not a member.
    fn zscore(&self, key: &str, member: &str) -> StoreResult<Option<f64>>;

    /// Remove members. Returns how many existed.
    fn zrem(&self, key: &str, members: &[&str]) -> StoreResult<u64>;

    /// Number of members.
    fn zcard(&self, key: &str) -> StoreResult<u64>;

    // ---- Sets ----

    /// Add members. Returns how many were new.
    fn sadd(&self, key: &str, members: &[&str]) -> StoreResult<u64>;

    /// Remove members. Returns how many existed.
    fn srem(&self, key: &str, members: &[&str]) -> StoreResult<u64>;

    fn sismember(&self, key: &str, member: &str) -> StoreResult<bool>;

    /// Every member, in no particular order.
    fn smembers(&self, key: &str) -> StoreResult<Vec<String>>;

    fn scard(&self, key: &str) -> StoreResult<u64>;

    // ---- Keys ----

    /// Scan keys matching a glob `pattern`, resuming from `cursor` (`0`
    /// starts a new scan). `count` is a batch-size hint.
    fn scan(&self, cursor: u64, pattern: &str, count: usize) -> StoreResult<ScanPage>;

    /// Delete whole keys of any kind. Returns how many existed.
    fn del(&self, keys: &[&str]) -> StoreResult<u64>;

    fn exists(&self, key: &str) -> StoreResult<bool>;

    /// Drive [`Self::scan`] until the cursor returns to `0`, collecting every
    /// matching key. Keys may repeat if the keyspace changes mid-scan.
    fn scan_all(&self, pattern: &str, count: usize) -> StoreResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut cursor = 0;
        loop {
            let page = self.scan(cursor, pattern, count)?;
            keys.extend(page.keys);
            if page.cursor == 0 {
                break;
            }
            cursor = page.cursor;
        }
        Ok(keys)
    }
}
