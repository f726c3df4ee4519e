use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{StoreError, StoreResult};
use crate::pattern::glob_match;
use crate::traits::{KeyValueStore, ScanPage, ScoreBound};

/// A single stored structure.
#[derive(Clone, Debug)]
enum Entry {
    Hash(BTreeMap<String, String>),
    Sorted(HashMap<String, f64>),
    Set(BTreeSet<String>),
}

impl Entry {
    fn kind(&self) -> &'static str {
        match self {
            Entry::Hash(_) => "hash",
            Entry::Sorted(_) => "sorted",
            Entry::Set(_) => "set",
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Entry::Hash(h) => h.is_empty(),
            Entry::Sorted(z) => z.is_empty(),
            Entry::Set(s) => s.is_empty(),
        }
    }
}

type Entries = HashMap<String, Entry>;

/// Scan cursors held at once; abandoned scans are evicted oldest first.
pub const MAX_OPEN_CURSORS: usize = 1024;

/// In-memory, HashMap-based key-value store.
///
/// Intended for tests and embedding. All structures live behind a single
/// `RwLock`, so each trait method is atomic with respect to the others, which
/// matches the per-primitive atomicity of a remote store. Scan cursors
/// remember the last key they returned, so deleting scanned keys between
/// batches never causes later keys to be skipped. At most
/// [`MAX_OPEN_CURSORS`] are kept; opening another forgets the oldest, which
/// then fails with [`StoreError::InvalidCursor`].
pub struct InMemoryStore {
    entries: RwLock<Entries>,
    cursors: Mutex<BTreeMap<u64, String>>,
    next_cursor: AtomicU64,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            cursors: Mutex::new(BTreeMap::new()),
            next_cursor: AtomicU64::new(1),
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read()?.len())
    }

    /// Returns `true` if no keys are stored.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.read()?.is_empty())
    }

    /// Every key, sorted.
    pub fn keys(&self) -> StoreResult<Vec<String>> {
        let mut keys: Vec<String> = self.read()?.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Entries>> {
        self.entries.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Entries>> {
        self.entries.write().map_err(|_| StoreError::LockPoisoned)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.entries.read().map(|e| e.len()).unwrap_or(0);
        f.debug_struct("InMemoryStore")
            .field("key_count", &count)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Typed access helpers
// ---------------------------------------------------------------------------

fn wrong_type(key: &str, expected: &'static str, found: &Entry) -> StoreError {
    StoreError::WrongType {
        key: key.to_string(),
        expected,
        found: found.kind(),
    }
}

fn hash_ref<'a>(entries: &'a Entries, key: &str) -> StoreResult<Option<&'a BTreeMap<String, String>>> {
    match entries.get(key) {
        None => Ok(None),
        Some(Entry::Hash(h)) => Ok(Some(h)),
        Some(other) => Err(wrong_type(key, "hash", other)),
    }
}

fn hash_mut<'a>(entries: &'a mut Entries, key: &str) -> StoreResult<&'a mut BTreeMap<String, String>> {
    match entries
        .entry(key.to_string())
        .or_insert_with(|| Entry::Hash(BTreeMap::new()))
    {
        Entry::Hash(h) => Ok(h),
        other => Err(wrong_type(key, "hash", other)),
    }
}

fn sorted_ref<'a>(entries: &'a Entries, key: &str) -> StoreResult<Option<&'a HashMap<String, f64>>> {
    match entries.get(key) {
        None => Ok(None),
        Some(Entry::Sorted(z)) => Ok(Some(z)),
        Some(other) => Err(wrong_type(key, "sorted", other)),
    }
}

fn sorted_mut<'a>(entries: &'a mut Entries, key: &str) -> StoreResult<&'a mut HashMap<String, f64>> {
    match entries
        .entry(key.to_string())
        .or_insert_with(|| Entry::Sorted(HashMap::new()))
    {
        Entry::Sorted(z) => Ok(z),
        other => Err(wrong_type(key, "sorted", other)),
    }
}

fn set_ref<'a>(entries: &'a Entries, key: &str) -> StoreResult<Option<&'a BTreeSet<String>>> {
    match entries.get(key) {
        None => Ok(None),
        Some(Entry::Set(s)) => Ok(Some(s)),
        Some(other) => Err(wrong_type(key, "set", other)),
    }
}

fn set_mut<'a>(entries: &'a mut Entries, key: &str) -> StoreResult<&'a mut BTreeSet<String>> {
    match entries
        .entry(key.to_string())
        .or_insert_with(|| Entry::Set(BTreeSet::new()))
    {
        Entry::Set(s) => Ok(s),
        other => Err(wrong_type(key, "set", other)),
    }
}

/// Drop `key` if its structure is empty.
fn prune(entries: &mut Entries, key: &str) {
    if entries.get(key).is_some_and(Entry::is_empty) {
        entries.remove(key);
    }
}

/// Members in ascending (score, member) order.
fn ordered(z: &HashMap<String, f64>) -> Vec<(String, f64)> {
    let mut members: Vec<(String, f64)> = z.iter().map(|(m, s)| (m.clone(), *s)).collect();
    members.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    members
}

/// Resolve an inclusive rank range with negative indices against `len`.
fn rank_window(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (start + len).max(0) } else { start };
    let stop = if stop < 0 { stop + len } else { stop.min(len - 1) };
    if len == 0 || start > stop || start >= len {
        return None;
    }
    Some((start as usize, stop as usize))
}

fn slice_ranks(members: Vec<(String, f64)>, start: i64, stop: i64) -> Vec<(String, f64)> {
    match rank_window(members.len(), start, stop) {
        Some((lo, hi)) => members.into_iter().skip(lo).take(hi - lo + 1).collect(),
        None => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// KeyValueStore
// ---------------------------------------------------------------------------

impl KeyValueStore for InMemoryStore {
    fn hget(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        let entries = self.read()?;
        Ok(hash_ref(&entries, key)?.and_then(|h| h.get(field).cloned()))
    }

    fn hgetall(&self, key: &str) -> StoreResult<BTreeMap<String, String>> {
        let entries = self.read()?;
        Ok(hash_ref(&entries, key)?.cloned().unwrap_or_default())
    }

    fn hset(&self, key: &str, field: &str, value: &str) -> StoreResult<bool> {
        let mut entries = self.write()?;
        let hash = hash_mut(&mut entries, key)?;
        Ok(hash.insert(field.to_string(), value.to_string()).is_none())
    }

    fn hset_many(&self, key: &str, fields: &[(String, String)]) -> StoreResult<()> {
        if fields.is_empty() {
            return Ok(());
        }
        let mut entries = self.write()?;
        let hash = hash_mut(&mut entries, key)?;
        for (field, value) in fields {
            hash.insert(field.clone(), value.clone());
        }
        Ok(())
    }

    fn hsetnx(&self, key: &str, field: &str, value: &str) -> StoreResult<bool> {
        let mut entries = self.write()?;
        let hash = hash_mut(&mut entries, key)?;
        if hash.contains_key(field) {
            return Ok(false);
        }
        hash.insert(field.to_string(), value.to_string());
        Ok(true)
    }

    fn hdel(&self, key: &str, fields: &[&str]) -> StoreResult<u64> {
        let mut entries = self.write()?;
        let removed = match entries.get_mut(key) {
            None => 0,
            Some(Entry::Hash(h)) => fields.iter().filter(|f| h.remove(**f).is_some()).count() as u64,
            Some(other) => return Err(wrong_type(key, "hash", other)),
        };
        prune(&mut entries, key);
        Ok(removed)
    }

    fn hincrby(&self, key: &str, field: &str, delta: i64) -> StoreResult<i64> {
        let mut entries = self.write()?;
        let hash = hash_mut(&mut entries, key)?;
        let current = match hash.get(field) {
            None => 0,
            Some(raw) => raw.parse::<i64>().map_err(|_| StoreError::NotAnInteger {
                key: key.to_string(),
                field: field.to_string(),
            })?,
        };
        let next = current.checked_add(delta).ok_or_else(|| {
            StoreError::Backend(format!("increment would overflow {key}/{field}"))
        })?;
        hash.insert(field.to_string(), next.to_string());
        Ok(next)
    }

    fn hlen(&self, key: &str) -> StoreResult<u64> {
        let entries = self.read()?;
        Ok(hash_ref(&entries, key)?.map_or(0, |h| h.len() as u64))
    }

    fn zadd(&self, key: &str, members: &[(f64, &str)]) -> StoreResult<u64> {
        if let Some((score, member)) = members.iter().find(|(s, _)| s.is_nan()) {
            return Err(StoreError::InvalidScore {
                key: key.to_string(),
                member: member.to_string(),
                score: *score,
            });
        }
        if members.is_empty() {
            return Ok(0);
        }
        let mut entries = self.write()?;
        let z = sorted_mut(&mut entries, key)?;
        let mut added = 0;
        for (score, member) in members {
            if z.insert(member.to_string(), *score).is_none() {
                added += 1;
            }
        }
        Ok(added)
    }

    fn zrange(&self, key: &str, start: i64, stop: i64) -> StoreResult<Vec<String>> {
        Ok(self
            .zrange_with_scores(key, start, stop)?
            .into_iter()
            .map(|(m, _)| m)
            .collect())
    }

    fn zrange_with_scores(&self, key: &str, start: i64, stop: i64) -> StoreResult<Vec<(String, f64)>> {
        let entries = self.read()?;
        let members = sorted_ref(&entries, key)?.map(ordered).unwrap_or_default();
        Ok(slice_ranks(members, start, stop))
    }

    fn zrevrange_with_scores(&self, key: &str, start: i64, stop: i64) -> StoreResult<Vec<(String, f64)>> {
        let entries = self.read()?;
        let mut members = sorted_ref(&entries, key)?.map(ordered).unwrap_or_default();
        members.reverse();
        Ok(slice_ranks(members, start, stop))
    }

    fn zrevrangebyscore(
        &self,
        key: &str,
        max: ScoreBound,
        min: ScoreBound,
        offset: usize,
        count: usize,
    ) -> StoreResult<Vec<(String, f64)>> {
        let entries = self.read()?;
        let members = sorted_ref(&entries, key)?.map(ordered).unwrap_or_default();
        Ok(members
            .into_iter()
            .rev()
            .filter(|(_, s)| max.admits_from_above(*s) && min.admits_from_below(*s))
            .skip(offset)
            .take(count)
            .collect())
    }

    fn zscore(&self, key: &str, member: &str) -> StoreResult<Option<f64>> {
        let entries = self.read()?;
        Ok(sorted_ref(&entries, key)?.and_then(|z| z.get(member).copied()))
    }

    fn zrem(&self, key: &str, members: &[&str]) -> StoreResult<u64> {
        let mut entries = self.write()?;
        let removed = match entries.get_mut(key) {
            None => 0,
            Some(Entry::Sorted(z)) => members.iter().filter(|m| z.remove(**m).is_some()).count() as u64,
            Some(other) => return Err(wrong_type(key, "sorted", other)),
        };
        prune(&mut entries, key);
        Ok(removed)
    }

    fn zcard(&self, key: &str) -> StoreResult<u64> {
        let entries = self.read()?;
        Ok(sorted_ref(&entries, key)?.map_or(0, |z| z.len() as u64))
    }

    fn sadd(&self, key: &str, members: &[&str]) -> StoreResult<u64> {
        if members.is_empty() {
            return Ok(0);
        }
        let mut entries = self.write()?;
        let set = set_mut(&mut entries, key)?;
        Ok(members.iter().filter(|m| set.insert(m.to_string())).count() as u64)
    }

    fn srem(&self, key: &str, members: &[&str]) -> StoreResult<u64> {
        let mut entries = self.write()?;
        let removed = match entries.get_mut(key) {
            None => 0,
            Some(Entry::Set(s)) => members.iter().filter(|m| s.remove(**m)).count() as u64,
            Some(other) => return Err(wrong_type(key, "set", other)),
        };
        prune(&mut entries, key);
        Ok(removed)
    }

    fn sismember(&self, key: &str, member: &str) -> StoreResult<bool> {
        let entries = self.read()?;
        Ok(set_ref(&entries, key)?.is_some_and(|s| s.contains(member)))
    }

    fn smembers(&self, key: &str) -> StoreResult<Vec<String>> {
        let entries = self.read()?;
        Ok(set_ref(&entries, key)?
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn scard(&self, key: &str) -> StoreResult<u64> {
        let entries = self.read()?;
        Ok(set_ref(&entries, key)?.map_or(0, |s| s.len() as u64))
    }

    fn scan(&self, cursor: u64, pattern: &str, count: usize) -> StoreResult<ScanPage> {
        let after = if cursor == 0 {
            None
        } else {
            let mut cursors = self.cursors.lock().map_err(|_| StoreError::LockPoisoned)?;
            Some(cursors.remove(&cursor).ok_or(StoreError::InvalidCursor(cursor))?)
        };

        let mut candidates: Vec<String> = {
            let entries = self.read()?;
            entries
                .keys()
                .filter(|k| after.as_deref().map_or(true, |a| k.as_str() > a))
                .cloned()
                .collect()
        };
        candidates.sort();

        let batch = count.max(1);
        let more = candidates.len() > batch;
        candidates.truncate(batch);

        let next = match (more, candidates.last()) {
            (true, Some(last)) => {
                let id = self.next_cursor.fetch_add(1, Ordering::Relaxed);
                let mut cursors = self.cursors.lock().map_err(|_| StoreError::LockPoisoned)?;
                while cursors.len() >= MAX_OPEN_CURSORS {
                    cursors.pop_first();
                }
                cursors.insert(id, last.clone());
                id
            }
            _ => 0,
        };

        Ok(ScanPage {
            cursor: next,
            keys: candidates
                .into_iter()
                .filter(|k| glob_match(pattern, k))
                .collect(),
        })
    }

    fn del(&self, keys: &[&str]) -> StoreResult<u64> {
        let mut entries = self.write()?;
        Ok(keys.iter().filter(|k| entries.remove(**k).is_some()).count() as u64)
    }

    fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.read()?.contains_key(key))
    }
}
