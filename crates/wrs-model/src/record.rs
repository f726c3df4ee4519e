//! Hash-backed entity records.
//!
//! An [`EntityRecord`] is a property bag stored as one hash under
//! `{type}:{id}:info`. Properties are cached locally: a full [`load`] reads
//! the whole hash once, after which reads are served from the snapshot; an
//! unloaded record fetches single fields on demand.
//!
//! [`load`]: EntityRecord::load

use std::any::TypeId;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde_json::Value;
use tracing::{debug, info, warn};
use wrs_access::AccessPolicy;
use wrs_types::{EntityId, EntityRef, IsoStyle, Timestamp};

use crate::context::Context;
use crate::error::ModelResult;
use crate::kind::EntityKind;
use crate::property::{
    GetOptions, Properties, PropertyType, PropertyValue, CREATED_AT, OWNER, PUBLIC, RECORDED_AT,
    SIZE, UPDATED_AT,
};
use crate::snapshot::{RecordSnapshot, SerializeOptions};

/// A stored entity of kind `K`.
///
/// The `id` never changes once assigned. The `name` is a local display name:
/// it defaults to the id and is assigned by whichever container the record
/// is added to. The owner is kept as an id and only turned into a record by
/// an explicit [`EntityRecord::resolve_owner`] call.
pub struct EntityRecord<K: EntityKind> {
    ctx: Context,
    id: EntityId,
    name: String,
    info_key: String,
    data: Properties,
    loaded: bool,
    owner: Option<EntityId>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: EntityKind> EntityRecord<K> {
    // ---- Construction ----

    /// A handle to an existing entity. Nothing is read until needed.
    pub fn open(ctx: Context, id: EntityId) -> Self {
        let name = id.to_string();
        Self::open_named(ctx, id, name)
    }

    /// A handle to an existing entity known under `name` in some container.
    pub fn open_named(ctx: Context, id: EntityId, name: impl Into<String>) -> Self {
        let info_key = K::info_template().render(K::TYPE_TAG, &id);
        Self {
            ctx,
            id,
            name: name.into(),
            info_key,
            data: Properties::new(),
            loaded: false,
            owner: None,
            _kind: PhantomData,
        }
    }

    /// A handle to an existing entity with its properties loaded.
    pub fn open_loaded(ctx: Context, id: EntityId) -> ModelResult<Self> {
        let mut record = Self::open(ctx, id);
        record.load()?;
        Ok(record)
    }

    /// Create and persist a new entity with a fresh id.
    ///
    /// `created_at` and `updated_at` are both set to now; `owner` is written
    /// if given. Store failures are returned as-is.
    pub fn create(ctx: Context, owner: Option<&EntityId>) -> ModelResult<Self> {
        let mut record = Self::open(ctx, EntityId::generate());
        let now = Timestamp::now();
        record.data.insert(CREATED_AT.to_string(), now.into());
        record.data.insert(UPDATED_AT.to_string(), now.into());
        if let Some(owner) = owner {
            record.data.insert(OWNER.to_string(), owner.as_str().into());
            record.owner = Some(owner.clone());
        }
        record.commit()?;
        info!(kind = K::TYPE_TAG, id = %record.id, "created entity");
        Ok(record)
    }

    /// Write every cached property to the store in one call.
    pub fn commit(&self) -> ModelResult<()> {
        let fields: Vec<(String, String)> = self
            .data
            .iter()
            .map(|(k, v)| (k.clone(), v.to_stored()))
            .collect();
        self.ctx.store().hset_many(&self.info_key, &fields)?;
        Ok(())
    }

    // ---- Identity ----

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Change the local display name. Containers call this; it is not
    /// persisted in the property hash.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn type_tag(&self) -> &'static str {
        K::TYPE_TAG
    }

    pub fn info_key(&self) -> &str {
        &self.info_key
    }

    /// The handle passed to capability checks.
    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::new(K::TYPE_TAG, self.id.clone())
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn access(&self) -> &dyn AccessPolicy {
        self.ctx.access()
    }

    // ---- Loading and generic access ----

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// The cached properties, complete only after [`Self::load`].
    pub fn properties(&self) -> &Properties {
        &self.data
    }

    /// Fetch the full property hash and mark the record loaded.
    pub fn load(&mut self) -> ModelResult<&Properties> {
        let raw = self.ctx.store().hgetall(&self.info_key)?;
        self.data = raw
            .into_iter()
            .map(|(k, v)| {
                let value = PropertyValue::from_stored(&k, v);
                (k, value)
            })
            .collect();
        self.loaded = true;
        self.owner = None;
        Ok(&self.data)
    }

    /// Read a property, falling back to `default` when it is absent.
    ///
    /// A loaded record answers from its snapshot. An unloaded record fetches
    /// the field when it is not cached or when `opts.refresh` is set.
    pub fn get(
        &mut self,
        key: &str,
        default: impl Into<PropertyValue>,
        opts: GetOptions,
    ) -> ModelResult<PropertyValue> {
        let value = self
            .fetch(key, opts.refresh)?
            .unwrap_or_else(|| default.into());
        match opts.coerce {
            Some(ty) => value.coerce(key, ty),
            None => Ok(value),
        }
    }

    /// Read a property as its stored string.
    pub fn get_raw(&mut self, key: &str) -> ModelResult<Option<String>> {
        Ok(self.fetch(key, false)?.map(|v| v.to_stored()))
    }

    /// Write a property as a plain string.
    pub fn set_raw(&mut self, key: &str, value: &str) -> ModelResult<()> {
        self.set(key, value)
    }

    pub fn get_int(&mut self, key: &str, refresh: bool) -> ModelResult<Option<i64>> {
        match self.fetch(key, refresh)? {
            None => Ok(None),
            Some(v) => Ok(v.coerce(key, PropertyType::Int)?.as_int()),
        }
    }

    pub fn get_bool(&mut self, key: &str, default: bool) -> ModelResult<bool> {
        Ok(self.fetch(key, false)?.map_or(default, |v| v.as_bool()))
    }

    pub fn set_bool(&mut self, key: &str, value: bool) -> ModelResult<()> {
        self.set(key, value)
    }

    /// Write a property and, unless the property is `updated_at` itself,
    /// refresh `updated_at`.
    pub fn set(&mut self, key: &str, value: impl Into<PropertyValue>) -> ModelResult<()> {
        self.write_field(key, value.into())?;
        if key != UPDATED_AT {
            self.touch()?;
        }
        Ok(())
    }

    /// Atomically add `delta` to an integer property and refresh `updated_at`.
    pub fn incr(&mut self, key: &str, delta: i64) -> ModelResult<i64> {
        let value = self.ctx.store().hincrby(&self.info_key, key, delta)?;
        self.data.insert(key.to_string(), PropertyValue::Int(value));
        if key != UPDATED_AT {
            self.touch()?;
        }
        Ok(value)
    }

    fn fetch(&mut self, key: &str, refresh: bool) -> ModelResult<Option<PropertyValue>> {
        if !self.loaded && (refresh || !self.data.contains_key(key)) {
            match self.ctx.store().hget(&self.info_key, key)? {
                Some(raw) => {
                    self.data
                        .insert(key.to_string(), PropertyValue::from_stored(key, raw));
                }
                None => {
                    self.data.remove(key);
                }
            }
        }
        Ok(self.data.get(key).cloned())
    }

    fn write_field(&mut self, key: &str, value: PropertyValue) -> ModelResult<()> {
        let stored = value.to_stored();
        self.ctx.store().hset(&self.info_key, key, &stored)?;
        self.data
            .insert(key.to_string(), PropertyValue::from_stored(key, stored));
        Ok(())
    }

    /// Set `updated_at` to now, never moving it backwards.
    fn touch(&mut self) -> ModelResult<()> {
        let last = self
            .data
            .get(UPDATED_AT)
            .and_then(PropertyValue::as_int)
            .unwrap_or(0);
        let now = Timestamp::now().as_secs().max(last);
        self.write_field(UPDATED_AT, PropertyValue::Int(now))
    }

    // ---- Typed accessors ----

    /// Size in bytes. Always re-read on unloaded records, since containers
    /// adjust it through their own handles.
    pub fn size(&mut self) -> ModelResult<u64> {
        let size = self.get_int(SIZE, true)?.unwrap_or(0);
        if size < 0 {
            warn!(kind = K::TYPE_TAG, id = %self.id, size, "negative size clamped to zero");
        }
        Ok(size.max(0) as u64)
    }

    pub fn incr_size(&mut self, delta: i64) -> ModelResult<i64> {
        self.incr(SIZE, delta)
    }

    pub fn created_at(&mut self) -> ModelResult<Timestamp> {
        Ok(Timestamp::from_secs(self.get_int(CREATED_AT, false)?.unwrap_or(0)))
    }

    pub fn updated_at(&mut self) -> ModelResult<Timestamp> {
        Ok(Timestamp::from_secs(self.get_int(UPDATED_AT, false)?.unwrap_or(0)))
    }

    /// When recording finished, if it ever did.
    pub fn recorded_at(&mut self) -> ModelResult<Option<Timestamp>> {
        Ok(self
            .get_int(RECORDED_AT, false)?
            .filter(|secs| *secs != 0)
            .map(Timestamp::from_secs))
    }

    pub fn set_recorded_at(&mut self, ts: Timestamp) -> ModelResult<()> {
        self.set(RECORDED_AT, ts)
    }

    pub fn is_public(&mut self) -> ModelResult<bool> {
        self.get_bool(PUBLIC, false)
    }

    pub fn set_public(&mut self, public: bool) -> ModelResult<()> {
        self.set_bool(PUBLIC, public)
    }

    // ---- Ownership ----

    /// The owner's id, from the cached reference or the `owner` property.
    pub fn owner_id(&mut self) -> ModelResult<Option<EntityId>> {
        if let Some(owner) = &self.owner {
            return Ok(Some(owner.clone()));
        }
        let owner = self
            .get_raw(OWNER)?
            .filter(|s| !s.is_empty())
            .map(EntityId::from_raw);
        self.owner = owner.clone();
        Ok(owner)
    }

    /// Build an unloaded handle to the owner, or `None` if no owner is set.
    pub fn resolve_owner<O: EntityKind>(&mut self) -> ModelResult<Option<EntityRecord<O>>> {
        Ok(self
            .owner_id()?
            .map(|id| EntityRecord::open(self.ctx.clone(), id)))
    }

    /// Persist `owner` as this record's owner.
    pub fn set_owner(&mut self, owner: &EntityId) -> ModelResult<()> {
        self.set(OWNER, owner.as_str())?;
        self.owner = Some(owner.clone());
        Ok(())
    }

    pub fn is_owned_by<O: EntityKind>(&mut self, owner: &EntityRecord<O>) -> ModelResult<bool> {
        Ok(self.owner_id()?.as_ref() == Some(owner.id()))
    }

    /// Remember the owner without writing it; used when a collection hands
    /// out handles to its members.
    pub(crate) fn cache_owner(&mut self, owner: &EntityId) {
        self.owner = Some(owner.clone());
    }

    // ---- Serialization and deletion ----

    /// A caller-facing copy of every property plus derived fields.
    ///
    /// Loads the record first if needed. `timespan` is `updated_at -
    /// created_at`; `duration` (on request) is `recorded_at - created_at`,
    /// or 0 if never recorded. Timestamps become ISO-8601 strings.
    pub fn serialize(&mut self, opts: SerializeOptions) -> ModelResult<RecordSnapshot> {
        if !self.loaded {
            self.load()?;
        }
        let style = opts.iso_style.unwrap_or(self.ctx.config().iso_style);

        let mut fields: BTreeMap<String, Value> = self
            .data
            .iter()
            .map(|(k, v)| (k.clone(), property_json(v)))
            .collect();
        fields.insert("id".to_string(), Value::String(self.id.to_string()));

        let created = self.timestamp_field(CREATED_AT);
        let updated = self.timestamp_field(UPDATED_AT);
        fields.insert("timespan".to_string(), Value::from(updated.seconds_since(created)));

        if opts.include_duration {
            let recorded = self.timestamp_field(RECORDED_AT);
            let duration = if recorded.is_zero() {
                0
            } else {
                recorded.seconds_since(created)
            };
            fields.insert("duration".to_string(), Value::from(duration));
        }

        fields.insert(CREATED_AT.to_string(), iso_or_raw(created, style));
        fields.insert(UPDATED_AT.to_string(), iso_or_raw(updated, style));
        Ok(RecordSnapshot::new(fields))
    }

    fn timestamp_field(&self, key: &str) -> Timestamp {
        Timestamp::from_secs(
            self.data
                .get(key)
                .and_then(PropertyValue::as_int)
                .unwrap_or(0),
        )
    }

    /// Delete every key belonging to this entity.
    ///
    /// Keys are found by scanning `{type}:{id}:*` in batches of
    /// `scan_batch_size`, resuming from the store's cursor. Returns `false`
    /// if there was nothing to delete. Deletion is irreversible.
    pub fn delete(&self) -> ModelResult<bool> {
        let pattern = K::all_keys_template().render(K::TYPE_TAG, &self.id);
        let batch = self.ctx.config().scan_batch_size;
        let store = self.ctx.store();

        let mut cursor = 0;
        let mut deleted = 0u64;
        loop {
            let page = store.scan(cursor, &pattern, batch)?;
            if !page.keys.is_empty() {
                let keys: Vec<&str> = page.keys.iter().map(String::as_str).collect();
                deleted += store.del(&keys)?;
            }
            if page.cursor == 0 {
                break;
            }
            cursor = page.cursor;
        }

        if deleted > 0 {
            info!(kind = K::TYPE_TAG, id = %self.id, keys = deleted, "deleted entity");
        } else {
            debug!(kind = K::TYPE_TAG, id = %self.id, "nothing to delete");
        }
        Ok(deleted > 0)
    }
}

fn property_json(value: &PropertyValue) -> Value {
    match value {
        PropertyValue::Int(n) => Value::from(*n),
        PropertyValue::Text(s) => Value::String(s.clone()),
    }
}

fn iso_or_raw(ts: Timestamp, style: IsoStyle) -> Value {
    ts.to_iso(style)
        .map(Value::String)
        .unwrap_or_else(|_| Value::from(ts.as_secs()))
}

impl<K: EntityKind> Clone for EntityRecord<K> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            id: self.id.clone(),
            name: self.name.clone(),
            info_key: self.info_key.clone(),
            data: self.data.clone(),
            loaded: self.loaded,
            owner: self.owner.clone(),
            _kind: PhantomData,
        }
    }
}

/// Records are equal when they are of the same kind and share an id.
impl<K: EntityKind, O: EntityKind> PartialEq<EntityRecord<O>> for EntityRecord<K> {
    fn eq(&self, other: &EntityRecord<O>) -> bool {
        TypeId::of::<K>() == TypeId::of::<O>() && self.id == other.id
    }
}

impl<K: EntityKind> Eq for EntityRecord<K> {}

impl<K: EntityKind> fmt::Debug for EntityRecord<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRecord")
            .field("kind", &K::TYPE_TAG)
            .field("id", &self.id)
            .field("name", &self.name)
            .field("loaded", &self.loaded)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wrs_store::KeyValueStore;

    struct Rec;
    impl EntityKind for Rec {
        const TYPE_TAG: &'static str = "rec";
    }

    struct Other;
    impl EntityKind for Other {
        const TYPE_TAG: &'static str = "other";
    }

    #[test]
    fn create_persists_timestamps() {
        let ctx = Context::in_memory();
        let rec = EntityRecord::<Rec>::create(ctx.clone(), None).unwrap();
        let stored = ctx.store().hgetall(rec.info_key()).unwrap();
        assert!(stored.contains_key(CREATED_AT));
        assert_eq!(stored[CREATED_AT], stored[UPDATED_AT]);
        assert_eq!(rec.name(), rec.id().as_str());
        assert_eq!(rec.type_tag(), "rec");
        assert_eq!(rec.entity_ref().to_string(), format!("rec:{}", rec.id()));
        assert_eq!(rec.info_key(), format!("rec:{}:info", rec.id()));
        assert!(!rec.is_loaded());
    }

    #[test]
    fn create_with_owner_records_it() {
        let ctx = Context::in_memory();
        let owner = EntityId::from_raw("u1");
        let rec = EntityRecord::<Rec>::create(ctx.clone(), Some(&owner)).unwrap();
        let mut reopened = EntityRecord::<Rec>::open(ctx, rec.id().clone());
        assert_eq!(reopened.owner_id().unwrap(), Some(owner));
    }

    #[test]
    fn missing_record_reads_defaults() {
        let ctx = Context::in_memory();
        let mut rec = EntityRecord::<Rec>::open(ctx, EntityId::from_raw("ghost"));
        assert_eq!(rec.size().unwrap(), 0);
        assert_eq!(rec.get_raw("title").unwrap(), None);
        assert_eq!(
            rec.get("title", "untitled", GetOptions::default()).unwrap(),
            PropertyValue::Text("untitled".into())
        );
        assert!(!rec.is_public().unwrap());
        assert!(rec.resolve_owner::<Other>().unwrap().is_none());
        assert_eq!(rec.recorded_at().unwrap(), None);
    }

    #[test]
    fn set_refreshes_updated_at_except_for_itself() {
        let ctx = Context::in_memory();
        let mut rec = EntityRecord::<Rec>::create(ctx.clone(), None).unwrap();

        rec.set(UPDATED_AT, 5i64).unwrap();
        assert_eq!(rec.updated_at().unwrap(), Timestamp::from_secs(5));
        assert_eq!(
            ctx.store().hget(rec.info_key(), UPDATED_AT).unwrap().as_deref(),
            Some("5")
        );

        rec.set("title", "hello").unwrap();
        assert!(rec.updated_at().unwrap().as_secs() > 5);
    }

    #[test]
    fn updated_at_never_moves_backwards() {
        let ctx = Context::in_memory();
        let mut rec = EntityRecord::<Rec>::create(ctx, None).unwrap();
        let future = Timestamp::now().as_secs() + 10_000;
        rec.set(UPDATED_AT, future).unwrap();
        rec.set("title", "x").unwrap();
        assert_eq!(rec.updated_at().unwrap().as_secs(), future);
    }

    #[test]
    fn unloaded_reads_fetch_and_cache() {
        let ctx = Context::in_memory();
        let rec = EntityRecord::<Rec>::create(ctx.clone(), None).unwrap();
        ctx.store().hset(rec.info_key(), "title", "first").unwrap();

        let mut handle = EntityRecord::<Rec>::open(ctx.clone(), rec.id().clone());
        assert_eq!(handle.get_raw("title").unwrap().as_deref(), Some("first"));

        ctx.store().hset(rec.info_key(), "title", "second").unwrap();
        assert_eq!(handle.get_raw("title").unwrap().as_deref(), Some("first"));
        let fresh = handle
            .get("title", "", GetOptions::refreshed())
            .unwrap();
        assert_eq!(fresh, PropertyValue::Text("second".into()));
    }

    #[test]
    fn loaded_records_answer_from_snapshot() {
        let ctx = Context::in_memory();
        let rec = EntityRecord::<Rec>::create(ctx.clone(), None).unwrap();
        let mut loaded = EntityRecord::<Rec>::open_loaded(ctx.clone(), rec.id().clone()).unwrap();
        ctx.store().hincrby(rec.info_key(), SIZE, 7).unwrap();
        assert_eq!(loaded.size().unwrap(), 0);
        loaded.load().unwrap();
        assert_eq!(loaded.size().unwrap(), 7);
    }

    #[test]
    fn size_is_refreshed_on_unloaded_records() {
        let ctx = Context::in_memory();
        let mut rec = EntityRecord::<Rec>::create(ctx.clone(), None).unwrap();
        assert_eq!(rec.size().unwrap(), 0);
        ctx.store().hincrby(rec.info_key(), SIZE, 12).unwrap();
        assert_eq!(rec.size().unwrap(), 12);
    }

    #[test]
    fn incr_updates_cache() {
        let ctx = Context::in_memory();
        let mut rec = EntityRecord::<Rec>::create(ctx, None).unwrap();
        assert_eq!(rec.incr_size(10).unwrap(), 10);
        assert_eq!(rec.incr_size(-3).unwrap(), 7);
        assert_eq!(rec.properties()[SIZE], PropertyValue::Int(7));
    }

    #[test]
    fn coerced_get() {
        let ctx = Context::in_memory();
        let mut rec = EntityRecord::<Rec>::create(ctx, None).unwrap();
        rec.set_raw("pages", "12").unwrap();
        let pages = rec
            .get("pages", 0i64, GetOptions::coerced(PropertyType::Int))
            .unwrap();
        assert_eq!(pages, PropertyValue::Int(12));
        rec.set_raw("pages", "many").unwrap();
        assert!(rec
            .get("pages", 0i64, GetOptions::coerced(PropertyType::Int))
            .is_err());
    }

    #[test]
    fn booleans_round_trip_as_digits() {
        let ctx = Context::in_memory();
        let mut rec = EntityRecord::<Rec>::create(ctx.clone(), None).unwrap();
        rec.set_public(true).unwrap();
        assert_eq!(
            ctx.store().hget(rec.info_key(), PUBLIC).unwrap().as_deref(),
            Some("1")
        );
        let mut other = EntityRecord::<Rec>::open(ctx, rec.id().clone());
        assert!(other.is_public().unwrap());
        other.set_public(false).unwrap();
        assert!(!other.is_public().unwrap());
    }

    #[test]
    fn serialize_derives_fields() {
        let ctx = Context::in_memory();
        let mut rec = EntityRecord::<Rec>::create(ctx, None).unwrap();
        rec.set(CREATED_AT, 1_700_000_000i64).unwrap();
        rec.set(UPDATED_AT, 1_700_000_060i64).unwrap();
        rec.set(RECORDED_AT, 1_700_000_030i64).unwrap();
        rec.set(UPDATED_AT, 1_700_000_060i64).unwrap();
        rec.set("title", "demo").unwrap();
        rec.set(UPDATED_AT, 1_700_000_060i64).unwrap();

        let snap = rec.serialize(SerializeOptions::with_duration()).unwrap();
        assert_eq!(snap.get_str("id"), Some(rec.id().as_str()));
        assert_eq!(snap.get_i64("timespan"), Some(60));
        assert_eq!(snap.get_i64("duration"), Some(30));
        assert_eq!(snap.get_str(CREATED_AT), Some("2023-11-14T22:13:20"));
        assert_eq!(snap.get_str(UPDATED_AT), Some("2023-11-14T22:14:20"));
        assert_eq!(snap.get_i64(RECORDED_AT), Some(1_700_000_030));
        assert_eq!(snap.get_str("title"), Some("demo"));
        assert!(rec.is_loaded());
    }

    #[test]
    fn serialize_without_recording_and_with_space_style() {
        let ctx = Context::in_memory();
        let mut rec = EntityRecord::<Rec>::create(ctx, None).unwrap();
        rec.set(CREATED_AT, 0i64).unwrap();
        rec.set(UPDATED_AT, 0i64).unwrap();
        let snap = rec
            .serialize(SerializeOptions {
                include_duration: true,
                iso_style: Some(IsoStyle::Space),
            })
            .unwrap();
        assert_eq!(snap.get_i64("duration"), Some(0));
        assert_eq!(snap.get_str(CREATED_AT), Some("1970-01-01 00:00:00"));

        let plain = rec.serialize(SerializeOptions::default()).unwrap();
        assert!(plain.get("duration").is_none());
    }

    #[test]
    fn delete_removes_every_owned_key() {
        let ctx = Context::in_memory();
        let rec = EntityRecord::<Rec>::create(ctx.clone(), None).unwrap();
        let order_key = format!("rec:{}:order", rec.id());
        ctx.store().zadd(&order_key, &[(1.0, "x")]).unwrap();
        ctx.store().hset("rec:someone-else:info", "a", "1").unwrap();

        assert!(rec.delete().unwrap());
        assert!(!ctx.store().exists(rec.info_key()).unwrap());
        assert!(!ctx.store().exists(&order_key).unwrap());
        assert!(ctx.store().exists("rec:someone-else:info").unwrap());
        assert!(!rec.delete().unwrap());
    }

    #[test]
    fn delete_spans_many_scan_batches() {
        let store = std::sync::Arc::new(wrs_store::InMemoryStore::new());
        let config = crate::ModelConfig {
            scan_batch_size: 3,
            ..Default::default()
        };
        let ctx = Context::new(
            store.clone(),
            std::sync::Arc::new(wrs_access::PermissiveAccess),
            config,
        );
        let rec = EntityRecord::<Rec>::create(ctx.clone(), None).unwrap();
        for i in 0..20 {
            store.sadd(&format!("rec:{}:set{i}", rec.id()), &["m"]).unwrap();
        }
        assert!(rec.delete().unwrap());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn equality_is_kind_and_id() {
        let ctx = Context::in_memory();
        let id = EntityId::from_raw("same");
        let a = EntityRecord::<Rec>::open(ctx.clone(), id.clone());
        let b = EntityRecord::<Rec>::open_named(ctx.clone(), id.clone(), "other-name");
        let c = EntityRecord::<Other>::open(ctx.clone(), id);
        let d = EntityRecord::<Rec>::open(ctx, EntityId::from_raw("different"));
        assert_eq!(a, b);
        assert!(a != c);
        assert_ne!(a, d);
    }

    #[test]
    fn resolve_owner_builds_typed_handle() {
        let ctx = Context::in_memory();
        let owner = EntityRecord::<Other>::create(ctx.clone(), None).unwrap();
        let mut rec = EntityRecord::<Rec>::create(ctx, None).unwrap();
        rec.set_owner(owner.id()).unwrap();
        let resolved = rec.resolve_owner::<Other>().unwrap().unwrap();
        assert_eq!(resolved, owner);
        assert!(rec.is_owned_by(&owner).unwrap());
    }

    #[test]
    fn access_travels_with_the_record() {
        let ctx = Context::in_memory()
            .with_access(std::sync::Arc::new(wrs_access::ReadOnlyAccess::anonymous()));
        let rec = EntityRecord::<Rec>::open(ctx, EntityId::from_raw("r1"));
        assert!(rec.access().assert_can_read(&rec.entity_ref()).is_ok());
        assert!(rec.access().assert_can_write(&rec.entity_ref()).is_err());
    }
}
