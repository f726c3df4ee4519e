//! Unordered member sets under `{type}:{id}:members`.

use tracing::debug;
use wrs_types::{EntityId, KeyTemplate};

use crate::context::Context;
use crate::error::ModelResult;
use crate::kind::EntityKind;
use crate::record::EntityRecord;

/// A set of child ids owned by one entity. Membership only; no order.
#[derive(Clone, Debug)]
pub struct UnorderedCollection {
    ctx: Context,
    owner: EntityId,
    key: String,
}

impl UnorderedCollection {
    pub fn new(ctx: Context, owner_tag: &str, owner: EntityId, template: KeyTemplate) -> Self {
        let key = template.render(owner_tag, &owner);
        Self { ctx, owner, key }
    }

    pub fn for_record<K: EntityKind>(record: &EntityRecord<K>) -> Self {
        Self::with_template(record, KeyTemplate::MEMBERS)
    }

    pub fn with_template<K: EntityKind>(record: &EntityRecord<K>, template: KeyTemplate) -> Self {
        Self::new(
            record.context().clone(),
            K::TYPE_TAG,
            record.id().clone(),
            template,
        )
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn owner_id(&self) -> &EntityId {
        &self.owner
    }

    /// Add `entity`; returns `false` if it was already a member.
    pub fn add<E: EntityKind>(&self, entity: &mut EntityRecord<E>, as_owner: bool) -> ModelResult<bool> {
        let added = self.ctx.store().sadd(&self.key, &[entity.id().as_str()])? > 0;
        if as_owner {
            entity.set_owner(&self.owner)?;
        }
        debug!(collection = %self.key, id = %entity.id(), added, "added member");
        Ok(added)
    }

    pub fn remove<E: EntityKind>(&self, entity: &EntityRecord<E>) -> ModelResult<u64> {
        self.remove_id(entity.id())
    }

    pub fn remove_id(&self, id: &EntityId) -> ModelResult<u64> {
        Ok(self.ctx.store().srem(&self.key, &[id.as_str()])?)
    }

    /// Membership test. `None` when there is nothing to test: no id, a
    /// blank id, or the wildcard.
    pub fn contains_id(&self, id: Option<&EntityId>) -> ModelResult<Option<bool>> {
        match id {
            Some(id) if !id.is_blank_or_wildcard() => {
                Ok(Some(self.ctx.store().sismember(&self.key, id.as_str())?))
            }
            _ => Ok(None),
        }
    }

    pub fn count(&self) -> ModelResult<u64> {
        Ok(self.ctx.store().scard(&self.key)?)
    }

    /// Member ids, sorted.
    pub fn list_ids(&self) -> ModelResult<Vec<EntityId>> {
        let mut ids = self.ctx.store().smembers(&self.key)?;
        ids.sort();
        Ok(ids.into_iter().map(EntityId::from_raw).collect())
    }

    /// One record per member, loaded when `load` is set, each reporting
    /// this collection's owner as its owner.
    pub fn list<E: EntityKind>(&self, load: bool) -> ModelResult<Vec<EntityRecord<E>>> {
        self.list_ids()?
            .into_iter()
            .map(|id| {
                let mut record = EntityRecord::open(self.ctx.clone(), id);
                if load {
                    record.load()?;
                }
                record.cache_owner(&self.owner);
                Ok(record)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct User;
    impl EntityKind for User {
        const TYPE_TAG: &'static str = "user";
    }

    struct Coll;
    impl EntityKind for Coll {
        const TYPE_TAG: &'static str = "coll";
    }

    #[test]
    fn membership() {
        let ctx = Context::in_memory();
        let user = EntityRecord::<User>::create(ctx.clone(), None).unwrap();
        let set = UnorderedCollection::for_record(&user);
        assert_eq!(set.key(), format!("user:{}:members", user.id()));

        let mut a = EntityRecord::<Coll>::create(ctx.clone(), None).unwrap();
        let mut b = EntityRecord::<Coll>::create(ctx, None).unwrap();
        assert!(set.add(&mut a, true).unwrap());
        assert!(!set.add(&mut a, true).unwrap());
        assert!(set.add(&mut b, false).unwrap());

        assert_eq!(set.count().unwrap(), 2);
        assert_eq!(set.contains_id(Some(a.id())).unwrap(), Some(true));
        assert_eq!(
            set.contains_id(Some(&EntityId::from_raw("nope"))).unwrap(),
            Some(false)
        );
        assert!(a.is_owned_by(&user).unwrap());
        assert_eq!(b.owner_id().unwrap(), None);

        assert_eq!(set.remove(&a).unwrap(), 1);
        assert_eq!(set.remove(&a).unwrap(), 0);
        assert_eq!(set.count().unwrap(), 1);
    }

    #[test]
    fn sentinel_for_missing_or_wildcard_ids() {
        let ctx = Context::in_memory();
        let user = EntityRecord::<User>::create(ctx, None).unwrap();
        let set = UnorderedCollection::for_record(&user);
        assert_eq!(set.contains_id(None).unwrap(), None);
        assert_eq!(set.contains_id(Some(&EntityId::from_raw("*"))).unwrap(), None);
        assert_eq!(set.contains_id(Some(&EntityId::from_raw(""))).unwrap(), None);
    }

    #[test]
    fn list_is_sorted_and_optionally_loaded() {
        let ctx = Context::in_memory();
        let user = EntityRecord::<User>::create(ctx.clone(), None).unwrap();
        let set = UnorderedCollection::for_record(&user);
        for _ in 0..5 {
            let mut c = EntityRecord::<Coll>::create(ctx.clone(), None).unwrap();
            set.add(&mut c, true).unwrap();
        }
        let ids = set.list_ids().unwrap();
        let mut sorted = ids.clone();
        sorted.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        assert_eq!(ids, sorted);

        let loaded = set.list::<Coll>(true).unwrap();
        assert_eq!(loaded.len(), 5);
        assert!(loaded.iter().all(EntityRecord::is_loaded));
        assert!(set.list::<Coll>(false).unwrap().iter().all(|c| !c.is_loaded()));
    }

    #[test]
    fn listed_members_report_the_collection_owner() {
        let ctx = Context::in_memory();
        let user = EntityRecord::<User>::create(ctx.clone(), None).unwrap();
        let set = UnorderedCollection::for_record(&user);
        let mut c = EntityRecord::<Coll>::create(ctx, None).unwrap();
        set.add(&mut c, false).unwrap();

        for load in [false, true] {
            let mut listed = set.list::<Coll>(load).unwrap();
            assert_eq!(listed.len(), 1);
            assert!(listed[0].is_owned_by(&user).unwrap());
        }
        assert_eq!(c.owner_id().unwrap(), None);
    }
}
