//! Entity persistence for the WRS entity store.
//!
//! This crate maps domain entities onto primitive key-value structures and
//! groups them into named, ordered, or unordered child collections. It knows
//! nothing about the concrete kinds it stores; consumers describe each kind
//! with an [`EntityKind`] implementation.
//!
//! # Architecture
//!
//! - An [`EntityRecord`] is a property hash keyed by `{type}:{id}:info`,
//!   lazily loaded and cached.
//! - A record whose kind is a [`ContainerKind`] also holds a
//!   `name -> id` map and keeps its `size` equal to the sum of its members'.
//! - An [`OrderedCollection`] orders child ids by fractional score.
//! - An [`UnorderedCollection`] is plain set membership.
//!
//! Every record and collection carries a [`Context`]: the store, the access
//! policy callers consult before writing, and the [`ModelConfig`].
//!
//! Multi-step operations (reserve then add, remove then add, read a score
//! then write one) are not atomic. Callers needing strict consistency under
//! concurrent writers must coordinate above this layer.
//!
//! # Modules
//!
//! - [`record`]: [`EntityRecord`] and its typed accessors
//! - [`container`]: name reservation, add/remove, rename and move
//! - [`ordered`]: [`OrderedCollection`]
//! - [`unordered`]: [`UnorderedCollection`]
//! - [`property`]: property values and well-known keys
//! - [`config`]: [`ModelConfig`] loaded from TOML

pub mod config;
pub mod container;
pub mod context;
pub mod error;
pub mod kind;
pub mod ordered;
pub mod property;
pub mod record;
pub mod snapshot;
pub mod unordered;

pub use config::ModelConfig;
pub use container::{RenameOutcome, RESERVED};
pub use context::Context;
pub use error::{ModelError, ModelResult};
pub use kind::{ContainerKind, EntityKind};
pub use ordered::OrderedCollection;
pub use property::{GetOptions, Properties, PropertyType, PropertyValue};
pub use record::EntityRecord;
pub use snapshot::{RecordSnapshot, SerializeOptions};
pub use unordered::UnorderedCollection;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use wrs_types::EntityId;

    struct Collection;
    impl EntityKind for Collection {
        const TYPE_TAG: &'static str = "coll";
    }
    impl ContainerKind for Collection {}

    struct Recording;
    impl EntityKind for Recording {
        const TYPE_TAG: &'static str = "rec";
    }

    fn recording(ctx: &Context, size: i64) -> EntityRecord<Recording> {
        let mut rec = EntityRecord::<Recording>::create(ctx.clone(), None).unwrap();
        if size != 0 {
            rec.incr_size(size).unwrap();
        }
        rec
    }

    fn member_size_sum(coll: &EntityRecord<Collection>) -> u64 {
        coll.list_objects::<Recording>()
            .unwrap()
            .iter_mut()
            .map(|r| r.size().unwrap())
            .sum()
    }

    #[test]
    fn repeated_dedupe_reservations() {
        let ctx = Context::in_memory();
        let coll = EntityRecord::<Collection>::create(ctx, None).unwrap();
        let names: Vec<String> = (0..3)
            .map(|_| coll.reserve_name("doc", true).unwrap())
            .collect();
        assert_eq!(names, ["doc", "doc-2", "doc-3"]);
        assert_eq!(coll.count().unwrap(), 3);
    }

    #[test]
    fn container_rename_scenario() {
        let ctx = Context::in_memory();
        let mut coll = EntityRecord::<Collection>::create(ctx.clone(), None).unwrap();
        let mut a = recording(&ctx, 10);
        let mut b = recording(&ctx, 5);

        for (name, rec) in [("x", &mut a), ("y", &mut b)] {
            let name = coll.reserve_name(name, false).unwrap();
            coll.add_object(&name, rec, true).unwrap();
        }
        assert_eq!(coll.count().unwrap(), 2);
        assert_eq!(coll.size().unwrap(), 15);

        let err = coll.rename(&mut a, "y", false).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateName { .. }));
        assert_eq!(a.name(), "x");

        let outcome = coll.rename(&mut a, "y", true).unwrap();
        assert_eq!(outcome.name(), Some("y-2"));
        assert_eq!(a.name(), "y-2");
        assert_eq!(coll.count().unwrap(), 2);
        assert_eq!(coll.size().unwrap(), 15);
        assert_eq!(coll.size().unwrap(), member_size_sum(&coll));
    }

    #[test]
    fn size_accounting_survives_moves() {
        let ctx = Context::in_memory();
        let mut left = EntityRecord::<Collection>::create(ctx.clone(), None).unwrap();
        let mut right = EntityRecord::<Collection>::create(ctx.clone(), None).unwrap();
        let mut recs: Vec<_> = [3, 7, 11, 0].into_iter().map(|s| recording(&ctx, s)).collect();

        for (i, rec) in recs.iter_mut().enumerate() {
            let name = left.reserve_name(&format!("r{i}"), false).unwrap();
            left.add_object(&name, rec, true).unwrap();
        }
        left.move_to(&mut recs[1], &mut right, false).unwrap();
        left.move_to(&mut recs[3], &mut right, false).unwrap();
        right.rename(&mut recs[1], "renamed", false).unwrap();
        left.remove_object(&mut recs[0]).unwrap();

        assert_eq!(left.count().unwrap(), 1);
        assert_eq!(right.count().unwrap(), 2);
        assert_eq!(left.size().unwrap(), 11);
        assert_eq!(right.size().unwrap(), 7);
        assert_eq!(left.size().unwrap(), member_size_sum(&left));
        assert_eq!(right.size().unwrap(), member_size_sum(&right));
        assert!(right.is_owner_of(&mut recs[1]).unwrap());
    }

    #[test]
    fn insert_before_scenario() {
        let ctx = Context::in_memory();
        let owner = EntityRecord::<Collection>::create(ctx.clone(), None).unwrap();
        let list = OrderedCollection::for_record(&owner);
        let mut p = recording(&ctx, 0);
        let mut q = recording(&ctx, 0);
        let mut r = recording(&ctx, 0);

        list.append(&mut p, true).unwrap();
        list.append(&mut q, true).unwrap();
        let anchor = q.id().clone();
        list.insert_before(&mut r, Some(&anchor), true).unwrap();

        assert_eq!(
            list.list_ids().unwrap(),
            vec![p.id().clone(), r.id().clone(), q.id().clone()]
        );
        assert!(r.is_owned_by(&owner).unwrap());
    }

    #[test]
    fn contains_id_sentinels() {
        let ctx = Context::in_memory();
        let owner = EntityRecord::<Collection>::create(ctx, None).unwrap();
        let wildcard = EntityId::from_raw(EntityId::WILDCARD);

        let set = UnorderedCollection::for_record(&owner);
        assert_eq!(set.contains_id(None).unwrap(), None);
        assert_eq!(set.contains_id(Some(&wildcard)).unwrap(), None);

        let list = OrderedCollection::for_record(&owner);
        assert!(!list.contains_id(&wildcard).unwrap());
    }

    #[test]
    fn deleting_owner_removes_its_collections() {
        let ctx = Context::in_memory();
        let mut coll = EntityRecord::<Collection>::create(ctx.clone(), None).unwrap();
        let mut rec = recording(&ctx, 2);
        coll.add_object("a", &mut rec, true).unwrap();
        OrderedCollection::for_record(&coll).append(&mut rec, true).unwrap();
        UnorderedCollection::for_record(&coll).add(&mut rec, true).unwrap();

        assert!(coll.delete().unwrap());
        assert_eq!(coll.count().unwrap(), 0);
        assert_eq!(OrderedCollection::for_record(&coll).count().unwrap(), 0);
        assert_eq!(UnorderedCollection::for_record(&coll).count().unwrap(), 0);
        assert!(!coll.delete().unwrap());

        let mut survivor = EntityRecord::<Recording>::open(ctx, rec.id().clone());
        assert_eq!(survivor.size().unwrap(), 2);
    }

    proptest! {
        #[test]
        fn invalid_reorders_leave_order_unchanged(n in 2usize..10, dup in 0usize..10) {
            let ctx = Context::in_memory();
            let owner = EntityRecord::<Collection>::create(ctx.clone(), None).unwrap();
            let list = OrderedCollection::for_record(&owner);
            for _ in 0..n {
                let mut rec = recording(&ctx, 0);
                list.append(&mut rec, false).unwrap();
            }
            let before = list.list_ids().unwrap();

            let mut with_dup = before.clone();
            with_dup[0] = before[dup % n].clone();
            if dup % n != 0 {
                prop_assert!(!list.reorder(&with_dup).unwrap());
            }
            prop_assert!(!list.reorder(&before[1..]).unwrap());
            prop_assert_eq!(list.list_ids().unwrap(), before);
        }

        #[test]
        fn container_size_tracks_members(
            sizes in proptest::collection::vec(0i64..1_000, 1..12),
            removals in proptest::collection::vec(any::<bool>(), 12),
        ) {
            let ctx = Context::in_memory();
            let mut coll = EntityRecord::<Collection>::create(ctx.clone(), None).unwrap();
            let mut recs: Vec<_> = sizes.iter().map(|s| recording(&ctx, *s)).collect();
            for rec in recs.iter_mut() {
                let name = coll.reserve_name("item", true).unwrap();
                coll.add_object(&name, rec, true).unwrap();
            }
            for (rec, remove) in recs.iter_mut().zip(&removals) {
                if *remove {
                    prop_assert_eq!(coll.remove_object(rec).unwrap(), 1);
                }
            }

            let kept = sizes
                .iter()
                .zip(&removals)
                .filter(|(_, removed)| !**removed)
                .count();
            prop_assert_eq!(coll.count().unwrap(), kept as u64);
            prop_assert_eq!(coll.size().unwrap(), member_size_sum(&coll));
        }
    }
}
