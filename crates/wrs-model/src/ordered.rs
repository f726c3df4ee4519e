//! Ordered collections with fractional scores.
//!
//! Members live in a sorted structure under `{type}:{id}:order`, each with a
//! floating-point score. Only the relative order of scores matters.
//!
//! Appends extend the arithmetic progression of the two highest scores.
//! Inserting before an anchor takes the midpoint between the anchor and its
//! predecessor (or `0` when the anchor is first), so no other member is
//! rewritten. Repeated insertion at one boundary halves the gap each time;
//! when the midpoint is no longer strictly between its neighbours the
//! collection is rebalanced once and the insertion retried.

use std::collections::HashSet;

use tracing::{debug, info, warn};
use wrs_store::ScoreBound;
use wrs_types::{EntityId, KeyTemplate};

use crate::context::Context;
use crate::error::{ModelError, ModelResult};
use crate::kind::EntityKind;
use crate::record::EntityRecord;

/// An ordered grouping of child ids owned by one entity.
#[derive(Clone, Debug)]
pub struct OrderedCollection {
    ctx: Context,
    owner: EntityId,
    key: String,
}

impl OrderedCollection {
    /// The collection under `template` rendered for the owner.
    pub fn new(ctx: Context, owner_tag: &str, owner: EntityId, template: KeyTemplate) -> Self {
        let key = template.render(owner_tag, &owner);
        Self { ctx, owner, key }
    }

    /// The default `{type}:{id}:order` collection of `record`.
    pub fn for_record<K: EntityKind>(record: &EntityRecord<K>) -> Self {
        Self::with_template(record, KeyTemplate::ORDER)
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

    /// Members over the rank range `[start, stop]`; negative indices count
    /// from the end. With `load`, each record's properties are fetched.
    /// Every handle reports this collection's owner as its owner.
    pub fn list<E: EntityKind>(
        &self,
        load: bool,
        start: i64,
        stop: i64,
    ) -> ModelResult<Vec<EntityRecord<E>>> {
        let ids = self.ctx.store().zrange(&self.key, start, stop)?;
        ids.into_iter()
            .map(|id| {
                let mut record = EntityRecord::open(self.ctx.clone(), EntityId::from_raw(id));
                if load {
                    record.load()?;
                }
                record.cache_owner(&self.owner);
                Ok(record)
            })
            .collect()
    }

    /// Every member in order, loaded.
    pub fn list_all<E: EntityKind>(&self) -> ModelResult<Vec<EntityRecord<E>>> {
        self.list(true, 0, -1)
    }

    pub fn list_ids(&self) -> ModelResult<Vec<EntityId>> {
        Ok(self
            .ctx
            .store()
            .zrange(&self.key, 0, -1)?
            .into_iter()
            .map(EntityId::from_raw)
            .collect())
    }

    /// Place `entity` immediately before `anchor`, or at the end when no
    /// anchor is given or the anchor is not a member. Returns the score
    /// assigned. With `as_owner`, the collection's owner becomes the
    /// entity's owner.
    pub fn insert_before<E: EntityKind>(
        &self,
        entity: &mut EntityRecord<E>,
        anchor: Option<&EntityId>,
        as_owner: bool,
    ) -> ModelResult<f64> {
        let score = match anchor {
            Some(anchor) => match self.score_before(anchor)? {
                Some(score) => score,
                None => {
                    debug!(collection = %self.key, %anchor, "anchor not a member; appending");
                    self.append_score()?
                }
            },
            None => self.append_score()?,
        };

        self.ctx
            .store()
            .zadd(&self.key, &[(score, entity.id().as_str())])?;
        if as_owner {
            entity.set_owner(&self.owner)?;
        }
        debug!(collection = %self.key, id = %entity.id(), score, "inserted member");
        Ok(score)
    }

    /// Place `entity` at the end.
    pub fn append<E: EntityKind>(&self, entity: &mut EntityRecord<E>, as_owner: bool) -> ModelResult<f64> {
        self.insert_before(entity, None, as_owner)
    }

    /// Replace the order with `new_order`, which must name every current
    /// member exactly once. Returns `false` without writing anything
    /// otherwise. Scores become `score_unit, 2 * score_unit, ...`.
    pub fn reorder(&self, new_order: &[EntityId]) -> ModelResult<bool> {
        let current: HashSet<String> = self
            .ctx
            .store()
            .zrange(&self.key, 0, -1)?
            .into_iter()
            .collect();

        let mut seen = HashSet::with_capacity(new_order.len());
        for id in new_order {
            if !seen.insert(id.as_str()) {
                debug!(collection = %self.key, %id, "reorder rejected: duplicate id");
                return Ok(false);
            }
        }
        if seen.len() != current.len() || !seen.iter().all(|id| current.contains(*id)) {
            debug!(
                collection = %self.key,
                requested = seen.len(),
                members = current.len(),
                "reorder rejected: member set mismatch"
            );
            return Ok(false);
        }

        self.assign_spaced(new_order)?;
        Ok(true)
    }

    /// Respace every member evenly, keeping the current order.
    pub fn rebalance(&self) -> ModelResult<()> {
        let ids = self.list_ids()?;
        self.assign_spaced(&ids)?;
        info!(collection = %self.key, members = ids.len(), "rebalanced scores");
        Ok(())
    }

    /// `false` for blank or wildcard ids.
    pub fn contains_id(&self, id: &EntityId) -> ModelResult<bool> {
        if id.is_blank_or_wildcard() {
            return Ok(false);
        }
        Ok(self.score_of(id)?.is_some())
    }

    pub fn score_of(&self, id: &EntityId) -> ModelResult<Option<f64>> {
        Ok(self.ctx.store().zscore(&self.key, id.as_str())?)
    }

    pub fn remove<E: EntityKind>(&self, entity: &EntityRecord<E>) -> ModelResult<u64> {
        self.remove_id(entity.id())
    }

    pub fn remove_id(&self, id: &EntityId) -> ModelResult<u64> {
        let removed = self.ctx.store().zrem(&self.key, &[id.as_str()])?;
        if removed == 0 {
            debug!(collection = %self.key, %id, "remove of non-member");
        }
        Ok(removed)
    }

    pub fn count(&self) -> ModelResult<u64> {
        Ok(self.ctx.store().zcard(&self.key)?)
    }

    fn unit(&self) -> f64 {
        self.ctx.config().score_unit
    }

    fn assign_spaced(&self, ids: &[EntityId]) -> ModelResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let unit = self.unit();
        let members: Vec<(f64, &str)> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| ((i + 1) as f64 * unit, id.as_str()))
            .collect();
        self.ctx.store().zadd(&self.key, &members)?;
        Ok(())
    }

    /// Score for a new last member.
    fn append_score(&self) -> ModelResult<f64> {
        let top = self.ctx.store().zrevrange_with_scores(&self.key, 0, 1)?;
        let (next, highest) = match top.as_slice() {
            [] => return Ok(self.unit()),
            [(_, hi)] => (2.0 * hi, *hi),
            [(_, hi), (_, second), ..] => (2.0 * hi - second, *hi),
        };
        if next > highest && next.is_finite() {
            Ok(next)
        } else {
            Ok(highest + self.unit())
        }
    }

    /// Midpoint between `anchor` and its predecessor, or `None` if `anchor`
    /// is not a member.
    fn score_before(&self, anchor: &EntityId) -> ModelResult<Option<f64>> {
        match self.midpoint_before(anchor)? {
            Midpoint::Missing => return Ok(None),
            Midpoint::Between(score) => return Ok(Some(score)),
            Midpoint::Collapsed => {}
        }

        warn!(collection = %self.key, %anchor, "score precision exhausted; rebalancing");
        self.rebalance()?;
        match self.midpoint_before(anchor)? {
            Midpoint::Missing => Ok(None),
            Midpoint::Between(score) => Ok(Some(score)),
            Midpoint::Collapsed => Err(ModelError::PrecisionExhausted {
                collection: self.key.clone(),
                anchor: anchor.clone(),
            }),
        }
    }

    fn midpoint_before(&self, anchor: &EntityId) -> ModelResult<Midpoint> {
        let store = self.ctx.store();
        let Some(anchor_score) = store.zscore(&self.key, anchor.as_str())? else {
            return Ok(Midpoint::Missing);
        };
        let preceding = store
            .zrevrangebyscore(
                &self.key,
                ScoreBound::Exclusive(anchor_score),
                ScoreBound::NegInfinity,
                0,
                1,
            )?
            .first()
            .map_or(0.0, |(_, score)| *score);

        let mid = (anchor_score + preceding) / 2.0;
        if preceding < mid && mid < anchor_score {
            Ok(Midpoint::Between(mid))
        } else {
            Ok(Midpoint::Collapsed)
        }
    }
}

enum Midpoint {
    Missing,
    Between(f64),
    /// The midpoint equals one of its neighbours.
    Collapsed,
}
