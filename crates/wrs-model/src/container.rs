//! Named containers.
//!
//! A container kind keeps a `name -> child id` hash under
//! `{type}:{id}:children`. Names are claimed with a set-if-absent write, so
//! a reservation either wins the name outright or sees a conflict. The
//! container's own `size` tracks the sum of its members' sizes and is
//! adjusted incrementally on add and remove.
//!
//! None of the multi-step operations here are transactional. A rename
//! reserves the new name before removing the old entry; if the removal finds
//! nothing, the reservation stays behind and is reported to the caller as
//! [`RenameOutcome::NotMember`].

use tracing::{debug, info, warn};
use wrs_types::EntityId;

use crate::error::{ModelError, ModelResult};
use crate::kind::{ContainerKind, EntityKind};
use crate::record::EntityRecord;

/// Value held by a name that has been reserved but not yet bound to a child.
pub const RESERVED: &str = "0";

/// Result of [`EntityRecord::rename`] and friends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenameOutcome {
    /// The entity now lives under `name` in the target container.
    Renamed { name: String },
    /// The entity was not found in the source container. `orphaned` is the
    /// name left reserved in the target container; release it with
    /// [`EntityRecord::release_name`].
    NotMember { orphaned: String },
}

impl RenameOutcome {
    /// The final name on success.
    pub fn name(&self) -> Option<&str> {
        match self {
            RenameOutcome::Renamed { name } => Some(name),
            RenameOutcome::NotMember { .. } => None,
        }
    }

    pub fn is_renamed(&self) -> bool {
        matches!(self, RenameOutcome::Renamed { .. })
    }
}

impl<K: ContainerKind> EntityRecord<K> {
    pub fn children_key(&self) -> String {
        K::children_template().render(K::TYPE_TAG, self.id())
    }

    /// Claim `name`, or the first free `name-N` (N from 2) when
    /// `allow_dupe` is set.
    pub fn reserve_name(&self, name: &str, allow_dupe: bool) -> ModelResult<String> {
        let key = self.children_key();
        let store = self.context().store();

        if store.hsetnx(&key, name, RESERVED)? {
            debug!(container = %key, name, "reserved name");
            return Ok(name.to_string());
        }
        if !allow_dupe {
            return Err(ModelError::DuplicateName {
                container: key,
                name: name.to_string(),
            });
        }

        let max = self.context().config().max_dupe_suffix;
        for n in 2..=max {
            let candidate = format!("{name}-{n}");
            if store.hsetnx(&key, &candidate, RESERVED)? {
                debug!(container = %key, name = %candidate, "reserved deduplicated name");
                return Ok(candidate);
            }
        }
        Err(ModelError::DupeSuffixExhausted {
            container: key,
            name: name.to_string(),
            attempts: max,
        })
    }

    /// Bind `name` to `entity`, add its size to this container, and give the
    /// entity its new display name. With `as_owner`, the container also
    /// becomes the entity's owner.
    pub fn add_object<E: EntityKind>(
        &mut self,
        name: &str,
        entity: &mut EntityRecord<E>,
        as_owner: bool,
    ) -> ModelResult<()> {
        let key = self.children_key();
        self.context().store().hset(&key, name, entity.id().as_str())?;

        let size = entity_size(entity)?;
        self.incr_size(size)?;

        entity.set_name(name);
        if as_owner {
            entity.set_owner(self.id())?;
        }
        info!(container = %key, name, id = %entity.id(), size, "added object");
        Ok(())
    }

    /// Drop the entry for `entity.name()` and subtract the entity's size.
    /// Returns 0 if there was no such entry; the size is then left alone.
    ///
    /// The entry is matched by name only. If the name is an unbound
    /// reservation or is bound to a different entity, that entry is removed
    /// and `entity`'s size is still subtracted. Callers holding a stale name
    /// should check [`Self::name_to_id`] first.
    pub fn remove_object<E: EntityKind>(&mut self, entity: &mut EntityRecord<E>) -> ModelResult<u64> {
        let key = self.children_key();
        let removed = self.context().store().hdel(&key, &[entity.name()])?;
        if removed == 0 {
            debug!(container = %key, name = entity.name(), "remove of non-member");
            return Ok(0);
        }

        let size = entity_size(entity)?;
        self.incr_size(-size)?;
        info!(container = %key, name = entity.name(), id = %entity.id(), size, "removed object");
        Ok(removed)
    }

    /// Rename `entity` within this container.
    pub fn rename<E: EntityKind>(
        &mut self,
        entity: &mut EntityRecord<E>,
        new_name: &str,
        allow_dupe: bool,
    ) -> ModelResult<RenameOutcome> {
        let name = self.reserve_name(new_name, allow_dupe)?;
        if self.remove_object(entity)? == 0 {
            return Ok(orphaned(&self.children_key(), name));
        }
        self.add_object(&name, entity, true)?;
        Ok(RenameOutcome::Renamed { name })
    }

    /// Move `entity` from this container into `target` under `new_name`.
    pub fn rename_into<E: EntityKind, T: ContainerKind>(
        &mut self,
        entity: &mut EntityRecord<E>,
        target: &mut EntityRecord<T>,
        new_name: &str,
        allow_dupe: bool,
    ) -> ModelResult<RenameOutcome> {
        let name = target.reserve_name(new_name, allow_dupe)?;
        if self.remove_object(entity)? == 0 {
            return Ok(orphaned(&target.children_key(), name));
        }
        target.add_object(&name, entity, true)?;
        Ok(RenameOutcome::Renamed { name })
    }

    /// Move `entity` into `target`, keeping its current name if free.
    pub fn move_to<E: EntityKind, T: ContainerKind>(
        &mut self,
        entity: &mut EntityRecord<E>,
        target: &mut EntityRecord<T>,
        allow_dupe: bool,
    ) -> ModelResult<RenameOutcome> {
        let name = entity.name().to_string();
        self.rename_into(entity, target, &name, allow_dupe)
    }

    /// One unloaded record per bound name, ordered by name. Reservations not
    /// yet bound to a child are skipped.
    pub fn list_objects<E: EntityKind>(&self) -> ModelResult<Vec<EntityRecord<E>>> {
        let entries = self.context().store().hgetall(&self.children_key())?;
        Ok(entries
            .into_iter()
            .filter(|(_, id)| id != RESERVED)
            .map(|(name, id)| {
                EntityRecord::open_named(self.context().clone(), EntityId::from_raw(id), name)
            })
            .collect())
    }

    /// Number of names in the container, reservations included.
    pub fn count(&self) -> ModelResult<u64> {
        Ok(self.context().store().hlen(&self.children_key())?)
    }

    pub fn name_to_id(&self, name: &str) -> ModelResult<Option<EntityId>> {
        Ok(self
            .context()
            .store()
            .hget(&self.children_key(), name)?
            .filter(|id| id != RESERVED)
            .map(EntityId::from_raw))
    }

    /// Drop a reservation that was never bound. Returns `false` if `name`
    /// is free or bound to a child.
    pub fn release_name(&self, name: &str) -> ModelResult<bool> {
        let key = self.children_key();
        let store = self.context().store();
        if store.hget(&key, name)?.as_deref() != Some(RESERVED) {
            return Ok(false);
        }
        Ok(store.hdel(&key, &[name])? > 0)
    }

    pub fn is_owner_of<E: EntityKind>(&self, entity: &mut EntityRecord<E>) -> ModelResult<bool> {
        entity.is_owned_by(self)
    }
}

fn entity_size<E: EntityKind>(entity: &mut EntityRecord<E>) -> ModelResult<i64> {
    Ok(i64::try_from(entity.size()?).unwrap_or(i64::MAX))
}

fn orphaned(container: &str, name: String) -> RenameOutcome {
    warn!(container, name = %name, "rename source missing; reservation left behind");
    RenameOutcome::NotMember { orphaned: name }
}
