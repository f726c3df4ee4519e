use wrs_types::{EntityId, EntityRef};

use crate::error::AccessError;
use crate::policy::AccessPolicy;

/// A policy that allows reads and denies every mutation.
///
/// Optionally bound to a session user, in which case
/// [`AccessPolicy::assert_is_current_user`] passes for that user only.
/// Superuser checks always fail.
#[derive(Clone, Debug, Default)]
pub struct ReadOnlyAccess {
    current_user: Option<EntityId>,
}

impl ReadOnlyAccess {
    /// Read-only access with no session user.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Read-only access acting for `user`.
    pub fn for_user(user: EntityId) -> Self {
        Self {
            current_user: Some(user),
        }
    }

    pub fn current_user(&self) -> Option<&EntityId> {
        self.current_user.as_ref()
    }
}

impl AccessPolicy for ReadOnlyAccess {
    fn can_read(&self, _entity: &EntityRef) -> bool {
        true
    }

    fn can_write(&self, entity: &EntityRef) -> bool {
        tracing::debug!(entity = %entity, "write denied by read-only policy");
        false
    }

    fn can_admin(&self, entity: &EntityRef) -> bool {
        tracing::debug!(entity = %entity, "admin denied by read-only policy");
        false
    }

    fn assert_is_current_user(&self, user: &EntityRef) -> Result<(), AccessError> {
        match &self.current_user {
            Some(current) if *current == user.id => Ok(()),
            _ => Err(AccessError::NotCurrentUser(user.clone())),
        }
    }

    fn assert_is_superuser(&self) -> Result<(), AccessError> {
        Err(AccessError::NotSuperuser)
    }
}
