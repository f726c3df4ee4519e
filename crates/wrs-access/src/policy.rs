use wrs_types::EntityRef;

use crate::error::AccessError;

/// Capability checker consulted before mutation.
///
/// Implementations are stateless with respect to stored data: they answer
/// questions about an entity and never read or write it. The `assert_*`
/// variants fail loudly instead of returning a boolean and default to the
/// corresponding `can_*` check.
///
/// The trait is object-safe and `Send + Sync` so a policy can be shared as
/// `Arc<dyn AccessPolicy>` by every handle that needs it.
pub trait AccessPolicy: Send + Sync {
    fn can_read(&self, entity: &EntityRef) -> bool;

    fn can_write(&self, entity: &EntityRef) -> bool;

    fn can_admin(&self, entity: &EntityRef) -> bool;

    fn assert_can_read(&self, entity: &EntityRef) -> Result<(), AccessError> {
        if self.can_read(entity) {
            Ok(())
        } else {
            Err(AccessError::ReadDenied(entity.clone()))
        }
    }

    fn assert_can_write(&self, entity: &EntityRef) -> Result<(), AccessError> {
        if self.can_write(entity) {
            Ok(())
        } else {
            Err(AccessError::WriteDenied(entity.clone()))
        }
    }

    fn assert_can_admin(&self, entity: &EntityRef) -> Result<(), AccessError> {
        if self.can_admin(entity) {
            Ok(())
        } else {
            Err(AccessError::AdminDenied(entity.clone()))
        }
    }

    /// Fail unless `user` is the user the current session acts for.
    fn assert_is_current_user(&self, user: &EntityRef) -> Result<(), AccessError>;

    /// Fail unless the current session has superuser rights.
    fn assert_is_superuser(&self) -> Result<(), AccessError>;
}
