use wrs_types::EntityRef;

use crate::error::AccessError;
use crate::policy::AccessPolicy;

/// A policy that grants everything.
///
/// Used on trusted internal call paths (maintenance jobs, migrations, tests)
/// where no session exists to check against.
#[derive(Clone, Copy, Debug, Default)]
pub struct PermissiveAccess;

impl AccessPolicy for PermissiveAccess {
    fn can_read(&self, _entity: &EntityRef) -> bool {
        true
    }

    fn can_write(&self, _entity: &EntityRef) -> bool {
        true
    }

    fn can_admin(&self, _entity: &EntityRef) -> bool {
        true
    }

    fn assert_is_current_user(&self, _user: &EntityRef) -> Result<(), AccessError> {
        Ok(())
    }

    fn assert_is_superuser(&self) -> Result<(), AccessError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wrs_types::EntityId;

    fn coll() -> EntityRef {
        EntityRef::new("coll", EntityId::from_raw("c1"))
    }

    #[test]
    fn grants_every_capability() {
        let access = PermissiveAccess;
        assert!(access.can_read(&coll()));
        assert!(access.can_write(&coll()));
        assert!(access.can_admin(&coll()));
    }

    #[test]
    fn every_assertion_passes() {
        let access = PermissiveAccess;
        let user = EntityRef::new("user", EntityId::from_raw("u1"));
        assert_eq!(access.assert_can_read(&coll()), Ok(()));
        assert_eq!(access.assert_can_write(&coll()), Ok(()));
        assert_eq!(access.assert_can_admin(&coll()), Ok(()));
        assert_eq!(access.assert_is_current_user(&user), Ok(()));
        assert_eq!(access.assert_is_superuser(), Ok(()));
    }

    #[test]
    fn usable_as_trait_object() {
        let access: std::sync::Arc<dyn AccessPolicy> = std::sync::Arc::new(PermissiveAccess);
        assert!(access.can_write(&coll()));
    }
}
