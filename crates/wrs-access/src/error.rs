use wrs_types::EntityRef;

/// A failed capability assertion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("read access denied: {0}")]
    ReadDenied(EntityRef),

    #[error("write access denied: {0}")]
    WriteDenied(EntityRef),

    #[error("admin access denied: {0}")]
    AdminDenied(EntityRef),

    /// The acting session does not belong to this user.
    #[error("not the current user: {0}")]
    NotCurrentUser(EntityRef),

    #[error("superuser access required")]
    NotSuperuser,
}
