//! Capability checks for the WRS entity store.
//!
//! Callers consult an [`AccessPolicy`] before invoking any mutating
//! operation on records, containers, or collections. The model layer only
//! carries the policy around; it never consults it itself.
//!
//! # Quick Start
//!
//! ```rust
//! use wrs_access::{AccessPolicy, PermissiveAccess};
//! use wrs_types::{EntityId, EntityRef};
//!
//! let access = PermissiveAccess;
//! let coll = EntityRef::new("coll", EntityId::from_raw("c1"));
//! assert!(access.can_write(&coll));
//! access.assert_can_admin(&coll).unwrap();
//! ```

pub mod error;
pub mod permissive;
pub mod policy;
pub mod read_only;

pub use error::AccessError;
pub use permissive::PermissiveAccess;
pub use policy::AccessPolicy;
pub use read_only::ReadOnlyAccess;
