//! Foundation types for the WRS entity store.
//!
//! This crate provides the identity, temporal, and key-naming types shared by
//! every other WRS crate. It has no knowledge of the backing store.
//!
//! # Key Types
//!
//! - [`EntityId`]: Opaque, immutable identifier of a stored entity
//! - [`EntityRef`]: An entity id paired with the type tag of its kind
//! - [`Timestamp`]: Unix timestamp in whole seconds, rendered as ISO-8601 on demand
//! - [`KeyTemplate`]: A store key parameterized by `{type}` and `{id}`

pub mod error;
pub mod id;
pub mod key;
pub mod temporal;

pub use error::TypeError;
pub use id::{EntityId, EntityRef};
pub use key::KeyTemplate;
pub use temporal::{IsoStyle, Timestamp};
