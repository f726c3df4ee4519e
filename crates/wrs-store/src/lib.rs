//! Key-value store interface for the WRS entity store.
//!
//! Entities, containers, and collections are persisted as primitive
//! structures in a remote key-value store: hashes for property bags and name
//! maps, sorted structures for ordered collections, and sets for unordered
//! collections. This crate defines the exact primitives the model layer needs
//! and nothing more.
//!
//! # Storage Backends
//!
//! All backends implement the [`KeyValueStore`] trait:
//!
//! - [`InMemoryStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Every call is a synchronous, blocking round-trip.
//! 2. Each primitive is atomic on its own; nothing groups primitives into a
//!    transaction.
//! 3. A structure that becomes empty ceases to exist.
//! 4. Backend failures are propagated, never retried.

pub mod error;
pub mod memory;
pub mod pattern;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryStore, MAX_OPEN_CURSORS};
pub use pattern::glob_match;
pub use traits::{KeyValueStore, ScanPage, ScoreBound};
