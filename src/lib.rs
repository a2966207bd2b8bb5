//! An in-memory archetype storage for entities and their components.
//!
//! # Compounds
//! Entities are grouped by the exact set of component types they have,
//! further partitioned by the [instance hash](comp::Comp::instance_hash) of each component.
//! Each group is a *compound* that stores its components in dense columns,
//! so iterating over a component type touches contiguous memory.
//!
//! Setting a component that the entity does not have yet moves the entity to another compound.
//! Components that are not named in a [`set`](Storage::set) call are carried over.
//!
//! # Removal
//! [`Storage::remove`] only records the entity ID in a sorted tombstone list of its compound.
//! The compound is compacted in a single pass when a query next visits it,
//! so consecutive removals do not each scan the compound.
//! A compound whose entities were all removed is dropped entirely.
//!
//! # Queries
//! A [`Query`] visits every compound that has all of its component types,
//! regardless of other component types or instance hashes.
//!
//! ```
//! #[derive(Debug, PartialEq, dynarch::Comp)]
//! struct Position {
//!     x: i32,
//!     y: i32,
//! }
//!
//! #[derive(dynarch::Comp)]
//! struct Momentum {
//!     hs: i32,
//!     vs: i32,
//! }
//!
//! let storage = dynarch::new::<u32>();
//! storage.set(1, (Position { x: 100, y: 200 },));
//! storage.set(2, (Position { x: 200, y: 200 }, Momentum { hs: 10, vs: -10 }));
//! storage.set(3, (Momentum { hs: 10, vs: -10 },));
//!
//! storage.query::<(Position, Momentum)>().each(|_, (position, momentum)| {
//!     position.x += momentum.hs;
//!     position.y += momentum.vs;
//! });
//!
//! let mut visited = Vec::new();
//! storage.query::<(Position,)>().each(|id, (position,)| visited.push((id, position.x)));
//! visited.sort();
//! assert_eq!(visited, [(1, 100), (2, 210)]);
//! ```
//!
//! # Concurrency
//! A [`Storage`] is guarded by a single read-write lock.
//! `set`, `remove` and query iteration lock it exclusively,
//! while lookups such as [`Storage::lookup_comp`] lock it shared.

#![cfg_attr(not(debug_assertions), deny(missing_docs))]
#![cfg_attr(doc, warn(missing_docs))]

/// Internal re-exports used in macros.
#[doc(hidden)]
pub mod _reexports {
    pub use serde_json;
}

pub mod tracer;

pub mod bundle;
pub use bundle::Bundle;

mod column;

pub mod comp;
pub use comp::Comp;

pub mod compound;

pub mod entity;

pub mod query;
pub use query::Query;

pub mod snapshot;
pub use snapshot::Snapshot;

pub mod storage;
pub use storage::Storage;

#[cfg(any(test, feature = "internal-bench"))]
pub mod test_util;

pub mod util;

/// Creates an empty storage keyed by the entity ID type `E`.
pub fn new<E: entity::Raw>() -> Storage<E> { Storage::new() }
