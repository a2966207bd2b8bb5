//! A component is a typed value attached to an entity.
//!
//! Any `Send + Sync + 'static` type can be used as a component
//! by implementing [`Comp`], usually through `#[derive(Comp)]`.
//! Component types are identified by their static type;
//! each distinct type is interned into a small [`CompId`] the first time it is stored.
//!
//! # Instance hashes
//! Entities with the same set of component types are normally stored in the same compound.
//! A component may further partition its entities by value through [`Comp::instance_hash`]:
//! entities whose components have different hashes are stored in different compounds,
//! even if they have the same component types.
//! Queries match by type only, so all partitions are visited by the same query.
//!
//! ```
//! use dynarch::comp::InstanceHash;
//!
//! #[derive(dynarch::Comp)]
//! #[dynarch(hash = Cell::partition)]
//! struct Cell {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl Cell {
//!     fn partition(&self) -> InstanceHash { ((self.x / 64) as u64) << 32 | (self.y / 64) as u32 as u64 }
//! }
//!
//! let storage = dynarch::new::<u32>();
//! storage.set(1, (Cell { x: 3, y: 5 },));
//! storage.set(2, (Cell { x: 200, y: 5 },));
//! assert_eq!(storage.compound_count(), 2);
//! ```

mod registry;
pub use registry::{CompId, Registry};


/// Derives a [`Comp`] implementation for the applied type.
///
/// # Options
/// Options are applied in the form `#[dynarch(...)]`, separated by commas.
///
/// ## `hash = $path`
/// Uses the function `$path: fn(&Self) -> InstanceHash` as [`Comp::instance_hash`].
///
/// ## `serialize`
/// Implements [`Comp::snapshot_value`] through [`serde_json::to_value`].
/// The type must implement [`serde::Serialize`].
///
/// ## `dynarch_as($path)`
/// Refers to the dynarch crate as `$path` instead of `::dynarch`.
#[doc(inline)]
pub use dynarch_codegen::Comp;

/// The value-derived hash partitioning entities of the same component types.
pub type InstanceHash = u64;

/// A component type.
///
/// See the [module-level documentation](mod@crate::comp) for more information.
pub trait Comp: Send + Sync + 'static {
    /// Returns the instance hash of this value.
    ///
    /// The default implementation returns `0`, i.e. the type does not partition its entities.
    fn instance_hash(&self) -> InstanceHash { 0 }

    /// Returns the structured representation of this value used in
    /// [snapshots](crate::Storage::snapshot).
    ///
    /// Returns `None` by default, which appears as `null` in snapshots.
    fn snapshot_value(&self) -> Option<serde_json::Value> { None }
}
