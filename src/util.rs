//! Miscellaneous helpers used across the storage internals.

use std::any::{self, TypeId};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A [`TypeId`] that also remembers the type name for debugging and snapshots.
///
/// Equality, ordering and hashing only consider the [`TypeId`].
#[derive(Clone, Copy)]
pub struct DbgTypeId {
    /// The actual [`TypeId`].
    pub id:   TypeId,
    /// The name returned by [`any::type_name`].
    pub name: &'static str,
}

impl DbgTypeId {
    /// Creates a new [`DbgTypeId`] representing the type `T`.
    pub fn of<T: 'static>() -> Self { Self { id: TypeId::of::<T>(), name: any::type_name::<T>() } }
}

impl fmt::Debug for DbgTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.name) }
}

impl PartialEq for DbgTypeId {
    fn eq(&self, other: &Self) -> bool { self.id == other.id }
}

impl Eq for DbgTypeId {}

impl PartialOrd for DbgTypeId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for DbgTypeId {
    fn cmp(&self, other: &Self) -> Ordering { self.id.cmp(&other.id) }
}

impl Hash for DbgTypeId {
    fn hash<H: Hasher>(&self, state: &mut H) { self.id.hash(state); }
}

/// Inserts `value` into a sorted, deduplicated vector.
///
/// Returns `false` if the value was already present.
pub(crate) fn insert_sorted<T: Ord>(vec: &mut Vec<T>, value: T) -> bool {
    match vec.binary_search(&value) {
        Ok(_) => false,
        Err(index) => {
            vec.insert(index, value);
            true
        }
    }
}

/// Panics if the same type appears twice in `types`.
///
/// `context` describes the tuple being checked, e.g. "bundle" or "query".
pub(crate) fn assert_distinct(types: &[DbgTypeId], context: &str) {
    use itertools::Itertools;

    if let Some(dup) = types.iter().duplicates().next() {
        panic!("{} contains the component type {} more than once", context, dup.name);
    }
}
