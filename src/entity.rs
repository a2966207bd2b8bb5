//! Entity identifiers.
//!
//! dynarch does not allocate entity IDs.
//! Callers choose a fixed-width integer type and supply the IDs themselves;
//! an ID only needs to be unique among the entities that are currently alive.
//!
//! The integer width is selected through the type parameter of [`Storage`](crate::Storage),
//! e.g. `Storage<u16>` for small worlds or `Storage<i64>` for externally keyed data.

use std::fmt;
use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A raw entity ID.
///
/// This trait is implemented for all primitive fixed-width integers.
pub trait Raw:
    Sized + Send + Sync + Copy + fmt::Debug + Eq + Ord + Hash + Serialize + DeserializeOwned + 'static
{
}

macro_rules! impl_raw {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Raw for $ty {}
        )*
    };
}

impl_raw!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

/// The position of a live entity in the storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Location {
    /// Index of the compound in the compound table.
    pub(crate) compound: usize,
    /// Row of the entity within the compound.
    pub(crate) row:      usize,
}
