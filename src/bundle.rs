//! Tuples of component values accepted by [`Storage::set`](crate::Storage::set).

use crate::comp::{Comp, CompId, InstanceHash, Registry};
use crate::compound::Compound;
use crate::entity;
use crate::util::{self, DbgTypeId};

/// A tuple of components written to an entity in one call.
///
/// Implemented for tuples of 1 to 8 distinct component types.
pub trait Bundle: Send + 'static {
    /// The types in this bundle, in tuple order.
    fn type_ids() -> Vec<DbgTypeId>;

    /// Registers the component types and computes the instance hash of each value.
    ///
    /// The returned pairs are in tuple order.
    ///
    /// # Panics
    /// Panics if the same component type appears twice in the bundle.
    #[doc(hidden)]
    fn register(&self, registry: &mut Registry) -> Vec<(CompId, InstanceHash)>;

    /// Writes the values into `compound`, overwriting `row` if it is `Some`, or appending otherwise.
    ///
    /// `named` must be the result of [`register`](Self::register) on the same bundle.
    #[doc(hidden)]
    fn write<E: entity::Raw>(
        self,
        compound: &mut Compound<E>,
        named: &[(CompId, InstanceHash)],
        row: Option<usize>,
    );
}

macro_rules! impl_bundle {
    ($($ty:ident),* $(,)?) => {
        impl<$($ty: Comp),*> Bundle for ($($ty,)*) {
            fn type_ids() -> Vec<DbgTypeId> { vec![$(DbgTypeId::of::<$ty>()),*] }

            #[allow(non_snake_case)]
            fn register(&self, registry: &mut Registry) -> Vec<(CompId, InstanceHash)> {
                util::assert_distinct(&Self::type_ids(), "bundle");

                let ($($ty,)*) = self;
                vec![$((registry.ensure::<$ty>(), $ty.instance_hash())),*]
            }

            #[allow(non_snake_case)]
            fn write<E: entity::Raw>(
                self,
                compound: &mut Compound<E>,
                named: &[(CompId, InstanceHash)],
                row: Option<usize>,
            ) {
                let ($($ty,)*) = self;
                let mut named = named.iter();
                $(
                    let &(comp, _) = named.next().expect("named pairs are shorter than the bundle");
                    compound.put::<$ty>(comp, row, $ty);
                )*
            }
        }
    };
}

macro_rules! impl_bundle_accumulate {
    () => {};
    ($first:ident $(, $rest:ident)* $(,)?) => {
        impl_bundle!($first $(, $rest)*);
        impl_bundle_accumulate!($($rest),*);
    };
}

impl_bundle_accumulate!(T1, T2, T3, T4, T5, T6, T7, T8);
