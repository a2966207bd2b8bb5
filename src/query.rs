//! Iteration over all entities that have a given set of component types.
//!
//! A query matches every compound whose component types are a superset of the queried types,
//! regardless of instance hashes.
//! The matching compounds are looked up again on every call,
//! so compounds created after the query was constructed are also visited.

use std::marker::PhantomData;

use itertools::multizip;

use crate::column::Column;
use crate::comp::{Comp, CompId, Registry};
use crate::compound::Compound;
use crate::util::{self, DbgTypeId};
use crate::{entity, Storage};

#[cfg(test)]
mod tests;

/// A tuple of component types that can be queried.
///
/// Implemented for tuples of 1 to 8 component types.
pub trait Fetch: 'static {
    /// The types in this tuple, in tuple order.
    fn type_ids() -> Vec<DbgTypeId>;
}

/// A query over the component types `Q` of a [`Storage`].
///
/// Created by [`Storage::query`].
/// Iteration methods are implemented for each tuple arity.
pub struct Query<'s, E: entity::Raw, Q: Fetch> {
    storage: &'s Storage<E>,
    types:   Vec<DbgTypeId>,
    _ph:     PhantomData<fn() -> Q>,
}

impl<'s, E: entity::Raw, Q: Fetch> Query<'s, E, Q> {
    pub(crate) fn new(storage: &'s Storage<E>) -> Self {
        let types = Q::type_ids();
        util::assert_distinct(&types, "query");
        Self { storage, types, _ph: PhantomData }
    }

    /// Returns `None` if any queried type was never registered, in which case nothing matches.
    fn resolve(&self, registry: &Registry) -> Option<Vec<CompId>> {
        self.types.iter().map(|&ty| registry.lookup_type(ty)).collect()
    }

    /// Calls `f` on each matching compound after compacting it.
    fn visit(&self, mut f: impl FnMut(&mut Compound<E>, &[CompId])) {
        let mut state = self.storage.state.write();
        let comps = match self.resolve(&state.registry) {
            Some(comps) => comps,
            None => return,
        };

        let mut index = 0;
        while index < state.table.len() {
            if !state.table.get(index).key().contains_all(&comps) {
                index += 1;
                continue;
            }

            if state.compact(index, &*self.storage.tracer) {
                // another compound was moved into `index`
                continue;
            }

            f(state.table.get_mut(index), &comps);
            index += 1;
        }
    }

    /// Compacts all matching compounds, then calls `f` on each of them in parallel.
    fn par_visit(&self, f: impl Fn(&mut Compound<E>, &[CompId]) + Sync) {
        let mut state = self.storage.state.write();
        let comps = match self.resolve(&state.registry) {
            Some(comps) => comps,
            None => return,
        };

        let mut index = 0;
        while index < state.table.len() {
            let matches = state.table.get(index).key().contains_all(&comps);
            if !(matches && state.compact(index, &*self.storage.tracer)) {
                index += 1;
            }
        }

        state.table.par_for_each_matching(&comps, |compound| f(compound, &comps));
    }
}

macro_rules! impl_fetch {
    ($($ty:ident),* $(,)?) => {
        impl<$($ty: Comp),*> Fetch for ($($ty,)*) {
            fn type_ids() -> Vec<DbgTypeId> { vec![$(DbgTypeId::of::<$ty>()),*] }
        }

        impl<'s, E: entity::Raw, $($ty: Comp),*> Query<'s, E, ($($ty,)*)> {
            /// Calls `f` with the ID and components of every matching entity.
            ///
            /// The storage is locked exclusively for the whole call.
            /// Calling any method of the same storage from `f` deadlocks.
            /// Component references must not escape `f`,
            /// since rows may move once the lock is released.
            pub fn each(&self, mut f: impl FnMut(E, ($(&mut $ty,)*))) {
                self.visit(|compound, comps| Self::for_each_row(compound, comps, &mut f));
            }

            /// Like [`each`](Self::each), but visits different compounds on the rayon thread pool.
            ///
            /// Rows of the same compound are visited serially.
            pub fn par_each(&self, f: impl Fn(E, ($(&mut $ty,)*)) + Sync) {
                self.par_visit(|compound, comps| Self::for_each_row(compound, comps, &f));
            }

            #[allow(non_snake_case)]
            fn for_each_row(
                compound: &mut Compound<E>,
                comps: &[CompId],
                mut f: impl FnMut(E, ($(&mut $ty,)*)),
            ) {
                let (entities, columns) = compound.split_columns(comps);
                let mut columns = columns.into_iter();
                $(
                    let $ty = Column::<$ty>::downcast_mut(
                        columns.next().expect("one column per queried type"),
                    );
                )*

                for (&entity, ($($ty,)*)) in entities.iter().zip(multizip(($($ty.iter_mut(),)*))) {
                    f(entity, ($($ty,)*));
                }
            }
        }
    };
}

macro_rules! impl_fetch_accumulate {
    () => {};
    ($first:ident $(, $rest:ident)* $(,)?) => {
        impl_fetch!($first $(, $rest)*);
        impl_fetch_accumulate!($($rest),*);
    };
}

impl_fetch_accumulate!(T1, T2, T3, T4, T5, T6, T7, T8);
