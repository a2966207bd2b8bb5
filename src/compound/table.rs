use indexmap::IndexMap;
use rayon::prelude::*;

use super::{Compound, Key};
use crate::comp::{CompId, Registry};
use crate::entity;

/// The set of all compounds in a storage, indexed by their [`Key`].
///
/// Compounds are addressed by their position in the table.
/// Removing a compound moves the last compound into the vacated position.
pub struct Table<E: entity::Raw> {
    compounds: IndexMap<Key, Compound<E>>,
}

impl<E: entity::Raw> Table<E> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self { compounds: IndexMap::with_capacity(capacity) }
    }

    /// Returns the position of the compound for `key`, creating an empty one if none exists.
    ///
    /// The second value is `true` if the compound was created.
    pub(crate) fn ensure(&mut self, key: Key, registry: &Registry) -> (usize, bool) {
        if let Some(index) = self.compounds.get_index_of(&key) {
            return (index, false);
        }

        let compound = Compound::new(key.clone(), registry);
        let (index, _) = self.compounds.insert_full(key, compound);
        (index, true)
    }

    /// Returns the position of the compound for `key`, if it exists.
    pub fn find(&self, key: &Key) -> Option<usize> { self.compounds.get_index_of(key) }

    /// Returns the number of compounds.
    pub fn len(&self) -> usize { self.compounds.len() }

    /// Returns `true` if there are no compounds.
    pub fn is_empty(&self) -> bool { self.compounds.is_empty() }

    /// Returns the compound at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn get(&self, index: usize) -> &Compound<E> {
        match self.compounds.get_index(index) {
            Some((_, compound)) => compound,
            None => panic!("compound #{} does not exist", index),
        }
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> &mut Compound<E> {
        match self.compounds.get_index_mut(index) {
            Some((_, compound)) => compound,
            None => panic!("compound #{} does not exist", index),
        }
    }

    /// Returns mutable references to two distinct compounds.
    ///
    /// # Panics
    /// Panics if `a == b` or either index is out of bounds.
    pub(crate) fn pair_mut(&mut self, a: usize, b: usize) -> (&mut Compound<E>, &mut Compound<E>) {
        assert_ne!(a, b, "cannot borrow compound #{} twice", a);

        let (low, high) = if a < b { (a, b) } else { (b, a) };
        let mut values = self.compounds.values_mut();
        let low_ref = values.nth(low).expect("index out of bounds");
        let high_ref = values.nth(high - low - 1).expect("index out of bounds");

        if a < b {
            (low_ref, high_ref)
        } else {
            (high_ref, low_ref)
        }
    }

    /// Removes the compound at `index`.
    ///
    /// If another compound was moved into `index`, returns its previous position.
    pub(crate) fn swap_remove(&mut self, index: usize) -> Option<usize> {
        self.compounds.swap_remove_index(index).expect("index out of bounds");
        let last = self.compounds.len();
        (index < last).then_some(last)
    }

    /// Iterates over all compounds in table order.
    pub fn iter(&self) -> impl Iterator<Item = &Compound<E>> + '_ { self.compounds.values() }

    /// Runs `f` on every compound containing all of `comps`, in parallel.
    pub(crate) fn par_for_each_matching(
        &mut self,
        comps: &[CompId],
        f: impl Fn(&mut Compound<E>) + Sync + Send,
    ) {
        self.compounds
            .par_values_mut()
            .filter(|compound| compound.key().contains_all(comps))
            .for_each(f);
    }
}
