//! A compound (archetype) stores all entities that share the same set of
//! (component type, instance hash) pairs.
//!
//! Storage is columnar: each component type has a dense column,
//! and row `i` of every column and of the entity array describes the same entity.
//!
//! # Deferred removal
//! Removing an entity does not touch the columns.
//! The entity ID is inserted into a sorted tombstone list instead,
//! and all tombstoned rows are purged together in one pass by [`Compound::compact`]
//! before the compound is next iterated.

use serde::{Deserialize, Serialize};

use crate::column::{AnyColumn, Column};
use crate::comp::{Comp, CompId, InstanceHash, Registry};
use crate::{entity, util};

mod table;
pub use table::Table;


/// The identity of a compound.
///
/// A key is the set of (component type, instance hash) pairs of its entities,
/// kept sorted so that equal sets compare equal regardless of insertion order.
/// Each component type appears at most once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key(Vec<(CompId, InstanceHash)>);

impl Key {
    /// Creates a key from unordered pairs.
    ///
    /// # Panics
    /// Panics in debug mode if a component type appears twice.
    pub fn new(mut pairs: Vec<(CompId, InstanceHash)>) -> Self {
        pairs.sort_unstable();
        debug_assert!(
            pairs.windows(2).all(|pair| pair[0].0 != pair[1].0),
            "compound key contains duplicate component types: {:?}",
            pairs
        );
        Self(pairs)
    }

    /// Returns the sorted pairs of this key.
    pub fn pairs(&self) -> &[(CompId, InstanceHash)] { &self.0 }

    /// Returns the number of component types in this key.
    pub fn len(&self) -> usize { self.0.len() }

    /// Returns `true` if the key has no component types.
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Returns the position of a component type in this key.
    pub fn position(&self, comp: CompId) -> Option<usize> {
        self.0.binary_search_by_key(&comp, |&(id, _)| id).ok()
    }

    /// Returns `true` if the key contains every component type in `comps`, ignoring hashes.
    pub fn contains_all(&self, comps: &[CompId]) -> bool {
        comps.iter().all(|&comp| self.position(comp).is_some())
    }

    /// Returns the key of an entity currently in `self` after `named` components are set on it.
    ///
    /// Pairs in `self` whose component type is named are replaced,
    /// all other pairs are carried over.
    pub fn merge(&self, named: &[(CompId, InstanceHash)]) -> Self {
        let carried = self.0.iter().filter(|&&(comp, _)| !named.iter().any(|&(n, _)| n == comp));
        Self::new(carried.chain(named).copied().collect())
    }
}

/// Dense storage for all entities of one [`Key`].
pub struct Compound<E: entity::Raw> {
    key:        Key,
    /// One column per pair in `key`, in the same order.
    columns:    Vec<Box<dyn AnyColumn>>,
    entities:   Vec<E>,
    /// Sorted, deduplicated subset of `entities` pending removal.
    tombstones: Vec<E>,
}

impl<E: entity::Raw> Compound<E> {
    /// Creates an empty compound with one column per component type in `key`.
    pub(crate) fn new(key: Key, registry: &Registry) -> Self {
        let columns = key.pairs().iter().map(|&(comp, _)| registry.new_column(comp)).collect();
        Self { key, columns, entities: Vec::new(), tombstones: Vec::new() }
    }

    /// The identity of this compound.
    pub fn key(&self) -> &Key { &self.key }

    /// The number of rows, including tombstoned rows that have not been compacted yet.
    pub fn len(&self) -> usize { self.entities.len() }

    /// Returns `true` if the compound has no rows.
    pub fn is_empty(&self) -> bool { self.entities.is_empty() }

    /// The entity ID of each row.
    pub fn entities(&self) -> &[E] { &self.entities }

    /// The sorted IDs of the entities pending removal.
    pub fn tombstones(&self) -> &[E] { &self.tombstones }

    /// Returns `true` if tombstoned rows need to be compacted before iteration.
    pub fn needs_compaction(&self) -> bool { !self.tombstones.is_empty() }

    /// Returns `true` if `id` is pending removal from this compound.
    pub fn is_tombstoned(&self, id: E) -> bool { self.tombstones.binary_search(&id).is_ok() }

    pub(crate) fn column(&self, comp: CompId) -> Option<&dyn AnyColumn> {
        let index = self.key.position(comp)?;
        Some(&*self.columns[index])
    }

    /// Returns the typed column for a component type in this compound.
    ///
    /// # Panics
    /// Panics if the compound does not contain `comp`, or if `comp` does not identify `C`.
    pub(crate) fn column_mut<C: Comp>(&mut self, comp: CompId) -> &mut Vec<C> {
        let index = match self.key.position(comp) {
            Some(index) => index,
            None => panic!("compound {:?} has no column for {}", self.key, std::any::type_name::<C>()),
        };
        Column::<C>::downcast_mut(&mut *self.columns[index])
    }

    /// Writes a component value, either overwriting `row` or appending a new row.
    ///
    /// Appending only extends the column;
    /// the row is complete after every column is written and [`push_entity`](Self::push_entity) is called.
    pub(crate) fn put<C: Comp>(&mut self, comp: CompId, row: Option<usize>, value: C) {
        let column = self.column_mut::<C>(comp);
        match row {
            Some(row) => column[row] = value,
            None => column.push(value),
        }
    }

    /// Completes an appended row by recording its entity ID. Returns the new row index.
    pub(crate) fn push_entity(&mut self, id: E) -> usize {
        debug_assert!(!self.is_tombstoned(id), "{:?} is appended while tombstoned", id);
        self.entities.push(id);
        self.debug_check_aligned();
        self.entities.len() - 1
    }

    /// Moves `row` out of this compound into `dest` by swap-remove.
    ///
    /// Values of component types that are not in `named` are appended to the matching column of `dest`;
    /// values of named types are dropped, since the caller overwrites them.
    /// The caller must append the named values and call [`push_entity`](Self::push_entity) on `dest`.
    ///
    /// Returns the entity that was moved into `row`, if any.
    pub(crate) fn migrate_row(
        &mut self,
        row: usize,
        dest: &mut Compound<E>,
        named: &[(CompId, InstanceHash)],
    ) -> Option<E> {
        for (&(comp, _), column) in self.key.0.iter().zip(&mut self.columns) {
            if named.iter().any(|&(n, _)| n == comp) {
                column.swap_remove(row);
            } else {
                let dest_index = dest.key.position(comp).expect("merged key carries unnamed types");
                column.swap_remove_into(row, &mut *dest.columns[dest_index]);
            }
        }

        self.swap_remove_entity(row)
    }

    fn swap_remove_entity(&mut self, row: usize) -> Option<E> {
        self.entities.swap_remove(row);
        self.debug_check_aligned();
        self.entities.get(row).copied()
    }

    /// Records `id` as pending removal.
    ///
    /// Returns `false` if it was already tombstoned.
    pub(crate) fn mark_removed(&mut self, id: E) -> bool {
        util::insert_sorted(&mut self.tombstones, id)
    }

    /// Purges all tombstoned rows in a single pass.
    ///
    /// Each tombstoned row is swap-removed from every column,
    /// so surviving rows may move to a lower index;
    /// `relocate(id, row)` is called for each surviving entity that moved.
    ///
    /// Returns the number of purged rows.
    pub(crate) fn compact(&mut self, mut relocate: impl FnMut(E, usize)) -> usize {
        let before = self.entities.len();
        let mut row = 0;
        let mut moved = false;

        while row < self.entities.len() {
            let id = self.entities[row];
            if self.tombstones.binary_search(&id).is_ok() {
                for column in &mut self.columns {
                    column.swap_remove(row);
                }
                self.entities.swap_remove(row);
                // the last row now occupies `row` and has not been tested yet
                moved = true;
            } else {
                if moved {
                    relocate(id, row);
                }
                moved = false;
                row += 1;
            }
        }

        self.tombstones.clear();
        self.debug_check_aligned();
        before - self.entities.len()
    }

    /// Splits the compound into its entity array and the columns of `comps`, in the order of `comps`.
    ///
    /// # Panics
    /// Panics if the compound does not contain every type in `comps`,
    /// or if `comps` contains the same type twice.
    pub(crate) fn split_columns(
        &mut self,
        comps: &[CompId],
    ) -> (&[E], Vec<&mut (dyn AnyColumn + 'static)>) {
        let mut found: Vec<Option<&mut Box<dyn AnyColumn>>> = comps.iter().map(|_| None).collect();
        for (&(comp, _), column) in self.key.0.iter().zip(&mut self.columns) {
            if let Some(index) = comps.iter().position(|&c| c == comp) {
                found[index] = Some(column);
            }
        }

        let columns = found
            .into_iter()
            .map(|column| &mut **column.expect("compound does not contain every queried type"))
            .collect();
        (&self.entities, columns)
    }

    fn debug_check_aligned(&self) {
        if cfg!(debug_assertions) {
            for (&(comp, _), column) in self.key.0.iter().zip(&self.columns) {
                assert_eq!(
                    column.len(),
                    self.entities.len(),
                    "column {:?} is misaligned with the entity array",
                    comp
                );
            }
        }
    }

    /// Asserts all structural invariants of this compound.
    pub(crate) fn check_invariants(&self) {
        assert_eq!(self.columns.len(), self.key.len());
        for column in &self.columns {
            assert_eq!(column.len(), self.entities.len(), "column is misaligned with the entity array");
        }
        assert!(
            self.tombstones.windows(2).all(|pair| pair[0] < pair[1]),
            "tombstones are not sorted and deduplicated"
        );
        for id in &self.tombstones {
            assert!(self.entities.contains(id), "tombstone {:?} is not in the compound", id);
        }
    }
}
