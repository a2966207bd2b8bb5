//! The storage aggregate: entity index, component registry and compound table behind one lock.
//!
//! `set`, `remove` and query iteration take the lock exclusively;
//! lookups that never compact take it shared.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;

use crate::bundle::Bundle;
use crate::column::Column;
use crate::comp::{Comp, CompId, InstanceHash, Registry};
use crate::compound::{Key, Table};
use crate::entity::{self, Location};
use crate::query::{Fetch, Query};
use crate::snapshot::Snapshot;
use crate::tracer::{DropReason, Tracer};

mod builder;
pub use builder::Builder;


/// Stores the components of all entities, grouped by compound.
///
/// All methods take `&self`; a storage is typically shared between threads behind an `Arc`.
pub struct Storage<E: entity::Raw = u32> {
    pub(crate) state:  RwLock<State<E>>,
    pub(crate) tracer: Box<dyn Tracer>,
}

#[cfg(test)]
static_assertions::assert_impl_all!(Storage<u32>: Send, Sync);

pub(crate) struct State<E: entity::Raw> {
    /// Maps each live entity to its row. Tombstoned entities are never in the index.
    pub(crate) index:    HashMap<E, Location>,
    pub(crate) registry: Registry,
    pub(crate) table:    Table<E>,
}

impl<E: entity::Raw> Storage<E> {
    /// Creates an empty storage with default settings.
    pub fn new() -> Self { Builder::new().build() }

    /// Creates a [`Builder`] to configure a new storage.
    pub fn builder() -> Builder<E> { Builder::new() }

    /// Sets the components in `bundle` on the entity `id`, creating the entity if it is unknown.
    ///
    /// Components of types not named in `bundle` are retained.
    /// If the set of (component type, instance hash) pairs of the entity changes,
    /// the entity moves to the compound for the new set.
    ///
    /// # Panics
    /// Panics if `bundle` contains the same component type twice.
    pub fn set(&self, id: E, bundle: impl Bundle) { self.state.write().set(id, bundle, &*self.tracer) }

    /// Removes the entity `id`.
    ///
    /// The entity is immediately invisible to all lookups and queries,
    /// but its row is only purged when its compound is next compacted.
    ///
    /// Returns `false` if the entity does not exist.
    pub fn remove(&self, id: E) -> bool { self.state.write().remove(id) }

    /// Looks up the ID of a component type.
    ///
    /// Returns `None` if no entity has ever been set with this type.
    pub fn lookup_comp<C: Comp>(&self) -> Option<CompId> { self.state.read().registry.lookup::<C>() }

    /// Creates a query over the component types in the tuple `Q`.
    ///
    /// # Panics
    /// Panics if `Q` contains the same component type twice.
    pub fn query<Q: Fetch>(&self) -> Query<'_, E, Q> { Query::new(self) }

    /// Returns `true` if the entity exists.
    pub fn contains(&self, id: E) -> bool { self.state.read().index.contains_key(&id) }

    /// Returns the number of entities.
    pub fn len(&self) -> usize { self.state.read().index.len() }

    /// Returns `true` if there are no entities.
    pub fn is_empty(&self) -> bool { self.state.read().index.is_empty() }

    /// Returns the number of compounds.
    ///
    /// A compound whose entities were all removed is still counted until it is compacted
    /// by a query or by [`compact`](Self::compact).
    pub fn compound_count(&self) -> usize { self.state.read().table.len() }

    /// Returns the number of registered component types.
    pub fn comp_count(&self) -> usize { self.state.read().registry.len() }

    /// Returns a copy of the component `C` of the entity `id`.
    pub fn get<C: Comp + Clone>(&self, id: E) -> Option<C> {
        let state = self.state.read();
        let comp = state.registry.lookup::<C>()?;
        let location = state.index.get(&id)?;
        let column = state.table.get(location.compound).column(comp)?;
        Some(Column::<C>::downcast(column)[location.row].clone())
    }

    /// Calls `f` with a mutable reference to the component `C` of the entity `id`.
    ///
    /// Returns `None` if the entity does not exist or does not have `C`.
    /// Changing the instance hash through the reference does not move the entity to another compound;
    /// use [`set`](Self::set) for that.
    pub fn with_comp<C: Comp, R>(&self, id: E, f: impl FnOnce(&mut C) -> R) -> Option<R> {
        let mut state = self.state.write();
        let state = &mut *state;

        let comp = state.registry.lookup::<C>()?;
        let location = *state.index.get(&id)?;
        let compound = state.table.get_mut(location.compound);
        compound.key().position(comp)?;
        Some(f(&mut compound.column_mut::<C>(comp)[location.row]))
    }

    /// Purges the removed rows of every compound.
    pub fn compact(&self) {
        let mut state = self.state.write();
        let mut index = 0;
        while index < state.table.len() {
            if !state.compact(index, &*self.tracer) {
                index += 1;
            }
        }
    }

    /// Exports the current contents of the storage.
    pub fn snapshot(&self) -> Snapshot<E> { Snapshot::capture(&self.state.read()) }

    /// Asserts that the entity index agrees with the compound contents.
    ///
    /// # Panics
    /// Panics if any internal invariant is broken.
    #[doc(hidden)]
    pub fn check_consistency(&self) {
        let state = self.state.read();
        let mut live = HashSet::new();

        for (index, compound) in state.table.iter().enumerate() {
            compound.check_invariants();
            assert!(!compound.is_empty(), "compound #{} is empty", index);

            for (row, &entity) in compound.entities().iter().enumerate() {
                if compound.is_tombstoned(entity) {
                    continue;
                }

                assert!(live.insert(entity), "{:?} has multiple live rows", entity);
                assert_eq!(
                    state.index.get(&entity),
                    Some(&Location { compound: index, row }),
                    "entity index is stale for {:?}",
                    entity
                );
            }
        }

        assert_eq!(live.len(), state.index.len(), "entity index contains entities without a row");
    }
}

impl<E: entity::Raw> Default for Storage<E> {
    fn default() -> Self { Self::new() }
}

impl<E: entity::Raw> State<E> {
    pub(crate) fn new(entity_capacity: usize, compound_capacity: usize) -> Self {
        Self {
            index:    HashMap::with_capacity(entity_capacity),
            registry: Registry::default(),
            table:    Table::with_capacity(compound_capacity),
        }
    }

    fn set(&mut self, id: E, bundle: impl Bundle, tracer: &dyn Tracer) {
        let named = bundle.register(&mut self.registry);

        let key = match self.index.get(&id) {
            Some(location) => {
                let compound = self.table.get_mut(location.compound);
                let key = compound.key().merge(&named);
                if &key == compound.key() {
                    bundle.write(compound, &named, Some(location.row));
                    return;
                }
                key
            }
            None => Key::new(named.clone()),
        };

        let dest = self.ensure_compound(key, id, tracer);

        // compound positions may have changed if `ensure_compound` dropped a compound
        match self.index.get(&id).copied() {
            Some(src) => self.migrate(id, src, dest, bundle, &named, tracer),
            None => {
                let compound = self.table.get_mut(dest);
                bundle.write(compound, &named, None);
                let row = compound.push_entity(id);
                self.index.insert(id, Location { compound: dest, row });
            }
        }
    }

    /// Returns the position of the compound for `key`, ready to receive a row for `id`.
    ///
    /// A compound that still has a tombstone for `id` is compacted first,
    /// so that the tombstone cannot match the new row.
    fn ensure_compound(&mut self, key: Key, id: E, tracer: &dyn Tracer) -> usize {
        while let Some(index) = self.table.find(&key) {
            if !self.table.get(index).is_tombstoned(id) {
                return index;
            }

            log::debug!("Compacting compound #{} before {:?} is set again", index, id);
            if !self.compact(index, tracer) {
                return index;
            }
        }

        let comps = key.len();
        let (index, created) = self.table.ensure(key, &self.registry);
        debug_assert!(created);
        log::trace!("Created compound #{} with {} component types", index, comps);
        tracer.create_compound(index, comps);
        index
    }

    fn migrate(
        &mut self,
        id: E,
        src: Location,
        dest: usize,
        bundle: impl Bundle,
        named: &[(CompId, InstanceHash)],
        tracer: &dyn Tracer,
    ) {
        let (src_compound, dest_compound) = self.table.pair_mut(src.compound, dest);

        if let Some(moved) = src_compound.migrate_row(src.row, dest_compound, named) {
            if !src_compound.is_tombstoned(moved) {
                self.index.insert(moved, src);
            }
        }

        bundle.write(dest_compound, named, None);
        let row = dest_compound.push_entity(id);
        let emptied = src_compound.is_empty();
        tracer.migrate(src.compound, dest);

        let mut location = Location { compound: dest, row };
        if emptied && self.drop_compound(src.compound, DropReason::Emptied, tracer) == Some(dest) {
            location.compound = src.compound;
        }
        self.index.insert(id, location);
    }

    pub(crate) fn remove(&mut self, id: E) -> bool {
        let location = match self.index.remove(&id) {
            Some(location) => location,
            None => return false,
        };

        let marked = self.table.get_mut(location.compound).mark_removed(id);
        debug_assert!(marked, "live entity {:?} was already tombstoned", id);
        true
    }

    /// Purges the tombstoned rows of the compound at `index`.
    ///
    /// Returns `true` if every row was tombstoned and the compound was dropped,
    /// in which case another compound may now occupy `index`.
    pub(crate) fn compact(&mut self, index: usize, tracer: &dyn Tracer) -> bool {
        let compound = self.table.get_mut(index);
        let removed = compound.tombstones().len();
        if removed == 0 {
            return false;
        }

        if removed == compound.len() {
            self.drop_compound(index, DropReason::Compacted, tracer);
            return true;
        }

        let entity_index = &mut self.index;
        compound.compact(|entity, row| {
            entity_index.insert(entity, Location { compound: index, row });
        });

        log::trace!("Compacted compound #{}: {} removed, {} remaining", index, removed, compound.len());
        tracer.compact(index, removed, compound.len());
        false
    }

    /// Removes the compound at `index` from the table.
    ///
    /// Returns the previous position of the compound moved into `index`, if any.
    fn drop_compound(&mut self, index: usize, reason: DropReason, tracer: &dyn Tracer) -> Option<usize> {
        log::trace!("Dropping compound #{} ({:?})", index, reason);
        tracer.drop_compound(index, reason);

        let moved_from = self.table.swap_remove(index)?;
        let moved = self.table.get(index);
        for (row, &entity) in moved.entities().iter().enumerate() {
            if !moved.is_tombstoned(entity) {
                self.index.insert(entity, Location { compound: index, row });
            }
        }
        Some(moved_from)
    }
}
