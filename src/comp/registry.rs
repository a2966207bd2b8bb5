use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Comp;
use crate::column::{AnyColumn, Column};
use crate::util::DbgTypeId;

/// Identifies a component type within a storage.
///
/// IDs are assigned in registration order starting from 0 and never change or get reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompId(pub(crate) usize);

impl CompId {
    /// Returns the registration index of this component type.
    pub fn index(self) -> usize { self.0 }
}

struct CompInfo {
    new_column: fn() -> Box<dyn AnyColumn>,
}

/// Interns component types into [`CompId`]s.
///
/// The registry is append-only.
#[derive(Default)]
pub struct Registry {
    types: IndexMap<DbgTypeId, CompInfo>,
}

impl Registry {
    /// Looks up the ID of a component type without registering it.
    pub fn lookup<C: Comp>(&self) -> Option<CompId> { self.lookup_type(DbgTypeId::of::<C>()) }

    pub(crate) fn lookup_type(&self, ty: DbgTypeId) -> Option<CompId> {
        self.types.get_index_of(&ty).map(CompId)
    }

    /// Returns the ID of a component type, registering it if it is unknown.
    pub(crate) fn ensure<C: Comp>(&mut self) -> CompId {
        let ty = DbgTypeId::of::<C>();
        if let Some(id) = self.lookup_type(ty) {
            return id;
        }

        let (index, _) = self.types.insert_full(ty, CompInfo { new_column: Column::<C>::new_boxed });
        log::trace!("Registered component type {} as #{}", ty.name, index);
        CompId(index)
    }

    /// Creates an empty column for the component type.
    pub(crate) fn new_column(&self, id: CompId) -> Box<dyn AnyColumn> {
        let (_, info) = self.types.get_index(id.0).expect("CompId from another registry");
        (info.new_column)()
    }

    /// Returns the type name of a registered component type.
    pub fn name(&self, id: CompId) -> &'static str {
        let (ty, _) = self.types.get_index(id.0).expect("CompId from another registry");
        ty.name
    }

    /// Returns the number of registered component types.
    pub fn len(&self) -> usize { self.types.len() }

    /// Returns `true` if no component types have been registered.
    pub fn is_empty(&self) -> bool { self.types.is_empty() }

    /// Iterates over the names of all registered component types in ID order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.types.keys().map(|ty| ty.name)
    }
}
