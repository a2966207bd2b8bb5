//! Dense, type-erased component columns.
//!
//! Each compound stores one column per component type.
//! Row `i` of every column belongs to the same entity.

use std::any::Any;

use crate::comp::Comp;

/// A `Vec<C>` with the component type elided.
pub(crate) trait AnyColumn: Send + Sync + 'static {
    /// Returns the number of rows.
    fn len(&self) -> usize;

    /// Removes a row by moving the last row into its place. The removed value is dropped.
    fn swap_remove(&mut self, row: usize);

    /// Removes a row by moving the last row into its place,
    /// appending the removed value to `dest`.
    ///
    /// # Panics
    /// Panics if `dest` stores a different component type.
    fn swap_remove_into(&mut self, row: usize, dest: &mut dyn AnyColumn);

    /// Returns the snapshot representation of the value at `row`.
    fn snapshot_value(&self, row: usize) -> Option<serde_json::Value>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// The concrete storage behind [`AnyColumn`].
pub(crate) struct Column<C>(Vec<C>);

impl<C: Comp> Column<C> {
    pub(crate) fn new_boxed() -> Box<dyn AnyColumn> { Box::new(Self(Vec::new())) }

    /// Reifies a type-erased column.
    ///
    /// # Panics
    /// Panics if the column does not store `C`.
    pub(crate) fn downcast(column: &dyn AnyColumn) -> &Vec<C> {
        match column.as_any().downcast_ref::<Self>() {
            Some(column) => &column.0,
            None => panic!("column does not store {}", std::any::type_name::<C>()),
        }
    }

    /// Reifies a type-erased column mutably.
    ///
    /// # Panics
    /// Panics if the column does not store `C`.
    pub(crate) fn downcast_mut(column: &mut dyn AnyColumn) -> &mut Vec<C> {
        match column.as_any_mut().downcast_mut::<Self>() {
            Some(column) => &mut column.0,
            None => panic!("column does not store {}", std::any::type_name::<C>()),
        }
    }
}

impl<C: Comp> AnyColumn for Column<C> {
    fn len(&self) -> usize { self.0.len() }

    fn swap_remove(&mut self, row: usize) { self.0.swap_remove(row); }

    fn swap_remove_into(&mut self, row: usize, dest: &mut dyn AnyColumn) {
        let value = self.0.swap_remove(row);
        Self::downcast_mut(dest).push(value);
    }

    fn snapshot_value(&self, row: usize) -> Option<serde_json::Value> {
        self.0.get(row).and_then(Comp::snapshot_value)
    }

    fn as_any(&self) -> &dyn Any { self }

    fn as_any_mut(&mut self) -> &mut dyn Any { self }
}
