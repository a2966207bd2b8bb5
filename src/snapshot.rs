//! A structural dump of a storage, for inspection and debugging.
//!
//! The format is plain nested maps and arrays without versioning.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::comp::{CompId, InstanceHash};
use crate::entity;
use crate::storage::State;

/// The contents of a [`Storage`](crate::Storage) at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "E: Ord + Deserialize<'de>"))]
pub struct Snapshot<E> {
    /// Maps each live entity to the position of its compound in `compounds`.
    pub entities:   BTreeMap<E, usize>,
    /// The names of the registered component types, indexed by [`CompId`].
    pub components: Vec<String>,
    /// All compounds in table order.
    pub compounds:  Vec<CompoundSnapshot<E>>,
}

/// The contents of one compound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundSnapshot<E> {
    /// One entry per (component type, instance hash) pair of the compound.
    pub columns:  Vec<ColumnSnapshot>,
    /// The entity of each row, including removed entities that are not compacted yet.
    pub entities: Vec<E>,
    /// Entities pending removal.
    pub removed:  Vec<E>,
}

/// The values of one component type in a compound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSnapshot {
    /// The component type, indexing [`Snapshot::components`].
    pub comp:   CompId,
    /// The instance hash shared by all values of this column.
    pub hash:   InstanceHash,
    /// [`Comp::snapshot_value`](crate::Comp::snapshot_value) of each row.
    pub values: Vec<Option<serde_json::Value>>,
}

impl<E: entity::Raw> Snapshot<E> {
    pub(crate) fn capture(state: &State<E>) -> Self {
        let entities =
            state.index.iter().map(|(&entity, location)| (entity, location.compound)).collect();
        let components = state.registry.names().map(String::from).collect();

        let compounds = state
            .table
            .iter()
            .map(|compound| {
                let columns = compound
                    .key()
                    .pairs()
                    .iter()
                    .map(|&(comp, hash)| {
                        let column = compound.column(comp).expect("key and columns are aligned");
                        ColumnSnapshot {
                            comp,
                            hash,
                            values: (0..compound.len()).map(|row| column.snapshot_value(row)).collect(),
                        }
                    })
                    .collect();

                CompoundSnapshot {
                    columns,
                    entities: compound.entities().to_vec(),
                    removed: compound.tombstones().to_vec(),
                }
            })
            .collect();

        Self { entities, components, compounds }
    }

    /// Encodes the snapshot as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> { serde_json::to_string_pretty(self) }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::Snapshot;
    use crate::test_util::*;
    use crate::Storage;

    #[test]
    fn test_snapshot_contents() {
        let storage = Storage::<u16>::new();
        storage.set(1, (Walking { speed: 7 }, Position { x: 0, y: 0 }));
        storage.set(2, (Walking { speed: 8 }, Position { x: 1, y: 1 }));
        storage.set(3, (Zoned { zone: 4, value: 0 },));
        storage.remove(2);

        let snapshot = storage.snapshot();
        assert_eq!(snapshot.entities.into_iter().collect::<Vec<_>>(), [(1, 0), (3, 1)]);
        assert_eq!(
            snapshot.components,
            ["dynarch::test_util::Walking", "dynarch::test_util::Position", "dynarch::test_util::Zoned"]
        );

        let walking = &snapshot.compounds[0];
        assert_eq!(walking.entities, [1, 2]);
        assert_eq!(walking.removed, [2]);
        assert_eq!(walking.columns[0].values, [Some(json!({"speed": 7})), Some(json!({"speed": 8}))]);
        assert_eq!(walking.columns[1].values, [None, None]);

        assert_eq!(snapshot.compounds[1].columns[0].hash, 4);
    }

    #[test]
    fn test_json_parses_back() {
        let storage = Storage::<u64>::new();
        storage.set(u64::MAX, (Walking { speed: -1 },));

        let snapshot = storage.snapshot();
        let json = snapshot.to_json().unwrap();
        let parsed: Snapshot<u64> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn test_json_parses_back_signed() {
        let storage = Storage::<i32>::new();
        storage.set(-5, (Walking { speed: 3 },));
        storage.set(i32::MIN, (Walking { speed: 4 },));

        let parsed: Snapshot<i32> = serde_json::from_str(&storage.snapshot().to_json().unwrap()).unwrap();
        assert_eq!(parsed.entities.keys().copied().collect::<Vec<_>>(), [i32::MIN, -5]);
    }
}
