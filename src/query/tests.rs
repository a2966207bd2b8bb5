use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::test_util::*;
use crate::Storage;

fn positions(storage: &Storage<u32>) -> BTreeMap<u32, Position> {
    let mut map = BTreeMap::new();
    storage.query::<(Position,)>().each(|id, (position,)| {
        assert!(map.insert(id, *position).is_none(), "{} visited twice", id);
    });
    map
}

#[test]
fn test_each_matches_superset() {
    init();

    let storage = Storage::<u32>::new();
    storage.set(1, (Position { x: 100, y: 200 },));
    storage.set(2, (Position { x: 200, y: 200 },));
    storage.set(3, (Momentum { hs: 10, vs: -10 },));
    storage.set(4, (Position { x: 5, y: 6 }, Momentum { hs: 1, vs: 1 }));

    let visited = positions(&storage);
    assert_eq!(visited.keys().copied().collect::<Vec<_>>(), [1, 2, 4]);
    assert_eq!(visited[&1], Position { x: 100, y: 200 });
    assert_eq!(visited[&2], Position { x: 200, y: 200 });

    let mut both = Vec::new();
    storage.query::<(Momentum, Position)>().each(|id, (momentum, position)| {
        both.push((id, momentum.hs, position.x));
    });
    assert_eq!(both, [(4, 1, 5)]);
}

#[test]
fn test_each_ignores_instance_hash() {
    let storage = Storage::<u32>::new();
    for id in 0..9 {
        storage.set(id, (Zoned { zone: id % 3, value: id as i32 },));
    }
    assert_eq!(storage.compound_count(), 3);

    let mut sum = 0;
    storage.query::<(Zoned,)>().each(|_, (zoned,)| sum += zoned.value);
    assert_eq!(sum, (0..9).sum::<i32>());
}

#[test]
fn test_each_mutates_in_place() {
    let storage = Storage::<u32>::new();
    storage.set(1, (Position { x: 1, y: 1 }, Momentum { hs: 2, vs: 3 }));
    storage.set(2, (Position { x: 0, y: 0 }, Momentum { hs: -1, vs: -1 }));

    storage.query::<(Position, Momentum)>().each(|_, (position, momentum)| {
        position.x += momentum.hs;
        position.y += momentum.vs;
    });

    assert_eq!(storage.get::<Position>(1), Some(Position { x: 3, y: 4 }));
    assert_eq!(storage.get::<Position>(2), Some(Position { x: -1, y: -1 }));
}

#[test]
fn test_query_sees_later_compounds() {
    let storage = Storage::<u32>::new();
    let query = storage.query::<(Position,)>();

    let mut count = 0;
    query.each(|_, _| count += 1);
    assert_eq!(count, 0);

    storage.set(1, (Position { x: 0, y: 0 },));
    storage.set(2, (Position { x: 0, y: 0 }, Walking { speed: 1 }));

    let mut count = 0;
    query.each(|_, _| count += 1);
    assert_eq!(count, 2);
}

#[test]
fn test_removed_entities_are_skipped() {
    let counter = Counter::default();
    let storage = Storage::<u32>::builder().tracer(counter.clone()).build();
    for id in 0..10 {
        storage.set(id, (Position { x: id as i32, y: 0 },));
    }
    storage.remove(3);
    storage.remove(7);

    let visited = positions(&storage);
    assert_eq!(visited.len(), 8);
    assert!(!visited.contains_key(&3));
    assert!(!visited.contains_key(&7));
    for (id, position) in visited {
        assert_eq!(position.x, id as i32);
    }

    assert_eq!(counter.get(|c| &c.compacted), 1);
    assert_eq!(counter.get(|c| &c.purged), 2);
    storage.check_consistency();
}

#[test]
fn test_compaction_drops_matching_compounds() {
    let counter = Counter::default();
    let storage = Storage::<u32>::builder().tracer(counter.clone()).build();
    storage.set(1, (Position { x: 1, y: 0 },));
    storage.set(2, (Position { x: 2, y: 0 }, Walking { speed: 2 }));
    storage.set(3, (Position { x: 3, y: 0 }, Momentum { hs: 0, vs: 0 }));
    storage.remove(1);
    storage.remove(2);

    assert_eq!(positions(&storage).keys().copied().collect::<Vec<_>>(), [3]);
    assert_eq!(storage.compound_count(), 1);
    assert_eq!(counter.get(|c| &c.dropped), 2);
    assert_eq!(counter.get(|c| &c.emptied), 0);
    storage.check_consistency();
}

#[test]
fn test_unregistered_type_matches_nothing() {
    let storage = Storage::<u32>::new();
    storage.set(1, (Position { x: 0, y: 0 },));

    storage.query::<(Position, Walking)>().each(|id, _| panic!("{} should not match", id));
    assert_eq!(storage.lookup_comp::<Walking>(), None);
}

#[test]
fn test_par_each() {
    let storage = Storage::<u32>::new();
    for id in 0..1000 {
        storage.set(id, (Zoned { zone: id % 8, value: 1 }, Position { x: 0, y: 0 }));
    }
    for id in (0..1000).step_by(10) {
        storage.remove(id);
    }

    let visited = AtomicUsize::new(0);
    storage.query::<(Zoned, Position)>().par_each(|id, (zoned, position)| {
        assert_ne!(id % 10, 0);
        position.x = zoned.value + zoned.zone as i32;
        visited.fetch_add(1, Ordering::Relaxed);
    });
    assert_eq!(visited.into_inner(), 900);

    for id in (1..1000).filter(|id| id % 10 != 0) {
        assert_eq!(storage.get::<Position>(id), Some(Position { x: 1 + (id % 8) as i32, y: 0 }));
    }
    storage.check_consistency();
}

#[test]
#[should_panic = "query contains the component type dynarch::test_util::Position more than once"]
fn test_duplicate_query_panics() {
    let storage = Storage::<u32>::new();
    storage.query::<(Position, Momentum, Position)>();
}

#[test]
fn test_each_arity_8() {
    let storage = Storage::<u32>::new();
    storage.set(
        1,
        (CompN::<1>(1), CompN::<2>(2), CompN::<3>(3), CompN::<4>(4), CompN::<5>(5), CompN::<6>(6), CompN::<7>(7), CompN::<8>(8)),
    );

    let mut sum = 0;
    storage
        .query::<(CompN<1>, CompN<2>, CompN<3>, CompN<4>, CompN<5>, CompN<6>, CompN<7>, CompN<8>)>()
        .each(|_, (a, b, c, d, e, f, g, h)| sum = a.0 + b.0 + c.0 + d.0 + e.0 + f.0 + g.0 + h.0);
    assert_eq!(sum, 36);
}
