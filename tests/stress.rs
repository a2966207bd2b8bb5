use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, dynarch::Comp)]
struct A(u32);

#[derive(Debug, Clone, Copy, PartialEq, dynarch::Comp)]
struct B(u32);

#[derive(Debug, Clone, Copy, PartialEq, dynarch::Comp)]
#[dynarch(hash = C::parity)]
struct C(u32);

impl C {
    fn parity(&self) -> u64 { u64::from(self.0 % 2) }
}

#[derive(Debug, Clone, Copy, PartialEq, dynarch::Comp)]
struct D(u32);

const WORKERS: u32 = 8;
const IDS_PER_WORKER: u32 = 4096;
const ROUNDS: u32 = 4;

/// Runs `set`, `remove` and queries from multiple threads on disjoint ID ranges.
#[test]
fn test_disjoint_workers() {
    let storage = dynarch::new::<u32>();
    let ops = AtomicUsize::new(0);
    let survivors = Mutex::new(BTreeSet::new());

    rayon::scope(|scope| {
        for worker in 0..WORKERS {
            let (storage, ops, survivors) = (&storage, &ops, &survivors);
            scope.spawn(move |_| {
                let base = worker * IDS_PER_WORKER;
                let mut live = BTreeSet::new();
                let mut with_a = BTreeSet::new();

                for round in 0..ROUNDS {
                    for offset in 0..IDS_PER_WORKER {
                        let id = base + offset;
                        let step = round * IDS_PER_WORKER + offset;

                        match step % 5 {
                            0 | 1 => {
                                storage.set(id, (A(id), B(step)));
                                live.insert(id);
                                with_a.insert(id);
                            }
                            2 => {
                                storage.set(id, (C(step), D(id)));
                                live.insert(id);
                            }
                            3 => {
                                assert_eq!(storage.remove(id), live.remove(&id));
                                with_a.remove(&id);
                            }
                            _ if offset % 64 == 0 => {
                                let mut visited = BTreeSet::new();
                                storage.query::<(A,)>().each(|entity, (a,)| {
                                    assert_eq!(entity, a.0);
                                    visited.insert(entity);
                                });
                                assert!(with_a.is_subset(&visited));
                            }
                            _ => {
                                assert_eq!(storage.get::<A>(id).is_some(), with_a.contains(&id));
                            }
                        }
                        ops.fetch_add(1, Ordering::Relaxed);
                    }
                }

                for &id in &live {
                    assert!(storage.contains(id), "{} should be alive", id);
                    assert!(storage.get::<A>(id).is_some() || storage.get::<D>(id).is_some());
                }
                survivors.lock().extend(live);
            });
        }
    });

    assert!(ops.load(Ordering::Relaxed) >= 100_000);

    let survivors = survivors.into_inner();
    storage.check_consistency();
    assert_eq!(storage.len(), survivors.len());

    let mut queried = BTreeSet::new();
    storage.query::<(A,)>().each(|id, _| assert!(queried.insert(id)));
    storage.query::<(D,)>().each(|id, _| {
        queried.insert(id);
    });
    assert_eq!(queried, survivors);
    storage.check_consistency();
}
