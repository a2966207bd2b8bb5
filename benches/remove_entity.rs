use criterion::*;
use dynarch::test_util;

fn remove_entity(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove entity");

    for log_entities in (4..=16).step_by(4) {
        let entities = 1u32 << log_entities;
        group.throughput(Throughput::Elements(entities.into()));
        group.bench_with_input(BenchmarkId::new("remove all then compact", format!("{entities} entities")), &entities, |b, &entities| {
            b.iter_batched(
                || {
                    let storage = dynarch::new::<u32>();
                    for id in 0..entities {
                        storage.set(id, (test_util::Position { x: 0, y: 0 }, test_util::Walking { speed: 1 }));
                    }
                    storage
                },
                |storage| {
                    for id in 0..entities {
                        storage.remove(id);
                    }
                    storage.compact();
                    storage
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("remove tenth then compact", format!("{entities} entities")), &entities, |b, &entities| {
            b.iter_batched(
                || {
                    let storage = dynarch::new::<u32>();
                    for id in 0..entities {
                        storage.set(id, (test_util::Position { x: 0, y: 0 }, test_util::Walking { speed: 1 }));
                    }
                    storage
                },
                |storage| {
                    for id in (0..entities).step_by(10) {
                        storage.remove(id);
                    }
                    storage.compact();
                    storage
                },
                BatchSize::SmallInput,
            );
        });
    }
}

/// Interleaves a query over a sparse compound with removals and insertions of a dense one.
fn mixed_loop(c: &mut Criterion) {
    #[derive(dynarch::Comp)]
    struct Value(i32);
    #[derive(dynarch::Comp)]
    struct Thing(i32);

    let storage = dynarch::new::<u32>();
    let set = |id: u32| {
        if id % 100 == 0 {
            storage.set(id, (Thing(0),));
        } else {
            storage.set(id, (Value(0),));
        }
    };

    let mut next_id = 0;
    while next_id < 1_000_000 {
        set(next_id);
        next_id += 1;
    }

    let mut next_remove = 0;
    let query = storage.query::<(Thing,)>();
    c.bench_function("mixed query/remove/set loop", |b| {
        b.iter(|| {
            query.each(|_, (thing,)| thing.0 += 1);

            for _ in 0..100 {
                storage.remove(next_remove);
                next_remove += 1;
            }

            for _ in 0..100 {
                set(next_id);
                next_id += 1;
            }
        });
    });
}

criterion_group!(benches, remove_entity, mixed_loop);
criterion_main!(benches);
