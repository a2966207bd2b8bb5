//! Components and tracers shared by the unit tests and benchmarks.

#![allow(missing_docs)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Once;
use serde::{Deserialize, Serialize};

use crate::comp::{Comp, InstanceHash};
use crate::tracer::{DropReason, Tracer};

pub fn init() {
    static SET_LOGGER_ONCE: Once = Once::new();
    SET_LOGGER_ONCE.call_once(env_logger::init);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Comp)]
#[dynarch(dynarch_as(crate))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Comp)]
#[dynarch(dynarch_as(crate))]
pub struct Momentum {
    pub hs: i32,
    pub vs: i32,
}

/// Appears in snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Comp)]
#[dynarch(dynarch_as(crate), serialize)]
pub struct Walking {
    pub speed: i32,
}

/// Partitioned into one compound per zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Comp)]
#[dynarch(dynarch_as(crate), hash = Zoned::zone_hash)]
pub struct Zoned {
    pub zone:  u32,
    pub value: i32,
}

impl Zoned {
    fn zone_hash(&self) -> InstanceHash { InstanceHash::from(self.zone) }
}

/// A family of distinct marker components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Comp)]
#[dynarch(dynarch_as(crate))]
pub struct CompN<const N: usize>(pub i32);

/// Event counts recorded by [`Counter`].
#[derive(Debug, Default)]
pub struct Counts {
    pub created:   AtomicUsize,
    pub dropped:   AtomicUsize,
    pub emptied:   AtomicUsize,
    pub compacted: AtomicUsize,
    pub purged:    AtomicUsize,
    pub migrated:  AtomicUsize,
}

/// A tracer that counts events. Clones share the same counts.
#[derive(Debug, Clone, Default)]
pub struct Counter(pub Arc<Counts>);

impl Counter {
    pub fn get(&self, field: impl FnOnce(&Counts) -> &AtomicUsize) -> usize {
        field(&self.0).load(Ordering::SeqCst)
    }
}

impl Tracer for Counter {
    fn create_compound(&self, _compound: usize, _comps: usize) {
        self.0.created.fetch_add(1, Ordering::SeqCst);
    }

    fn drop_compound(&self, _compound: usize, reason: DropReason) {
        self.0.dropped.fetch_add(1, Ordering::SeqCst);
        if reason == DropReason::Emptied {
            self.0.emptied.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn compact(&self, _compound: usize, removed: usize, _remaining: usize) {
        self.0.compacted.fetch_add(1, Ordering::SeqCst);
        self.0.purged.fetch_add(removed, Ordering::SeqCst);
    }

    fn migrate(&self, _from: usize, _to: usize) { self.0.migrated.fetch_add(1, Ordering::SeqCst); }
}
