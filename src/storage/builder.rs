use std::marker::PhantomData;

use parking_lot::RwLock;

use super::{State, Storage};
use crate::entity;
use crate::tracer::{self, Tracer};

/// Configures a new [`Storage`].
pub struct Builder<E: entity::Raw> {
    entity_capacity:   usize,
    compound_capacity: usize,
    tracer:            Box<dyn Tracer>,
    _ph:               PhantomData<fn() -> E>,
}

impl<E: entity::Raw> Builder<E> {
    /// Creates a builder with no preallocation and a [`tracer::Noop`] tracer.
    pub fn new() -> Self {
        Self {
            entity_capacity:   0,
            compound_capacity: 0,
            tracer:            Box::new(tracer::Noop),
            _ph:               PhantomData,
        }
    }

    /// Preallocates the entity index for `capacity` entities.
    pub fn entity_capacity(mut self, capacity: usize) -> Self {
        self.entity_capacity = capacity;
        self
    }

    /// Preallocates the compound table for `capacity` compounds.
    pub fn compound_capacity(mut self, capacity: usize) -> Self {
        self.compound_capacity = capacity;
        self
    }

    /// Sets the tracer that receives structural events of the storage.
    pub fn tracer(mut self, tracer: impl Tracer + 'static) -> Self {
        self.tracer = Box::new(tracer);
        self
    }

    /// Builds the storage.
    pub fn build(self) -> Storage<E> {
        Storage {
            state:  RwLock::new(State::new(self.entity_capacity, self.compound_capacity)),
            tracer: self.tracer,
        }
    }
}

impl<E: entity::Raw> Default for Builder<E> {
    fn default() -> Self { Self::new() }
}
