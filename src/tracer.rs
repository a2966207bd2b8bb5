//! Exposes testing, profiling and tracing capabilities.

/// Defines the [`Tracer`] trait and implements the [`Log`] and [`Aggregate`] types.
///
/// All tracer method parameters must be [`Copy`] and [`fmt::Debug`](std::fmt::Debug).
macro_rules! define_tracer {
    (
        $(
            $(#[$meta:meta])*
            fn $name:ident(&self $(, $arg_ident:ident: $arg_ty:ty)* $(,)?);
        )*
    ) => {
        /// A handler that receives structural events of a [`Storage`](crate::Storage).
        ///
        /// Tracer methods are called while the storage lock is held,
        /// so they must not access the storage that calls them.
        pub trait Tracer: Send + Sync {
            $(
                $(#[$meta])*
                #[allow(unused_variables)]
                fn $name(&self, $($arg_ident: $arg_ty),*) {}
            )*
        }

        impl Tracer for Log {
            $(
                fn $name(&self, $($arg_ident: $arg_ty),*) {
                    log::log!(self.0, concat!(stringify!($name), "(", $(
                        stringify!($arg_ident),
                        " = {",
                        stringify!($arg_ident),
                        ":?}, ",
                    )* ")"), $($arg_ident = $arg_ident,)*);
                }
            )*
        }

        impl_tuple_accumulate! {
            @TYPES (T1, T2, T3, T4, T5, T6, T7, T8);
            $(
                @VARS (t1, t2, t3, t4, t5, t6, t7, t8);
                @METHOD {fn $name(&self, $($arg_ident: $arg_ty,)*);}
            )*
        }
    };
}

macro_rules! impl_tuple {
    (
        @TYPES ($($ty:ident),* $(,)?);
        $(
            @VARS ($($vars:ident),* $(,)?);
            @METHOD {fn $name:ident(&self, $($arg_ident:ident: $arg_ty:ty,)*);}
        )*
    ) => {
        impl<$($ty: Tracer),*> Tracer for Aggregate<($($ty,)*)> {
            $(
                fn $name(&self, $($arg_ident: $arg_ty),*) {
                    let args = ($($arg_ident,)*);

                    fn call_with_args(tracer: &impl Tracer, ($($arg_ident,)*): ($($arg_ty,)*)) {
                        tracer.$name($($arg_ident),*);
                    }

                    let Aggregate(($($vars,)*)) = self;
                    $(
                        call_with_args($vars, args);
                    )*
                }
            )*
        }
    };
}

macro_rules! impl_tuple_accumulate {
    (@TYPES (); $(@VARS (); @METHOD {$($body:tt)*})*) => {};
    (
        @TYPES ($first_ty:ident $(, $rest_ty:ident)* $(,)?);
        $(
            @VARS ($first_var:ident $(, $rest_var:ident)* $(,)?);
            @METHOD {$($body:tt)*}
        )*
    ) => {
        impl_tuple! {
            @TYPES ($first_ty $(, $rest_ty)*);
            $(
                @VARS ($first_var $(, $rest_var)*);
                @METHOD {$($body)*}
            )*
        }

        impl_tuple_accumulate! {
            @TYPES ($($rest_ty),*);
            $(
                @VARS ($($rest_var),*);
                @METHOD {$($body)*}
            )*
        }
    };
}

define_tracer! {
    /// A compound is created for a new set of (component type, instance hash) pairs.
    fn create_compound(&self, compound: usize, comps: usize);

    /// A compound is removed from the table.
    ///
    /// If another compound occupied the last position,
    /// it is moved into `compound` after this event.
    fn drop_compound(&self, compound: usize, reason: DropReason);

    /// Tombstoned rows of a compound are purged.
    fn compact(&self, compound: usize, removed: usize, remaining: usize);

    /// An entity is moved between compounds because its key changed.
    fn migrate(&self, from: usize, to: usize);
}

/// The reason for [`Tracer::drop_compound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The last entity migrated out of the compound.
    Emptied,
    /// Every entity in the compound was tombstoned when it was compacted.
    Compacted,
}

/// An empty tracer.
pub struct Noop;

impl Tracer for Noop {}

/// Groups multiple tracers into a tuple and dispatches each call to them in serial.
pub struct Aggregate<T>(
    /// A tuple of child tracers to execute in serial.
    pub T,
);

/// A tracer that logs all events.
pub struct Log(
    /// The log level to log events with.
    pub log::Level,
);

#[cfg(test)]
mod tests {
    use super::{Aggregate, DropReason, Log, Tracer};
    use crate::test_util::{self, Counter};

    #[test]
    fn test_aggregate_dispatches_to_all() {
        test_util::init();

        let (a, b) = (Counter::default(), Counter::default());
        let tracer = Aggregate((a.clone(), Log(log::Level::Trace), b.clone()));
        tracer.create_compound(0, 2);
        tracer.drop_compound(0, DropReason::Emptied);
        tracer.compact(1, 3, 4);

        for counter in [&a, &b] {
            assert_eq!(counter.get(|c| &c.created), 1);
            assert_eq!(counter.get(|c| &c.emptied), 1);
            assert_eq!(counter.get(|c| &c.purged), 3);
        }
    }
}
