//! Domain layer: aggregates, value objects and events. No I/O.
pub mod aggregates;
pub mod events;
pub mod value_objects;
