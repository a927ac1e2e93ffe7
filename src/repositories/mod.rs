//! Persistence layer: the durable counter slot.

mod counter_store;

pub use counter_store::CounterStore;
