//! # Adapters Layer
//!
//! In-memory implementations of the registry's outbound ports.

mod in_memory_store;
mod no_in_flight;

pub use in_memory_store::InMemoryRegistryStore;
pub use no_in_flight::NoInFlightCalls;
