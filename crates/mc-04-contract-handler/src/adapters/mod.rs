//! # Adapters Layer
//!
//! In-memory contract engine and the registry-backed role resolver.

mod in_memory_engine;
mod registry_resolver;
mod system_contracts;

pub use in_memory_engine::InMemoryContractEngine;
pub use system_contracts::{KvRequest, NativeContract};
