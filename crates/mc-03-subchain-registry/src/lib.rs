//! # MC-03 Subchain Registry
//!
//! Hierarchical catalog of chain identities, levels, validator sets and
//! contract roles.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Hierarchical levels let a root chain coordinate many independently
//! governed application chains without one shared validator set. Each
//! level's validator membership evolves on its own.
//!
//! ## Invariants
//!
//! | Invariant | Enforced by |
//! |-----------|-------------|
//! | Chain ids are unique | `invariant_unique_chain_id` |
//! | `level == parent.level + 1`, roots at 0 | `invariant_level_rule` |
//! | No removal while children exist | `remove_subchain` |
//! | No removal while a call is in flight | `InFlightCalls` port |
//!
//! ## Module Structure
//!
//! ```text
//! mc-03-subchain-registry/
//! ├── domain/          # SubChainConfig, entries, events, errors, invariants
//! ├── algorithms/      # numeric id allocation, default configs
//! ├── ports/           # RegistryApi (JSON), InFlightCalls, RegistryStore
//! ├── adapters/        # InMemoryRegistryStore, NoInFlightCalls
//! └── service.rs       # SubchainRegistry
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{InMemoryRegistryStore, NoInFlightCalls};
pub use algorithms::{build_default_config, next_numeric_id};
pub use domain::{
    invariant_hierarchy_consistent, invariant_level_rule, invariant_unique_chain_id,
    invariant_validator_index_consistent, DenomConfig, GenesisChain,
    RegisterDefaultSubChainRequest, RegistryError, RegistryEvent, RegistryGenesis,
    RegistrySnapshot, SubChainConfig, SubChainEntry, Validator, DEFAULT_BASE_DENOM_UNIT,
    DEFAULT_REVISION, LEVEL0_CHAIN_ID, LEVEL0_PREFIX, MYTHOS_CHAIN_ID, MYTHOS_PREFIX,
    START_NUMERIC_ID,
};
pub use ports::{CurrentLevelResponse, InFlightCalls, RegistryApi, RegistryRequest, RegistryStore};
pub use service::SubchainRegistry;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
