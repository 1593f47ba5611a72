//! # Registry Invariants
//!
//! Checked on every command and by tests over arbitrary command sequences.

use shared_types::ChainId;

use super::entities::RegistrySnapshot;
use super::errors::RegistryError;
use super::value_objects::SubChainConfig;

/// Level rule for a config against its (optional) parent.
///
/// Roots have level 0 and no parent; everything else sits exactly one level
/// below its parent.
pub fn invariant_level_rule(
    config: &SubChainConfig,
    parent: Option<&SubChainConfig>,
) -> Result<(), RegistryError> {
    let expected = parent.map_or(0, |p| p.level + 1);
    if config.level != expected {
        return Err(RegistryError::LevelMismatch {
            chain_id: config.chain_id.clone(),
            expected,
            actual: config.level,
        });
    }
    Ok(())
}

/// Chain id is not yet taken.
pub fn invariant_unique_chain_id(
    state: &RegistrySnapshot,
    chain_id: &ChainId,
) -> Result<(), RegistryError> {
    if state.entries.contains_key(chain_id) {
        return Err(RegistryError::DuplicateChainId(chain_id.clone()));
    }
    Ok(())
}

/// Every entry in the snapshot satisfies the level rule and every parent
/// exists.
pub fn invariant_hierarchy_consistent(state: &RegistrySnapshot) -> bool {
    state.entries.values().all(|entry| match &entry.config.parent {
        None => entry.config.level == 0,
        Some(parent_id) => state
            .entries
            .get(parent_id)
            .is_some_and(|p| entry.config.level == p.config.level + 1),
    })
}

/// The validator index and the per-chain validator lists agree.
pub fn invariant_validator_index_consistent(state: &RegistrySnapshot) -> bool {
    let forward = state.entries.values().all(|entry| {
        entry.validators.iter().all(|v| {
            state
                .validator_chains
                .get(&v.operator_address)
                .is_some_and(|chains| chains.contains(entry.chain_id()))
        })
    });
    let backward = state.validator_chains.iter().all(|(addr, chains)| {
        !chains.is_empty()
            && chains.iter().all(|c| {
                state
                    .entries
                    .get(c)
                    .is_some_and(|e| e.has_validator(addr))
            })
    });
    forward && backward
}
