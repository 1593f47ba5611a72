//! # Error Types
//!
//! Registry errors. Configuration errors reject a command without touching
//! state; `ChainInFlight` reports a concurrent cross-chain call.

use mc_02_address_translator::TranslationError;
use shared_types::{ChainId, ChainIdError, Level};
use thiserror::Error;

/// Subchain registry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A chain with this id already exists.
    #[error("Duplicate chain id: {0}")]
    DuplicateChainId(ChainId),

    /// Declared parent is not registered.
    #[error("Parent chain not found: {0}")]
    ParentNotFound(ChainId),

    /// Level does not equal parent level + 1 (or 0 for a root).
    #[error("Level mismatch for {chain_id}: expected {expected}, got {actual}")]
    LevelMismatch {
        /// Offending chain.
        chain_id: ChainId,
        /// Level the hierarchy requires.
        expected: Level,
        /// Level submitted.
        actual: Level,
    },

    /// No chain with this id.
    #[error("Chain not found: {0}")]
    ChainNotFound(ChainId),

    /// Chain still has children.
    #[error("Chain {chain_id} has {} children", .children.len())]
    ChainHasChildren {
        /// Chain being removed.
        chain_id: ChainId,
        /// Its children.
        children: Vec<ChainId>,
    },

    /// A cross-chain call currently references the chain.
    #[error("Chain {0} is referenced by an in-flight cross-chain call")]
    ChainInFlight(ChainId),

    /// Malformed chain id.
    #[error("Invalid chain id: {0}")]
    InvalidChainId(#[from] ChainIdError),

    /// Address could not be translated.
    #[error("Address translation failed: {0}")]
    Translation(#[from] TranslationError),

    /// Malformed contract request.
    #[error("Invalid registry request: {0}")]
    InvalidRequest(String),

    /// Snapshot store failure.
    #[error("Registry storage error: {0}")]
    Storage(String),
}

impl RegistryError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RegistryError::DuplicateChainId(_) => "duplicate_chain_id",
            RegistryError::ParentNotFound(_) => "parent_not_found",
            RegistryError::LevelMismatch { .. } => "level_mismatch",
            RegistryError::ChainNotFound(_) => "chain_not_found",
            RegistryError::ChainHasChildren { .. } => "chain_has_children",
            RegistryError::ChainInFlight(_) => "chain_in_flight",
            RegistryError::InvalidChainId(_) => "invalid_chain_id",
            RegistryError::Translation(_) => "translation",
            RegistryError::InvalidRequest(_) => "invalid_request",
            RegistryError::Storage(_) => "storage",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_children_message_counts() {
        let root = ChainId::new("leveln_1000-1").unwrap();
        let err = RegistryError::ChainHasChildren {
            chain_id: root,
            children: vec![ChainId::new("mythos_7000-14").unwrap()],
        };
        assert_eq!(err.to_string(), "Chain leveln_1000-1 has 1 children");
        assert_eq!(err.kind(), "chain_has_children");
    }
}
