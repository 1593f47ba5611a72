//! # Outbound Ports
//!
//! The contract execution engine and role resolution.

use mc_03_subchain_registry::RegistryError;
use shared_types::ChainId;
use std::sync::Arc;

use crate::domain::{ContractCall, EngineError};

/// Contract execution entry points of a chain.
pub trait ContractEngine: Send + Sync {
    /// Run against a throwaway snapshot; nothing is committed.
    fn query(&self, call: &ContractCall) -> Result<Vec<u8>, EngineError>;

    /// Run and commit the contract's state changes on success.
    fn execute(&self, call: &ContractCall) -> Result<Vec<u8>, EngineError>;
}

impl<T: ContractEngine + ?Sized> ContractEngine for Arc<T> {
    fn query(&self, call: &ContractCall) -> Result<Vec<u8>, EngineError> {
        (**self).query(call)
    }

    fn execute(&self, call: &ContractCall) -> Result<Vec<u8>, EngineError> {
        (**self).execute(call)
    }
}

/// Resolves a role to a contract address on a chain.
pub trait RoleResolver: Send + Sync {
    /// Contract bound to `role` on `chain_id`, if any.
    fn resolve_role(&self, chain_id: &ChainId, role: &str) -> Result<Option<String>, RegistryError>;
}
