//! # Error Types
//!
//! Every failure on the handler path is reported as a
//! [`CoreContractCallError`] naming the stage that failed.

use mc_03_subchain_registry::RegistryError;
use shared_types::ChainId;
use thiserror::Error;

/// A handler could not encode or decode a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct CodecError(pub String);

/// Errors raised by a contract engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// No engine hosts this chain.
    #[error("No engine for chain {0}")]
    ChainNotHosted(ChainId),

    /// No contract at this address.
    #[error("Contract not found: {0}")]
    ContractNotFound(String),

    /// Message could not be parsed by the contract.
    #[error("Invalid contract message: {0}")]
    InvalidMessage(String),

    /// The contract rejected the call.
    #[error("Contract execution failed: {0}")]
    Execution(String),
}

/// Stage of the handler path that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallFailure {
    /// No handler is registered for the role.
    #[error("no handler found")]
    NoHandler,

    /// The role has no contract on the chain.
    #[error("role not registered")]
    RoleNotRegistered,

    /// Role resolution itself failed.
    #[error("role resolution failed: {0}")]
    Registry(RegistryError),

    /// Request encoding failed.
    #[error("encoding failed: {0}")]
    Encoding(CodecError),

    /// The engine rejected the call.
    #[error("call failed: {0}")]
    Engine(EngineError),

    /// Response decoding failed.
    #[error("decoding failed: {0}")]
    Decoding(CodecError),
}

/// Invalid core contract call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid core contract call: {role} on {chain_id}: {failure}")]
pub struct CoreContractCallError {
    /// Chain the call targeted.
    pub chain_id: ChainId,
    /// Role addressed.
    pub role: String,
    /// What went wrong.
    pub failure: CallFailure,
}

impl CoreContractCallError {
    /// Wrap a failure.
    pub fn new(chain_id: &ChainId, role: &str, failure: CallFailure) -> Self {
        Self {
            chain_id: chain_id.clone(),
            role: role.to_string(),
            failure,
        }
    }

    /// Whether the role had no contract bound.
    pub fn is_role_not_registered(&self) -> bool {
        matches!(self.failure, CallFailure::RoleNotRegistered)
    }
}
