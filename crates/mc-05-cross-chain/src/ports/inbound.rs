//! # Inbound Ports
//!
//! Cross-chain API offered to contracts: the deterministic calls that take
//! part in consensus and the validator-local ones staged in the side channel.

use async_trait::async_trait;
use mc_04_contract_handler::{HandlerRequest, HandlerResponse};
use shared_types::{ChainId, TxHash};

use crate::domain::{CallContext, CallId, CrossChainCallRequest, CrossChainError, StagedResult};

/// Deterministic cross-chain calls.
pub trait CrossChainApi: Send + Sync {
    /// Execute `request` on the target chain as part of the caller's
    /// transaction. At most one execution per `(target, tx hash)` runs at a
    /// time.
    fn execute_cross_chain_tx(
        &self,
        ctx: &CallContext,
        request: CrossChainCallRequest,
    ) -> Result<Vec<u8>, CrossChainError>;

    /// Query the target chain against throwaway state.
    fn execute_cross_chain_query(
        &self,
        ctx: &CallContext,
        request: CrossChainCallRequest,
    ) -> Result<Vec<u8>, CrossChainError>;

    /// Whether the atomic marker for `(chain_id, tx_hash)` is held.
    fn is_atomic_tx_in_execution(&self, chain_id: &ChainId, tx_hash: &TxHash) -> bool;

    /// Execute a typed request against a role on the target chain.
    fn execute_role_call(
        &self,
        ctx: &CallContext,
        from: &str,
        to_chain_id: &ChainId,
        request: &HandlerRequest,
    ) -> Result<HandlerResponse, CrossChainError>;

    /// Query a role on the target chain with a typed request.
    fn query_role_call(
        &self,
        ctx: &CallContext,
        from: &str,
        to_chain_id: &ChainId,
        request: &HandlerRequest,
    ) -> Result<HandlerResponse, CrossChainError>;
}

/// Validator-local cross-chain calls. Results never reach consensus state.
#[async_trait]
pub trait NonDeterministicCrossChainApi: Send + Sync {
    /// Query the target outside consensus. Refused inside a transaction.
    async fn execute_cross_chain_query_non_deterministic(
        &self,
        ctx: &CallContext,
        request: CrossChainCallRequest,
    ) -> Result<StagedResult, CrossChainError>;

    /// Execute on the target outside consensus. The outcome is staged under
    /// the returned id.
    async fn execute_cross_chain_tx_non_deterministic(
        &self,
        ctx: &CallContext,
        request: CrossChainCallRequest,
    ) -> CallId;
}
