//! # Outbound Ports
//!
//! Routing to target chains, committed block heights, and the
//! non-deterministic dispatch path.

use async_trait::async_trait;
use mc_04_contract_handler::ContractCall;
use shared_types::ChainId;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::domain::{CallId, CrossChainError};

/// Delivers a call to the target chain's contract engine.
pub trait ChainRouter: Send + Sync {
    /// Whether a target chain is reachable.
    fn hosts(&self, chain_id: &ChainId) -> bool;

    /// Deliver `call`. Queries run against throwaway state.
    ///
    /// Implementations must not start work once `token` is cancelled.
    fn dispatch(
        &self,
        call_id: CallId,
        call: &ContractCall,
        is_query: bool,
        token: &CancellationToken,
    ) -> Result<Vec<u8>, CrossChainError>;
}

impl<T: ChainRouter + ?Sized> ChainRouter for Arc<T> {
    fn hosts(&self, chain_id: &ChainId) -> bool {
        (**self).hosts(chain_id)
    }

    fn dispatch(
        &self,
        call_id: CallId,
        call: &ContractCall,
        is_query: bool,
        token: &CancellationToken,
    ) -> Result<Vec<u8>, CrossChainError> {
        (**self).dispatch(call_id, call, is_query, token)
    }
}

/// Source of committed block heights. Consensus data, never a wall clock.
pub trait BlockClock: Send + Sync {
    /// Last committed height of `chain_id` (0 if unknown).
    fn committed_height(&self, chain_id: &ChainId) -> u64;
}

/// Dispatch path for calls that may leave determinism.
#[async_trait]
pub trait NonDeterministicDispatcher: Send + Sync {
    /// Deliver `call` outside block execution.
    async fn dispatch(
        &self,
        call_id: CallId,
        call: ContractCall,
        is_query: bool,
    ) -> Result<Vec<u8>, CrossChainError>;
}
