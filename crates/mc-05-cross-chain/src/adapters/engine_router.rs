//! # Engine Router
//!
//! Routes calls to the contract engine hosting each chain.

use mc_04_contract_handler::{ContractCall, ContractEngine, EngineError};
use parking_lot::RwLock;
use shared_types::ChainId;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::domain::{CallId, CrossChainError};
use crate::ports::ChainRouter;

/// Per-chain engine table.
#[derive(Default)]
pub struct EngineRouter {
    engines: RwLock<BTreeMap<ChainId, Arc<dyn ContractEngine>>>,
}

impl EngineRouter {
    /// Router with no chains.
    pub fn new() -> Self {
        Self::default()
    }

    /// Host `chain_id` on `engine`, replacing any previous engine.
    pub fn register(&self, chain_id: ChainId, engine: Arc<dyn ContractEngine>) {
        self.engines.write().insert(chain_id, engine);
    }

    /// Builder form of [`Self::register`].
    pub fn with_engine(self, chain_id: ChainId, engine: Arc<dyn ContractEngine>) -> Self {
        self.register(chain_id, engine);
        self
    }

    /// Stop hosting `chain_id`.
    pub fn unregister(&self, chain_id: &ChainId) -> bool {
        self.engines.write().remove(chain_id).is_some()
    }

    fn engine(&self, chain_id: &ChainId) -> Option<Arc<dyn ContractEngine>> {
        self.engines.read().get(chain_id).cloned()
    }
}

impl ChainRouter for EngineRouter {
    fn hosts(&self, chain_id: &ChainId) -> bool {
        self.engines.read().contains_key(chain_id)
    }

    fn dispatch(
        &self,
        call_id: CallId,
        call: &ContractCall,
        is_query: bool,
        token: &CancellationToken,
    ) -> Result<Vec<u8>, CrossChainError> {
        if token.is_cancelled() {
            return Err(CrossChainError::Cancelled(call_id));
        }
        // Engine lock is released before the call so nested calls can route.
        let engine = self
            .engine(&call.chain_id)
            .ok_or_else(|| CrossChainError::ChainUnreachable(call.chain_id.clone()))?;
        debug!(%call_id, chain_id = %call.chain_id, contract = %call.contract, is_query, "Routing cross-chain call");
        let result = if is_query {
            engine.query(call)
        } else {
            engine.execute(call)
        };
        result.map_err(|e| match e {
            EngineError::ChainNotHosted(chain_id) => CrossChainError::ChainUnreachable(chain_id),
            EngineError::Execution(reason) => CrossChainError::RemoteExecutionError(reason),
            other => CrossChainError::RemoteExecutionError(other.to_string()),
        })
    }
}
