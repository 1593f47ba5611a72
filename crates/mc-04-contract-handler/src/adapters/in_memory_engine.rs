//! # In-Memory Contract Engine
//!
//! Hosts the native contracts of one chain. Queries run on a copy of the
//! contract state; executions commit only when the contract succeeds.
//!
//! Executions against one contract are serialized by that contract's lock;
//! different contracts run in parallel. Native contracts never call back
//! into the engine, so holding the lock across `handle` cannot deadlock.

use parking_lot::{Mutex, RwLock};
use shared_types::ChainId;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use super::system_contracts::NativeContract;
use crate::domain::{ContractCall, EngineError};
use crate::ports::ContractEngine;

/// Contract engine of a single chain.
#[derive(Debug)]
pub struct InMemoryContractEngine {
    chain_id: ChainId,
    contracts: RwLock<BTreeMap<String, Arc<Mutex<NativeContract>>>>,
}

impl InMemoryContractEngine {
    /// Engine with no contracts.
    pub fn new(chain_id: ChainId) -> Self {
        Self {
            chain_id,
            contracts: RwLock::new(BTreeMap::new()),
        }
    }

    /// Builder form of [`Self::deploy`].
    pub fn with_contract(self, address: impl Into<String>, contract: NativeContract) -> Self {
        self.deploy(address, contract);
        self
    }

    /// Install (or replace) a contract.
    pub fn deploy(&self, address: impl Into<String>, contract: NativeContract) {
        self.contracts
            .write()
            .insert(address.into(), Arc::new(Mutex::new(contract)));
    }

    /// Chain this engine hosts.
    pub fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }

    /// Copy of a contract's committed state.
    pub fn contract(&self, address: &str) -> Option<NativeContract> {
        self.slot(address).map(|slot| slot.lock().clone())
    }

    fn slot(&self, address: &str) -> Option<Arc<Mutex<NativeContract>>> {
        self.contracts.read().get(address).cloned()
    }

    fn check_chain(&self, call: &ContractCall) -> Result<(), EngineError> {
        if call.chain_id != self.chain_id {
            return Err(EngineError::ChainNotHosted(call.chain_id.clone()));
        }
        Ok(())
    }
}

impl ContractEngine for InMemoryContractEngine {
    fn query(&self, call: &ContractCall) -> Result<Vec<u8>, EngineError> {
        self.check_chain(call)?;
        let mut scratch = self
            .slot(&call.contract)
            .ok_or_else(|| EngineError::ContractNotFound(call.contract.clone()))?
            .lock()
            .clone();
        debug!(chain_id = %self.chain_id, contract = %call.contract, "contract query");
        scratch.handle(call)
    }

    fn execute(&self, call: &ContractCall) -> Result<Vec<u8>, EngineError> {
        self.check_chain(call)?;
        let slot = self
            .slot(&call.contract)
            .ok_or_else(|| EngineError::ContractNotFound(call.contract.clone()))?;
        let mut committed = slot.lock();
        let mut working = committed.clone();
        debug!(chain_id = %self.chain_id, contract = %call.contract, "contract execute");
        let out = working.handle(call)?;
        *committed = working;
        Ok(out)
    }
}
