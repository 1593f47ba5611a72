//! # Contract Handler Service
//!
//! `ContractHandlerMap` turns a typed role request into a contract call:
//!
//! 1. Select the handler registered for the request's role.
//! 2. Encode the request into an [`ExecutionMessage`] and serialize it.
//! 3. Resolve the role's contract address on the target chain.
//! 4. Query (throwaway state) or execute (committed) through the engine.
//! 5. Decode the raw response with the same handler.
//!
//! Any failure comes back as a [`CoreContractCallError`].

use parking_lot::RwLock;
use shared_types::ChainId;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::{
    CallFailure, ContractCall, CoreContractCallError, ExecutionMessage, HandlerMessage,
    HandlerResponse, ROLE_ALIAS, ROLE_BANK,
};
use crate::handlers::RoleHandler;
use crate::ports::{ContractEngine, ContractHandler, RoleResolver};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Query,
    Execute,
}

/// Role-keyed handler table bound to a role resolver and an engine.
pub struct ContractHandlerMap {
    handlers: RwLock<BTreeMap<String, RoleHandler>>,
    resolver: Arc<dyn RoleResolver>,
    engine: Arc<dyn ContractEngine>,
}

impl ContractHandlerMap {
    /// Map with no handlers registered.
    pub fn new(resolver: Arc<dyn RoleResolver>, engine: Arc<dyn ContractEngine>) -> Self {
        Self {
            handlers: RwLock::new(BTreeMap::new()),
            resolver,
            engine,
        }
    }

    /// Map with the `alias` and `bank` handlers registered.
    pub fn with_defaults(resolver: Arc<dyn RoleResolver>, engine: Arc<dyn ContractEngine>) -> Self {
        let map = Self::new(resolver, engine);
        for role in [ROLE_ALIAS, ROLE_BANK] {
            if let Some(handler) = RoleHandler::for_role(role) {
                map.register(role, handler);
            }
        }
        map
    }

    /// Register `handler` under `role`, replacing any previous one.
    pub fn register(&self, role: &str, handler: RoleHandler) {
        self.handlers.write().insert(role.to_string(), handler);
    }

    /// Roles with a handler.
    pub fn roles(&self) -> Vec<String> {
        self.handlers.read().keys().cloned().collect()
    }

    /// Run the request against throwaway state.
    pub fn query(&self, msg: &HandlerMessage) -> Result<HandlerResponse, CoreContractCallError> {
        self.call(msg, Mode::Query)
    }

    /// Run the request and commit its state changes.
    pub fn execute(&self, msg: &HandlerMessage) -> Result<HandlerResponse, CoreContractCallError> {
        self.call(msg, Mode::Execute)
    }

    fn call(&self, msg: &HandlerMessage, mode: Mode) -> Result<HandlerResponse, CoreContractCallError> {
        let role = msg.request.role();
        let method = msg.request.method();
        let result = self.dispatch(msg, mode);
        match &result {
            Ok(_) => debug!(chain_id = %msg.chain_id, role, method, ?mode, "Core contract call"),
            Err(e) => warn!(chain_id = %msg.chain_id, role, method, ?mode, error = %e, "Core contract call failed"),
        }
        result
    }

    fn dispatch(&self, msg: &HandlerMessage, mode: Mode) -> Result<HandlerResponse, CoreContractCallError> {
        let role = msg.request.role();
        let fail = |failure| CoreContractCallError::new(&msg.chain_id, role, failure);

        let handler = self
            .handlers
            .read()
            .get(role)
            .copied()
            .ok_or_else(|| fail(CallFailure::NoHandler))?;

        let encoded: ExecutionMessage = handler
            .encode(&msg.request)
            .map_err(|e| fail(CallFailure::Encoding(e)))?;
        let bytes = encoded.to_bytes().map_err(|e| fail(CallFailure::Encoding(e)))?;

        let contract = self.resolve(&msg.chain_id, role).map_err(fail)?;

        let call = ContractCall::new(msg.chain_id.clone(), contract, msg.sender.clone(), bytes);
        let raw = match mode {
            Mode::Query => self.engine.query(&call),
            Mode::Execute => self.engine.execute(&call),
        }
        .map_err(|e| fail(CallFailure::Engine(e)))?;

        handler
            .decode(msg.request.method(), &raw)
            .map_err(|e| fail(CallFailure::Decoding(e)))
    }

    fn resolve(&self, chain_id: &ChainId, role: &str) -> Result<String, CallFailure> {
        match self.resolver.resolve_role(chain_id, role) {
            Ok(Some(address)) => Ok(address),
            Ok(None) => Err(CallFailure::RoleNotRegistered),
            Err(e) => Err(CallFailure::Registry(e)),
        }
    }
}
