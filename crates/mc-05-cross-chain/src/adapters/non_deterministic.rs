//! # Non-Deterministic Dispatcher
//!
//! Delivers calls through a chain router outside block execution, with an
//! optional simulated network latency.

use async_trait::async_trait;
use mc_04_contract_handler::ContractCall;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::domain::{CallId, CrossChainError};
use crate::ports::{ChainRouter, NonDeterministicDispatcher};

/// Router-backed dispatcher.
pub struct InMemoryNonDeterministicDispatcher {
    router: Arc<dyn ChainRouter>,
    latency: Duration,
}

impl InMemoryNonDeterministicDispatcher {
    /// Dispatcher with no added latency.
    pub fn new(router: Arc<dyn ChainRouter>) -> Self {
        Self {
            router,
            latency: Duration::ZERO,
        }
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait]
impl NonDeterministicDispatcher for InMemoryNonDeterministicDispatcher {
    async fn dispatch(
        &self,
        call_id: CallId,
        call: ContractCall,
        is_query: bool,
    ) -> Result<Vec<u8>, CrossChainError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.router
            .dispatch(call_id, &call, is_query, &CancellationToken::new())
    }
}
