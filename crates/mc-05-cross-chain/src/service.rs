//! # Cross-Chain Coordinator
//!
//! Deterministic calls run inline and synchronously:
//!
//! 1. Depth and dependency-cycle checks (no state touched yet). Cycles are
//!    searched over the call path and the calls of the same transaction.
//! 2. Call-table entry, which also pins the chains against removal.
//! 3. Block budget; a zero budget resolves `TimedOut` without dispatch.
//! 4. Registry resolution of every chain involved.
//! 5. Atomic marker for transactions.
//! 6. Address preparation, dispatch, deadline check.
//!
//! Non-deterministic calls go through the [`NonDeterministicDispatcher`]
//! and only ever land in the [`SideChannel`]. Their call-table entries are
//! invisible to deterministic cycle checks and to subchain removal.

use async_trait::async_trait;
use mc_02_address_translator::{AddressTranslation, AddressTranslator};
use mc_03_subchain_registry::{RegistryError, SubchainRegistry};
use mc_04_contract_handler::{
    CallFailure, ContractCall, ContractHandler, CoreContractCallError, HandlerRequest,
    HandlerResponse, RoleHandler,
};
use mc_telemetry::{log_call_event, log_event, record_call};
use shared_types::{ChainId, TxHash};
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::{
    CallGuard, CallScope, InFlightTable, InMemoryNonDeterministicDispatcher, SideChannel,
};
use crate::algorithms::{block_budget, deadline_height, find_cycle};
use crate::domain::{
    invariant_atomic_tx_present, invariant_call_depth, invariant_outside_transaction,
    invariant_reply_within_deadline, CallContext, CallId, CallKind, CallState,
    CrossChainCallRequest, CrossChainCallResponse, CrossChainConfig, CrossChainError,
    StagedResult,
};
use crate::ports::{
    BlockClock, ChainRouter, CrossChainApi, NonDeterministicCrossChainApi,
    NonDeterministicDispatcher,
};

const SUBSYSTEM: &str = "cross_chain";

/// A registered call ready for dispatch.
struct PreparedCall {
    guard: CallGuard,
    call: ContractCall,
    budget_blocks: u64,
}

/// Cross-chain call coordinator.
pub struct CrossChainCoordinator {
    config: CrossChainConfig,
    registry: Arc<SubchainRegistry>,
    translator: AddressTranslator<Arc<SubchainRegistry>>,
    router: Arc<dyn ChainRouter>,
    clock: Arc<dyn BlockClock>,
    dispatcher: Arc<dyn NonDeterministicDispatcher>,
    in_flight: Arc<InFlightTable>,
    side_channel: Arc<SideChannel>,
}

impl CrossChainCoordinator {
    /// Coordinator over `registry`, routing through `router`.
    ///
    /// The coordinator's call table is installed in the registry so removal
    /// is refused while a call references a chain. Non-deterministic calls
    /// use the same router unless another dispatcher is supplied.
    pub fn new(
        config: CrossChainConfig,
        registry: Arc<SubchainRegistry>,
        router: Arc<dyn ChainRouter>,
        clock: Arc<dyn BlockClock>,
    ) -> Self {
        let in_flight = Arc::new(InFlightTable::new());
        registry.set_in_flight(in_flight.clone());
        let dispatcher = Arc::new(InMemoryNonDeterministicDispatcher::new(router.clone()));
        let side_channel = Arc::new(SideChannel::with_capacity(config.side_channel_capacity));
        Self {
            config,
            translator: AddressTranslator::new(registry.clone()),
            registry,
            router,
            clock,
            dispatcher,
            in_flight,
            side_channel,
        }
    }

    /// Use `dispatcher` for non-deterministic calls.
    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn NonDeterministicDispatcher>) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &CrossChainConfig {
        &self.config
    }

    /// Registry consulted for chains and roles.
    pub fn registry(&self) -> &Arc<SubchainRegistry> {
        &self.registry
    }

    /// Markers and call table.
    pub fn in_flight(&self) -> &Arc<InFlightTable> {
        &self.in_flight
    }

    /// Staged non-deterministic results.
    pub fn side_channel(&self) -> &Arc<SideChannel> {
        &self.side_channel
    }

    // =========================================================================
    // NON-DETERMINISTIC CALLS
    // =========================================================================

    /// Query another chain outside consensus.
    ///
    /// Refused inside a transaction. The outcome is staged in the side
    /// channel under the returned call id and also returned directly.
    pub async fn execute_cross_chain_query_non_deterministic(
        &self,
        ctx: &CallContext,
        mut request: CrossChainCallRequest,
    ) -> Result<StagedResult, CrossChainError> {
        let kind = CallKind::QueryNonDeterministic;
        if let Err(e) = invariant_outside_transaction(ctx) {
            record_call(kind.as_str(), CallState::Rejected.as_str());
            return Err(e);
        }
        request.from_chain_id = ctx.chain_id.clone();
        request.is_query = true;

        let prepared = match self.prepare(ctx, &request, kind, None) {
            Ok(prepared) => prepared,
            Err(e) => {
                record_call(kind.as_str(), outcome_of(&e));
                return Err(e);
            }
        };
        let PreparedCall { guard, call, .. } = prepared;
        let call_id = guard.call_id();
        let wall = self.wall_timeout(&request);

        guard.advance(CallState::Dispatched);
        let result = match tokio::time::timeout(wall, self.dispatcher.dispatch(call_id, call, true)).await {
            Ok(result) => result,
            Err(_) => Err(self.wall_timed_out(&request, wall)),
        };
        let state = settle(&guard, &result);
        record_call(kind.as_str(), state.as_str());
        log_call_event!(
            debug,
            "Non-deterministic query finished",
            call_id.as_u64(),
            request.from_chain_id,
            request.to_chain_id,
            state = state.as_str()
        );

        let response = CrossChainCallResponse::from_result(result);
        self.side_channel.stage(call_id, response.clone());
        Ok(StagedResult { call_id, response })
    }

    /// Execute on another chain outside consensus.
    ///
    /// Never fails the caller: the work runs in a spawned task and every
    /// outcome, including refusal, is staged in the side channel under the
    /// returned call id. Must be called within a Tokio runtime.
    pub async fn execute_cross_chain_tx_non_deterministic(
        &self,
        ctx: &CallContext,
        mut request: CrossChainCallRequest,
    ) -> CallId {
        let kind = CallKind::TxNonDeterministic;
        request.from_chain_id = ctx.chain_id.clone();
        request.is_query = false;

        let PreparedCall { guard, call, .. } = match self.prepare(ctx, &request, kind, ctx.tx_hash) {
            Ok(prepared) => prepared,
            Err(e) => {
                let call_id = self.in_flight.allocate_call_id();
                record_call(kind.as_str(), outcome_of(&e));
                log_call_event!(
                    warn,
                    "Non-deterministic tx refused",
                    call_id.as_u64(),
                    request.from_chain_id,
                    request.to_chain_id,
                    error = %e
                );
                self.side_channel
                    .stage(call_id, CrossChainCallResponse::failure(&e));
                return call_id;
            }
        };

        let call_id = guard.call_id();
        let wall = self.wall_timeout(&request);
        let timed_out = self.wall_timed_out(&request, wall);
        let dispatcher = Arc::clone(&self.dispatcher);
        let side_channel = Arc::clone(&self.side_channel);
        let from_chain = request.from_chain_id.clone();
        let to_chain = request.to_chain_id.clone();

        tokio::spawn(async move {
            guard.advance(CallState::Dispatched);
            let result = tokio::select! {
                _ = guard.token().cancelled() => Err(CrossChainError::Cancelled(call_id)),
                outcome = tokio::time::timeout(wall, dispatcher.dispatch(call_id, call, false)) => {
                    outcome.unwrap_or(Err(timed_out))
                }
            };
            let state = settle(&guard, &result);
            record_call(kind.as_str(), state.as_str());
            log_call_event!(
                debug,
                "Non-deterministic tx finished",
                call_id.as_u64(),
                from_chain,
                to_chain,
                state = state.as_str()
            );
            side_channel.stage(call_id, CrossChainCallResponse::from_result(result));
            drop(guard);
        });

        call_id
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn run_deterministic(
        &self,
        ctx: &CallContext,
        mut request: CrossChainCallRequest,
        kind: CallKind,
    ) -> Result<Vec<u8>, CrossChainError> {
        request.from_chain_id = ctx.chain_id.clone();
        request.is_query = kind.is_query();

        let tx_hash = match kind {
            CallKind::Tx => Some(invariant_atomic_tx_present(ctx)?),
            _ => None,
        };
        let PreparedCall {
            guard,
            call,
            budget_blocks,
        } = self.prepare(ctx, &request, kind, tx_hash)?;
        let call_id = guard.call_id();

        let _marker = match tx_hash {
            Some(hash) => match self.in_flight.acquire_marker(&request.to_chain_id, hash) {
                Ok(marker) => Some(marker),
                Err(e) => {
                    guard.advance(CallState::Rejected);
                    return Err(e);
                }
            },
            None => None,
        };

        let deadline = deadline_height(
            self.clock.committed_height(&request.from_chain_id),
            budget_blocks,
        );
        guard.advance(CallState::Dispatched);
        log_call_event!(
            debug,
            "Dispatching cross-chain call",
            call_id.as_u64(),
            request.from_chain_id,
            request.to_chain_id,
            kind = kind.as_str(),
            deadline
        );

        let result = self
            .router
            .dispatch(call_id, &call, kind.is_query(), guard.token());
        let reply_height = self.clock.committed_height(&request.from_chain_id);

        let result = match result {
            Ok(_) if !invariant_reply_within_deadline(reply_height, deadline) => {
                Err(CrossChainError::TimedOut {
                    chain_id: request.to_chain_id.clone(),
                    budget_blocks,
                })
            }
            other => other,
        };
        settle(&guard, &result);
        result
    }

    /// Checks, call-table registration, registry resolution and address
    /// preparation shared by every call kind.
    fn prepare(
        &self,
        ctx: &CallContext,
        request: &CrossChainCallRequest,
        kind: CallKind,
        tx_hash: Option<TxHash>,
    ) -> Result<PreparedCall, CrossChainError> {
        invariant_call_depth(ctx, self.config.max_call_depth)?;

        let deterministic = matches!(kind, CallKind::Tx | CallKind::Query);
        let scope = if deterministic {
            CallScope::deterministic(ctx.tx_hash)
        } else {
            CallScope::NonDeterministic
        };

        let mut targets = Vec::with_capacity(request.dependencies.len() + 1);
        targets.push(request.to_chain_id.clone());
        targets.extend(request.dependencies.iter().cloned());
        if let Some(path) = find_cycle(
            &request.from_chain_id,
            &targets,
            &ctx.call_path,
            &self.in_flight.dependency_edges(scope),
        ) {
            return Err(CrossChainError::DependencyCycle { path });
        }

        let guard = self.in_flight.register_call(
            &request.from_chain_id,
            &request.to_chain_id,
            &request.dependencies,
            scope,
        );

        let budget_blocks = block_budget(
            request.timeout_ms.unwrap_or(self.config.default_timeout_ms),
            self.config.block_time_ms,
        );
        if deterministic && budget_blocks == 0 {
            guard.advance(CallState::TimedOut);
            return Err(CrossChainError::TimedOut {
                chain_id: request.to_chain_id.clone(),
                budget_blocks,
            });
        }

        match self.build_call(ctx, request, &targets, tx_hash) {
            Ok(call) => Ok(PreparedCall {
                guard,
                call,
                budget_blocks,
            }),
            Err(e) => {
                guard.advance(CallState::Rejected);
                Err(e)
            }
        }
    }

    fn build_call(
        &self,
        ctx: &CallContext,
        request: &CrossChainCallRequest,
        targets: &[ChainId],
        tx_hash: Option<TxHash>,
    ) -> Result<ContractCall, CrossChainError> {
        let from_chain = &request.from_chain_id;
        let to_chain = &request.to_chain_id;

        for chain_id in std::iter::once(from_chain).chain(targets.iter()) {
            if !self.registry.contains(chain_id) {
                return Err(CrossChainError::ChainUnreachable(chain_id.clone()));
            }
        }
        if !self.router.hosts(to_chain) {
            return Err(CrossChainError::ChainUnreachable(to_chain.clone()));
        }

        let sender = self.translator.translate(from_chain, to_chain, &request.from)?;
        let contract = match self.registry.resolve_role(to_chain, &request.to)? {
            Some(address) => address,
            None => {
                let prefix = self
                    .registry
                    .get_subchain_config_by_id(to_chain)?
                    .prefixes
                    .acc_addr;
                self.translator.convert_with_prefix(&request.to, &prefix)?
            }
        };

        let mut call_path = ctx.call_path.clone();
        call_path.push(from_chain.clone());
        Ok(ContractCall {
            chain_id: to_chain.clone(),
            contract,
            sender,
            msg: request.msg.clone(),
            funds: request.funds.clone(),
            dependencies: request.dependencies.clone(),
            call_path,
            tx_hash,
        })
    }

    fn role_call(
        &self,
        ctx: &CallContext,
        from: &str,
        to_chain_id: &ChainId,
        request: &HandlerRequest,
        kind: CallKind,
    ) -> Result<HandlerResponse, CrossChainError> {
        let role = request.role();
        let fail = |failure| {
            CrossChainError::Handler(CoreContractCallError::new(to_chain_id, role, failure))
        };

        let handler = RoleHandler::for_role(role).ok_or_else(|| fail(CallFailure::NoHandler))?;
        match self.registry.resolve_role(to_chain_id, role) {
            Ok(Some(_)) => {}
            Ok(None) => return Err(fail(CallFailure::RoleNotRegistered)),
            Err(RegistryError::ChainNotFound(chain_id)) => {
                return Err(CrossChainError::ChainUnreachable(chain_id))
            }
            Err(e) => return Err(e.into()),
        }
        let msg = handler
            .encode(request)
            .and_then(|m| m.to_bytes())
            .map_err(|e| fail(CallFailure::Encoding(e)))?;

        let cross = CrossChainCallRequest::new(ctx.chain_id.clone(), from, to_chain_id.clone(), role, msg);
        let data = match kind {
            CallKind::Query => self.execute_cross_chain_query(ctx, cross)?,
            _ => self.execute_cross_chain_tx(ctx, cross)?,
        };
        handler
            .decode(request.method(), &data)
            .map_err(|e| fail(CallFailure::Decoding(e)))
    }

    fn observe(
        &self,
        kind: CallKind,
        request: &CrossChainCallRequest,
        result: Result<Vec<u8>, CrossChainError>,
    ) -> Result<Vec<u8>, CrossChainError> {
        let outcome = match &result {
            Ok(_) => CallState::Succeeded.as_str(),
            Err(e) => outcome_of(e),
        };
        record_call(kind.as_str(), outcome);
        if let Err(e) = &result {
            log_event!(
                warn,
                SUBSYSTEM,
                "Cross-chain call failed",
                kind = kind.as_str(),
                from_chain = %request.from_chain_id,
                to_chain = %request.to_chain_id,
                outcome,
                error = %e
            );
        }
        result
    }

    fn wall_timeout(&self, request: &CrossChainCallRequest) -> Duration {
        let ms = request
            .timeout_ms
            .unwrap_or(self.config.default_timeout_ms)
            .min(self.config.non_deterministic_timeout_ms);
        Duration::from_millis(ms)
    }

    fn wall_timed_out(&self, request: &CrossChainCallRequest, wall: Duration) -> CrossChainError {
        CrossChainError::TimedOut {
            chain_id: request.to_chain_id.clone(),
            budget_blocks: block_budget(wall.as_millis() as u64, self.config.block_time_ms),
        }
    }
}

impl CrossChainApi for CrossChainCoordinator {
    fn execute_cross_chain_tx(
        &self,
        ctx: &CallContext,
        request: CrossChainCallRequest,
    ) -> Result<Vec<u8>, CrossChainError> {
        let observed = request.clone();
        let result = self.run_deterministic(ctx, request, CallKind::Tx);
        self.observe(CallKind::Tx, &observed, result)
    }

    fn execute_cross_chain_query(
        &self,
        ctx: &CallContext,
        request: CrossChainCallRequest,
    ) -> Result<Vec<u8>, CrossChainError> {
        let observed = request.clone();
        let result = self.run_deterministic(ctx, request, CallKind::Query);
        self.observe(CallKind::Query, &observed, result)
    }

    fn is_atomic_tx_in_execution(&self, chain_id: &ChainId, tx_hash: &TxHash) -> bool {
        self.in_flight.is_marked(chain_id, tx_hash)
    }

    fn execute_role_call(
        &self,
        ctx: &CallContext,
        from: &str,
        to_chain_id: &ChainId,
        request: &HandlerRequest,
    ) -> Result<HandlerResponse, CrossChainError> {
        self.role_call(ctx, from, to_chain_id, request, CallKind::Tx)
    }

    fn query_role_call(
        &self,
        ctx: &CallContext,
        from: &str,
        to_chain_id: &ChainId,
        request: &HandlerRequest,
    ) -> Result<HandlerResponse, CrossChainError> {
        self.role_call(ctx, from, to_chain_id, request, CallKind::Query)
    }
}

#[async_trait]
impl NonDeterministicCrossChainApi for CrossChainCoordinator {
    async fn execute_cross_chain_query_non_deterministic(
        &self,
        ctx: &CallContext,
        request: CrossChainCallRequest,
    ) -> Result<StagedResult, CrossChainError> {
        CrossChainCoordinator::execute_cross_chain_query_non_deterministic(self, ctx, request).await
    }

    async fn execute_cross_chain_tx_non_deterministic(
        &self,
        ctx: &CallContext,
        request: CrossChainCallRequest,
    ) -> CallId {
        CrossChainCoordinator::execute_cross_chain_tx_non_deterministic(self, ctx, request).await
    }
}

/// Move a dispatched call to its final state.
fn settle(guard: &CallGuard, result: &Result<Vec<u8>, CrossChainError>) -> CallState {
    let state = match result {
        Ok(_) => CallState::Succeeded,
        Err(CrossChainError::TimedOut { .. }) => CallState::TimedOut,
        Err(_) => CallState::Failed,
    };
    guard.advance(state);
    state
}

/// Metrics outcome of a failed call.
fn outcome_of(error: &CrossChainError) -> &'static str {
    match error {
        CrossChainError::TimedOut { .. } => CallState::TimedOut.as_str(),
        CrossChainError::RemoteExecutionError(_) | CrossChainError::Cancelled(_) => {
            CallState::Failed.as_str()
        }
        _ => CallState::Rejected.as_str(),
    }
}
