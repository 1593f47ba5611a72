//! # In-Flight Table
//!
//! Atomic execution markers and the call table. Both are released by RAII
//! guards, so every exit path (including unwinding) clears them.
//!
//! Every call-table entry carries a [`CallScope`]. Deterministic entries see
//! only the edges of their own transaction and are the only ones that pin a
//! chain against removal. Non-deterministic entries are validator-local and
//! never reach a consensus decision.

use mc_03_subchain_registry::InFlightCalls;
use mc_telemetry::ACTIVE_ATOMIC_MARKERS;
use parking_lot::Mutex;
use shared_types::{ChainId, TxHash};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::algorithms::DependencyEdges;
use crate::domain::{CallId, CallState, CrossChainError};

/// Visibility of a call-table entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallScope {
    /// Deterministic call made while executing a transaction.
    Transaction(TxHash),
    /// Deterministic call with no enclosing transaction.
    Query,
    /// Validator-local call outside consensus.
    NonDeterministic,
}

impl CallScope {
    /// Scope of a call made from a context running `tx_hash`.
    pub fn deterministic(tx_hash: Option<TxHash>) -> Self {
        match tx_hash {
            Some(hash) => CallScope::Transaction(hash),
            None => CallScope::Query,
        }
    }

    /// Whether entries in this scope take part in consensus.
    pub fn is_deterministic(&self) -> bool {
        !matches!(self, CallScope::NonDeterministic)
    }
}

#[derive(Debug)]
struct CallEntry {
    from: ChainId,
    to: ChainId,
    dependencies: Vec<ChainId>,
    scope: CallScope,
    token: CancellationToken,
    state: CallState,
}

impl CallEntry {
    fn references(&self, chain_id: &ChainId) -> bool {
        &self.from == chain_id || &self.to == chain_id || self.dependencies.contains(chain_id)
    }
}

/// Read-only view of a call-table entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallSummary {
    /// Call id.
    pub call_id: CallId,
    /// Source chain.
    pub from: ChainId,
    /// Target chain.
    pub to: ChainId,
    /// Visibility.
    pub scope: CallScope,
    /// Current state.
    pub state: CallState,
}

/// Markers and call table shared by every coordinator path.
#[derive(Debug)]
pub struct InFlightTable {
    markers: Mutex<BTreeSet<(ChainId, TxHash)>>,
    calls: Mutex<BTreeMap<CallId, CallEntry>>,
    next_call_id: AtomicU64,
}

impl Default for InFlightTable {
    fn default() -> Self {
        Self::new()
    }
}

impl InFlightTable {
    /// Empty table. Call ids start at 1.
    pub fn new() -> Self {
        Self {
            markers: Mutex::new(BTreeSet::new()),
            calls: Mutex::new(BTreeMap::new()),
            next_call_id: AtomicU64::new(1),
        }
    }

    // =========================================================================
    // ATOMIC EXECUTION MARKERS
    // =========================================================================

    /// Take the marker for `(chain_id, tx_hash)`.
    ///
    /// Fails with `AtomicReentry` if it is already held.
    pub fn acquire_marker(
        self: &Arc<Self>,
        chain_id: &ChainId,
        tx_hash: TxHash,
    ) -> Result<MarkerGuard, CrossChainError> {
        let key = (chain_id.clone(), tx_hash);
        if !self.markers.lock().insert(key.clone()) {
            return Err(CrossChainError::AtomicReentry {
                chain_id: chain_id.clone(),
                tx_hash,
            });
        }
        ACTIVE_ATOMIC_MARKERS.inc();
        debug!(chain_id = %chain_id, tx_hash = %tx_hash, "Atomic marker acquired");
        Ok(MarkerGuard {
            table: Arc::clone(self),
            key: Some(key),
        })
    }

    /// Whether the marker for `(chain_id, tx_hash)` is held.
    pub fn is_marked(&self, chain_id: &ChainId, tx_hash: &TxHash) -> bool {
        self.markers.lock().contains(&(chain_id.clone(), *tx_hash))
    }

    /// Number of markers held.
    pub fn active_markers(&self) -> usize {
        self.markers.lock().len()
    }

    fn release_marker(&self, key: &(ChainId, TxHash)) {
        if self.markers.lock().remove(key) {
            ACTIVE_ATOMIC_MARKERS.dec();
            debug!(chain_id = %key.0, tx_hash = %key.1, "Atomic marker released");
        }
    }

    // =========================================================================
    // CALL TABLE
    // =========================================================================

    /// Reserve a call id without registering a call.
    ///
    /// Used to key side-channel results of calls refused before dispatch.
    pub fn allocate_call_id(&self) -> CallId {
        CallId(self.next_call_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Register a call in `Pending` state with a fresh cancellation token.
    pub fn register_call(
        self: &Arc<Self>,
        from: &ChainId,
        to: &ChainId,
        dependencies: &[ChainId],
        scope: CallScope,
    ) -> CallGuard {
        let call_id = self.allocate_call_id();
        let token = CancellationToken::new();
        self.calls.lock().insert(
            call_id,
            CallEntry {
                from: from.clone(),
                to: to.clone(),
                dependencies: dependencies.to_vec(),
                scope,
                token: token.clone(),
                state: CallState::Pending,
            },
        );
        CallGuard {
            table: Arc::clone(self),
            call_id,
            token,
        }
    }

    /// State of a registered call.
    pub fn call_state(&self, call_id: CallId) -> Option<CallState> {
        self.calls.lock().get(&call_id).map(|e| e.state)
    }

    /// Snapshot of every registered call, by id.
    pub fn active_calls(&self) -> Vec<CallSummary> {
        self.calls
            .lock()
            .iter()
            .map(|(id, e)| CallSummary {
                call_id: *id,
                from: e.from.clone(),
                to: e.to.clone(),
                scope: e.scope,
                state: e.state,
            })
            .collect()
    }

    /// `from -> {to, dependencies}` for the registered calls visible from
    /// `scope`.
    ///
    /// A transaction sees only its own calls, a query sees none (its call
    /// path already holds every enclosing call), and non-deterministic calls
    /// see only each other.
    pub fn dependency_edges(&self, scope: CallScope) -> DependencyEdges {
        let mut edges = DependencyEdges::new();
        if scope == CallScope::Query {
            return edges;
        }
        for entry in self.calls.lock().values().filter(|e| e.scope == scope) {
            let out = edges.entry(entry.from.clone()).or_default();
            out.insert(entry.to.clone());
            out.extend(entry.dependencies.iter().cloned());
        }
        edges
    }

    /// Cancel a call's token. Returns false if the call is unknown.
    pub fn cancel(&self, call_id: CallId) -> bool {
        match self.calls.lock().get(&call_id) {
            Some(entry) => {
                entry.token.cancel();
                true
            }
            None => false,
        }
    }

    fn transition(&self, call_id: CallId, next: CallState) -> bool {
        let mut calls = self.calls.lock();
        let Some(entry) = calls.get_mut(&call_id) else {
            return false;
        };
        if !entry.state.can_transition_to(next) {
            warn!(%call_id, from = ?entry.state, to = ?next, "Invalid call state transition");
            return false;
        }
        entry.state = next;
        if matches!(next, CallState::Failed | CallState::TimedOut) {
            entry.token.cancel();
        }
        true
    }

    fn release_call(&self, call_id: CallId) {
        if let Some(entry) = self.calls.lock().remove(&call_id) {
            if !entry.state.is_terminal() {
                entry.token.cancel();
            }
        }
    }
}

impl InFlightCalls for InFlightTable {
    fn is_chain_in_flight(&self, chain_id: &ChainId) -> bool {
        if self.markers.lock().iter().any(|(c, _)| c == chain_id) {
            return true;
        }
        self.calls
            .lock()
            .values()
            .any(|e| e.scope.is_deterministic() && e.references(chain_id))
    }
}

/// Holds an atomic execution marker; releases it on drop.
#[derive(Debug)]
pub struct MarkerGuard {
    table: Arc<InFlightTable>,
    key: Option<(ChainId, TxHash)>,
}

impl Drop for MarkerGuard {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.table.release_marker(&key);
        }
    }
}

/// Holds a call-table entry; removes it on drop.
#[derive(Debug)]
pub struct CallGuard {
    table: Arc<InFlightTable>,
    call_id: CallId,
    token: CancellationToken,
}

impl CallGuard {
    /// Id of the guarded call.
    pub fn call_id(&self) -> CallId {
        self.call_id
    }

    /// The call's cancellation token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Current state.
    pub fn state(&self) -> CallState {
        self.table
            .call_state(self.call_id)
            .unwrap_or(CallState::Rejected)
    }

    /// Move to `next`. Failed and timed-out calls cancel their token.
    pub fn advance(&self, next: CallState) -> bool {
        self.table.transition(self.call_id, next)
    }
}

impl Drop for CallGuard {
    fn drop(&mut self) {
        self.table.release_call(self.call_id);
    }
}
