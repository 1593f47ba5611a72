//! # Side Channel
//!
//! Staging area for non-deterministic results. Nothing here is merged into
//! chain state; a caller must `take` a result explicitly.
//!
//! The channel is bounded. Once `capacity` results are unclaimed, staging
//! another evicts the one with the lowest call id (the oldest, since ids
//! only grow).

use mc_telemetry::record_error;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use tokio::sync::Notify;
use tracing::warn;

use crate::domain::{CallId, CrossChainCallResponse, DEFAULT_SIDE_CHANNEL_CAPACITY};

/// Non-deterministic results keyed by call id.
#[derive(Debug)]
pub struct SideChannel {
    results: Mutex<BTreeMap<CallId, CrossChainCallResponse>>,
    staged: Notify,
    capacity: usize,
}

impl Default for SideChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl SideChannel {
    /// Empty channel with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SIDE_CHANNEL_CAPACITY)
    }

    /// Empty channel keeping at most `capacity` unclaimed results (at
    /// least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            results: Mutex::new(BTreeMap::new()),
            staged: Notify::new(),
            capacity: capacity.max(1),
        }
    }

    /// Maximum number of unclaimed results.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stage the outcome of `call_id`, replacing any earlier one.
    pub fn stage(&self, call_id: CallId, response: CrossChainCallResponse) {
        {
            let mut results = self.results.lock();
            results.insert(call_id, response);
            while results.len() > self.capacity {
                if let Some((evicted, _)) = results.pop_first() {
                    warn!(%evicted, capacity = self.capacity, "Unclaimed side-channel result evicted");
                    record_error("side_channel", "evicted");
                }
            }
        }
        self.staged.notify_waiters();
    }

    /// Remove and return the outcome of `call_id`.
    pub fn take(&self, call_id: CallId) -> Option<CrossChainCallResponse> {
        self.results.lock().remove(&call_id)
    }

    /// Wait until `call_id` is staged, then take it.
    ///
    /// Never returns if the result was evicted before this call; bound it
    /// with a timeout when other results may be staged unclaimed.
    pub async fn wait_take(&self, call_id: CallId) -> CrossChainCallResponse {
        loop {
            let staged = self.staged.notified();
            if let Some(response) = self.take(call_id) {
                return response;
            }
            staged.await;
        }
    }

    /// Ids with a staged outcome.
    pub fn pending(&self) -> Vec<CallId> {
        self.results.lock().keys().copied().collect()
    }

    /// Number of staged outcomes.
    pub fn len(&self) -> usize {
        self.results.lock().len()
    }

    /// Whether nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.results.lock().is_empty()
    }
}
