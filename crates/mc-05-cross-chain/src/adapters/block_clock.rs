//! # Block Clocks
//!
//! Committed heights per chain.

use parking_lot::RwLock;
use shared_types::ChainId;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::ports::BlockClock;

/// Same height for every chain.
#[derive(Debug, Default)]
pub struct FixedClock {
    height: AtomicU64,
}

impl FixedClock {
    /// Clock stuck at `height`.
    pub fn new(height: u64) -> Self {
        Self {
            height: AtomicU64::new(height),
        }
    }

    /// Move every chain to `height`.
    pub fn set(&self, height: u64) {
        self.height.store(height, Ordering::SeqCst);
    }
}

impl BlockClock for FixedClock {
    fn committed_height(&self, _chain_id: &ChainId) -> u64 {
        self.height.load(Ordering::SeqCst)
    }
}

/// Independent committed height per chain.
#[derive(Debug, Default)]
pub struct ChainHeights {
    heights: RwLock<BTreeMap<ChainId, u64>>,
}

impl ChainHeights {
    /// No chain has committed a block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the committed height of `chain_id`.
    pub fn set(&self, chain_id: &ChainId, height: u64) {
        self.heights.write().insert(chain_id.clone(), height);
    }

    /// Commit `blocks` more blocks on `chain_id`. Returns the new height.
    pub fn advance(&self, chain_id: &ChainId, blocks: u64) -> u64 {
        let mut heights = self.heights.write();
        let height = heights.entry(chain_id.clone()).or_insert(0);
        *height = height.saturating_add(blocks);
        *height
    }
}

impl BlockClock for ChainHeights {
    fn committed_height(&self, chain_id: &ChainId) -> u64 {
        self.heights.read().get(chain_id).copied().unwrap_or(0)
    }
}
