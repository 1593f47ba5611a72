//! # Block-Budget Timeouts
//!
//! Deterministic paths never read a wall clock. A timeout in milliseconds
//! becomes a number of blocks; the deadline is a committed height.

/// `ceil(timeout_ms / block_time_ms)`. A zero block time counts as 1 ms.
pub fn block_budget(timeout_ms: u64, block_time_ms: u64) -> u64 {
    let block_time_ms = block_time_ms.max(1);
    timeout_ms / block_time_ms + u64::from(timeout_ms % block_time_ms != 0)
}

/// Height by which a reply must be committed.
pub fn deadline_height(committed_height: u64, budget_blocks: u64) -> u64 {
    committed_height.saturating_add(budget_blocks)
}
