//! # Domain Invariants
//!
//! Preconditions checked before a cross-chain call is registered.

use shared_types::TxHash;

use super::entities::CallContext;
use super::errors::CrossChainError;

/// Invariant: atomic calls carry the transaction hash that keys the marker.
pub fn invariant_atomic_tx_present(ctx: &CallContext) -> Result<TxHash, CrossChainError> {
    ctx.tx_hash.ok_or(CrossChainError::MissingAtomicTx)
}

/// Invariant: non-deterministic queries never run inside a transaction.
pub fn invariant_outside_transaction(ctx: &CallContext) -> Result<(), CrossChainError> {
    if ctx.is_transaction() {
        return Err(CrossChainError::NonDeterministicInTransaction);
    }
    Ok(())
}

/// Invariant: nesting stays below the configured depth.
pub fn invariant_call_depth(ctx: &CallContext, max: usize) -> Result<(), CrossChainError> {
    let depth = ctx.depth() + 1;
    if depth > max {
        return Err(CrossChainError::CallDepthExceeded { depth, max });
    }
    Ok(())
}

/// Invariant: a reply counts only if committed by the deadline height.
pub fn invariant_reply_within_deadline(reply_height: u64, deadline: u64) -> bool {
    reply_height <= deadline
}
