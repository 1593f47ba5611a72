//! # Domain Errors
//!
//! Error types for cross-chain coordination.

use mc_02_address_translator::TranslationError;
use mc_03_subchain_registry::RegistryError;
use mc_04_contract_handler::CoreContractCallError;
use shared_types::{ChainId, TxHash};
use thiserror::Error;

use super::value_objects::CallId;

/// Cross-chain error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrossChainError {
    /// Target or dependency chain is not registered or not hosted.
    #[error("Chain unreachable: {0}")]
    ChainUnreachable(ChainId),

    /// The call would re-enter a chain already on the call path.
    #[error("Dependency cycle: {}", format_path(.path))]
    DependencyCycle {
        /// Chains forming the cycle, in traversal order.
        path: Vec<ChainId>,
    },

    /// Block budget exhausted.
    #[error("Cross-chain call to {chain_id} timed out after {budget_blocks} blocks")]
    TimedOut {
        /// Target chain.
        chain_id: ChainId,
        /// Blocks the call was allowed.
        budget_blocks: u64,
    },

    /// The atomic execution marker is already held.
    #[error("Atomic tx {tx_hash} already executing on {chain_id}")]
    AtomicReentry {
        /// Target chain.
        chain_id: ChainId,
        /// Transaction hash.
        tx_hash: TxHash,
    },

    /// The target contract failed; message is passed through verbatim.
    #[error("{0}")]
    RemoteExecutionError(String),

    /// Malformed request or response envelope.
    #[error("Encoding error: {0}")]
    EncodingError(String),

    /// Registry lookup failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Address translation failed.
    #[error(transparent)]
    Translation(#[from] TranslationError),

    /// Role-addressed call failed.
    #[error(transparent)]
    Handler(#[from] CoreContractCallError),

    /// Atomic call issued outside a transaction.
    #[error("Atomic cross-chain tx requires a transaction hash")]
    MissingAtomicTx,

    /// Non-deterministic query issued inside a transaction.
    #[error("Non-deterministic cross-chain query cannot run inside a transaction")]
    NonDeterministicInTransaction,

    /// The call's cancellation token fired.
    #[error("Cross-chain call {0} cancelled")]
    Cancelled(CallId),

    /// The host was built without the requested function.
    #[error("Host function {0} is not available")]
    HostFunctionUnavailable(String),

    /// Too many nested calls.
    #[error("Cross-chain call depth {depth} exceeds maximum {max}")]
    CallDepthExceeded {
        /// Depth of the rejected call.
        depth: usize,
        /// Configured maximum.
        max: usize,
    },
}

impl CrossChainError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CrossChainError::ChainUnreachable(_) => "chain_unreachable",
            CrossChainError::DependencyCycle { .. } => "dependency_cycle",
            CrossChainError::TimedOut { .. } => "timed_out",
            CrossChainError::AtomicReentry { .. } => "atomic_reentry",
            CrossChainError::RemoteExecutionError(_) => "remote_execution",
            CrossChainError::EncodingError(_) => "encoding",
            CrossChainError::Registry(_) => "registry",
            CrossChainError::Translation(_) => "translation",
            CrossChainError::Handler(_) => "handler",
            CrossChainError::MissingAtomicTx => "missing_atomic_tx",
            CrossChainError::NonDeterministicInTransaction => "non_deterministic_in_transaction",
            CrossChainError::Cancelled(_) => "cancelled",
            CrossChainError::HostFunctionUnavailable(_) => "host_function_unavailable",
            CrossChainError::CallDepthExceeded { .. } => "call_depth_exceeded",
        }
    }
}

fn format_path(path: &[ChainId]) -> String {
    path.iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}
