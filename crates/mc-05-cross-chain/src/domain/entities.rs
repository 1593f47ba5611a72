//! # Domain Entities
//!
//! Wire envelopes exchanged with contracts and the context a call runs in.

use mc_04_contract_handler::ContractCall;
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};
use shared_types::{ChainId, Coin, TxHash};

use super::errors::CrossChainError;
use super::value_objects::{CallId, ExecutionMode};

/// Cross-chain call request as sent by a contract.
///
/// Byte fields are base64 in JSON. A missing `timeout_ms` takes the
/// coordinator's configured default.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossChainCallRequest {
    /// Caller address in the source chain's namespace.
    pub from: String,
    /// Target contract address, or a role name registered on the target.
    pub to: String,
    /// Message for the target contract.
    #[serde_as(as = "Base64")]
    pub msg: Vec<u8>,
    /// Funds attached.
    #[serde(default)]
    pub funds: Vec<Coin>,
    /// Chains whose state the call touches besides the target.
    #[serde(default)]
    pub dependencies: Vec<ChainId>,
    /// Source chain.
    pub from_chain_id: ChainId,
    /// Target chain.
    pub to_chain_id: ChainId,
    /// Run against throwaway state.
    #[serde(default)]
    pub is_query: bool,
    /// Timeout in milliseconds, converted into a block budget.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl CrossChainCallRequest {
    /// Request with no funds, dependencies or explicit timeout.
    pub fn new(
        from_chain_id: ChainId,
        from: impl Into<String>,
        to_chain_id: ChainId,
        to: impl Into<String>,
        msg: Vec<u8>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            msg,
            funds: Vec::new(),
            dependencies: Vec::new(),
            from_chain_id,
            to_chain_id,
            is_query: false,
            timeout_ms: None,
        }
    }

    /// Declare dependencies.
    pub fn with_dependencies(mut self, dependencies: Vec<ChainId>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Attach funds.
    pub fn with_funds(mut self, funds: Vec<Coin>) -> Self {
        self.funds = funds;
        self
    }

    /// Set an explicit timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}

/// Response envelope returned to contracts. An empty `error` means success.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossChainCallResponse {
    /// Error message, empty on success.
    #[serde(default)]
    pub error: String,
    /// Target's response bytes.
    #[serde_as(as = "Base64")]
    #[serde(default)]
    pub data: Vec<u8>,
}

impl CrossChainCallResponse {
    /// Successful response.
    pub fn success(data: Vec<u8>) -> Self {
        Self {
            error: String::new(),
            data,
        }
    }

    /// Failed response.
    pub fn failure(error: &CrossChainError) -> Self {
        Self {
            error: error.to_string(),
            data: Vec::new(),
        }
    }

    /// Map a coordinator result into the envelope.
    pub fn from_result(result: Result<Vec<u8>, CrossChainError>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(e) => Self::failure(&e),
        }
    }

    /// Whether the call succeeded.
    pub fn is_ok(&self) -> bool {
        self.error.is_empty()
    }
}

/// Host reply to a non-deterministic transaction.
///
/// Carries the side-channel key of the staged outcome, or an error when the
/// request could not be read.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonDeterministicTxResponse {
    /// Key of the staged result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<CallId>,
    /// Error message, empty on success.
    #[serde(default)]
    pub error: String,
}

impl NonDeterministicTxResponse {
    /// Work was accepted under `call_id`.
    pub fn staged(call_id: CallId) -> Self {
        Self {
            call_id: Some(call_id),
            error: String::new(),
        }
    }

    /// The request was refused before a call id was assigned.
    pub fn failure(error: &CrossChainError) -> Self {
        Self {
            call_id: None,
            error: error.to_string(),
        }
    }
}

/// Host-function request asking whether an atomic tx is executing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsAtomicTxInExecutionRequest {
    /// Chain to check.
    pub sub_chain_id: ChainId,
    /// Transaction hash.
    pub tx_hash: TxHash,
}

/// Answer to [`IsAtomicTxInExecutionRequest`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsAtomicTxInExecutionResponse {
    /// Whether the marker is held.
    pub is_in_execution: bool,
    /// Decode error, if the request was malformed.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}

/// Context of the contract issuing a cross-chain call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallContext {
    /// Chain the caller runs on.
    pub chain_id: ChainId,
    /// Calling contract.
    pub contract: String,
    /// Transaction or query.
    pub mode: ExecutionMode,
    /// Transaction being executed, required for atomic calls.
    pub tx_hash: Option<TxHash>,
    /// Originating chains of every enclosing call, outermost first.
    pub call_path: Vec<ChainId>,
}

impl CallContext {
    /// Top-level transaction context.
    pub fn transaction(chain_id: ChainId, contract: impl Into<String>, tx_hash: TxHash) -> Self {
        Self {
            chain_id,
            contract: contract.into(),
            mode: ExecutionMode::Transaction,
            tx_hash: Some(tx_hash),
            call_path: Vec::new(),
        }
    }

    /// Top-level query context.
    pub fn query(chain_id: ChainId, contract: impl Into<String>) -> Self {
        Self {
            chain_id,
            contract: contract.into(),
            mode: ExecutionMode::Query,
            tx_hash: None,
            call_path: Vec::new(),
        }
    }

    /// Context of a contract running because of `call`.
    ///
    /// Calls carrying a transaction hash run in transaction mode.
    pub fn nested(call: &ContractCall) -> Self {
        Self {
            chain_id: call.chain_id.clone(),
            contract: call.contract.clone(),
            mode: if call.tx_hash.is_some() {
                ExecutionMode::Transaction
            } else {
                ExecutionMode::Query
            },
            tx_hash: call.tx_hash,
            call_path: call.call_path.clone(),
        }
    }

    /// Nesting depth (0 for a top-level call).
    pub fn depth(&self) -> usize {
        self.call_path.len()
    }

    /// Whether the caller runs inside a transaction.
    pub fn is_transaction(&self) -> bool {
        self.mode == ExecutionMode::Transaction
    }
}

/// Non-deterministic result staged in the side channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StagedResult {
    /// Key in the side channel.
    pub call_id: CallId,
    /// Outcome.
    pub response: CrossChainCallResponse,
}
