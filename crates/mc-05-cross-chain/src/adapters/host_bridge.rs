//! # Host Bridge
//!
//! Host functions exposed to guest contracts. Every function takes a packed
//! pointer to a JSON request envelope and returns a packed pointer to the
//! JSON response, written into freshly allocated guest memory.
//!
//! A malformed envelope is answered with an error response; only a
//! boundary fault aborts the calling contract.
//!
//! | Host function | Reply |
//! |---------------|-------|
//! | `execute_cross_chain_tx` | `CrossChainCallResponse` |
//! | `execute_cross_chain_query` | `CrossChainCallResponse` |
//! | `execute_cross_chain_query_non_deterministic` | `CrossChainCallResponse` |
//! | `execute_cross_chain_tx_non_deterministic` | `NonDeterministicTxResponse` |
//! | `is_atomic_tx_in_execution` | `IsAtomicTxInExecutionResponse` |

use mc_01_packed_pointer::{
    read_json, write_json, GuestAllocator, LinearMemory, MemoryError, PackedPtr,
};
use mc_telemetry::record_error;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, warn};

use crate::domain::{
    CallContext, CrossChainCallRequest, CrossChainCallResponse, CrossChainError,
    IsAtomicTxInExecutionRequest, IsAtomicTxInExecutionResponse, NonDeterministicTxResponse,
};
use crate::ports::{CrossChainApi, NonDeterministicCrossChainApi};
use crate::service::CrossChainCoordinator;

const QUERY_NON_DETERMINISTIC: &str = "execute_cross_chain_query_non_deterministic";
const TX_NON_DETERMINISTIC: &str = "execute_cross_chain_tx_non_deterministic";

/// Host-function failures that cannot be answered with a response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// Out-of-bounds guest access. Execution must halt.
    #[error("Fatal host error: {0}")]
    Fatal(MemoryError),

    /// The response could not be written back.
    #[error("Host memory error: {0}")]
    Memory(MemoryError),
}

impl From<MemoryError> for HostError {
    fn from(err: MemoryError) -> Self {
        if err.is_fatal() {
            error!(error = %err, "Guest boundary fault");
            record_error("host_bridge", "boundary_fault");
            HostError::Fatal(err)
        } else {
            HostError::Memory(err)
        }
    }
}

/// Host functions backed by a cross-chain API.
#[derive(Clone)]
pub struct HostBridge {
    api: Arc<dyn CrossChainApi>,
    non_deterministic: Option<Arc<dyn NonDeterministicCrossChainApi>>,
}

impl HostBridge {
    /// Bridge over `api`, without the non-deterministic functions.
    pub fn new(api: Arc<dyn CrossChainApi>) -> Self {
        Self {
            api,
            non_deterministic: None,
        }
    }

    /// Bridge exposing every host function of `coordinator`.
    pub fn for_coordinator(coordinator: Arc<CrossChainCoordinator>) -> Self {
        Self {
            api: coordinator.clone(),
            non_deterministic: Some(coordinator),
        }
    }

    /// Serve the non-deterministic functions from `api`.
    pub fn with_non_deterministic(mut self, api: Arc<dyn NonDeterministicCrossChainApi>) -> Self {
        self.non_deterministic = Some(api);
        self
    }

    /// `execute_cross_chain_tx` host function.
    pub fn execute_cross_chain_tx<M>(
        &self,
        ctx: &CallContext,
        memory: &mut M,
        request_ptr: i64,
    ) -> Result<i64, HostError>
    where
        M: LinearMemory + GuestAllocator,
    {
        self.cross_chain_call(ctx, memory, request_ptr, false)
    }

    /// `execute_cross_chain_query` host function.
    pub fn execute_cross_chain_query<M>(
        &self,
        ctx: &CallContext,
        memory: &mut M,
        request_ptr: i64,
    ) -> Result<i64, HostError>
    where
        M: LinearMemory + GuestAllocator,
    {
        self.cross_chain_call(ctx, memory, request_ptr, true)
    }

    /// `is_atomic_tx_in_execution` host function.
    pub fn is_atomic_tx_in_execution<M>(
        &self,
        memory: &mut M,
        request_ptr: i64,
    ) -> Result<i64, HostError>
    where
        M: LinearMemory + GuestAllocator,
    {
        let response = match read_envelope::<IsAtomicTxInExecutionRequest>(memory, request_ptr)? {
            Ok(req) => IsAtomicTxInExecutionResponse {
                is_in_execution: self
                    .api
                    .is_atomic_tx_in_execution(&req.sub_chain_id, &req.tx_hash),
                error: String::new(),
            },
            Err(e) => IsAtomicTxInExecutionResponse {
                is_in_execution: false,
                error: e.to_string(),
            },
        };
        Ok(write_json(memory, &response)?.into())
    }

    /// `execute_cross_chain_query_non_deterministic` host function.
    ///
    /// Refusal (including a call from inside a transaction) is reported in
    /// the response envelope.
    pub async fn execute_cross_chain_query_non_deterministic<M>(
        &self,
        ctx: &CallContext,
        memory: &mut M,
        request_ptr: i64,
    ) -> Result<i64, HostError>
    where
        M: LinearMemory + GuestAllocator,
    {
        let request = read_envelope::<CrossChainCallRequest>(memory, request_ptr)?;
        let result = match (request, self.non_deterministic_api(QUERY_NON_DETERMINISTIC)) {
            (Ok(req), Ok(api)) => api
                .execute_cross_chain_query_non_deterministic(ctx, with_caller_chain(ctx, req))
                .await
                .map(|staged| staged.response),
            (Err(e), _) | (_, Err(e)) => Err(e),
        };
        let response = result.unwrap_or_else(|e| CrossChainCallResponse::failure(&e));
        Ok(write_json(memory, &response)?.into())
    }

    /// `execute_cross_chain_tx_non_deterministic` host function.
    ///
    /// Never fails the calling contract over the call itself: the reply
    /// holds the side-channel call id, or an error when the request was
    /// unreadable.
    pub async fn execute_cross_chain_tx_non_deterministic<M>(
        &self,
        ctx: &CallContext,
        memory: &mut M,
        request_ptr: i64,
    ) -> Result<i64, HostError>
    where
        M: LinearMemory + GuestAllocator,
    {
        let request = read_envelope::<CrossChainCallRequest>(memory, request_ptr)?;
        let response = match (request, self.non_deterministic_api(TX_NON_DETERMINISTIC)) {
            (Ok(req), Ok(api)) => NonDeterministicTxResponse::staged(
                api.execute_cross_chain_tx_non_deterministic(ctx, with_caller_chain(ctx, req))
                    .await,
            ),
            (Err(e), _) | (_, Err(e)) => NonDeterministicTxResponse::failure(&e),
        };
        Ok(write_json(memory, &response)?.into())
    }

    fn non_deterministic_api(
        &self,
        function: &str,
    ) -> Result<&Arc<dyn NonDeterministicCrossChainApi>, CrossChainError> {
        self.non_deterministic
            .as_ref()
            .ok_or_else(|| CrossChainError::HostFunctionUnavailable(function.to_string()))
    }

    fn cross_chain_call<M>(
        &self,
        ctx: &CallContext,
        memory: &mut M,
        request_ptr: i64,
        is_query: bool,
    ) -> Result<i64, HostError>
    where
        M: LinearMemory + GuestAllocator,
    {
        let result = match read_envelope::<CrossChainCallRequest>(memory, request_ptr)? {
            Ok(req) => {
                let req = with_caller_chain(ctx, req);
                if is_query {
                    self.api.execute_cross_chain_query(ctx, req)
                } else {
                    self.api.execute_cross_chain_tx(ctx, req)
                }
            }
            Err(e) => Err(e),
        };
        let response = CrossChainCallResponse::from_result(result);
        Ok(write_json(memory, &response)?.into())
    }
}

/// Force the source chain to the caller's.
fn with_caller_chain(ctx: &CallContext, mut req: CrossChainCallRequest) -> CrossChainCallRequest {
    if req.from_chain_id != ctx.chain_id {
        warn!(
            claimed = %req.from_chain_id,
            actual = %ctx.chain_id,
            "Request names another source chain, using the caller's"
        );
        req.from_chain_id = ctx.chain_id.clone();
    }
    req
}

/// Decode a request envelope.
///
/// The outer error is a host failure; the inner one is a malformed request
/// to be reported back to the guest.
fn read_envelope<T>(
    memory: &impl LinearMemory,
    request_ptr: i64,
) -> Result<Result<T, CrossChainError>, HostError>
where
    T: serde::de::DeserializeOwned,
{
    match read_json(memory, PackedPtr::from(request_ptr)) {
        Ok(value) => Ok(Ok(value)),
        Err(MemoryError::Envelope(reason)) => {
            warn!(%reason, "Malformed host-function envelope");
            Ok(Err(CrossChainError::EncodingError(reason)))
        }
        Err(e) => Err(e.into()),
    }
}
