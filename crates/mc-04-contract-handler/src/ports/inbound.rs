//! # Inbound Ports
//!
//! Capability every role handler provides.

use crate::domain::{CodecError, ExecutionMessage, HandlerRequest, HandlerResponse};

/// Encodes typed requests into the native contract envelope and decodes raw
/// responses back into typed results.
pub trait ContractHandler: Send + Sync {
    /// Role this handler serves.
    fn role(&self) -> &'static str;

    /// Encode a request. Requests for another role are a [`CodecError`].
    fn encode(&self, request: &HandlerRequest) -> Result<ExecutionMessage, CodecError>;

    /// Decode the raw response of `method`.
    fn decode(&self, method: &str, data: &[u8]) -> Result<HandlerResponse, CodecError>;
}
