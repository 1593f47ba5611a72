//! # Value Objects
//!
//! Role names, the native contract-call envelope and the engine call shape.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};
use shared_types::{ChainId, Coin, TxHash};

use super::errors::CodecError;

/// Alias registry role.
pub const ROLE_ALIAS: &str = "alias";

/// Bank role.
pub const ROLE_BANK: &str = "bank";

/// Multichain registry role.
pub const ROLE_MULTICHAIN_REGISTRY: &str = "multichain_registry";

/// Native contract-call envelope: `{"data": "<base64>"}`.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionMessage {
    /// Contract-specific payload.
    #[serde_as(as = "Base64")]
    pub data: Vec<u8>,
}

impl ExecutionMessage {
    /// Envelope around a JSON-encoded payload.
    pub fn json<T: Serialize>(payload: &T) -> Result<Self, CodecError> {
        let data = serde_json::to_vec(payload).map_err(|e| CodecError(e.to_string()))?;
        Ok(Self { data })
    }

    /// Decode the payload as JSON.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T, CodecError> {
        serde_json::from_slice(&self.data).map_err(|e| CodecError(e.to_string()))
    }

    /// Envelope as JSON bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(self).map_err(|e| CodecError(e.to_string()))
    }

    /// Parse an envelope from JSON bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| CodecError(e.to_string()))
    }
}

/// One call into a chain's contract engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractCall {
    /// Chain the contract lives on.
    pub chain_id: ChainId,
    /// Contract address.
    pub contract: String,
    /// Caller address, in the target chain's namespace.
    pub sender: String,
    /// Encoded message.
    pub msg: Vec<u8>,
    /// Funds attached.
    pub funds: Vec<Coin>,
    /// Chains whose state the call touches.
    pub dependencies: Vec<ChainId>,
    /// Chains of the enclosing calls, outermost first.
    pub call_path: Vec<ChainId>,
    /// Transaction being executed, absent for queries.
    pub tx_hash: Option<TxHash>,
}

impl ContractCall {
    /// Call with no funds, dependencies or enclosing path.
    pub fn new(chain_id: ChainId, contract: impl Into<String>, sender: impl Into<String>, msg: Vec<u8>) -> Self {
        Self {
            chain_id,
            contract: contract.into(),
            sender: sender.into(),
            msg,
            funds: Vec::new(),
            dependencies: Vec::new(),
            call_path: Vec::new(),
            tx_hash: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_message_wire_shape() {
        let msg = ExecutionMessage { data: b"{}".to_vec() };
        assert_eq!(String::from_utf8(msg.to_bytes().unwrap()).unwrap(), r#"{"data":"e30="}"#);
        let back = ExecutionMessage::from_bytes(br#"{"data":"e30="}"#).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_payload_error() {
        let msg = ExecutionMessage { data: b"nope".to_vec() };
        assert!(msg.payload::<serde_json::Value>().is_err());
    }
}
