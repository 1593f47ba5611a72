//! Bank handler.

use shared_types::Coin;

use crate::domain::{BankResponse, CodecError, ExecutionMessage, HandlerRequest, HandlerResponse, ROLE_BANK};
use crate::ports::ContractHandler;

/// Handler for the `bank` role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BankHandler;

impl ContractHandler for BankHandler {
    fn role(&self) -> &'static str {
        ROLE_BANK
    }

    fn encode(&self, request: &HandlerRequest) -> Result<ExecutionMessage, CodecError> {
        match request {
            HandlerRequest::Bank(req) => ExecutionMessage::json(req),
            other => Err(CodecError(format!("bank handler cannot encode {} request", other.role()))),
        }
    }

    fn decode(&self, method: &str, data: &[u8]) -> Result<HandlerResponse, CodecError> {
        let response = match method {
            "getBalance" => {
                let coin: Coin = serde_json::from_slice(data).map_err(|e| CodecError(e.to_string()))?;
                BankResponse::Balance(coin)
            }
            "send" => BankResponse::Sent,
            other => return Err(CodecError(format!("unknown bank method {other}"))),
        };
        Ok(HandlerResponse::Bank(response))
    }
}
