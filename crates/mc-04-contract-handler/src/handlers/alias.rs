//! Alias registry handler.

use serde::Deserialize;

use crate::domain::{AliasResponse, CodecError, ExecutionMessage, HandlerRequest, HandlerResponse, ROLE_ALIAS};
use crate::ports::ContractHandler;

#[derive(Deserialize)]
struct CosmosAddressReply {
    found: bool,
    #[serde(default)]
    cosm_address: String,
}

/// Handler for the `alias` role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AliasHandler;

impl ContractHandler for AliasHandler {
    fn role(&self) -> &'static str {
        ROLE_ALIAS
    }

    fn encode(&self, request: &HandlerRequest) -> Result<ExecutionMessage, CodecError> {
        match request {
            HandlerRequest::Alias(req) => ExecutionMessage::json(req),
            other => Err(CodecError(format!("alias handler cannot encode {} request", other.role()))),
        }
    }

    fn decode(&self, method: &str, data: &[u8]) -> Result<HandlerResponse, CodecError> {
        let response = match method {
            "register" => AliasResponse::Registered,
            "getCosmosAddress" => {
                let reply: CosmosAddressReply =
                    serde_json::from_slice(data).map_err(|e| CodecError(e.to_string()))?;
                AliasResponse::CosmosAddress {
                    found: reply.found,
                    cosm_address: reply.cosm_address,
                }
            }
            other => return Err(CodecError(format!("unknown alias method {other}"))),
        };
        Ok(HandlerResponse::Alias(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AliasRequest, BankRequest};

    #[test]
    fn test_encode_wraps_payload() {
        let req = HandlerRequest::Alias(AliasRequest::GetCosmosAddress {
            eth_address: "0xab".into(),
            coin_type: 60,
        });
        let msg = AliasHandler.encode(&req).unwrap();
        let inner: AliasRequest = msg.payload().unwrap();
        assert_eq!(HandlerRequest::Alias(inner), req);
    }

    #[test]
    fn test_encode_rejects_other_role() {
        let req = HandlerRequest::Bank(BankRequest::GetBalance {
            address: "a".into(),
            denom: "amyt".into(),
        });
        assert!(AliasHandler.encode(&req).is_err());
    }

    #[test]
    fn test_decode_lookup() {
        let resp = AliasHandler
            .decode("getCosmosAddress", br#"{"found":true,"cosm_address":"mythos1xyz"}"#)
            .unwrap();
        assert_eq!(
            resp,
            HandlerResponse::Alias(AliasResponse::CosmosAddress {
                found: true,
                cosm_address: "mythos1xyz".into()
            })
        );
        assert!(AliasHandler.decode("getCosmosAddress", b"garbage").is_err());
        assert!(AliasHandler.decode("burn", b"{}").is_err());
    }
}
