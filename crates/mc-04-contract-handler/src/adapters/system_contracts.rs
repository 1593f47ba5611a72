//! Native system contracts hosted by the in-memory engine.
//!
//! Every contract takes an [`ExecutionMessage`] envelope and answers with raw
//! JSON bytes.

use serde::{Deserialize, Serialize};
use serde_json::json;
use shared_types::Coin;
use std::collections::BTreeMap;

use crate::domain::{AliasRequest, BankRequest, ContractCall, EngineError, ExecutionMessage};

/// Generic key/value contract messages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KvRequest {
    /// Store a value; answers with the value stored.
    Set {
        /// Key.
        key: String,
        /// Value.
        value: String,
    },
    /// Read a value; answers with the raw value, empty if unset.
    Get {
        /// Key.
        key: String,
    },
    /// Always fails with `reason`.
    Fail {
        /// Failure reason.
        reason: String,
    },
}

/// A native contract and its state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NativeContract {
    /// EVM-style address to chain-native address aliases.
    Alias(BTreeMap<(String, u32), String>),
    /// Balances keyed by `(address, denom)`.
    Bank(BTreeMap<(String, String), u128>),
    /// Free-form key/value store.
    KvStore(BTreeMap<String, String>),
}

impl NativeContract {
    /// Empty alias registry.
    pub fn alias() -> Self {
        NativeContract::Alias(BTreeMap::new())
    }

    /// Bank with initial balances.
    pub fn bank(balances: impl IntoIterator<Item = (String, Coin)>) -> Self {
        let mut state = BTreeMap::new();
        for (address, coin) in balances {
            *state.entry((address, coin.denom)).or_insert(0u128) += coin.amount;
        }
        NativeContract::Bank(state)
    }

    /// Empty key/value store.
    pub fn kv_store() -> Self {
        NativeContract::KvStore(BTreeMap::new())
    }

    /// Run `call` against this contract's state.
    pub fn handle(&mut self, call: &ContractCall) -> Result<Vec<u8>, EngineError> {
        let envelope =
            ExecutionMessage::from_bytes(&call.msg).map_err(|e| EngineError::InvalidMessage(e.0))?;
        match self {
            NativeContract::Alias(state) => {
                let req: AliasRequest = parse(&envelope)?;
                handle_alias(state, &call.sender, req)
            }
            NativeContract::Bank(state) => {
                let req: BankRequest = parse(&envelope)?;
                handle_bank(state, &call.sender, req)
            }
            NativeContract::KvStore(state) => {
                let req: KvRequest = parse(&envelope)?;
                handle_kv(state, req)
            }
        }
    }
}

fn parse<T: serde::de::DeserializeOwned>(envelope: &ExecutionMessage) -> Result<T, EngineError> {
    envelope.payload().map_err(|e| EngineError::InvalidMessage(e.0))
}

fn to_json(value: serde_json::Value) -> Result<Vec<u8>, EngineError> {
    serde_json::to_vec(&value).map_err(|e| EngineError::Execution(e.to_string()))
}

fn handle_alias(
    state: &mut BTreeMap<(String, u32), String>,
    sender: &str,
    req: AliasRequest,
) -> Result<Vec<u8>, EngineError> {
    match req {
        AliasRequest::Register { eth_address, coin_type } => {
            let key = (eth_address.to_lowercase(), coin_type);
            if let Some(existing) = state.get(&key) {
                if existing != sender {
                    return Err(EngineError::Execution(format!(
                        "alias {} already registered",
                        key.0
                    )));
                }
            }
            state.insert(key, sender.to_string());
            to_json(json!({}))
        }
        AliasRequest::GetCosmosAddress { eth_address, coin_type } => {
            match state.get(&(eth_address.to_lowercase(), coin_type)) {
                Some(addr) => to_json(json!({ "found": true, "cosm_address": addr })),
                None => to_json(json!({ "found": false, "cosm_address": "" })),
            }
        }
    }
}

fn handle_bank(
    state: &mut BTreeMap<(String, String), u128>,
    sender: &str,
    req: BankRequest,
) -> Result<Vec<u8>, EngineError> {
    match req {
        BankRequest::GetBalance { address, denom } => {
            let amount = state.get(&(address, denom.clone())).copied().unwrap_or(0);
            serde_json::to_vec(&Coin::new(denom, amount)).map_err(|e| EngineError::Execution(e.to_string()))
        }
        BankRequest::Send { to, amount } => {
            for coin in &amount {
                let from_key = (sender.to_string(), coin.denom.clone());
                let balance = state.get(&from_key).copied().unwrap_or(0);
                let remaining = balance.checked_sub(coin.amount).ok_or_else(|| {
                    EngineError::Execution(format!(
                        "insufficient funds: {}{} < {}{}",
                        balance, coin.denom, coin.amount, coin.denom
                    ))
                })?;
                state.insert(from_key, remaining);
                let to_balance = state.entry((to.clone(), coin.denom.clone())).or_insert(0);
                *to_balance = to_balance
                    .checked_add(coin.amount)
                    .ok_or_else(|| EngineError::Execution("balance overflow".into()))?;
            }
            to_json(json!({}))
        }
    }
}

fn handle_kv(state: &mut BTreeMap<String, String>, req: KvRequest) -> Result<Vec<u8>, EngineError> {
    match req {
        KvRequest::Set { key, value } => {
            let out = value.clone().into_bytes();
            state.insert(key, value);
            Ok(out)
        }
        KvRequest::Get { key } => Ok(state.get(&key).cloned().unwrap_or_default().into_bytes()),
        KvRequest::Fail { reason } => Err(EngineError::Execution(reason)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::ChainId;

    fn call(sender: &str, payload: &impl Serialize) -> ContractCall {
        let msg = ExecutionMessage::json(payload).unwrap().to_bytes().unwrap();
        ContractCall::new(ChainId::new("mythos_7000-14").unwrap(), "c", sender, msg)
    }

    #[test]
    fn test_bank_send_moves_funds() {
        let mut bank = NativeContract::bank([("alice".to_string(), Coin::new("amyt", 100))]);
        bank.handle(&call(
            "alice",
            &BankRequest::Send {
                to: "bob".into(),
                amount: vec![Coin::new("amyt", 40)],
            },
        ))
        .unwrap();
        let out = bank
            .handle(&call(
                "x",
                &BankRequest::GetBalance {
                    address: "bob".into(),
                    denom: "amyt".into(),
                },
            ))
            .unwrap();
        let coin: Coin = serde_json::from_slice(&out).unwrap();
        assert_eq!(coin.amount, 40);
    }

    #[test]
    fn test_bank_insufficient_funds() {
        let mut bank = NativeContract::bank(Vec::new());
        let err = bank
            .handle(&call(
                "alice",
                &BankRequest::Send {
                    to: "bob".into(),
                    amount: vec![Coin::new("amyt", 1)],
                },
            ))
            .unwrap_err();
        assert!(matches!(err, EngineError::Execution(_)));
    }

    #[test]
    fn test_alias_conflict() {
        let mut alias = NativeContract::alias();
        let reg = AliasRequest::Register {
            eth_address: "0xAB".into(),
            coin_type: 60,
        };
        alias.handle(&call("alice", &reg)).unwrap();
        alias.handle(&call("alice", &reg)).unwrap();
        assert!(alias.handle(&call("bob", &reg)).is_err());
    }

    #[test]
    fn test_kv_and_bad_envelope() {
        let mut kv = NativeContract::kv_store();
        let out = kv
            .handle(&call(
                "a",
                &KvRequest::Set {
                    key: "k".into(),
                    value: "v".into(),
                },
            ))
            .unwrap();
        assert_eq!(out, b"v");
        let mut raw = call("a", &KvRequest::Get { key: "k".into() });
        raw.msg = b"not json".to_vec();
        assert!(matches!(kv.handle(&raw), Err(EngineError::InvalidMessage(_))));
    }
}
