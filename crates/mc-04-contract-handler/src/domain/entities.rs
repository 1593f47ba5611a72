//! # Domain Entities
//!
//! Typed requests and responses of every role handler. No dynamically typed
//! payloads: each role has its own request and response enum.

use serde::{Deserialize, Serialize};
use shared_types::{ChainId, Coin};

use super::value_objects::{ROLE_ALIAS, ROLE_BANK};

/// Alias registry requests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AliasRequest {
    /// Link the sender to an EVM-style address.
    Register {
        /// EVM-style address (hex).
        eth_address: String,
        /// Coin type of the alias.
        coin_type: u32,
    },
    /// Look up the chain-native address behind an EVM-style address.
    GetCosmosAddress {
        /// EVM-style address (hex).
        eth_address: String,
        /// Coin type of the alias.
        coin_type: u32,
    },
}

/// Alias registry responses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AliasResponse {
    /// Registration accepted.
    Registered,
    /// Lookup result.
    CosmosAddress {
        /// Whether an alias exists.
        found: bool,
        /// Chain-native address, empty when not found.
        cosm_address: String,
    },
}

/// Bank requests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BankRequest {
    /// Balance of one denomination.
    GetBalance {
        /// Account.
        address: String,
        /// Denomination.
        denom: String,
    },
    /// Transfer from the sender.
    Send {
        /// Recipient.
        to: String,
        /// Coins.
        amount: Vec<Coin>,
    },
}

/// Bank responses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BankResponse {
    /// Balance.
    Balance(Coin),
    /// Transfer applied.
    Sent,
}

/// Request to any role handler.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandlerRequest {
    /// Alias role.
    Alias(AliasRequest),
    /// Bank role.
    Bank(BankRequest),
}

impl HandlerRequest {
    /// Role this request addresses.
    pub fn role(&self) -> &'static str {
        match self {
            HandlerRequest::Alias(_) => ROLE_ALIAS,
            HandlerRequest::Bank(_) => ROLE_BANK,
        }
    }

    /// Method name, passed back to the handler's decoder.
    pub fn method(&self) -> &'static str {
        match self {
            HandlerRequest::Alias(AliasRequest::Register { .. }) => "register",
            HandlerRequest::Alias(AliasRequest::GetCosmosAddress { .. }) => "getCosmosAddress",
            HandlerRequest::Bank(BankRequest::GetBalance { .. }) => "getBalance",
            HandlerRequest::Bank(BankRequest::Send { .. }) => "send",
        }
    }
}

/// Response of any role handler.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandlerResponse {
    /// Alias role.
    Alias(AliasResponse),
    /// Bank role.
    Bank(BankResponse),
}

/// A role-addressed call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandlerMessage {
    /// Chain whose role binding is used.
    pub chain_id: ChainId,
    /// Caller address.
    pub sender: String,
    /// Typed request.
    pub request: HandlerRequest,
}

impl HandlerMessage {
    /// Build a message.
    pub fn new(chain_id: ChainId, sender: impl Into<String>, request: HandlerRequest) -> Self {
        Self {
            chain_id,
            sender: sender.into(),
            request,
        }
    }
}
