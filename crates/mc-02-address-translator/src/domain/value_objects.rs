//! # Value Objects
//!
//! Per-chain addressing scheme.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::TranslationError;

/// SLIP-44 coin type used by Cosmos-style chains.
pub const COIN_TYPE_COSMOS: u32 = 118;

/// SLIP-44 coin type used by EVM-style chains.
pub const COIN_TYPE_ETH: u32 = 60;

/// Which family of address a string belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressKind {
    /// Account address (`<base>1...`).
    Acc,
    /// Validator operator address (`<base>valoper1...`).
    Val,
    /// Consensus node address (`<base>valcons1...`).
    Cons,
}

impl FromStr for AddressKind {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "acc" | "" => Ok(AddressKind::Acc),
            "val" => Ok(AddressKind::Val),
            "cons" => Ok(AddressKind::Cons),
            other => Err(TranslationError::InvalidKind(other.to_string())),
        }
    }
}

impl fmt::Display for AddressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AddressKind::Acc => "acc",
            AddressKind::Val => "val",
            AddressKind::Cons => "cons",
        };
        f.write_str(s)
    }
}

/// Bech32 human-readable prefixes of one chain.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bech32Prefixes {
    /// Account address prefix.
    pub acc_addr: String,
    /// Account public key prefix.
    pub acc_pub: String,
    /// Validator operator address prefix.
    pub val_addr: String,
    /// Validator operator public key prefix.
    pub val_pub: String,
    /// Consensus node address prefix.
    pub cons_addr: String,
    /// Consensus node public key prefix.
    pub cons_pub: String,
}

impl Bech32Prefixes {
    /// Standard prefix set derived from an account prefix, e.g. `mythos`
    /// yields `mythos`, `mythospub`, `mythosvaloper`, ...
    pub fn from_base(base: &str) -> Self {
        Self {
            acc_addr: base.to_string(),
            acc_pub: format!("{base}pub"),
            val_addr: format!("{base}valoper"),
            val_pub: format!("{base}valoperpub"),
            cons_addr: format!("{base}valcons"),
            cons_pub: format!("{base}valconspub"),
        }
    }

    /// Address prefix for a kind.
    pub fn address_prefix(&self, kind: AddressKind) -> &str {
        match kind {
            AddressKind::Acc => &self.acc_addr,
            AddressKind::Val => &self.val_addr,
            AddressKind::Cons => &self.cons_addr,
        }
    }
}

/// Everything needed to encode addresses for one chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressingScheme {
    /// Bech32 prefixes.
    pub prefixes: Bech32Prefixes,
    /// SLIP-44 coin type.
    pub coin_type: u32,
}

impl AddressingScheme {
    /// Build a scheme from a base prefix and coin type.
    pub fn new(base: &str, coin_type: u32) -> Self {
        Self {
            prefixes: Bech32Prefixes::from_base(base),
            coin_type,
        }
    }

    /// Whether addresses round-trip between this scheme and `other`.
    pub fn same_class(&self, other: &AddressingScheme) -> bool {
        self.coin_type == other.coin_type
    }
}
