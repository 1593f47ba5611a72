//! # Core Entities
//!
//! Chain identities, coins and transaction hashes.

use crate::errors::{ChainIdError, TxHashError};
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as, DisplayFromStr};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Depth of a chain in the hierarchy. Zero is the root.
pub type Level = u32;

/// Maximum length of a chain identifier, in bytes.
pub const MAX_CHAIN_ID_LEN: usize = 48;

/// Separator between a chain id and a store key in namespaced keys.
pub const STORE_KEY_SEPARATOR: &str = "_";

// =============================================================================
// CHAIN ID
// =============================================================================

/// Globally unique chain identifier.
///
/// Canonical form is `<name>_<numeric-id>-<revision>` (e.g. `mythos_7000-14`).
/// The form `<name>_<level>_<numeric-id>-<revision>` is also accepted.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChainId(String);

/// Components of a parsed [`ChainId`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedChainId {
    /// The full identifier.
    pub full: String,
    /// Lowercase alphanumeric name.
    pub base_name: String,
    /// Level segment, when present.
    pub level: Option<Level>,
    /// Numeric (EVM-style) chain id.
    pub numeric_id: u64,
    /// Fork revision.
    pub revision: u64,
}

impl ChainId {
    /// Parse and validate a chain identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, ChainIdError> {
        let id = id.into();
        parse_chain_id(&id)?;
        Ok(Self(id))
    }

    /// Build `<base>_<numeric_id>-<revision>`.
    pub fn from_parts(base: &str, numeric_id: u64, revision: u64) -> Result<Self, ChainIdError> {
        Self::new(format!("{base}_{numeric_id}-{revision}"))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decompose into components.
    pub fn parse(&self) -> ParsedChainId {
        // Validated on construction; a failure here is impossible.
        parse_chain_id(&self.0).unwrap_or_else(|_| ParsedChainId {
            full: self.0.clone(),
            base_name: String::new(),
            level: None,
            numeric_id: 0,
            revision: 0,
        })
    }

    /// Lowercase base name (e.g. `mythos`).
    pub fn base_name(&self) -> String {
        self.parse().base_name
    }

    /// Numeric id (e.g. `7000`).
    pub fn numeric_id(&self) -> u64 {
        self.parse().numeric_id
    }

    /// Namespaced storage key: `chainId + "_" + key`.
    pub fn store_key(&self, key: &str) -> String {
        format!("{}{}{}", self.0, STORE_KEY_SEPARATOR, key)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainId({})", self.0)
    }
}

impl FromStr for ChainId {
    type Err = ChainIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ChainId {
    type Error = ChainIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ChainId {
    type Error = ChainIdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ChainId> for String {
    fn from(value: ChainId) -> Self {
        value.0
    }
}

impl AsRef<str> for ChainId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn parse_positive(s: &str) -> Option<u64> {
    if s.is_empty() || s.starts_with('0') || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok().filter(|n| *n > 0)
}

fn parse_level(s: &str) -> Option<Level> {
    if s.is_empty() || (s.len() > 1 && s.starts_with('0')) {
        return None;
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn parse_chain_id(id: &str) -> Result<ParsedChainId, ChainIdError> {
    if id.is_empty() || id.len() > MAX_CHAIN_ID_LEN {
        return Err(ChainIdError::InvalidLength(id.len()));
    }

    let (head, revision) = id
        .rsplit_once('-')
        .ok_or_else(|| ChainIdError::InvalidFormat(id.to_string()))?;
    let revision =
        parse_positive(revision).ok_or_else(|| ChainIdError::InvalidRevision(id.to_string()))?;

    let parts: Vec<&str> = head.split('_').collect();
    let (base, level, numeric) = match parts.as_slice() {
        [base, numeric] => (*base, None, *numeric),
        [base, level, numeric] => {
            let level =
                parse_level(level).ok_or_else(|| ChainIdError::InvalidLevel(id.to_string()))?;
            (*base, Some(level), *numeric)
        }
        _ => return Err(ChainIdError::InvalidFormat(id.to_string())),
    };

    if base.is_empty()
        || !base
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
    {
        return Err(ChainIdError::InvalidBaseName(id.to_string()));
    }
    let numeric_id =
        parse_positive(numeric).ok_or_else(|| ChainIdError::InvalidNumericId(id.to_string()))?;

    Ok(ParsedChainId {
        full: id.to_string(),
        base_name: base.to_string(),
        level,
        numeric_id,
        revision,
    })
}

// =============================================================================
// COIN
// =============================================================================

/// An amount of a single denomination.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    /// Denomination (e.g. `amyt`).
    pub denom: String,
    /// Amount, serialized as a decimal string.
    #[serde_as(as = "DisplayFromStr")]
    pub amount: u128,
}

impl Coin {
    /// Create a coin.
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

// =============================================================================
// TX HASH
// =============================================================================

/// SHA-256 hash of a transaction. Base64 in JSON, hex when displayed.
#[serde_as]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TxHash(#[serde_as(as = "Base64")] [u8; 32]);

impl TxHash {
    /// Wrap raw hash bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Hash raw transaction bytes.
    pub fn from_tx_bytes(tx: &[u8]) -> Self {
        let digest = Sha256::digest(tx);
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        Self(out)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", hex::encode(&self.0[..8]))
    }
}

impl FromStr for TxHash {
    type Err = TxHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| TxHashError::InvalidHex(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| TxHashError::InvalidLength(bytes.len()))?;
        Ok(Self(arr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_chain_id_canonical_form() {
        let id = ChainId::new("mythos_7000-14").unwrap();
        let parsed = id.parse();
        assert_eq!(parsed.base_name, "mythos");
        assert_eq!(parsed.level, None);
        assert_eq!(parsed.numeric_id, 7000);
        assert_eq!(parsed.revision, 14);
    }

    #[test]
    fn test_chain_id_with_level_segment() {
        let parsed = ChainId::new("leveln_0_1000-1").unwrap().parse();
        assert_eq!(parsed.base_name, "leveln");
        assert_eq!(parsed.level, Some(0));
        assert_eq!(parsed.numeric_id, 1000);
    }

    #[test]
    fn test_chain_id_rejects_malformed() {
        assert!(matches!(
            ChainId::new(""),
            Err(ChainIdError::InvalidLength(0))
        ));
        assert!(matches!(
            ChainId::new("mythos"),
            Err(ChainIdError::InvalidFormat(_))
        ));
        assert!(matches!(
            ChainId::new("Mythos_7000-1"),
            Err(ChainIdError::InvalidBaseName(_))
        ));
        assert!(matches!(
            ChainId::new("mythos_07000-1"),
            Err(ChainIdError::InvalidNumericId(_))
        ));
        assert!(matches!(
            ChainId::new("mythos_7000-0"),
            Err(ChainIdError::InvalidRevision(_))
        ));
        assert!(matches!(
            ChainId::new("mythos_x_7000-1"),
            Err(ChainIdError::InvalidLevel(_))
        ));
        assert!(matches!(
            ChainId::new("a_b_c_7000-1"),
            Err(ChainIdError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_chain_id_too_long() {
        let long = format!("{}_7000-1", "a".repeat(45));
        assert!(matches!(
            ChainId::new(long),
            Err(ChainIdError::InvalidLength(_))
        ));
    }

    #[test]
    fn test_store_key_prefix() {
        let id = ChainId::new("mythos_7000-14").unwrap();
        assert_eq!(id.store_key("wasm"), "mythos_7000-14_wasm");
    }

    #[test]
    fn test_chain_id_serde_validates() {
        let id: ChainId = serde_json::from_str("\"mythos_7001-1\"").unwrap();
        assert_eq!(id.as_str(), "mythos_7001-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"mythos_7001-1\"");
        assert!(serde_json::from_str::<ChainId>("\"bad\"").is_err());
    }

    #[test]
    fn test_coin_amount_serialized_as_string() {
        let coin = Coin::new("amyt", 1_000_000_000_000_000_000u128);
        let json = serde_json::to_string(&coin).unwrap();
        assert_eq!(json, r#"{"denom":"amyt","amount":"1000000000000000000"}"#);
        let back: Coin = serde_json::from_str(&json).unwrap();
        assert_eq!(back, coin);
    }

    #[test]
    fn test_tx_hash_hex_roundtrip() {
        let hash = TxHash::from_tx_bytes(b"tx");
        let parsed: TxHash = hash.to_string().parse().unwrap();
        assert_eq!(parsed, hash);
        assert!("abcd".parse::<TxHash>().is_err());
    }

    proptest! {
        #[test]
        fn prop_from_parts_parses_back(
            base in "[a-z][a-z0-9]{0,10}",
            id in 1u64..1_000_000,
            rev in 1u64..1000,
        ) {
            let chain = ChainId::from_parts(&base, id, rev).unwrap();
            let parsed = chain.parse();
            prop_assert_eq!(parsed.base_name, base);
            prop_assert_eq!(parsed.numeric_id, id);
            prop_assert_eq!(parsed.revision, rev);
        }
    }
}
