//! # Domain Entities
//!
//! Registry entries, validators, events and the full registry state.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};
use shared_types::{ChainId, Level};
use std::collections::BTreeMap;

use super::value_objects::{SubChainConfig, START_NUMERIC_ID};

/// A validator of one or more chains.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    /// Operator address, as submitted.
    pub operator_address: String,
    /// Operator address re-encoded for each chain it validates.
    #[serde(default)]
    pub chain_addresses: BTreeMap<ChainId, String>,
    /// Peer address announced for p2p bootstrapping.
    #[serde(default)]
    pub p2p_address: String,
    /// Raw genesis transaction bytes.
    #[serde_as(as = "Base64")]
    #[serde(default)]
    pub gen_tx: Vec<u8>,
}

impl Validator {
    /// Validator with only an operator address.
    pub fn new(operator_address: impl Into<String>) -> Self {
        Self {
            operator_address: operator_address.into(),
            chain_addresses: BTreeMap::new(),
            p2p_address: String::new(),
            gen_tx: Vec::new(),
        }
    }

    /// Set the p2p address.
    pub fn with_p2p_address(mut self, p2p_address: impl Into<String>) -> Self {
        self.p2p_address = p2p_address.into();
        self
    }

    /// Set the genesis transaction.
    pub fn with_gen_tx(mut self, gen_tx: Vec<u8>) -> Self {
        self.gen_tx = gen_tx;
        self
    }
}

/// One chain in the registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubChainEntry {
    /// Chain configuration.
    pub config: SubChainConfig,
    /// Validators in registration order.
    #[serde(default)]
    pub validators: Vec<Validator>,
    /// Role name → contract address on this chain.
    #[serde(default)]
    pub roles: IndexMap<String, String>,
}

impl SubChainEntry {
    /// Entry with no validators and no roles.
    pub fn new(config: SubChainConfig) -> Self {
        Self {
            config,
            validators: Vec::new(),
            roles: IndexMap::new(),
        }
    }

    /// Chain id of this entry.
    pub fn chain_id(&self) -> &ChainId {
        &self.config.chain_id
    }

    /// Whether `operator_address` already validates this chain.
    pub fn has_validator(&self, operator_address: &str) -> bool {
        self.validators
            .iter()
            .any(|v| v.operator_address == operator_address)
    }
}

/// Complete registry state.
///
/// This is what gets persisted per block and restored at startup. Map
/// iteration order is insertion order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// Registered chains.
    pub entries: IndexMap<ChainId, SubChainEntry>,
    /// Operator address → chains it validates.
    pub validator_chains: IndexMap<String, Vec<ChainId>>,
    /// Last numeric id handed out by default registration.
    pub last_numeric_id: u64,
    /// Level of the chain hosting this registry.
    pub current_level: Level,
}

impl RegistrySnapshot {
    /// Empty registry hosted on a chain at `current_level`.
    pub fn new(current_level: Level) -> Self {
        Self {
            entries: IndexMap::new(),
            validator_chains: IndexMap::new(),
            last_numeric_id: START_NUMERIC_ID - 1,
            current_level,
        }
    }

    /// Chains whose parent is `chain_id`, in insertion order.
    pub fn children_of(&self, chain_id: &ChainId) -> Vec<ChainId> {
        self.entries
            .values()
            .filter(|e| e.config.parent.as_ref() == Some(chain_id))
            .map(|e| e.chain_id().clone())
            .collect()
    }
}

impl Default for RegistrySnapshot {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Events emitted by registry commands, drained by the host after each call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryEvent {
    /// A chain was registered as a child.
    RegisterSubchain {
        /// New chain.
        chain_id: ChainId,
        /// Its level.
        level: Level,
        /// Its parent.
        parent: Option<ChainId>,
    },
    /// A chain was created directly (genesis or root).
    InitSubchain {
        /// New chain.
        chain_id: ChainId,
        /// Its level.
        level: Level,
    },
    /// A validator joined a chain.
    RegisterSubchainValidator {
        /// Chain joined.
        chain_id: ChainId,
        /// Operator address.
        validator: String,
    },
    /// A role was bound to a contract address.
    RegisterRole {
        /// Chain the role lives on.
        chain_id: ChainId,
        /// Role name.
        role: String,
        /// Contract address.
        address: String,
    },
    /// A chain was removed.
    RemoveSubchain {
        /// Removed chain.
        chain_id: ChainId,
    },
}

/// Genesis description of one chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisChain {
    /// Chain configuration.
    pub config: SubChainConfig,
    /// Validators to register.
    #[serde(default)]
    pub validators: Vec<Validator>,
    /// Roles to bind.
    #[serde(default)]
    pub roles: IndexMap<String, String>,
}

/// Registry genesis.
///
/// Chains are applied in order, so parents must precede their children.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryGenesis {
    /// Level of the chain hosting the registry.
    #[serde(default)]
    pub current_level: Level,
    /// Chains to create.
    #[serde(default)]
    pub chains: Vec<GenesisChain>,
}

/// Input of default subchain registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterDefaultSubChainRequest {
    /// Lowercase base name; also the account prefix.
    pub chain_base_name: String,
    /// Display denomination.
    pub denom_unit: String,
    /// Decimals of the base denomination.
    #[serde(default = "default_base_denom_unit")]
    pub base_denom_unit: u32,
    /// Parent chain.
    pub parent_id: ChainId,
    /// Coin type; EVM-style (60) when absent.
    #[serde(default)]
    pub coin_type: Option<u32>,
}

fn default_base_denom_unit() -> u32 {
    super::value_objects::DEFAULT_BASE_DENOM_UNIT
}
