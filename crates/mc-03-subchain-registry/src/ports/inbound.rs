//! # Inbound Ports
//!
//! Contract-facing command/query surface.
//!
//! Requests are JSON objects with a single key naming the operation, e.g.
//! `{"GetSubChainIdsByLevel":{"level":1}}`.

use mc_02_address_translator::AddressKind;
use serde::{Deserialize, Serialize};
use shared_types::{ChainId, Level};

use crate::domain::{RegisterDefaultSubChainRequest, RegistryError, SubChainConfig, Validator};

/// Every operation a contract may send to the registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryRequest {
    /// Create a chain entry directly.
    InitSubChain {
        /// Configuration.
        config: SubChainConfig,
    },
    /// Create a child entry.
    RegisterSubChain {
        /// Configuration.
        config: SubChainConfig,
        /// Parent chain.
        parent_id: ChainId,
    },
    /// Allocate an id and register a child with default configuration.
    RegisterDefaultSubChain(RegisterDefaultSubChainRequest),
    /// Add a validator to a chain.
    RegisterSubChainValidator {
        /// Chain.
        chain_id: ChainId,
        /// Validator.
        validator: Validator,
    },
    /// Bind a role to a contract address on a chain.
    RegisterRole {
        /// Chain.
        chain_id: ChainId,
        /// Role name.
        role: String,
        /// Contract address.
        address: String,
    },
    /// Remove a chain.
    RemoveSubChain {
        /// Chain.
        chain_id: ChainId,
    },
    /// Full entry of one chain.
    GetSubChainById {
        /// Chain.
        chain_id: ChainId,
    },
    /// Config of one chain.
    GetSubChainConfigById {
        /// Chain.
        chain_id: ChainId,
    },
    /// Configs of several chains; unknown ids are skipped.
    GetSubChainConfigByIds {
        /// Chains.
        ids: Vec<ChainId>,
    },
    /// Entries of several chains; unknown ids are skipped.
    GetSubChainsByIds {
        /// Chains.
        ids: Vec<ChainId>,
    },
    /// All entries.
    GetSubChains {},
    /// All chain ids.
    GetSubChainIds {},
    /// Chain ids at one level.
    GetSubChainIdsByLevel {
        /// Level.
        level: Level,
    },
    /// Chains validated by an operator.
    GetSubChainIdsByValidator {
        /// Operator address.
        validator_address: String,
    },
    /// Validators of a chain.
    GetValidatorsByChainId {
        /// Chain.
        chain_id: ChainId,
    },
    /// Validator operator addresses of a chain.
    GetValidatorAddressesByChainId {
        /// Chain.
        chain_id: ChainId,
    },
    /// Re-encode an address for a chain, or under an explicit prefix.
    ConvertAddressByChainId {
        /// Target chain; takes precedence over `prefix`.
        #[serde(default)]
        chain_id: Option<ChainId>,
        /// Explicit prefix.
        #[serde(default)]
        prefix: Option<String>,
        /// Address to convert.
        address: String,
        /// Address kind (acc/val/cons), account when absent.
        #[serde(rename = "type", default)]
        kind: Option<AddressKind>,
    },
    /// Level of the chain hosting the registry.
    GetCurrentLevel {},
}

impl RegistryRequest {
    /// Operation name, for logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            RegistryRequest::InitSubChain { .. } => "InitSubChain",
            RegistryRequest::RegisterSubChain { .. } => "RegisterSubChain",
            RegistryRequest::RegisterDefaultSubChain(_) => "RegisterDefaultSubChain",
            RegistryRequest::RegisterSubChainValidator { .. } => "RegisterSubChainValidator",
            RegistryRequest::RegisterRole { .. } => "RegisterRole",
            RegistryRequest::RemoveSubChain { .. } => "RemoveSubChain",
            RegistryRequest::GetSubChainById { .. } => "GetSubChainById",
            RegistryRequest::GetSubChainConfigById { .. } => "GetSubChainConfigById",
            RegistryRequest::GetSubChainConfigByIds { .. } => "GetSubChainConfigByIds",
            RegistryRequest::GetSubChainsByIds { .. } => "GetSubChainsByIds",
            RegistryRequest::GetSubChains {} => "GetSubChains",
            RegistryRequest::GetSubChainIds {} => "GetSubChainIds",
            RegistryRequest::GetSubChainIdsByLevel { .. } => "GetSubChainIdsByLevel",
            RegistryRequest::GetSubChainIdsByValidator { .. } => "GetSubChainIdsByValidator",
            RegistryRequest::GetValidatorsByChainId { .. } => "GetValidatorsByChainId",
            RegistryRequest::GetValidatorAddressesByChainId { .. } => {
                "GetValidatorAddressesByChainId"
            }
            RegistryRequest::ConvertAddressByChainId { .. } => "ConvertAddressByChainId",
            RegistryRequest::GetCurrentLevel {} => "GetCurrentLevel",
        }
    }

    /// Whether the request mutates the registry.
    pub fn is_command(&self) -> bool {
        matches!(
            self,
            RegistryRequest::InitSubChain { .. }
                | RegistryRequest::RegisterSubChain { .. }
                | RegistryRequest::RegisterDefaultSubChain(_)
                | RegistryRequest::RegisterSubChainValidator { .. }
                | RegistryRequest::RegisterRole { .. }
                | RegistryRequest::RemoveSubChain { .. }
        )
    }
}

/// Response of `GetCurrentLevel`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentLevelResponse {
    /// Level.
    pub level: Level,
}

/// JSON entry point used by the host bridge.
pub trait RegistryApi {
    /// Decode a [`RegistryRequest`], run it and JSON-encode the result.
    fn handle(&self, request: &[u8]) -> Result<Vec<u8>, RegistryError>;
}
