//! # Value Objects
//!
//! Denominations, chain configuration and well-known constants.

use mc_02_address_translator::{AddressingScheme, Bech32Prefixes};
use serde::{Deserialize, Serialize};
use shared_types::{ChainId, Level};

/// First numeric id handed out by default registration.
pub const START_NUMERIC_ID: u64 = 1000;

/// Revision used for freshly allocated chain ids.
pub const DEFAULT_REVISION: u64 = 1;

/// Root chain of a fresh hierarchy.
pub const LEVEL0_CHAIN_ID: &str = "leveln_1000-1";

/// Account prefix of the root chain.
pub const LEVEL0_PREFIX: &str = "level0";

/// Public test chain.
pub const MYTHOS_CHAIN_ID: &str = "mythos_7000-14";

/// Account prefix of the public test chain.
pub const MYTHOS_PREFIX: &str = "mythos";

/// Decimals of the default base denomination.
pub const DEFAULT_BASE_DENOM_UNIT: u32 = 18;

/// Denomination configuration of one chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenomConfig {
    /// Chain display name.
    pub name: String,
    /// Human coin unit (e.g. `myt`).
    pub human_coin_unit: String,
    /// Base denomination (e.g. `amyt`).
    pub base_denom: String,
    /// Display denomination.
    pub denom_unit: String,
    /// Decimals between base and display denomination.
    pub base_denom_unit: u32,
    /// Staking base denomination (e.g. `asmyt`).
    pub bond_base_denom: String,
    /// Staking display denomination (e.g. `smyt`).
    pub bond_denom: String,
}

impl DenomConfig {
    /// Conventional denominations for a display unit: `a<unit>` for the base
    /// denomination and `s<unit>` / `as<unit>` for the staking pair.
    pub fn from_unit(name: &str, denom_unit: &str, base_denom_unit: u32) -> Self {
        Self {
            name: name.to_string(),
            human_coin_unit: denom_unit.to_string(),
            base_denom: format!("a{denom_unit}"),
            denom_unit: denom_unit.to_string(),
            base_denom_unit,
            bond_base_denom: format!("as{denom_unit}"),
            bond_denom: format!("s{denom_unit}"),
        }
    }
}

/// Configuration of one registered chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubChainConfig {
    /// Unique chain id.
    pub chain_id: ChainId,
    /// Bech32 prefix set.
    pub prefixes: Bech32Prefixes,
    /// Denominations.
    pub denom: DenomConfig,
    /// SLIP-44 coin type (60 or 118).
    pub coin_type: u32,
    /// Depth in the hierarchy.
    pub level: Level,
    /// Parent chain; absent only at level 0.
    #[serde(default)]
    pub parent: Option<ChainId>,
}

impl SubChainConfig {
    /// Root (level 0) configuration.
    pub fn root(chain_id: ChainId, prefix: &str, denom_unit: &str, coin_type: u32) -> Self {
        Self {
            denom: DenomConfig::from_unit(&chain_id.base_name(), denom_unit, DEFAULT_BASE_DENOM_UNIT),
            chain_id,
            prefixes: Bech32Prefixes::from_base(prefix),
            coin_type,
            level: 0,
            parent: None,
        }
    }

    /// Child configuration under `parent` at `level`.
    pub fn child(
        chain_id: ChainId,
        prefix: &str,
        denom_unit: &str,
        coin_type: u32,
        level: Level,
        parent: ChainId,
    ) -> Self {
        Self {
            level,
            parent: Some(parent),
            ..Self::root(chain_id, prefix, denom_unit, coin_type)
        }
    }

    /// Addressing scheme used by the translator.
    pub fn addressing_scheme(&self) -> AddressingScheme {
        AddressingScheme {
            prefixes: self.prefixes.clone(),
            coin_type: self.coin_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_02_address_translator::COIN_TYPE_ETH;

    #[test]
    fn test_denoms_from_unit() {
        let d = DenomConfig::from_unit("mythos", "myt", 18);
        assert_eq!(d.base_denom, "amyt");
        assert_eq!(d.bond_denom, "smyt");
        assert_eq!(d.bond_base_denom, "asmyt");
    }

    #[test]
    fn test_well_known_ids_parse() {
        assert!(ChainId::new(LEVEL0_CHAIN_ID).is_ok());
        assert!(ChainId::new(MYTHOS_CHAIN_ID).is_ok());
    }

    #[test]
    fn test_child_config() {
        let root = ChainId::new(LEVEL0_CHAIN_ID).unwrap();
        let child = SubChainConfig::child(
            ChainId::new(MYTHOS_CHAIN_ID).unwrap(),
            MYTHOS_PREFIX,
            "myt",
            COIN_TYPE_ETH,
            1,
            root.clone(),
        );
        assert_eq!(child.level, 1);
        assert_eq!(child.parent, Some(root));
        assert_eq!(child.denom.name, "mythos");
        assert_eq!(child.addressing_scheme().prefixes.acc_addr, "mythos");
    }
}
