//! # Chain Allocation
//!
//! Numeric id allocation and default configuration for chains registered
//! through `RegisterDefaultSubChain`.

use mc_02_address_translator::{Bech32Prefixes, COIN_TYPE_ETH};
use shared_types::ChainId;

use crate::domain::{
    DenomConfig, RegisterDefaultSubChainRequest, RegistryError, RegistrySnapshot, SubChainConfig,
    DEFAULT_REVISION, START_NUMERIC_ID,
};

/// Next free numeric id.
///
/// Counts up from the last allocated id and skips any id already taken by an
/// explicitly registered chain, so allocation never collides.
pub fn next_numeric_id(state: &RegistrySnapshot) -> u64 {
    let mut candidate = (state.last_numeric_id + 1).max(START_NUMERIC_ID);
    while state
        .entries
        .keys()
        .any(|id| id.numeric_id() == candidate)
    {
        candidate += 1;
    }
    candidate
}

/// Build the configuration of a default subchain one level below `parent`.
pub fn build_default_config(
    req: &RegisterDefaultSubChainRequest,
    numeric_id: u64,
    parent: &SubChainConfig,
) -> Result<SubChainConfig, RegistryError> {
    if req.denom_unit.is_empty() {
        return Err(RegistryError::InvalidRequest(
            "denom_unit must not be empty".to_string(),
        ));
    }
    let chain_id = ChainId::from_parts(&req.chain_base_name, numeric_id, DEFAULT_REVISION)?;

    Ok(SubChainConfig {
        prefixes: Bech32Prefixes::from_base(&req.chain_base_name),
        denom: DenomConfig::from_unit(&req.chain_base_name, &req.denom_unit, req.base_denom_unit),
        coin_type: req.coin_type.unwrap_or(COIN_TYPE_ETH),
        level: parent.level + 1,
        parent: Some(parent.chain_id.clone()),
        chain_id,
    })
}
