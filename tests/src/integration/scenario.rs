//! # Three-Chain Scenario
//!
//! Root `leveln_1000-1` at level 0 with two level-1 children:
//! `mythos_7000-14` and `mythos_7001-1`. Both children host native
//! contracts; the application chain binds the `alias` and `bank` roles.

use indexmap::IndexMap;
use mc_02_address_translator::{AddressCodec, Bech32Codec, COIN_TYPE_ETH};
use mc_03_subchain_registry::{
    GenesisChain, RegistryGenesis, SubChainConfig, SubchainRegistry, LEVEL0_CHAIN_ID,
    LEVEL0_PREFIX, MYTHOS_CHAIN_ID, MYTHOS_PREFIX,
};
use mc_04_contract_handler::{
    ContractHandlerMap, ExecutionMessage, InMemoryContractEngine, KvRequest, NativeContract,
    ROLE_ALIAS, ROLE_BANK,
};
use mc_05_cross_chain::{
    CallContext, ChainHeights, CrossChainCallRequest, CrossChainConfig, CrossChainCoordinator,
    EngineRouter,
};
use shared_types::{ChainId, Coin, TxHash};
use std::sync::Arc;

/// Application chain id.
pub const APP_CHAIN_ID: &str = "mythos_7001-1";
/// Application chain account prefix.
pub const APP_PREFIX: &str = "app";
/// Application chain base denomination.
pub const APP_DENOM: &str = "aapp";
/// Starting balance of the user on the application chain.
pub const USER_BALANCE: u128 = 1_000;

/// Byte pattern of the user account.
pub const USER: u8 = 0x01;
/// Byte pattern of a second account.
pub const OTHER: u8 = 0x02;
/// Byte pattern of the key/value contract on both children.
pub const KV: u8 = 0x0A;
/// Byte pattern of the alias contract on the application chain.
pub const ALIAS: u8 = 0x0B;
/// Byte pattern of the bank contract on the application chain.
pub const BANK: u8 = 0x0C;

/// Chain id helper.
pub fn chain(id: &str) -> ChainId {
    ChainId::new(id).expect("valid chain id")
}

/// Root chain.
pub fn root() -> ChainId {
    chain(LEVEL0_CHAIN_ID)
}

/// Mythos chain.
pub fn mythos() -> ChainId {
    chain(MYTHOS_CHAIN_ID)
}

/// Application chain.
pub fn app() -> ChainId {
    chain(APP_CHAIN_ID)
}

/// 20-byte account filled with `byte`, under `prefix`.
pub fn account(prefix: &str, byte: u8) -> String {
    Bech32Codec.encode(prefix, &[byte; 20]).expect("valid bech32")
}

/// Key/value contract message.
pub fn kv(req: KvRequest) -> Vec<u8> {
    ExecutionMessage::json(&req)
        .and_then(|m| m.to_bytes())
        .expect("encodable")
}

/// Registry genesis for the scenario.
pub fn genesis() -> RegistryGenesis {
    let mut roles = IndexMap::new();
    roles.insert(ROLE_ALIAS.to_string(), account(APP_PREFIX, ALIAS));
    roles.insert(ROLE_BANK.to_string(), account(APP_PREFIX, BANK));

    RegistryGenesis {
        current_level: 0,
        chains: vec![
            GenesisChain {
                config: SubChainConfig::root(root(), LEVEL0_PREFIX, "lvl", COIN_TYPE_ETH),
                validators: Vec::new(),
                roles: IndexMap::new(),
            },
            GenesisChain {
                config: SubChainConfig::child(mythos(), MYTHOS_PREFIX, "myt", COIN_TYPE_ETH, 1, root()),
                validators: Vec::new(),
                roles: IndexMap::new(),
            },
            GenesisChain {
                config: SubChainConfig::child(app(), APP_PREFIX, "app", COIN_TYPE_ETH, 1, root()),
                validators: Vec::new(),
                roles,
            },
        ],
    }
}

/// Everything wired together.
pub struct Scenario {
    /// Shared registry.
    pub registry: Arc<SubchainRegistry>,
    /// Per-chain engines.
    pub router: Arc<EngineRouter>,
    /// Per-chain committed heights.
    pub heights: Arc<ChainHeights>,
    /// Mythos chain engine.
    pub mythos_engine: Arc<InMemoryContractEngine>,
    /// Application chain engine.
    pub app_engine: Arc<InMemoryContractEngine>,
    /// Coordinator under test.
    pub coordinator: Arc<CrossChainCoordinator>,
}

impl Scenario {
    /// Build the scenario with the default configuration.
    pub fn new() -> Self {
        Self::with_config(CrossChainConfig::default())
    }

    /// Build the scenario with `config`.
    pub fn with_config(config: CrossChainConfig) -> Self {
        let registry = Arc::new(SubchainRegistry::from_genesis(genesis()).expect("valid genesis"));

        let mythos_engine = Arc::new(
            InMemoryContractEngine::new(mythos())
                .with_contract(account(MYTHOS_PREFIX, KV), NativeContract::kv_store()),
        );
        let app_engine = Arc::new(
            InMemoryContractEngine::new(app())
                .with_contract(account(APP_PREFIX, KV), NativeContract::kv_store())
                .with_contract(account(APP_PREFIX, ALIAS), NativeContract::alias())
                .with_contract(
                    account(APP_PREFIX, BANK),
                    NativeContract::bank([(
                        account(APP_PREFIX, USER),
                        Coin::new(APP_DENOM, USER_BALANCE),
                    )]),
                ),
        );
        let router = Arc::new(
            EngineRouter::new()
                .with_engine(mythos(), mythos_engine.clone())
                .with_engine(app(), app_engine.clone()),
        );

        let heights = Arc::new(ChainHeights::new());
        heights.set(&root(), 10);
        heights.set(&mythos(), 100);
        heights.set(&app(), 50);

        let coordinator = Arc::new(CrossChainCoordinator::new(
            config,
            registry.clone(),
            router.clone(),
            heights.clone(),
        ));

        Self {
            registry,
            router,
            heights,
            mythos_engine,
            app_engine,
            coordinator,
        }
    }

    /// Role handler map of the application chain, calling its engine
    /// directly.
    pub fn app_handlers(&self) -> ContractHandlerMap {
        ContractHandlerMap::with_defaults(self.registry.clone(), self.app_engine.clone())
    }

    /// Transaction context of the user contract on mythos.
    pub fn tx_ctx(&self, tx: &[u8]) -> CallContext {
        CallContext::transaction(
            mythos(),
            account(MYTHOS_PREFIX, KV),
            TxHash::from_tx_bytes(tx),
        )
    }

    /// Query context of the user contract on mythos.
    pub fn query_ctx(&self) -> CallContext {
        CallContext::query(mythos(), account(MYTHOS_PREFIX, KV))
    }

    /// Request from the mythos user to the application chain's key/value
    /// contract.
    pub fn kv_request(&self, req: KvRequest) -> CrossChainCallRequest {
        CrossChainCallRequest::new(
            mythos(),
            account(MYTHOS_PREFIX, USER),
            app(),
            account(MYTHOS_PREFIX, KV),
            kv(req),
        )
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new()
    }
}
