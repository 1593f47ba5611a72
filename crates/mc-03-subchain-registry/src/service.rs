//! # Subchain Registry Service
//!
//! Owned registry instance. Reads take a shared lock over the committed
//! state; every command takes the write lock for its whole duration, so a
//! command either applies completely or not at all.

use mc_02_address_translator::{
    AddressKind, AddressTranslation, AddressTranslator, AddressingLookup, AddressingScheme,
};
use mc_telemetry::{log_chain_event, REGISTERED_CHAINS, REGISTRY_MUTATIONS};
use parking_lot::{Mutex, RwLock};
use shared_types::{ChainId, Level};
use std::sync::Arc;
use tracing::{debug, info};

use crate::adapters::NoInFlightCalls;
use crate::algorithms::{build_default_config, next_numeric_id};
use crate::domain::{
    invariant_level_rule, invariant_unique_chain_id, GenesisChain, RegisterDefaultSubChainRequest,
    RegistryError, RegistryEvent, RegistryGenesis, RegistrySnapshot, SubChainConfig,
    SubChainEntry, Validator,
};
use crate::ports::{
    CurrentLevelResponse, InFlightCalls, RegistryApi, RegistryRequest, RegistryStore,
};

const SUBSYSTEM: &str = "registry";

/// Hierarchical catalog of chains, validators and roles.
pub struct SubchainRegistry {
    state: RwLock<RegistrySnapshot>,
    in_flight: RwLock<Arc<dyn InFlightCalls>>,
    store: Option<Arc<dyn RegistryStore>>,
    events: Mutex<Vec<RegistryEvent>>,
}

impl std::fmt::Debug for SubchainRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubchainRegistry")
            .field("chains", &self.state.read().entries.len())
            .field("persistent", &self.store.is_some())
            .finish()
    }
}

impl Default for SubchainRegistry {
    fn default() -> Self {
        Self::new(0)
    }
}

impl SubchainRegistry {
    /// Empty registry hosted on a chain at `current_level`.
    pub fn new(current_level: Level) -> Self {
        Self::from_snapshot(RegistrySnapshot::new(current_level))
    }

    fn from_snapshot(snapshot: RegistrySnapshot) -> Self {
        REGISTERED_CHAINS.set(snapshot.entries.len() as i64);
        Self {
            state: RwLock::new(snapshot),
            in_flight: RwLock::new(Arc::new(NoInFlightCalls)),
            store: None,
            events: Mutex::new(Vec::new()),
        }
    }

    /// Build a registry from genesis.
    ///
    /// Chains are created in order through [`init_subchain`](Self::init_subchain),
    /// so genesis obeys the same rules as runtime registration.
    pub fn from_genesis(genesis: RegistryGenesis) -> Result<Self, RegistryError> {
        let registry = Self::new(genesis.current_level);
        for GenesisChain {
            config,
            validators,
            roles,
        } in genesis.chains
        {
            let chain_id = config.chain_id.clone();
            registry.init_subchain(config)?;
            for validator in validators {
                registry.register_subchain_validator(&chain_id, validator)?;
            }
            for (role, address) in roles {
                registry.register_role(&chain_id, &role, &address)?;
            }
        }
        info!(
            chains = registry.state.read().entries.len(),
            current_level = genesis.current_level,
            "Registry initialized from genesis"
        );
        Ok(registry)
    }

    /// Restore the most recent snapshot from `store`, or start empty at
    /// `current_level` if the store has none. The store stays attached.
    pub fn restore(store: Arc<dyn RegistryStore>, current_level: Level) -> Result<Self, RegistryError> {
        let registry = match store.load_latest()? {
            Some((height, snapshot)) => {
                info!(height, chains = snapshot.entries.len(), "Registry restored");
                Self::from_snapshot(snapshot)
            }
            None => Self::new(current_level),
        };
        Ok(registry.with_store(store))
    }

    /// Attach a snapshot store used by [`commit`](Self::commit).
    pub fn with_store(mut self, store: Arc<dyn RegistryStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Attach the call table consulted before removal.
    pub fn with_in_flight(self, in_flight: Arc<dyn InFlightCalls>) -> Self {
        self.set_in_flight(in_flight);
        self
    }

    /// Replace the call table consulted before removal.
    pub fn set_in_flight(&self, in_flight: Arc<dyn InFlightCalls>) {
        *self.in_flight.write() = in_flight;
    }

    /// Persist the committed state for block `height`.
    pub fn commit(&self, height: u64) -> Result<(), RegistryError> {
        match &self.store {
            Some(store) => store.persist(height, &self.state.read()),
            None => {
                debug!(height, "No registry store attached, commit skipped");
                Ok(())
            }
        }
    }

    /// Copy of the full state.
    pub fn snapshot(&self) -> RegistrySnapshot {
        self.state.read().clone()
    }

    /// Drain buffered events.
    pub fn take_events(&self) -> Vec<RegistryEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    fn emit(&self, event: RegistryEvent) {
        self.events.lock().push(event);
    }

    fn record_mutation(&self, operation: &str, state: &RegistrySnapshot) {
        REGISTRY_MUTATIONS.with_label_values(&[operation]).inc();
        REGISTERED_CHAINS.set(state.entries.len() as i64);
    }

    // =========================================================================
    // COMMANDS
    // =========================================================================

    /// Create a chain entry directly.
    ///
    /// A root must have level 0 and no parent; an entry with a parent must
    /// satisfy the level rule against it.
    pub fn init_subchain(&self, config: SubChainConfig) -> Result<(), RegistryError> {
        let mut state = self.state.write();
        invariant_unique_chain_id(&state, &config.chain_id)?;
        let parent = match &config.parent {
            Some(parent_id) => Some(
                state
                    .entries
                    .get(parent_id)
                    .map(|p| p.config.clone())
                    .ok_or_else(|| RegistryError::ParentNotFound(parent_id.clone()))?,
            ),
            None => None,
        };
        invariant_level_rule(&config, parent.as_ref())?;

        let chain_id = config.chain_id.clone();
        let level = config.level;
        state
            .entries
            .insert(chain_id.clone(), SubChainEntry::new(config));
        self.record_mutation("init", &state);
        log_chain_event!(info, SUBSYSTEM, "Initialized subchain", chain_id, level);
        self.emit(RegistryEvent::InitSubchain { chain_id, level });
        Ok(())
    }

    /// Create a child entry under `parent_id`.
    ///
    /// `parent_id` is authoritative: the stored config's parent is set to it.
    pub fn register_subchain(
        &self,
        mut config: SubChainConfig,
        parent_id: &ChainId,
    ) -> Result<(), RegistryError> {
        let mut state = self.state.write();
        invariant_unique_chain_id(&state, &config.chain_id)?;
        let parent = state
            .entries
            .get(parent_id)
            .ok_or_else(|| RegistryError::ParentNotFound(parent_id.clone()))?;
        invariant_level_rule(&config, Some(&parent.config))?;

        config.parent = Some(parent_id.clone());
        let chain_id = config.chain_id.clone();
        let level = config.level;
        state
            .entries
            .insert(chain_id.clone(), SubChainEntry::new(config));
        self.record_mutation("register", &state);
        log_chain_event!(info, SUBSYSTEM, "Registered subchain", chain_id, level, parent = %parent_id);
        self.emit(RegistryEvent::RegisterSubchain {
            chain_id,
            level,
            parent: Some(parent_id.clone()),
        });
        Ok(())
    }

    /// Allocate the next numeric id and register a child with the default
    /// configuration derived from the request.
    pub fn register_default_subchain(
        &self,
        req: &RegisterDefaultSubChainRequest,
    ) -> Result<ChainId, RegistryError> {
        let mut state = self.state.write();
        let parent = state
            .entries
            .get(&req.parent_id)
            .ok_or_else(|| RegistryError::ParentNotFound(req.parent_id.clone()))?;
        let numeric_id = next_numeric_id(&state);
        let config = build_default_config(req, numeric_id, &parent.config)?;
        invariant_unique_chain_id(&state, &config.chain_id)?;

        let chain_id = config.chain_id.clone();
        let level = config.level;
        state.last_numeric_id = numeric_id;
        state
            .entries
            .insert(chain_id.clone(), SubChainEntry::new(config));
        self.record_mutation("register_default", &state);
        log_chain_event!(
            info,
            SUBSYSTEM,
            "Registered default subchain",
            chain_id,
            level,
            numeric_id
        );
        self.emit(RegistryEvent::RegisterSubchain {
            chain_id: chain_id.clone(),
            level,
            parent: Some(req.parent_id.clone()),
        });
        Ok(chain_id)
    }

    /// Add a validator to a chain.
    ///
    /// Idempotent by operator address: registering the same operator twice
    /// succeeds without changing anything. The operator address is
    /// re-encoded under the chain's validator prefix and recorded in
    /// `chain_addresses`.
    pub fn register_subchain_validator(
        &self,
        chain_id: &ChainId,
        mut validator: Validator,
    ) -> Result<(), RegistryError> {
        let mut state = self.state.write();
        let entry = state
            .entries
            .get(chain_id)
            .ok_or_else(|| RegistryError::ChainNotFound(chain_id.clone()))?;
        if entry.has_validator(&validator.operator_address) {
            debug!(%chain_id, validator = %validator.operator_address, "Validator already registered");
            return Ok(());
        }

        let val_prefix = entry.config.prefixes.val_addr.clone();
        let local = AddressTranslator::new(&*state)
            .convert_with_prefix(&validator.operator_address, &val_prefix)?;
        validator.chain_addresses.insert(chain_id.clone(), local);

        let operator = validator.operator_address.clone();
        if let Some(entry) = state.entries.get_mut(chain_id) {
            entry.validators.push(validator);
        }
        state
            .validator_chains
            .entry(operator.clone())
            .or_default()
            .push(chain_id.clone());
        self.record_mutation("register_validator", &state);
        log_chain_event!(info, SUBSYSTEM, "Registered subchain validator", chain_id, validator = %operator);
        self.emit(RegistryEvent::RegisterSubchainValidator {
            chain_id: chain_id.clone(),
            validator: operator,
        });
        Ok(())
    }

    /// Bind `role` to a contract address on `chain_id`, replacing any
    /// previous binding.
    pub fn register_role(
        &self,
        chain_id: &ChainId,
        role: &str,
        address: &str,
    ) -> Result<(), RegistryError> {
        if role.is_empty() {
            return Err(RegistryError::InvalidRequest(
                "role name must not be empty".to_string(),
            ));
        }
        let mut state = self.state.write();
        let entry = state
            .entries
            .get_mut(chain_id)
            .ok_or_else(|| RegistryError::ChainNotFound(chain_id.clone()))?;
        entry.roles.insert(role.to_string(), address.to_string());
        self.record_mutation("register_role", &state);
        log_chain_event!(debug, SUBSYSTEM, "Registered role", chain_id, role, address);
        self.emit(RegistryEvent::RegisterRole {
            chain_id: chain_id.clone(),
            role: role.to_string(),
            address: address.to_string(),
        });
        Ok(())
    }

    /// Remove a chain.
    ///
    /// Fails while the chain has children or while any cross-chain call
    /// references it. The validator index entries are dropped with it, so
    /// register followed by remove leaves the state exactly as before.
    pub fn remove_subchain(&self, chain_id: &ChainId) -> Result<(), RegistryError> {
        let mut state = self.state.write();
        if !state.entries.contains_key(chain_id) {
            return Err(RegistryError::ChainNotFound(chain_id.clone()));
        }
        let children = state.children_of(chain_id);
        if !children.is_empty() {
            return Err(RegistryError::ChainHasChildren {
                chain_id: chain_id.clone(),
                children,
            });
        }
        if self.in_flight.read().is_chain_in_flight(chain_id) {
            return Err(RegistryError::ChainInFlight(chain_id.clone()));
        }

        let removed = state.entries.shift_remove(chain_id);
        for validator in removed.iter().flat_map(|e| e.validators.iter()) {
            let now_empty = match state.validator_chains.get_mut(&validator.operator_address) {
                Some(chains) => {
                    chains.retain(|c| c != chain_id);
                    chains.is_empty()
                }
                None => false,
            };
            if now_empty {
                state
                    .validator_chains
                    .shift_remove(&validator.operator_address);
            }
        }
        self.record_mutation("remove", &state);
        log_chain_event!(info, SUBSYSTEM, "Removed subchain", chain_id);
        self.emit(RegistryEvent::RemoveSubchain {
            chain_id: chain_id.clone(),
        });
        Ok(())
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Full entry of one chain.
    pub fn get_subchain_by_id(&self, chain_id: &ChainId) -> Result<SubChainEntry, RegistryError> {
        self.state
            .read()
            .entries
            .get(chain_id)
            .cloned()
            .ok_or_else(|| RegistryError::ChainNotFound(chain_id.clone()))
    }

    /// Entries of the given chains, in request order; unknown ids are skipped.
    pub fn get_subchains_by_ids(&self, ids: &[ChainId]) -> Vec<SubChainEntry> {
        let state = self.state.read();
        ids.iter()
            .filter_map(|id| state.entries.get(id).cloned())
            .collect()
    }

    /// All entries in insertion order.
    pub fn get_subchains(&self) -> Vec<SubChainEntry> {
        self.state.read().entries.values().cloned().collect()
    }

    /// All chain ids in insertion order.
    pub fn get_subchain_ids(&self) -> Vec<ChainId> {
        self.state.read().entries.keys().cloned().collect()
    }

    /// Configuration of one chain.
    pub fn get_subchain_config_by_id(
        &self,
        chain_id: &ChainId,
    ) -> Result<SubChainConfig, RegistryError> {
        self.state
            .read()
            .entries
            .get(chain_id)
            .map(|e| e.config.clone())
            .ok_or_else(|| RegistryError::ChainNotFound(chain_id.clone()))
    }

    /// Configurations of the given chains; unknown ids are skipped.
    pub fn get_subchain_config_by_ids(&self, ids: &[ChainId]) -> Vec<SubChainConfig> {
        let state = self.state.read();
        ids.iter()
            .filter_map(|id| state.entries.get(id).map(|e| e.config.clone()))
            .collect()
    }

    /// Chain ids at `level`, in insertion order.
    pub fn get_subchain_ids_by_level(&self, level: Level) -> Vec<ChainId> {
        self.state
            .read()
            .entries
            .values()
            .filter(|e| e.config.level == level)
            .map(|e| e.chain_id().clone())
            .collect()
    }

    /// Chains validated by `operator_address`, in registration order.
    pub fn get_subchain_ids_by_validator(&self, operator_address: &str) -> Vec<ChainId> {
        self.state
            .read()
            .validator_chains
            .get(operator_address)
            .cloned()
            .unwrap_or_default()
    }

    /// Validators of a chain, in registration order.
    pub fn get_validators_by_chain_id(
        &self,
        chain_id: &ChainId,
    ) -> Result<Vec<Validator>, RegistryError> {
        Ok(self.get_subchain_by_id(chain_id)?.validators)
    }

    /// Validator operator addresses of a chain, in registration order.
    pub fn get_validator_addresses_by_chain_id(
        &self,
        chain_id: &ChainId,
    ) -> Result<Vec<String>, RegistryError> {
        let state = self.state.read();
        let entry = state
            .entries
            .get(chain_id)
            .ok_or_else(|| RegistryError::ChainNotFound(chain_id.clone()))?;
        Ok(entry
            .validators
            .iter()
            .map(|v| v.operator_address.clone())
            .collect())
    }

    /// Re-encode `address` for a chain (using the prefix of `kind`) or, when
    /// no chain is given, under an explicit prefix.
    pub fn convert_address_by_chain_id(
        &self,
        address: &str,
        chain_id: Option<&ChainId>,
        prefix: Option<&str>,
        kind: AddressKind,
    ) -> Result<String, RegistryError> {
        let state = self.state.read();
        let prefix = match (chain_id, prefix) {
            (Some(chain_id), _) => state
                .entries
                .get(chain_id)
                .map(|e| e.config.prefixes.address_prefix(kind).to_string())
                .ok_or_else(|| RegistryError::ChainNotFound(chain_id.clone()))?,
            (None, Some(prefix)) => prefix.to_string(),
            (None, None) => {
                return Err(RegistryError::InvalidRequest(
                    "either chain_id or prefix is required".to_string(),
                ))
            }
        };
        Ok(AddressTranslator::new(&*state).convert_with_prefix(address, &prefix)?)
    }

    /// Level of the chain hosting this registry.
    pub fn get_current_level(&self) -> Level {
        self.state.read().current_level
    }

    /// Contract address bound to `role` on `chain_id`.
    pub fn resolve_role(
        &self,
        chain_id: &ChainId,
        role: &str,
    ) -> Result<Option<String>, RegistryError> {
        let state = self.state.read();
        let entry = state
            .entries
            .get(chain_id)
            .ok_or_else(|| RegistryError::ChainNotFound(chain_id.clone()))?;
        Ok(entry.roles.get(role).cloned())
    }

    /// Children of `chain_id`, in insertion order.
    pub fn children_of(&self, chain_id: &ChainId) -> Vec<ChainId> {
        self.state.read().children_of(chain_id)
    }

    /// Whether `chain_id` is registered.
    pub fn contains(&self, chain_id: &ChainId) -> bool {
        self.state.read().entries.contains_key(chain_id)
    }

    fn dispatch(&self, request: RegistryRequest) -> Result<Vec<u8>, RegistryError> {
        let unit = || Ok(b"{}".to_vec());
        match request {
            RegistryRequest::InitSubChain { config } => {
                self.init_subchain(config)?;
                unit()
            }
            RegistryRequest::RegisterSubChain { config, parent_id } => {
                self.register_subchain(config, &parent_id)?;
                unit()
            }
            RegistryRequest::RegisterDefaultSubChain(req) => {
                to_json(&self.register_default_subchain(&req)?)
            }
            RegistryRequest::RegisterSubChainValidator {
                chain_id,
                validator,
            } => {
                self.register_subchain_validator(&chain_id, validator)?;
                unit()
            }
            RegistryRequest::RegisterRole {
                chain_id,
                role,
                address,
            } => {
                self.register_role(&chain_id, &role, &address)?;
                unit()
            }
            RegistryRequest::RemoveSubChain { chain_id } => {
                self.remove_subchain(&chain_id)?;
                unit()
            }
            RegistryRequest::GetSubChainById { chain_id } => {
                to_json(&self.get_subchain_by_id(&chain_id)?)
            }
            RegistryRequest::GetSubChainConfigById { chain_id } => {
                to_json(&self.get_subchain_config_by_id(&chain_id)?)
            }
            RegistryRequest::GetSubChainConfigByIds { ids } => {
                to_json(&self.get_subchain_config_by_ids(&ids))
            }
            RegistryRequest::GetSubChainsByIds { ids } => to_json(&self.get_subchains_by_ids(&ids)),
            RegistryRequest::GetSubChains {} => to_json(&self.get_subchains()),
            RegistryRequest::GetSubChainIds {} => to_json(&self.get_subchain_ids()),
            RegistryRequest::GetSubChainIdsByLevel { level } => {
                to_json(&self.get_subchain_ids_by_level(level))
            }
            RegistryRequest::GetSubChainIdsByValidator { validator_address } => {
                to_json(&self.get_subchain_ids_by_validator(&validator_address))
            }
            RegistryRequest::GetValidatorsByChainId { chain_id } => {
                to_json(&self.get_validators_by_chain_id(&chain_id)?)
            }
            RegistryRequest::GetValidatorAddressesByChainId { chain_id } => {
                to_json(&self.get_validator_addresses_by_chain_id(&chain_id)?)
            }
            RegistryRequest::ConvertAddressByChainId {
                chain_id,
                prefix,
                address,
                kind,
            } => to_json(&self.convert_address_by_chain_id(
                &address,
                chain_id.as_ref(),
                prefix.as_deref(),
                kind.unwrap_or(AddressKind::Acc),
            )?),
            RegistryRequest::GetCurrentLevel {} => to_json(&CurrentLevelResponse {
                level: self.get_current_level(),
            }),
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, RegistryError> {
    serde_json::to_vec(value).map_err(|e| RegistryError::InvalidRequest(e.to_string()))
}

impl RegistryApi for SubchainRegistry {
    fn handle(&self, request: &[u8]) -> Result<Vec<u8>, RegistryError> {
        let request: RegistryRequest = serde_json::from_slice(request)
            .map_err(|e| RegistryError::InvalidRequest(e.to_string()))?;
        let name = request.name();
        debug!(operation = name, "Handling registry request");
        self.dispatch(request).inspect_err(|e| {
            mc_telemetry::record_error(SUBSYSTEM, e.kind());
            debug!(operation = name, error = %e, "Registry request failed");
        })
    }
}

impl AddressingLookup for RegistrySnapshot {
    fn addressing_scheme(&self, chain_id: &ChainId) -> Option<AddressingScheme> {
        self.entries
            .get(chain_id)
            .map(|e| e.config.addressing_scheme())
    }
}

impl AddressingLookup for SubchainRegistry {
    fn addressing_scheme(&self, chain_id: &ChainId) -> Option<AddressingScheme> {
        self.state.read().addressing_scheme(chain_id)
    }
}
