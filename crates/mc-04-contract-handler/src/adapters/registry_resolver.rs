//! Role resolution backed by the subchain registry.

use mc_03_subchain_registry::{RegistryError, SubchainRegistry};
use shared_types::ChainId;

use crate::ports::RoleResolver;

impl RoleResolver for SubchainRegistry {
    fn resolve_role(&self, chain_id: &ChainId, role: &str) -> Result<Option<String>, RegistryError> {
        SubchainRegistry::resolve_role(self, chain_id, role)
    }
}
