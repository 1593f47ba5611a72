//! Fixed table of addressing schemes.
//!
//! Useful for hosts that know their peers up front and for tests that do not
//! need a full registry.

use parking_lot::RwLock;
use shared_types::ChainId;
use std::collections::HashMap;

use crate::domain::AddressingScheme;
use crate::ports::AddressingLookup;

/// In-memory chain id → scheme table.
#[derive(Debug, Default)]
pub struct StaticAddressingLookup {
    schemes: RwLock<HashMap<ChainId, AddressingScheme>>,
}

impl StaticAddressingLookup {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a chain's scheme.
    pub fn insert(&self, chain_id: ChainId, scheme: AddressingScheme) {
        self.schemes.write().insert(chain_id, scheme);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(self, chain_id: ChainId, scheme: AddressingScheme) -> Self {
        self.insert(chain_id, scheme);
        self
    }
}

impl AddressingLookup for StaticAddressingLookup {
    fn addressing_scheme(&self, chain_id: &ChainId) -> Option<AddressingScheme> {
        self.schemes.read().get(chain_id).cloned()
    }
}
