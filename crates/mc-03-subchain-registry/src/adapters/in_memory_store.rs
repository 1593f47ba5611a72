//! In-memory snapshot store.
//!
//! Snapshots are kept as JSON bytes, the same encoding a state-store backed
//! implementation would write.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use tracing::debug;

use crate::domain::{RegistryError, RegistrySnapshot};
use crate::ports::RegistryStore;

/// JSON snapshots keyed by block height.
#[derive(Debug, Default)]
pub struct InMemoryRegistryStore {
    snapshots: RwLock<BTreeMap<u64, Vec<u8>>>,
}

impl InMemoryRegistryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Heights with a stored snapshot.
    pub fn heights(&self) -> Vec<u64> {
        self.snapshots.read().keys().copied().collect()
    }

    /// Snapshot stored at exactly `height`.
    pub fn load_at(&self, height: u64) -> Result<Option<RegistrySnapshot>, RegistryError> {
        self.snapshots
            .read()
            .get(&height)
            .map(|bytes| decode(bytes))
            .transpose()
    }
}

fn decode(bytes: &[u8]) -> Result<RegistrySnapshot, RegistryError> {
    serde_json::from_slice(bytes).map_err(|e| RegistryError::Storage(e.to_string()))
}

impl RegistryStore for InMemoryRegistryStore {
    fn persist(&self, height: u64, snapshot: &RegistrySnapshot) -> Result<(), RegistryError> {
        let bytes = serde_json::to_vec(snapshot).map_err(|e| RegistryError::Storage(e.to_string()))?;
        debug!(height, bytes = bytes.len(), "Persisting registry snapshot");
        self.snapshots.write().insert(height, bytes);
        Ok(())
    }

    fn load_latest(&self) -> Result<Option<(u64, RegistrySnapshot)>, RegistryError> {
        let guard = self.snapshots.read();
        match guard.iter().next_back() {
            Some((height, bytes)) => Ok(Some((*height, decode(bytes)?))),
            None => Ok(None),
        }
    }
}
