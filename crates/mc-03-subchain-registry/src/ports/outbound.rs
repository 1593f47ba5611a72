//! # Outbound Ports
//!
//! What the registry needs from the rest of the node.

use shared_types::ChainId;

use crate::domain::{RegistryError, RegistrySnapshot};

/// Visibility into cross-chain calls currently in flight.
///
/// Implemented by the cross-chain coordinator's call table. Removal asks
/// this before deleting a chain, so a chain cannot vanish mid-call.
pub trait InFlightCalls: Send + Sync {
    /// Whether any in-flight call (marker or call-table entry) references
    /// `chain_id`.
    fn is_chain_in_flight(&self, chain_id: &ChainId) -> bool;
}

/// Per-block registry persistence.
pub trait RegistryStore: Send + Sync {
    /// Store the snapshot committed at `height`.
    fn persist(&self, height: u64, snapshot: &RegistrySnapshot) -> Result<(), RegistryError>;

    /// Most recent snapshot and its height, if any.
    fn load_latest(&self) -> Result<Option<(u64, RegistrySnapshot)>, RegistryError>;
}
