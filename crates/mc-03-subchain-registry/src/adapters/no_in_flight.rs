//! Placeholder call table for registries that are not wired to a coordinator.

use shared_types::ChainId;

use crate::ports::InFlightCalls;

/// Reports no in-flight calls, ever.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInFlightCalls;

impl InFlightCalls for NoInFlightCalls {
    fn is_chain_in_flight(&self, _chain_id: &ChainId) -> bool {
        false
    }
}
