//! # Adapters Layer
//!
//! Concrete implementations of the outbound ports plus the in-flight table,
//! side channel and host bridge.

pub mod block_clock;
pub mod engine_router;
pub mod host_bridge;
pub mod in_flight_table;
pub mod non_deterministic;
pub mod side_channel;

pub use block_clock::{ChainHeights, FixedClock};
pub use engine_router::EngineRouter;
pub use host_bridge::{HostBridge, HostError};
pub use in_flight_table::{CallGuard, CallScope, CallSummary, InFlightTable, MarkerGuard};
pub use non_deterministic::InMemoryNonDeterministicDispatcher;
pub use side_channel::SideChannel;
