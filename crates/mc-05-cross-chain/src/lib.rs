//! # MC-05 Cross-Chain Coordinator
//!
//! Lets a contract on one subchain call, query, or atomically execute a
//! contract on another.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Call State Machine
//!
//! ```text
//!            ┌──────────┐  dispatch   ┌────────────┐
//!            │ Pending  │────────────▶│ Dispatched │
//!            └──────────┘             └────────────┘
//!              │      │                 │    │    │
//!     refused  │      │ zero budget     │    │    │
//!              ▼      ▼                 ▼    ▼    ▼
//!        Rejected   TimedOut ◀──── Succeeded Failed
//! ```
//!
//! `Failed` and `TimedOut` cancel the call's token so nested work stops.
//!
//! ## Guarantees
//!
//! | Property | Mechanism |
//! |----------|-----------|
//! | One execution per `(target, tx hash)` | `MarkerGuard` (released on drop) |
//! | No call re-enters a waiting chain | `find_cycle` before any state change |
//! | No wall clock in consensus | block budget from the source chain's height |
//! | Chains in use cannot be removed | `InFlightTable` as `InFlightCalls` |
//! | Non-deterministic results never merge on their own | `SideChannel::take` |
//!
//! ## Module Structure
//!
//! ```text
//! mc-05-cross-chain/
//! ├── domain/          # envelopes, CallContext, CallState, config, errors
//! ├── algorithms/      # dependency cycles, block budgets
//! ├── ports/           # CrossChainApi, ChainRouter, BlockClock, dispatcher
//! ├── adapters/        # InFlightTable, EngineRouter, clocks, side channel,
//! │                    # host bridge
//! └── service.rs       # CrossChainCoordinator
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{
    CallGuard, CallScope, CallSummary, ChainHeights, EngineRouter, FixedClock, HostBridge,
    HostError, InFlightTable, InMemoryNonDeterministicDispatcher, MarkerGuard, SideChannel,
};
pub use algorithms::{block_budget, deadline_height, find_cycle, DependencyEdges};
pub use domain::{
    CallContext, CallId, CallKind, CallState, CrossChainCallRequest, CrossChainCallResponse,
    CrossChainConfig, CrossChainError, ExecutionMode, IsAtomicTxInExecutionRequest,
    IsAtomicTxInExecutionResponse, NonDeterministicTxResponse, StagedResult,
    DEFAULT_BLOCK_TIME_MS, DEFAULT_CROSS_CHAIN_TIMEOUT_MS, DEFAULT_MAX_CALL_DEPTH,
    DEFAULT_NON_DETERMINISTIC_TIMEOUT_MS, DEFAULT_SIDE_CHANNEL_CAPACITY,
};
pub use ports::{
    BlockClock, ChainRouter, CrossChainApi, NonDeterministicCrossChainApi,
    NonDeterministicDispatcher,
};
pub use service::CrossChainCoordinator;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
