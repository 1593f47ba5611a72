//! # MC-04 Contract Handler
//!
//! Calls system contracts by role instead of by address.
//!
//! **Architecture:** Hexagonal (Domain + Ports/Adapters)
//!
//! ## Purpose
//!
//! A chain binds well-known roles (`alias`, `bank`, ...) to contract
//! addresses in the subchain registry. Callers speak typed requests to a
//! role; the handler for that role owns the wire encoding.
//!
//! ## Call Path
//!
//! | Step | Failure |
//! |------|---------|
//! | Select handler by role | `no handler found` |
//! | Encode into `ExecutionMessage` | `encoding failed` |
//! | Resolve role on the chain | `role not registered` |
//! | Engine query / execute | `call failed` |
//! | Decode raw response | `decoding failed` |
//!
//! Every failure is a [`CoreContractCallError`].
//!
//! ## Module Structure
//!
//! ```text
//! mc-04-contract-handler/
//! ├── domain/          # typed requests/responses, ContractCall, errors
//! ├── handlers/        # AliasHandler, BankHandler, RoleHandler
//! ├── ports/           # ContractHandler, ContractEngine, RoleResolver
//! ├── adapters/        # InMemoryContractEngine, native contracts
//! └── service.rs       # ContractHandlerMap
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod handlers;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{InMemoryContractEngine, KvRequest, NativeContract};
pub use domain::{
    AliasRequest, AliasResponse, BankRequest, BankResponse, CallFailure, CodecError, ContractCall,
    CoreContractCallError, EngineError, ExecutionMessage, HandlerMessage, HandlerRequest,
    HandlerResponse, ROLE_ALIAS, ROLE_BANK, ROLE_MULTICHAIN_REGISTRY,
};
pub use handlers::{AliasHandler, BankHandler, RoleHandler};
pub use ports::{ContractEngine, ContractHandler, RoleResolver};
pub use service::ContractHandlerMap;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
