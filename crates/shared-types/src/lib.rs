//! # Shared Types Crate
//!
//! Primitives shared by every multichain subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: chain identifiers, coins and transaction
//!   hashes are defined once, here.
//! - **Validated on construction**: a [`ChainId`] can only exist in its
//!   canonical `<name>_<numeric-id>-<revision>` form (an optional level
//!   segment `<name>_<level>_<numeric-id>-<revision>` is also accepted).
//! - **Per-chain namespacing**: storage keys are derived with
//!   [`ChainId::store_key`].

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
