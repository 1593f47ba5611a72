//! # Algorithms Module
//!
//! Chain id allocation and default configuration building.

pub mod chain_allocation;

pub use chain_allocation::*;
