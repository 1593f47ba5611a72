//! # Algorithms
//!
//! Dependency-cycle detection and block-budget timeouts.

pub mod dependency_graph;
pub mod timeout_budget;

pub use dependency_graph::{find_cycle, DependencyEdges};
pub use timeout_budget::{block_budget, deadline_height};
