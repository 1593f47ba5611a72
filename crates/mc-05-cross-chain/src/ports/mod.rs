//! # Ports Layer
//!
//! Inbound API of the coordinator and its outbound collaborators.

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
