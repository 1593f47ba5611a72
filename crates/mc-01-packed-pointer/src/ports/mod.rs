//! # Ports Module
//!
//! Guest memory as seen from the host.

pub mod outbound;

pub use outbound::*;
