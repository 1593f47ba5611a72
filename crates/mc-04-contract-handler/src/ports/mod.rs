//! # Ports Module
//!
//! Handler capability (inbound) and engine / role resolution (outbound).

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
