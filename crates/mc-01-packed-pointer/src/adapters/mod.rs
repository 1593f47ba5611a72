//! # Adapters Layer
//!
//! In-process guest memory implementing the outbound ports.

mod guest_memory;

pub use guest_memory::{GuestMemory, WASM_PAGE_SIZE};
