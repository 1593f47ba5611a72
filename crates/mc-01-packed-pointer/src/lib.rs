//! # MC-01 Packed-Pointer Marshaling
//!
//! Byte-buffer transfer across the host/guest execution boundary.
//!
//! **Architecture:** Hexagonal (Domain + Ports/Adapters)
//!
//! ## Protocol
//!
//! Every host↔guest call moves one opaque buffer, usually a JSON envelope.
//! The buffer is described by a single 64-bit word:
//!
//! | Bits | Meaning |
//! |------|---------|
//! | 63..32 | offset into guest linear memory |
//! | 31..0 | length in bytes |
//!
//! The sender writes the payload and produces the word; the receiver unpacks
//! it and copies the bytes out. No ownership crosses the boundary and there
//! is no streaming. A pointer with `offset + len` past the memory bound is a
//! fatal boundary fault.
//!
//! ## Module Structure
//!
//! ```text
//! mc-01-packed-pointer/
//! ├── domain/          # PackedPtr, MemoryError
//! ├── ports/           # LinearMemory, GuestAllocator
//! ├── algorithms/      # read/write bytes and JSON envelopes
//! └── adapters/        # GuestMemory
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{GuestMemory, WASM_PAGE_SIZE};
pub use algorithms::{check_bounds, read_bytes, read_json, write_bytes, write_json};
pub use domain::{MemoryError, PackedPtr};
pub use ports::{GuestAllocator, LinearMemory};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    #[allow(clippy::const_is_empty)]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
