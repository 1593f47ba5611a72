//! # Outbound Ports
//!
//! What the marshaling layer needs from a guest instance.

use crate::domain::MemoryError;

/// Guest linear memory.
///
/// Implementations must bounds-check every access and report
/// [`MemoryError::BoundaryFault`] instead of panicking.
pub trait LinearMemory {
    /// Current size in bytes.
    fn size(&self) -> u64;

    /// Copy `len` bytes starting at `offset` out of guest memory.
    fn read(&self, offset: u32, len: u32) -> Result<Vec<u8>, MemoryError>;

    /// Copy `bytes` into guest memory starting at `offset`.
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), MemoryError>;
}

/// Guest-side allocator, the equivalent of an exported `allocate(len)`.
pub trait GuestAllocator {
    /// Reserve `len` bytes and return their offset.
    fn allocate(&mut self, len: u32) -> Result<u32, MemoryError>;
}
