//! # Error Types
//!
//! Host/guest boundary errors.

use thiserror::Error;

/// Errors raised while moving bytes across the host/guest boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// `offset + len` exceeds guest memory. Fatal: never retried.
    #[error("Boundary fault: offset {offset} + len {len} exceeds memory size {size}")]
    BoundaryFault {
        /// Requested offset.
        offset: u32,
        /// Requested length.
        len: u32,
        /// Memory size at the time of access.
        size: u64,
    },

    /// The guest allocator has no room for the payload.
    #[error("Guest allocation of {requested} bytes failed: {reason}")]
    AllocationFailed {
        /// Bytes requested.
        requested: usize,
        /// Allocator message.
        reason: String,
    },

    /// Payload does not fit in a 32-bit length.
    #[error("Payload of {0} bytes exceeds the 32-bit length field")]
    PayloadTooLarge(usize),

    /// JSON envelope could not be encoded or decoded.
    #[error("Envelope encoding error: {0}")]
    Envelope(String),
}

impl MemoryError {
    /// Whether processing must halt. Only boundary faults are fatal.
    pub fn is_fatal(&self) -> bool {
        matches!(self, MemoryError::BoundaryFault { .. })
    }
}
