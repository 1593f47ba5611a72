//! # Value Objects
//!
//! The packed pointer: one 64-bit word carrying `(offset, len)`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A `(offset, len)` pair packed into a single 64-bit word.
///
/// High 32 bits hold the offset into guest linear memory, low 32 bits the
/// length in bytes. Guests see it as a Wasm `i64`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackedPtr(u64);

impl PackedPtr {
    /// The empty buffer at offset zero.
    pub const NULL: PackedPtr = PackedPtr(0);

    /// Pack an offset and a length.
    pub const fn new(offset: u32, len: u32) -> Self {
        Self(((offset as u64) << 32) | len as u64)
    }

    /// Reinterpret a raw word.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Reinterpret a Wasm `i64` argument.
    pub const fn from_i64(raw: i64) -> Self {
        Self(raw as u64)
    }

    /// Offset into guest memory.
    pub const fn offset(&self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Length in bytes.
    pub const fn len(&self) -> u32 {
        self.0 as u32
    }

    /// Whether the pointer describes zero bytes.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One past the last byte, computed without overflow.
    pub const fn end(&self) -> u64 {
        self.offset() as u64 + self.len() as u64
    }

    /// Raw word.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Value to hand back to the guest as a Wasm `i64`.
    pub const fn as_i64(&self) -> i64 {
        self.0 as i64
    }
}

impl fmt::Debug for PackedPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PackedPtr({}+{})", self.offset(), self.len())
    }
}

impl From<PackedPtr> for i64 {
    fn from(ptr: PackedPtr) -> Self {
        ptr.as_i64()
    }
}

impl From<i64> for PackedPtr {
    fn from(raw: i64) -> Self {
        PackedPtr::from_i64(raw)
    }
}
