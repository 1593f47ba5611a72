//! # Marshaling
//!
//! Copy semantics only: bytes are copied out of, or into, guest memory and
//! the caller keeps ownership of its buffers.

use serde::{de::DeserializeOwned, Serialize};
use tracing::{trace, warn};

use crate::domain::{MemoryError, PackedPtr};
use crate::ports::{GuestAllocator, LinearMemory};

/// Reject any pointer whose end lies past the memory bound.
pub fn check_bounds(memory: &impl LinearMemory, ptr: PackedPtr) -> Result<(), MemoryError> {
    let size = memory.size();
    if ptr.end() > size {
        mc_telemetry::BOUNDARY_FAULTS.inc();
        warn!(
            offset = ptr.offset(),
            len = ptr.len(),
            size,
            "Packed pointer exceeds guest memory"
        );
        return Err(MemoryError::BoundaryFault {
            offset: ptr.offset(),
            len: ptr.len(),
            size,
        });
    }
    Ok(())
}

/// Copy the bytes a packed pointer refers to out of guest memory.
pub fn read_bytes(memory: &impl LinearMemory, ptr: PackedPtr) -> Result<Vec<u8>, MemoryError> {
    check_bounds(memory, ptr)?;
    trace!(offset = ptr.offset(), len = ptr.len(), "Reading guest buffer");
    memory.read(ptr.offset(), ptr.len())
}

/// Allocate guest memory, copy `bytes` in and return the packed pointer.
pub fn write_bytes<M>(memory: &mut M, bytes: &[u8]) -> Result<PackedPtr, MemoryError>
where
    M: LinearMemory + GuestAllocator,
{
    let len = u32::try_from(bytes.len()).map_err(|_| MemoryError::PayloadTooLarge(bytes.len()))?;
    let offset = memory.allocate(len)?;
    let ptr = PackedPtr::new(offset, len);
    check_bounds(&*memory, ptr)?;
    memory.write(offset, bytes)?;
    trace!(offset, len, "Wrote guest buffer");
    Ok(ptr)
}

/// Read a JSON envelope.
///
/// A boundary fault is returned as-is; malformed JSON is
/// [`MemoryError::Envelope`].
pub fn read_json<T: DeserializeOwned>(
    memory: &impl LinearMemory,
    ptr: PackedPtr,
) -> Result<T, MemoryError> {
    let bytes = read_bytes(memory, ptr)?;
    serde_json::from_slice(&bytes).map_err(|e| MemoryError::Envelope(e.to_string()))
}

/// Write a JSON envelope into freshly allocated guest memory.
pub fn write_json<M, T>(memory: &mut M, value: &T) -> Result<PackedPtr, MemoryError>
where
    M: LinearMemory + GuestAllocator,
    T: Serialize,
{
    let bytes = serde_json::to_vec(value).map_err(|e| MemoryError::Envelope(e.to_string()))?;
    write_bytes(memory, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::GuestMemory;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Envelope {
        to: String,
        amount: u64,
    }

    #[test]
    fn test_write_then_read_bytes() {
        let mut mem = GuestMemory::new(1, 1);
        let ptr = write_bytes(&mut mem, b"hello").unwrap();
        assert_eq!(ptr.len(), 5);
        assert_eq!(read_bytes(&mem, ptr).unwrap(), b"hello");
    }

    #[test]
    fn test_read_past_end_is_fatal() {
        let mem = GuestMemory::new(1, 1);
        let size = mem.size() as u32;
        let err = read_bytes(&mem, PackedPtr::new(size - 4, 8)).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_read_exactly_to_end_is_allowed() {
        let mem = GuestMemory::new(1, 1);
        let size = mem.size() as u32;
        assert_eq!(read_bytes(&mem, PackedPtr::new(size - 4, 4)).unwrap().len(), 4);
    }

    #[test]
    fn test_json_envelope_roundtrip() {
        let mut mem = GuestMemory::new(1, 2);
        let value = Envelope {
            to: "mythos1abc".into(),
            amount: 7,
        };
        let ptr = write_json(&mut mem, &value).unwrap();
        let back: Envelope = read_json(&mem, ptr).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_malformed_json_is_not_fatal() {
        let mut mem = GuestMemory::new(1, 1);
        let ptr = write_bytes(&mut mem, b"{not json").unwrap();
        let err = read_json::<Envelope>(&mem, ptr).unwrap_err();
        assert!(matches!(err, MemoryError::Envelope(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_caller_buffer_is_copied() {
        let mut mem = GuestMemory::new(1, 1);
        let mut buf = b"abc".to_vec();
        let ptr = write_bytes(&mut mem, &buf).unwrap();
        buf[0] = b'z';
        assert_eq!(read_bytes(&mem, ptr).unwrap(), b"abc");
    }
}
