//! Vec-backed guest memory with a bump allocator.
//!
//! Memory grows a page at a time up to `max_pages`, the way a Wasm instance
//! would on `memory.grow`.

use crate::domain::MemoryError;
use crate::ports::{GuestAllocator, LinearMemory};

/// Wasm page size.
pub const WASM_PAGE_SIZE: usize = 64 * 1024;

/// In-process guest memory.
#[derive(Debug, Clone)]
pub struct GuestMemory {
    bytes: Vec<u8>,
    next_free: usize,
    max_pages: usize,
}

impl GuestMemory {
    /// Memory with `initial_pages` committed and room to grow to `max_pages`.
    pub fn new(initial_pages: usize, max_pages: usize) -> Self {
        let max_pages = max_pages.max(initial_pages);
        Self {
            bytes: vec![0; initial_pages * WASM_PAGE_SIZE],
            // Offset 0 stays reserved so a valid allocation is never NULL.
            next_free: 8,
            max_pages,
        }
    }

    /// Pages currently committed.
    pub fn pages(&self) -> usize {
        self.bytes.len() / WASM_PAGE_SIZE
    }

    /// Drop all allocations. Called between host calls.
    pub fn reset(&mut self) {
        self.next_free = 8;
    }

    fn grow_to(&mut self, needed: usize) -> Result<(), MemoryError> {
        if needed <= self.bytes.len() {
            return Ok(());
        }
        let pages = needed.div_ceil(WASM_PAGE_SIZE);
        if pages > self.max_pages {
            return Err(MemoryError::AllocationFailed {
                requested: needed - self.next_free,
                reason: format!("would need {pages} pages, max is {}", self.max_pages),
            });
        }
        self.bytes.resize(pages * WASM_PAGE_SIZE, 0);
        Ok(())
    }
}

impl LinearMemory for GuestMemory {
    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn read(&self, offset: u32, len: u32) -> Result<Vec<u8>, MemoryError> {
        let start = offset as usize;
        let end = start + len as usize;
        self.bytes
            .get(start..end)
            .map(<[u8]>::to_vec)
            .ok_or(MemoryError::BoundaryFault {
                offset,
                len,
                size: self.size(),
            })
    }

    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), MemoryError> {
        let size = self.size();
        let start = offset as usize;
        let end = start + bytes.len();
        let slot = self
            .bytes
            .get_mut(start..end)
            .ok_or(MemoryError::BoundaryFault {
                offset,
                len: bytes.len() as u32,
                size,
            })?;
        slot.copy_from_slice(bytes);
        Ok(())
    }
}

impl GuestAllocator for GuestMemory {
    fn allocate(&mut self, len: u32) -> Result<u32, MemoryError> {
        // 8-byte alignment
        let start = (self.next_free + 7) & !7;
        let end = start + len as usize;
        self.grow_to(end)?;
        let offset = u32::try_from(start).map_err(|_| MemoryError::AllocationFailed {
            requested: len as usize,
            reason: "offset exceeds 32 bits".to_string(),
        })?;
        self.next_free = end;
        Ok(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocations_do_not_overlap() {
        let mut mem = GuestMemory::new(1, 1);
        let a = mem.allocate(10).unwrap();
        let b = mem.allocate(10).unwrap();
        assert!(b >= a + 10);
        assert_eq!(b % 8, 0);
    }

    #[test]
    fn test_grows_until_max_pages() {
        let mut mem = GuestMemory::new(1, 2);
        mem.allocate(WASM_PAGE_SIZE as u32).unwrap();
        assert_eq!(mem.pages(), 2);
        let err = mem.allocate(WASM_PAGE_SIZE as u32).unwrap_err();
        assert!(matches!(err, MemoryError::AllocationFailed { .. }));
    }

    #[test]
    fn test_out_of_range_write_faults() {
        let mut mem = GuestMemory::new(1, 1);
        let err = mem.write(WASM_PAGE_SIZE as u32 - 1, b"ab").unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_reset_reuses_space() {
        let mut mem = GuestMemory::new(1, 1);
        let first = mem.allocate(16).unwrap();
        mem.reset();
        assert_eq!(mem.allocate(16).unwrap(), first);
    }
}
