//  Heap allocator family over a fixed byte arena.
//
//  Every allocator here writes an 8-byte little-endian header
//  immediately before the payload it returns a pointer to, recording
//  the block's total size (header + payload). `malloc` returns the
//  address just past that header; `free` reads it back to recover how
//  much to return. The union of allocated blocks and tracked free
//  regions always equals the whole arena - nothing is ever lost or
//  double-counted between the two families' different free-list
//  representations.

use thiserror::Error;

pub mod buddy;
pub mod fit;

pub use buddy::BuddyAllocator;
pub use fit::{Fit, FitAllocator};

pub const HEADER_SIZE: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeapError {
    #[error("not enough contiguous memory available for a request of {0} bytes")]
    OutOfMemory(usize),
    #[error("pointer {0} was not returned by a prior malloc on this allocator")]
    InvalidPointer(usize),
    #[error("buddy allocator requires a power-of-two arena, got {0}")]
    NotPowerOfTwo(usize),
}

/// Shared by every allocator in this crate.
pub trait HeapAllocator {
    /// Allocate `n` payload bytes, returning a pointer past the header.
    fn malloc(&mut self, n: usize) -> Result<usize, HeapError>;

    /// Release the block previously returned by `malloc`.
    fn free(&mut self, ptr: usize) -> Result<(), HeapError>;

    fn total_memory(&self) -> usize;
}

fn read_header(memory: &[u8], block_start: usize) -> u64 {
    let mut bytes = [0u8; HEADER_SIZE];
    bytes.copy_from_slice(&memory[block_start..block_start + HEADER_SIZE]);
    u64::from_le_bytes(bytes)
}

fn write_header(memory: &mut [u8], block_start: usize, total_size: u64) {
    memory[block_start..block_start + HEADER_SIZE].copy_from_slice(&total_size.to_le_bytes());
}
