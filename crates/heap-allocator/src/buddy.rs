//  Buddy allocator: the arena is split recursively into power-of-two
//  blocks. Free blocks are tracked per size class; a block's buddy is
//  always `addr XOR size`, so coalescing never needs to scan - it only
//  needs to check whether that one address happens to be free at the
//  same size class.

use std::collections::{HashMap, VecDeque};

use crate::{read_header, write_header, HeapAllocator, HeapError, HEADER_SIZE};

pub struct BuddyAllocator {
    total_memory: usize,
    memory: Vec<u8>,
    free_lists: HashMap<usize, VecDeque<usize>>,
}

impl BuddyAllocator {
    /// `total_memory` must be a power of two - the arena is carved by
    /// repeated halving, so any other size would leave a remainder no
    /// block could ever represent.
    pub fn new(total_memory: usize) -> Result<Self, HeapError> {
        if total_memory == 0 || !total_memory.is_power_of_two() {
            return Err(HeapError::NotPowerOfTwo(total_memory));
        }
        let mut free_lists = HashMap::new();
        free_lists.insert(total_memory, VecDeque::from([0usize]));
        Ok(Self { total_memory, memory: vec![0u8; total_memory], free_lists })
    }

    pub fn free_block_count(&self, size: usize) -> usize {
        self.free_lists.get(&size).map(VecDeque::len).unwrap_or(0)
    }

    fn next_power_of_two(x: usize) -> usize {
        x.next_power_of_two()
    }

    fn buddy_of(addr: usize, size: usize) -> usize {
        addr ^ size
    }
}

impl HeapAllocator for BuddyAllocator {
    fn malloc(&mut self, n: usize) -> Result<usize, HeapError> {
        let request = n + HEADER_SIZE;
        let block_size = Self::next_power_of_two(request);

        let mut candidate_size = block_size;
        let found_addr = loop {
            if candidate_size > self.total_memory {
                return Err(HeapError::OutOfMemory(n));
            }
            if let Some(addr) = self.free_lists.get_mut(&candidate_size).and_then(VecDeque::pop_front) {
                break addr;
            }
            candidate_size *= 2;
        };

        let mut remaining = candidate_size;
        let mut addr = found_addr;
        while remaining > block_size {
            remaining /= 2;
            let buddy_addr = addr + remaining;
            self.free_lists.entry(remaining).or_default().push_back(buddy_addr);
        }
        addr = found_addr;

        write_header(&mut self.memory, addr, block_size as u64);
        Ok(addr + HEADER_SIZE)
    }

    fn free(&mut self, ptr: usize) -> Result<(), HeapError> {
        if ptr < HEADER_SIZE || ptr > self.total_memory {
            return Err(HeapError::InvalidPointer(ptr));
        }
        let block_start = ptr - HEADER_SIZE;
        let mut size = read_header(&self.memory, block_start) as usize;
        let mut addr = block_start;

        loop {
            let buddy = Self::buddy_of(addr, size);
            let has_buddy = self.free_lists.get(&size).map(|q| q.contains(&buddy)).unwrap_or(false);
            if has_buddy {
                if let Some(list) = self.free_lists.get_mut(&size) {
                    if let Some(pos) = list.iter().position(|&a| a == buddy) {
                        list.remove(pos);
                    }
                }
                addr = addr.min(buddy);
                size *= 2;
            } else {
                break;
            }
        }

        self.free_lists.entry(size).or_default().push_back(addr);
        Ok(())
    }

    fn total_memory(&self) -> usize {
        self.total_memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_arena_that_is_not_a_power_of_two() {
        let err = BuddyAllocator::new(100).unwrap_err();
        assert_eq!(err, HeapError::NotPowerOfTwo(100));
    }

    #[test]
    fn malloc_rounds_request_up_to_next_power_of_two() {
        let mut alloc = BuddyAllocator::new(64).unwrap();
        // 8 payload bytes + 8 header = 16, already a power of two.
        let ptr = alloc.malloc(8).unwrap();
        assert_eq!(ptr, HEADER_SIZE);
        // splitting 64 down to a 16-byte block leaves buddies of size
        // 32 and 16 behind.
        assert_eq!(alloc.free_block_count(32), 1);
        assert_eq!(alloc.free_block_count(16), 1);
    }

    #[test]
    fn free_coalesces_all_the_way_back_to_the_full_arena() {
        let mut alloc = BuddyAllocator::new(64).unwrap();
        let a = alloc.malloc(8).unwrap();
        let b = alloc.malloc(8).unwrap();
        alloc.free(a).unwrap();
        alloc.free(b).unwrap();
        assert_eq!(alloc.free_block_count(64), 1);
        assert_eq!(alloc.free_block_count(32), 0);
        assert_eq!(alloc.free_block_count(16), 0);
    }

    #[test]
    fn non_adjacent_buddies_do_not_merge() {
        let mut alloc = BuddyAllocator::new(64).unwrap();
        let a = alloc.malloc(8).unwrap();
        let _b = alloc.malloc(8).unwrap();
        let c = alloc.malloc(8).unwrap();
        // a's buddy is b, which is still allocated, so freeing a
        // leaves it stranded at size 16. c's buddy is the untouched
        // split remainder left behind when c was carved out of the
        // 32-byte block, so freeing c merges it back up to 32.
        alloc.free(a).unwrap();
        alloc.free(c).unwrap();
        assert_eq!(alloc.free_block_count(16), 1);
        assert_eq!(alloc.free_block_count(32), 1);
    }

    #[test]
    fn malloc_fails_once_the_arena_is_exhausted() {
        let mut alloc = BuddyAllocator::new(32).unwrap();
        let _a = alloc.malloc(8).unwrap();
        let _b = alloc.malloc(8).unwrap();
        let err = alloc.malloc(8).unwrap_err();
        assert!(matches!(err, HeapError::OutOfMemory(8)));
    }
}
