//  Page-granular first-fit bitmap allocator. Both `BaseAndBound` and
//  `Segmented` hand their size requests to one of these rather than
//  tracking free physical space themselves; the managers only care
//  about the (base, bound) pairs it hands back.

use crate::{VmError, PAGE_SIZE};

pub struct FirstFitPages {
    page_size: usize,
    blocks: Vec<bool>,
}

impl FirstFitPages {
    pub fn new(total_memory: usize) -> Self {
        Self::with_page_size(total_memory, PAGE_SIZE)
    }

    pub fn with_page_size(total_memory: usize, page_size: usize) -> Self {
        Self { page_size, blocks: vec![false; total_memory / page_size] }
    }

    /// Allocate `size` contiguous bytes, returning the base address.
    pub fn allocate(&mut self, size: usize) -> Result<usize, VmError> {
        if size % self.page_size != 0 {
            return Err(VmError::NotPageAligned(size, self.page_size));
        }
        let needed = size / self.page_size;

        let mut start = None;
        for i in 0..self.blocks.len() {
            if !self.blocks[i] {
                if start.is_none() {
                    start = Some(i);
                }
                if i - start.unwrap() + 1 == needed {
                    let base_block = start.unwrap();
                    for block in self.blocks.iter_mut().skip(base_block).take(needed) {
                        *block = true;
                    }
                    return Ok(base_block * self.page_size);
                }
            } else {
                start = None;
            }
        }
        Err(VmError::OutOfMemory(size))
    }

    pub fn deallocate(&mut self, start: usize, size: usize) -> Result<(), VmError> {
        if start % self.page_size != 0 || size % self.page_size != 0 {
            return Err(VmError::NotPageAligned(size, self.page_size));
        }
        let start_block = start / self.page_size;
        let count = size / self.page_size;
        for block in self.blocks.iter_mut().skip(start_block).take(count) {
            *block = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_returns_earliest_free_run() {
        let mut policy = FirstFitPages::with_page_size(64, 4);
        let a = policy.allocate(16).unwrap();
        assert_eq!(a, 0);
        let b = policy.allocate(8).unwrap();
        assert_eq!(b, 16);
    }

    #[test]
    fn deallocate_makes_blocks_available_again() {
        let mut policy = FirstFitPages::with_page_size(32, 4);
        let a = policy.allocate(16).unwrap();
        policy.deallocate(a, 16).unwrap();
        let b = policy.allocate(16).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_sizes_not_a_multiple_of_the_page_size() {
        let mut policy = FirstFitPages::with_page_size(32, 4);
        let err = policy.allocate(6).unwrap_err();
        assert!(matches!(err, VmError::NotPageAligned(6, 4)));
    }
}
