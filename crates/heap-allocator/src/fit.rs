//  Fit-family allocator: a single free-list of `(start, size)` regions
//  kept sorted by start address, shared by first-fit, best-fit and
//  worst-fit. The three policies differ only in which candidate region
//  `malloc` picks; `free` and coalescing are identical across all
//  three.

use crate::{read_header, write_header, HeapAllocator, HeapError, HEADER_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    First,
    Best,
    Worst,
}

pub struct FitAllocator {
    policy: Fit,
    total_memory: usize,
    memory: Vec<u8>,
    free_list: Vec<(usize, usize)>,
}

impl FitAllocator {
    pub fn new(policy: Fit, total_memory: usize) -> Self {
        Self {
            policy,
            total_memory,
            memory: vec![0u8; total_memory],
            free_list: vec![(0, total_memory)],
        }
    }

    pub fn policy(&self) -> Fit {
        self.policy
    }

    /// Read-only view of the free list, sorted by start address.
    pub fn free_regions(&self) -> &[(usize, usize)] {
        &self.free_list
    }

    fn candidate(&self, total: usize) -> Option<usize> {
        match self.policy {
            Fit::First => {
                self.free_list.iter().position(|&(_, size)| size >= total)
            }
            Fit::Best => self
                .free_list
                .iter()
                .enumerate()
                .filter(|&(_, &(_, size))| size >= total)
                .min_by_key(|&(index, &(start, size))| (size, start, index))
                .map(|(index, _)| index),
            Fit::Worst => self
                .free_list
                .iter()
                .enumerate()
                .filter(|&(_, &(_, size))| size >= total)
                .max_by_key(|&(_, &(start, size))| (size, std::cmp::Reverse(start)))
                .map(|(index, _)| index),
        }
    }

    fn coalesce(&mut self) {
        self.free_list.sort_by_key(|&(start, _)| start);
        let mut merged: Vec<(usize, usize)> = Vec::with_capacity(self.free_list.len());
        for &(start, size) in &self.free_list {
            if let Some(&mut (last_start, ref mut last_size)) = merged.last_mut() {
                if last_start + *last_size == start {
                    *last_size += size;
                    continue;
                }
            }
            merged.push((start, size));
        }
        self.free_list = merged;
    }
}

impl HeapAllocator for FitAllocator {
    fn malloc(&mut self, n: usize) -> Result<usize, HeapError> {
        let total = n + HEADER_SIZE;
        let index = self.candidate(total).ok_or(HeapError::OutOfMemory(n))?;
        let (start, size) = self.free_list[index];

        write_header(&mut self.memory, start, total as u64);

        if size == total {
            self.free_list.remove(index);
        } else {
            self.free_list[index] = (start + total, size - total);
        }

        Ok(start + HEADER_SIZE)
    }

    fn free(&mut self, ptr: usize) -> Result<(), HeapError> {
        if ptr < HEADER_SIZE || ptr > self.total_memory {
            return Err(HeapError::InvalidPointer(ptr));
        }
        let block_start = ptr - HEADER_SIZE;
        let total = read_header(&self.memory, block_start) as usize;

        self.free_list.push((block_start, total));
        self.coalesce();
        Ok(())
    }

    fn total_memory(&self) -> usize {
        self.total_memory
    }
}
