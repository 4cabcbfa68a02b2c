//  Segmented: a process's address space is divided equally into three
//  named segments - code, heap, stack - each independently allocated
//  from the underlying page pool. `retrieve` maps a flat virtual
//  address onto one of the three by dividing it by the per-segment
//  size.

use std::collections::HashMap;

use crate::{FirstFitPages, VmError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Code,
    Heap,
    Stack,
}

const SEGMENTS: [Segment; 3] = [Segment::Code, Segment::Heap, Segment::Stack];

pub struct Segmented {
    allocator: FirstFitPages,
    regions: HashMap<u32, HashMap<Segment, (usize, usize)>>,
}

impl Segmented {
    pub fn new(total_memory: usize) -> Self {
        Self { allocator: FirstFitPages::new(total_memory), regions: HashMap::new() }
    }

    /// Allocate `size` bytes for `pid`, split evenly across the three
    /// segments. `size` must be a multiple of both the page size and 3.
    pub fn allocate(&mut self, pid: u32, size: usize) -> Result<(), VmError> {
        if size % 3 != 0 {
            return Err(VmError::NotPageAligned(size, 3));
        }
        let per_segment = size / 3;

        let mut segments = HashMap::new();
        for segment in SEGMENTS {
            let base = self.allocator.allocate(per_segment)?;
            segments.insert(segment, (base, base + per_segment));
        }
        self.regions.insert(pid, segments);
        Ok(())
    }

    pub fn deallocate(&mut self, pid: u32) -> Result<(), VmError> {
        let segments = self.regions.remove(&pid).ok_or(VmError::NotAllocated(pid))?;
        for (base, bound) in segments.into_values() {
            self.allocator.deallocate(base, bound - base)?;
        }
        Ok(())
    }

    pub fn usage(&self, pid: u32) -> Result<&HashMap<Segment, (usize, usize)>, VmError> {
        self.regions.get(&pid).ok_or(VmError::NotAllocated(pid))
    }

    pub fn retrieve(&self, pid: u32, virtual_address: usize) -> Result<usize, VmError> {
        let segments = self.regions.get(&pid).ok_or(VmError::NotAllocated(pid))?;
        let total: usize = segments.values().map(|&(base, bound)| bound - base).sum();
        if virtual_address >= total {
            return Err(VmError::OutOfBounds(virtual_address, pid));
        }

        let per_segment = total / 3;
        let segment = SEGMENTS[virtual_address / per_segment];
        let (base, _) = segments[&segment];
        let offset = virtual_address % per_segment;
        Ok(base + offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retrieve_dispatches_by_segment_index() {
        let mut vm = Segmented::new(64);
        vm.allocate(1, 12).unwrap();
        let usage = vm.usage(1).unwrap();
        let (code_base, _) = usage[&Segment::Code];
        let (heap_base, _) = usage[&Segment::Heap];

        assert_eq!(vm.retrieve(1, 0).unwrap(), code_base);
        assert_eq!(vm.retrieve(1, 4).unwrap(), heap_base);
    }

    #[test]
    fn rejects_size_not_divisible_by_three_segments() {
        let mut vm = Segmented::new(64);
        let err = vm.allocate(1, 8).unwrap_err();
        assert!(matches!(err, VmError::NotPageAligned(8, 3)));
    }

    #[test]
    fn retrieve_rejects_address_past_total_space() {
        let mut vm = Segmented::new(64);
        vm.allocate(1, 12).unwrap();
        let err = vm.retrieve(1, 12).unwrap_err();
        assert_eq!(err, VmError::OutOfBounds(12, 1));
    }
}
