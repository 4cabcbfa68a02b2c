//  Virtual-memory façade: three address-translation schemes of
//  increasing sophistication, all answering the same question -
//  "given a process and a virtual address, what physical byte does
//  that address name?" None of this is wired into the dispatcher; it
//  exists as a self-contained set of managers a caller can exercise
//  directly. A process is addressed here by its bare `pid: u32`, the
//  same convention the scheduler family uses.

use thiserror::Error;

pub mod allocation_policy;
pub mod base_and_bound;
pub mod paging;
pub mod segmented;

pub use allocation_policy::FirstFitPages;
pub use base_and_bound::BaseAndBound;
pub use paging::{Disk, Frame, PageTable, PageTableEntry, Paging, Ram};
pub use segmented::{Segment, Segmented};

pub const PAGE_SIZE: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VmError {
    #[error("process {0} already has memory allocated")]
    AlreadyAllocated(u32),
    #[error("process {0} has no memory allocated")]
    NotAllocated(u32),
    #[error("size {0} must be a multiple of the page size ({1})")]
    NotPageAligned(usize, usize),
    #[error("not enough contiguous pages available for a request of {0} bytes")]
    OutOfMemory(usize),
    #[error("virtual address {0} is out of bounds for process {1}")]
    OutOfBounds(usize, u32),
    #[error("page table entry for page {0} is not valid")]
    Segfault(usize),
    #[error("no free RAM frame is available")]
    NoFreeFrames,
    #[error("page number {0} is out of range for this page table")]
    InvalidPageNumber(usize),
}
