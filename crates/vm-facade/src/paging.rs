//  Demand paging: a per-process page table of fixed-size entries,
//  backed by a small RAM frame pool and a simulated disk. A `retrieve`
//  against an entry that is not present triggers the page-fault path -
//  allocate a free frame, read the page's bytes from disk (zero-filled
//  on first touch), and install the frame number - before returning the
//  translated address. An entry that is not valid at all faults as a
//  segfault instead; paging in never helps there.

use std::collections::HashMap;

use crate::VmError;

pub const FRAME_SIZE: usize = 4;
pub const RAM_SIZE: usize = 1024;
pub const PAGE_SIZE: usize = 4;
pub const NUM_PAGES: usize = 256; // 1024 bytes of virtual space / 4-byte pages

#[derive(Debug, Clone, Copy)]
pub struct PageTableEntry {
    pub frame_number: Option<usize>,
    pub valid: bool,
    pub dirty: bool,
    pub present: bool,
    pub write_allowed: bool,
    pub user_mode_allowed: bool,
}

impl PageTableEntry {
    /// A fresh entry for a page that has not been mapped yet: valid
    /// (the process owns this page of its address space) but not yet
    /// backed by a frame.
    pub fn unmapped() -> Self {
        Self {
            frame_number: None,
            valid: true,
            dirty: false,
            present: false,
            write_allowed: true,
            user_mode_allowed: true,
        }
    }

    pub fn invalid() -> Self {
        Self {
            frame_number: None,
            valid: false,
            dirty: false,
            present: false,
            write_allowed: false,
            user_mode_allowed: false,
        }
    }
}

pub struct PageTable {
    entries: Vec<PageTableEntry>,
}

impl PageTable {
    pub fn new() -> Self {
        Self { entries: vec![PageTableEntry::unmapped(); NUM_PAGES] }
    }

    pub fn get(&self, page_number: usize) -> Result<&PageTableEntry, VmError> {
        self.entries.get(page_number).ok_or(VmError::InvalidPageNumber(page_number))
    }

    pub fn get_mut(&mut self, page_number: usize) -> Result<&mut PageTableEntry, VmError> {
        self.entries.get_mut(page_number).ok_or(VmError::InvalidPageNumber(page_number))
    }

    pub fn set(&mut self, page_number: usize, entry: PageTableEntry) -> Result<(), VmError> {
        *self.get_mut(page_number)? = entry;
        Ok(())
    }
}

impl Default for PageTable {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct Frame {
    pub frame_number: usize,
    pub data: [u8; FRAME_SIZE],
    pub owner_pid: Option<u32>,
}

impl Frame {
    fn new(frame_number: usize) -> Self {
        Self { frame_number, data: [0u8; FRAME_SIZE], owner_pid: None }
    }
}

pub struct Ram {
    frames: Vec<Frame>,
}

impl Ram {
    pub fn new(size: usize) -> Self {
        let num_frames = size / FRAME_SIZE;
        Self { frames: (0..num_frames).map(Frame::new).collect() }
    }

    fn allocate_free_frame(&mut self, pid: u32) -> Result<usize, VmError> {
        let frame = self.frames.iter_mut().find(|f| f.owner_pid.is_none()).ok_or(VmError::NoFreeFrames)?;
        frame.owner_pid = Some(pid);
        Ok(frame.frame_number)
    }

    pub fn get(&self, frame_number: usize) -> Result<&Frame, VmError> {
        self.frames.get(frame_number).ok_or(VmError::InvalidPageNumber(frame_number))
    }

    pub fn get_mut(&mut self, frame_number: usize) -> Result<&mut Frame, VmError> {
        self.frames.get_mut(frame_number).ok_or(VmError::InvalidPageNumber(frame_number))
    }

    pub fn free(&mut self, frame_number: usize) -> Result<(), VmError> {
        let frame = self.get_mut(frame_number)?;
        frame.owner_pid = None;
        frame.data = [0u8; FRAME_SIZE];
        Ok(())
    }
}

impl Default for Ram {
    fn default() -> Self {
        Self::new(RAM_SIZE)
    }
}

/// Simulated backing store: a page of a process's address space that
/// has never been touched reads back as zeros.
pub struct Disk {
    pages: HashMap<(u32, usize), [u8; PAGE_SIZE]>,
}

impl Disk {
    pub fn new() -> Self {
        Self { pages: HashMap::new() }
    }

    pub fn read_page(&mut self, pid: u32, page_number: usize) -> [u8; PAGE_SIZE] {
        *self.pages.entry((pid, page_number)).or_insert([0u8; PAGE_SIZE])
    }

    pub fn write_page(&mut self, pid: u32, page_number: usize, data: [u8; PAGE_SIZE]) {
        self.pages.insert((pid, page_number), data);
    }
}

impl Default for Disk {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-process page tables, one shared RAM pool and one shared disk.
pub struct Paging {
    page_tables: HashMap<u32, PageTable>,
    ram: Ram,
    disk: Disk,
}

impl Paging {
    pub fn new() -> Self {
        Self { page_tables: HashMap::new(), ram: Ram::default(), disk: Disk::new() }
    }

    pub fn register_process(&mut self, pid: u32) {
        self.page_tables.entry(pid).or_insert_with(PageTable::new);
    }

    /// Mark a page invalid (outside the process's address space) so
    /// future access to it faults as a segfault rather than paging in.
    pub fn invalidate(&mut self, pid: u32, page_number: usize) -> Result<(), VmError> {
        let table = self.page_tables.entry(pid).or_insert_with(PageTable::new);
        table.set(page_number, PageTableEntry::invalid())
    }

    /// Translate a virtual address for `pid`, paging the containing
    /// page in from disk if it is not yet present.
    pub fn retrieve(&mut self, pid: u32, virtual_address: usize) -> Result<u8, VmError> {
        let page_number = virtual_address / PAGE_SIZE;
        let offset = virtual_address % PAGE_SIZE;

        let table = self.page_tables.entry(pid).or_insert_with(PageTable::new);
        if !table.get(page_number)?.valid {
            return Err(VmError::Segfault(page_number));
        }

        if !table.get(page_number)?.present {
            let frame_number = self.ram.allocate_free_frame(pid)?;
            let data = self.disk.read_page(pid, page_number);
            let frame = self.ram.get_mut(frame_number)?;
            frame.data = data;

            let table = self.page_tables.get_mut(&pid).expect("registered above");
            let entry = table.get_mut(page_number)?;
            entry.frame_number = Some(frame_number);
            entry.present = true;
        }

        let table = self.page_tables.get(&pid).expect("registered above");
        let frame_number = table.get(page_number)?.frame_number.expect("present entries have a frame");
        Ok(self.ram.get(frame_number)?.data[offset])
    }
}

impl Default for Paging {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_touch_of_a_page_reads_as_zero() {
        let mut vm = Paging::new();
        vm.register_process(1);
        assert_eq!(vm.retrieve(1, 0).unwrap(), 0);
    }

    #[test]
    fn retrieve_installs_a_frame_on_first_access() {
        let mut vm = Paging::new();
        vm.register_process(1);
        vm.retrieve(1, 0).unwrap();
        let table = &vm.page_tables[&1];
        let entry = table.get(0).unwrap();
        assert!(entry.present);
        assert!(entry.frame_number.is_some());
    }

    #[test]
    fn invalid_page_faults_as_segfault() {
        let mut vm = Paging::new();
        vm.register_process(1);
        vm.invalidate(1, 3).unwrap();
        let err = vm.retrieve(1, 3 * PAGE_SIZE).unwrap_err();
        assert_eq!(err, VmError::Segfault(3));
    }

    #[test]
    fn runs_out_of_frames_once_ram_is_exhausted() {
        // One process pages in every frame in RAM (exactly as many
        // virtual pages as physical frames exist); a second process
        // then has no frame left for even its very first page.
        let mut vm = Paging::new();
        vm.register_process(1);
        vm.register_process(2);
        let total_frames = RAM_SIZE / FRAME_SIZE;
        for page in 0..total_frames {
            vm.retrieve(1, page * PAGE_SIZE).unwrap();
        }
        let err = vm.retrieve(2, 0).unwrap_err();
        assert_eq!(err, VmError::NoFreeFrames);
    }
}
