//  I/O completion queue: a single shared device serving WAITING
//  processes first-come-first-served. `park` draws a service time and
//  schedules a completion tick; `drain` returns whoever has crossed
//  their completion tick, in the order they were parked. `next_free_tick`
//  is the watermark that keeps service serialised - a process cannot
//  start before the device has finished whatever it parked before it.

use std::collections::VecDeque;

use process::{ProcessRegistry, ProcessState};
use sim_rng::SimRng;
use thiserror::Error;

pub const MIN_SERVICE_TIME: u64 = 2;
pub const MAX_SERVICE_TIME: u64 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IoError {
    #[error("process {0} cannot be parked for I/O because it is not WAITING")]
    NotWaiting(u32),
}

struct WaitEntry {
    pid: u32,
    completion_tick: u64,
}

/// FCFS single-server I/O queue.
pub struct IoManager {
    wait: VecDeque<WaitEntry>,
    next_free_tick: u64,
}

impl IoManager {
    pub fn new() -> Self {
        Self { wait: VecDeque::new(), next_free_tick: 0 }
    }

    /// Park a WAITING process until a simulated I/O completes.
    /// `now` is the dispatcher's current clock; the resulting
    /// completion tick is serialised behind any I/O parked earlier.
    pub fn park(
        &mut self,
        registry: &ProcessRegistry,
        rng: &mut SimRng,
        pid: u32,
        now: u64,
    ) -> Result<u64, IoError> {
        match registry.get(pid) {
            Some(p) if p.state == ProcessState::Waiting => {}
            _ => return Err(IoError::NotWaiting(pid)),
        }

        let service_time = rng.range_u64(MIN_SERVICE_TIME, MAX_SERVICE_TIME);
        let start = now.max(self.next_free_tick);
        let completion_tick = start + service_time;

        self.wait.push_back(WaitEntry { pid, completion_tick });
        self.next_free_tick = completion_tick;
        Ok(completion_tick)
    }

    /// Return every pid whose I/O has completed by `now`, transitioning
    /// each to READY, in the order they were parked.
    pub fn drain(&mut self, registry: &mut ProcessRegistry, now: u64) -> Vec<u32> {
        let mut ready = Vec::new();
        let mut still_waiting = VecDeque::with_capacity(self.wait.len());
        while let Some(entry) = self.wait.pop_front() {
            if now >= entry.completion_tick && registry.is_live(entry.pid) {
                let _ = registry.set_state(entry.pid, ProcessState::Ready);
                ready.push(entry.pid);
            } else if now >= entry.completion_tick {
                // pid no longer live - drop it silently rather than
                // resurrecting a process the registry already removed.
            } else {
                still_waiting.push_back(entry);
            }
        }
        self.wait = still_waiting;
        ready
    }

    pub fn pending_count(&self) -> usize {
        self.wait.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wait.is_empty()
    }

    pub fn next_free_tick(&self) -> u64 {
        self.next_free_tick
    }
}

impl Default for IoManager {
    fn default() -> Self {
        Self::new()
    }
}
