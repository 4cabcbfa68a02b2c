//  Round-Robin scheduler: FIFO with a fixed quantum for every process.
//  The dispatcher re-admits a process at the tail after each run that
//  leaves work remaining.

use std::collections::VecDeque;

use process::ProcessRegistry;
use sim_rng::SimRng;

use crate::{require_ready, Scheduler, SchedulerError};

pub struct RoundRobin {
    quantum: u64,
    queue: VecDeque<u32>,
}

impl RoundRobin {
    pub fn new(quantum: u64) -> Self {
        Self { quantum, queue: VecDeque::new() }
    }
}

impl Default for RoundRobin {
    fn default() -> Self {
        Self::new(3)
    }
}

impl Scheduler for RoundRobin {
    fn admit(&mut self, registry: &ProcessRegistry, pid: u32, _now: u64) -> Result<(), SchedulerError> {
        require_ready(registry, pid)?;
        self.queue.push_back(pid);
        Ok(())
    }

    fn pick_next(
        &mut self,
        registry: &mut ProcessRegistry,
        _now: u64,
        _rng: &mut SimRng,
    ) -> Result<u32, SchedulerError> {
        while let Some(&pid) = self.queue.front() {
            if registry.is_live(pid) {
                break;
            }
            self.queue.pop_front();
        }
        self.queue.pop_front().ok_or(SchedulerError::NoRunnable)
    }

    fn quantum_for(&self, _registry: &ProcessRegistry, _pid: u32) -> u64 {
        self.quantum
    }

    fn has_work(&self) -> bool {
        !self.queue.is_empty()
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn name(&self) -> &'static str {
        "round-robin"
    }
}
