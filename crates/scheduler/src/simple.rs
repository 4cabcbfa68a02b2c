//  Simple scheduler: FIFO, run each process to completion.
//
//  quantum_for always returns the process's full remaining work, so
//  the scheduler itself never preempts - a process only leaves RUNNING
//  because it finishes or blocks on I/O.

use std::collections::VecDeque;

use process::ProcessRegistry;
use sim_rng::SimRng;

use crate::{require_ready, Scheduler, SchedulerError};

pub struct Simple {
    queue: VecDeque<u32>,
}

impl Simple {
    pub fn new() -> Self {
        Self { queue: VecDeque::new() }
    }
}

impl Default for Simple {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for Simple {
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

    fn quantum_for(&self, registry: &ProcessRegistry, pid: u32) -> u64 {
        registry.get(pid).map(|p| p.time_to_completion).unwrap_or(1)
    }

    fn has_work(&self) -> bool {
        !self.queue.is_empty()
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn name(&self) -> &'static str {
        "simple"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_rng::SimRng;

    #[test]
    fn fifo_order_is_preserved() {
        let mut reg = ProcessRegistry::new();
        let mut rng = SimRng::new(1);
        let a = reg.spawn(&mut rng, 0, 0.0, Some(5), None).unwrap();
        let b = reg.spawn(&mut rng, 0, 0.0, Some(5), None).unwrap();
        let mut sched = Simple::new();
        sched.admit(&reg, a, 0).unwrap();
        sched.admit(&reg, b, 0).unwrap();
        assert_eq!(sched.pick_next(&mut reg, 0, &mut rng).unwrap(), a);
        assert_eq!(sched.pick_next(&mut reg, 0, &mut rng).unwrap(), b);
    }

    #[test]
    fn quantum_equals_remaining_work() {
        let mut reg = ProcessRegistry::new();
        let mut rng = SimRng::new(1);
        let a = reg.spawn(&mut rng, 0, 0.0, Some(7), None).unwrap();
        let sched = Simple::new();
        assert_eq!(sched.quantum_for(&reg, a), 7);
    }

    #[test]
    fn empty_scheduler_has_no_work() {
        let sched = Simple::new();
        assert!(!sched.has_work());
    }

    #[test]
    fn pick_next_on_empty_fails_with_no_runnable() {
        let mut reg = ProcessRegistry::new();
        let mut rng = SimRng::new(1);
        let mut sched = Simple::new();
        assert_eq!(sched.pick_next(&mut reg, 0, &mut rng).unwrap_err(), SchedulerError::NoRunnable);
    }
}
