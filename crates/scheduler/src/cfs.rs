//  Completely-Fair-Scheduler-like scheduler.
//
//  Every ready process is keyed by `(vruntime, pid)` in an ordered set,
//  so `pick_next` is always "the smallest key". A newly admitted
//  process is never given less vruntime than whatever is currently
//  smallest in the tree, so it cannot starve processes that have been
//  waiting. `quantum_for` is computed with the tree size *after* the
//  picked process has already been removed - the dispatcher calls it
//  right after `pick_next` returns, by which point the tree no longer
//  contains that pid.

use std::collections::{BTreeSet, HashMap};

use process::ProcessRegistry;
use sim_rng::SimRng;

use crate::{require_ready, Scheduler, SchedulerError};

pub const DEFAULT_BASE_QUANTUM: u64 = 10;
pub const DEFAULT_MIN_QUANTUM: u64 = 2;

pub struct Cfs {
    base_quantum: u64,
    min_quantum: u64,
    tree: BTreeSet<(u64, u32)>,
    vruntime: HashMap<u32, u64>,
}

impl Cfs {
    pub fn new(base_quantum: u64, min_quantum: u64) -> Self {
        Self { base_quantum, min_quantum, tree: BTreeSet::new(), vruntime: HashMap::new() }
    }

    pub fn vruntime_of(&self, pid: u32) -> Option<u64> {
        self.vruntime.get(&pid).copied()
    }

    fn cleanup(&mut self, registry: &ProcessRegistry) {
        self.tree.retain(|&(_, pid)| registry.is_live(pid));
        self.vruntime.retain(|&pid, _| registry.is_live(pid));
    }
}

impl Default for Cfs {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_QUANTUM, DEFAULT_MIN_QUANTUM)
    }
}

impl Scheduler for Cfs {
    fn admit(&mut self, registry: &ProcessRegistry, pid: u32, _now: u64) -> Result<(), SchedulerError> {
        require_ready(registry, pid)?;
        let cumulative = registry.get(pid).map(|p| p.cumulative_time_ran).unwrap_or(0);

        let vruntime = match self.tree.iter().next() {
            Some(&(min_vruntime, _)) => cumulative.max(min_vruntime),
            None => cumulative,
        };
        self.vruntime.insert(pid, vruntime);
        self.tree.insert((vruntime, pid));
        Ok(())
    }

    fn pick_next(
        &mut self,
        registry: &mut ProcessRegistry,
        _now: u64,
        _rng: &mut SimRng,
    ) -> Result<u32, SchedulerError> {
        self.cleanup(registry);
        let &(vruntime, pid) = self.tree.iter().next().ok_or(SchedulerError::NoRunnable)?;
        self.tree.remove(&(vruntime, pid));
        self.vruntime.remove(&pid);
        Ok(pid)
    }

    fn quantum_for(&self, _registry: &ProcessRegistry, _pid: u32) -> u64 {
        let n = self.tree.len() as u64;
        (self.base_quantum / (n + 1)).max(self.min_quantum)
    }

    fn has_work(&self) -> bool {
        !self.tree.is_empty()
    }

    fn len(&self) -> usize {
        self.tree.len()
    }

    fn name(&self) -> &'static str {
        "cfs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_rng::SimRng;

    #[test]
    fn pick_next_always_returns_minimum_vruntime() {
        let mut reg = ProcessRegistry::new();
        let mut rng = SimRng::new(1);
        let a = reg.spawn(&mut rng, 0, 0.0, Some(5), None).unwrap();
        let b = reg.spawn(&mut rng, 0, 0.0, Some(5), None).unwrap();
        reg.get_mut(a).unwrap().cumulative_time_ran = 10;
        reg.get_mut(b).unwrap().cumulative_time_ran = 2;

        let mut sched = Cfs::default();
        sched.admit(&reg, a, 0).unwrap();
        sched.admit(&reg, b, 0).unwrap();

        assert_eq!(sched.pick_next(&mut reg, 0, &mut rng).unwrap(), b);
    }

    #[test]
    fn new_process_never_starves_an_already_waiting_one() {
        let mut reg = ProcessRegistry::new();
        let mut rng = SimRng::new(1);
        let old = reg.spawn(&mut rng, 0, 0.0, Some(5), None).unwrap();
        reg.get_mut(old).unwrap().cumulative_time_ran = 0;

        let mut sched = Cfs::default();
        sched.admit(&reg, old, 0).unwrap();

        // A fresh process arrives with a huge head start in cumulative
        // runtime -- it must still not be picked before `old`.
        let newcomer = reg.spawn(&mut rng, 0, 0.0, Some(5), None).unwrap();
        reg.get_mut(newcomer).unwrap().cumulative_time_ran = 1_000_000;
        sched.admit(&reg, newcomer, 0).unwrap();

        assert_eq!(sched.pick_next(&mut reg, 0, &mut rng).unwrap(), old);
    }

    #[test]
    fn quantum_shrinks_as_more_processes_are_ready() {
        let mut reg = ProcessRegistry::new();
        let mut rng = SimRng::new(1);
        let mut sched = Cfs::new(10, 2);
        let a = reg.spawn(&mut rng, 0, 0.0, Some(5), None).unwrap();
        sched.admit(&reg, a, 0).unwrap();
        let solo_pid = sched.pick_next(&mut reg, 0, &mut rng).unwrap();
        let solo_quantum = sched.quantum_for(&reg, solo_pid);
        assert_eq!(solo_quantum, 10 / 1); // tree is empty after removal: n=0

        sched.admit(&reg, a, 0).unwrap();
        let b = reg.spawn(&mut rng, 0, 0.0, Some(5), None).unwrap();
        sched.admit(&reg, b, 0).unwrap();
        let picked = sched.pick_next(&mut reg, 0, &mut rng).unwrap();
        let crowded_quantum = sched.quantum_for(&reg, picked);
        assert_eq!(crowded_quantum, 10 / 2); // one process remains: n=1
        assert!(crowded_quantum <= solo_quantum);
    }
}
