//  Multi-level feedback queue scheduler.
//
//  N priority levels, highest first. A process starts at level 0.
//  Each re-admission accumulates the work it consumed since its last
//  admission against its current level's quantum; once that reaches
//  the level's quantum the process is demoted one level (clamped at
//  the lowest). A per-process `last_boost` clock - not a global sweep -
//  lets `pick_next` restore any process waiting more than
//  `boost_threshold` ticks without a boost back to level 0. The
//  per-process clock (rather than a single global one) keeps boosting
//  deterministic regardless of arrival order.

use std::collections::{HashMap, VecDeque};

use process::ProcessRegistry;
use sim_rng::SimRng;

use crate::{require_ready, Scheduler, SchedulerError};

pub const DEFAULT_LEVELS: [u64; 3] = [3, 6, 12];
pub const DEFAULT_BOOST_THRESHOLD: u64 = 50;

pub struct Mlfq {
    levels: Vec<u64>,
    boost_threshold: u64,
    queues: Vec<VecDeque<u32>>,
    level: HashMap<u32, usize>,
    time_in_level: HashMap<u32, u64>,
    prev_cumulative: HashMap<u32, u64>,
    last_boost: HashMap<u32, u64>,
}

impl Mlfq {
    pub fn new(levels: Vec<u64>, boost_threshold: u64) -> Self {
        let n = levels.len();
        Self {
            levels,
            boost_threshold,
            queues: (0..n).map(|_| VecDeque::new()).collect(),
            level: HashMap::new(),
            time_in_level: HashMap::new(),
            prev_cumulative: HashMap::new(),
            last_boost: HashMap::new(),
        }
    }

    /// Current level of a known process (0 if never admitted).
    pub fn level_of(&self, pid: u32) -> usize {
        *self.level.get(&pid).unwrap_or(&0)
    }

    fn cleanup(&mut self, registry: &ProcessRegistry) {
        for queue in self.queues.iter_mut() {
            queue.retain(|&pid| registry.is_live(pid));
        }
        let stale: Vec<u32> =
            self.level.keys().copied().filter(|&pid| !registry.is_live(pid)).collect();
        for pid in stale {
            self.level.remove(&pid);
            self.time_in_level.remove(&pid);
            self.prev_cumulative.remove(&pid);
            self.last_boost.remove(&pid);
        }
    }

    fn auto_boost(&mut self, now: u64) {
        for level in 1..self.queues.len() {
            let mut i = 0;
            while i < self.queues[level].len() {
                let pid = self.queues[level][i];
                let last_boost = *self.last_boost.get(&pid).unwrap_or(&now);
                if now.saturating_sub(last_boost) >= self.boost_threshold {
                    self.queues[level].remove(i);
                    self.level.insert(pid, 0);
                    self.time_in_level.insert(pid, 0);
                    self.last_boost.insert(pid, now);
                    self.queues[0].push_back(pid);
                } else {
                    i += 1;
                }
            }
        }
    }
}

impl Default for Mlfq {
    fn default() -> Self {
        Self::new(DEFAULT_LEVELS.to_vec(), DEFAULT_BOOST_THRESHOLD)
    }
}

impl Scheduler for Mlfq {
    fn admit(&mut self, registry: &ProcessRegistry, pid: u32, now: u64) -> Result<(), SchedulerError> {
        require_ready(registry, pid)?;
        let cumulative = registry.get(pid).map(|p| p.cumulative_time_ran).unwrap_or(0);

        if !self.level.contains_key(&pid) {
            self.level.insert(pid, 0);
            self.time_in_level.insert(pid, 0);
            self.last_boost.insert(pid, now);
        } else {
            let delta = cumulative - self.prev_cumulative.get(&pid).copied().unwrap_or(cumulative);
            let current = self.level[&pid];
            let used = self.time_in_level.entry(pid).or_insert(0);
            *used += delta;
            if *used >= self.levels[current] {
                let lowest = self.levels.len() - 1;
                self.level.insert(pid, (current + 1).min(lowest));
                self.time_in_level.insert(pid, 0);
            }
        }

        self.prev_cumulative.insert(pid, cumulative);
        let level = self.level[&pid];
        self.queues[level].push_back(pid);
        Ok(())
    }

    fn pick_next(
        &mut self,
        registry: &mut ProcessRegistry,
        now: u64,
        _rng: &mut SimRng,
    ) -> Result<u32, SchedulerError> {
        self.cleanup(registry);
        self.auto_boost(now);
        for queue in self.queues.iter_mut() {
            if let Some(pid) = queue.pop_front() {
                return Ok(pid);
            }
        }
        Err(SchedulerError::NoRunnable)
    }

    fn quantum_for(&self, _registry: &ProcessRegistry, pid: u32) -> u64 {
        self.levels[self.level_of(pid)]
    }

    fn has_work(&self) -> bool {
        self.queues.iter().any(|q| !q.is_empty())
    }

    fn len(&self) -> usize {
        self.queues.iter().map(|q| q.len()).sum()
    }

    fn name(&self) -> &'static str {
        "mlfq"
    }
}
