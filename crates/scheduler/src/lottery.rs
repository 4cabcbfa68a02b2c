//  Lottery scheduler: each admitted process holds a number of tickets;
//  `pick_next` draws a winning ticket uniformly from the pool and
//  returns whichever process holds it. Iteration is over insertion
//  order so that, given a seeded draw, the winner is fully
//  deterministic and the scheduler is testable.

use std::collections::HashMap;

use process::ProcessRegistry;
use sim_rng::SimRng;

use crate::{require_ready, Scheduler, SchedulerError};

pub const DEFAULT_TICKETS: u64 = 10;

pub struct Lottery {
    default_quantum: u64,
    order: Vec<u32>,
    tickets: HashMap<u32, u64>,
    total_tickets: u64,
}

impl Lottery {
    pub fn new(default_quantum: u64) -> Self {
        Self {
            default_quantum,
            order: Vec::new(),
            tickets: HashMap::new(),
            total_tickets: 0,
        }
    }

    /// Admit with an explicit ticket count instead of `DEFAULT_TICKETS`.
    pub fn admit_with_tickets(
        &mut self,
        registry: &ProcessRegistry,
        pid: u32,
        tickets: u64,
    ) -> Result<(), SchedulerError> {
        require_ready(registry, pid)?;
        self.order.push(pid);
        self.tickets.insert(pid, tickets);
        self.total_tickets += tickets;
        Ok(())
    }

    pub fn tickets_for(&self, pid: u32) -> u64 {
        self.tickets.get(&pid).copied().unwrap_or(0)
    }

    pub fn total_tickets(&self) -> u64 {
        self.total_tickets
    }

    fn cleanup(&mut self, registry: &ProcessRegistry) {
        let mut i = 0;
        while i < self.order.len() {
            let pid = self.order[i];
            if !registry.is_live(pid) {
                self.order.remove(i);
                if let Some(t) = self.tickets.remove(&pid) {
                    self.total_tickets -= t;
                }
            } else {
                i += 1;
            }
        }
    }
}

impl Scheduler for Lottery {
    fn admit(&mut self, registry: &ProcessRegistry, pid: u32, _now: u64) -> Result<(), SchedulerError> {
        self.admit_with_tickets(registry, pid, DEFAULT_TICKETS)
    }

    fn pick_next(
        &mut self,
        registry: &mut ProcessRegistry,
        _now: u64,
        rng: &mut SimRng,
    ) -> Result<u32, SchedulerError> {
        self.cleanup(registry);
        if self.order.is_empty() {
            return Err(SchedulerError::NoRunnable);
        }

        let winning_ticket = rng.range_u64(1, self.total_tickets);
        let mut running_sum = 0;
        for &pid in &self.order {
            running_sum += self.tickets[&pid];
            if winning_ticket <= running_sum {
                self.order.retain(|&p| p != pid);
                let t = self.tickets.remove(&pid).unwrap();
                self.total_tickets -= t;
                return Ok(pid);
            }
        }
        // Every ticket is accounted for in the loop above, so this is
        // unreachable as long as total_tickets matches the sum of the
        // per-pid entries.
        Err(SchedulerError::NoRunnable)
    }

    fn quantum_for(&self, _registry: &ProcessRegistry, _pid: u32) -> u64 {
        self.default_quantum
    }

    fn has_work(&self) -> bool {
        !self.order.is_empty()
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn name(&self) -> &'static str {
        "lottery"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winner_is_removed_and_tickets_subtracted() {
        let mut reg = ProcessRegistry::new();
        let mut rng = SimRng::new(1);
        let a = reg.spawn(&mut rng, 0, 0.0, Some(5), None).unwrap();
        let mut sched = Lottery::new(5);
        sched.admit(&reg, a, 0).unwrap();
        assert_eq!(sched.total_tickets(), DEFAULT_TICKETS);

        let winner = sched.pick_next(&mut reg, 0, &mut rng).unwrap();
        assert_eq!(winner, a);
        assert_eq!(sched.total_tickets(), 0);
        assert!(!sched.has_work());
    }

    #[test]
    fn empirical_win_frequency_converges_to_ticket_share() {
        let mut reg = ProcessRegistry::new();
        let mut rng = SimRng::new(1);
        let heavy = reg.spawn(&mut rng, 0, 0.0, Some(5), None).unwrap();
        let light = reg.spawn(&mut rng, 0, 0.0, Some(5), None).unwrap();

        let mut sched = Lottery::new(5);
        sched.admit_with_tickets(&reg, heavy, 90).unwrap();
        sched.admit_with_tickets(&reg, light, 10).unwrap();

        let trials = 20_000;
        let mut heavy_wins = 0u64;
        for _ in 0..trials {
            // pick_next removes only the winner; the loser stays in
            // the pool, so re-admitting the winner restores the
            // original 90/10 split for the next draw.
            let winner = sched.pick_next(&mut reg, 0, &mut rng).unwrap();
            if winner == heavy {
                heavy_wins += 1;
                sched.admit_with_tickets(&reg, heavy, 90).unwrap();
            } else {
                sched.admit_with_tickets(&reg, light, 10).unwrap();
            }
        }
        let frequency = heavy_wins as f64 / trials as f64;
        assert!((frequency - 0.9).abs() < 0.02, "frequency was {frequency}");
    }
}
