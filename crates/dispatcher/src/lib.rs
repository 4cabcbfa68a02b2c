//  The CPU dispatcher: the single-threaded loop that drives a
//  scheduler and an I/O manager against a process registry until every
//  process has terminated. One `Cpu` owns the simulation clock; nothing
//  else is allowed to advance it.
//
//  Loop, translated directly from the cooperative scheduling pseudocode:
//  drain completed I/O back onto the scheduler, pick and run one
//  process for its granted quantum, then route the result (WAITING ->
//  park, TERMINATED -> drop, otherwise -> re-admit). When neither the
//  scheduler nor the I/O queue has anything to do but the registry is
//  not yet empty, the clock still advances by one tick rather than
//  spinning.

use io_manager::{IoError, IoManager};
use process::{ProcessError, ProcessRegistry, ProcessState};
use scheduler::{Scheduler, SchedulerError};
use sim_rng::SimRng;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error(transparent)]
    Io(#[from] IoError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchEvent {
    pub tick: u64,
    pub pid: u32,
    pub ran: u64,
}

/// The ordered record of every dispatch the CPU performed, the
/// observable output of a run.
pub type Trace = Vec<DispatchEvent>;

pub struct Cpu {
    clock: u64,
}

impl Cpu {
    pub fn new() -> Self {
        Self { clock: 0 }
    }

    pub fn clock(&self) -> u64 {
        self.clock
    }

    /// Drive `scheduler` and `io` against `registry` until both are out
    /// of work, i.e. every admitted process has reached TERMINATED.
    /// `on_event` is called once per dispatch, in order; it exists for
    /// demo binaries that want to print a trace line as it happens and
    /// is a no-op by default.
    pub fn run(
        &mut self,
        registry: &mut ProcessRegistry,
        scheduler: &mut dyn Scheduler,
        io: &mut IoManager,
        rng: &mut SimRng,
        mut on_event: impl FnMut(&DispatchEvent),
    ) -> Result<Trace, DispatchError> {
        let mut trace = Trace::new();

        while scheduler.has_work() || !io.is_empty() {
            for pid in io.drain(registry, self.clock) {
                scheduler.admit(registry, pid, self.clock)?;
            }

            if scheduler.has_work() {
                let pid = scheduler.pick_next(registry, self.clock, rng)?;
                registry.set_state(pid, ProcessState::Running)?;
                let quantum = scheduler.quantum_for(registry, pid);

                let process = registry.get_mut(pid).ok_or(ProcessError::NotFound(pid))?;
                let ran = process.run_for(rng, quantum)?;
                self.clock += ran;

                let event = DispatchEvent { tick: self.clock, pid, ran };
                on_event(&event);
                trace.push(event);

                let state = registry.get(pid).map(|p| p.state).ok_or(ProcessError::NotFound(pid))?;
                match state {
                    ProcessState::Waiting => {
                        io.park(registry, rng, pid, self.clock)?;
                    }
                    ProcessState::Terminated => {
                        registry.remove(pid);
                    }
                    _ => {
                        registry.set_state(pid, ProcessState::Ready)?;
                        scheduler.admit(registry, pid, self.clock)?;
                    }
                }
            } else {
                self.clock += 1;
            }
        }

        Ok(trace)
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scheduler::RoundRobin;

    #[test]
    fn two_process_round_robin_trace_matches_spec_scenario() {
        let mut rng = SimRng::new(1);
        let mut registry = ProcessRegistry::new();
        let p1 = registry.spawn(&mut rng, 0, 0.0, Some(5), None).unwrap();
        let p2 = registry.spawn(&mut rng, 0, 0.0, Some(4), None).unwrap();

        let mut sched = RoundRobin::new(3);
        sched.admit(&registry, p1, 0).unwrap();
        sched.admit(&registry, p2, 0).unwrap();

        let mut io = IoManager::new();
        let mut cpu = Cpu::new();
        let trace = cpu.run(&mut registry, &mut sched, &mut io, &mut rng, |_| {}).unwrap();

        let runs: Vec<(u32, u64)> = trace.iter().map(|e| (e.pid, e.ran)).collect();
        assert_eq!(runs, vec![(p1, 3), (p2, 3), (p1, 2), (p2, 1)]);
        assert_eq!(cpu.clock(), 9);
        assert!(registry.is_empty());
    }

    #[test]
    fn clock_advances_by_one_when_only_io_is_pending() {
        // A single process with guaranteed I/O: the scheduler runs dry
        // while the process waits, so the clock must still tick
        // forward until the I/O manager drains it back to READY.
        let mut rng = SimRng::new(4);
        let mut registry = ProcessRegistry::new();
        let pid = registry.spawn(&mut rng, 0, 1.0, Some(6), None).unwrap();

        let mut sched = RoundRobin::new(3);
        sched.admit(&registry, pid, 0).unwrap();

        let mut io = IoManager::new();
        let mut cpu = Cpu::new();
        let trace = cpu.run(&mut registry, &mut sched, &mut io, &mut rng, |_| {}).unwrap();

        assert!(!trace.is_empty());
        assert!(registry.is_empty());
        assert!(io.is_empty());
    }

    #[test]
    fn on_event_hook_observes_every_dispatch_in_order() {
        let mut rng = SimRng::new(2);
        let mut registry = ProcessRegistry::new();
        let pid = registry.spawn(&mut rng, 0, 0.0, Some(10), None).unwrap();
        let mut sched = RoundRobin::new(3);
        sched.admit(&registry, pid, 0).unwrap();
        let mut io = IoManager::new();
        let mut cpu = Cpu::new();

        let mut seen = Vec::new();
        let trace = cpu.run(&mut registry, &mut sched, &mut io, &mut rng, |e| seen.push(*e)).unwrap();
        assert_eq!(seen, trace);
    }
}
