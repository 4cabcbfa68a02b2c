//  The scheduler family.
//
//  Every variant answers the same four questions a dispatcher needs:
//  who can I admit, who runs next, for how long, and is anyone ready
//  at all? The algorithms differ only in how they answer "who runs
//  next" and "for how long" - admission and the has_work check are
//  comparatively mechanical. Each scheduler owns only per-pid
//  bookkeeping (levels, tickets, vruntime, ...); the `Process` values
//  themselves live in the caller's `ProcessRegistry`, addressed here
//  by pid - see `process::ProcessRegistry`.

use process::{ProcessRegistry, ProcessState};
use sim_rng::SimRng;
use thiserror::Error;

pub mod cfs;
pub mod lottery;
pub mod mlfq;
pub mod round_robin;
pub mod simple;

pub use cfs::Cfs;
pub use lottery::Lottery;
pub use mlfq::Mlfq;
pub use round_robin::RoundRobin;
pub use simple::Simple;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("no runnable process is available")]
    NoRunnable,
    #[error("process {0} cannot be admitted because it is not READY")]
    NotReady(u32),
}

/// Shared by every scheduler variant. `admit`/`pick_next` are the only
/// operations that touch the ready set; `quantum_for` is a pure query.
///
/// Both mutating operations take the dispatcher's current tick as
/// `now`. Most variants ignore it; MLFQ needs it to stamp and check
/// per-process boost clocks without reaching for a global clock - see
/// `mlfq::Mlfq`. `pick_next` also takes the dispatcher's shared `SimRng`;
/// every variant but `Lottery` ignores it, but threading it through the
/// trait keeps every random choice in the simulation - process work,
/// I/O triggers, service times, lottery draws - coming from the one
/// seeded source the caller owns, rather than letting a variant keep a
/// PRNG of its own.
pub trait Scheduler {
    /// Make `pid` eligible for a future `pick_next`. `pid` must name a
    /// READY process in `registry`.
    fn admit(&mut self, registry: &ProcessRegistry, pid: u32, now: u64) -> Result<(), SchedulerError>;

    /// Remove and return one admitted pid. Runs cleanup first, pruning
    /// any pid no longer live in `registry`.
    fn pick_next(
        &mut self,
        registry: &mut ProcessRegistry,
        now: u64,
        rng: &mut SimRng,
    ) -> Result<u32, SchedulerError>;

    /// The quantum this scheduler would grant `pid` right now.
    fn quantum_for(&self, registry: &ProcessRegistry, pid: u32) -> u64;

    fn has_work(&self) -> bool;

    /// Ready-process count; an introspection helper for demos and tests.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn name(&self) -> &'static str;
}

fn require_ready(registry: &ProcessRegistry, pid: u32) -> Result<(), SchedulerError> {
    match registry.get(pid) {
        Some(p) if p.state == ProcessState::Ready => Ok(()),
        _ => Err(SchedulerError::NotReady(pid)),
    }
}
