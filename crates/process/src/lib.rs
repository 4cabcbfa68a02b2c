//  Process value type and the pid -> Process table.
//
//  A Process carries identity, remaining/cumulative work and an
//  I/O probability; its state machine is READY -> RUNNING -> {WAITING,
//  TERMINATED, READY}, WAITING -> READY. Only a RUNNING process may
//  decrement `time_to_completion`, and no transition into TERMINATED
//  reverses.
//
//  The table (`ProcessRegistry`) is the sole owner of every `Process`
//  value, the same shape a real kernel's process table takes: the PCB
//  lives in one array/map keyed by pid, and every other subsystem
//  (scheduler run queues, wait queues) holds the pid rather than the
//  struct itself. Schedulers and the dispatcher follow that: they
//  address processes by `pid` and borrow the registry rather than
//  holding `Process` values themselves.

use std::collections::HashMap;

use sim_rng::SimRng;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("process {pid} cannot {action} because it is in state {state:?}")]
    ContractViolation { pid: u32, action: &'static str, state: ProcessState },
    #[error("process {0} is already terminated")]
    AlreadyTerminated(u32),
    #[error("process {0} is not present in the registry")]
    NotFound(u32),
    #[error("io_probability must be in [0.0, 1.0], got {0}")]
    InvalidIoProbability(f64),
    #[error("time_to_completion must be greater than 0, got {0}")]
    InvalidTimeToCompletion(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Ready,
    Running,
    Waiting,
    Terminated,
}

#[derive(Debug, Clone)]
pub struct Process {
    pub pid: u32,
    pub arrival_time: u64,
    pub time_to_completion: u64,
    pub cumulative_time_ran: u64,
    pub io_probability: f64,
    pub state: ProcessState,
    pub name: Option<String>,
}

impl Process {
    /// Run for up to `quantum` ticks. With probability `io_probability`
    /// (and only if more than one tick of headroom remains) the run is
    /// cut short by a simulated I/O event: an effective run in
    /// `[1, max_run - 1]` is drawn, `time_to_completion` and
    /// `cumulative_time_ran` are updated by that amount, and the
    /// process moves to WAITING. Otherwise it runs the full
    /// `min(quantum, time_to_completion)` and terminates if that
    /// exhausts its remaining work.
    pub fn run_for(&mut self, rng: &mut SimRng, quantum: u64) -> Result<u64, ProcessError> {
        if self.state != ProcessState::Running {
            return Err(ProcessError::ContractViolation {
                pid: self.pid,
                action: "run",
                state: self.state,
            });
        }
        if quantum < 1 {
            return Err(ProcessError::ContractViolation {
                pid: self.pid,
                action: "run for a quantum below 1",
                state: self.state,
            });
        }

        let max_run = quantum.min(self.time_to_completion);

        if max_run > 1 && rng.chance(self.io_probability) {
            let effective_run = rng.range_u64(1, max_run - 1);
            self.time_to_completion -= effective_run;
            self.cumulative_time_ran += effective_run;
            self.state = ProcessState::Waiting;
            return Ok(effective_run);
        }

        self.time_to_completion -= max_run;
        self.cumulative_time_ran += max_run;
        if self.time_to_completion == 0 {
            self.state = ProcessState::Terminated;
        }
        Ok(max_run)
    }

    pub fn is_waiting(&self) -> bool {
        self.state == ProcessState::Waiting
    }

    pub fn is_terminated(&self) -> bool {
        self.state == ProcessState::Terminated
    }
}

/// The process-wide `pid -> Process` table. Owns every `Process` value
/// and the monotonic pid counter; the first spawned process gets
/// `pid == 1`.
pub struct ProcessRegistry {
    processes: HashMap<u32, Process>,
    next_pid: u32,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self { processes: HashMap::new(), next_pid: 1 }
    }

    /// Create and register a new READY process. `time_to_completion`
    /// defaults to a uniform draw in `[5, 10]` when not given, matching
    /// the original simulator's process factory.
    pub fn spawn(
        &mut self,
        rng: &mut SimRng,
        arrival_time: u64,
        io_probability: f64,
        time_to_completion: Option<u64>,
        name: Option<String>,
    ) -> Result<u32, ProcessError> {
        if !(0.0..=1.0).contains(&io_probability) {
            return Err(ProcessError::InvalidIoProbability(io_probability));
        }
        if let Some(0) = time_to_completion {
            return Err(ProcessError::InvalidTimeToCompletion(0));
        }

        let work = time_to_completion.unwrap_or_else(|| rng.range_u64(5, 10));
        let pid = self.next_pid;
        self.next_pid += 1;

        self.processes.insert(
            pid,
            Process {
                pid,
                arrival_time,
                time_to_completion: work,
                cumulative_time_ran: 0,
                io_probability,
                state: ProcessState::Ready,
                name,
            },
        );
        Ok(pid)
    }

    pub fn get(&self, pid: u32) -> Option<&Process> {
        self.processes.get(&pid)
    }

    pub fn get_mut(&mut self, pid: u32) -> Option<&mut Process> {
        self.processes.get_mut(&pid)
    }

    pub fn contains(&self, pid: u32) -> bool {
        self.processes.contains_key(&pid)
    }

    /// True iff `pid` is present and not TERMINATED - the condition
    /// scheduler cleanup passes use to decide whether to drop a
    /// reference.
    pub fn is_live(&self, pid: u32) -> bool {
        matches!(self.get(pid), Some(p) if !p.is_terminated())
    }

    pub fn set_state(&mut self, pid: u32, state: ProcessState) -> Result<(), ProcessError> {
        let p = self.get_mut(pid).ok_or(ProcessError::NotFound(pid))?;
        if p.state == ProcessState::Terminated {
            return Err(ProcessError::AlreadyTerminated(pid));
        }
        p.state = state;
        Ok(())
    }

    /// Remove a terminated process from the table. No-op (returns
    /// `None`) if the pid is unknown; the dispatcher calls this right
    /// after observing TERMINATED, never before.
    pub fn remove(&mut self, pid: u32) -> Option<Process> {
        self.processes.remove(&pid)
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }
}

impl Default for ProcessRegistry {
    fn default() -> Self {
        Self::new()
    }
}
