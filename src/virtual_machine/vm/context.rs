use crate::virtual_machine::errors::Fault;

/// Lifecycle of one machine.
///
/// `Running` and `AwaitingInput` are resumable. `Halted` and `Faulted` are terminal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Running,
    /// Suspended on an Input instruction with nothing queued. The pointer still
    /// names that instruction, so the next step re-decodes it.
    AwaitingInput,
    Halted,
    Faulted(Fault),
}

impl Status {
    /// Returns `true` for the two terminal states.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Halted | Status::Faulted(_))
    }
}

/// Outcome of executing one instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepResult {
    /// Executed an instruction with no externally visible effect; carries the new pointer.
    Continued(usize),
    /// Executed an Output instruction.
    ProducedOutput(i64),
    /// Stopped in front of an Input instruction; nothing was consumed.
    NeedsInput,
    Halted,
    Faulted(Fault),
}

/// Registers and bookkeeping for one machine, owned exclusively by it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecState {
    /// Address of the next instruction to decode.
    pub ip: usize,
    /// Added to relative-mode parameters to form an address.
    pub relative_base: i64,
    pub status: Status,
    /// Instructions executed so far. Suspending on input does not count.
    pub steps: u64,
    /// Instruction budget; `None` runs without limit.
    pub step_limit: Option<u64>,
}

impl ExecState {
    pub fn new(step_limit: Option<u64>) -> Self {
        Self {
            ip: 0,
            relative_base: 0,
            status: Status::Running,
            steps: 0,
            step_limit,
        }
    }
}

impl Default for ExecState {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Per-machine options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MachineOps {
    /// Maximum number of instructions before the machine faults with
    /// `StepLimitExceeded`. Unlimited when `None`.
    pub step_limit: Option<u64>,
}
