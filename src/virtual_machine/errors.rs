//! Error types raised while loading or executing Intcode programs.

/// Errors that can occur during program loading or VM execution.
///
/// Every execution error is fatal for the instance that raised it: the machine
/// moves to the faulted state and keeps reporting the same error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VMError {
    /// Instruction word whose low two digits name no supported opcode.
    #[error("invalid opcode {opcode} at address {ip}")]
    InvalidOpcode { opcode: i64, ip: usize },
    /// Negative memory address or jump target.
    #[error("invalid address {address}")]
    InvalidAddress { address: i64 },
    /// Mode digit outside {0, 1, 2}, or immediate mode used for a destination.
    #[error("invalid addressing mode {mode} for parameter {param} at address {ip}")]
    InvalidAddressingMode { mode: i64, param: usize, ip: usize },
    /// Input instruction reached with no queued value in run-to-completion mode.
    #[error("input exhausted at address {ip}")]
    InputExhausted { ip: usize },
    /// Signed 64-bit arithmetic overflowed.
    #[error("arithmetic overflow in {instruction} at address {ip}")]
    ArithmeticOverflow { instruction: &'static str, ip: usize },
    /// Configured instruction budget was used up before the program halted.
    #[error("step limit of {limit} instructions exceeded at address {ip}")]
    StepLimitExceeded { limit: u64, ip: usize },
    /// Program text contained something other than a signed integer.
    #[error("invalid program: token {index} ({token:?}) is not an integer")]
    InvalidProgram { index: usize, token: String },
    /// Program file could not be read.
    #[error("io error: {0}")]
    Io(String),
}

impl VMError {
    /// Returns the instruction pointer the error was raised at, if any.
    pub fn ip(&self) -> Option<usize> {
        match self {
            VMError::InvalidOpcode { ip, .. }
            | VMError::InvalidAddressingMode { ip, .. }
            | VMError::InputExhausted { ip }
            | VMError::ArithmeticOverflow { ip, .. }
            | VMError::StepLimitExceeded { ip, .. } => Some(*ip),
            VMError::InvalidAddress { .. } | VMError::InvalidProgram { .. } | VMError::Io(_) => {
                None
            }
        }
    }
}

/// Terminal report of a faulted machine.
///
/// Carries the reason together with the instruction pointer and the raw
/// instruction word that was being executed when the fault was raised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{error} (ip {ip}, instruction word {word})")]
pub struct Fault {
    #[source]
    pub error: VMError,
    pub ip: usize,
    pub word: i64,
}

impl Fault {
    pub fn new(error: VMError, ip: usize, word: i64) -> Self {
        Self { error, ip, word }
    }
}

impl From<std::io::Error> for VMError {
    fn from(err: std::io::Error) -> Self {
        VMError::Io(err.to_string())
    }
}
