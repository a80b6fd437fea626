//! Instruction word decoding.
//!
//! An instruction word is `modes * 100 + opcode`. The mode for parameter 1 is
//! the hundreds digit, parameter 2 the thousands digit, and so on. Digits past
//! the opcode's arity are ignored and missing digits read as position mode.

use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::isa::{MAX_PARAMS, Opcode};
use crate::virtual_machine::operand::{Mode, Param};
use crate::virtual_machine::vm::Memory;
use std::fmt;

/// Opcode and parameter modes unpacked from one instruction word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decoded {
    pub opcode: Opcode,
    /// Modes for parameters `1..=opcode.arity()`; the rest stay [`Mode::Position`].
    pub modes: [Mode; MAX_PARAMS],
}

/// Splits `word` into opcode and per-parameter modes.
///
/// `ip` is only used to annotate errors. A negative word is never a valid
/// instruction and is reported as an invalid opcode carrying the whole word.
pub fn decode(word: i64, ip: usize) -> Result<Decoded, VMError> {
    if word < 0 {
        return Err(VMError::InvalidOpcode { opcode: word, ip });
    }
    let opcode = Opcode::from_code(word % 100, ip)?;

    let mut modes = [Mode::Position; MAX_PARAMS];
    let mut digits = word / 100;
    for (i, slot) in modes.iter_mut().take(opcode.arity()).enumerate() {
        *slot = Mode::from_digit(digits % 10, i + 1, ip)?;
        digits /= 10;
    }
    Ok(Decoded { opcode, modes })
}

/// Decoded view of the instruction at one address, raw parameter words included.
///
/// Built fresh on every fetch so that self-modifying programs always execute
/// what is currently in memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub ip: usize,
    /// Raw instruction word, kept for fault reports.
    pub word: i64,
    pub opcode: Opcode,
    params: [Param; MAX_PARAMS],
}

impl Instruction {
    /// Decodes the instruction stored at `ip`.
    pub fn fetch(memory: &Memory, ip: usize) -> Result<Self, VMError> {
        let word = memory.get(ip);
        let Decoded { opcode, modes } = decode(word, ip)?;

        let mut params = [Param::default(); MAX_PARAMS];
        for (i, param) in params.iter_mut().take(opcode.arity()).enumerate() {
            *param = Param::new(memory.get(ip + 1 + i), modes[i]);
        }
        Ok(Self {
            ip,
            word,
            opcode,
            params,
        })
    }

    /// Parameters in order, one per word following the opcode.
    pub fn params(&self) -> &[Param] {
        &self.params[..self.opcode.arity()]
    }

    /// Returns parameter `i` (0-based).
    #[inline]
    pub fn param(&self, i: usize) -> Param {
        self.params[i]
    }

    /// Address of the instruction that follows when no jump is taken.
    pub fn next_ip(&self) -> usize {
        self.ip + self.opcode.width()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<5}", self.opcode.mnemonic())?;
        for param in self.params() {
            write!(f, " {param}")?;
        }
        Ok(())
    }
}
