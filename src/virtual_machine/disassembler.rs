//! Linear-sweep disassembler.
//!
//! Intcode has no separation between code and data, so the sweep simply decodes
//! one instruction after another from address 0 and stops at the first word
//! that does not decode. Everything from there on is reported as trailing data.

use crate::virtual_machine::decoder::Instruction;
use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::program::Program;
use crate::virtual_machine::vm::Memory;
use std::fmt;

/// Result of sweeping a program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Disassembly {
    pub instructions: Vec<Instruction>,
    /// Address where the sweep stopped and why, or `None` if it reached the end.
    pub stopped: Option<(usize, VMError)>,
    /// Number of words in the program.
    pub len: usize,
}

impl Disassembly {
    /// Words left undecoded after the sweep stopped.
    pub fn trailing_words(&self) -> usize {
        self.stopped.as_ref().map_or(0, |(addr, _)| self.len - addr)
    }
}

/// Decodes `program` from address 0 until the end or the first invalid word.
///
/// An instruction whose parameters run past the end of the program is still
/// listed; the missing words read as 0 just as they would at run time.
pub fn disassemble(program: &Program) -> Disassembly {
    let memory = Memory::new(program);
    let mut instructions = Vec::new();
    let mut stopped = None;
    let mut ip = 0;

    while ip < program.len() {
        match Instruction::fetch(&memory, ip) {
            Ok(instr) => {
                ip = instr.next_ip();
                instructions.push(instr);
            }
            Err(err) => {
                stopped = Some((ip, err));
                break;
            }
        }
    }

    Disassembly {
        instructions,
        stopped,
        len: program.len(),
    }
}

impl fmt::Display for Disassembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instr in &self.instructions {
            writeln!(f, "{:05} {}", instr.ip, instr)?;
        }
        if let Some((addr, err)) = &self.stopped {
            writeln!(
                f,
                "{addr:05} ; {} data word(s) follow: {err}",
                self.trailing_words()
            )?;
        }
        Ok(())
    }
}
