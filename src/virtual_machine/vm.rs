//! Core execution engine and the resumable [`Machine`].
//!
//! The engine is two free functions over borrowed parts, [`step`] and
//! [`run_to_halt_or_output`], so a scheduler can hold the state, memory and I/O
//! of a machine wherever it likes. [`Machine`] bundles the three for callers
//! that just want one self-contained instance.
//!
//! All arithmetic is checked 64-bit signed. An overflow faults the machine
//! instead of wrapping.

mod context;
mod memory;

pub use context::{ExecState, MachineOps, Status, StepResult};
pub use memory::Memory;

use crate::debug;
use crate::virtual_machine::decoder::Instruction;
use crate::virtual_machine::errors::{Fault, VMError};
use crate::virtual_machine::io::{Io, IoQueues};
use crate::virtual_machine::isa::Opcode;
use crate::virtual_machine::operand::Mode;
use crate::virtual_machine::program::Program;

/// Executes exactly one instruction.
///
/// Terminal machines are not touched: a halted machine keeps returning
/// [`StepResult::Halted`] and a faulted one keeps returning its fault.
pub fn step<I: Io + ?Sized>(state: &mut ExecState, memory: &mut Memory, io: &mut I) -> StepResult {
    match &state.status {
        Status::Halted => return StepResult::Halted,
        Status::Faulted(fault) => return StepResult::Faulted(fault.clone()),
        Status::Running | Status::AwaitingInput => {}
    }

    let result = match state.step_limit {
        Some(limit) if state.steps >= limit => Err(VMError::StepLimitExceeded {
            limit,
            ip: state.ip,
        }),
        _ => execute(state, memory, io),
    };

    match result {
        Ok(result) => result,
        Err(error) => {
            let fault = Fault::new(error, state.ip, memory.get(state.ip));
            debug!("fault: {fault}");
            state.status = Status::Faulted(fault.clone());
            StepResult::Faulted(fault)
        }
    }
}

/// Steps until the machine halts, faults, needs input, or (when
/// `stop_on_output` is set) has just produced an output.
pub fn run_to_halt_or_output<I: Io + ?Sized>(
    state: &mut ExecState,
    memory: &mut Memory,
    io: &mut I,
    stop_on_output: bool,
) -> StepResult {
    loop {
        match step(state, memory, io) {
            StepResult::Continued(_) => {}
            StepResult::ProducedOutput(value) if stop_on_output => {
                return StepResult::ProducedOutput(value);
            }
            StepResult::ProducedOutput(_) => {}
            other => return other,
        }
    }
}

/// Same as [`run_to_halt_or_output`] but executes at most `budget`
/// instructions. When the budget runs out first it returns
/// [`StepResult::Continued`] with the pointer of the next instruction, so an
/// async driver can yield between slices.
pub fn run_for<I: Io + ?Sized>(
    state: &mut ExecState,
    memory: &mut Memory,
    io: &mut I,
    stop_on_output: bool,
    budget: u64,
) -> StepResult {
    for _ in 0..budget {
        match step(state, memory, io) {
            StepResult::Continued(_) => {}
            StepResult::ProducedOutput(value) if stop_on_output => {
                return StepResult::ProducedOutput(value);
            }
            StepResult::ProducedOutput(_) => {}
            other => return other,
        }
    }
    StepResult::Continued(state.ip)
}

/// Reads an input parameter through its addressing mode.
fn load(memory: &Memory, relative_base: i64, instr: &Instruction, i: usize) -> Result<i64, VMError> {
    let param = instr.param(i);
    match param.mode {
        Mode::Immediate => Ok(param.raw),
        Mode::Position => memory.read(param.raw),
        Mode::Relative => memory.read(offset(relative_base, param.raw, instr)?),
    }
}

/// Resolves an output parameter to the address it names.
fn destination(relative_base: i64, instr: &Instruction, i: usize) -> Result<usize, VMError> {
    let param = instr.param(i);
    let address = match param.mode {
        Mode::Position => param.raw,
        Mode::Relative => offset(relative_base, param.raw, instr)?,
        Mode::Immediate => {
            return Err(VMError::InvalidAddressingMode {
                mode: Mode::Immediate as i64,
                param: i + 1,
                ip: instr.ip,
            });
        }
    };
    Memory::index(address)
}

fn offset(relative_base: i64, raw: i64, instr: &Instruction) -> Result<i64, VMError> {
    relative_base
        .checked_add(raw)
        .ok_or_else(|| overflow(instr))
}

fn overflow(instr: &Instruction) -> VMError {
    VMError::ArithmeticOverflow {
        instruction: instr.opcode.mnemonic(),
        ip: instr.ip,
    }
}

fn execute<I: Io + ?Sized>(
    state: &mut ExecState,
    memory: &mut Memory,
    io: &mut I,
) -> Result<StepResult, VMError> {
    let instr = Instruction::fetch(memory, state.ip)?;
    debug!("{:05} [rb {:>6}] {}", instr.ip, state.relative_base, instr);

    let rb = state.relative_base;
    let mut result = None;
    let next = match instr.opcode {
        Opcode::Add => {
            let a = load(memory, rb, &instr, 0)?;
            let b = load(memory, rb, &instr, 1)?;
            let dst = destination(rb, &instr, 2)?;
            memory.set(dst, a.checked_add(b).ok_or_else(|| overflow(&instr))?);
            instr.next_ip()
        }
        Opcode::Multiply => {
            let a = load(memory, rb, &instr, 0)?;
            let b = load(memory, rb, &instr, 1)?;
            let dst = destination(rb, &instr, 2)?;
            memory.set(dst, a.checked_mul(b).ok_or_else(|| overflow(&instr))?);
            instr.next_ip()
        }
        Opcode::Input => {
            let dst = destination(rb, &instr, 0)?;
            match io.read_input() {
                Some(value) => {
                    memory.set(dst, value);
                    instr.next_ip()
                }
                None => {
                    state.status = Status::AwaitingInput;
                    return Ok(StepResult::NeedsInput);
                }
            }
        }
        Opcode::Output => {
            let value = load(memory, rb, &instr, 0)?;
            io.write_output(value);
            result = Some(StepResult::ProducedOutput(value));
            instr.next_ip()
        }
        Opcode::JumpIfTrue => {
            let cond = load(memory, rb, &instr, 0)?;
            let target = load(memory, rb, &instr, 1)?;
            if cond != 0 {
                Memory::index(target)?
            } else {
                instr.next_ip()
            }
        }
        Opcode::JumpIfFalse => {
            let cond = load(memory, rb, &instr, 0)?;
            let target = load(memory, rb, &instr, 1)?;
            if cond == 0 {
                Memory::index(target)?
            } else {
                instr.next_ip()
            }
        }
        Opcode::LessThan => {
            let a = load(memory, rb, &instr, 0)?;
            let b = load(memory, rb, &instr, 1)?;
            let dst = destination(rb, &instr, 2)?;
            memory.set(dst, i64::from(a < b));
            instr.next_ip()
        }
        Opcode::Equal => {
            let a = load(memory, rb, &instr, 0)?;
            let b = load(memory, rb, &instr, 1)?;
            let dst = destination(rb, &instr, 2)?;
            memory.set(dst, i64::from(a == b));
            instr.next_ip()
        }
        Opcode::AdjustRelativeBase => {
            let delta = load(memory, rb, &instr, 0)?;
            state.relative_base = offset(rb, delta, &instr)?;
            instr.next_ip()
        }
        Opcode::Halt => {
            state.steps += 1;
            state.status = Status::Halted;
            return Ok(StepResult::Halted);
        }
    };

    state.ip = next;
    state.steps += 1;
    state.status = Status::Running;
    Ok(result.unwrap_or(StepResult::Continued(next)))
}

/// What a machine was doing when [`Machine::run_until_outputs`] handed control back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Yielded {
    /// Exactly the requested number of outputs, oldest first.
    Outputs(Vec<i64>),
    /// Blocked on input before enough outputs were produced. Outputs produced
    /// so far stay queued.
    NeedsInput,
    /// Halted before enough outputs were produced. Outputs produced so far
    /// stay queued.
    Halted,
}

/// A resumable Intcode machine: private memory, registers and I/O queues.
///
/// Every suspension point (need input, just produced output) leaves the machine
/// in a state from which any of the `run*`/`step*` methods resume exactly where
/// execution stopped. Machines share nothing, so any number of them can be
/// driven from one scheduler loop or moved onto separate tasks.
#[derive(Clone, Debug)]
pub struct Machine {
    state: ExecState,
    memory: Memory,
    io: IoQueues,
}

impl Machine {
    /// Boots a machine with `program` loaded at address 0.
    pub fn new(program: &Program) -> Self {
        Self::with_ops(program, MachineOps::default())
    }

    pub fn with_ops(program: &Program, ops: MachineOps) -> Self {
        Self {
            state: ExecState::new(ops.step_limit),
            memory: Memory::new(program),
            io: IoQueues::new(),
        }
    }

    /// Replaces memory with `program` and resets registers and queues.
    /// The step limit is kept.
    pub fn load(&mut self, program: &Program) {
        self.state = ExecState::new(self.state.step_limit);
        self.memory = Memory::new(program);
        self.io.clear();
    }

    pub fn provide_input(&mut self, value: i64) {
        self.io.push_input(value);
    }

    pub fn provide_input_sequence(&mut self, values: impl IntoIterator<Item = i64>) {
        self.io.extend_inputs(values);
    }

    /// Queues the bytes of `text` as inputs, one character code per input.
    pub fn provide_ascii(&mut self, text: &str) {
        self.io.extend_inputs(text.bytes().map(i64::from));
    }

    /// Removes and returns the oldest unread output.
    pub fn read_output(&mut self) -> Option<i64> {
        self.io.pop_output()
    }

    /// Removes and returns every unread output.
    pub fn drain_output(&mut self) -> Vec<i64> {
        self.io.drain_outputs()
    }

    /// Drains unread outputs as text. Values that are not ASCII codes are
    /// written out in decimal.
    pub fn read_ascii(&mut self) -> String {
        let mut text = String::new();
        for value in self.io.drain_outputs() {
            match u8::try_from(value) {
                Ok(byte) if byte.is_ascii() => text.push(char::from(byte)),
                _ => text.push_str(&value.to_string()),
            }
        }
        text
    }

    pub fn pending_inputs(&self) -> usize {
        self.io.pending_inputs()
    }

    pub fn pending_outputs(&self) -> usize {
        self.io.pending_outputs()
    }

    pub fn is_halted(&self) -> bool {
        self.state.status == Status::Halted
    }

    pub fn status(&self) -> &Status {
        &self.state.status
    }

    pub fn ip(&self) -> usize {
        self.state.ip
    }

    pub fn relative_base(&self) -> i64 {
        self.state.relative_base
    }

    /// Instructions executed since boot.
    pub fn steps(&self) -> u64 {
        self.state.steps
    }

    pub fn state(&self) -> &ExecState {
        &self.state
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// Executes one instruction against the machine's own queues.
    pub fn step(&mut self) -> StepResult {
        step(&mut self.state, &mut self.memory, &mut self.io)
    }

    /// Executes one instruction against an external I/O channel.
    pub fn step_with<I: Io + ?Sized>(&mut self, io: &mut I) -> StepResult {
        step(&mut self.state, &mut self.memory, io)
    }

    /// Runs until the next suspension point using the machine's own queues.
    ///
    /// Never returns [`StepResult::Continued`].
    pub fn run_until_suspend(&mut self, stop_on_output: bool) -> StepResult {
        run_to_halt_or_output(&mut self.state, &mut self.memory, &mut self.io, stop_on_output)
    }

    /// Runs for at most `budget` instructions; see [`run_for`].
    pub fn run_for(&mut self, budget: u64, stop_on_output: bool) -> StepResult {
        run_for(&mut self.state, &mut self.memory, &mut self.io, stop_on_output, budget)
    }

    /// Runs until the next suspension point using an external I/O channel.
    pub fn run_with<I: Io + ?Sized>(&mut self, io: &mut I, stop_on_output: bool) -> StepResult {
        run_to_halt_or_output(&mut self.state, &mut self.memory, io, stop_on_output)
    }

    /// Runs to completion on the inputs already queued and returns every
    /// unread output.
    ///
    /// Running out of input here is the caller's mistake, so it is reported as
    /// [`VMError::InputExhausted`] but the machine itself stays suspended on
    /// the Input instruction and can still be resumed.
    pub fn run(&mut self) -> Result<Vec<i64>, Fault> {
        loop {
            match self.run_until_suspend(false) {
                StepResult::Halted => return Ok(self.drain_output()),
                StepResult::Faulted(fault) => return Err(fault),
                StepResult::NeedsInput => {
                    return Err(Fault::new(
                        VMError::InputExhausted { ip: self.state.ip },
                        self.state.ip,
                        self.memory.get(self.state.ip),
                    ));
                }
                StepResult::Continued(_) | StepResult::ProducedOutput(_) => {}
            }
        }
    }

    /// Runs until `count` unread outputs are queued and returns them.
    ///
    /// This is the generator-style interface used by drivers that exchange
    /// fixed-size messages with the program, such as coordinate pairs or
    /// `(dest, x, y)` packets.
    pub fn run_until_outputs(&mut self, count: usize) -> Result<Yielded, Fault> {
        while self.io.pending_outputs() < count {
            match self.run_until_suspend(true) {
                StepResult::ProducedOutput(_) => {}
                StepResult::NeedsInput => return Ok(Yielded::NeedsInput),
                StepResult::Halted => return Ok(Yielded::Halted),
                StepResult::Faulted(fault) => return Err(fault),
                StepResult::Continued(_) => {}
            }
        }
        Ok(Yielded::Outputs((0..count).filter_map(|_| self.io.pop_output()).collect()))
    }
}
