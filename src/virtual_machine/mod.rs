//! Intcode virtual machine.
//!
//! Programs are flat lists of signed 64-bit words loaded at address 0. Each
//! machine owns its memory, registers and I/O queues, and can be suspended when
//! it needs input or has just produced output, then resumed later.
//!
//! # Architecture
//!
//! - **Memory**: unbounded, zero-initialised; dense near the program, sparse far away
//! - **Registers**: instruction pointer and relative base
//! - **Instruction format**: `modes * 100 + opcode`, followed by parameter words
//! - **Addressing**: position, immediate and relative modes per parameter
//! - **Execution model**: single-step or run-until-suspend, with a shared [`io::Io`] seam
//!
//! # Modules
//!
//! - [`decoder`]: Instruction word decoding
//! - [`disassembler`]: Linear-sweep listing of a program
//! - [`errors`]: Load and execution error types
//! - [`io`]: Input/output trait and FIFO queues
//! - [`isa`]: Instruction set definition and opcode mappings
//! - [`operand`]: Addressing modes and parameters
//! - [`program`]: Program text parsing
//! - [`vm`]: Execution engine and resumable machine

pub mod decoder;
pub mod disassembler;
pub mod errors;
pub mod io;
pub mod isa;
pub mod operand;
pub mod program;
pub mod vm;
