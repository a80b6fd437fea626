//! Intcode virtual machine library.
//!
//! Provides the resumable Intcode machine, a disassembler, and orchestration of
//! several machines as amplifier chains or packet networks.

pub mod network;
pub mod utils;
pub mod virtual_machine;
