//! Orchestration of several Intcode machines that talk to each other.
//!
//! Machines never share memory. They exchange values only through the queues
//! the orchestrator owns, either in a fixed pipeline (amplifiers) or as
//! addressed packets (node network).
//!
//! - [`amplifier`]: Linear chains and feedback loops of amplifiers
//! - [`cooperative`]: Single-thread round-robin packet network
//! - [`threaded`]: One tokio task per node, orchestrated over channels
//! - [`nat`]: Idle monitor shared by both network schedulers
//! - [`message`]: Packet type and output framing
//! - [`errors`]: Orchestration error types

pub mod amplifier;
pub mod cooperative;
pub mod errors;
pub mod message;
pub mod nat;
pub mod threaded;

use crate::network::message::{IDLE_INPUT, NAT_ADDRESS, Packet};
use crate::virtual_machine::vm::MachineOps;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// When a network run is considered finished.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StopCondition {
    /// Stop at the first packet sent to the NAT.
    FirstNatPacket,
    /// Keep waking node 0 with the last NAT packet whenever the network goes
    /// idle, and stop when the same packet would be sent twice in a row.
    #[default]
    RepeatedWake,
}

impl FromStr for StopCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(StopCondition::FirstNatPacket),
            "repeat" => Ok(StopCondition::RepeatedWake),
            other => Err(format!("unknown stop condition '{other}' (expected first|repeat)")),
        }
    }
}

/// Configuration for a packet network run.
#[derive(Clone, Debug)]
pub struct NetworkOps {
    /// Number of nodes; addresses are `0..nodes`.
    pub nodes: usize,
    /// Destination intercepted by the NAT.
    pub nat_address: i64,
    /// Value fed to a node that asks for input with an empty queue.
    pub idle_input: i64,
    /// Threaded scheduler: how long the orchestrator waits without traffic
    /// before checking whether the network is idle.
    pub idle_timeout: Duration,
    /// Threaded scheduler: how long a node waits for a packet before reading
    /// the idle input.
    pub poll_interval: Duration,
    /// Cooperative scheduler: consecutive rounds without traffic that count as idle.
    pub idle_rounds: usize,
    pub stop: StopCondition,
    /// Capacity of the shared event channel in the threaded scheduler.
    pub channel_capacity: usize,
    /// Options applied to every node's machine.
    pub machine: MachineOps,
}

impl Default for NetworkOps {
    fn default() -> Self {
        Self {
            nodes: 50,
            nat_address: NAT_ADDRESS,
            idle_input: IDLE_INPUT,
            idle_timeout: Duration::from_millis(300),
            poll_interval: Duration::from_millis(1),
            idle_rounds: 2,
            stop: StopCondition::default(),
            channel_capacity: 1024,
            machine: MachineOps::default(),
        }
    }
}

/// How a network run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NatOutcome {
    /// First NAT packet, or the packet that would have been sent twice.
    pub packet: Packet,
    /// Number of times node 0 was woken by the NAT.
    pub wakes: usize,
}

impl fmt::Display for NatOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NAT packet ({}, {}) after {} wake(s)",
            self.packet.x, self.packet.y, self.wakes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_condition_from_str() {
        assert_eq!("first".parse::<StopCondition>(), Ok(StopCondition::FirstNatPacket));
        assert_eq!("repeat".parse::<StopCondition>(), Ok(StopCondition::RepeatedWake));
        assert!("never".parse::<StopCondition>().is_err());
    }

    #[test]
    fn defaults_match_nic_conventions() {
        let ops = NetworkOps::default();
        assert_eq!(ops.nodes, 50);
        assert_eq!(ops.nat_address, 255);
        assert_eq!(ops.idle_input, -1);
        assert_eq!(ops.stop, StopCondition::RepeatedWake);
    }
}
