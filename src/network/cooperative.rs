//! Single-thread packet network.
//!
//! Nodes take turns: each one runs until it needs input it does not have (or
//! halts), and the packets it emitted are queued at their destinations before
//! the next node runs. A node that asks for input with an empty queue is given
//! the idle value instead.

use crate::network::errors::NetworkError;
use crate::network::message::{Packet, PacketAssembler};
use crate::network::nat::{IdleAction, Nat};
use crate::network::{NatOutcome, NetworkOps};
use crate::virtual_machine::program::Program;
use crate::virtual_machine::vm::{Machine, StepResult};
use crate::{debug, info};

struct Node {
    machine: Machine,
    framer: PacketAssembler,
}

/// Round-robin scheduler over a fixed set of nodes.
pub struct CooperativeNetwork {
    ops: NetworkOps,
    nodes: Vec<Node>,
    nat: Nat,
    rounds: usize,
}

/// Boots `ops.nodes` copies of `program` and runs them until the stop condition.
pub fn run_cooperative(program: &Program, ops: &NetworkOps) -> Result<NatOutcome, NetworkError> {
    CooperativeNetwork::new(program, ops.clone()).run()
}

impl CooperativeNetwork {
    /// Boots every node and queues its own address as its first input.
    pub fn new(program: &Program, ops: NetworkOps) -> Self {
        let nodes = (0..ops.nodes)
            .map(|address| {
                let mut machine = Machine::with_ops(program, ops.machine);
                machine.provide_input(address as i64);
                Node {
                    machine,
                    framer: PacketAssembler::new(),
                }
            })
            .collect();

        Self {
            nat: Nat::new(ops.stop),
            ops,
            nodes,
            rounds: 0,
        }
    }

    /// Number of completed scheduling rounds.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Schedules rounds until the NAT ends the run or something goes wrong.
    pub fn run(&mut self) -> Result<NatOutcome, NetworkError> {
        let idle_rounds = self.ops.idle_rounds.max(1);
        let mut quiet = 0;

        loop {
            let busy = match self.round()? {
                Round::Done(outcome) => return Ok(outcome),
                Round::Busy => true,
                Round::Quiet => false,
            };
            self.rounds += 1;

            if busy {
                quiet = 0;
                continue;
            }
            quiet += 1;
            if quiet < idle_rounds {
                continue;
            }

            quiet = 0;
            match self.nat.on_idle()? {
                IdleAction::Done(outcome) => return Ok(outcome),
                IdleAction::Wake(packet) => {
                    info!("network idle after {} rounds, waking node 0 with {packet}", self.rounds);
                    self.deliver_to(0, packet)?;
                }
            }
        }
    }

    /// Gives every live node one turn.
    fn round(&mut self) -> Result<Round, NetworkError> {
        let mut busy = false;

        for address in 0..self.nodes.len() {
            let node = &mut self.nodes[address];
            if node.machine.is_halted() {
                continue;
            }

            if node.machine.pending_inputs() == 0 {
                node.machine.provide_input(self.ops.idle_input);
            } else {
                busy = true;
            }

            match node.machine.run_until_suspend(false) {
                StepResult::NeedsInput | StepResult::Continued(_) | StepResult::ProducedOutput(_) => {}
                StepResult::Halted => info!("node {address} halted"),
                StepResult::Faulted(source) => return Err(NetworkError::Node { address, source }),
            }

            let outputs = node.machine.drain_output();
            for packet in node.framer.push(outputs) {
                busy = true;
                if let Some(outcome) = self.route(address, packet)? {
                    return Ok(Round::Done(outcome));
                }
            }
        }

        Ok(if busy { Round::Busy } else { Round::Quiet })
    }

    fn route(&mut self, from: usize, packet: Packet) -> Result<Option<NatOutcome>, NetworkError> {
        debug!("{from} -> {packet}");
        if packet.dest == self.ops.nat_address {
            return Ok(self.nat.receive(packet));
        }
        match usize::try_from(packet.dest) {
            Ok(dest) if dest < self.nodes.len() => self.deliver_to(dest, packet).map(|_| None),
            _ => Err(NetworkError::UnknownDestination {
                from,
                dest: packet.dest,
            }),
        }
    }

    fn deliver_to(&mut self, address: usize, packet: Packet) -> Result<(), NetworkError> {
        let node = self
            .nodes
            .get_mut(address)
            .ok_or(NetworkError::NodeHalted { address })?;
        if node.machine.is_halted() {
            return Err(NetworkError::NodeHalted { address });
        }
        node.machine.provide_input_sequence(packet.payload());
        Ok(())
    }
}

enum Round {
    Busy,
    Quiet,
    Done(NatOutcome),
}
