//! Errors raised while orchestrating several machines.

use crate::virtual_machine::errors::Fault;

/// Errors that end an amplifier or network run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    /// A node faulted; its fault is the source.
    #[error("node {address} faulted")]
    Node {
        address: usize,
        #[source]
        source: Fault,
    },

    /// The network went idle and there was no NAT packet to wake it with.
    #[error("network idle with no NAT packet after {wakes} wake(s)")]
    Deadlock { wakes: usize },

    /// A node sent a packet to an address that is neither a node nor the NAT.
    #[error("node {from} sent a packet to unknown address {dest}")]
    UnknownDestination { from: usize, dest: i64 },

    /// A packet was addressed to a node that has already halted.
    #[error("packet for node {address}, which has halted")]
    NodeHalted { address: usize },

    /// An amplifier chain finished without the last stage producing a signal.
    #[error("amplifier {stage} halted without producing a signal")]
    NoSignal { stage: usize },

    /// An amplifier in a feedback loop asked for a second input in one pass.
    #[error("amplifier {stage} is waiting for input nobody will send")]
    Stalled { stage: usize },

    /// A phase setting list that cannot drive the chain.
    #[error("invalid phase settings: {0}")]
    InvalidPhases(String),
}
