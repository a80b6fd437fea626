//! NAT monitor: buffers packets sent to the NAT address and decides what to do
//! when the network goes idle.

use crate::network::errors::NetworkError;
use crate::network::message::Packet;
use crate::network::{NatOutcome, StopCondition};

/// What the scheduler should do after the network went idle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdleAction {
    /// Deliver this packet to node 0.
    Wake(Packet),
    /// The run is over.
    Done(NatOutcome),
}

#[derive(Clone, Debug)]
pub struct Nat {
    stop: StopCondition,
    buffered: Option<Packet>,
    last_sent: Option<Packet>,
    wakes: usize,
}

impl Nat {
    pub fn new(stop: StopCondition) -> Self {
        Self {
            stop,
            buffered: None,
            last_sent: None,
            wakes: 0,
        }
    }

    /// Buffers a packet addressed to the NAT. Only the latest one is kept.
    ///
    /// Returns the outcome if this packet ends the run.
    pub fn receive(&mut self, packet: Packet) -> Option<NatOutcome> {
        self.buffered = Some(packet);
        match self.stop {
            StopCondition::FirstNatPacket => Some(NatOutcome {
                packet,
                wakes: self.wakes,
            }),
            StopCondition::RepeatedWake => None,
        }
    }

    /// Handles an idle network.
    ///
    /// Wakes node 0 with the buffered packet unless it is the same packet as
    /// the previous wake, in which case the run ends.
    pub fn on_idle(&mut self) -> Result<IdleAction, NetworkError> {
        let packet = self
            .buffered
            .ok_or(NetworkError::Deadlock { wakes: self.wakes })?;

        if self.last_sent == Some(packet) {
            return Ok(IdleAction::Done(NatOutcome {
                packet,
                wakes: self.wakes,
            }));
        }

        self.last_sent = Some(packet);
        self.wakes += 1;
        Ok(IdleAction::Wake(packet))
    }

    pub fn wakes(&self) -> usize {
        self.wakes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P: Packet = Packet::new(255, 7, 4);

    #[test]
    fn first_packet_ends_run() {
        let mut nat = Nat::new(StopCondition::FirstNatPacket);
        assert_eq!(nat.receive(P), Some(NatOutcome { packet: P, wakes: 0 }));
    }

    #[test]
    fn idle_without_packet_is_deadlock() {
        let mut nat = Nat::new(StopCondition::RepeatedWake);
        assert_eq!(nat.on_idle(), Err(NetworkError::Deadlock { wakes: 0 }));
    }

    #[test]
    fn repeated_packet_ends_run() {
        let mut nat = Nat::new(StopCondition::RepeatedWake);
        assert_eq!(nat.receive(P), None);
        assert_eq!(nat.on_idle(), Ok(IdleAction::Wake(P)));
        assert_eq!(nat.receive(P), None);
        assert_eq!(
            nat.on_idle(),
            Ok(IdleAction::Done(NatOutcome { packet: P, wakes: 1 }))
        );
    }

    #[test]
    fn changed_packet_wakes_again() {
        let mut nat = Nat::new(StopCondition::RepeatedWake);
        nat.receive(P);
        nat.on_idle().unwrap();
        let q = Packet::new(255, 7, 5);
        nat.receive(q);
        assert_eq!(nat.on_idle(), Ok(IdleAction::Wake(q)));
        assert_eq!(nat.wakes(), 2);
    }

    #[test]
    fn idle_twice_without_new_packet_ends_run() {
        let mut nat = Nat::new(StopCondition::RepeatedWake);
        nat.receive(P);
        nat.on_idle().unwrap();
        assert!(matches!(nat.on_idle(), Ok(IdleAction::Done(_))));
    }
}
