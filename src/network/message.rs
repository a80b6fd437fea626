//! Messages exchanged between network nodes.

use std::fmt;

/// Address intercepted by the orchestrator instead of being delivered to a node.
pub const NAT_ADDRESS: i64 = 255;

/// Value a node reads when it asks for input and nothing is queued.
pub const IDLE_INPUT: i64 = -1;

/// One packet: destination address and two payload words.
///
/// A node emits a packet as three consecutive outputs `dest, x, y`; the
/// receiving node reads `x` then `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Packet {
    pub dest: i64,
    pub x: i64,
    pub y: i64,
}

impl Packet {
    pub const fn new(dest: i64, x: i64, y: i64) -> Self {
        Self { dest, x, y }
    }

    /// Builds a packet from a `[dest, x, y]` output triple.
    pub fn from_triple(words: &[i64]) -> Option<Self> {
        match *words {
            [dest, x, y] => Some(Self { dest, x, y }),
            _ => None,
        }
    }

    /// Payload in delivery order.
    pub fn payload(&self) -> [i64; 2] {
        [self.x, self.y]
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <- ({}, {})", self.dest, self.x, self.y)
    }
}

/// Collects a node's outputs and cuts them into packets.
///
/// Outputs arrive one at a time, so a packet may be split across two
/// suspensions of the node; the partial words wait here until the triple is
/// complete.
#[derive(Clone, Debug, Default)]
pub struct PacketAssembler {
    partial: Vec<i64>,
}

impl PacketAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `outputs` and returns every packet completed by them.
    pub fn push(&mut self, outputs: impl IntoIterator<Item = i64>) -> Vec<Packet> {
        let mut packets = Vec::new();
        for word in outputs {
            self.partial.push(word);
            if let Some(packet) = Packet::from_triple(&self.partial) {
                packets.push(packet);
                self.partial.clear();
            }
        }
        packets
    }

    /// Words of an unfinished packet.
    pub fn pending(&self) -> usize {
        self.partial.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triples_become_packets() {
        assert_eq!(Packet::from_triple(&[3, 4, 5]), Some(Packet::new(3, 4, 5)));
        assert_eq!(Packet::from_triple(&[3, 4]), None);
        assert_eq!(Packet::new(3, 4, 5).payload(), [4, 5]);
    }

    #[test]
    fn assembler_keeps_partial_packets() {
        let mut asm = PacketAssembler::new();
        assert!(asm.push([1, 2]).is_empty());
        assert_eq!(asm.pending(), 2);
        assert_eq!(
            asm.push([3, 255, 0, 9, 7]),
            vec![Packet::new(1, 2, 3), Packet::new(255, 0, 9)]
        );
        assert_eq!(asm.pending(), 1);
    }

    #[test]
    fn display() {
        assert_eq!(Packet::new(255, -1, 42).to_string(), "255 <- (-1, 42)");
    }
}
