//! Shared fixtures for tests.

#[cfg(test)]
pub mod utils {
    use crate::virtual_machine::program::Program;

    /// Emits its own source, one word per output.
    pub const QUINE: &str = "109,1,204,-1,1001,100,1,100,1008,100,16,101,1006,101,0,99";

    /// Outputs `34915192 * 34915192`.
    pub const BIG_PRODUCT: &str = "1102,34915192,34915192,7,4,7,99,0";

    /// Outputs `1125899906842624`.
    pub const BIG_LITERAL: &str = "104,1125899906842624,99";

    /// Reads one input and outputs 999 below eight, 1000 at eight, 1001 above.
    pub const COMPARE_TO_EIGHT: &str = "3,21,1008,21,8,20,1005,20,22,107,8,21,20,1006,20,31,\
        1106,0,36,98,0,0,1002,21,125,20,4,20,1105,1,46,104,999,1105,1,46,1101,1000,1,20,4,20,\
        1105,1,46,98,99";

    /// Amplifier program for single-pass chains: `output = 10 * input + phase`.
    pub const AMP_CHAIN_A: &str = "3,15,3,16,1002,16,10,16,1,16,15,15,4,15,99,0,0";

    pub const AMP_CHAIN_B: &str =
        "3,23,3,24,1002,24,10,24,1002,23,-1,23,101,5,23,23,1,24,23,23,4,23,99,0,0";

    pub const AMP_CHAIN_C: &str = "3,31,3,32,1002,32,10,32,1001,31,-2,31,1007,31,0,33,1002,\
        33,7,33,1,33,31,31,1,32,31,31,4,31,99,0,0,0";

    /// Feedback-loop amplifier; phases `[9,8,7,6,5]` give 139629729.
    pub const AMP_FEEDBACK_A: &str = "3,26,1001,26,-4,26,3,27,1002,27,2,27,1,27,26,27,4,27,\
        1001,28,-1,28,1005,28,6,99,0,0,5";

    /// Feedback-loop amplifier; phases `[9,7,8,5,6]` give 18216.
    pub const AMP_FEEDBACK_B: &str = "3,52,1001,52,-5,52,3,53,1,52,56,54,1007,54,5,55,1005,55,\
        26,1001,54,-5,54,1105,1,12,1,53,54,53,1008,54,0,55,1001,55,1,55,2,53,55,53,4,53,1001,\
        56,-1,56,1005,56,6,99,0,0,0,0,10";

    /// Packet-network node for a five-node ring.
    ///
    /// Boots by reading its address `A`. Node 0 then sends `(1, 7, 0)`. Every
    /// node polls for a packet (skipping the idle value -1), and on receiving
    /// `(x, y)` forwards `(A + 1, x, A)`; node 4 forwards to the NAT at 255
    /// instead. The first NAT packet is therefore `(7, 4)`, and waking node 0
    /// with it reproduces exactly the same packet.
    pub const RING_NODE: &str = "3,100,1008,100,0,101,1006,101,15,104,1,104,7,104,0,\
        3,102,1008,102,-1,101,1005,101,15,3,103,101,1,100,104,1001,100,0,103,1008,104,5,101,\
        1006,101,45,1101,0,255,104,4,104,4,102,4,103,1105,1,15,99";

    /// Node that halts right after reading its address.
    pub const HALTING_NODE: &str = "3,10,99";

    /// Node that reads its address and then executes an invalid opcode.
    pub const FAULTING_NODE: &str = "3,10,42";

    /// Parses a fixture, panicking on malformed text.
    pub fn program(source: &str) -> Program {
        Program::parse(source).expect("fixture program must parse")
    }
}
