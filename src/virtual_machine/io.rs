//! I/O channel between a running machine and whoever drives it.
//!
//! The [`Io`] trait is the only way the engine reaches the outside world: it
//! pulls inputs one at a time and pushes outputs one at a time. [`IoQueues`]
//! is the plain FIFO implementation every machine owns by default.

use std::collections::VecDeque;

/// Input source and output sink for one machine.
pub trait Io {
    /// Takes the next input, or `None` if nothing is queued yet.
    fn read_input(&mut self) -> Option<i64>;
    /// Appends one output value.
    fn write_output(&mut self, value: i64);
}

/// FIFO input and output queues.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IoQueues {
    inputs: VecDeque<i64>,
    outputs: VecDeque<i64>,
}

impl IoQueues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates queues with `inputs` already pending.
    pub fn with_inputs(inputs: impl IntoIterator<Item = i64>) -> Self {
        Self {
            inputs: inputs.into_iter().collect(),
            outputs: VecDeque::new(),
        }
    }

    pub fn push_input(&mut self, value: i64) {
        self.inputs.push_back(value);
    }

    pub fn extend_inputs(&mut self, values: impl IntoIterator<Item = i64>) {
        self.inputs.extend(values);
    }

    /// Removes and returns the oldest unread output.
    pub fn pop_output(&mut self) -> Option<i64> {
        self.outputs.pop_front()
    }

    /// Removes and returns all unread outputs in emission order.
    pub fn drain_outputs(&mut self) -> Vec<i64> {
        self.outputs.drain(..).collect()
    }

    pub fn pending_inputs(&self) -> usize {
        self.inputs.len()
    }

    pub fn pending_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Drops every queued input and output.
    pub fn clear(&mut self) {
        self.inputs.clear();
        self.outputs.clear();
    }
}

impl Io for IoQueues {
    fn read_input(&mut self) -> Option<i64> {
        self.inputs.pop_front()
    }

    fn write_output(&mut self, value: i64) {
        self.outputs.push_back(value);
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// Io that records every interaction, for checking that the engine goes through the trait.
    #[derive(Default)]
    pub struct RecordingIo {
        pub inputs: VecDeque<i64>,
        pub outputs: Vec<i64>,
        pub reads: usize,
    }

    impl RecordingIo {
        pub fn with_inputs(inputs: &[i64]) -> Self {
            Self {
                inputs: inputs.iter().copied().collect(),
                ..Self::default()
            }
        }
    }

    impl Io for RecordingIo {
        fn read_input(&mut self) -> Option<i64> {
            self.reads += 1;
            self.inputs.pop_front()
        }

        fn write_output(&mut self, value: i64) {
            self.outputs.push(value);
        }
    }

    #[test]
    fn inputs_are_consumed_in_order() {
        let mut io = IoQueues::with_inputs([1, 2]);
        io.push_input(3);
        assert_eq!(io.read_input(), Some(1));
        assert_eq!(io.read_input(), Some(2));
        assert_eq!(io.read_input(), Some(3));
        assert_eq!(io.read_input(), None);
    }

    #[test]
    fn outputs_keep_emission_order() {
        let mut io = IoQueues::new();
        io.write_output(0);
        io.write_output(9);
        io.write_output(0);
        assert_eq!(io.pending_outputs(), 3);
        assert_eq!(io.pop_output(), Some(0));
        assert_eq!(io.drain_outputs(), vec![9, 0]);
        assert_eq!(io.pop_output(), None);
    }

    #[test]
    fn clear_discards_everything() {
        let mut io = IoQueues::with_inputs([1]);
        io.write_output(2);
        io.clear();
        assert_eq!(io, IoQueues::new());
    }
}
