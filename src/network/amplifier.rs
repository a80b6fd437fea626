//! Amplifier chains.
//!
//! Every amplifier runs its own copy of the same program. Each is first given
//! its phase setting, then the signal produced by the previous stage (0 for
//! the first). In a feedback loop the last stage's output goes back to the
//! first stage until the amplifiers halt.

use crate::debug;
use crate::network::errors::NetworkError;
use crate::virtual_machine::program::Program;
use crate::virtual_machine::vm::{Machine, StepResult};

/// Phase settings for a single-pass chain.
pub const CHAIN_PHASES: [i64; 5] = [0, 1, 2, 3, 4];
/// Phase settings for a feedback loop.
pub const FEEDBACK_PHASES: [i64; 5] = [5, 6, 7, 8, 9];

/// Best phase ordering found by [`max_signal`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BestSignal {
    pub signal: i64,
    pub phases: Vec<i64>,
}

fn boot(program: &Program, phases: &[i64]) -> Result<Vec<Machine>, NetworkError> {
    if phases.is_empty() {
        return Err(NetworkError::InvalidPhases("no amplifiers".into()));
    }
    Ok(phases
        .iter()
        .map(|&phase| {
            let mut amp = Machine::new(program);
            amp.provide_input(phase);
            amp
        })
        .collect())
}

/// Runs each amplifier to completion once, feeding its output to the next.
///
/// Returns the signal produced by the last amplifier.
pub fn run_chain(program: &Program, phases: &[i64]) -> Result<i64, NetworkError> {
    let mut signal = 0;
    for (stage, mut amp) in boot(program, phases)?.into_iter().enumerate() {
        amp.provide_input(signal);
        let outputs = amp
            .run()
            .map_err(|source| NetworkError::Node {
                address: stage,
                source,
            })?;
        signal = *outputs.last().ok_or(NetworkError::NoSignal { stage })?;
        debug!("amp {stage} -> {signal}");
    }
    Ok(signal)
}

/// Runs the amplifiers round-robin, each stopping after one output, until
/// one of them halts.
///
/// Returns the last signal the final amplifier produced.
pub fn run_feedback_loop(program: &Program, phases: &[i64]) -> Result<i64, NetworkError> {
    let mut amps = boot(program, phases)?;
    let last = amps.len() - 1;
    let mut signal = 0;
    let mut thruster = None;

    'rounds: loop {
        for (stage, amp) in amps.iter_mut().enumerate() {
            amp.provide_input(signal);
            match amp.run_until_suspend(true) {
                StepResult::ProducedOutput(value) => {
                    amp.read_output();
                    signal = value;
                    if stage == last {
                        thruster = Some(value);
                    }
                }
                StepResult::Halted => break 'rounds,
                StepResult::NeedsInput => return Err(NetworkError::Stalled { stage }),
                StepResult::Faulted(source) => {
                    return Err(NetworkError::Node {
                        address: stage,
                        source,
                    });
                }
                StepResult::Continued(_) => {}
            }
        }
        debug!("feedback round -> {signal}");
    }

    thruster.ok_or(NetworkError::NoSignal { stage: last })
}

/// Tries every ordering of `phases` and returns the one giving the highest signal.
pub fn max_signal(
    program: &Program,
    phases: &[i64],
    feedback: bool,
) -> Result<BestSignal, NetworkError> {
    let mut best: Option<BestSignal> = None;
    for order in permutations(phases) {
        let signal = if feedback {
            run_feedback_loop(program, &order)?
        } else {
            run_chain(program, &order)?
        };
        if best.as_ref().is_none_or(|b| signal > b.signal) {
            best = Some(BestSignal {
                signal,
                phases: order,
            });
        }
    }
    best.ok_or_else(|| NetworkError::InvalidPhases("no amplifiers".into()))
}

/// Every ordering of `items`, generated with Heap's algorithm.
pub fn permutations(items: &[i64]) -> Vec<Vec<i64>> {
    let mut items = items.to_vec();
    let n = items.len();
    if n == 0 {
        return Vec::new();
    }

    let mut out = vec![items.clone()];
    let mut counters = vec![0; n];
    let mut i = 1;
    while i < n {
        if counters[i] < i {
            let j = if i % 2 == 0 { 0 } else { counters[i] };
            items.swap(j, i);
            out.push(items.clone());
            counters[i] += 1;
            i = 1;
        } else {
            counters[i] = 0;
            i += 1;
        }
    }
    out
}
