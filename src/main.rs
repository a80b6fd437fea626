//! Command-line front end for the Intcode machine.
//!
//! # Usage
//! ```text
//! intcode <command> <file> [OPTIONS]
//! ```
//!
//! # Commands
//! - `run`: Run a program on the given inputs and print its outputs
//! - `amp`: Run an amplifier chain or feedback loop, or search for the best phases
//! - `net`: Run a packet network of nodes until the NAT stop condition
//! - `disasm`: Print a linear-sweep disassembly
//!
//! The log level is read from `INTCODE_LOG` (`debug|info|warn|error`);
//! `--verbose` forces debug logging, which traces every executed instruction.

use intcode::network::amplifier::{
    CHAIN_PHASES, FEEDBACK_PHASES, max_signal, run_chain, run_feedback_loop,
};
use intcode::network::cooperative::run_cooperative;
use intcode::network::errors::NetworkError;
use intcode::network::threaded::run_threaded;
use intcode::network::{NetworkOps, StopCondition};
use intcode::utils::log::{self, Level};
use intcode::virtual_machine::disassembler::disassemble;
use intcode::virtual_machine::errors::{Fault, VMError};
use intcode::virtual_machine::program::Program;
use intcode::virtual_machine::vm::{Machine, MachineOps, StepResult};
use intcode::{error, info, warn};
use std::env;
use std::process;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Vm(#[from] VMError),
    #[error(transparent)]
    Fault(#[from] Fault),
    #[error(transparent)]
    Network(#[from] NetworkError),
}

#[tokio::main]
async fn main() {
    let mut args: Vec<String> = env::args().collect();
    let program_name = args.first().cloned().unwrap_or_else(|| "intcode".into());

    if let Err(e) = log::init_from_env() {
        warn!("ignoring {}: {e}", log::LOG_ENV);
    }
    let before = args.len();
    args.retain(|a| a != "--verbose" && a != "-v");
    if args.len() != before {
        log::set_level(Level::Debug);
    }

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage(&program_name);
        process::exit(if args.len() < 2 { 1 } else { 0 });
    }
    if args.len() < 3 {
        eprintln!("{} requires a program file\n", args[1]);
        print_usage(&program_name);
        process::exit(1);
    }

    let program = match Program::from_file(&args[2]) {
        Ok(program) => program,
        Err(e) => {
            error!("failed to load {}: {e}", args[2]);
            process::exit(1);
        }
    };
    info!("loaded {} ({} words)", args[2], program.len());

    let options = &args[3..];
    let result = match args[1].as_str() {
        "run" => cmd_run(&program, options),
        "amp" => cmd_amp(&program, options),
        "net" => cmd_net(&program, options).await,
        "disasm" => cmd_disasm(&program, options),
        other => Err(CliError::Usage(format!("unknown command: {other}"))),
    };

    if let Err(e) = result {
        error!("{e}");
        if matches!(e, CliError::Usage(_)) {
            print_usage(&program_name);
        }
        process::exit(1);
    }
}

fn cmd_run(program: &Program, options: &[String]) -> Result<(), CliError> {
    let mut inputs = Vec::new();
    let mut ascii: Option<String> = None;
    let mut ops = MachineOps::default();

    let mut i = 0;
    while i < options.len() {
        match options[i].as_str() {
            "--input" => {
                inputs.extend(parse_list(value_of(options, &mut i)?)?);
            }
            "--ascii" => {
                ascii = Some(value_of(options, &mut i)?.to_string());
            }
            "--max-steps" => {
                ops.step_limit = Some(parse_number(value_of(options, &mut i)?)?);
            }
            other => return Err(unexpected(other)),
        }
        i += 1;
    }

    let mut machine = Machine::with_ops(program, ops);
    machine.provide_input_sequence(inputs);
    if let Some(text) = &ascii {
        machine.provide_ascii(text);
    }

    let result = machine.run_until_suspend(false);
    if ascii.is_some() {
        print!("{}", machine.read_ascii());
    } else {
        let outputs: Vec<String> = machine.drain_output().iter().map(i64::to_string).collect();
        println!("{}", outputs.join(","));
    }
    info!("executed {} instructions", machine.steps());

    match result {
        StepResult::Halted => Ok(()),
        StepResult::Faulted(fault) => Err(fault.into()),
        StepResult::NeedsInput => Err(VMError::InputExhausted { ip: machine.ip() }.into()),
        StepResult::Continued(_) | StepResult::ProducedOutput(_) => Ok(()),
    }
}

fn cmd_amp(program: &Program, options: &[String]) -> Result<(), CliError> {
    let mut feedback = false;
    let mut phases: Option<Vec<i64>> = None;

    let mut i = 0;
    while i < options.len() {
        match options[i].as_str() {
            "--feedback" => feedback = true,
            "--phases" => phases = Some(parse_list(value_of(options, &mut i)?)?),
            other => return Err(unexpected(other)),
        }
        i += 1;
    }

    match phases {
        Some(phases) => {
            let signal = if feedback {
                run_feedback_loop(program, &phases)?
            } else {
                run_chain(program, &phases)?
            };
            println!("{signal}");
        }
        None => {
            let candidates = if feedback { FEEDBACK_PHASES } else { CHAIN_PHASES };
            let best = max_signal(program, &candidates, feedback)?;
            info!("best phases {:?}", best.phases);
            println!("{}", best.signal);
        }
    }
    Ok(())
}

async fn cmd_net(program: &Program, options: &[String]) -> Result<(), CliError> {
    let mut ops = NetworkOps::default();
    let mut threaded = false;

    let mut i = 0;
    while i < options.len() {
        match options[i].as_str() {
            "--nodes" => ops.nodes = parse_number(value_of(options, &mut i)?)?,
            "--threaded" => threaded = true,
            "--until" => {
                ops.stop = value_of(options, &mut i)?
                    .parse::<StopCondition>()
                    .map_err(CliError::Usage)?;
            }
            "--idle-ms" => {
                ops.idle_timeout = Duration::from_millis(parse_number(value_of(options, &mut i)?)?);
            }
            "--max-steps" => {
                ops.machine.step_limit = Some(parse_number(value_of(options, &mut i)?)?);
            }
            other => return Err(unexpected(other)),
        }
        i += 1;
    }

    let outcome = if threaded {
        run_threaded(program, &ops).await?
    } else {
        run_cooperative(program, &ops)?
    };
    info!("{outcome}");
    println!("{}", outcome.packet.y);
    Ok(())
}

fn cmd_disasm(program: &Program, options: &[String]) -> Result<(), CliError> {
    if let Some(extra) = options.first() {
        return Err(unexpected(extra));
    }
    print!("{}", disassemble(program));
    Ok(())
}

/// Advances `i` to the value following an option and returns it.
fn value_of<'a>(options: &'a [String], i: &mut usize) -> Result<&'a str, CliError> {
    let flag = &options[*i];
    *i += 1;
    options
        .get(*i)
        .map(String::as_str)
        .ok_or_else(|| CliError::Usage(format!("{flag} requires an argument")))
}

fn parse_number<T: std::str::FromStr>(raw: &str) -> Result<T, CliError> {
    raw.trim()
        .parse()
        .map_err(|_| CliError::Usage(format!("invalid number: {raw}")))
}

fn parse_list(raw: &str) -> Result<Vec<i64>, CliError> {
    raw.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(parse_number)
        .collect()
}

fn unexpected(arg: &str) -> CliError {
    CliError::Usage(format!("unexpected argument: {arg}"))
}

const USAGE: &str = "\
Intcode virtual machine

USAGE:
    {program} <command> <file> [OPTIONS]

COMMANDS:
    run <file>       Run a program and print its outputs
    amp <file>       Run amplifiers; without --phases, search for the best ordering
    net <file>       Run a packet network and print the Y value of the final NAT packet
    disasm <file>    Print a disassembly

RUN OPTIONS:
    --input <a,b,..>    Inputs queued before the program starts
    --ascii <text>      Queue text as character codes and print output as text
    --max-steps <n>     Fault after n instructions

AMP OPTIONS:
    --feedback          Feed the last amplifier back into the first (phases 5-9)
    --phases <a,b,..>   Run exactly this phase ordering

NET OPTIONS:
    --nodes <n>              Number of nodes (default 50)
    --threaded               One task per node instead of round-robin
    --until <first|repeat>   Stop at the first NAT packet, or at the first repeated wake
    --idle-ms <ms>           Threaded idle timeout (default 300)
    --max-steps <n>          Per-node instruction limit

GLOBAL OPTIONS:
    -v, --verbose    Debug logging, including an instruction trace
    -h, --help       Print this help message

ENVIRONMENT:
    INTCODE_LOG    Minimum log level: debug, info, warn or error

EXAMPLES:
    {program} run day09.txt --input 1
    {program} amp day07.txt --feedback
    {program} net day23.txt --threaded --until first
";

/// Prints usage information to stderr.
fn print_usage(program: &str) {
    eprintln!("{}", USAGE.replace("{program}", program));
}
