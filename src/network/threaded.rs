//! Packet network with one tokio task per node.
//!
//! Nodes report everything they do (packets, halts, faults) on one shared
//! event channel. The orchestrator is the only party that delivers packets: it
//! looks the destination up in the routing table and pushes the payload onto
//! that node's inbox. When no event arrives within the idle timeout and every
//! inbox is empty, the network is idle and the NAT decides what happens next.
//! Ending the run aborts every node task; undelivered packets are dropped.
//! Nodes execute in slices of [`SLICE_STEPS`] instructions and yield between
//! slices, so a node spinning without I/O can still be aborted and never
//! starves the orchestrator.

use crate::network::errors::NetworkError;
use crate::network::message::{Packet, PacketAssembler};
use crate::network::nat::{IdleAction, Nat};
use crate::network::{NatOutcome, NetworkOps};
use crate::virtual_machine::errors::Fault;
use crate::virtual_machine::program::Program;
use crate::virtual_machine::vm::{Machine, StepResult};
use crate::{debug, info, warn};
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc::{self, Receiver, Sender, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// Instructions a node runs before yielding back to the scheduler.
pub const SLICE_STEPS: u64 = 1024;

/// What a node task tells the orchestrator.
#[derive(Debug)]
enum Event {
    Packet { from: usize, packet: Packet },
    Halted { address: usize },
    Faulted { address: usize, fault: Fault },
}

/// Orchestrator's handle on one live node.
#[derive(Clone)]
struct Route {
    inbox: UnboundedSender<[i64; 2]>,
    /// Packets delivered but not yet taken by the node.
    pending: Arc<AtomicUsize>,
}

/// Routing table shared by the orchestrator and the node tasks. A node
/// removes its own entry when it halts.
type Routes = Arc<DashMap<usize, Route>>;

/// Runs `ops.nodes` copies of `program`, each on its own task, until the stop
/// condition is met.
pub async fn run_threaded(program: &Program, ops: &NetworkOps) -> Result<NatOutcome, NetworkError> {
    let routes: Routes = Arc::new(DashMap::new());
    let (events_tx, mut events) = mpsc::channel::<Event>(ops.channel_capacity.max(1));

    let mut handles = Vec::with_capacity(ops.nodes);
    for address in 0..ops.nodes {
        let (inbox, rx) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));
        routes.insert(
            address,
            Route {
                inbox,
                pending: pending.clone(),
            },
        );
        handles.push(spawn_node(
            address,
            program.clone(),
            ops.clone(),
            rx,
            pending,
            events_tx.clone(),
            routes.clone(),
        ));
    }
    drop(events_tx);
    info!("started {} node tasks", ops.nodes);

    let result = orchestrate(&routes, &mut events, ops).await;

    for handle in &handles {
        handle.abort();
    }
    routes.clear();
    result
}

async fn orchestrate(
    routes: &Routes,
    events: &mut Receiver<Event>,
    ops: &NetworkOps,
) -> Result<NatOutcome, NetworkError> {
    let mut nat = Nat::new(ops.stop);
    let mut open = true;

    loop {
        let event = if open {
            match timeout(ops.idle_timeout, events.recv()).await {
                Ok(Some(event)) => Some(event),
                Ok(None) => {
                    // Every node task has exited.
                    open = false;
                    None
                }
                Err(_) => None,
            }
        } else {
            None
        };

        match event {
            Some(Event::Packet { from, packet }) => {
                debug!("{from} -> {packet}");
                if packet.dest == ops.nat_address {
                    if let Some(outcome) = nat.receive(packet) {
                        return Ok(outcome);
                    }
                    continue;
                }
                let dest = usize::try_from(packet.dest)
                    .ok()
                    .filter(|dest| *dest < ops.nodes)
                    .ok_or(NetworkError::UnknownDestination {
                        from,
                        dest: packet.dest,
                    })?;
                deliver(routes, dest, packet)?;
            }
            Some(Event::Halted { address }) => info!("node {address} halted"),
            Some(Event::Faulted { address, fault }) => {
                return Err(NetworkError::Node {
                    address,
                    source: fault,
                });
            }
            None => {
                if busy(routes) {
                    continue;
                }
                match nat.on_idle()? {
                    IdleAction::Done(outcome) => return Ok(outcome),
                    IdleAction::Wake(packet) => {
                        info!("network idle, waking node 0 with {packet}");
                        deliver(routes, 0, packet)?;
                    }
                }
            }
        }
    }
}

/// Returns `true` while any live node has packets waiting in its inbox.
fn busy(routes: &Routes) -> bool {
    routes
        .iter()
        .any(|route| route.pending.load(Ordering::Acquire) > 0)
}

fn deliver(routes: &Routes, address: usize, packet: Packet) -> Result<(), NetworkError> {
    let route = routes
        .get(&address)
        .map(|entry| entry.value().clone())
        .ok_or(NetworkError::NodeHalted { address })?;

    route.pending.fetch_add(1, Ordering::AcqRel);
    if route.inbox.send(packet.payload()).is_err() {
        route.pending.fetch_sub(1, Ordering::AcqRel);
        return Err(NetworkError::NodeHalted { address });
    }
    Ok(())
}

fn spawn_node(
    address: usize,
    program: Program,
    ops: NetworkOps,
    mut inbox: UnboundedReceiver<[i64; 2]>,
    pending: Arc<AtomicUsize>,
    events: Sender<Event>,
    routes: Routes,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut machine = Machine::with_ops(&program, ops.machine);
        let mut framer = PacketAssembler::new();
        machine.provide_input(address as i64);

        loop {
            match machine.run_for(SLICE_STEPS, true) {
                StepResult::ProducedOutput(_) => {
                    for packet in framer.push(machine.drain_output()) {
                        if events.send(Event::Packet { from: address, packet }).await.is_err() {
                            return;
                        }
                    }
                }
                StepResult::NeedsInput => match timeout(ops.poll_interval, inbox.recv()).await {
                    Ok(Some(payload)) => {
                        machine.provide_input_sequence(payload);
                        pending.fetch_sub(1, Ordering::AcqRel);
                    }
                    Ok(None) => return,
                    Err(_) => machine.provide_input(ops.idle_input),
                },
                StepResult::Halted => {
                    routes.remove(&address);
                    if pending.load(Ordering::Acquire) > 0 {
                        warn!("node {address} halted with undelivered packets");
                    }
                    let _ = events.send(Event::Halted { address }).await;
                    return;
                }
                StepResult::Faulted(fault) => {
                    routes.remove(&address);
                    let _ = events.send(Event::Faulted { address, fault }).await;
                    return;
                }
                StepResult::Continued(_) => tokio::task::yield_now().await,
            }
        }
    })
}
