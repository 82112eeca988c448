//! Push-based payload propagation.
//!
//! A payload enters the graph at a pin or a node and travels depth-first
//! along edges, output pin to input pin:
//!
//! - **pin**: resolve the owner. Absent or muted owner drops the payload.
//!   An input pin hands it to the owner (node step); an output pin forwards it
//!   along each outgoing edge in edge creation order (edge step).
//! - **node**: a muted node drops the payload; otherwise its processor's
//!   [`handle`](crate::NodeProcessor::handle) runs. Continuing downstream is
//!   the processor's job.
//! - **edge**: resolve the target pin and deliver there (pin step). A stale
//!   edge drops the payload.
//!
//! There is no cycle detection; a processor that re-triggers itself through
//! a cycle recurses until the stack runs out.
//!
//! # Execution modes
//!
//! In [`DispatchMode::Inline`] every step runs on the caller's thread. In
//! [`DispatchMode::Worker`] every step runs on a freshly spawned worker
//! thread and the caller blocks until that step, including everything it
//! dispatched in turn, has finished. Nested steps repeat the hop, so a long
//! chain is a chain of blocking hops. Nothing is fire-and-forget. A panic in
//! a worker step resumes unwinding on the caller.
//!
//! # Consistency
//!
//! Each lookup takes the topology read lock on its own and releases it
//! before any hook runs. A structural mutation can therefore land between
//! two steps of one propagation: a node removed mid-flight simply stops
//! receiving, and an edge added mid-flight may or may not be followed. No
//! step ever observes a half-applied mutation.

use core::fmt;
use std::panic;
use std::thread;

use parking_lot::Mutex;
use tracing::{trace, warn};

use crate::edge::Edge;
use crate::graph::Graph;
use crate::id::{EdgeId, NodeId, PinId};
use crate::node::Node;
use crate::payload::Payload;
use crate::pin::{Pin, PinKind};

/// How dispatch steps and listener notifications execute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum DispatchMode {
    /// On the calling thread.
    Inline,
    /// On a spawned worker, with the caller blocked until it completes.
    #[default]
    Worker,
}

impl DispatchMode {
    /// Lowercase name, as used in configuration files.
    pub const fn name(self) -> &'static str {
        match self {
            DispatchMode::Inline => "inline",
            DispatchMode::Worker => "worker",
        }
    }
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Graph {
    /// Pushes `payload` into the graph at a pin.
    pub fn dispatch_pin(&self, pin: PinId, payload: &Payload) {
        self.run_step(|| self.pin_step(pin, payload));
    }

    /// Delivers `payload` to a node's processor, as if it arrived on
    /// `source`. Pass `None` to inject from outside the graph.
    pub fn dispatch_node(&self, node: NodeId, source: Option<&Pin>, payload: &Payload) {
        match self.node(node) {
            Some(target) => self.node_step(&target, source, payload),
            None => trace!(node = %node, "dispatch dropped: node not in graph"),
        }
    }

    /// Forwards `payload` along one edge.
    pub fn dispatch_edge(&self, edge: EdgeId, payload: &Payload) {
        match self.edge(edge) {
            Some(edge) => self.edge_step(&edge, payload),
            None => trace!(edge = %edge, "dispatch dropped: edge not in graph"),
        }
    }

    /// Pushes `payload` out of every output pin of `node`, in pin order.
    ///
    /// The usual tail of a forwarding processor's hook.
    pub fn dispatch_outputs(&self, node: &Node, payload: &Payload) {
        for pin in node.outs() {
            self.dispatch_pin(*pin, payload);
        }
    }

    fn pin_step(&self, pin_id: PinId, payload: &Payload) {
        let (pin, owner) = {
            let topology = self.topology.read();
            let Some(pin) = topology.pins.get(&pin_id).copied() else {
                trace!(pin = %pin_id, "dispatch dropped: pin not in graph");
                return;
            };
            (pin, topology.nodes.get(&pin.owner).cloned())
        };
        let Some(owner) = owner else {
            trace!(pin = %pin_id, "dispatch dropped: owner not in graph");
            return;
        };
        if owner.is_muted() {
            trace!(pin = %pin_id, node = %owner.id(), "dispatch dropped: owner muted");
            return;
        }
        match pin.kind {
            PinKind::In => self.node_step(&owner, Some(&pin), payload),
            PinKind::Out => {
                for edge in self.edges_from_pin(pin.id) {
                    self.edge_step(&edge, payload);
                }
            }
        }
    }

    fn node_step(&self, node: &Node, source: Option<&Pin>, payload: &Payload) {
        if node.is_muted() {
            trace!(node = %node.id(), "dispatch dropped: node muted");
            return;
        }
        self.run_step(|| node.processor().handle(self, node, source, payload));
    }

    fn edge_step(&self, edge: &Edge, payload: &Payload) {
        self.run_step(|| {
            if self.pin(edge.target_pin).is_some() {
                self.dispatch_pin(edge.target_pin, payload);
            } else {
                trace!(edge = %edge.id, "dispatch dropped: stale edge target");
            }
        });
    }

    /// Runs one unit of work according to the current dispatch mode and
    /// returns once it has completed.
    pub(crate) fn run_step<F>(&self, step: F)
    where
        F: FnOnce() + Send,
    {
        if self.dispatch_mode() == DispatchMode::Inline {
            step();
            return;
        }

        let slot = Mutex::new(Some(step));
        let take = || slot.lock().take();
        thread::scope(|scope| {
            let spawned = thread::Builder::new()
                .name(self.worker_thread_name.clone())
                .spawn_scoped(scope, || {
                    if let Some(step) = take() {
                        step();
                    }
                });
            match spawned {
                Ok(handle) => {
                    if let Err(panic) = handle.join() {
                        panic::resume_unwind(panic);
                    }
                }
                Err(err) => {
                    warn!(%err, "dispatch worker spawn failed, running step inline");
                    if let Some(step) = take() {
                        step();
                    }
                }
            }
        });
    }
}
