//! Graph container and mutation API.
//!
//! [`Graph`] owns every node, a flattened index of every pin, and every edge.
//! All structural mutation (add/remove node, connect/disconnect) takes the
//! topology write lock for its whole duration, so mutations are fully
//! serialized. Dispatch takes the read lock only for individual lookups and
//! never while a processor hook or listener runs; see
//! [`dispatch`](crate::dispatch) for what that means for in-flight payloads.
//!
//! # Invariants
//!
//! After every mutation:
//!
//! 1. every edge references nodes present in the graph;
//! 2. every pin listed by a node is in the pin index with that node as owner,
//!    and every indexed pin belongs to a present node;
//! 3. no two edges join the same (source pin, target pin) pair.
//!
//! [`Graph::check_integrity`] audits these.
//!
//! # Example
//!
//! ```rust,ignore
//! let graph = Graph::new();
//! let a = Node::new(&graph, "a", 0, 1, Box::new(Source));
//! let b = Node::new(&graph, "b", 1, 0, Box::new(Sink::default()));
//! let (out, inp) = (a.outs()[0], b.ins()[0]);
//! graph.add_node(a);
//! graph.add_node(b);
//! let edge = graph.connect(out, inp).expect("fresh pins");
//! graph.dispatch_pin(out, &Payload::new(42));
//! ```

use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::dispatch::DispatchMode;
use crate::edge::Edge;
use crate::error::{ConnectError, IntegrityError};
use crate::event::{GraphEvent, GraphListener, Listeners};
use crate::id::{EdgeId, IdProvider, Identifier, NodeId, PinId};
use crate::node::Node;
use crate::pin::{Pin, PinKind};

/// Default name of dispatch worker threads.
pub const DEFAULT_WORKER_THREAD_NAME: &str = "hkgraph-dispatch";

/// Construction-time settings of a [`Graph`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphOptions {
    /// Initial dispatch mode. Can be changed later with
    /// [`Graph::set_dispatch_mode`].
    pub mode: DispatchMode,
    /// Also emit [`GraphEvent::NodeAdded`] and [`GraphEvent::EdgeAdded`].
    pub notify_additions: bool,
    /// Name given to dispatch worker threads.
    pub worker_thread_name: String,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            mode: DispatchMode::default(),
            notify_additions: false,
            worker_thread_name: DEFAULT_WORKER_THREAD_NAME.to_owned(),
        }
    }
}

/// Node, pin and edge counts of a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphStats {
    /// Number of nodes.
    pub nodes: usize,
    /// Number of indexed pins.
    pub pins: usize,
    /// Number of edges.
    pub edges: usize,
    /// Number of registered listeners.
    pub listeners: usize,
    /// Current dispatch mode.
    pub mode: DispatchMode,
}

impl fmt::Display for GraphStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Graph [nodes: {}, edges: {}, pins: {}, listeners: {}, mode: {}]",
            self.nodes, self.edges, self.pins, self.listeners, self.mode
        )
    }
}

fn sanitize_thread_name(name: String) -> String {
    if !name.contains('\0') {
        return name;
    }
    let cleaned: String = name.chars().filter(|&c| c != '\0').collect();
    warn!(name = %cleaned, "worker thread name contained NUL bytes, stripped");
    if cleaned.is_empty() {
        DEFAULT_WORKER_THREAD_NAME.to_owned()
    } else {
        cleaned
    }
}

/// Everything guarded by the topology lock.
#[derive(Default)]
pub(crate) struct Topology {
    pub(crate) nodes: HashMap<NodeId, Arc<Node>>,
    pub(crate) pins: HashMap<PinId, Pin>,
    pub(crate) edges: HashMap<EdgeId, Edge>,
    /// Edges keyed by their source pin, in creation order.
    pub(crate) outgoing: HashMap<PinId, Vec<EdgeId>>,
}

impl Topology {
    fn accepts(&self, node: &Node) -> bool {
        if self.nodes.contains_key(&node.id()) {
            return false;
        }
        let mut seen = HashSet::new();
        node.pin_ids()
            .all(|pin| !self.pins.contains_key(&pin) && seen.insert(pin))
    }

    fn insert_node(&mut self, node: Node) {
        for pin in node.pins() {
            self.pins.insert(pin.id, pin);
        }
        self.nodes.insert(node.id(), Arc::new(node));
    }

    /// Edges first, then pins, then the node itself.
    fn remove_node(&mut self, id: NodeId) -> Option<Arc<Node>> {
        let node = self.nodes.get(&id).cloned()?;

        let incident: Vec<EdgeId> = self
            .edges
            .values()
            .filter(|edge| edge.touches(id))
            .map(|edge| edge.id)
            .collect();
        for edge_id in incident {
            self.unlink(edge_id);
        }

        for pin in node.pin_ids() {
            self.pins.remove(&pin);
            self.outgoing.remove(&pin);
        }

        self.nodes.remove(&id)
    }

    fn find_edge(&self, source_pin: PinId, target_pin: PinId) -> Option<&Edge> {
        self.outgoing
            .get(&source_pin)?
            .iter()
            .filter_map(|id| self.edges.get(id))
            .find(|edge| edge.joins(source_pin, target_pin))
    }

    /// Endpoints for a new edge, or `None` for a duplicate or unknown pin.
    fn endpoints(&self, source_pin: PinId, target_pin: PinId) -> Option<(Pin, Pin)> {
        if self.find_edge(source_pin, target_pin).is_some() {
            return None;
        }
        let source = self.pins.get(&source_pin)?;
        let target = self.pins.get(&target_pin)?;
        Some((*source, *target))
    }

    fn link(&mut self, id: EdgeId, source: Pin, target: Pin) -> Edge {
        let edge = Edge {
            id,
            source_node: source.owner,
            source_pin: source.id,
            target_node: target.owner,
            target_pin: target.id,
        };
        self.edges.insert(id, edge);
        self.outgoing.entry(source.id).or_default().push(id);
        edge
    }

    fn unlink(&mut self, id: EdgeId) -> Option<Edge> {
        let edge = self.edges.remove(&id)?;
        if let Some(list) = self.outgoing.get_mut(&edge.source_pin) {
            list.retain(|e| *e != id);
            if list.is_empty() {
                self.outgoing.remove(&edge.source_pin);
            }
        }
        Some(edge)
    }

    /// Legality predicate of the editor: both pins known, opposite kinds,
    /// different owners, not yet connected. Returns the pair oriented
    /// output first.
    fn legal_pair(&self, a: PinId, b: PinId) -> Result<(Pin, Pin), ConnectError> {
        let pa = *self.pins.get(&a).ok_or(ConnectError::UnknownPin(a))?;
        let pb = *self.pins.get(&b).ok_or(ConnectError::UnknownPin(b))?;
        if pa.kind == pb.kind {
            return Err(ConnectError::SameKind(a, b));
        }
        if pa.owner == pb.owner {
            return Err(ConnectError::SameOwner(a, b));
        }
        let (source, target) = if pa.kind == PinKind::Out {
            (pa, pb)
        } else {
            (pb, pa)
        };
        if self.find_edge(source.id, target.id).is_some() {
            return Err(ConnectError::AlreadyConnected {
                from: source.id,
                to: target.id,
            });
        }
        Ok((source, target))
    }

    fn audit(&self) -> Result<(), IntegrityError> {
        let mut pairs = HashSet::new();
        for edge in self.edges.values() {
            for node in [edge.source_node, edge.target_node] {
                if !self.nodes.contains_key(&node) {
                    return Err(IntegrityError::DanglingEdge {
                        edge: edge.id,
                        node,
                    });
                }
            }
            if !pairs.insert((edge.source_pin, edge.target_pin)) {
                return Err(IntegrityError::DuplicateEdge(edge.id));
            }
            let listed = self
                .outgoing
                .get(&edge.source_pin)
                .map_or(0, |list| list.iter().filter(|e| **e == edge.id).count());
            if listed != 1 {
                return Err(IntegrityError::AdjacencyMismatch(edge.id));
            }
        }
        for (pin, list) in &self.outgoing {
            if let Some(stray) = list
                .iter()
                .find(|e| self.edges.get(*e).is_none_or(|edge| edge.source_pin != *pin))
            {
                return Err(IntegrityError::AdjacencyMismatch(*stray));
            }
        }

        for node in self.nodes.values() {
            for expected in node.pins() {
                match self.pins.get(&expected.id) {
                    None => {
                        return Err(IntegrityError::MissingPin {
                            node: node.id(),
                            pin: expected.id,
                        });
                    }
                    Some(indexed) if *indexed != expected => {
                        return Err(IntegrityError::PinMismatch {
                            node: node.id(),
                            pin: expected.id,
                        });
                    }
                    Some(_) => {}
                }
            }
        }
        for pin in self.pins.values() {
            let owned = self
                .nodes
                .get(&pin.owner)
                .is_some_and(|node| node.pin_ids().any(|id| id == pin.id));
            if !owned {
                return Err(IntegrityError::OrphanPin {
                    pin: pin.id,
                    node: pin.owner,
                });
            }
        }
        Ok(())
    }
}

/// Mutable dataflow graph of nodes, pins and edges.
///
/// Every method takes `&self`; share a graph between threads with `Arc`.
pub struct Graph {
    pub(crate) topology: RwLock<Topology>,
    pub(crate) listeners: Listeners,
    ids: Mutex<IdProvider>,
    worker_mode: AtomicBool,
    notify_additions: bool,
    pub(crate) worker_thread_name: String,
}

impl Graph {
    /// Creates an empty graph with default options (worker dispatch, removal
    /// and mute events only).
    pub fn new() -> Self {
        Self::with_options(GraphOptions::default())
    }

    /// Creates an empty graph with the given options and an OS-seeded
    /// identity provider.
    pub fn with_options(options: GraphOptions) -> Self {
        Self::with_provider(options, IdProvider::new())
    }

    /// Creates an empty graph drawing ids from `ids`.
    ///
    /// NUL bytes are dropped from the worker thread name, since the OS cannot
    /// carry them. A name left empty falls back to
    /// [`DEFAULT_WORKER_THREAD_NAME`].
    pub fn with_provider(options: GraphOptions, ids: IdProvider) -> Self {
        let worker_thread_name = sanitize_thread_name(options.worker_thread_name);
        Self {
            topology: RwLock::new(Topology::default()),
            listeners: Listeners::default(),
            ids: Mutex::new(ids),
            worker_mode: AtomicBool::new(options.mode == DispatchMode::Worker),
            notify_additions: options.notify_additions,
            worker_thread_name,
        }
    }

    /// Issues a fresh identifier from this graph's provider.
    pub fn make_id(&self) -> Identifier {
        self.ids.lock().make_id()
    }

    /// Current dispatch mode.
    pub fn dispatch_mode(&self) -> DispatchMode {
        if self.worker_mode.load(Ordering::Acquire) {
            DispatchMode::Worker
        } else {
            DispatchMode::Inline
        }
    }

    /// Switches the dispatch mode. Steps already running keep their mode;
    /// every step started afterwards uses the new one.
    pub fn set_dispatch_mode(&self, mode: DispatchMode) {
        self.worker_mode
            .store(mode == DispatchMode::Worker, Ordering::Release);
    }

    // --- Structural mutation ---

    /// Inserts a node and indexes its pins.
    ///
    /// Returns `false`, leaving the graph untouched, if the node id or any of
    /// its pin ids is already present.
    pub fn add_node(&self, node: Node) -> bool {
        let id = node.id();
        {
            let mut topology = self.topology.write();
            if !topology.accepts(&node) {
                warn!(node = %id, name = node.name(), "add_node: id already in use, node rejected");
                return false;
            }
            debug!(node = %id, name = node.name(), kind = node.type_tag(), "graph_add");
            topology.insert_node(node);
        }
        if self.notify_additions {
            self.notify_listeners(&GraphEvent::NodeAdded(id));
        }
        true
    }

    /// Removes a node, its incident edges and its pins.
    ///
    /// No-op returning `false` if the node is absent. Emits
    /// [`GraphEvent::NodeRemoved`] otherwise; the cascaded edge removals are
    /// not announced separately.
    pub fn remove_node(&self, id: NodeId) -> bool {
        let removed = self.topology.write().remove_node(id);
        if removed.is_none() {
            return false;
        }
        debug!(node = %id, "graph_remove");
        self.notify_listeners(&GraphEvent::NodeRemoved(id));
        true
    }

    /// Connects `source_pin` to `target_pin` with a new edge.
    ///
    /// Returns `None` if either pin is unknown or the pair is already
    /// connected. Pin kinds and owners are not checked here; use
    /// [`try_connect`](Self::try_connect) for the checked variant.
    pub fn connect(&self, source_pin: PinId, target_pin: PinId) -> Option<Edge> {
        let edge = {
            let mut topology = self.topology.write();
            let (source, target) = topology.endpoints(source_pin, target_pin)?;
            let id = self.make_id();
            topology.link(id, source, target)
        };
        self.announce_link(&edge);
        Some(edge)
    }

    /// Checks whether `a` and `b` may be joined: both known, one input and
    /// one output, on different nodes, not yet connected.
    ///
    /// The pins may be given in either order; the result is oriented
    /// `(output, input)`.
    pub fn can_connect(&self, a: PinId, b: PinId) -> Result<(PinId, PinId), ConnectError> {
        self.topology
            .read()
            .legal_pair(a, b)
            .map(|(source, target)| (source.id, target.id))
    }

    /// Connects two pins after checking [`can_connect`](Self::can_connect),
    /// orienting the edge from the output pin to the input pin.
    pub fn try_connect(&self, a: PinId, b: PinId) -> Result<Edge, ConnectError> {
        let edge = {
            let mut topology = self.topology.write();
            let (source, target) = topology.legal_pair(a, b)?;
            let id = self.make_id();
            topology.link(id, source, target)
        };
        self.announce_link(&edge);
        Ok(edge)
    }

    fn announce_link(&self, edge: &Edge) {
        debug!(edge = %edge.id, from = %edge.source_node, to = %edge.target_node, "graph_connect");
        if self.notify_additions {
            self.notify_listeners(&GraphEvent::EdgeAdded(edge.id));
        }
    }

    /// Removes an edge. Returns whether it existed; emits
    /// [`GraphEvent::EdgeRemoved`] only when it did.
    pub fn disconnect(&self, edge_id: EdgeId) -> bool {
        let removed = self.topology.write().unlink(edge_id);
        if removed.is_none() {
            return false;
        }
        debug!(edge = %edge_id, "graph_disconnect");
        self.notify_listeners(&GraphEvent::EdgeRemoved(edge_id));
        true
    }

    // --- Mute state ---

    /// Sets a node's mute flag and emits [`GraphEvent::NodeMuted`].
    ///
    /// Returns `false` if the node is absent.
    pub fn set_muted(&self, node: NodeId, muted: bool) -> bool {
        if !self.set_muted_no_notification(node, muted) {
            return false;
        }
        self.notify_listeners(&GraphEvent::NodeMuted { node, muted });
        true
    }

    /// Sets a node's mute flag without emitting an event, for bulk restore.
    pub fn set_muted_no_notification(&self, node: NodeId, muted: bool) -> bool {
        match self.node(node) {
            Some(n) => {
                n.store_muted(muted);
                true
            }
            None => false,
        }
    }

    /// Flips a node's mute flag, emits [`GraphEvent::NodeMuted`] and returns
    /// the new state. `None` if the node is absent.
    pub fn toggle_muted(&self, node: NodeId) -> Option<bool> {
        let muted = self.node(node)?.flip_muted();
        self.notify_listeners(&GraphEvent::NodeMuted { node, muted });
        Some(muted)
    }

    // --- Selection operations ---

    /// Removes every non-sticky node of `selection` under one lock
    /// acquisition. Returns the ids actually removed, in selection order,
    /// and emits one [`GraphEvent::NodeRemoved`] for each.
    pub fn remove_nodes(&self, selection: &[NodeId]) -> Vec<NodeId> {
        let removed: Vec<NodeId> = {
            let mut topology = self.topology.write();
            let mut removed = Vec::new();
            for id in selection {
                let removable = topology
                    .nodes
                    .get(id)
                    .is_some_and(|node| !node.is_sticky());
                if removable && topology.remove_node(*id).is_some() {
                    removed.push(*id);
                }
            }
            removed
        };
        for id in &removed {
            debug!(node = %id, "graph_remove");
            self.notify_listeners(&GraphEvent::NodeRemoved(*id));
        }
        removed
    }

    /// Toggles the mute flag of every non-sticky node of `selection`.
    /// Returns each toggled node with its new state.
    pub fn toggle_muted_nodes(&self, selection: &[NodeId]) -> Vec<(NodeId, bool)> {
        let targets: Vec<Arc<Node>> = {
            let topology = self.topology.read();
            selection
                .iter()
                .filter_map(|id| topology.nodes.get(id))
                .filter(|node| !node.is_sticky())
                .cloned()
                .collect()
        };
        targets
            .iter()
            .map(|node| {
                let muted = node.flip_muted();
                self.notify_listeners(&GraphEvent::NodeMuted {
                    node: node.id(),
                    muted,
                });
                (node.id(), muted)
            })
            .collect()
    }

    /// Duplicates the non-sticky nodes of `selection`.
    ///
    /// Each copy gets fresh node and pin ids, the original's name, pin counts
    /// and mute state, and a clone of its processor. Edges running between
    /// two selected nodes are recreated between the copies, matching pins by
    /// [`Pin::order`]. Returns `(original, copy)` pairs in selection order.
    pub fn duplicate_nodes(&self, selection: &[NodeId]) -> Vec<(NodeId, NodeId)> {
        let (pairs, new_edges) = {
            let mut topology = self.topology.write();

            let mut seen = HashSet::new();
            let originals: Vec<Arc<Node>> = selection
                .iter()
                .filter(|id| seen.insert(**id))
                .filter_map(|id| topology.nodes.get(id))
                .filter(|node| !node.is_sticky())
                .cloned()
                .collect();

            let mut copies: HashMap<NodeId, Arc<Node>> = HashMap::new();
            let mut pairs = Vec::with_capacity(originals.len());
            for original in &originals {
                let copy = original.duplicate(|| self.make_id());
                let copy_id = copy.id();
                topology.insert_node(copy);
                if let Some(inserted) = topology.nodes.get(&copy_id) {
                    copies.insert(original.id(), Arc::clone(inserted));
                }
                pairs.push((original.id(), copy_id));
            }

            let mut internal = Vec::new();
            for original in &originals {
                for out in original.outs() {
                    let Some(list) = topology.outgoing.get(out) else {
                        continue;
                    };
                    internal.extend(
                        list.iter()
                            .filter_map(|id| topology.edges.get(id))
                            .filter(|edge| copies.contains_key(&edge.target_node))
                            .copied(),
                    );
                }
            }

            let mut new_edges = Vec::with_capacity(internal.len());
            for edge in internal {
                let (Some(source), Some(target)) = (
                    topology.pins.get(&edge.source_pin).copied(),
                    topology.pins.get(&edge.target_pin).copied(),
                ) else {
                    continue;
                };
                let (Some(source_copy), Some(target_copy)) = (
                    copies.get(&edge.source_node),
                    copies.get(&edge.target_node),
                ) else {
                    continue;
                };
                let source_pin = match source.kind {
                    PinKind::Out => source_copy.output(source.order),
                    PinKind::In => source_copy.input(source.order),
                };
                let target_pin = match target.kind {
                    PinKind::In => target_copy.input(target.order),
                    PinKind::Out => target_copy.output(target.order),
                };
                let Some((source, target)) = source_pin
                    .zip(target_pin)
                    .and_then(|(s, t)| topology.endpoints(s, t))
                else {
                    continue;
                };
                let id = self.make_id();
                new_edges.push(topology.link(id, source, target));
            }
            (pairs, new_edges)
        };

        for (original, copy) in &pairs {
            debug!(node = %copy, from = %original, "graph_duplicate");
            if self.notify_additions {
                self.notify_listeners(&GraphEvent::NodeAdded(*copy));
            }
        }
        for edge in &new_edges {
            self.announce_link(edge);
        }
        pairs
    }

    // --- Queries ---

    /// The node with this id.
    pub fn node(&self, id: NodeId) -> Option<Arc<Node>> {
        self.topology.read().nodes.get(&id).cloned()
    }

    /// Whether a node with this id is present.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.topology.read().nodes.contains_key(&id)
    }

    /// The pin with this id, whichever node owns it.
    pub fn pin(&self, id: PinId) -> Option<Pin> {
        self.topology.read().pins.get(&id).copied()
    }

    /// The edge with this id.
    pub fn edge(&self, id: EdgeId) -> Option<Edge> {
        self.topology.read().edges.get(&id).copied()
    }

    /// Ids of all nodes, in no particular order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.topology.read().nodes.keys().copied().collect()
    }

    /// All edges, in no particular order.
    pub fn edges(&self) -> Vec<Edge> {
        self.topology.read().edges.values().copied().collect()
    }

    /// Edges leaving `pin`, in creation order. This is the order dispatch
    /// follows.
    pub fn edges_from_pin(&self, pin: PinId) -> Vec<Edge> {
        let topology = self.topology.read();
        topology
            .outgoing
            .get(&pin)
            .map(|list| {
                list.iter()
                    .filter_map(|id| topology.edges.get(id))
                    .copied()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether an edge joins exactly this pin pair.
    pub fn is_connected(&self, source_pin: PinId, target_pin: PinId) -> bool {
        self.topology
            .read()
            .find_edge(source_pin, target_pin)
            .is_some()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.topology.read().nodes.len()
    }

    /// Number of indexed pins.
    pub fn pin_count(&self) -> usize {
        self.topology.read().pins.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.topology.read().edges.len()
    }

    /// Counts, taken under one lock acquisition.
    pub fn stats(&self) -> GraphStats {
        let (nodes, pins, edges) = {
            let topology = self.topology.read();
            (
                topology.nodes.len(),
                topology.pins.len(),
                topology.edges.len(),
            )
        };
        GraphStats {
            nodes,
            pins,
            edges,
            listeners: self.listener_count(),
            mode: self.dispatch_mode(),
        }
    }

    /// Audits the graph invariants against a consistent snapshot.
    pub fn check_integrity(&self) -> Result<(), IntegrityError> {
        self.topology.read().audit()
    }

    /// Adds a listener built from a closure and returns the handle needed to
    /// remove it.
    pub fn subscribe<F>(&self, handler: F) -> Arc<dyn GraphListener>
    where
        F: Fn(&GraphEvent) + Send + Sync + 'static,
    {
        let listener: Arc<dyn GraphListener> = Arc::new(handler);
        self.add_listener(Arc::clone(&listener));
        listener
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
