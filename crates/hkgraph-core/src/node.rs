//! Graph node types.
//!
//! A [`Node`] is a unit of computation with a fixed set of input and output
//! pins. What the node does with an incoming payload is decided by its
//! [`NodeProcessor`], the polymorphic part supplied by the processor layer.
//! The node itself only carries identity, display name, pin ids, and the
//! sticky and muted flags.

use core::any::Any;
use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::graph::Graph;
use crate::id::{Identifier, NodeId, PinId};
use crate::payload::Payload;
use crate::pin::{Pin, PinKind};

/// Object-safe plumbing shared by every processor.
///
/// Implemented automatically for any `NodeProcessor + Clone`; processors
/// never implement it by hand.
pub trait ProcessorBase: Any + Send + Sync {
    /// Boxed copy of this processor, used when a node is duplicated.
    fn clone_boxed(&self) -> Box<dyn NodeProcessor>;

    /// Upcast for downcasting to the concrete processor type.
    fn as_any(&self) -> &dyn Any;
}

impl<T: NodeProcessor + Clone> ProcessorBase for T {
    fn clone_boxed(&self) -> Box<dyn NodeProcessor> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Behaviour of a node: what happens when a payload reaches it.
///
/// The engine does not propagate through a node on its own. A processor that
/// wants downstream nodes to see a payload dispatches it on its node's output
/// pins, typically with [`Graph::dispatch_outputs`].
///
/// Hooks run without any graph lock held, so they may dispatch further or
/// mutate the graph. In worker mode a hook runs on a dispatch worker thread,
/// hence the `Send + Sync` bound; processors keep mutable state behind their
/// own locks.
pub trait NodeProcessor: ProcessorBase {
    /// Registry key of this processor type, stable across sessions.
    fn type_tag(&self) -> &'static str;

    /// Handles a payload delivered to `node`.
    ///
    /// `source` is the input pin the payload arrived on, or `None` when the
    /// node was dispatched to directly (e.g. by a host audio callback).
    fn handle(&self, graph: &Graph, node: &Node, source: Option<&Pin>, payload: &Payload);
}

/// A node owned by a [`Graph`].
///
/// The pin lists are fixed at construction and hold ids only; the pin values
/// live in the graph's pin index. Index `i` of [`ins`](Self::ins) is the input
/// pin with `order == i`, likewise for outputs.
pub struct Node {
    id: NodeId,
    name: String,
    ins: Vec<PinId>,
    outs: Vec<PinId>,
    sticky: bool,
    muted: AtomicBool,
    processor: Box<dyn NodeProcessor>,
}

impl Node {
    /// Creates a node whose ids are drawn from `graph`'s provider.
    ///
    /// The node is not part of the graph until passed to
    /// [`Graph::add_node`].
    pub fn new(
        graph: &Graph,
        name: impl Into<String>,
        inputs: u32,
        outputs: u32,
        processor: Box<dyn NodeProcessor>,
    ) -> Self {
        let id = graph.make_id();
        let ins = (0..inputs).map(|_| graph.make_id()).collect();
        let outs = (0..outputs).map(|_| graph.make_id()).collect();
        Self::from_parts(id, name, ins, outs, processor)
    }

    /// Rebuilds a node from previously issued ids, e.g. when restoring a
    /// persisted graph.
    pub fn from_parts(
        id: NodeId,
        name: impl Into<String>,
        ins: Vec<PinId>,
        outs: Vec<PinId>,
        processor: Box<dyn NodeProcessor>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            ins,
            outs,
            sticky: false,
            muted: AtomicBool::new(false),
            processor,
        }
    }

    /// Marks the node as sticky (protected from selection removal).
    pub fn with_sticky(mut self, sticky: bool) -> Self {
        self.sticky = sticky;
        self
    }

    /// Sets the initial mute state. No event is emitted.
    pub fn with_muted(mut self, muted: bool) -> Self {
        *self.muted.get_mut() = muted;
        self
    }

    /// Node identifier.
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Input pin ids, by order.
    pub fn ins(&self) -> &[PinId] {
        &self.ins
    }

    /// Output pin ids, by order.
    pub fn outs(&self) -> &[PinId] {
        &self.outs
    }

    /// Input pin with the given order.
    pub fn input(&self, order: u32) -> Option<PinId> {
        self.ins.get(order as usize).copied()
    }

    /// Output pin with the given order.
    pub fn output(&self, order: u32) -> Option<PinId> {
        self.outs.get(order as usize).copied()
    }

    /// Ids of all pins, inputs first.
    pub fn pin_ids(&self) -> impl Iterator<Item = PinId> + '_ {
        self.ins.iter().chain(self.outs.iter()).copied()
    }

    /// Pin values derived from the id lists.
    ///
    /// These are exactly the values the graph stores in its pin index for
    /// this node.
    pub fn pins(&self) -> impl Iterator<Item = Pin> + '_ {
        let owner = self.id;
        let ins = self.ins.iter().enumerate().map(move |(order, id)| Pin {
            id: *id,
            order: order as u32,
            kind: PinKind::In,
            owner,
        });
        let outs = self.outs.iter().enumerate().map(move |(order, id)| Pin {
            id: *id,
            order: order as u32,
            kind: PinKind::Out,
            owner,
        });
        ins.chain(outs)
    }

    /// Whether the node is protected from selection removal.
    #[inline]
    pub fn is_sticky(&self) -> bool {
        self.sticky
    }

    /// Whether payload delivery to this node is suppressed.
    #[inline]
    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::Acquire)
    }

    pub(crate) fn store_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::Release);
    }

    /// Flips the mute flag and returns the new state.
    pub(crate) fn flip_muted(&self) -> bool {
        !self.muted.fetch_xor(true, Ordering::AcqRel)
    }

    /// Registry key of the node's processor.
    pub fn type_tag(&self) -> &'static str {
        self.processor.type_tag()
    }

    /// The node's processor.
    pub fn processor(&self) -> &dyn NodeProcessor {
        self.processor.as_ref()
    }

    /// The node's processor as its concrete type.
    pub fn processor_as<T: NodeProcessor>(&self) -> Option<&T> {
        self.processor.as_any().downcast_ref::<T>()
    }

    /// Copy with fresh ids: same name, pin counts, stickiness, mute state and
    /// a cloned processor.
    pub(crate) fn duplicate(&self, mut next_id: impl FnMut() -> Identifier) -> Self {
        let id = next_id();
        let ins = self.ins.iter().map(|_| next_id()).collect();
        let outs = self.outs.iter().map(|_| next_id()).collect();
        Self {
            id,
            name: self.name.clone(),
            ins,
            outs,
            sticky: self.sticky,
            muted: AtomicBool::new(self.is_muted()),
            processor: self.processor.clone_boxed(),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("type", &self.type_tag())
            .field("ins", &self.ins.len())
            .field("outs", &self.outs.len())
            .field("sticky", &self.sticky)
            .field("muted", &self.is_muted())
            .finish()
    }
}
