//! Host-side entry and exit of a graph.
//!
//! A host (plugin callback, CLI, test) owns one `midi-in` node where events
//! enter and one `midi-out` node where results collect. Each host block
//! injects one payload at the entry and takes whatever reached the exit.

use hkgraph_core::{Graph, NodeId, Payload, PinId};
use tracing::debug;

use crate::ProcessorRegistry;
use crate::processors::{MIDI_IN, MIDI_OUT, MidiOut};

/// The entry and exit nodes of a host graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoints {
    /// The `midi-in` node.
    pub input: NodeId,
    /// The `midi-out` node.
    pub output: NodeId,
}

impl Endpoints {
    /// Creates a sticky `midi-in`/`midi-out` pair and adds both to `graph`.
    ///
    /// The two are not connected. Returns `None` if either type tag is
    /// missing from `registry` or the graph rejects either node; the graph
    /// is then left as it was.
    pub fn install(graph: &Graph, registry: &ProcessorRegistry) -> Option<Self> {
        let input = registry.create_node(graph, MIDI_IN)?;
        let output = registry.create_node(graph, MIDI_OUT)?;
        let endpoints = Self {
            input: input.id(),
            output: output.id(),
        };
        if !graph.add_node(input) {
            return None;
        }
        if !graph.add_node(output) {
            graph.remove_node(endpoints.input);
            return None;
        }
        debug!(input = %endpoints.input, output = %endpoints.output, "host endpoints installed");
        Some(endpoints)
    }

    /// Locates existing endpoints by type tag, e.g. after restoring a graph.
    ///
    /// When several nodes carry a tag, the one with the lowest id wins.
    pub fn find(graph: &Graph) -> Option<Self> {
        let mut ids = graph.node_ids();
        ids.sort_unstable();
        let tagged = |tag: &str| {
            ids.iter()
                .copied()
                .find(|id| graph.node(*id).is_some_and(|n| n.type_tag() == tag))
        };
        Some(Self {
            input: tagged(MIDI_IN)?,
            output: tagged(MIDI_OUT)?,
        })
    }

    /// First output pin of the entry node.
    pub fn entry_pin(&self, graph: &Graph) -> Option<PinId> {
        graph.node(self.input)?.output(0)
    }

    /// First input pin of the exit node.
    pub fn exit_pin(&self, graph: &Graph) -> Option<PinId> {
        graph.node(self.output)?.input(0)
    }

    /// Runs one host block.
    ///
    /// Clears the exit node's buffer, dispatches `payload` to the entry node
    /// with no source pin, and returns everything that reached the exit node
    /// in arrival order. Returns an empty list if the exit node is gone.
    pub fn process_block(&self, graph: &Graph, payload: &Payload) -> Vec<Payload> {
        let Some(exit) = graph.node(self.output) else {
            return Vec::new();
        };
        let Some(collector) = exit.processor_as::<MidiOut>() else {
            return Vec::new();
        };
        collector.clear();
        graph.dispatch_node(self.input, None, payload);
        collector.take_output()
    }
}
