//! Built-in node processors.
//!
//! | type tag | pins | role |
//! |----------|------|------|
//! | `midi-in` | 0 in, 1 out | host entry point, forwards to its outputs |
//! | `midi-out` | 1 in, 0 out | host exit point, collects what arrives |
//! | `passthrough` | 1 in, 1 out | forwards to its outputs |

use hkgraph_core::{Graph, Node, NodeProcessor, Payload, Pin};
use parking_lot::Mutex;

/// Type tag of [`MidiIn`].
pub const MIDI_IN: &str = "midi-in";
/// Type tag of [`MidiOut`].
pub const MIDI_OUT: &str = "midi-out";
/// Type tag of [`Passthrough`].
pub const PASSTHROUGH: &str = "passthrough";

/// Host entry point. Whatever the host injects leaves on every output.
#[derive(Debug, Clone, Copy, Default)]
pub struct MidiIn;

impl NodeProcessor for MidiIn {
    fn type_tag(&self) -> &'static str {
        MIDI_IN
    }

    fn handle(&self, graph: &Graph, node: &Node, _source: Option<&Pin>, payload: &Payload) {
        graph.dispatch_outputs(node, payload);
    }
}

/// Host exit point. Collects every payload that reaches it until the host
/// takes them.
///
/// Clones start with an empty buffer.
#[derive(Debug, Default)]
pub struct MidiOut {
    collected: Mutex<Vec<Payload>>,
}

impl MidiOut {
    /// Drains and returns everything collected so far, in arrival order.
    pub fn take_output(&self) -> Vec<Payload> {
        std::mem::take(&mut *self.collected.lock())
    }

    /// Drops everything collected so far.
    pub fn clear(&self) {
        self.collected.lock().clear();
    }

    /// Number of payloads waiting to be taken.
    pub fn pending(&self) -> usize {
        self.collected.lock().len()
    }
}

impl Clone for MidiOut {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl NodeProcessor for MidiOut {
    fn type_tag(&self) -> &'static str {
        MIDI_OUT
    }

    fn handle(&self, _graph: &Graph, _node: &Node, _source: Option<&Pin>, payload: &Payload) {
        self.collected.lock().push(payload.clone());
    }
}

/// Forwards every payload to all of its outputs unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl NodeProcessor for Passthrough {
    fn type_tag(&self) -> &'static str {
        PASSTHROUGH
    }

    fn handle(&self, graph: &Graph, node: &Node, _source: Option<&Pin>, payload: &Payload) {
        graph.dispatch_outputs(node, payload);
    }
}
