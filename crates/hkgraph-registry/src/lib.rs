//! Processor registry and factory for hkgraph nodes.
//!
//! This crate maps the string type tags stored in persisted graphs back to
//! concrete [`NodeProcessor`] implementations, and describes each processor
//! type for palette and menu building.
//!
//! # Features
//!
//! - **Processor Discovery**: list every registered processor with metadata
//! - **Factory Pattern**: create processors or whole nodes by type tag
//! - **Restoration**: rebuild a node around persisted ids
//! - **Host Endpoints**: install the `midi-in`/`midi-out` pair and run host blocks
//!
//! # Example
//!
//! ```rust
//! use hkgraph_core::Graph;
//! use hkgraph_registry::ProcessorRegistry;
//!
//! let registry = ProcessorRegistry::new();
//! for descriptor in registry.all() {
//!     println!("{}: {}", descriptor.id, descriptor.description);
//! }
//!
//! let graph = Graph::new();
//! let node = registry.create_node(&graph, "passthrough").expect("built-in");
//! assert_eq!(node.ins().len(), 1);
//! assert!(graph.add_node(node));
//! ```

pub mod host;
pub mod processors;

pub use host::Endpoints;
pub use processors::{MIDI_IN, MIDI_OUT, MidiIn, MidiOut, PASSTHROUGH, Passthrough};

use hkgraph_core::{Graph, Node, NodeId, NodeProcessor, PinId};

/// Describes a processor type in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorDescriptor {
    /// Type tag (lowercase, no spaces). Matches [`NodeProcessor::type_tag`].
    pub id: &'static str,
    /// Human-readable name, used as the default node name.
    pub name: &'static str,
    /// Brief description.
    pub description: &'static str,
    /// Number of input pins of a freshly created node.
    pub inputs: u32,
    /// Number of output pins of a freshly created node.
    pub outputs: u32,
    /// Whether created nodes are sticky.
    pub sticky: bool,
}

/// Factory function type for creating processors.
type ProcessorFactory = fn() -> Box<dyn NodeProcessor>;

struct RegistryEntry {
    descriptor: ProcessorDescriptor,
    factory: ProcessorFactory,
}

/// Registry of all available node processors.
///
/// All built-in processors are registered on construction.
pub struct ProcessorRegistry {
    entries: Vec<RegistryEntry>,
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessorRegistry {
    /// Create a new registry with all built-in processors registered.
    pub fn new() -> Self {
        let mut registry = Self {
            entries: Vec::with_capacity(3),
        };
        registry.register_builtin_processors();
        registry
    }

    fn register_builtin_processors(&mut self) {
        self.register(
            ProcessorDescriptor {
                id: MIDI_IN,
                name: "MIDI In",
                description: "Host entry point; forwards injected events to its output",
                inputs: 0,
                outputs: 1,
                sticky: true,
            },
            || Box::new(MidiIn),
        );

        self.register(
            ProcessorDescriptor {
                id: MIDI_OUT,
                name: "MIDI Out",
                description: "Host exit point; collects events for the host to take",
                inputs: 1,
                outputs: 0,
                sticky: true,
            },
            || Box::new(MidiOut::default()),
        );

        self.register(
            ProcessorDescriptor {
                id: PASSTHROUGH,
                name: "Passthrough",
                description: "Forwards events unchanged",
                inputs: 1,
                outputs: 1,
                sticky: false,
            },
            || Box::new(Passthrough),
        );
    }

    /// Register a processor type. Lookups return the first registration of
    /// an id.
    pub fn register(&mut self, descriptor: ProcessorDescriptor, factory: ProcessorFactory) {
        self.entries.push(RegistryEntry {
            descriptor,
            factory,
        });
    }

    /// Returns descriptors for all registered processors, in registration
    /// order.
    pub fn all(&self) -> Vec<&ProcessorDescriptor> {
        self.entries.iter().map(|e| &e.descriptor).collect()
    }

    /// Get a descriptor by type tag.
    pub fn get(&self, id: &str) -> Option<&ProcessorDescriptor> {
        self.entry(id).map(|e| &e.descriptor)
    }

    /// Create a processor instance by type tag.
    pub fn create_processor(&self, id: &str) -> Option<Box<dyn NodeProcessor>> {
        self.entry(id).map(|e| (e.factory)())
    }

    /// Create a node of the given type with fresh ids from `graph`, using the
    /// descriptor's name, pin counts and stickiness.
    ///
    /// The node is not inserted.
    pub fn create_node(&self, graph: &Graph, id: &str) -> Option<Node> {
        let entry = self.entry(id)?;
        let d = &entry.descriptor;
        Some(
            Node::new(graph, d.name, d.inputs, d.outputs, (entry.factory)())
                .with_sticky(d.sticky),
        )
    }

    /// Rebuild a node of the given type around persisted ids.
    ///
    /// Stickiness comes from the descriptor; pin counts come from the
    /// supplied id lists.
    pub fn restore_node(
        &self,
        id: &str,
        node_id: NodeId,
        name: impl Into<String>,
        ins: Vec<PinId>,
        outs: Vec<PinId>,
    ) -> Option<Node> {
        let entry = self.entry(id)?;
        Some(
            Node::from_parts(node_id, name, ins, outs, (entry.factory)())
                .with_sticky(entry.descriptor.sticky),
        )
    }

    /// Returns the number of registered processors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no processors are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, id: &str) -> Option<&RegistryEntry> {
        self.entries.iter().find(|e| e.descriptor.id == id)
    }
}
