//! HKGraph Core - dataflow graph engine for node-based MIDI processing
//!
//! This crate holds the mutable graph underneath a visual patching tool:
//! nodes with typed pins, edges between them, thread-safe structural
//! mutation, identity management, change notification, and push-based
//! payload propagation.
//!
//! # Core Abstractions
//!
//! ## Identity
//!
//! - [`Identifier`] - 128-bit id for nodes, pins and edges, with a stable text form
//! - [`IdProvider`] - seeded generator, one per graph
//!
//! ## Topology
//!
//! - [`Graph`] - owns nodes, a flattened pin index, and edges; all mutation goes through it
//! - [`Node`] - fixed set of input/output pins plus a [`NodeProcessor`]
//! - [`Pin`] - directional endpoint, [`PinKind::In`] or [`PinKind::Out`]
//! - [`Edge`] - output pin to input pin
//!
//! ## Propagation
//!
//! - [`Graph::dispatch_pin`], [`Graph::dispatch_node`], [`Graph::dispatch_edge`]
//! - [`DispatchMode`] - inline, or block-on-worker offload
//! - [`Payload`] - type-erased value carried through the graph
//!
//! ## Notification
//!
//! - [`GraphListener`] / [`GraphEvent`] - removal, mute and (optionally) addition events
//!
//! # Example
//!
//! ```rust
//! use hkgraph_core::{Graph, Node, NodeProcessor, Payload, Pin};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Clone, Default)]
//! struct Collect(Arc<Mutex<Vec<i32>>>);
//!
//! impl NodeProcessor for Collect {
//!     fn type_tag(&self) -> &'static str {
//!         "collect"
//!     }
//!
//!     fn handle(&self, _graph: &Graph, _node: &Node, _source: Option<&Pin>, payload: &Payload) {
//!         if let Some(v) = payload.downcast_ref::<i32>() {
//!             self.0.lock().unwrap().push(*v);
//!         }
//!     }
//! }
//!
//! let graph = Graph::new();
//! let sink = Collect::default();
//! let source = Node::new(&graph, "in", 0, 1, Box::new(Collect::default()));
//! let target = Node::new(&graph, "out", 1, 0, Box::new(sink.clone()));
//! let (out_pin, in_pin) = (source.outs()[0], target.ins()[0]);
//! graph.add_node(source);
//! graph.add_node(target);
//!
//! graph.connect(out_pin, in_pin).expect("pins are fresh");
//! graph.dispatch_pin(out_pin, &Payload::new(42));
//! assert_eq!(*sink.0.lock().unwrap(), vec![42]);
//! ```
//!
//! # Design Principles
//!
//! - **Serialized mutation**: structural changes hold the topology write lock
//! - **Lock-free hooks**: processors and listeners never run under a graph lock
//! - **Silent staleness**: removing, disconnecting or dispatching to something gone is a no-op
//! - **Per-graph identity**: no process-wide generator state

pub mod dispatch;
pub mod edge;
pub mod error;
pub mod event;
pub mod graph;
pub mod id;
pub mod node;
pub mod payload;
pub mod pin;

pub use dispatch::DispatchMode;
pub use edge::Edge;
pub use error::{ConnectError, IntegrityError};
pub use event::{GraphEvent, GraphListener};
pub use graph::{DEFAULT_WORKER_THREAD_NAME, Graph, GraphOptions, GraphStats};
pub use id::{EdgeId, IdParseError, IdProvider, Identifier, NodeId, PinId};
pub use node::{Node, NodeProcessor, ProcessorBase};
pub use payload::Payload;
pub use pin::{Pin, PinKind};
