//! Errors for the checked graph operations.
//!
//! The structural primitives never fail loudly: removing or disconnecting
//! something absent is a no-op and [`Graph::connect`](crate::Graph::connect)
//! answers with `None`. The types here back the checked variants built on
//! top of them.

use thiserror::Error;

use crate::id::{EdgeId, NodeId, PinId};

/// Why two pins cannot be joined by an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConnectError {
    /// The pin id is not in the graph's pin index.
    #[error("pin {0} is not in the graph")]
    UnknownPin(PinId),
    /// Both pins are inputs or both are outputs.
    #[error("pins {0} and {1} have the same direction")]
    SameKind(PinId, PinId),
    /// Both pins belong to the same node.
    #[error("pins {0} and {1} belong to the same node")]
    SameOwner(PinId, PinId),
    /// An edge between these pins already exists.
    #[error("pins {from} and {to} are already connected")]
    AlreadyConnected {
        /// Output pin of the existing edge.
        from: PinId,
        /// Input pin of the existing edge.
        to: PinId,
    },
}

/// A broken graph invariant found by
/// [`Graph::check_integrity`](crate::Graph::check_integrity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IntegrityError {
    /// An edge references a node that is not in the graph.
    #[error("edge {edge} references missing node {node}")]
    DanglingEdge {
        /// The offending edge.
        edge: EdgeId,
        /// The node it points at.
        node: NodeId,
    },
    /// A node lists a pin that is missing from the pin index.
    #[error("pin {pin} of node {node} is missing from the pin index")]
    MissingPin {
        /// Owning node.
        node: NodeId,
        /// Missing pin.
        pin: PinId,
    },
    /// The indexed pin disagrees with the node's view of it (owner, kind or
    /// order).
    #[error("indexed pin {pin} disagrees with node {node}")]
    PinMismatch {
        /// Node listing the pin.
        node: NodeId,
        /// The pin.
        pin: PinId,
    },
    /// An indexed pin whose owner is not in the graph.
    #[error("pin {pin} is owned by missing node {node}")]
    OrphanPin {
        /// The pin.
        pin: PinId,
        /// Its recorded owner.
        node: NodeId,
    },
    /// Two edges join the same pin pair.
    #[error("edge {0} duplicates an existing connection")]
    DuplicateEdge(EdgeId),
    /// The per-pin edge lists disagree with the edge table.
    #[error("edge {0} is not listed exactly once under its source pin")]
    AdjacencyMismatch(EdgeId),
}
