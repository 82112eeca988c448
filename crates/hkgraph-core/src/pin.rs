//! Pins: directional connection points owned by a node.
//!
//! Pins are plain values. The graph keeps the only authoritative copy of
//! each pin in its flattened pin index; a [`Node`](crate::Node) only lists
//! the ids of its pins, ordered by [`Pin::order`].

use crate::id::{NodeId, PinId};

/// Direction of a pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PinKind {
    /// Receives payloads from edges and hands them to the owning node.
    In,
    /// Forwards payloads along every edge leaving it.
    Out,
}

impl PinKind {
    /// The opposite direction.
    pub const fn opposite(self) -> Self {
        match self {
            PinKind::In => PinKind::Out,
            PinKind::Out => PinKind::In,
        }
    }
}

/// A typed endpoint owned by exactly one node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pin {
    /// Pin identifier.
    pub id: PinId,
    /// Position among the owner's pins of the same kind, starting at 0.
    ///
    /// Stable for the lifetime of the pin. Used to align pins in a view and
    /// to pair pins between a node and its duplicate.
    pub order: u32,
    /// Direction.
    pub kind: PinKind,
    /// Node that owns this pin. A lookup key, not an ownership link.
    pub owner: NodeId,
}

impl Pin {
    /// Whether this is an input pin.
    #[inline]
    pub fn is_input(&self) -> bool {
        self.kind == PinKind::In
    }

    /// Whether this is an output pin.
    #[inline]
    pub fn is_output(&self) -> bool {
        self.kind == PinKind::Out
    }
}
