//! Graph edge types.
//!
//! An [`Edge`] connects one output pin to one input pin. The node ids of both
//! ends are captured at connect time so that node removal can find incident
//! edges without consulting the pin index.

use crate::id::{EdgeId, NodeId, PinId};

/// A directed connection from an output pin to an input pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Edge identifier.
    pub id: EdgeId,
    /// Node owning the source pin.
    pub source_node: NodeId,
    /// Output pin the edge leaves from.
    pub source_pin: PinId,
    /// Node owning the target pin.
    pub target_node: NodeId,
    /// Input pin the edge arrives at.
    pub target_pin: PinId,
}

impl Edge {
    /// Whether either end of the edge belongs to `node`.
    #[inline]
    pub fn touches(&self, node: NodeId) -> bool {
        self.source_node == node || self.target_node == node
    }

    /// Whether the edge joins exactly this pin pair.
    #[inline]
    pub fn joins(&self, source_pin: PinId, target_pin: PinId) -> bool {
        self.source_pin == source_pin && self.target_pin == target_pin
    }
}
