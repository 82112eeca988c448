//! Structural change notifications.
//!
//! Subscribers implement [`GraphListener`] (closures do so automatically) and
//! register with [`Graph::add_listener`]. Delivery follows the graph's
//! [`DispatchMode`](crate::DispatchMode): inline, or one worker step covering
//! the whole listener list with the caller blocked until it finishes.
//!
//! Events are sent after the topology lock is released. Events from one
//! thread arrive in the order of its calls, but events from mutations racing
//! on different threads may arrive in either order.
//!
//! By default only removals and mute changes are announced. Set
//! [`GraphOptions::notify_additions`](crate::GraphOptions::notify_additions)
//! to also receive [`GraphEvent::NodeAdded`] and [`GraphEvent::EdgeAdded`].

use std::sync::Arc;

use parking_lot::Mutex;

use crate::graph::Graph;
use crate::id::{EdgeId, NodeId};

/// A structural change to a graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GraphEvent {
    /// A node was inserted.
    NodeAdded(NodeId),
    /// A node and its incident edges were removed.
    NodeRemoved(NodeId),
    /// A node's mute flag was set or toggled.
    NodeMuted {
        /// The node.
        node: NodeId,
        /// Mute state after the change.
        muted: bool,
    },
    /// An edge was created.
    EdgeAdded(EdgeId),
    /// An edge was disconnected.
    EdgeRemoved(EdgeId),
}

/// Receives [`GraphEvent`]s.
///
/// Handlers run without any graph lock held and may query or mutate the
/// graph. In worker mode they run on a dispatch worker thread.
pub trait GraphListener: Send + Sync {
    /// Called once per event.
    fn on_graph_event(&self, event: &GraphEvent);
}

impl<F> GraphListener for F
where
    F: Fn(&GraphEvent) + Send + Sync,
{
    fn on_graph_event(&self, event: &GraphEvent) {
        self(event)
    }
}

/// Ordered listener list. No deduplication.
#[derive(Default)]
pub(crate) struct Listeners {
    list: Mutex<Vec<Arc<dyn GraphListener>>>,
}

impl Listeners {
    pub(crate) fn add(&self, listener: Arc<dyn GraphListener>) {
        self.list.lock().push(listener);
    }

    /// Drops every registration of `listener`. Returns whether any existed.
    pub(crate) fn remove(&self, listener: &Arc<dyn GraphListener>) -> bool {
        let mut list = self.list.lock();
        let before = list.len();
        list.retain(|l| !std::ptr::addr_eq(Arc::as_ptr(l), Arc::as_ptr(listener)));
        list.len() != before
    }

    pub(crate) fn snapshot(&self) -> Vec<Arc<dyn GraphListener>> {
        self.list.lock().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.list.lock().len()
    }
}

impl Graph {
    /// Registers a listener. Registering the same listener twice delivers
    /// each event to it twice.
    pub fn add_listener(&self, listener: Arc<dyn GraphListener>) {
        self.listeners.add(listener);
    }

    /// Unregisters every registration of `listener`. Returns whether it was
    /// registered.
    pub fn remove_listener(&self, listener: &Arc<dyn GraphListener>) -> bool {
        self.listeners.remove(listener)
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Delivers `event` to every listener registered at the time of the call,
    /// in registration order.
    ///
    /// In worker mode the whole iteration is one worker step and this call
    /// blocks until every listener has returned.
    pub fn notify_listeners(&self, event: &GraphEvent) {
        let listeners = self.listeners.snapshot();
        if listeners.is_empty() {
            return;
        }
        self.run_step(|| {
            for listener in &listeners {
                listener.on_graph_event(event);
            }
        });
    }
}
