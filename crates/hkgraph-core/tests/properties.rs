//! Property-based tests for hkgraph-core.
//!
//! Tests identifier uniqueness and text round trips, and that concurrent
//! structural mutation never leaves the graph in a state that breaks its
//! invariants.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use hkgraph_core::{
    DispatchMode, Graph, GraphOptions, IdProvider, Identifier, Node, NodeId, NodeProcessor,
    Payload, Pin,
};
use parking_lot::Mutex;
use proptest::prelude::*;
use uuid::Uuid;

/// Counts payloads and never forwards, so random cycles stay finite.
#[derive(Clone, Default)]
struct Count(Arc<AtomicUsize>);

impl NodeProcessor for Count {
    fn type_tag(&self) -> &'static str {
        "count"
    }

    fn handle(&self, _graph: &Graph, _node: &Node, _source: Option<&Pin>, _payload: &Payload) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Clone, Debug)]
enum Op {
    Add { ins: u32, outs: u32 },
    Remove(usize),
    Connect(usize, usize),
    Disconnect(usize),
    Mute(usize),
    Dispatch(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0u32..3, 0u32..3).prop_map(|(ins, outs)| Op::Add { ins, outs }),
        1 => any::<usize>().prop_map(Op::Remove),
        3 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::Connect(a, b)),
        1 => any::<usize>().prop_map(Op::Disconnect),
        1 => any::<usize>().prop_map(Op::Mute),
        2 => any::<usize>().prop_map(Op::Dispatch),
    ]
}

fn pick(known: &Mutex<Vec<NodeId>>, index: usize) -> Option<NodeId> {
    let known = known.lock();
    if known.is_empty() {
        None
    } else {
        Some(known[index % known.len()])
    }
}

fn apply(graph: &Graph, known: &Mutex<Vec<NodeId>>, counter: &Count, op: &Op) {
    match *op {
        Op::Add { ins, outs } => {
            let node = Node::new(graph, "stress", ins, outs, Box::new(counter.clone()));
            let id = node.id();
            assert!(graph.add_node(node));
            known.lock().push(id);
        }
        Op::Remove(i) => {
            if let Some(id) = pick(known, i) {
                graph.remove_node(id);
            }
        }
        Op::Connect(a, b) => {
            let (Some(a), Some(b)) = (pick(known, a), pick(known, b)) else {
                return;
            };
            let (Some(from), Some(to)) = (graph.node(a), graph.node(b)) else {
                return;
            };
            if let (Some(&out), Some(&inp)) = (from.outs().first(), to.ins().first()) {
                graph.connect(out, inp);
            }
        }
        Op::Disconnect(i) => {
            let edges = graph.edges();
            if !edges.is_empty() {
                graph.disconnect(edges[i % edges.len()].id);
            }
        }
        Op::Mute(i) => {
            if let Some(id) = pick(known, i) {
                graph.toggle_muted(id);
            }
        }
        Op::Dispatch(i) => {
            if let Some(node) = pick(known, i).and_then(|id| graph.node(id)) {
                for pin in node.pin_ids() {
                    graph.dispatch_pin(pin, &Payload::new(i));
                }
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A provider never repeats itself, whatever its seed.
    #[test]
    fn ids_unique_per_provider(seed in any::<u64>(), count in 1usize..2000) {
        let mut ids = IdProvider::from_seed(seed);
        let mut seen = HashSet::with_capacity(count);
        for _ in 0..count {
            prop_assert!(seen.insert(ids.make_id()));
        }
    }

    /// The text form parses back to the same identifier.
    #[test]
    fn id_text_round_trip(bits in any::<u128>()) {
        let id = Identifier::from(Uuid::from_u128(bits));
        let text = id.to_string();
        prop_assert_eq!(text.len(), 36);
        prop_assert_eq!(Identifier::parse(&text).ok(), Some(id));
        prop_assert_eq!(text.to_uppercase().parse::<Identifier>().ok(), Some(id));
    }

    /// Text without any hex digit is never an identifier.
    #[test]
    fn non_hex_text_rejected(text in "[g-zG-Z ]{0,40}") {
        let err = Identifier::parse(&text).unwrap_err();
        prop_assert_eq!(err.text(), text.as_str());
    }

    /// Pin and node counts follow directly from the nodes that were added.
    #[test]
    fn counts_track_additions(shapes in prop::collection::vec((0u32..4, 0u32..4), 0..20)) {
        let graph = Graph::with_provider(GraphOptions::default(), IdProvider::from_seed(1));
        let counter = Count::default();
        for (ins, outs) in &shapes {
            graph.add_node(Node::new(&graph, "n", *ins, *outs, Box::new(counter.clone())));
        }
        let pins: u32 = shapes.iter().map(|(i, o)| i + o).sum();
        prop_assert_eq!(graph.node_count(), shapes.len());
        prop_assert_eq!(graph.pin_count(), pins as usize);
        prop_assert!(graph.check_integrity().is_ok());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Four threads mutating and dispatching at once, plus an auditor that
    /// keeps checking the invariants against consistent snapshots.
    #[test]
    fn concurrent_mutation_preserves_invariants(
        scripts in prop::collection::vec(prop::collection::vec(op(), 1..60), 4),
        worker in any::<bool>(),
    ) {
        let mode = if worker { DispatchMode::Worker } else { DispatchMode::Inline };
        let graph = Graph::with_provider(
            GraphOptions { mode, ..GraphOptions::default() },
            IdProvider::from_seed(99),
        );
        let known = Mutex::new(Vec::new());
        let counter = Count::default();
        let done = AtomicUsize::new(0);
        let violations = Mutex::new(Vec::new());

        std::thread::scope(|scope| {
            for script in &scripts {
                let (graph, known, counter, done) = (&graph, &known, &counter, &done);
                scope.spawn(move || {
                    for op in script {
                        apply(graph, known, counter, op);
                    }
                    done.fetch_add(1, Ordering::SeqCst);
                });
            }
            let (graph, done, violations) = (&graph, &done, &violations);
            scope.spawn(move || {
                while done.load(Ordering::SeqCst) < 4 {
                    if let Err(err) = graph.check_integrity() {
                        violations.lock().push(err);
                    }
                    std::thread::yield_now();
                }
            });
        });

        let violations = violations.into_inner();
        prop_assert!(violations.is_empty(), "{:?}", violations);
        prop_assert!(graph.check_integrity().is_ok());
        for id in graph.node_ids() {
            let node = graph.node(id).unwrap();
            for pin in node.pins() {
                prop_assert_eq!(graph.pin(pin.id), Some(pin));
            }
        }
        for edge in graph.edges() {
            prop_assert!(graph.contains_node(edge.source_node));
            prop_assert!(graph.contains_node(edge.target_node));
        }
    }
}
