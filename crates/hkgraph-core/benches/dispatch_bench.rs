//! Criterion benchmarks for payload propagation (`hkgraph-core::dispatch`).
//!
//! Measures per-hop overhead with a trivial forwarding processor. Two axes:
//!
//! - **Chain**: linear chains in inline and worker mode
//! - **Fan-out**: one output pin feeding many inputs
//!
//! Run with: `cargo bench -p hkgraph-core -- dispatch/`
#![allow(missing_docs)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use hkgraph_core::{DispatchMode, Graph, GraphOptions, Node, NodeProcessor, Payload, Pin, PinId};

const CHAIN_LENGTHS: &[usize] = &[1, 8, 32];

// ---------------------------------------------------------------------------
// Trivial processors
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct Forward;

impl NodeProcessor for Forward {
    fn type_tag(&self) -> &'static str {
        "forward"
    }

    fn handle(&self, graph: &Graph, node: &Node, _source: Option<&Pin>, payload: &Payload) {
        graph.dispatch_outputs(node, payload);
    }
}

#[derive(Clone, Default)]
struct Sink(Arc<AtomicU64>);

impl NodeProcessor for Sink {
    fn type_tag(&self) -> &'static str {
        "sink"
    }

    fn handle(&self, _graph: &Graph, _node: &Node, _source: Option<&Pin>, _payload: &Payload) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

// ---------------------------------------------------------------------------
// Graph constructors
// ---------------------------------------------------------------------------

fn make_chain(mode: DispatchMode, hops: usize) -> (Graph, PinId) {
    let graph = Graph::with_options(GraphOptions {
        mode,
        ..GraphOptions::default()
    });
    let head = Node::new(&graph, "head", 0, 1, Box::new(Forward));
    let entry = head.outs()[0];
    graph.add_node(head);

    let mut prev = entry;
    for _ in 0..hops {
        let hop = Node::new(&graph, "hop", 1, 1, Box::new(Forward));
        let (inp, out) = (hop.ins()[0], hop.outs()[0]);
        graph.add_node(hop);
        graph.connect(prev, inp);
        prev = out;
    }
    let tail = Node::new(&graph, "tail", 1, 0, Box::new(Sink::default()));
    let inp = tail.ins()[0];
    graph.add_node(tail);
    graph.connect(prev, inp);
    (graph, entry)
}

fn make_fan_out(width: usize) -> (Graph, PinId) {
    let graph = Graph::with_options(GraphOptions {
        mode: DispatchMode::Inline,
        ..GraphOptions::default()
    });
    let head = Node::new(&graph, "head", 0, 1, Box::new(Forward));
    let entry = head.outs()[0];
    graph.add_node(head);
    let sink = Sink::default();
    for _ in 0..width {
        let node = Node::new(&graph, "sink", 1, 0, Box::new(sink.clone()));
        let inp = node.ins()[0];
        graph.add_node(node);
        graph.connect(entry, inp);
    }
    (graph, entry)
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch/chain");
    let payload = Payload::new(64_u8);

    for &hops in CHAIN_LENGTHS {
        for mode in [DispatchMode::Inline, DispatchMode::Worker] {
            let (graph, entry) = make_chain(mode, hops);
            group.bench_with_input(BenchmarkId::new(mode.name(), hops), &hops, |b, _| {
                b.iter(|| graph.dispatch_pin(black_box(entry), &payload));
            });
        }
    }

    group.finish();
}

fn bench_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch/fan_out");
    let payload = Payload::new(64_u8);

    for width in [4_usize, 64] {
        let (graph, entry) = make_fan_out(width);
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, _| {
            b.iter(|| graph.dispatch_pin(black_box(entry), &payload));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_chain, bench_fan_out);
criterion_main!(benches);
