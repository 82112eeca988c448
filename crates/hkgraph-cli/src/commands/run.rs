//! Chain run command.
//!
//! Builds `midi-in -> chain... -> midi-out`, pushes one payload through it
//! and prints what reached the exit.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Args, ValueEnum};
use hkgraph_config::{GraphConfig, default_config_path};
use hkgraph_core::{DispatchMode, Graph, GraphEvent, NodeId, Payload, PinId};
use hkgraph_registry::{Endpoints, ProcessorRegistry};
use tracing::info;

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Inline,
    Worker,
}

impl From<ModeArg> for DispatchMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Inline => DispatchMode::Inline,
            ModeArg::Worker => DispatchMode::Worker,
        }
    }
}

#[derive(Args)]
pub struct RunArgs {
    /// Processor type tags between the entry and exit nodes
    #[arg(long, value_delimiter = ',', default_value = "passthrough")]
    chain: Vec<String>,

    /// Dispatch mode (overrides the config file)
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Mute the chain node at this zero-based index (repeatable)
    #[arg(long, value_name = "INDEX")]
    mute: Vec<usize>,

    /// Integer payload to inject
    #[arg(long, default_value_t = 60, allow_negative_numbers = true)]
    payload: i64,

    /// Graph config file (defaults to the user config path)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

pub fn run(args: &RunArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => GraphConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GraphConfig::load_or_default(default_config_path())?,
    };
    crate::init_tracing(config.log_filter.as_deref());

    let graph = config.build_graph();
    if let Some(mode) = args.mode {
        graph.set_dispatch_mode(mode.into());
    }
    graph.subscribe(|event: &GraphEvent| info!(?event, "graph event"));

    let registry = ProcessorRegistry::new();
    let endpoints = Endpoints::install(&graph, &registry)
        .context("registry lacks the midi-in/midi-out processors")?;
    let chain = build_chain(&graph, &registry, &endpoints, &args.chain)?;

    for &index in &args.mute {
        let Some(node) = chain.get(index) else {
            bail!("--mute {index}: chain has {} nodes", chain.len());
        };
        graph.set_muted(*node, true);
    }
    graph.check_integrity()?;

    let output = endpoints.process_block(&graph, &Payload::new(args.payload));
    let values: Vec<String> = output
        .iter()
        .map(|p| match p.downcast_ref::<i64>() {
            Some(v) => v.to_string(),
            None => "?".to_owned(),
        })
        .collect();

    println!("output: [{}]", values.join(", "));
    println!("{}", graph.stats());
    Ok(())
}

/// Adds one node per tag and wires entry, chain and exit in sequence.
/// Returns the chain node ids in order.
fn build_chain(
    graph: &Graph,
    registry: &ProcessorRegistry,
    endpoints: &Endpoints,
    tags: &[String],
) -> anyhow::Result<Vec<NodeId>> {
    let mut prev: PinId = endpoints
        .entry_pin(graph)
        .context("entry node has no output pin")?;
    let mut ids = Vec::with_capacity(tags.len());

    for tag in tags {
        let Some(node) = registry.create_node(graph, tag) else {
            bail!("Unknown processor: {tag}");
        };
        let (Some(input), Some(output)) = (node.input(0), node.output(0)) else {
            bail!("processor {tag} cannot sit inside a chain");
        };
        ids.push(node.id());
        graph.add_node(node);
        graph.try_connect(prev, input)?;
        prev = output;
    }

    let exit = endpoints
        .exit_pin(graph)
        .context("exit node has no input pin")?;
    graph.try_connect(prev, exit)?;
    Ok(ids)
}
