//! Identifier generation command.

use anyhow::ensure;
use clap::Args;
use hkgraph_core::{IdProvider, Identifier};

#[derive(Args)]
pub struct IdsArgs {
    /// Number of identifiers to generate
    #[arg(short, long, default_value_t = 4)]
    count: usize,

    /// Seed for a reproducible sequence (OS entropy when omitted)
    #[arg(short, long)]
    seed: Option<u64>,
}

pub fn run(args: &IdsArgs) -> anyhow::Result<()> {
    let mut ids = match args.seed {
        Some(seed) => IdProvider::from_seed(seed),
        None => IdProvider::new(),
    };

    for _ in 0..args.count {
        let id = ids.make_id();
        let text = id.to_string();
        let back: Identifier = text.parse()?;
        ensure!(back == id, "round trip mismatch for {text}");
        println!("{text}");
    }
    Ok(())
}
