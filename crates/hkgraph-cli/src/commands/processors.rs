//! Processor listing command.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use clap::Args;
use hkgraph_registry::ProcessorRegistry;

#[derive(Args)]
pub struct ProcessorsArgs {
    /// Show details for a single processor type
    #[arg(value_name = "TYPE")]
    processor: Option<String>,
}

pub fn run(args: &ProcessorsArgs) -> anyhow::Result<()> {
    let registry = ProcessorRegistry::new();

    if let Some(tag) = &args.processor {
        let d = registry
            .get(tag)
            .ok_or_else(|| anyhow::anyhow!("Unknown processor: {tag}"))?;
        println!("{}", d.name);
        println!("{}", "=".repeat(d.name.len()));
        println!();
        println!("{}", d.description);
        println!();
        println!("  type tag: {}", d.id);
        println!("  inputs:   {}", d.inputs);
        println!("  outputs:  {}", d.outputs);
        println!("  sticky:   {}", d.sticky);
        return Ok(());
    }

    println!("Available Processors");
    println!();
    println!("  {:12}  {:>3}  {:>3}  {:6}  {}", "Type", "In", "Out", "Sticky", "Description");
    println!("  {:12}  {:>3}  {:>3}  {:6}  {}", "----", "--", "---", "------", "-----------");
    for d in registry.all() {
        println!(
            "  {:12}  {:>3}  {:>3}  {:6}  {}",
            d.id,
            d.inputs,
            d.outputs,
            if d.sticky { "yes" } else { "no" },
            d.description
        );
    }
    Ok(())
}
