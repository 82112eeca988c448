//! Identifier parsing command.

use std::fmt::Write as _;

use anyhow::Context;
use clap::Args;
use hkgraph_core::Identifier;

#[derive(Args)]
pub struct ParseArgs {
    /// Identifier text (hyphenated, simple, braced or urn form)
    #[arg(value_name = "TEXT")]
    text: String,
}

pub fn run(args: &ParseArgs) -> anyhow::Result<()> {
    let id = Identifier::parse(&args.text)
        .with_context(|| format!("not an identifier: {:?}", args.text))?;

    let hex = id.as_bytes().iter().fold(String::with_capacity(32), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    });
    println!("canonical: {id}");
    println!("bytes:     {hex}");
    println!("version:   {}", id.as_uuid().get_version_num());
    Ok(())
}
