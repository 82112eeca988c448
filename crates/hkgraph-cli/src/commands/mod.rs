//! CLI command implementations.

pub mod ids;
pub mod parse;
pub mod processors;
pub mod run;
