use anyhow::{Context, Result};
use clap::Args as ClapArgs;

use crate::status::StatusDocument;

#[derive(ClapArgs)]
pub struct Args {
    /// Print the schema on a single line
    #[arg(long)]
    pub compact: bool,
}

/// Print the JSON Schema of the status document expected on stdin.
pub fn run(args: Args) -> Result<()> {
    println!("{}", schema_json(args.compact)?);
    Ok(())
}

fn schema_json(compact: bool) -> Result<String> {
    let schema = schemars::schema_for!(StatusDocument);
    let text = if compact {
        serde_json::to_string(&schema)
    } else {
        serde_json::to_string_pretty(&schema)
    };
    text.context("failed to serialize schema")
}
