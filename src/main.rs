mod cli;
mod config;
mod exec;
mod git;
mod logging;
mod status;
mod theme;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => cli::statusline::run(cli.render),
        Some(Command::Install(args)) => cli::install::run(args),
        Some(Command::Schema(args)) => cli::schema::run(args),
    }
}
