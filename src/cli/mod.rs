pub mod install;
pub mod output;
pub mod schema;
pub mod statusline;

use clap::{Parser, Subcommand};

/// Status line for Claude Code sessions
///
/// Reads the session status JSON on stdin and prints a two-line summary of
/// the working directory, git state, model and session.
#[derive(Parser)]
#[command(name = "cc-statusline", version, about, args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub render: statusline::Args,
}

#[derive(Subcommand)]
pub enum Command {
    /// Install this binary to ~/.claude/statusline
    Install(install::Args),

    /// Print the JSON Schema of the status document
    Schema(schema::Args),
}
