// src/cli/mod.rs

use std::path::PathBuf;

use clap::Parser;

pub mod handlers;

/// conch: a command-driven interactive shell engine.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Run the commands in FILE instead of starting an interactive session.
    #[arg(long, short, value_name = "FILE")]
    pub batch: Option<PathBuf>,

    /// Execute one command line, then exit.
    #[arg(long = "command", short = 'c', value_name = "LINE")]
    pub command: Option<String>,

    /// Lower the verbosity; at negative verbosity command echo is
    /// suppressed entirely.
    #[arg(long, short, action = clap::ArgAction::Count)]
    pub quiet: u8,
}
