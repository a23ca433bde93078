//! CLI module for Playrecap
//!
//! Argument parsing and subcommand dispatch for the `playrecap` binary.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Playrecap - console and log output for playbook runs
///
/// Renders recaps from run statistics and replays lifecycle event streams
/// through the rich console callback.
#[derive(Parser, Debug, Clone)]
#[command(name = "playrecap")]
#[command(author = "Playrecap Contributors")]
#[command(version)]
#[command(about = "Recap tables and retry progress for playbook runs", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true, env = "PLAYRECAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Render the recap of a finished run from a stats file
    Recap(commands::recap::RecapArgs),

    /// Replay a JSON-lines stream of lifecycle events
    Replay(commands::replay::ReplayArgs),
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Get the effective verbosity level (0-3)
    pub fn verbosity(&self) -> u8 {
        self.verbose.min(3)
    }
}
