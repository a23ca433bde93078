//! Subcommands module for Playrecap CLI
//!
//! This module contains all the subcommand implementations.

pub mod recap;
pub mod replay;

use anyhow::{Context, Result};
use playrecap::callback::{Display, LogSink, RecapConfigLoader, TracingLog, WriterLog};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

/// Common context shared between commands
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Explicit configuration file
    pub config_path: Option<PathBuf>,
    /// Verbosity level
    pub verbosity: u8,
    /// Whether colors were disabled on the command line
    pub no_color: bool,
}

impl CommandContext {
    /// Create a new command context from CLI arguments
    pub fn new(cli: &crate::cli::Cli) -> Self {
        Self {
            config_path: cli.config.clone(),
            verbosity: cli.verbosity(),
            no_color: cli.no_color,
        }
    }

    /// Configuration loader seeded with the global CLI options.
    pub fn loader(&self) -> RecapConfigLoader {
        let mut loader = RecapConfigLoader::new();
        if let Some(path) = &self.config_path {
            loader = loader.with_file(path);
        }
        if self.no_color {
            loader = loader.with_colors(false);
        }
        loader
    }

    /// Display on stdout; the log goes to `log_file` when given, otherwise
    /// through `tracing`.
    pub fn display(&self, log_file: Option<&Path>) -> Result<Display> {
        let log: Box<dyn LogSink> = match log_file {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create log file: {}", path.display()))?;
                Box::new(WriterLog::new(BufWriter::new(file)).with_timestamps(true))
            }
            None => Box::new(TracingLog),
        };
        Ok(Display::new(Box::new(io::stdout()), log))
    }
}

/// Trait for runnable commands
pub trait Runnable {
    /// Execute the command
    fn run(&self, ctx: &mut CommandContext) -> Result<i32>;
}
