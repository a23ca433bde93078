//! Replay command - feed recorded lifecycle events to the rich callback
//!
//! Each non-blank line of the input is one JSON-encoded event.

use super::{CommandContext, Runnable};
use anyhow::{Context, Result};
use clap::Parser;
use playrecap::callback::{LifecycleEvent, RichCallback};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use tracing::{debug, info};

/// Arguments for the replay command
#[derive(Parser, Debug, Clone)]
pub struct ReplayArgs {
    /// Path to the JSON-lines event file
    #[arg(required = true)]
    pub file: PathBuf,

    /// Treat the run as a dry run
    #[arg(long)]
    pub dry_run: bool,

    /// Write the plain log to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Show retries on one line instead of progress bars
    #[arg(long)]
    pub no_progress: bool,
}

impl ReplayArgs {
    /// Execute the replay command
    pub fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let mut loader = ctx.loader();
        if self.no_progress {
            loader = loader.with_progress(false);
        }
        let config = loader.load()?;
        let display = ctx.display(self.log_file.as_deref())?;
        let mut callback =
            RichCallback::from_config(&config, display)?.with_check_mode(self.dry_run);

        let file = File::open(&self.file)
            .with_context(|| format!("Failed to open event file: {}", self.file.display()))?;

        let mut events = 0usize;
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line
                .with_context(|| format!("Failed to read event file: {}", self.file.display()))?;
            if line.trim().is_empty() {
                continue;
            }
            let event = LifecycleEvent::from_json_line(&line)
                .with_context(|| format!("Invalid event on line {}", index + 1))?;
            debug!("Replaying {} event", event.event_type());
            callback
                .dispatch(&event)
                .with_context(|| format!("Failed to handle event on line {}", index + 1))?;
            events += 1;
        }

        callback.flush()?;
        info!("Replayed {} events from {}", events, self.file.display());
        Ok(0)
    }
}

impl Runnable for ReplayArgs {
    fn run(&self, ctx: &mut CommandContext) -> Result<i32> {
        self.execute(ctx)
    }
}
