//! Playrecap - console and log output for playbook runs
//!
//! This is the main entry point for the Playrecap CLI.

mod cli;

use anyhow::Result;
use cli::commands::{CommandContext, Runnable};
use cli::{Cli, Commands};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Application version information
const VERSION: &str = env!("CARGO_PKG_VERSION");
const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Display version if verbose
    if cli.verbosity() >= 2 {
        eprintln!("Playrecap v{} by {}", VERSION, AUTHORS);
    }

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Create command context
    let mut ctx = CommandContext::new(&cli);

    // Execute the appropriate command
    let exit_code = match &cli.command {
        Commands::Recap(args) => args.run(&mut ctx)?,
        Commands::Replay(args) => args.run(&mut ctx)?,
    };

    std::process::exit(exit_code);
}

/// Initialize logging based on verbosity level
fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbosity >= 3),
        )
        .with(env_filter)
        .init();
}
