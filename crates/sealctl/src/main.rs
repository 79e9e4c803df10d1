//! `sealctl`: operator CLI entry point.
//!
//! Startup sequence:
//! 1. Parse the command line.
//! 2. Load and validate [`config::Config`] from environment variables.
//! 3. Initialise structured JSON logging on stderr.
//! 4. Run the command against stdout.

mod cli;
mod config;
mod telemetry;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Command line
    // -----------------------------------------------------------------------
    let args = cli::Cli::parse();

    // -----------------------------------------------------------------------
    // 2. Configuration
    // -----------------------------------------------------------------------
    let cfg = config::Config::from_env().map_err(|e| {
        eprintln!("ERROR: sealctl configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 3. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;

    // -----------------------------------------------------------------------
    // 4. Command
    // -----------------------------------------------------------------------
    let key = cfg.key()?;
    cli::run(args.command, &key, &mut std::io::stdout().lock())
}
