// marksman/src/lib.rs
//! # marksman CLI
//!
//! This crate provides the command-line interface for the marksman grading
//! engine: grading a single answer, grading a batch of requests from a JSON
//! file, and listing the available grading profiles.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;

use anyhow::Result;

use cli::{Cli, Commands};

/// Dispatches a parsed command line to its subcommand.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Grade(cmd) => commands::grade::run_grade_command(cmd).await,
        Commands::Batch(cmd) => commands::batch::run_batch_command(cmd, cli.quiet).await,
        Commands::Profiles(cmd) => commands::profiles::run_profiles_command(cmd),
    }
}
