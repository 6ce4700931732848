//! Command-line interface for Overnotch.
//!
//! Running `overnotch` without a subcommand starts the overlay; the other
//! commands inspect displays and manage the configuration file.

mod commands;
mod output;

use clap::Parser;
pub use commands::{Cli, Commands, ConfigCommands};

use crate::error::OvernotchError;

/// Runs the CLI.
///
/// Parses command-line arguments and executes the appropriate command.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn run() -> Result<(), OvernotchError> {
    let cli = Cli::parse();
    cli.execute()
}
