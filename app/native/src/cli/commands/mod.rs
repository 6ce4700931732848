//! CLI command definitions using Clap.
//!
//! - `config_cmd` - Configuration file management
//! - `displays` - Display inspection

use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};

use crate::config;
use crate::error::OvernotchError;

pub mod config_cmd;
pub mod displays;

pub use config_cmd::ConfigCommands;

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Overnotch - a notch overlay for every display.
#[derive(Parser, Debug)]
#[command(name = "overnotch")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file.
    ///
    /// Overrides the default configuration file search paths.
    /// Supports JSONC format (JSON with comments) and `~` expansion.
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// Start the notch overlay.
    ///
    /// This is what runs when no subcommand is given.
    Run,

    /// List connected displays and where the closed notch is placed.
    Displays {
        /// Print as JSON instead of a table.
        #[arg(long, short)]
        json: bool,
    },

    /// Configuration file management commands.
    ///
    /// Initialize, view, and locate the configuration file.
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Output the configuration JSON Schema.
    ///
    /// Can be redirected to a file for use with editors that support JSON
    /// Schema validation.
    Schema,

    /// Generate shell completions.
    ///
    /// Usage:
    ///   eval "$(overnotch completions --shell zsh)"
    ///   overnotch completions --shell fish > ~/.config/fish/completions/overnotch.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Returns the custom config path if specified via --config flag, with
    /// `~` expanded.
    #[must_use]
    pub fn config_path(&self) -> Option<PathBuf> {
        self.config.as_deref().map(|path| PathBuf::from(shellexpand::tilde(path).as_ref()))
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command execution fails.
    pub fn execute(&self) -> Result<(), OvernotchError> {
        if let Some(path) = self.config_path() {
            if !path.exists() {
                return Err(OvernotchError::ConfigError(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            config::set_custom_config_path(path);
        }

        match self.command.as_ref().unwrap_or(&Commands::Run) {
            Commands::Run => crate::app::run(),
            Commands::Displays { json } => displays::execute(*json),
            Commands::Config(cmd) => config_cmd::execute(cmd),
            Commands::Schema => {
                println!("{}", config::schema::generate_schema_json());
                Ok(())
            }
            Commands::Completions { shell } => {
                Self::print_completions(*shell);
                Ok(())
            }
        }
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, "overnotch", &mut io::stdout());
    }
}
