//! Config CLI commands.
//!
//! Commands for managing the Overnotch configuration file.

use std::path::PathBuf;

use clap::Subcommand;
use colored::Colorize;

use crate::cli::output;
use crate::config::template::{create_config_file, generate_config_template};
use crate::config::{self, config_paths};
use crate::error::OvernotchError;

/// Config management commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum ConfigCommands {
    /// Initialize a new configuration file with all options documented.
    ///
    /// Creates a new configuration file at the default location with all
    /// available options commented out.
    #[command(
        name = "init",
        after_long_help = r#"Examples:
  overnotch config init              # Create config at default location
  overnotch config init --force      # Overwrite existing config
  overnotch config init --path ~/my-config.jsonc  # Create at custom path
  overnotch config init --stdout     # Print template to stdout"#
    )]
    Init {
        /// Overwrite existing configuration file if it exists.
        #[arg(long, short)]
        force: bool,

        /// Custom path for the configuration file.
        /// If not specified, uses ~/.config/overnotch/config.jsonc
        #[arg(long, short, value_name = "PATH")]
        path: Option<PathBuf>,

        /// Print the configuration template to stdout instead of writing to a file.
        #[arg(long)]
        stdout: bool,
    },

    /// Show the path to the configuration file.
    ///
    /// Displays the paths where Overnotch looks for configuration files,
    /// and indicates which one is currently in use (if any).
    Path,

    /// Print the effective configuration as JSON.
    ///
    /// Shows the loaded file merged with defaults.
    Show,
}

/// Execute config subcommands.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cmd: &ConfigCommands) -> Result<(), OvernotchError> {
    match cmd {
        ConfigCommands::Init { force, path, stdout } => {
            if *stdout {
                println!("{}", generate_config_template());
                Ok(())
            } else {
                init_config(*force, path.clone())
            }
        }
        ConfigCommands::Path => {
            show_config_path();
            Ok(())
        }
        ConfigCommands::Show => show_config(),
    }
}

/// Initialize a new configuration file.
fn init_config(force: bool, custom_path: Option<PathBuf>) -> Result<(), OvernotchError> {
    let config_path = custom_path
        .map(|path| PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref()))
        .unwrap_or_else(|| {
            config_paths().into_iter().next().unwrap_or_else(|| PathBuf::from("config.jsonc"))
        });

    if config_path.exists() && !force {
        return Err(OvernotchError::ConfigError(format!(
            "Configuration file already exists at: {}\nUse --force to overwrite.",
            config_path.display()
        )));
    }

    create_config_file(&config_path).map_err(|e| {
        OvernotchError::ConfigError(format!(
            "Failed to create config file {}: {e}",
            config_path.display()
        ))
    })?;

    println!("{} {}", "Configuration file created at:".green(), config_path.display());
    println!("\nAll options are commented out by default.");
    println!("Edit the file and uncomment the options you want to configure.");

    Ok(())
}

/// Returns the search paths with a marker for the one that would be loaded.
fn annotated_paths(paths: &[PathBuf], exists: impl Fn(&PathBuf) -> bool) -> Vec<(PathBuf, &'static str)> {
    let mut found = false;
    paths
        .iter()
        .map(|path| {
            let marker = if exists(path) && !found {
                found = true;
                "active"
            } else if exists(path) {
                "exists"
            } else {
                ""
            };
            (path.clone(), marker)
        })
        .collect()
}

/// Show the configuration file paths.
fn show_config_path() {
    println!("Configuration file search paths (in priority order):\n");

    let annotated = annotated_paths(&config_paths(), |path| path.exists());
    for (i, (path, marker)) in annotated.iter().enumerate() {
        let marker = match *marker {
            "active" => " (active)".green().to_string(),
            "exists" => " (exists)".dimmed().to_string(),
            _ => String::new(),
        };
        println!("  {}. {}{marker}", i + 1, path.display());
    }

    if annotated.iter().all(|(_, marker)| marker.is_empty()) {
        println!("\nNo configuration file found.");
        println!("Run 'overnotch config init' to create one.");
    }
}

/// Print the effective configuration.
fn show_config() -> Result<(), OvernotchError> {
    let value = serde_json::to_value(config::get_config())?;
    output::print_highlighted_json(&value);

    match config::get_config_path() {
        Some(path) => println!("{} {}", "Loaded from:".dimmed(), path.display()),
        None => println!("{}", "No configuration file found, showing defaults.".dimmed()),
    }
    Ok(())
}
