#![allow(clippy::multiple_crate_versions)]

//! Overnotch - multi-display notch overlay for macOS.
//!
//! This binary serves as both the overlay and its CLI:
//! - With no subcommand (or `run`): starts the overlay
//! - With a subcommand (e.g. `overnotch displays`): runs it and exits
//!
//! Logs go to stderr. Set `RUST_LOG` to change verbosity.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("overnotch_lib=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();

    if let Err(err) = overnotch_lib::cli::run() {
        eprintln!("overnotch: {err}");
        std::process::exit(1);
    }
}
