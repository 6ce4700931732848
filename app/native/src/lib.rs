//! Overnotch - A multi-display notch overlay for macOS.
//!
//! Keeps one borderless overlay window per display (or a single window that
//! follows the preferred display) pinned over the camera notch, and drives
//! each window's open/closed state from user input and timers.
//!
//! The core is platform neutral: displays, windows and timers sit behind
//! traits so the [`coordinator`] can run headless against in-memory doubles.

// Core modules
pub mod actor;
pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod coordinator;
pub mod display;
pub mod error;
pub mod events;
pub mod geometry;
pub mod platform;
pub mod preferences;
pub mod scheduler;
pub mod services;
pub mod state;
pub mod toggle;
pub mod window;

pub use app::{Overnotch, Platform, launch, run};
pub use error::OvernotchError;
