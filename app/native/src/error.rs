//! Error types for Overnotch.
//!
//! This module provides the unified error type used throughout the application.
//! The overlay core degrades instead of failing, so these errors mostly surface
//! at the edges: CLI commands, configuration loading and window backends.

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during application execution.
///
/// Serializable so it can be printed as structured output by the CLI.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum OvernotchError {
    /// Invalid command arguments.
    #[error("{0}")]
    InvalidArguments(String),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// The window backend could not create or mutate a window.
    #[error("Window error: {0}")]
    WindowError(String),
    /// Display enumeration failed.
    #[error("Display error: {0}")]
    DisplayError(String),
    /// Communication with the coordinator actor failed.
    #[error("Coordinator error: {0}")]
    CoordinatorError(String),
    /// A service failed to start.
    #[error("Service error: {0}")]
    ServiceError(String),
    /// The current platform cannot host the overlay.
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),
    /// IO error.
    #[error("IO error: {0}")]
    IoError(String),
    /// Generic command error.
    #[error("{0}")]
    CommandError(String),
}

impl From<std::io::Error> for OvernotchError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err.to_string()) }
}

impl From<serde_json::Error> for OvernotchError {
    fn from(err: serde_json::Error) -> Self { Self::CommandError(err.to_string()) }
}

impl From<crate::config::ConfigError> for OvernotchError {
    fn from(err: crate::config::ConfigError) -> Self { Self::ConfigError(err.to_string()) }
}

impl From<crate::actor::ActorError> for OvernotchError {
    fn from(err: crate::actor::ActorError) -> Self { Self::CoordinatorError(err.to_string()) }
}

impl From<String> for OvernotchError {
    fn from(msg: String) -> Self { Self::CommandError(msg) }
}

impl From<&str> for OvernotchError {
    fn from(msg: &str) -> Self { Self::CommandError(msg.to_string()) }
}
