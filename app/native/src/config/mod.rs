//! Configuration module for Overnotch.
//!
//! This module provides configuration types, loading functionality, and file
//! watching for hot-reloading configuration changes.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

pub mod schema;
pub mod template;
pub mod types;
mod watcher;

use std::path::PathBuf;
use std::sync::OnceLock;

pub use types::{
    ClipboardConfig, ConfigError, DisplaysConfig, NotchConfig, OvernotchConfig, StatsConfig,
    config_paths, load_config as load_config_default, load_config_from_path, parse_config,
};
pub use watcher::ConfigWatcher;

/// Global configuration instance, loaded once at startup.
static CONFIG: OnceLock<OvernotchConfig> = OnceLock::new();

/// Path to the currently loaded configuration file.
static CONFIG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Custom config path override (set via CLI --config flag).
static CUSTOM_CONFIG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Sets a custom configuration file path to use instead of the default search paths.
///
/// This must be called before `init()` or `get_config()` to take effect.
///
/// # Returns
///
/// `true` if the path was set successfully, `false` if a path was already set.
pub fn set_custom_config_path(path: PathBuf) -> bool { CUSTOM_CONFIG_PATH.set(path).is_ok() }

/// Loads the configuration from disk, falling back to defaults.
fn load_or_default() -> OvernotchConfig {
    let result = CUSTOM_CONFIG_PATH
        .get()
        .map_or_else(load_config_default, |path| load_config_from_path(path.as_path()));

    match result {
        Ok((config, path)) => {
            tracing::info!(path = %path.display(), "overnotch: config: loaded");
            let _ = CONFIG_PATH.set(path);
            config
        }
        Err(ConfigError::NotFound) => {
            tracing::debug!("overnotch: config: no configuration file, using defaults");
            OvernotchConfig::default()
        }
        Err(err) => {
            tracing::warn!(error = %err, "overnotch: config: failed to load configuration, using defaults");
            OvernotchConfig::default()
        }
    }
}

/// Initializes and returns the global configuration instance.
///
/// This function is idempotent - calling it multiple times will return
/// the same configuration instance.
pub fn init() -> &'static OvernotchConfig { CONFIG.get_or_init(load_or_default) }

/// Returns the global configuration instance, initializing it if necessary.
///
/// This is the configuration as loaded at startup. Runtime changes live in
/// the [`crate::preferences::PreferenceStore`].
pub fn get_config() -> &'static OvernotchConfig { init() }

/// Returns the path to the loaded configuration file, if any.
pub fn get_config_path() -> Option<&'static PathBuf> { CONFIG_PATH.get() }

/// Returns the file the configuration is, or would be, read from.
///
/// This is the `--config` override, else the loaded file, else the first
/// search location.
#[must_use]
pub fn target_config_path() -> Option<PathBuf> {
    CUSTOM_CONFIG_PATH
        .get()
        .or_else(get_config_path)
        .cloned()
        .or_else(|| config_paths().into_iter().next())
}
