//! Configuration template generation.
//!
//! Generates a commented configuration file listing every option with its
//! default value.

use std::fs;
use std::path::Path;

/// Generates a configuration template with all options commented out.
#[must_use]
pub fn generate_config_template() -> String {
    r#"// Overnotch Configuration File
// ============================
// This file uses JSONC format (JSON with comments).
// All options below are commented out and show their default values.
// Uncomment and modify the options you want to configure.
// Changes are picked up while Overnotch is running.

{
  // ============================================================================
  // Displays
  // ============================================================================
  // "displays": {
  //   // Show a notch on every connected display
  //   "showOnAllDisplays": false,
  //
  //   // Follow the main display when the preferred display is disconnected
  //   "automaticallySwitchDisplay": true,
  //
  //   // Display to use in single-window mode (see `overnotch displays`)
  //   "preferredScreen": ""
  // },

  // ============================================================================
  // Stats
  // ============================================================================
  // "stats": {
  //   // Enable the stats tab. Every graph beyond three widens the open notch.
  //   "enableStatsFeature": false,
  //   "showCpuGraph": true,
  //   "showMemoryGraph": true,
  //   "showGpuGraph": false,
  //   "showNetworkGraph": false,
  //   "showDiskGraph": false
  // },

  // ============================================================================
  // Clipboard
  // ============================================================================
  // "clipboard": {
  //   // Allow the clipboard history shortcut to open the notch
  //   "enabled": true
  // },

  // ============================================================================
  // Notch Size (points)
  // ============================================================================
  // "notch": {
  //   "closedWidth": 185,
  //   "closedHeight": 32,
  //   "openWidth": 640,
  //   "openHeight": 190
  // }
}
"#
    .to_string()
}

/// Writes the template to `path`, creating parent directories.
///
/// # Errors
///
/// Returns an error if the directories or the file cannot be written.
pub fn create_config_file(path: &Path) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, generate_config_template())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{OvernotchConfig, parse_config};

    #[test]
    fn test_template_parses_to_defaults() {
        let config = parse_config(&generate_config_template()).unwrap();
        assert_eq!(config, OvernotchConfig::default());
    }

    #[test]
    fn test_template_mentions_every_section() {
        let template = generate_config_template();
        for key in ["\"displays\"", "\"stats\"", "\"clipboard\"", "\"notch\"", "preferredScreen"] {
            assert!(template.contains(key), "template should mention {key}");
        }
    }

    #[test]
    fn test_create_config_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("overnotch").join("config.jsonc");

        create_config_file(&path).unwrap();
        assert!(path.exists());
    }
}
