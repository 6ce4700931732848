//! Configuration types and file loading.
//!
//! The configuration file is JSONC (JSON with comments). Every field has a
//! default, so an empty object is a valid configuration.

use std::fs;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constants::notch;
use crate::geometry::Size;

// ============================================================================
// Sections
// ============================================================================

/// Display selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct DisplaysConfig {
    /// Show one notch on every connected display.
    /// Default: false
    pub show_on_all_displays: bool,

    /// In single-window mode, follow the main display when the preferred
    /// display is not connected.
    /// Default: true
    pub automatically_switch_display: bool,

    /// Name of the display to show the notch on in single-window mode, as
    /// reported by the OS (see `overnotch displays`). Empty for none.
    /// When several displays share the name, the first one wins.
    pub preferred_screen: String,
}

impl Default for DisplaysConfig {
    fn default() -> Self {
        Self {
            show_on_all_displays: false,
            automatically_switch_display: true,
            preferred_screen: String::new(),
        }
    }
}

/// Stats tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct StatsConfig {
    /// Enable the stats tab. Its width grows with the number of graphs.
    /// Default: false
    pub enable_stats_feature: bool,
    /// Default: true
    pub show_cpu_graph: bool,
    /// Default: true
    pub show_memory_graph: bool,
    /// Default: false
    pub show_gpu_graph: bool,
    /// Default: false
    pub show_network_graph: bool,
    /// Default: false
    pub show_disk_graph: bool,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            enable_stats_feature: false,
            show_cpu_graph: true,
            show_memory_graph: true,
            show_gpu_graph: false,
            show_network_graph: false,
            show_disk_graph: false,
        }
    }
}

/// Clipboard history panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ClipboardConfig {
    /// Allow the clipboard history shortcut to open the notch.
    /// Default: true
    pub enabled: bool,
}

impl Default for ClipboardConfig {
    fn default() -> Self { Self { enabled: true } }
}

/// Notch dimensions in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct NotchConfig {
    /// Default: 185
    pub closed_width: f64,
    /// Default: 32
    pub closed_height: f64,
    /// Default: 640
    pub open_width: f64,
    /// Default: 190
    pub open_height: f64,
}

impl Default for NotchConfig {
    fn default() -> Self {
        Self {
            closed_width: notch::CLOSED_WIDTH,
            closed_height: notch::CLOSED_HEIGHT,
            open_width: notch::OPEN_WIDTH,
            open_height: notch::OPEN_HEIGHT,
        }
    }
}

impl NotchConfig {
    /// Closed size, with non-positive dimensions replaced by the defaults.
    #[must_use]
    pub fn closed_size(&self) -> Size {
        Size::new(
            positive_or(self.closed_width, notch::CLOSED_WIDTH),
            positive_or(self.closed_height, notch::CLOSED_HEIGHT),
        )
    }

    /// Open size, with non-positive dimensions replaced by the defaults.
    #[must_use]
    pub fn open_size(&self) -> Size {
        Size::new(
            positive_or(self.open_width, notch::OPEN_WIDTH),
            positive_or(self.open_height, notch::OPEN_HEIGHT),
        )
    }
}

fn positive_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 { value } else { fallback }
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct OvernotchConfig {
    /// JSON Schema reference, ignored at runtime.
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub displays: DisplaysConfig,
    pub stats: StatsConfig,
    pub clipboard: ClipboardConfig,
    pub notch: NotchConfig,
}

// ============================================================================
// Loading
// ============================================================================

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    NotFound,
    /// The configuration file exists but could not be read.
    IoError(std::io::Error),
    /// The configuration file contains invalid JSON.
    ParseError(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(
                f,
                "No configuration file found. Expected at ~/.config/overnotch/config.jsonc, \
                ~/Library/Application Support/overnotch/config.jsonc, or ~/.overnotch.jsonc"
            ),
            Self::IoError(err) => write!(f, "Failed to read configuration file: {err}"),
            Self::ParseError(err) => write!(f, "Failed to parse configuration file: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IoError(err) => Some(err),
            Self::ParseError(err) => Some(err),
            Self::NotFound => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound
        } else {
            Self::IoError(err)
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self { Self::ParseError(err) }
}

/// Configuration file names to search for (in priority order).
const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

/// Legacy configuration file names in home directory.
const LEGACY_CONFIG_FILE_NAMES: &[&str] = &[".overnotch.jsonc", ".overnotch.json"];

const APP_DIR: &str = "overnotch";

/// Returns the possible configuration file paths in priority order.
///
/// 1. `$XDG_CONFIG_HOME/overnotch/config.{jsonc,json}` when set
/// 2. `~/.config/overnotch/config.{jsonc,json}`
/// 3. The platform config dir (`~/Library/Application Support` on macOS)
/// 4. `~/.overnotch.{jsonc,json}`
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = Vec::new();
    let mut push_dir = |dir: PathBuf| {
        for filename in CONFIG_FILE_NAMES {
            let path = dir.join(filename);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    };

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        push_dir(PathBuf::from(xdg_config).join(APP_DIR));
    }

    if let Some(home) = dirs::home_dir() {
        push_dir(home.join(".config").join(APP_DIR));
    }

    if let Some(config_dir) = dirs::config_dir() {
        push_dir(config_dir.join(APP_DIR));
    }

    if let Some(home) = dirs::home_dir() {
        for filename in LEGACY_CONFIG_FILE_NAMES {
            paths.push(home.join(filename));
        }
    }

    paths
}

/// Parses a JSONC document.
///
/// # Errors
///
/// Returns `ConfigError::ParseError` if the document is not valid JSON once
/// comments are stripped.
pub fn parse_config(source: &str) -> Result<OvernotchConfig, ConfigError> {
    let reader = json_comments::StripComments::new(source.as_bytes());
    Ok(serde_json::from_reader(reader)?)
}

/// Loads the configuration from a specific path.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file does not exist,
/// `ConfigError::IoError` if it could not be read and
/// `ConfigError::ParseError` if it contains invalid JSON.
pub fn load_config_from_path(path: &Path) -> Result<(OvernotchConfig, PathBuf), ConfigError> {
    let file = fs::File::open(path)?;
    let reader = json_comments::StripComments::new(file);
    let config: OvernotchConfig = serde_json::from_reader(reader)?;
    Ok((config, path.to_path_buf()))
}

/// Loads the configuration from the first available config file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists in any of
/// the expected locations, or any error from [`load_config_from_path`] for
/// the first file that exists.
pub fn load_config() -> Result<(OvernotchConfig, PathBuf), ConfigError> {
    config_paths()
        .into_iter()
        .find(|path| path.exists())
        .map_or(Err(ConfigError::NotFound), |path| load_config_from_path(&path))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = OvernotchConfig::default();
        assert!(!config.displays.show_on_all_displays);
        assert!(config.displays.automatically_switch_display);
        assert!(config.displays.preferred_screen.is_empty());
        assert!(!config.stats.enable_stats_feature);
        assert!(config.stats.show_cpu_graph);
        assert!(config.stats.show_memory_graph);
        assert!(!config.stats.show_gpu_graph);
        assert!(config.clipboard.enabled);
        assert_eq!(config.notch.closed_size(), Size::new(185.0, 32.0));
        assert_eq!(config.notch.open_size(), Size::new(640.0, 190.0));
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(parse_config("{}").unwrap(), OvernotchConfig::default());
    }

    #[test]
    fn test_parse_jsonc_with_comments() {
        let source = r#"{
            // Follow the external monitor
            "displays": { "preferredScreen": "LG HDR 4K", "showOnAllDisplays": false },
            /* wide stats */
            "stats": { "enableStatsFeature": true, "showDiskGraph": true },
            "notch": { "closedHeight": 38 }
        }"#;

        let config = parse_config(source).unwrap();
        assert_eq!(config.displays.preferred_screen, "LG HDR 4K");
        assert!(config.displays.automatically_switch_display);
        assert!(config.stats.enable_stats_feature);
        assert!(config.stats.show_disk_graph);
        assert!(config.stats.show_cpu_graph);
        assert!((config.notch.closed_height - 38.0).abs() < f64::EPSILON);
        assert!((config.notch.closed_width - 185.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        assert!(matches!(parse_config("{ \"displays\": "), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_non_positive_sizes_fall_back() {
        let notch = NotchConfig {
            closed_width: 0.0,
            closed_height: -4.0,
            ..NotchConfig::default()
        };
        assert_eq!(notch.closed_size(), Size::new(185.0, 32.0));
    }

    #[test]
    fn test_load_config_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{ \"clipboard\": {{ \"enabled\": false }} }} // trailing").unwrap();

        let (config, path) = load_config_from_path(file.path()).unwrap();
        assert!(!config.clipboard.enabled);
        assert_eq!(path, file.path());
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config_from_path(&dir.path().join("nope.jsonc"));
        assert!(matches!(result, Err(ConfigError::NotFound)));
    }

    #[test]
    fn test_config_paths_end_with_legacy_files() {
        let paths = config_paths();
        if dirs::home_dir().is_some() {
            let last = paths.last().unwrap();
            assert!(last.ends_with(".overnotch.json"));
        }
    }

    #[test]
    fn test_schema_uses_camel_case() {
        let schema = schemars::schema_for!(OvernotchConfig);
        let json = serde_json::to_string(&schema).unwrap();
        assert!(json.contains("showOnAllDisplays"));
        assert!(json.contains("enableStatsFeature"));
    }
}
