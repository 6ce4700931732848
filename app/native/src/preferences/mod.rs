//! Live user preferences.
//!
//! [`Preferences`] is the subset of the configuration the overlay core reads.
//! The [`PreferenceStore`] holds the current value and tells listeners which
//! keys changed whenever it is updated, for example by a config reload.

mod watcher;

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use smallvec::SmallVec;
pub use watcher::PreferenceWatcher;

use crate::config::OvernotchConfig;
use crate::geometry::Size;

/// A stats graph that can be shown on the stats tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphKind {
    Cpu,
    Memory,
    Gpu,
    Network,
    Disk,
}

impl GraphKind {
    /// All graphs, in display order.
    pub const ALL: [Self; 5] = [Self::Cpu, Self::Memory, Self::Gpu, Self::Network, Self::Disk];
}

/// Visibility of each stats graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphVisibility {
    pub cpu: bool,
    pub memory: bool,
    pub gpu: bool,
    pub network: bool,
    pub disk: bool,
}

impl GraphVisibility {
    /// Returns whether a graph is shown.
    #[must_use]
    pub const fn is_enabled(&self, kind: GraphKind) -> bool {
        match kind {
            GraphKind::Cpu => self.cpu,
            GraphKind::Memory => self.memory,
            GraphKind::Gpu => self.gpu,
            GraphKind::Network => self.network,
            GraphKind::Disk => self.disk,
        }
    }

    /// Number of graphs shown.
    #[must_use]
    pub fn enabled_count(&self) -> usize {
        GraphKind::ALL.iter().filter(|kind| self.is_enabled(**kind)).count()
    }
}

/// Preferences read by the overlay core.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preferences {
    pub show_on_all_displays: bool,
    pub automatically_switch_display: bool,
    /// Name of the display to prefer in single-window mode. Empty for none.
    pub preferred_screen: String,
    pub stats_enabled: bool,
    pub graphs: GraphVisibility,
    pub clipboard_enabled: bool,
    pub closed_size: Size,
    pub open_size: Size,
}

impl Default for Preferences {
    fn default() -> Self { Self::from(&OvernotchConfig::default()) }
}

impl From<&OvernotchConfig> for Preferences {
    fn from(config: &OvernotchConfig) -> Self {
        Self {
            show_on_all_displays: config.displays.show_on_all_displays,
            automatically_switch_display: config.displays.automatically_switch_display,
            preferred_screen: config.displays.preferred_screen.clone(),
            stats_enabled: config.stats.enable_stats_feature,
            graphs: GraphVisibility {
                cpu: config.stats.show_cpu_graph,
                memory: config.stats.show_memory_graph,
                gpu: config.stats.show_gpu_graph,
                network: config.stats.show_network_graph,
                disk: config.stats.show_disk_graph,
            },
            clipboard_enabled: config.clipboard.enabled,
            closed_size: config.notch.closed_size(),
            open_size: config.notch.open_size(),
        }
    }
}

impl Preferences {
    /// Number of stats graphs shown.
    #[must_use]
    pub fn enabled_graph_count(&self) -> usize { self.graphs.enabled_count() }

    /// The preferred display name, if one is set.
    #[must_use]
    pub fn preferred_screen(&self) -> Option<&str> {
        let name = self.preferred_screen.trim();
        (!name.is_empty()).then_some(name)
    }

    /// Lists the keys whose value differs between `self` and `other`.
    #[must_use]
    pub fn changed_keys(&self, other: &Self) -> SmallVec<[PreferenceKey; 8]> {
        let mut keys = SmallVec::new();

        if self.show_on_all_displays != other.show_on_all_displays {
            keys.push(PreferenceKey::ShowOnAllDisplays);
        }
        if self.automatically_switch_display != other.automatically_switch_display {
            keys.push(PreferenceKey::AutomaticallySwitchDisplay);
        }
        if self.preferred_screen != other.preferred_screen {
            keys.push(PreferenceKey::PreferredScreen);
        }
        if self.stats_enabled != other.stats_enabled {
            keys.push(PreferenceKey::StatsEnabled);
        }
        for kind in GraphKind::ALL {
            if self.graphs.is_enabled(kind) != other.graphs.is_enabled(kind) {
                keys.push(PreferenceKey::Graph(kind));
            }
        }
        if self.clipboard_enabled != other.clipboard_enabled {
            keys.push(PreferenceKey::ClipboardEnabled);
        }
        if self.closed_size != other.closed_size || self.open_size != other.open_size {
            keys.push(PreferenceKey::NotchSize);
        }

        keys
    }
}

/// Identifies a preference that can change at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceKey {
    ShowOnAllDisplays,
    AutomaticallySwitchDisplay,
    PreferredScreen,
    StatsEnabled,
    Graph(GraphKind),
    ClipboardEnabled,
    /// Any of the closed or open notch dimensions.
    NotchSize,
}

// ============================================================================
// Store
// ============================================================================

type Listener = Arc<dyn Fn(PreferenceKey, &Preferences) + Send + Sync>;

/// Thread-safe holder of the current preferences.
#[derive(Default)]
pub struct PreferenceStore {
    current: RwLock<Preferences>,
    listeners: RwLock<Vec<Listener>>,
}

impl PreferenceStore {
    #[must_use]
    pub fn new(preferences: Preferences) -> Self {
        Self {
            current: RwLock::new(preferences),
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Returns a copy of the current preferences.
    #[must_use]
    pub fn get(&self) -> Preferences { self.current.read().clone() }

    /// Registers a listener called once per changed key.
    pub fn subscribe<F>(&self, listener: F)
    where F: Fn(PreferenceKey, &Preferences) + Send + Sync + 'static {
        self.listeners.write().push(Arc::new(listener));
    }

    /// Replaces all preferences and notifies listeners of the changed keys.
    pub fn replace(&self, preferences: Preferences) -> SmallVec<[PreferenceKey; 8]> {
        self.update(|current| *current = preferences)
    }

    /// Mutates the preferences in place and notifies listeners of the
    /// changed keys.
    ///
    /// Listeners run after the write lock is released.
    pub fn update<F>(&self, mutate: F) -> SmallVec<[PreferenceKey; 8]>
    where F: FnOnce(&mut Preferences) {
        let (keys, snapshot) = {
            let mut current = self.current.write();
            let previous = current.clone();
            mutate(&mut current);
            (previous.changed_keys(&current), current.clone())
        };

        if !keys.is_empty() {
            tracing::debug!(?keys, "overnotch: preferences: changed");
            let listeners: Vec<Listener> = self.listeners.read().iter().map(Arc::clone).collect();
            for key in &keys {
                for listener in &listeners {
                    listener(*key, &snapshot);
                }
            }
        }

        keys
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;

    #[test]
    fn test_defaults_match_config_defaults() {
        let prefs = Preferences::default();
        assert!(!prefs.show_on_all_displays);
        assert!(prefs.automatically_switch_display);
        assert!(prefs.preferred_screen().is_none());
        assert!(!prefs.stats_enabled);
        assert_eq!(prefs.enabled_graph_count(), 2);
        assert!(prefs.clipboard_enabled);
        assert_eq!(prefs.closed_size, Size::new(185.0, 32.0));
    }

    #[test]
    fn test_preferred_screen_ignores_blank() {
        let prefs = Preferences {
            preferred_screen: "   ".to_string(),
            ..Preferences::default()
        };
        assert!(prefs.preferred_screen().is_none());
    }

    #[test]
    fn test_changed_keys() {
        let before = Preferences::default();
        let mut after = before.clone();
        after.show_on_all_displays = true;
        after.graphs.gpu = true;
        after.closed_size.height = 38.0;

        let keys = before.changed_keys(&after);
        assert_eq!(keys.as_slice(), &[
            PreferenceKey::ShowOnAllDisplays,
            PreferenceKey::Graph(GraphKind::Gpu),
            PreferenceKey::NotchSize,
        ]);
        assert!(before.changed_keys(&before).is_empty());
    }

    #[test]
    fn test_update_notifies_listeners_per_key() {
        let store = PreferenceStore::new(Preferences::default());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        store.subscribe(move |key, prefs| sink.lock().push((key, prefs.stats_enabled)));

        store.update(|p| {
            p.stats_enabled = true;
            p.clipboard_enabled = false;
        });

        assert_eq!(*seen.lock(), vec![
            (PreferenceKey::StatsEnabled, true),
            (PreferenceKey::ClipboardEnabled, true),
        ]);
    }

    #[test]
    fn test_unchanged_update_is_silent() {
        let store = PreferenceStore::new(Preferences::default());
        let calls = Arc::new(Mutex::new(0));

        let sink = Arc::clone(&calls);
        store.subscribe(move |_, _| *sink.lock() += 1);

        assert!(store.replace(Preferences::default()).is_empty());
        assert_eq!(*calls.lock(), 0);
    }

    #[test]
    fn test_listener_can_read_store() {
        let store = Arc::new(PreferenceStore::new(Preferences::default()));
        let observed = Arc::new(Mutex::new(None));

        let inner = Arc::clone(&store);
        let sink = Arc::clone(&observed);
        store.subscribe(move |_, _| *sink.lock() = Some(inner.get().show_on_all_displays));

        store.update(|p| p.show_on_all_displays = true);
        assert_eq!(*observed.lock(), Some(true));
    }
}
