//! Routes preference changes to the coordinator.
//!
//! Topology-affecting preferences are announced on the event bus, where the
//! coordinator's own subscription turns them into a reconcile. Graph
//! toggles only need a resize pass and go straight to the coordinator's
//! mailbox. Either way the work lands on the coordinator's execution
//! context, whatever thread the change came from.

use std::sync::Arc;

use super::{PreferenceKey, PreferenceStore, Preferences};
use crate::actor::NotchActorHandle;
use crate::events::{EventBus, NotchEvent};

/// Subscribes to a [`PreferenceStore`] and redispatches its changes.
pub struct PreferenceWatcher {
    bus: Arc<EventBus>,
    coordinator: NotchActorHandle,
}

impl PreferenceWatcher {
    /// Attaches a watcher to `store`. The subscription lives as long as the
    /// store.
    pub fn attach(store: &PreferenceStore, bus: Arc<EventBus>, coordinator: NotchActorHandle) {
        let watcher = Self { bus, coordinator };
        store.subscribe(move |key, preferences| watcher.on_change(key, preferences));
    }

    fn on_change(&self, key: PreferenceKey, preferences: &Preferences) {
        tracing::debug!(?key, "overnotch: preferences: routing change");

        match key {
            PreferenceKey::ShowOnAllDisplays => {
                self.bus.publish(&NotchEvent::ShowOnAllDisplaysChanged {
                    enabled: preferences.show_on_all_displays,
                });
            }
            PreferenceKey::AutomaticallySwitchDisplay => {
                self.bus.publish(&NotchEvent::AutomaticallySwitchDisplayChanged {
                    enabled: preferences.automatically_switch_display,
                });
            }
            PreferenceKey::PreferredScreen => {
                self.bus.publish(&NotchEvent::SelectedScreenChanged {
                    name: preferences.preferred_screen().map(str::to_string),
                });
            }
            PreferenceKey::NotchSize => {
                self.bus.publish(&NotchEvent::NotchHeightChanged {
                    height: preferences.closed_size.height,
                });
            }
            PreferenceKey::StatsEnabled => self.coordinator.request_reconcile(),
            PreferenceKey::Graph(_) => {
                if let Err(err) = self.coordinator.resize_all() {
                    tracing::warn!(error = %err, "overnotch: preferences: failed to request resize");
                }
            }
            // Read on demand when a clipboard request arrives
            PreferenceKey::ClipboardEnabled => {}
        }
    }
}
