//! In-process event bus.
//!
//! Topology, lock-state and preference changes travel over a typed
//! [`EventBus`]. The coordinator both publishes to it (state changes for
//! content renderers) and subscribes to it (reconcile triggers).
//!
//! ## Naming Convention
//!
//! Every event has a stable name of the form `overnotch://<module>/<event-name>`:
//!
//! - `overnotch://` - Prefix identifying this as an Overnotch event
//! - `<module>` - The area that owns the event (e.g., `display`, `notch`)
//! - `<event-name>` - Descriptive kebab-case name for the event

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::Serialize;

use crate::state::NotchState;

/// Display topology events.
pub mod display {
    /// The display the single overlay is bound to changed.
    ///
    /// Payload: `Option<String>` - the selected display name.
    pub const SELECTED_SCREEN_CHANGED: &str = "overnotch://display/selected-screen-changed";

    /// Displays were attached, removed or reconfigured.
    pub const CONFIGURATION_CHANGED: &str = "overnotch://display/configuration-changed";
}

/// Preference events.
pub mod preferences {
    /// Notch size preferences changed.
    ///
    /// Payload: `f64` - the closed notch height.
    pub const NOTCH_HEIGHT_CHANGED: &str = "overnotch://preferences/notch-height-changed";

    /// Payload: `bool`.
    pub const SHOW_ON_ALL_DISPLAYS_CHANGED: &str =
        "overnotch://preferences/show-on-all-displays-changed";

    /// Payload: `bool`.
    pub const AUTOMATICALLY_SWITCH_DISPLAY_CHANGED: &str =
        "overnotch://preferences/automatically-switch-display-changed";
}

/// Session lock events.
pub mod session {
    pub const SCREEN_LOCKED: &str = "overnotch://session/screen-locked";
    pub const SCREEN_UNLOCKED: &str = "overnotch://session/screen-unlocked";
}

/// Notch state events, consumed by content renderers.
pub mod notch {
    /// A notch opened or closed.
    ///
    /// Payload: `{ display: Option<String>, state: "open" | "closed" }`
    pub const STATE_CHANGED: &str = "overnotch://notch/state-changed";
}

// ============================================================================
// Events
// ============================================================================

/// Events carried by the bus.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum NotchEvent {
    SelectedScreenChanged { name: Option<String> },
    NotchHeightChanged { height: f64 },
    ShowOnAllDisplaysChanged { enabled: bool },
    AutomaticallySwitchDisplayChanged { enabled: bool },
    DisplayConfigurationChanged,
    ScreenLocked,
    ScreenUnlocked,
    NotchStateChanged { display: Option<String>, state: NotchState },
}

impl NotchEvent {
    /// Returns the stable event name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SelectedScreenChanged { .. } => display::SELECTED_SCREEN_CHANGED,
            Self::DisplayConfigurationChanged => display::CONFIGURATION_CHANGED,
            Self::NotchHeightChanged { .. } => preferences::NOTCH_HEIGHT_CHANGED,
            Self::ShowOnAllDisplaysChanged { .. } => preferences::SHOW_ON_ALL_DISPLAYS_CHANGED,
            Self::AutomaticallySwitchDisplayChanged { .. } => {
                preferences::AUTOMATICALLY_SWITCH_DISPLAY_CHANGED
            }
            Self::ScreenLocked => session::SCREEN_LOCKED,
            Self::ScreenUnlocked => session::SCREEN_UNLOCKED,
            Self::NotchStateChanged { .. } => notch::STATE_CHANGED,
        }
    }
}

// ============================================================================
// Bus
// ============================================================================

/// Identifies a subscription for [`EventBus::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Arc<dyn Fn(&NotchEvent) + Send + Sync>;

/// Typed publish/subscribe bus with an explicit subscriber list.
///
/// Delivery is synchronous, on the publishing thread, in subscription order.
/// Subscribers that need a particular execution context redispatch
/// themselves.
#[derive(Default)]
pub struct EventBus {
    subscribers: RwLock<Vec<(SubscriptionId, Subscriber)>>,
    next_id: AtomicU64,
}

impl EventBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Registers a subscriber for every event.
    pub fn subscribe<F>(&self, subscriber: F) -> SubscriptionId
    where F: Fn(&NotchEvent) + Send + Sync + 'static {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.write().push((id, Arc::new(subscriber)));
        id
    }

    /// Removes a subscriber. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize { self.subscribers.read().len() }

    /// Delivers an event to every subscriber.
    ///
    /// The subscriber list is snapshotted first, so subscribers may publish
    /// or (un)subscribe without deadlocking.
    pub fn publish(&self, event: &NotchEvent) {
        let subscribers: Vec<Subscriber> =
            self.subscribers.read().iter().map(|(_, s)| Arc::clone(s)).collect();

        tracing::trace!(event = event.name(), subscribers = subscribers.len(), "overnotch: bus: publish");
        for subscriber in subscribers {
            subscriber(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;

    fn all_events() -> Vec<NotchEvent> {
        vec![
            NotchEvent::SelectedScreenChanged { name: None },
            NotchEvent::NotchHeightChanged { height: 32.0 },
            NotchEvent::ShowOnAllDisplaysChanged { enabled: true },
            NotchEvent::AutomaticallySwitchDisplayChanged { enabled: true },
            NotchEvent::DisplayConfigurationChanged,
            NotchEvent::ScreenLocked,
            NotchEvent::ScreenUnlocked,
            NotchEvent::NotchStateChanged { display: None, state: NotchState::Open },
        ]
    }

    #[test]
    fn test_all_events_have_overnotch_prefix() {
        for event in all_events() {
            let name = event.name();
            assert!(
                name.starts_with("overnotch://"),
                "Event '{name}' should start with 'overnotch://'"
            );
        }
    }

    #[test]
    fn test_event_naming_convention() {
        let events = [
            (display::SELECTED_SCREEN_CHANGED, "display", "selected-screen-changed"),
            (display::CONFIGURATION_CHANGED, "display", "configuration-changed"),
            (preferences::NOTCH_HEIGHT_CHANGED, "preferences", "notch-height-changed"),
            (session::SCREEN_LOCKED, "session", "screen-locked"),
            (notch::STATE_CHANGED, "notch", "state-changed"),
        ];

        for (event, module, name) in events {
            let expected = format!("overnotch://{module}/{name}");
            assert_eq!(event, expected, "Event name mismatch");
        }
    }

    #[test]
    fn test_event_names_are_unique() {
        let mut names: Vec<_> = all_events().iter().map(NotchEvent::name).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_publish_reaches_all_subscribers_in_order() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let log = Arc::clone(&log);
            bus.subscribe(move |event| log.lock().push((tag, event.name())));
        }

        bus.publish(&NotchEvent::ScreenLocked);

        assert_eq!(
            *log.lock(),
            vec![("first", session::SCREEN_LOCKED), ("second", session::SCREEN_LOCKED)]
        );
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicU64::new(0));

        let counter = Arc::clone(&count);
        let id = bus.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish(&NotchEvent::DisplayConfigurationChanged);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&NotchEvent::DisplayConfigurationChanged);

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_subscriber_may_publish_reentrantly() {
        let bus = Arc::new(EventBus::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let inner_bus = Arc::clone(&bus);
        let inner_seen = Arc::clone(&seen);
        bus.subscribe(move |event| {
            inner_seen.lock().push(event.clone());
            if *event == NotchEvent::ScreenUnlocked {
                inner_bus.publish(&NotchEvent::DisplayConfigurationChanged);
            }
        });

        bus.publish(&NotchEvent::ScreenUnlocked);
        assert_eq!(
            *seen.lock(),
            vec![NotchEvent::ScreenUnlocked, NotchEvent::DisplayConfigurationChanged]
        );
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let json = serde_json::to_value(NotchEvent::ShowOnAllDisplaysChanged { enabled: true }).unwrap();
        assert_eq!(json["event"], "showOnAllDisplaysChanged");
        assert_eq!(json["enabled"], true);
    }
}
