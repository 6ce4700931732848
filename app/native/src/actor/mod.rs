//! Notch actor.
//!
//! The actor owns the [`WindowCoordinator`] and processes messages one at a
//! time, so display changes, preference changes, input and timer fires can
//! come from any thread without the coordinator ever being re-entered.
//!
//! # Panic Recovery
//!
//! A panicking handler is caught and logged and the actor keeps serving
//! messages. Windows may be out of step until the next reconcile.

mod handle;
mod messages;

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

pub use handle::{ActorError, Mailbox, NotchActorHandle, channel};
pub use messages::NotchMessage;

use crate::coordinator::WindowCoordinator;
use crate::events::{EventBus, NotchEvent, SubscriptionId};

/// The actor that owns the window coordinator.
pub struct NotchActor {
    coordinator: WindowCoordinator,
    mailbox: Mailbox,
}

impl NotchActor {
    /// Wraps a coordinator and the mailbox it will serve.
    #[must_use]
    pub const fn new(coordinator: WindowCoordinator, mailbox: Mailbox) -> Self {
        Self { coordinator, mailbox }
    }

    /// Runs the message loop until shutdown or until every handle is gone.
    ///
    /// Starts the coordinator first and shuts it down on exit.
    pub async fn run(mut self) {
        tracing::debug!("overnotch: actor: message loop starting");
        self.coordinator.start();

        while let Some(msg) = self.mailbox.recv().await {
            if matches!(msg, NotchMessage::Shutdown) {
                tracing::debug!("overnotch: actor: received shutdown");
                break;
            }

            let msg_name = msg.name();
            let result = catch_unwind(AssertUnwindSafe(|| {
                self.handle_message(msg);
            }));

            if let Err(panic_info) = result {
                let panic_msg = panic_info
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic_info.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());

                tracing::error!(
                    message = msg_name,
                    panic = %panic_msg,
                    "overnotch: actor: handler panicked, continuing"
                );
            }
        }

        self.coordinator.shutdown();
        tracing::debug!("overnotch: actor: message loop exited");
    }

    fn handle_message(&mut self, msg: NotchMessage) {
        tracing::trace!(message = msg.name(), "overnotch: actor: handling");

        match msg {
            NotchMessage::Reconcile => {
                self.mailbox.reconcile_started();
                self.coordinator.reconcile();
            }
            NotchMessage::ResizeAll => self.coordinator.resize_all(),
            NotchMessage::Input(event) => self.coordinator.handle_input(event),
            NotchMessage::ScreenLocked => self.coordinator.screen_locked(),
            NotchMessage::ScreenUnlocked => self.coordinator.screen_unlocked(),
            NotchMessage::TaskFired { id, task } => self.coordinator.task_fired(id, task),
            NotchMessage::Query { query, respond_to } => {
                if respond_to.send(self.coordinator.query(query)).is_err() {
                    tracing::debug!("overnotch: actor: query caller went away");
                }
            }
            NotchMessage::Shutdown => {}
        }
    }
}

/// Forwards bus events the coordinator reacts to into its mailbox.
///
/// Topology and selection changes request a (coalesced) reconcile, height
/// changes resize in place and lock changes are passed through.
pub fn bridge(bus: &EventBus, handle: NotchActorHandle) -> SubscriptionId {
    bus.subscribe(move |event| {
        let sent = match event {
            NotchEvent::ShowOnAllDisplaysChanged { .. }
            | NotchEvent::AutomaticallySwitchDisplayChanged { .. }
            | NotchEvent::SelectedScreenChanged { .. }
            | NotchEvent::DisplayConfigurationChanged => {
                handle.request_reconcile();
                Ok(())
            }
            NotchEvent::NotchHeightChanged { .. } => handle.resize_all(),
            NotchEvent::ScreenLocked => handle.screen_locked(),
            NotchEvent::ScreenUnlocked => handle.screen_unlocked(),
            NotchEvent::NotchStateChanged { .. } => Ok(()),
        };

        if let Err(err) = sent {
            tracing::warn!(event = event.name(), error = %err, "overnotch: actor: failed to forward event");
        }
    })
}

/// Keeps the bus alive alongside the bridge subscription.
pub struct Bridge {
    bus: Arc<EventBus>,
    subscription: SubscriptionId,
}

impl Bridge {
    /// Subscribes `handle` to `bus`.
    #[must_use]
    pub fn attach(bus: Arc<EventBus>, handle: NotchActorHandle) -> Self {
        let subscription = bridge(&bus, handle);
        Self { bus, subscription }
    }
}

impl Drop for Bridge {
    fn drop(&mut self) { self.bus.unsubscribe(self.subscription); }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::coordinator::Collaborators;
    use crate::display::{DisplayId, DisplayIdentity, DisplayRegistry, DisplaySource, VirtualDisplays};
    use crate::geometry::Rect;
    use crate::preferences::{PreferenceStore, Preferences};
    use crate::scheduler::TokioScheduler;
    use crate::services::Services;
    use crate::state::NotchState;
    use crate::toggle::InputEvent;
    use crate::window::{PlaceholderContent, RecordingBackend};

    struct Running {
        handle: NotchActorHandle,
        backend: RecordingBackend,
        displays: Arc<VirtualDisplays>,
        bus: Arc<EventBus>,
        _bridge: Bridge,
        task: tokio::task::JoinHandle<()>,
    }

    fn display(name: &str, x: f64, id: u32) -> DisplayIdentity {
        DisplayIdentity::new(name, Rect::new(x, 0.0, 1920.0, 1080.0), DisplayId(id))
    }

    fn spawn(displays: Vec<DisplayIdentity>, preferences: Preferences) -> Running {
        let (handle, mailbox) = channel();
        let displays = Arc::new(VirtualDisplays::new(displays));
        let backend = RecordingBackend::new();
        let bus = Arc::new(EventBus::new());

        let coordinator = WindowCoordinator::new(Collaborators {
            registry: DisplayRegistry::new(Arc::clone(&displays) as Arc<dyn DisplaySource>),
            backend: Box::new(backend.clone()),
            content: Box::new(PlaceholderContent),
            scheduler: Box::new(TokioScheduler::new(
                tokio::runtime::Handle::current(),
                handle.task_sink(),
            )),
            preferences: Arc::new(PreferenceStore::new(preferences)),
            bus: Arc::clone(&bus),
            services: Services::new(),
        });

        let bridge = Bridge::attach(Arc::clone(&bus), handle.clone());
        let task = tokio::spawn(NotchActor::new(coordinator, mailbox).run());

        Running { handle, backend, displays, bus, _bridge: bridge, task }
    }

    #[tokio::test]
    async fn test_actor_starts_coordinator() {
        let running = spawn(vec![display("A", 0.0, 1)], Preferences::default());

        let overlays = running.handle.overlays().await.unwrap();
        assert_eq!(overlays.len(), 1);
        assert_eq!(overlays[0].display.as_deref(), Some("A"));
        assert_eq!(running.backend.live_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_close_fires_through_mailbox() {
        let running = spawn(vec![display("A", 0.0, 1)], Preferences::default());

        running.handle.input(InputEvent::ToggleNotchOpen).unwrap();
        assert_eq!(running.handle.primary().await.unwrap().state, NotchState::Open);

        tokio::time::sleep(Duration::from_millis(2900)).await;
        assert_eq!(running.handle.primary().await.unwrap().state, NotchState::Open);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(running.handle.primary().await.unwrap().state, NotchState::Closed);
    }

    #[tokio::test]
    async fn test_bus_display_change_reconciles() {
        let running = spawn(
            vec![display("A", 0.0, 1)],
            Preferences { show_on_all_displays: true, ..Preferences::default() },
        );
        running.handle.stats().await.unwrap();

        running.displays.connect(display("B", 1920.0, 2));
        running.bus.publish(&NotchEvent::DisplayConfigurationChanged);

        let overlays = running.handle.overlays().await.unwrap();
        assert_eq!(overlays.len(), 2);
    }

    #[tokio::test]
    async fn test_bus_lock_tears_down() {
        let running = spawn(vec![display("A", 0.0, 1)], Preferences::default());
        running.handle.stats().await.unwrap();

        running.bus.publish(&NotchEvent::ScreenLocked);

        let stats = running.handle.stats().await.unwrap();
        assert!(stats.locked);
        assert_eq!(stats.live_windows, 0);
        assert_eq!(running.backend.live_count(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_destroys_windows_and_stops() {
        let running = spawn(vec![display("A", 0.0, 1), display("B", 1920.0, 2)], Preferences {
            show_on_all_displays: true,
            ..Preferences::default()
        });
        running.handle.stats().await.unwrap();

        running.handle.shutdown().await.unwrap();
        running.task.await.unwrap();

        assert_eq!(running.backend.live_count(), 0);
        assert!(!running.handle.is_alive());
    }

    #[test]
    fn test_bridge_unsubscribes_on_drop() {
        let bus = Arc::new(EventBus::new());
        let (handle, _mailbox) = channel();

        let bridge = Bridge::attach(Arc::clone(&bus), handle);
        assert_eq!(bus.subscriber_count(), 1);

        drop(bridge);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_bridge_routes_events() {
        let bus = EventBus::new();
        let (handle, mut mailbox) = channel();
        bridge(&bus, handle);

        bus.publish(&NotchEvent::DisplayConfigurationChanged);
        bus.publish(&NotchEvent::SelectedScreenChanged { name: None });
        bus.publish(&NotchEvent::NotchHeightChanged { height: 38.0 });
        bus.publish(&NotchEvent::ScreenUnlocked);
        bus.publish(&NotchEvent::NotchStateChanged { display: None, state: NotchState::Open });

        // Session messages jump the queue
        assert!(matches!(mailbox.try_recv(), Some(NotchMessage::ScreenUnlocked)));
        assert!(matches!(mailbox.try_recv(), Some(NotchMessage::Reconcile)));
        assert!(matches!(mailbox.try_recv(), Some(NotchMessage::ResizeAll)));
        assert!(mailbox.try_recv().is_none());
    }
}
