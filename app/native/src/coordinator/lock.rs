//! Screen lock handling.
//!
//! Windows are torn down on lock and rebuilt, closed, once the unlock has
//! settled. Reconciles requested in between are ignored.

use super::WindowCoordinator;
use crate::constants::timing;
use crate::scheduler::{ScheduledTask, TaskId};
use crate::toggle::take_if_current;

impl WindowCoordinator {
    /// Destroys every window and blocks reconciles until unlocked.
    pub fn screen_locked(&mut self) {
        if let Some(token) = self.unlock_settle.take() {
            token.cancel();
        }
        self.locked = true;
        self.teardown();
        tracing::info!("overnotch: coordinator: screen locked, windows torn down");
    }

    /// Schedules the rebuild after the unlock settle delay.
    ///
    /// An unlock that does not follow a lock is dropped, so duplicate or
    /// reordered notifications never reset live views.
    pub fn screen_unlocked(&mut self) {
        if !self.locked {
            tracing::debug!("overnotch: coordinator: unlock without lock, ignoring");
            return;
        }
        if let Some(token) = self.unlock_settle.replace(
            self.scheduler.schedule(timing::UNLOCK_SETTLE_DELAY, ScheduledTask::UnlockSettled),
        ) {
            token.cancel();
        }
    }

    pub(super) fn unlock_settled(&mut self, id: TaskId) {
        if take_if_current(&mut self.unlock_settle, id).is_none() {
            return;
        }
        self.locked = false;
        self.views.primary.reset();
        tracing::info!("overnotch: coordinator: unlock settled, rebuilding windows");
        self.reconcile();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::coordinator::tests::{Harness, all_displays, display};
    use crate::preferences::Preferences;
    use crate::state::NotchState;
    use crate::toggle::InputEvent;

    #[test]
    fn test_lock_tears_down_and_unlock_rebuilds_closed() {
        let mut harness = Harness::new(vec![display("A", 0.0, 1), display("B", 1920.0, 2)], all_displays());
        harness.coordinator.start();
        harness.pointer_at(100.0, 100.0);
        harness.coordinator.handle_input(InputEvent::ToggleNotchOpen);

        harness.coordinator.screen_locked();
        assert_eq!(harness.backend.live_count(), 0);
        assert_eq!(harness.clock.pending_count(), 0);
        assert!(harness.coordinator.is_locked());

        harness.coordinator.screen_unlocked();
        harness.advance(Duration::from_millis(499));
        assert_eq!(harness.backend.live_count(), 0);

        harness.advance(Duration::from_millis(1));
        assert_eq!(harness.backend.live_count(), 2);
        assert!(!harness.coordinator.is_locked());
        assert!(harness.coordinator.overlays().iter().all(|o| o.state == NotchState::Closed));
    }

    #[test]
    fn test_reconcile_ignored_while_locked() {
        let mut harness = Harness::new(vec![display("A", 0.0, 1)], all_displays());
        harness.coordinator.start();
        harness.coordinator.screen_locked();

        harness.displays.connect(display("B", 1920.0, 2));
        harness.coordinator.reconcile();
        harness.coordinator.handle_input(InputEvent::ToggleNotchOpen);

        assert_eq!(harness.backend.live_count(), 0);
        assert_eq!(harness.clock.pending_count(), 0);
    }

    #[test]
    fn test_relock_during_settle_cancels_rebuild() {
        let mut harness = Harness::new(vec![display("A", 0.0, 1)], all_displays());
        harness.coordinator.start();

        harness.coordinator.screen_locked();
        harness.coordinator.screen_unlocked();
        harness.advance(Duration::from_millis(200));
        harness.coordinator.screen_locked();
        harness.advance(Duration::from_secs(1));

        assert_eq!(harness.backend.live_count(), 0);
        assert!(harness.coordinator.is_locked());
    }

    #[test]
    fn test_repeated_unlock_settles_once() {
        let mut harness = Harness::new(vec![display("A", 0.0, 1)], all_displays());
        harness.coordinator.start();
        harness.coordinator.screen_locked();

        harness.coordinator.screen_unlocked();
        harness.advance(Duration::from_millis(300));
        harness.coordinator.screen_unlocked();
        assert_eq!(harness.clock.pending_count(), 1);

        harness.advance(Duration::from_millis(300));
        assert_eq!(harness.backend.live_count(), 0);

        harness.advance(Duration::from_millis(200));
        assert_eq!(harness.backend.live_count(), 1);
    }

    #[test]
    fn test_unlock_without_lock_keeps_open_view() {
        let mut harness = Harness::new(vec![display("A", 0.0, 1)], Preferences::default());
        harness.coordinator.start();
        harness.coordinator.handle_input(InputEvent::ToggleNotchOpen);
        let window = harness.backend.live_handles();

        harness.coordinator.screen_unlocked();
        assert_eq!(harness.clock.pending_count(), 1);
        harness.advance(Duration::from_millis(500));

        assert_eq!(harness.coordinator.primary().state, NotchState::Open);
        assert_eq!(harness.backend.live_handles(), window);
        assert_eq!(harness.clock.pending_count(), 1);
    }
}
