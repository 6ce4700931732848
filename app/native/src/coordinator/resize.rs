//! Applying view changes to windows.

use super::{Surfaces, WindowCoordinator, frame_for};
use crate::constants::timing;
use crate::events::{EventBus, NotchEvent};
use crate::preferences::Preferences;
use crate::state::ViewState;
use crate::toggle::ToggleOutcome;
use crate::window::{OverlayWindow, Transition};

/// Turns a toggle outcome into an animated resize, a content refresh and,
/// for open/close, a state change notification.
pub(super) fn apply_outcome(
    surfaces: &mut Surfaces,
    bus: &EventBus,
    view: &ViewState,
    window: Option<&mut OverlayWindow>,
    outcome: ToggleOutcome,
    preferences: &Preferences,
) {
    if outcome == ToggleOutcome::Unchanged {
        return;
    }

    if let Some(window) = window {
        // Mid-move windows are placed by the fade-in.
        if view.pending_fade.is_none()
            && let Some(display) = window.assigned_display.clone()
        {
            let frame = frame_for(view, &display, preferences);
            surfaces.place(window, frame, Transition::Animated(timing::RESIZE_ANIMATION));
        }
        surfaces.render(view, window);
    }

    if outcome == ToggleOutcome::StateChanged {
        bus.publish(&NotchEvent::NotchStateChanged {
            display: view.owner_display.as_ref().map(|d| d.name.clone()),
            state: view.notch_state,
        });
    }
}

impl WindowCoordinator {
    /// Re-applies notch sizes from preferences to every window.
    pub fn resize_all(&mut self) {
        if self.locked {
            return;
        }
        let preferences = self.preferences.get();

        let overlays = self.views.overlays.values_mut().map(|o| (&mut o.view, Some(&mut o.window)));
        let primary = std::iter::once((&mut self.views.primary, self.views.primary_window.as_mut()));

        let mut resized = 0_usize;
        for (view, window) in overlays.chain(primary) {
            view.closed_size = preferences.closed_size;
            view.open_size = preferences.open_size;

            let Some(window) = window else { continue };
            let Some(display) = window.assigned_display.clone() else { continue };
            if view.pending_fade.is_some() {
                continue;
            }

            let frame = frame_for(view, &display, &preferences);
            if self.surfaces.place(window, frame, Transition::Animated(timing::RESIZE_ANIMATION)) {
                self.surfaces.render(view, window);
                resized += 1;
            }
        }

        tracing::debug!(resized, "overnotch: coordinator: resized windows");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::coordinator::tests::{Harness, all_displays, display};
    use crate::geometry::Size;
    use crate::preferences::Preferences;
    use crate::state::SneakPeekKind;
    use crate::toggle::InputEvent;

    #[test]
    fn test_resize_all_applies_new_closed_size() {
        let mut harness = Harness::new(vec![display("A", 0.0, 1), display("B", 1920.0, 2)], all_displays());
        harness.coordinator.start();

        harness.preferences.update(|p| p.closed_size = Size::new(200.0, 38.0));
        harness.coordinator.resize_all();

        for (_, window) in harness.backend.windows() {
            assert!((window.frame.width - 200.0).abs() < f64::EPSILON);
            assert!((window.frame.height - 38.0).abs() < f64::EPSILON);
            assert!((window.frame.max_y() - 1080.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_resize_all_is_idempotent() {
        let mut harness = Harness::new(vec![display("A", 0.0, 1)], Preferences::default());
        harness.coordinator.start();
        harness.backend.clear_ops();

        harness.coordinator.resize_all();

        assert_eq!(harness.backend.frame_set_count(), 0);
    }

    #[test]
    fn test_content_change_rerenders_without_publishing() {
        let mut harness = Harness::new(vec![display("A", 0.0, 1)], Preferences::default());
        harness.coordinator.start();
        let published = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&published);
        harness.bus.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        harness.coordinator.handle_input(InputEvent::ToggleSneakPeek {
            kind: SneakPeekKind::Volume,
            duration: None,
        });

        let handle = harness.backend.live_handles()[0];
        let window = harness.backend.window(handle).unwrap();
        assert_eq!(window.content.sneak_peek, Some(SneakPeekKind::Volume));
        assert_eq!(published.load(Ordering::SeqCst), 0);
    }
}
