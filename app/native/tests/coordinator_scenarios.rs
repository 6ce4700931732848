//! Scenario tests for the window coordinator.
//!
//! Everything runs headless: displays come from [`VirtualDisplays`], windows
//! from [`RecordingBackend`], and timers from a [`ManualScheduler`] whose
//! virtual clock is advanced explicitly.

use std::sync::Arc;
use std::time::Duration;

use overnotch_lib::coordinator::{Collaborators, WindowCoordinator};
use overnotch_lib::display::{DisplayId, DisplayIdentity, DisplayRegistry, DisplaySource, VirtualDisplays};
use overnotch_lib::events::EventBus;
use overnotch_lib::geometry::{Point, Rect};
use overnotch_lib::preferences::{PreferenceStore, Preferences};
use overnotch_lib::scheduler::ManualScheduler;
use overnotch_lib::services::Services;
use overnotch_lib::state::NotchState;
use overnotch_lib::toggle::InputEvent;
use overnotch_lib::window::{PlaceholderContent, RecordingBackend, Transition, WindowOp};

// ============================================================================
// Harness
// ============================================================================

struct Scenario {
    coordinator: WindowCoordinator,
    displays: Arc<VirtualDisplays>,
    backend: RecordingBackend,
    clock: ManualScheduler,
    preferences: Arc<PreferenceStore>,
}

impl Scenario {
    fn new(displays: Vec<DisplayIdentity>, preferences: Preferences) -> Self {
        let displays = Arc::new(VirtualDisplays::new(displays));
        let backend = RecordingBackend::new();
        let clock = ManualScheduler::new();
        let preferences = Arc::new(PreferenceStore::new(preferences));

        let coordinator = WindowCoordinator::new(Collaborators {
            registry: DisplayRegistry::new(Arc::clone(&displays) as Arc<dyn DisplaySource>),
            backend: Box::new(backend.clone()),
            content: Box::new(PlaceholderContent),
            scheduler: Box::new(clock.clone()),
            preferences: Arc::clone(&preferences),
            bus: Arc::new(EventBus::new()),
            services: Services::new(),
        });

        Self { coordinator, displays, backend, clock, preferences }
    }

    fn started(displays: Vec<DisplayIdentity>, preferences: Preferences) -> Self {
        let mut scenario = Self::new(displays, preferences);
        scenario.coordinator.start();
        scenario
    }

    fn advance(&mut self, by: Duration) {
        let until = self.clock.now() + by;
        while let Some((id, task)) = self.clock.pop_due(until) {
            self.coordinator.task_fired(id, task);
        }
        let _ = self.clock.advance(until.saturating_sub(self.clock.now()));
    }

    fn pointer_at(&self, x: f64, y: f64) { self.displays.set_pointer(Some(Point::new(x, y))); }

    fn only_window(&self) -> overnotch_lib::window::RecordedWindow {
        let windows = self.backend.windows();
        assert_eq!(windows.len(), 1, "expected exactly one live window");
        windows[0].1.clone()
    }
}

fn display(name: &str, x: f64, id: u32) -> DisplayIdentity {
    DisplayIdentity::new(name, Rect::new(x, 0.0, 1920.0, 1080.0), DisplayId(id))
}

fn single_on(name: &str) -> Preferences {
    Preferences {
        preferred_screen: name.to_string(),
        ..Preferences::default()
    }
}

fn all_displays() -> Preferences {
    Preferences {
        show_on_all_displays: true,
        ..Preferences::default()
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn scenario_a_single_window_centered_on_preferred_display() {
    let scenario = Scenario::started(vec![display("A", 0.0, 1)], single_on("A"));

    let window = scenario.only_window();
    assert!((window.alpha - 1.0).abs() < f64::EPSILON);
    assert_eq!(window.frame, Rect::new(867.5, 1048.0, 185.0, 32.0));
    assert_eq!(scenario.coordinator.selected(), Some("A"));
    assert_eq!(scenario.coordinator.primary().display.as_deref(), Some("A"));
}

#[test]
fn scenario_b_removed_display_hides_then_reappears_at_new_geometry() {
    let mut scenario = Scenario::started(vec![display("A", 0.0, 1)], single_on("A"));

    scenario.displays.disconnect("A");
    scenario.coordinator.reconcile();

    let hidden = scenario.only_window();
    assert!(hidden.alpha.abs() < f64::EPSILON);
    assert!(scenario.coordinator.selected().is_none());

    scenario
        .displays
        .connect(DisplayIdentity::new("A", Rect::new(0.0, 0.0, 2560.0, 1440.0), DisplayId(1)));
    scenario.coordinator.reconcile();

    let shown = scenario.only_window();
    assert!((shown.alpha - 1.0).abs() < f64::EPSILON);
    assert_eq!(shown.frame, Rect::new(1187.5, 1408.0, 185.0, 32.0));
    assert_eq!(scenario.backend.created_count(), 1);
}

#[test]
fn scenario_c_views_per_display_are_independent() {
    let mut scenario =
        Scenario::started(vec![display("A", 0.0, 1), display("B", 1920.0, 2)], all_displays());

    scenario.pointer_at(500.0, 500.0);
    scenario.coordinator.handle_input(InputEvent::ToggleNotchOpen);

    let overlays = scenario.coordinator.overlays();
    assert_eq!(overlays.len(), 2);
    assert_eq!(overlays[0].display.as_deref(), Some("A"));
    assert_eq!(overlays[0].state, NotchState::Open);
    assert_eq!(overlays[1].display.as_deref(), Some("B"));
    assert_eq!(overlays[1].state, NotchState::Closed);
    assert_ne!(overlays[0].view, overlays[1].view);
}

#[test]
fn scenario_d_lock_destroys_and_unlock_rebuilds_closed() {
    let mut scenario = Scenario::started(vec![display("A", 0.0, 1)], single_on("A"));
    scenario.pointer_at(10.0, 10.0);
    scenario.coordinator.handle_input(InputEvent::ToggleNotchOpen);
    assert_eq!(scenario.coordinator.primary().state, NotchState::Open);

    scenario.coordinator.screen_locked();
    assert_eq!(scenario.backend.live_count(), 0);

    scenario.coordinator.screen_unlocked();
    scenario.advance(Duration::from_millis(500));

    let window = scenario.only_window();
    assert_eq!(window.frame, Rect::new(867.5, 1048.0, 185.0, 32.0));
    assert_eq!(scenario.coordinator.primary().state, NotchState::Closed);
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn window_count_matches_display_count() {
    for count in 0..=4_u32 {
        let displays: Vec<DisplayIdentity> = (0..count)
            .map(|i| display(&format!("D{i}"), f64::from(i) * 1920.0, i + 1))
            .collect();
        let scenario = Scenario::started(displays, all_displays());

        assert_eq!(scenario.backend.live_count(), count as usize, "{count} displays");
    }
}

#[test]
fn window_count_follows_hot_plug() {
    let mut scenario = Scenario::started(vec![display("A", 0.0, 1)], all_displays());

    scenario.displays.connect(display("B", 1920.0, 2));
    scenario.displays.connect(display("C", 3840.0, 3));
    scenario.coordinator.reconcile();
    assert_eq!(scenario.backend.live_count(), 3);

    scenario.displays.disconnect("B");
    scenario.coordinator.reconcile();
    assert_eq!(scenario.backend.live_count(), 2);
    assert_eq!(scenario.coordinator.stats().windows_destroyed, 1);
}

#[test]
fn repeated_reconcile_issues_no_window_operations() {
    for preferences in [all_displays(), single_on("B")] {
        let mut scenario =
            Scenario::started(vec![display("A", 0.0, 1), display("B", 1920.0, 2)], preferences);
        let handles = scenario.backend.live_handles();
        scenario.backend.clear_ops();

        scenario.coordinator.reconcile();

        assert!(scenario.backend.ops().is_empty(), "{:?}", scenario.backend.ops());
        assert_eq!(scenario.backend.live_handles(), handles);
    }
}

#[test]
fn rapid_open_requests_leave_one_auto_close() {
    let mut scenario = Scenario::started(vec![display("A", 0.0, 1)], single_on("A"));
    scenario.pointer_at(10.0, 10.0);

    for _ in 0..3 {
        scenario.coordinator.handle_input(InputEvent::ClipboardHistoryPanel);
        scenario.advance(Duration::from_secs(1));
    }
    assert_eq!(scenario.clock.pending_count(), 1);

    // The last request came at t=2s, so the close is due at t=5s.
    scenario.advance(Duration::from_millis(1999));
    assert_eq!(scenario.coordinator.primary().state, NotchState::Open);

    scenario.advance(Duration::from_millis(1));
    assert_eq!(scenario.coordinator.primary().state, NotchState::Closed);
    assert_eq!(scenario.clock.pending_count(), 0);
}

#[test]
fn moving_to_another_display_fades_out_then_in() {
    let mut scenario =
        Scenario::started(vec![display("A", 0.0, 1), display("B", 1920.0, 2)], Preferences::default());
    assert_eq!(scenario.coordinator.selected(), Some("A"));
    let handle = scenario.backend.live_handles()[0];
    scenario.backend.clear_ops();

    scenario.displays.set_main(Some(DisplayId(2)));
    scenario.coordinator.reconcile();

    assert_eq!(scenario.backend.ops(), vec![WindowOp::AlphaSet {
        handle,
        alpha: 0.0,
        transition: Transition::Animated(Duration::from_millis(200)),
    }]);
    assert_eq!(scenario.coordinator.selected(), Some("B"));

    // A reconcile during the fade does not restart it.
    scenario.coordinator.reconcile();
    assert_eq!(scenario.backend.ops().len(), 1);

    scenario.advance(Duration::from_millis(200));
    let window = scenario.only_window();
    assert_eq!(window.frame, Rect::new(2787.5, 1048.0, 185.0, 32.0));
    assert!((window.alpha - 1.0).abs() < f64::EPSILON);
    assert_eq!(scenario.backend.created_count(), 0);
}

#[test]
fn failed_window_creation_is_retried_on_next_reconcile() {
    let mut scenario = Scenario::new(vec![display("A", 0.0, 1), display("B", 1920.0, 2)], all_displays());
    scenario.backend.fail_next_creations(1);

    scenario.coordinator.start();
    assert_eq!(scenario.backend.live_count(), 1);
    assert_eq!(scenario.coordinator.stats().creation_failures, 1);

    scenario.coordinator.reconcile();
    assert_eq!(scenario.backend.live_count(), 2);
}

#[test]
fn switching_modes_replaces_windows() {
    let mut scenario =
        Scenario::started(vec![display("A", 0.0, 1), display("B", 1920.0, 2)], Preferences::default());
    assert_eq!(scenario.backend.live_count(), 1);

    scenario.preferences.update(|p| p.show_on_all_displays = true);
    scenario.coordinator.reconcile();
    assert_eq!(scenario.backend.live_count(), 2);

    scenario.preferences.update(|p| p.show_on_all_displays = false);
    scenario.coordinator.reconcile();
    assert_eq!(scenario.backend.live_count(), 1);
    assert_eq!(scenario.coordinator.selected(), Some("A"));
}

#[test]
fn display_resolution_change_moves_window_in_place() {
    let mut scenario = Scenario::started(vec![display("A", 0.0, 1)], all_displays());
    let handle = scenario.backend.live_handles()[0];

    scenario
        .displays
        .set_displays(vec![DisplayIdentity::new("A", Rect::new(0.0, 0.0, 1512.0, 982.0), DisplayId(1))]);
    scenario.coordinator.reconcile();

    assert_eq!(scenario.backend.live_handles(), vec![handle]);
    assert_eq!(scenario.only_window().frame, Rect::new(663.5, 950.0, 185.0, 32.0));
}
