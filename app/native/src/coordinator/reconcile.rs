//! Reconciling windows against displays and preferences.

use uuid::Uuid;

use super::{Overlay, WindowCoordinator, frame_for};
use crate::constants::timing;
use crate::display::{DisplayIdentity, DisplayRegistry, DisplaySnapshot};
use crate::events::NotchEvent;
use crate::preferences::Preferences;
use crate::scheduler::{ScheduledTask, TaskId};
use crate::state::ViewState;
use crate::toggle::take_if_current;
use crate::window::Transition;

impl WindowCoordinator {
    /// Brings windows in line with the current displays and preferences.
    ///
    /// Idempotent: with nothing changed, a second call issues no window
    /// operations. Skipped entirely while the screen is locked.
    pub fn reconcile(&mut self) {
        if self.locked {
            tracing::debug!("overnotch: coordinator: locked, skipping reconcile");
            return;
        }
        self.stats.reconciles += 1;

        let preferences = self.preferences.get();
        let snapshot = self.registry.snapshot();

        tracing::debug!(
            displays = snapshot.displays.len(),
            all_displays = preferences.show_on_all_displays,
            "overnotch: coordinator: reconcile"
        );

        if preferences.show_on_all_displays {
            self.reconcile_all(&snapshot, &preferences);
        } else {
            self.reconcile_single(&snapshot, &preferences);
        }
    }

    /// One overlay per display.
    fn reconcile_all(&mut self, snapshot: &DisplaySnapshot, preferences: &Preferences) {
        self.set_selected(None);

        if let Some(window) = self.views.primary_window.take() {
            self.views.primary.reset();
            self.surfaces.destroy(&window);
            self.stats.windows_destroyed += 1;
        }

        let previous: Vec<DisplayIdentity> = self.views.overlays.keys().cloned().collect();
        let diff = DisplayRegistry::diff(&previous, &snapshot.displays);

        for removed in diff.removed {
            if let Some(mut overlay) = self.views.overlays.remove(&removed) {
                overlay.view.cancel_all();
                self.surfaces.destroy(&overlay.window);
                self.stats.windows_destroyed += 1;
                tracing::info!(display = %removed, "overnotch: coordinator: display removed");
            }
        }

        for (old, new) in diff.changed {
            let Some(mut overlay) = self.views.overlays.remove(&old) else {
                continue;
            };
            overlay.view.owner_display = Some(new.clone());
            overlay.window.assigned_display = Some(new.clone());

            let frame = frame_for(&overlay.view, &new, preferences);
            self.surfaces.place(&mut overlay.window, frame, Transition::Immediate);
            tracing::info!(from = %old, to = %new, "overnotch: coordinator: display changed");
            self.views.overlays.insert(new, overlay);
        }

        for added in diff.added {
            self.create_overlay(added, preferences);
        }

        // Settle closed views on their display.
        for (display, overlay) in &mut self.views.overlays {
            if overlay.view.is_open() {
                continue;
            }
            overlay.view.closed_size = preferences.closed_size;
            overlay.view.open_size = preferences.open_size;
            let frame = frame_for(&overlay.view, display, preferences);
            self.surfaces.place(&mut overlay.window, frame, Transition::Immediate);
            self.surfaces.set_alpha(&mut overlay.window, 1.0, Transition::Immediate);
        }
    }

    fn create_overlay(&mut self, target: DisplayIdentity, preferences: &Preferences) {
        let view = ViewState::new(preferences.closed_size, preferences.open_size, Some(target.clone()));

        match self.surfaces.create(&view, &target, preferences) {
            Ok(window) => {
                self.stats.windows_created += 1;
                tracing::info!(
                    display = %target,
                    window = %window.handle,
                    "overnotch: coordinator: overlay created"
                );
                self.views.overlays.insert(target, Overlay { view, window });
            }
            Err(err) => {
                self.stats.creation_failures += 1;
                tracing::warn!(
                    display = %target,
                    error = %err,
                    "overnotch: coordinator: window creation failed, retrying on next reconcile"
                );
            }
        }
    }

    /// A single window on the selected display.
    fn reconcile_single(&mut self, snapshot: &DisplaySnapshot, preferences: &Preferences) {
        for (_, mut overlay) in self.views.overlays.drain() {
            overlay.view.cancel_all();
            self.surfaces.destroy(&overlay.window);
            self.stats.windows_destroyed += 1;
        }

        let target = preferences
            .preferred_screen()
            .and_then(|name| snapshot.find_by_name(name))
            .or_else(|| {
                if preferences.automatically_switch_display { snapshot.main_display() } else { None }
            })
            .cloned();
        self.set_selected(target.as_ref().map(|d| d.name.clone()));

        let view = &mut self.views.primary;
        view.closed_size = preferences.closed_size;
        view.open_size = preferences.open_size;

        let Some(target) = target else {
            view.cancel_fade();
            if let Some(window) = self.views.primary_window.as_mut() {
                self.surfaces.set_alpha(window, 0.0, Transition::Immediate);
            }
            return;
        };

        let Some(window) = self.views.primary_window.as_mut() else {
            view.owner_display = Some(target.clone());
            match self.surfaces.create(view, &target, preferences) {
                Ok(window) => {
                    self.stats.windows_created += 1;
                    tracing::info!(
                        display = %target,
                        window = %window.handle,
                        "overnotch: coordinator: window created"
                    );
                    self.views.primary_window = Some(window);
                }
                Err(err) => {
                    self.stats.creation_failures += 1;
                    tracing::warn!(
                        display = %target,
                        error = %err,
                        "overnotch: coordinator: window creation failed, retrying on next reconcile"
                    );
                }
            }
            return;
        };

        let same_display = window.assigned_display.as_ref().is_some_and(|d| d.name == target.name);

        if same_display && view.pending_fade.is_some() {
            // A cross-display move toward this display is under way
            view.owner_display = Some(target.clone());
            window.assigned_display = Some(target);
            return;
        }

        view.owner_display = Some(target.clone());
        window.assigned_display = Some(target.clone());

        if same_display || window.is_hidden() {
            let frame = frame_for(view, &target, preferences);
            self.surfaces.place(window, frame, Transition::Immediate);
            self.surfaces.set_alpha(window, 1.0, Transition::Immediate);
            return;
        }

        tracing::info!(display = %target, "overnotch: coordinator: moving window");
        self.surfaces.set_alpha(window, 0.0, Transition::Animated(timing::CROSS_DISPLAY_FADE));
        let token = self
            .scheduler
            .schedule(timing::CROSS_DISPLAY_FADE, ScheduledTask::FadeIn { view: view.id });
        view.replace_fade(token);
    }

    /// Finishes a cross-display move: relocates the window, then fades in.
    pub(super) fn fade_in(&mut self, view_id: Uuid, id: TaskId) {
        let preferences = self.preferences.get();
        let view = &mut self.views.primary;
        if view.id != view_id || take_if_current(&mut view.pending_fade, id).is_none() {
            tracing::debug!("overnotch: coordinator: stale fade-in");
            return;
        }

        let (Some(window), Some(display)) = (self.views.primary_window.as_mut(), view.owner_display.as_ref())
        else {
            return;
        };

        let frame = frame_for(view, display, &preferences);
        self.surfaces.place(window, frame, Transition::Immediate);
        self.surfaces.set_alpha(window, 1.0, Transition::Animated(timing::CROSS_DISPLAY_FADE));
    }

    fn set_selected(&mut self, name: Option<String>) {
        if self.selected == name {
            return;
        }
        tracing::info!(
            from = self.selected.as_deref().unwrap_or("-"),
            to = name.as_deref().unwrap_or("-"),
            "overnotch: coordinator: selected screen changed"
        );
        self.selected.clone_from(&name);
        self.bus.publish(&NotchEvent::SelectedScreenChanged { name });
    }
}
