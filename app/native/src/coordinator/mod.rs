//! Multi-display window lifecycle coordinator.
//!
//! The [`WindowCoordinator`] owns the display → (window, view state) mapping
//! and is the only thing that mutates it. It is a plain synchronous struct;
//! serialization of concurrent triggers is the job of the actor that owns
//! it (see [`crate::actor`]).
//!
//! Two modes, chosen by preference:
//!
//! - **All displays**: one overlay per connected display, keyed by
//!   [`DisplayIdentity`].
//! - **Single window**: one primary overlay bound to the selected display,
//!   hidden rather than destroyed when no display qualifies.

mod lock;
mod reconcile;
mod resize;

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::display::{DisplayIdentity, DisplayRegistry};
use crate::error::OvernotchError;
use crate::events::EventBus;
use crate::geometry::{Rect, placement};
use crate::preferences::{PreferenceStore, Preferences};
use crate::scheduler::{ScheduledTask, Scheduler, TaskId, TaskToken};
use crate::services::Services;
use crate::state::{ContentTab, NotchState, SneakPeekKind, ViewState};
use crate::toggle::{InputEvent, ToggleController, select_target};
use crate::window::{ContentFactory, OverlayWindow, Transition, WindowBackend, WindowHandle};

// ============================================================================
// Construction
// ============================================================================

/// Everything the coordinator needs from the outside world.
pub struct Collaborators {
    pub registry: DisplayRegistry,
    pub backend: Box<dyn WindowBackend>,
    pub content: Box<dyn ContentFactory>,
    pub scheduler: Box<dyn Scheduler>,
    pub preferences: Arc<PreferenceStore>,
    pub bus: Arc<EventBus>,
    pub services: Services,
}

/// Counters exposed for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinatorStats {
    pub reconciles: u64,
    pub windows_created: u64,
    pub windows_destroyed: u64,
    pub creation_failures: u64,
    pub inputs: u64,
    pub live_windows: usize,
    pub locked: bool,
}

/// Serializable view of one overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlaySnapshot {
    pub view: Uuid,
    pub display: Option<String>,
    pub window: Option<WindowHandle>,
    pub frame: Option<Rect>,
    pub alpha: Option<f64>,
    pub state: NotchState,
    pub tab: ContentTab,
    pub sneak_peek: Option<SneakPeekKind>,
}

impl OverlaySnapshot {
    fn new(view: &ViewState, window: Option<&OverlayWindow>) -> Self {
        Self {
            view: view.id,
            display: view.owner_display.as_ref().map(|d| d.name.clone()),
            window: window.map(|w| w.handle),
            frame: window.map(|w| w.current_frame),
            alpha: window.map(|w| w.alpha),
            state: view.notch_state,
            tab: view.tab,
            sneak_peek: view.sneak_peek.map(|p| p.kind),
        }
    }
}

/// Requests answered by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotchQuery {
    /// Every overlay with its window, if any.
    Overlays,
    /// The default view, whether or not it has a window.
    Primary,
    /// Lifecycle counters.
    Stats,
    /// Name of the display the single window is bound to.
    Selected,
}

/// Answer to a [`NotchQuery`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryResult {
    Overlays(Vec<OverlaySnapshot>),
    Primary(OverlaySnapshot),
    Stats(CoordinatorStats),
    Selected(Option<String>),
}

impl QueryResult {
    #[must_use]
    pub fn into_overlays(self) -> Option<Vec<OverlaySnapshot>> {
        match self {
            Self::Overlays(overlays) => Some(overlays),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_primary(self) -> Option<OverlaySnapshot> {
        match self {
            Self::Primary(primary) => Some(primary),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_stats(self) -> Option<CoordinatorStats> {
        match self {
            Self::Stats(stats) => Some(stats),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_selected(self) -> Option<Option<String>> {
        match self {
            Self::Selected(selected) => Some(selected),
            _ => None,
        }
    }
}

// ============================================================================
// Internal State
// ============================================================================

/// A view and the window rendering it.
struct Overlay {
    view: ViewState,
    window: OverlayWindow,
}

/// The display → overlay map plus the single-mode primary overlay.
struct Views {
    overlays: HashMap<DisplayIdentity, Overlay>,
    /// Default view. Drives the single window, and receives input in
    /// all-displays mode when the pointer is on no overlay's display.
    primary: ViewState,
    primary_window: Option<OverlayWindow>,
}

impl Views {
    /// Finds a view and its window by view id.
    fn entry_mut(&mut self, id: Uuid) -> Option<(&mut ViewState, Option<&mut OverlayWindow>)> {
        if self.primary.id == id {
            return Some((&mut self.primary, self.primary_window.as_mut()));
        }
        self.overlays
            .values_mut()
            .find(|overlay| overlay.view.id == id)
            .map(|overlay| (&mut overlay.view, Some(&mut overlay.window)))
    }

    fn live_windows(&self) -> usize { self.overlays.len() + usize::from(self.primary_window.is_some()) }
}

/// Computes where a view's window belongs on a display.
fn frame_for(view: &ViewState, display: &DisplayIdentity, preferences: &Preferences) -> Rect {
    let size = view.target_size(preferences.stats_enabled, preferences.enabled_graph_count());
    placement(display.frame, size)
}

/// Window backend plus content factory, driven with view states.
struct Surfaces {
    backend: Box<dyn WindowBackend>,
    content: Box<dyn ContentFactory>,
}

impl Surfaces {
    fn create(
        &mut self,
        view: &ViewState,
        display: &DisplayIdentity,
        preferences: &Preferences,
    ) -> Result<OverlayWindow, OvernotchError> {
        let frame = frame_for(view, display, preferences);
        let content = self.content.render(view, frame.size());
        let handle = self.backend.create_window(frame, &content)?;
        Ok(OverlayWindow::new(handle, frame, Some(display.clone())))
    }

    fn destroy(&mut self, window: &OverlayWindow) { self.backend.destroy_window(window.handle); }

    /// Moves the window to `frame` if it is not already there.
    fn place(&mut self, window: &mut OverlayWindow, frame: Rect, transition: Transition) -> bool {
        if !window.current_frame.differs_from(&frame) {
            return false;
        }
        self.backend.set_frame(window.handle, frame, transition);
        window.current_frame = frame;
        true
    }

    fn set_alpha(&mut self, window: &mut OverlayWindow, alpha: f64, transition: Transition) {
        if (window.alpha - alpha).abs() < f64::EPSILON {
            return;
        }
        self.backend.set_alpha(window.handle, alpha, transition);
        window.alpha = alpha;
    }

    fn render(&mut self, view: &ViewState, window: &OverlayWindow) {
        let content = self.content.render(view, window.current_frame.size());
        self.backend.set_content(window.handle, &content);
    }
}

// ============================================================================
// Coordinator
// ============================================================================

/// Owns every overlay window and keeps them in line with displays and
/// preferences.
pub struct WindowCoordinator {
    registry: DisplayRegistry,
    surfaces: Surfaces,
    scheduler: Box<dyn Scheduler>,
    preferences: Arc<PreferenceStore>,
    bus: Arc<EventBus>,
    services: Services,
    toggle: ToggleController,
    views: Views,
    /// Display name the single window is bound to.
    selected: Option<String>,
    /// Set between a lock and the end of the unlock settle delay.
    locked: bool,
    unlock_settle: Option<TaskToken>,
    stats: CoordinatorStats,
}

impl WindowCoordinator {
    /// Creates a coordinator with no windows. Call [`Self::start`] to
    /// start services and build the first windows.
    #[must_use]
    pub fn new(parts: Collaborators) -> Self {
        let preferences = parts.preferences.get();
        Self {
            registry: parts.registry,
            surfaces: Surfaces {
                backend: parts.backend,
                content: parts.content,
            },
            scheduler: parts.scheduler,
            preferences: parts.preferences,
            bus: parts.bus,
            services: parts.services,
            toggle: ToggleController::new(),
            views: Views {
                overlays: HashMap::new(),
                primary: ViewState::new(preferences.closed_size, preferences.open_size, None),
                primary_window: None,
            },
            selected: None,
            locked: false,
            unlock_settle: None,
            stats: CoordinatorStats::default(),
        }
    }

    /// Starts services and performs the initial reconcile.
    pub fn start(&mut self) {
        let failures = self.services.start_all();
        tracing::info!(
            services = self.services.len(),
            failures,
            "overnotch: coordinator: started"
        );
        self.reconcile();
    }

    /// Stops services and destroys every window.
    pub fn shutdown(&mut self) {
        self.services.stop_all();
        if let Some(token) = self.unlock_settle.take() {
            token.cancel();
        }
        self.teardown();
        tracing::info!("overnotch: coordinator: shut down");
    }

    // ------------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------------

    /// Applies an input event to the view under the pointer.
    pub fn handle_input(&mut self, event: InputEvent) {
        if self.locked {
            tracing::debug!(event = event.name(), "overnotch: coordinator: locked, ignoring input");
            return;
        }
        self.stats.inputs += 1;

        let preferences = self.preferences.get();
        let pointer = self.registry.pointer_location();
        let target = select_target(self.views.overlays.keys(), pointer).cloned();

        let (view, window) = match target.and_then(|display| self.views.overlays.get_mut(&display)) {
            Some(overlay) => (&mut overlay.view, Some(&mut overlay.window)),
            None => (&mut self.views.primary, self.views.primary_window.as_mut()),
        };

        tracing::debug!(
            event = event.name(),
            display = view.owner_display.as_ref().map_or("-", |d| d.name.as_str()),
            "overnotch: coordinator: input"
        );

        let outcome = self.toggle.apply(view, event, &preferences, self.scheduler.as_ref());
        resize::apply_outcome(&mut self.surfaces, &self.bus, view, window, outcome, &preferences);
    }

    /// Handles a fired scheduled task.
    pub fn task_fired(&mut self, id: TaskId, task: ScheduledTask) {
        tracing::trace!(task = task.name(), %id, "overnotch: coordinator: task fired");

        match task {
            ScheduledTask::UnlockSettled => self.unlock_settled(id),
            ScheduledTask::FadeIn { view } => self.fade_in(view, id),
            ScheduledTask::AutoClose { view } | ScheduledTask::SneakPeekEnd { view } => {
                let preferences = self.preferences.get();
                let Some((view, window)) = self.views.entry_mut(view) else {
                    tracing::debug!(task = task.name(), "overnotch: coordinator: view gone, dropping task");
                    return;
                };
                let outcome = self.toggle.on_task(view, id, task);
                resize::apply_outcome(&mut self.surfaces, &self.bus, view, window, outcome, &preferences);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Answers a query.
    #[must_use]
    pub fn query(&self, query: NotchQuery) -> QueryResult {
        match query {
            NotchQuery::Overlays => QueryResult::Overlays(self.overlays()),
            NotchQuery::Primary => QueryResult::Primary(self.primary()),
            NotchQuery::Stats => QueryResult::Stats(self.stats()),
            NotchQuery::Selected => QueryResult::Selected(self.selected.clone()),
        }
    }

    /// Snapshots every overlay, all-displays overlays first, left to right.
    #[must_use]
    pub fn overlays(&self) -> Vec<OverlaySnapshot> {
        let mut overlays: Vec<&Overlay> = self.views.overlays.values().collect();
        overlays.sort_by(|a, b| {
            a.window
                .current_frame
                .x
                .total_cmp(&b.window.current_frame.x)
                .then(a.window.current_frame.y.total_cmp(&b.window.current_frame.y))
        });

        let mut snapshots: Vec<OverlaySnapshot> =
            overlays.iter().map(|o| OverlaySnapshot::new(&o.view, Some(&o.window))).collect();

        if let Some(window) = &self.views.primary_window {
            snapshots.push(OverlaySnapshot::new(&self.views.primary, Some(window)));
        }
        snapshots
    }

    /// Snapshot of the default view, whether or not it has a window.
    #[must_use]
    pub fn primary(&self) -> OverlaySnapshot {
        OverlaySnapshot::new(&self.views.primary, self.views.primary_window.as_ref())
    }

    #[must_use]
    pub fn stats(&self) -> CoordinatorStats {
        CoordinatorStats {
            live_windows: self.views.live_windows(),
            locked: self.locked,
            ..self.stats
        }
    }

    #[must_use]
    pub fn selected(&self) -> Option<&str> { self.selected.as_deref() }

    #[must_use]
    pub const fn is_locked(&self) -> bool { self.locked }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    /// Destroys every window and resets the default view.
    fn teardown(&mut self) {
        for (_, mut overlay) in self.views.overlays.drain() {
            overlay.view.cancel_all();
            self.surfaces.destroy(&overlay.window);
            self.stats.windows_destroyed += 1;
        }

        self.views.primary.reset();
        if let Some(window) = self.views.primary_window.take() {
            self.surfaces.destroy(&window);
            self.stats.windows_destroyed += 1;
        }
    }
}
