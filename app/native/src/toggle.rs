//! Open/close state machine driven by input events.
//!
//! The [`ToggleController`] applies one input event or one fired task to a
//! single [`ViewState`] and reports what changed. It never touches windows;
//! the coordinator turns the outcome into geometry and content updates.

use std::time::Duration;

use crate::constants::timing;
use crate::display::DisplayIdentity;
use crate::geometry::Point;
use crate::preferences::Preferences;
use crate::scheduler::{ScheduledTask, Scheduler, TaskId, TaskToken};
use crate::state::{ContentTab, NotchState, SneakPeek, SneakPeekKind, ViewState};

/// A discrete input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Flip the notch between closed and open.
    ToggleNotchOpen,
    /// Show, replace or hide a transient preview.
    ToggleSneakPeek {
        kind: SneakPeekKind,
        duration: Option<Duration>,
    },
    /// Open the notch on the clipboard history tab.
    ClipboardHistoryPanel,
    /// Switch the content tab.
    SwitchTab { tab: ContentTab },
}

impl InputEvent {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ToggleNotchOpen => "ToggleNotchOpen",
            Self::ToggleSneakPeek { .. } => "ToggleSneakPeek",
            Self::ClipboardHistoryPanel => "ClipboardHistoryPanel",
            Self::SwitchTab { .. } => "SwitchTab",
        }
    }
}

/// What an event did to a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Nothing to apply.
    Unchanged,
    /// `notch_state` flipped.
    StateChanged,
    /// Same state, different content (tab or sneak peek).
    ContentChanged,
}

/// Applies input events and timeouts to view states.
#[derive(Debug, Clone, Copy)]
pub struct ToggleController {
    auto_close_delay: Duration,
    sneak_peek_duration: Duration,
}

impl Default for ToggleController {
    fn default() -> Self {
        Self {
            auto_close_delay: timing::AUTO_CLOSE_DELAY,
            sneak_peek_duration: timing::SNEAK_PEEK_DURATION,
        }
    }
}

impl ToggleController {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Applies an input event to `view`.
    pub fn apply(
        &self,
        view: &mut ViewState,
        event: InputEvent,
        preferences: &Preferences,
        scheduler: &dyn Scheduler,
    ) -> ToggleOutcome {
        match event {
            InputEvent::ToggleNotchOpen => match view.notch_state {
                NotchState::Closed => {
                    self.open(view, scheduler);
                    ToggleOutcome::StateChanged
                }
                NotchState::Open => {
                    view.cancel_close();
                    view.notch_state = NotchState::Closed;
                    ToggleOutcome::StateChanged
                }
            },
            InputEvent::ClipboardHistoryPanel => {
                if !preferences.clipboard_enabled {
                    tracing::debug!("overnotch: toggle: clipboard panel disabled, ignoring");
                    return ToggleOutcome::Unchanged;
                }

                let was_open = view.is_open();
                view.tab = ContentTab::Clipboard;
                self.open(view, scheduler);

                if was_open { ToggleOutcome::ContentChanged } else { ToggleOutcome::StateChanged }
            }
            InputEvent::ToggleSneakPeek { kind, duration } => {
                if view.is_open() {
                    return ToggleOutcome::Unchanged;
                }

                if view.sneak_peek.is_some_and(|peek| peek.kind == kind) {
                    view.cancel_peek();
                    view.sneak_peek = None;
                } else {
                    let delay = duration.unwrap_or(self.sneak_peek_duration);
                    view.sneak_peek = Some(SneakPeek { kind });
                    view.replace_peek(scheduler.schedule(delay, ScheduledTask::SneakPeekEnd { view: view.id }));
                }
                ToggleOutcome::ContentChanged
            }
            InputEvent::SwitchTab { tab } => {
                if view.tab == tab {
                    return ToggleOutcome::Unchanged;
                }
                view.tab = tab;
                ToggleOutcome::ContentChanged
            }
        }
    }

    /// Applies a fired task to `view`.
    ///
    /// A task whose token is no longer the one stored on the view was
    /// superseded and is ignored.
    pub fn on_task(&self, view: &mut ViewState, id: TaskId, task: ScheduledTask) -> ToggleOutcome {
        match task {
            ScheduledTask::AutoClose { .. } => {
                if take_if_current(&mut view.pending_close, id).is_none() || !view.is_open() {
                    return ToggleOutcome::Unchanged;
                }
                view.notch_state = NotchState::Closed;
                ToggleOutcome::StateChanged
            }
            ScheduledTask::SneakPeekEnd { .. } => {
                if take_if_current(&mut view.pending_peek, id).is_none() {
                    return ToggleOutcome::Unchanged;
                }
                view.sneak_peek = None;
                ToggleOutcome::ContentChanged
            }
            ScheduledTask::FadeIn { .. } | ScheduledTask::UnlockSettled => ToggleOutcome::Unchanged,
        }
    }

    /// Opens `view` and (re)schedules its single auto-close.
    fn open(&self, view: &mut ViewState, scheduler: &dyn Scheduler) {
        view.cancel_peek();
        view.sneak_peek = None;
        view.notch_state = NotchState::Open;
        view.replace_close(
            scheduler.schedule(self.auto_close_delay, ScheduledTask::AutoClose { view: view.id }),
        );
    }
}

/// Takes the token out of `slot` if it is the one with `id`.
pub fn take_if_current(slot: &mut Option<TaskToken>, id: TaskId) -> Option<TaskToken> {
    if slot.as_ref().is_some_and(|token| token.id() == id) { slot.take() } else { None }
}

/// Picks the display under the pointer.
///
/// Returns `None` when the pointer is unknown or outside every display, in
/// which case callers fall back to the default view.
pub fn select_target<'a, I>(displays: I, pointer: Option<Point>) -> Option<&'a DisplayIdentity>
where I: IntoIterator<Item = &'a DisplayIdentity> {
    let pointer = pointer?;
    displays.into_iter().find(|display| display.contains(pointer))
}
