//! Per-display notch view state.
//!
//! A [`ViewState`] is the closed/open state machine of one overlay plus
//! everything needed to size and render it. It is owned by exactly one
//! coordinator entry and never shared between displays.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::display::DisplayIdentity;
use crate::geometry::{Size, open_content_size};
use crate::scheduler::TaskToken;

// ============================================================================
// Enums
// ============================================================================

/// Whether a notch is collapsed or expanded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotchState {
    /// Idle, hugging the hardware notch.
    #[default]
    Closed,
    /// Expanded to show content.
    Open,
}

/// Content page shown while the notch is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentTab {
    /// Default page (media, calendar).
    #[default]
    Home,
    /// System stats graphs.
    Stats,
    /// Clipboard history.
    Clipboard,
}

/// What a sneak peek is announcing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SneakPeekKind {
    Music,
    Volume,
    Brightness,
    Battery,
    Download,
    Microphone,
}

/// A transient preview shown on a closed notch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SneakPeek {
    /// The kind of preview.
    pub kind: SneakPeekKind,
}

// ============================================================================
// View State
// ============================================================================

/// State of one notch overlay.
#[derive(Debug)]
pub struct ViewState {
    /// Stable id, referenced by scheduled tasks.
    pub id: Uuid,
    /// Closed or open.
    pub notch_state: NotchState,
    /// Size while closed.
    pub closed_size: Size,
    /// Base size while open, before dynamic width is applied.
    pub open_size: Size,
    /// Display this view renders on. `None` for an unbound single-mode view.
    pub owner_display: Option<DisplayIdentity>,
    /// Active content tab.
    pub tab: ContentTab,
    /// Preview currently shown, if any.
    pub sneak_peek: Option<SneakPeek>,
    /// Scheduled auto-close. At most one is live.
    pub pending_close: Option<TaskToken>,
    /// Scheduled end of the current sneak peek.
    pub pending_peek: Option<TaskToken>,
    /// Scheduled fade-in after a cross-display move.
    pub pending_fade: Option<TaskToken>,
}

impl ViewState {
    /// Creates a closed view.
    #[must_use]
    pub fn new(closed_size: Size, open_size: Size, owner_display: Option<DisplayIdentity>) -> Self {
        Self {
            id: Uuid::now_v7(),
            notch_state: NotchState::Closed,
            closed_size,
            open_size,
            owner_display,
            tab: ContentTab::Home,
            sneak_peek: None,
            pending_close: None,
            pending_peek: None,
            pending_fade: None,
        }
    }

    /// Returns whether the notch is expanded.
    #[must_use]
    pub fn is_open(&self) -> bool { self.notch_state == NotchState::Open }

    /// Returns the size the window should have right now.
    #[must_use]
    pub fn target_size(&self, stats_enabled: bool, enabled_graph_count: usize) -> Size {
        match self.notch_state {
            NotchState::Closed => self.closed_size,
            NotchState::Open => {
                open_content_size(self.open_size, self.tab, stats_enabled, enabled_graph_count)
            }
        }
    }

    /// Installs a new auto-close token, cancelling the previous one.
    pub fn replace_close(&mut self, token: TaskToken) { replace(&mut self.pending_close, token); }

    /// Installs a new sneak-peek token, cancelling the previous one.
    pub fn replace_peek(&mut self, token: TaskToken) { replace(&mut self.pending_peek, token); }

    /// Installs a new fade-in token, cancelling the previous one.
    pub fn replace_fade(&mut self, token: TaskToken) { replace(&mut self.pending_fade, token); }

    /// Cancels the auto-close token, if any.
    pub fn cancel_close(&mut self) { cancel(&mut self.pending_close); }

    /// Cancels the sneak-peek token, if any.
    pub fn cancel_peek(&mut self) { cancel(&mut self.pending_peek); }

    /// Cancels the fade-in token, if any.
    pub fn cancel_fade(&mut self) { cancel(&mut self.pending_fade); }

    /// Cancels every outstanding token.
    pub fn cancel_all(&mut self) {
        self.cancel_close();
        self.cancel_peek();
        self.cancel_fade();
    }

    /// Returns the view to its initial closed state and cancels all tokens.
    pub fn reset(&mut self) {
        self.cancel_all();
        self.notch_state = NotchState::Closed;
        self.tab = ContentTab::Home;
        self.sneak_peek = None;
    }

}

fn replace(slot: &mut Option<TaskToken>, token: TaskToken) {
    if let Some(previous) = slot.replace(token) {
        previous.cancel();
    }
}

fn cancel(slot: &mut Option<TaskToken>) {
    if let Some(token) = slot.take() {
        token.cancel();
    }
}
