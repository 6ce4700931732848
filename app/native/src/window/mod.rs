//! Overlay windows and the backends that realize them.
//!
//! The coordinator never talks to a windowing system directly. It drives a
//! [`WindowBackend`] with plain frames and alpha values, and asks a
//! [`ContentFactory`] for the surface to show inside each window.

#[cfg(target_os = "macos")]
pub mod macos;
mod recording;

use std::fmt;
use std::time::Duration;

pub use recording::{RecordedWindow, RecordingBackend, WindowOp};
use serde::Serialize;
use uuid::Uuid;

use crate::display::DisplayIdentity;
use crate::error::OvernotchError;
use crate::geometry::{Rect, Size};
use crate::state::{ContentTab, NotchState, SneakPeekKind, ViewState};

/// Backend handle of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct WindowHandle(pub u64);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "#{}", self.0) }
}

/// How a frame or alpha change is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Jump to the new value.
    Immediate,
    /// Ease to the new value over the given duration.
    Animated(Duration),
}

// ============================================================================
// Content
// ============================================================================

/// What a window should display.
///
/// Produced by a [`ContentFactory`] and handed to the backend untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentSurface {
    /// View the surface was rendered for.
    pub view: Uuid,
    pub state: NotchState,
    pub tab: ContentTab,
    pub sneak_peek: Option<SneakPeekKind>,
    /// Size the content was laid out for.
    pub size: Size,
}

/// Renders notch content for a view.
pub trait ContentFactory: Send {
    fn render(&self, view: &ViewState, size: Size) -> ContentSurface;
}

/// Describes the view without drawing anything.
///
/// Used when no content renderer is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderContent;

impl ContentFactory for PlaceholderContent {
    fn render(&self, view: &ViewState, size: Size) -> ContentSurface {
        ContentSurface {
            view: view.id,
            state: view.notch_state,
            tab: view.tab,
            sneak_peek: view.sneak_peek.map(|peek| peek.kind),
            size,
        }
    }
}

// ============================================================================
// Backend
// ============================================================================

/// Creates and mutates borderless, non-activating, always-on-top windows.
///
/// All calls are made from the coordinator's execution context. Backends
/// that need a different thread (`AppKit`) forward internally.
pub trait WindowBackend: Send {
    /// Creates a window at `frame` showing `content`, fully opaque.
    ///
    /// # Errors
    ///
    /// Returns [`OvernotchError::WindowError`] if the OS refuses to create
    /// the window.
    fn create_window(
        &mut self,
        frame: Rect,
        content: &ContentSurface,
    ) -> Result<WindowHandle, OvernotchError>;

    fn set_frame(&mut self, handle: WindowHandle, frame: Rect, transition: Transition);

    fn set_alpha(&mut self, handle: WindowHandle, alpha: f64, transition: Transition);

    fn set_content(&mut self, handle: WindowHandle, content: &ContentSurface);

    fn destroy_window(&mut self, handle: WindowHandle);
}

/// A live overlay window as tracked by the coordinator.
#[derive(Debug, Clone)]
pub struct OverlayWindow {
    pub handle: WindowHandle,
    /// Last frame sent to the backend.
    pub current_frame: Rect,
    /// Last alpha sent to the backend, in `[0, 1]`.
    pub alpha: f64,
    /// Display the window is bound to, kept in step with its view's owner.
    pub assigned_display: Option<DisplayIdentity>,
}

impl OverlayWindow {
    /// Tracks a freshly created, opaque window.
    #[must_use]
    pub const fn new(
        handle: WindowHandle,
        frame: Rect,
        assigned_display: Option<DisplayIdentity>,
    ) -> Self {
        Self {
            handle,
            current_frame: frame,
            alpha: 1.0,
            assigned_display,
        }
    }

    /// Returns whether the window is fully transparent.
    #[must_use]
    pub fn is_hidden(&self) -> bool { self.alpha <= 0.0 }
}
