//! In-memory window backend.
//!
//! Keeps every window as a plain record and logs each backend call, so
//! headless runs and tests can assert on what the coordinator did.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{ContentSurface, Transition, WindowBackend, WindowHandle};
use crate::error::OvernotchError;
use crate::geometry::Rect;

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowOp {
    Created { handle: WindowHandle, frame: Rect },
    FrameSet { handle: WindowHandle, frame: Rect, transition: Transition },
    AlphaSet { handle: WindowHandle, alpha: f64, transition: Transition },
    ContentSet { handle: WindowHandle },
    Destroyed { handle: WindowHandle },
}

/// State of a live recorded window.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedWindow {
    pub frame: Rect,
    pub alpha: f64,
    pub content: ContentSurface,
}

#[derive(Debug, Default)]
struct Inner {
    next_handle: u64,
    live: BTreeMap<WindowHandle, RecordedWindow>,
    ops: Vec<WindowOp>,
    failures_left: usize,
}

/// Window backend that records instead of drawing.
///
/// Clones share state: hand one to the coordinator and keep one to inspect.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    inner: Arc<Mutex<Inner>>,
}

impl RecordingBackend {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Makes the next `count` window creations fail.
    pub fn fail_next_creations(&self, count: usize) { self.inner.lock().failures_left = count; }

    /// Number of windows currently alive.
    #[must_use]
    pub fn live_count(&self) -> usize { self.inner.lock().live.len() }

    /// Handles of the live windows, in creation order.
    #[must_use]
    pub fn live_handles(&self) -> Vec<WindowHandle> { self.inner.lock().live.keys().copied().collect() }

    /// Returns a live window's state.
    #[must_use]
    pub fn window(&self, handle: WindowHandle) -> Option<RecordedWindow> {
        self.inner.lock().live.get(&handle).cloned()
    }

    /// All live windows.
    #[must_use]
    pub fn windows(&self) -> Vec<(WindowHandle, RecordedWindow)> {
        self.inner.lock().live.iter().map(|(h, w)| (*h, w.clone())).collect()
    }

    /// Every call recorded so far.
    #[must_use]
    pub fn ops(&self) -> Vec<WindowOp> { self.inner.lock().ops.clone() }

    /// Forgets the recorded calls, keeping live windows.
    pub fn clear_ops(&self) { self.inner.lock().ops.clear(); }

    /// Number of windows created since the log was last cleared.
    #[must_use]
    pub fn created_count(&self) -> usize {
        self.count(|op| matches!(op, WindowOp::Created { .. }))
    }

    /// Number of windows destroyed since the log was last cleared.
    #[must_use]
    pub fn destroyed_count(&self) -> usize {
        self.count(|op| matches!(op, WindowOp::Destroyed { .. }))
    }

    /// Number of frame changes since the log was last cleared.
    #[must_use]
    pub fn frame_set_count(&self) -> usize {
        self.count(|op| matches!(op, WindowOp::FrameSet { .. }))
    }

    fn count(&self, predicate: impl Fn(&WindowOp) -> bool) -> usize {
        self.inner.lock().ops.iter().filter(|op| predicate(op)).count()
    }
}

impl WindowBackend for RecordingBackend {
    fn create_window(
        &mut self,
        frame: Rect,
        content: &ContentSurface,
    ) -> Result<WindowHandle, OvernotchError> {
        let mut inner = self.inner.lock();
        if inner.failures_left > 0 {
            inner.failures_left -= 1;
            return Err(OvernotchError::WindowError("simulated creation failure".to_string()));
        }

        inner.next_handle += 1;
        let handle = WindowHandle(inner.next_handle);
        inner.live.insert(handle, RecordedWindow {
            frame,
            alpha: 1.0,
            content: content.clone(),
        });
        inner.ops.push(WindowOp::Created { handle, frame });
        Ok(handle)
    }

    fn set_frame(&mut self, handle: WindowHandle, frame: Rect, transition: Transition) {
        let mut inner = self.inner.lock();
        if let Some(window) = inner.live.get_mut(&handle) {
            window.frame = frame;
        }
        inner.ops.push(WindowOp::FrameSet { handle, frame, transition });
    }

    fn set_alpha(&mut self, handle: WindowHandle, alpha: f64, transition: Transition) {
        let mut inner = self.inner.lock();
        if let Some(window) = inner.live.get_mut(&handle) {
            window.alpha = alpha;
        }
        inner.ops.push(WindowOp::AlphaSet { handle, alpha, transition });
    }

    fn set_content(&mut self, handle: WindowHandle, content: &ContentSurface) {
        let mut inner = self.inner.lock();
        if let Some(window) = inner.live.get_mut(&handle) {
            window.content = content.clone();
        }
        inner.ops.push(WindowOp::ContentSet { handle });
    }

    fn destroy_window(&mut self, handle: WindowHandle) {
        let mut inner = self.inner.lock();
        inner.live.remove(&handle);
        inner.ops.push(WindowOp::Destroyed { handle });
    }
}
