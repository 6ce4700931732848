//! `NSPanel` window backend.
//!
//! Panels are borderless, non-activating and float above the menu bar on
//! every Space. Creation runs synchronously on the main thread so failures
//! can be reported; every other mutation is dispatched asynchronously, which
//! keeps `AppKit` calls in submission order without blocking the caller.

use std::collections::HashMap;

use core_graphics::geometry::{CGPoint, CGRect, CGSize};
use objc::runtime::{NO, Object, YES};
use objc::{class, msg_send, sel, sel_impl};

use super::{ContentSurface, Transition, WindowBackend, WindowHandle};
use crate::error::OvernotchError;
use crate::geometry::Rect;
use crate::platform::thread::{dispatch_on_main, run_on_main_sync};
use crate::state::NotchState;

type ObjcId = *mut Object;

const NS_WINDOW_STYLE_MASK_BORDERLESS: u64 = 0;
const NS_WINDOW_STYLE_MASK_NONACTIVATING_PANEL: u64 = 1 << 7;
const NS_BACKING_STORE_BUFFERED: u64 = 2;
const NS_WINDOW_COLLECTION_BEHAVIOR_CAN_JOIN_ALL_SPACES: u64 = 1 << 0;
const NS_WINDOW_COLLECTION_BEHAVIOR_STATIONARY: u64 = 1 << 4;
const NS_WINDOW_COLLECTION_BEHAVIOR_IGNORES_CYCLE: u64 = 1 << 6;

/// `kCGMainMenuWindowLevelKey`.
const MAIN_MENU_WINDOW_LEVEL_KEY: i32 = 8;
/// Levels above the menu bar, so the overlay covers the notch area.
const LEVEL_ABOVE_MENU: i32 = 3;

const CLOSED_CORNER_RADIUS: f64 = 10.0;
const OPEN_CORNER_RADIUS: f64 = 24.0;

#[link(name = "CoreGraphics", kind = "framework")]
unsafe extern "C" {
    fn CGWindowLevelForKey(key: i32) -> i32;
}

fn cg_rect(rect: Rect) -> CGRect {
    CGRect::new(&CGPoint::new(rect.x, rect.y), &CGSize::new(rect.width, rect.height))
}

const fn corner_radius(content: &ContentSurface) -> f64 {
    match content.state {
        NotchState::Closed => CLOSED_CORNER_RADIUS,
        NotchState::Open => OPEN_CORNER_RADIUS,
    }
}

/// Window backend creating one `NSPanel` per overlay.
#[derive(Debug, Default)]
pub struct MacBackend {
    next_handle: u64,
    /// Retained panel pointers, stored as addresses so they can cross threads.
    panels: HashMap<WindowHandle, usize>,
}

impl MacBackend {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    fn panel(&self, handle: WindowHandle) -> Option<usize> {
        let panel = self.panels.get(&handle).copied();
        if panel.is_none() {
            tracing::debug!(window = %handle, "overnotch: window: unknown handle");
        }
        panel
    }
}

/// Allocates and shows a panel.
///
/// # Safety
///
/// Must run on the main thread.
unsafe fn create_panel(frame: CGRect, radius: f64) -> Option<usize> {
    unsafe {
        let panel: ObjcId = msg_send![class!(NSPanel), alloc];
        let style = NS_WINDOW_STYLE_MASK_BORDERLESS | NS_WINDOW_STYLE_MASK_NONACTIVATING_PANEL;
        let panel: ObjcId = msg_send![panel, initWithContentRect: frame
                                                       styleMask: style
                                                         backing: NS_BACKING_STORE_BUFFERED
                                                           defer: NO];
        if panel.is_null() {
            return None;
        }

        let level = CGWindowLevelForKey(MAIN_MENU_WINDOW_LEVEL_KEY) + LEVEL_ABOVE_MENU;
        let behaviors = NS_WINDOW_COLLECTION_BEHAVIOR_CAN_JOIN_ALL_SPACES
            | NS_WINDOW_COLLECTION_BEHAVIOR_STATIONARY
            | NS_WINDOW_COLLECTION_BEHAVIOR_IGNORES_CYCLE;
        let clear: ObjcId = msg_send![class!(NSColor), clearColor];

        let _: () = msg_send![panel, setLevel: level];
        let _: () = msg_send![panel, setCollectionBehavior: behaviors];
        let _: () = msg_send![panel, setOpaque: NO];
        let _: () = msg_send![panel, setBackgroundColor: clear];
        let _: () = msg_send![panel, setHasShadow: NO];
        let _: () = msg_send![panel, setReleasedWhenClosed: NO];
        let _: () = msg_send![panel, setHidesOnDeactivate: NO];

        let view: ObjcId = msg_send![panel, contentView];
        if !view.is_null() {
            let _: () = msg_send![view, setWantsLayer: YES];
            let layer: ObjcId = msg_send![view, layer];
            if !layer.is_null() {
                let black: ObjcId = msg_send![class!(NSColor), blackColor];
                let cg_black: *const std::ffi::c_void = msg_send![black, CGColor];
                let _: () = msg_send![layer, setBackgroundColor: cg_black];
                let _: () = msg_send![layer, setCornerRadius: radius];
                let _: () = msg_send![layer, setMasksToBounds: YES];
            }
        }

        let _: () = msg_send![panel, orderFrontRegardless];
        Some(panel as usize)
    }
}

/// Runs `apply` on the panel inside an animation group when animated.
///
/// # Safety
///
/// Must run on the main thread with a live panel.
unsafe fn with_transition(panel: ObjcId, transition: Transition, apply: impl FnOnce(ObjcId)) {
    match transition {
        Transition::Immediate => apply(panel),
        Transition::Animated(duration) => unsafe {
            let _: () = msg_send![class!(NSAnimationContext), beginGrouping];
            let context: ObjcId = msg_send![class!(NSAnimationContext), currentContext];
            let _: () = msg_send![context, setDuration: duration.as_secs_f64()];
            let animator: ObjcId = msg_send![panel, animator];
            apply(animator);
            let _: () = msg_send![class!(NSAnimationContext), endGrouping];
        },
    }
}

impl WindowBackend for MacBackend {
    fn create_window(
        &mut self,
        frame: Rect,
        content: &ContentSurface,
    ) -> Result<WindowHandle, OvernotchError> {
        let cg_frame = cg_rect(frame);
        let radius = corner_radius(content);
        let panel = run_on_main_sync(move || unsafe { create_panel(cg_frame, radius) })
            .ok_or_else(|| OvernotchError::WindowError("NSPanel allocation returned nil".to_string()))?;

        self.next_handle += 1;
        let handle = WindowHandle(self.next_handle);
        self.panels.insert(handle, panel);

        tracing::debug!(window = %handle, ?frame, "overnotch: window: panel created");
        Ok(handle)
    }

    fn set_frame(&mut self, handle: WindowHandle, frame: Rect, transition: Transition) {
        let Some(panel) = self.panel(handle) else { return };
        let cg_frame = cg_rect(frame);

        dispatch_on_main(move || unsafe {
            with_transition(panel as ObjcId, transition, |target| {
                let _: () = msg_send![target, setFrame: cg_frame display: YES];
            });
        });
    }

    fn set_alpha(&mut self, handle: WindowHandle, alpha: f64, transition: Transition) {
        let Some(panel) = self.panel(handle) else { return };

        dispatch_on_main(move || unsafe {
            with_transition(panel as ObjcId, transition, |target| {
                let _: () = msg_send![target, setAlphaValue: alpha];
            });
        });
    }

    fn set_content(&mut self, handle: WindowHandle, content: &ContentSurface) {
        let Some(panel) = self.panel(handle) else { return };
        let radius = corner_radius(content);

        dispatch_on_main(move || unsafe {
            let view: ObjcId = msg_send![panel as ObjcId, contentView];
            if view.is_null() {
                return;
            }
            let layer: ObjcId = msg_send![view, layer];
            if !layer.is_null() {
                let _: () = msg_send![layer, setCornerRadius: radius];
            }
        });
    }

    fn destroy_window(&mut self, handle: WindowHandle) {
        let Some(panel) = self.panels.remove(&handle) else { return };

        dispatch_on_main(move || unsafe {
            let panel = panel as ObjcId;
            let _: () = msg_send![panel, orderOut: std::ptr::null_mut::<Object>()];
            let _: () = msg_send![panel, close];
            let _: () = msg_send![panel, release];
        });
        tracing::debug!(window = %handle, "overnotch: window: panel destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cg_rect_conversion() {
        let rect = cg_rect(Rect::new(810.0, 1048.0, 300.0, 32.0));
        assert!((rect.origin.x - 810.0).abs() < f64::EPSILON);
        assert!((rect.size.height - 32.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_style_mask_is_nonactivating() {
        let style = NS_WINDOW_STYLE_MASK_BORDERLESS | NS_WINDOW_STYLE_MASK_NONACTIVATING_PANEL;
        assert_eq!(style, 0x80);
    }

    #[test]
    fn test_unknown_handle_is_ignored() {
        let mut backend = MacBackend::new();
        backend.set_alpha(WindowHandle(42), 0.0, Transition::Immediate);
        backend.destroy_window(WindowHandle(42));
        assert!(backend.panels.is_empty());
    }
}
