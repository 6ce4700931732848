//! Display detection on macOS.
//!
//! Enumerates displays through `NSScreen`. Frames are kept in `AppKit`'s
//! native bottom-left coordinate space, which is also what window frames
//! and `NSEvent.mouseLocation` use, so no conversion is needed.

use core_graphics::geometry::{CGPoint, CGRect};
use objc::runtime::Object;
use objc::{class, msg_send, sel, sel_impl};

use super::{DisplayId, DisplayIdentity, DisplaySource};
use crate::geometry::{Point, Rect};
use crate::platform::objc::{nsstring, nsstring_to_string};
use crate::platform::thread::run_on_main_sync;

#[link(name = "CoreGraphics", kind = "framework")]
unsafe extern "C" {
    fn CGMainDisplayID() -> u32;
}

#[link(name = "AppKit", kind = "framework")]
unsafe extern "C" {}

impl From<CGRect> for Rect {
    fn from(rect: CGRect) -> Self {
        Self::new(rect.origin.x, rect.origin.y, rect.size.width, rect.size.height)
    }
}

/// Display source backed by `NSScreen`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MacDisplays;

impl DisplaySource for MacDisplays {
    fn displays(&self) -> Vec<DisplayIdentity> { run_on_main_sync(|| unsafe { all_screens() }) }

    fn main_display(&self) -> Option<DisplayId> {
        let id = unsafe { CGMainDisplayID() };
        (id != 0).then_some(DisplayId(id))
    }

    fn pointer_location(&self) -> Option<Point> {
        let location: CGPoint = unsafe { msg_send![class!(NSEvent), mouseLocation] };
        Some(Point::new(location.x, location.y))
    }
}

/// Reads all connected screens.
///
/// # Safety
///
/// Must run on the main thread with the Objective-C runtime initialized.
unsafe fn all_screens() -> Vec<DisplayIdentity> {
    unsafe {
        let mut displays = Vec::new();

        let ns_screens: *mut Object = msg_send![class!(NSScreen), screens];
        if ns_screens.is_null() {
            tracing::warn!("overnotch: display: failed to get screens array");
            return displays;
        }

        let count: usize = msg_send![ns_screens, count];
        for i in 0..count {
            let ns_screen: *mut Object = msg_send![ns_screens, objectAtIndex: i];
            if ns_screen.is_null() {
                continue;
            }

            let frame: CGRect = msg_send![ns_screen, frame];
            let id = screen_number(ns_screen);
            let name = screen_name(ns_screen, id);

            displays.push(DisplayIdentity::new(name, frame.into(), DisplayId(id)));
        }

        displays
    }
}

/// Reads `NSScreenNumber` from the screen's device description.
///
/// # Safety
///
/// `ns_screen` must be a valid `NSScreen` pointer.
unsafe fn screen_number(ns_screen: *mut Object) -> u32 {
    unsafe {
        let device_desc: *mut Object = msg_send![ns_screen, deviceDescription];
        if device_desc.is_null() {
            return 0;
        }

        let key = nsstring("NSScreenNumber");
        let number: *mut Object = msg_send![device_desc, objectForKey: key];
        if number.is_null() {
            return 0;
        }

        msg_send![number, unsignedIntValue]
    }
}

/// Returns the localized screen name, or a name derived from the display ID.
///
/// # Safety
///
/// `ns_screen` must be a valid `NSScreen` pointer.
unsafe fn screen_name(ns_screen: *mut Object, display_id: u32) -> String {
    unsafe {
        let localized: *mut Object = msg_send![ns_screen, localizedName];
        let name = nsstring_to_string(localized);

        if name.is_empty() { format!("Display {display_id}") } else { name }
    }
}
