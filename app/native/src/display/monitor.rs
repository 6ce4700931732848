//! Display topology and lock-state monitoring on macOS.
//!
//! Registers a `CGDisplayRegisterReconfigurationCallback` for hot-plug and
//! mode changes, and observes the distributed `com.apple.screenIsLocked` /
//! `com.apple.screenIsUnlocked` notifications. Every signal is published on
//! the event bus; the coordinator picks it up from there and redispatches it
//! onto its own execution context.

use std::ffi::c_void;
use std::sync::{Arc, OnceLock};

use objc::declare::ClassDecl;
use objc::runtime::{Class, Object, Sel};
use objc::{class, msg_send, sel, sel_impl};
use parking_lot::Mutex;

use crate::error::OvernotchError;
use crate::events::{EventBus, NotchEvent};
use crate::platform::objc::nsstring;
use crate::platform::thread::run_on_main_sync;
use crate::services::Service;

/// Bus the C callbacks publish to while the monitor is running.
static MONITOR_BUS: Mutex<Option<Arc<EventBus>>> = parking_lot::const_mutex(None);

static OBSERVER_CLASS: OnceLock<&'static Class> = OnceLock::new();

const SCREEN_LOCKED: &str = "com.apple.screenIsLocked";
const SCREEN_UNLOCKED: &str = "com.apple.screenIsUnlocked";

/// Display reconfiguration flags from CoreGraphics.
#[allow(non_upper_case_globals)]
mod cg_flags {
    /// Display is being reconfigured (about to change).
    pub const kCGDisplayBeginConfigurationFlag: u32 = 1 << 0;
}

#[link(name = "CoreGraphics", kind = "framework")]
unsafe extern "C" {
    fn CGDisplayRegisterReconfigurationCallback(
        callback: unsafe extern "C" fn(u32, u32, *mut c_void),
        user_info: *mut c_void,
    ) -> i32;
    fn CGDisplayRemoveReconfigurationCallback(
        callback: unsafe extern "C" fn(u32, u32, *mut c_void),
        user_info: *mut c_void,
    ) -> i32;
}

fn publish(event: &NotchEvent) {
    let bus = MONITOR_BUS.lock().clone();
    if let Some(bus) = bus {
        bus.publish(event);
    }
}

/// CoreGraphics display reconfiguration callback.
///
/// Called once per affected display; the coordinator coalesces the burst
/// into a single reconcile.
unsafe extern "C" fn display_reconfiguration_callback(
    _display: u32,
    flags: u32,
    _user_info: *mut c_void,
) {
    // Wait for the actual change
    if flags & cg_flags::kCGDisplayBeginConfigurationFlag != 0 {
        return;
    }

    tracing::debug!(flags, "overnotch: display: configuration changed");
    publish(&NotchEvent::DisplayConfigurationChanged);
}

extern "C" fn screen_locked(_: &Object, _: Sel, _: *mut Object) {
    tracing::info!("overnotch: display: screen locked");
    publish(&NotchEvent::ScreenLocked);
}

extern "C" fn screen_unlocked(_: &Object, _: Sel, _: *mut Object) {
    tracing::info!("overnotch: display: screen unlocked");
    publish(&NotchEvent::ScreenUnlocked);
}

fn observer_class() -> Option<&'static Class> {
    if let Some(class) = OBSERVER_CLASS.get() {
        return Some(class);
    }

    let class = Class::get("OvernotchLockObserver").or_else(|| {
        let mut decl = ClassDecl::new("OvernotchLockObserver", class!(NSObject))?;
        unsafe {
            decl.add_method(
                sel!(screenLocked:),
                screen_locked as extern "C" fn(&Object, Sel, *mut Object),
            );
            decl.add_method(
                sel!(screenUnlocked:),
                screen_unlocked as extern "C" fn(&Object, Sel, *mut Object),
            );
        }
        Some(decl.register())
    })?;

    Some(OBSERVER_CLASS.get_or_init(|| class))
}

/// Service publishing display and lock-state changes to the event bus.
pub struct DisplayMonitor {
    bus: Arc<EventBus>,
    /// Retained `OvernotchLockObserver` instance, stored as an address.
    observer: Option<usize>,
    callback_registered: bool,
}

impl DisplayMonitor {
    /// Creates a monitor that publishes to `bus` once started.
    #[must_use]
    pub const fn new(bus: Arc<EventBus>) -> Self {
        Self {
            bus,
            observer: None,
            callback_registered: false,
        }
    }

    fn add_lock_observer() -> Option<usize> {
        let class = observer_class()?;

        run_on_main_sync(move || unsafe {
            let observer: *mut Object = msg_send![class, new];
            if observer.is_null() {
                return None;
            }

            let center: *mut Object = msg_send![class!(NSDistributedNotificationCenter), defaultCenter];
            let nil: *mut Object = std::ptr::null_mut();
            let _: () = msg_send![center, addObserver: observer
                                            selector: sel!(screenLocked:)
                                                name: nsstring(SCREEN_LOCKED)
                                              object: nil];
            let _: () = msg_send![center, addObserver: observer
                                            selector: sel!(screenUnlocked:)
                                                name: nsstring(SCREEN_UNLOCKED)
                                              object: nil];
            Some(observer as usize)
        })
    }

    fn remove_lock_observer(observer: usize) {
        run_on_main_sync(move || unsafe {
            let observer = observer as *mut Object;
            let center: *mut Object = msg_send![class!(NSDistributedNotificationCenter), defaultCenter];
            let _: () = msg_send![center, removeObserver: observer];
            let _: () = msg_send![observer, release];
        });
    }
}

impl Service for DisplayMonitor {
    fn name(&self) -> &'static str { "display-monitor" }

    fn start(&mut self) -> Result<(), OvernotchError> {
        *MONITOR_BUS.lock() = Some(Arc::clone(&self.bus));

        let result = unsafe {
            CGDisplayRegisterReconfigurationCallback(
                display_reconfiguration_callback,
                std::ptr::null_mut(),
            )
        };
        if result != 0 {
            *MONITOR_BUS.lock() = None;
            return Err(OvernotchError::ServiceError(format!(
                "failed to register display reconfiguration callback: {result}"
            )));
        }
        self.callback_registered = true;

        self.observer = Self::add_lock_observer();
        if self.observer.is_none() {
            tracing::warn!("overnotch: display: lock observer unavailable, lock events disabled");
        }

        tracing::info!("overnotch: display: monitor started");
        Ok(())
    }

    fn stop(&mut self) {
        if self.callback_registered {
            unsafe {
                CGDisplayRemoveReconfigurationCallback(
                    display_reconfiguration_callback,
                    std::ptr::null_mut(),
                );
            }
            self.callback_registered = false;
        }

        if let Some(observer) = self.observer.take() {
            Self::remove_lock_observer(observer);
        }

        *MONITOR_BUS.lock() = None;
        tracing::info!("overnotch: display: monitor stopped");
    }
}
