//! Objective-C helper utilities for macOS integration.
//!
//! Provides `NSString` conversions used by display detection, the lock
//! observer and the window backend.

use std::ffi::c_void;

use objc::runtime::Object;
use objc::{class, msg_send, sel, sel_impl};

/// Creates an `NSString` from a Rust string slice.
///
/// # Safety
///
/// The caller must ensure that the Objective-C runtime is properly initialized.
///
/// # Returns
///
/// A pointer to an `NSString` object. The returned object is autoreleased.
#[must_use]
pub unsafe fn nsstring(s: &str) -> *mut Object {
    let nsstring_class = class!(NSString);
    let bytes = s.as_ptr().cast::<c_void>();
    let len = s.len();
    let encoding: usize = 4; // NSUTF8StringEncoding

    msg_send![
        nsstring_class,
        stringWithBytes: bytes
        length: len
        encoding: encoding
    ]
}

/// Converts an `NSString` to a Rust `String`.
///
/// # Safety
///
/// `nsstring` must be either null or a valid `NSString` pointer.
///
/// # Returns
///
/// The UTF-8 contents, or an empty string if the input is null.
#[must_use]
pub unsafe fn nsstring_to_string(nsstring: *mut Object) -> String {
    if nsstring.is_null() {
        return String::new();
    }

    let c_str: *const i8 = msg_send![nsstring, UTF8String];
    if c_str.is_null() {
        return String::new();
    }

    // SAFETY: c_str is verified non-null above, and UTF8String returns a valid C string
    unsafe { std::ffi::CStr::from_ptr(c_str) }.to_string_lossy().into_owned()
}
