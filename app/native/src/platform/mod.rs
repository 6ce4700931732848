//! Platform abstractions for Overnotch.
//!
//! - [`thread`] - Named threads and main-thread dispatch
//! - [`objc`] - Objective-C helper utilities (macOS only)

#[cfg(target_os = "macos")]
pub mod objc;
pub mod thread;

pub use thread::spawn_named_thread;
