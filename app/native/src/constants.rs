//! Internal constants for overlay tuning.
//!
//! Constants are grouped by functionality:
//! - `timing` - Auto-close, animation and settle delays
//! - `geometry` - Placement thresholds
//! - `stats` - Stats tab sizing
//! - `notch` - Default notch sizes

/// Timing constants for scheduled callbacks and animations.
pub mod timing {
    use std::time::Duration;

    /// Delay after which an opened notch closes itself.
    pub const AUTO_CLOSE_DELAY: Duration = Duration::from_millis(3000);

    /// Duration of the ease transition used when resizing a window in place.
    pub const RESIZE_ANIMATION: Duration = Duration::from_millis(300);

    /// Duration of each half of a cross-display move (fade out, then fade in).
    pub const CROSS_DISPLAY_FADE: Duration = Duration::from_millis(200);

    /// Grace period after unlock before windows are rebuilt.
    ///
    /// macOS re-enumerates displays right after unlock; rebuilding earlier
    /// races that enumeration and places windows on stale frames.
    pub const UNLOCK_SETTLE_DELAY: Duration = Duration::from_millis(500);

    /// Default sneak peek duration when the trigger does not specify one.
    pub const SNEAK_PEEK_DURATION: Duration = Duration::from_millis(1500);

    /// Debounce window for configuration file events (ms).
    ///
    /// Some editors trigger multiple events per save (write to temp, rename, etc.).
    pub const CONFIG_DEBOUNCE_MS: u64 = 200;
}

/// Placement thresholds.
pub mod geometry {
    /// Minimum change in points before a window is repositioned.
    pub const REPOSITION_THRESHOLD_PX: f64 = 0.5;
}

/// Stats tab sizing.
pub mod stats {
    /// Number of graphs that fit in the base open width.
    pub const GRAPH_THRESHOLD: usize = 3;

    /// Extra width added for every graph beyond the threshold.
    pub const GRAPH_WIDTH: f64 = 120.0;
}

/// Default notch sizes.
pub mod notch {
    /// Default closed notch width.
    pub const CLOSED_WIDTH: f64 = 185.0;

    /// Default closed notch height.
    pub const CLOSED_HEIGHT: f64 = 32.0;

    /// Default open notch width.
    pub const OPEN_WIDTH: f64 = 640.0;

    /// Default open notch height.
    pub const OPEN_HEIGHT: f64 = 190.0;
}
