//! Geometry primitives and the notch placement engine.
//!
//! All frames use the `AppKit` global coordinate space: the origin is the
//! bottom-left corner of the main display and Y grows upward. A display's top
//! edge is therefore `frame.y + frame.height`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constants::stats::{GRAPH_THRESHOLD, GRAPH_WIDTH};
use crate::state::ContentTab;

// ============================================================================
// Geometric Types
// ============================================================================

/// A point in 2D space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Size {
    /// Width in points.
    pub width: f64,
    /// Height in points.
    pub height: f64,
}

impl Size {
    /// Creates a new size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self { Self { width, height } }
}

/// A rectangle defined by its origin (bottom-left corner) and size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// X coordinate of the origin.
    pub x: f64,
    /// Y coordinate of the origin.
    pub y: f64,
    /// Width of the rectangle.
    pub width: f64,
    /// Height of the rectangle.
    pub height: f64,
}

impl Rect {
    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Smallest X coordinate.
    #[must_use]
    pub const fn min_x(&self) -> f64 { self.x }

    /// Smallest Y coordinate.
    #[must_use]
    pub const fn min_y(&self) -> f64 { self.y }

    /// Largest Y coordinate (the top edge in `AppKit` coordinates).
    #[must_use]
    pub fn max_y(&self) -> f64 { self.y + self.height }

    /// Returns the size of the rectangle.
    #[must_use]
    pub const fn size(&self) -> Size { Size::new(self.width, self.height) }

    /// Returns whether a point is inside the rectangle.
    ///
    /// The left and bottom edges are inclusive, the right and top edges are
    /// exclusive, so a point on the border between two side-by-side displays
    /// belongs to exactly one of them.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }

    /// Bit-exact equality, used where rectangles act as identity keys.
    #[must_use]
    pub fn same_bits(&self, other: &Self) -> bool {
        self.x.to_bits() == other.x.to_bits()
            && self.y.to_bits() == other.y.to_bits()
            && self.width.to_bits() == other.width.to_bits()
            && self.height.to_bits() == other.height.to_bits()
    }

    /// Returns whether two frames differ by more than the reposition threshold.
    #[must_use]
    pub fn differs_from(&self, other: &Self) -> bool {
        use crate::constants::geometry::REPOSITION_THRESHOLD_PX;

        (self.x - other.x).abs() > REPOSITION_THRESHOLD_PX
            || (self.y - other.y).abs() > REPOSITION_THRESHOLD_PX
            || (self.width - other.width).abs() > REPOSITION_THRESHOLD_PX
            || (self.height - other.height).abs() > REPOSITION_THRESHOLD_PX
    }
}

// ============================================================================
// Placement
// ============================================================================

/// Computes the frame of a notch window on a display.
///
/// The window is horizontally centered on the display and its top edge is
/// aligned with the display's top edge.
#[must_use]
pub fn placement(display_frame: Rect, content: Size) -> Rect {
    let x = display_frame.min_x() + (display_frame.width - content.width) / 2.0;
    let y = display_frame.min_y() + display_frame.height - content.height;
    Rect::new(x, y, content.width, content.height)
}

/// Widens a size to make room for stats graphs.
///
/// Up to three graphs fit in the base width; every graph beyond that adds
/// a fixed column.
#[must_use]
pub fn dynamic_width(base: Size, enabled_graph_count: usize) -> Size {
    if enabled_graph_count > GRAPH_THRESHOLD {
        #[allow(clippy::cast_precision_loss)]
        let extra = (enabled_graph_count - GRAPH_THRESHOLD) as f64 * GRAPH_WIDTH;
        Size::new(base.width + extra, base.height)
    } else {
        base
    }
}

/// Returns the open-notch content size for the active tab.
///
/// Only the stats tab grows, and only while the stats feature is enabled.
#[must_use]
pub fn open_content_size(
    base: Size,
    tab: ContentTab,
    stats_enabled: bool,
    enabled_graph_count: usize,
) -> Size {
    if tab == ContentTab::Stats && stats_enabled {
        dynamic_width(base, enabled_graph_count)
    } else {
        base
    }
}

// ============================================================================
// Tests
// ============================================================================
