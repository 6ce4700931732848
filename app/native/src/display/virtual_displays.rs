//! In-memory display source.
//!
//! Used for headless runs and by tests to simulate hot-plug, reconfiguration
//! and pointer movement without touching the OS.

use parking_lot::RwLock;

use super::{DisplayId, DisplayIdentity, DisplaySource};
use crate::geometry::Point;

#[derive(Debug, Default)]
struct Inner {
    displays: Vec<DisplayIdentity>,
    main: Option<DisplayId>,
    pointer: Option<Point>,
}

/// A display source whose state is set programmatically.
///
/// The first display passed in is the main display until [`Self::set_main`]
/// says otherwise.
#[derive(Debug, Default)]
pub struct VirtualDisplays {
    inner: RwLock<Inner>,
}

impl VirtualDisplays {
    /// Creates a source with the given displays.
    #[must_use]
    pub fn new(displays: Vec<DisplayIdentity>) -> Self {
        let main = displays.first().map(|d| d.id);
        Self {
            inner: RwLock::new(Inner { displays, main, pointer: None }),
        }
    }

    /// Replaces the connected displays.
    pub fn set_displays(&self, displays: Vec<DisplayIdentity>) {
        let mut inner = self.inner.write();
        if inner.main.is_none() {
            inner.main = displays.first().map(|d| d.id);
        }
        inner.displays = displays;
    }

    /// Connects an additional display.
    pub fn connect(&self, display: DisplayIdentity) {
        let mut inner = self.inner.write();
        if inner.main.is_none() {
            inner.main = Some(display.id);
        }
        inner.displays.push(display);
    }

    /// Disconnects every display with the given name.
    pub fn disconnect(&self, name: &str) { self.inner.write().displays.retain(|d| d.name != name); }

    /// Sets the main display.
    pub fn set_main(&self, id: Option<DisplayId>) { self.inner.write().main = id; }

    /// Moves the pointer.
    pub fn set_pointer(&self, point: Option<Point>) { self.inner.write().pointer = point; }
}

impl DisplaySource for VirtualDisplays {
    fn displays(&self) -> Vec<DisplayIdentity> { self.inner.read().displays.clone() }

    fn main_display(&self) -> Option<DisplayId> { self.inner.read().main }

    fn pointer_location(&self) -> Option<Point> { self.inner.read().pointer }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn display(name: &str, id: u32) -> DisplayIdentity {
        DisplayIdentity::new(name, Rect::new(0.0, 0.0, 1920.0, 1080.0), DisplayId(id))
    }

    #[test]
    fn test_first_display_is_main() {
        let source = VirtualDisplays::new(vec![display("A", 1), display("B", 2)]);
        assert_eq!(source.main_display(), Some(DisplayId(1)));
    }

    #[test]
    fn test_connect_and_disconnect() {
        let source = VirtualDisplays::default();
        assert!(source.displays().is_empty());

        source.connect(display("A", 1));
        assert_eq!(source.main_display(), Some(DisplayId(1)));
        assert_eq!(source.displays().len(), 1);

        source.disconnect("A");
        assert!(source.displays().is_empty());
    }

    #[test]
    fn test_pointer_location() {
        let source = VirtualDisplays::default();
        assert!(source.pointer_location().is_none());

        source.set_pointer(Some(Point::new(10.0, 20.0)));
        assert_eq!(source.pointer_location(), Some(Point::new(10.0, 20.0)));
    }
}
