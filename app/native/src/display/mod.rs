//! Display detection and topology diffing.
//!
//! A [`DisplaySource`] reads the connected displays from the OS. The
//! [`DisplayRegistry`] wraps a source and computes what changed between two
//! snapshots, so the coordinator never compares raw OS handles itself.

#[cfg(target_os = "macos")]
pub mod macos;
#[cfg(target_os = "macos")]
pub mod monitor;
mod virtual_displays;

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::Serialize;
use smallvec::SmallVec;

pub use virtual_displays::VirtualDisplays;

use crate::geometry::{Point, Rect};

// ============================================================================
// Display Identity
// ============================================================================

/// Opaque OS handle of a display.
///
/// Handles can be recreated by the OS across reconfiguration, so they are
/// only a hint and never part of a display's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DisplayId(pub u32);

/// A connected display.
///
/// Two identities are equal when their name and frame are equal; the OS
/// handle is ignored. This makes the type usable as a map key across
/// reconfiguration events.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayIdentity {
    /// Human-readable name reported by the OS (e.g. "Built-in Retina Display").
    pub name: String,
    /// Full frame of the display in global coordinates.
    pub frame: Rect,
    /// OS handle at the time of the snapshot.
    pub id: DisplayId,
}

impl DisplayIdentity {
    /// Creates a new display identity.
    #[must_use]
    pub fn new(name: impl Into<String>, frame: Rect, id: DisplayId) -> Self {
        Self { name: name.into(), frame, id }
    }

    /// Returns whether `point` lies on this display.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool { self.frame.contains(point) }
}

impl PartialEq for DisplayIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.frame.same_bits(&other.frame)
    }
}

impl Eq for DisplayIdentity {}

impl Hash for DisplayIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.frame.x.to_bits().hash(state);
        self.frame.y.to_bits().hash(state);
        self.frame.width.to_bits().hash(state);
        self.frame.height.to_bits().hash(state);
    }
}

impl std::fmt::Display for DisplayIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}x{} at {},{})",
            self.name, self.frame.width, self.frame.height, self.frame.x, self.frame.y
        )
    }
}

// ============================================================================
// Display Source
// ============================================================================

/// Reads display state from the OS.
///
/// Implementations must be cheap to call repeatedly; the coordinator takes
/// a fresh snapshot on every reconcile.
pub trait DisplaySource: Send + Sync {
    /// Returns the connected displays in OS enumeration order.
    fn displays(&self) -> Vec<DisplayIdentity>;

    /// Returns the handle of the main display (the one with the menu bar).
    fn main_display(&self) -> Option<DisplayId>;

    /// Returns the current pointer location in global coordinates.
    fn pointer_location(&self) -> Option<Point>;
}

/// A point-in-time view of the connected displays.
#[derive(Debug, Clone, Default)]
pub struct DisplaySnapshot {
    /// Displays in OS enumeration order, without duplicates.
    pub displays: Vec<DisplayIdentity>,
    /// Handle of the main display, if the OS reported one.
    pub main: Option<DisplayId>,
}

impl DisplaySnapshot {
    /// Returns whether no display is connected.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.displays.is_empty() }

    /// Finds the first display with the given name.
    ///
    /// When several displays report the same name, the first one in OS
    /// enumeration order wins.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&DisplayIdentity> {
        self.displays.iter().find(|d| d.name == name)
    }

    /// Returns the main display.
    ///
    /// Falls back to the first display when the OS did not report a main
    /// display or the reported handle is not part of the snapshot.
    #[must_use]
    pub fn main_display(&self) -> Option<&DisplayIdentity> {
        self.main
            .and_then(|id| self.displays.iter().find(|d| d.id == id))
            .or_else(|| self.displays.first())
    }
}

// ============================================================================
// Diffing
// ============================================================================

/// Inline capacity for diff lists; machines rarely have more displays.
const DIFF_INLINE_CAP: usize = 4;

/// Result of comparing two display snapshots.
#[derive(Debug, Clone, Default)]
pub struct DisplayDiff {
    /// Displays only present in the new snapshot.
    pub added: SmallVec<[DisplayIdentity; DIFF_INLINE_CAP]>,
    /// Displays only present in the old snapshot.
    pub removed: SmallVec<[DisplayIdentity; DIFF_INLINE_CAP]>,
    /// Displays present in both whose frame changed, as `(old, new)`.
    pub changed: SmallVec<[(DisplayIdentity, DisplayIdentity); DIFF_INLINE_CAP]>,
}

impl DisplayDiff {
    /// Returns whether the two snapshots describe the same topology.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Snapshots displays from a source and diffs snapshots.
#[derive(Clone)]
pub struct DisplayRegistry {
    source: Arc<dyn DisplaySource>,
}

impl DisplayRegistry {
    /// Creates a registry reading from `source`.
    #[must_use]
    pub fn new(source: Arc<dyn DisplaySource>) -> Self { Self { source } }

    /// Reads the current set of connected displays.
    ///
    /// Exact duplicates (same name and frame) are collapsed to the first
    /// occurrence.
    #[must_use]
    pub fn snapshot(&self) -> DisplaySnapshot {
        let mut displays: Vec<DisplayIdentity> = Vec::new();
        for display in self.source.displays() {
            if !displays.contains(&display) {
                displays.push(display);
            }
        }

        DisplaySnapshot {
            displays,
            main: self.source.main_display(),
        }
    }

    /// Returns the current pointer location.
    #[must_use]
    pub fn pointer_location(&self) -> Option<Point> { self.source.pointer_location() }

    /// Computes the difference between two display lists.
    ///
    /// Displays equal by identity are unchanged. Of the rest, a previous and
    /// a current display with the same name are the same logical display and
    /// are reported as `changed`. Among several same-name candidates the one
    /// with the same OS handle wins. Handles are reused by the OS, so two
    /// displays with different names are never paired. Everything left over
    /// is `added` or `removed`.
    #[must_use]
    pub fn diff(previous: &[DisplayIdentity], current: &[DisplayIdentity]) -> DisplayDiff {
        let mut old: Vec<&DisplayIdentity> =
            previous.iter().filter(|d| !current.contains(d)).collect();
        let mut new: Vec<&DisplayIdentity> =
            current.iter().filter(|d| !previous.contains(d)).collect();

        let mut diff = DisplayDiff::default();

        // Same name and handle first, then same name alone.
        for matches in [same_name_and_handle as fn(&DisplayIdentity, &DisplayIdentity) -> bool, same_name] {
            let mut i = 0;
            while i < old.len() {
                if let Some(j) = new.iter().position(|n| matches(old[i], n)) {
                    diff.changed.push((old.remove(i).clone(), new.remove(j).clone()));
                } else {
                    i += 1;
                }
            }
        }

        diff.removed.extend(old.into_iter().cloned());
        diff.added.extend(new.into_iter().cloned());
        diff
    }
}

fn same_name_and_handle(a: &DisplayIdentity, b: &DisplayIdentity) -> bool {
    same_name(a, b) && a.id == b.id
}

fn same_name(a: &DisplayIdentity, b: &DisplayIdentity) -> bool { a.name == b.name }

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn display(name: &str, x: f64, id: u32) -> DisplayIdentity {
        DisplayIdentity::new(name, Rect::new(x, 0.0, 1920.0, 1080.0), DisplayId(id))
    }

    #[test]
    fn test_identity_ignores_handle() {
        let a = display("Studio Display", 0.0, 1);
        let b = display("Studio Display", 0.0, 99);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_identity_includes_frame() {
        let a = display("Studio Display", 0.0, 1);
        let b = display("Studio Display", 1920.0, 1);
        assert_ne!(a, b);
    }

    #[test]
    fn test_diff_unchanged_is_empty() {
        let displays = vec![display("A", 0.0, 1), display("B", 1920.0, 2)];
        let diff = DisplayRegistry::diff(&displays, &displays);
        assert!(diff.is_empty());
    }

    #[test]
    fn test_diff_added_and_removed() {
        let previous = vec![display("A", 0.0, 1)];
        let current = vec![display("B", 1920.0, 2)];
        let diff = DisplayRegistry::diff(&previous, &current);

        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.added[0].name, "B");
        assert_eq!(diff.removed.len(), 1);
        assert_eq!(diff.removed[0].name, "A");
        assert!(diff.changed.is_empty());
    }

    #[test]
    fn test_diff_frame_change_is_changed_not_readded() {
        let previous = vec![display("A", 0.0, 1)];
        let current = vec![display("A", 1920.0, 1)];
        let diff = DisplayRegistry::diff(&previous, &current);

        assert!(diff.added.is_empty());
        assert!(diff.removed.is_empty());
        assert_eq!(diff.changed.len(), 1);
        assert!((diff.changed[0].0.frame.x - 0.0).abs() < f64::EPSILON);
        assert!((diff.changed[0].1.frame.x - 1920.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_diff_matches_by_name_when_handle_was_recreated() {
        let previous = vec![display("A", 0.0, 1)];
        let current = vec![display("A", 0.0, 7), display("B", 1920.0, 8)];
        let diff = DisplayRegistry::diff(&previous, &current);

        // Same name and frame: identical display, only B is new
        assert!(diff.changed.is_empty());
        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.added[0].name, "B");
    }

    #[test]
    fn test_diff_prefers_handle_over_name() {
        // Two displays named "DELL" swap positions; handles tell them apart
        let previous = vec![display("DELL", 0.0, 1), display("DELL", 1920.0, 2)];
        let current = vec![display("DELL", 3840.0, 2), display("DELL", 5760.0, 1)];
        let diff = DisplayRegistry::diff(&previous, &current);

        assert_eq!(diff.changed.len(), 2);
        for (old, new) in &diff.changed {
            assert_eq!(old.id, new.id);
        }
    }

    #[test]
    fn test_diff_reused_handle_with_new_name_is_removed_and_added() {
        // The OS handed A's handle to a different monitor
        let previous = vec![display("A", 0.0, 1)];
        let current = vec![display("B", 0.0, 1)];
        let diff = DisplayRegistry::diff(&previous, &current);

        assert!(diff.changed.is_empty());
        assert_eq!(diff.removed.len(), 1);
        assert_eq!(diff.removed[0].name, "A");
        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.added[0].name, "B");
    }

    #[test]
    fn test_diff_name_match_survives_handle_change() {
        let previous = vec![display("A", 0.0, 1)];
        let current = vec![display("A", 1920.0, 5)];
        let diff = DisplayRegistry::diff(&previous, &current);

        assert_eq!(diff.changed.len(), 1);
        assert_eq!(diff.changed[0].1.id, DisplayId(5));
    }

    #[test]
    fn test_snapshot_collapses_duplicates() {
        let source = VirtualDisplays::new(vec![display("A", 0.0, 1), display("A", 0.0, 2)]);
        let registry = DisplayRegistry::new(Arc::new(source));
        assert_eq!(registry.snapshot().displays.len(), 1);
    }

    #[test]
    fn test_find_by_name_first_match_wins() {
        let snapshot = DisplaySnapshot {
            displays: vec![display("DELL", 0.0, 1), display("DELL", 1920.0, 2)],
            main: None,
        };
        assert_eq!(snapshot.find_by_name("DELL").map(|d| d.id), Some(DisplayId(1)));
        assert!(snapshot.find_by_name("dell").is_none());
    }

    #[test]
    fn test_main_display_falls_back_to_first() {
        let mut snapshot = DisplaySnapshot {
            displays: vec![display("A", 0.0, 1), display("B", 1920.0, 2)],
            main: Some(DisplayId(2)),
        };
        assert_eq!(snapshot.main_display().map(|d| d.name.as_str()), Some("B"));

        snapshot.main = Some(DisplayId(42));
        assert_eq!(snapshot.main_display().map(|d| d.name.as_str()), Some("A"));

        snapshot.displays.clear();
        assert!(snapshot.main_display().is_none());
    }
}
