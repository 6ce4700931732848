//! Messages for the notch actor.

use tokio::sync::oneshot;

use crate::coordinator::{NotchQuery, QueryResult};
use crate::scheduler::{ScheduledTask, TaskId};
use crate::toggle::InputEvent;

/// Messages sent to the notch actor.
#[derive(Debug)]
pub enum NotchMessage {
    /// Bring windows in line with displays and preferences.
    Reconcile,

    /// Re-apply notch sizes to every window.
    ResizeAll,

    /// A discrete input event for the view under the pointer.
    Input(InputEvent),

    /// The screen was locked.
    ScreenLocked,

    /// The screen was unlocked.
    ScreenUnlocked,

    /// A scheduled task's delay elapsed.
    TaskFired { id: TaskId, task: ScheduledTask },

    /// Read coordinator state.
    Query {
        query: NotchQuery,
        respond_to: oneshot::Sender<QueryResult>,
    },

    /// Destroy every window and stop the actor.
    Shutdown,
}

impl NotchMessage {
    /// Returns the message name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Reconcile => "Reconcile",
            Self::ResizeAll => "ResizeAll",
            Self::Input(_) => "Input",
            Self::ScreenLocked => "ScreenLocked",
            Self::ScreenUnlocked => "ScreenUnlocked",
            Self::TaskFired { .. } => "TaskFired",
            Self::Query { .. } => "Query",
            Self::Shutdown => "Shutdown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_names() {
        assert_eq!(NotchMessage::Reconcile.name(), "Reconcile");
        assert_eq!(NotchMessage::Input(InputEvent::ToggleNotchOpen).name(), "Input");

        let (tx, _rx) = oneshot::channel();
        let query = NotchMessage::Query { query: NotchQuery::Stats, respond_to: tx };
        assert_eq!(query.name(), "Query");
    }
}
