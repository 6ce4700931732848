//! Delayed, cancellable work.
//!
//! Auto-close, sneak-peek expiry, cross-display fade-in and the unlock settle
//! delay are all modelled as [`ScheduledTask`]s. Scheduling returns a
//! [`TaskToken`]; cancelling the token guarantees the task is never
//! delivered. Delivered tasks still carry their [`TaskId`] so the receiver
//! can ignore a fire that raced with a replacement.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use uuid::Uuid;

/// Identifier of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(Uuid);

impl TaskId {
    fn new() -> Self { Self(Uuid::now_v7()) }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Work to perform once a delay elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledTask {
    /// Close the view's notch.
    AutoClose { view: Uuid },
    /// Hide the view's sneak peek.
    SneakPeekEnd { view: Uuid },
    /// Relocate and fade the view's window back in after a display switch.
    FadeIn { view: Uuid },
    /// The screen has been unlocked long enough to rebuild windows.
    UnlockSettled,
}

impl ScheduledTask {
    /// Returns the task name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AutoClose { .. } => "AutoClose",
            Self::SneakPeekEnd { .. } => "SneakPeekEnd",
            Self::FadeIn { .. } => "FadeIn",
            Self::UnlockSettled => "UnlockSettled",
        }
    }
}

/// Cancellable handle to a scheduled task.
#[derive(Debug)]
pub struct TaskToken {
    id: TaskId,
    cancelled: Arc<AtomicBool>,
    abort: Option<tokio::task::AbortHandle>,
}

impl TaskToken {
    /// Returns the task id.
    #[must_use]
    pub const fn id(&self) -> TaskId { self.id }

    /// Cancels the task. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(abort) = &self.abort {
            abort.abort();
        }
    }

    /// Returns whether [`Self::cancel`] was called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool { self.cancelled.load(Ordering::SeqCst) }
}

/// Issues scheduled tasks.
pub trait Scheduler: Send {
    /// Schedules `task` to be delivered after `delay`.
    fn schedule(&self, delay: Duration, task: ScheduledTask) -> TaskToken;
}

// ============================================================================
// Tokio Scheduler
// ============================================================================

/// Callback receiving fired tasks.
pub type TaskSink = Arc<dyn Fn(TaskId, ScheduledTask) + Send + Sync>;

/// Scheduler backed by tokio timers.
///
/// Each task is a spawned sleep; cancelling the token aborts it. Fired tasks
/// are handed to the sink, which normally posts them to the coordinator's
/// mailbox.
pub struct TokioScheduler {
    runtime: tokio::runtime::Handle,
    sink: TaskSink,
}

impl TokioScheduler {
    /// Creates a scheduler spawning onto `runtime`.
    #[must_use]
    pub fn new(runtime: tokio::runtime::Handle, sink: TaskSink) -> Self { Self { runtime, sink } }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: ScheduledTask) -> TaskToken {
        let id = TaskId::new();
        let cancelled = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&cancelled);
        let sink = Arc::clone(&self.sink);
        let join = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if !flag.load(Ordering::SeqCst) {
                sink(id, task);
            }
        });

        TaskToken {
            id,
            cancelled,
            abort: Some(join.abort_handle()),
        }
    }
}

// ============================================================================
// Manual Scheduler
// ============================================================================

struct Entry {
    due: Duration,
    seq: u64,
    id: TaskId,
    task: ScheduledTask,
    cancelled: Arc<AtomicBool>,
}

#[derive(Default)]
struct ManualInner {
    now: Duration,
    next_seq: u64,
    queue: Vec<Entry>,
}

/// Scheduler driven by a virtual clock.
///
/// Nothing fires on its own; [`Self::pop_due`] and [`Self::advance`] hand
/// out due tasks in deadline order. Clones share the same clock.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    inner: Arc<Mutex<ManualInner>>,
}

impl ManualScheduler {
    /// Creates a scheduler at virtual time zero.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration { self.inner.lock().now }

    /// Number of tasks scheduled and not cancelled.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner
            .lock()
            .queue
            .iter()
            .filter(|e| !e.cancelled.load(Ordering::SeqCst))
            .count()
    }

    /// Deadline of the earliest live task, as an offset from now.
    #[must_use]
    pub fn next_due_in(&self) -> Option<Duration> {
        let inner = self.inner.lock();
        inner
            .queue
            .iter()
            .filter(|e| !e.cancelled.load(Ordering::SeqCst))
            .map(|e| e.due.saturating_sub(inner.now))
            .min()
    }

    /// Removes and returns the earliest live task due at or before `until`.
    ///
    /// The clock moves forward to the task's deadline.
    pub fn pop_due(&self, until: Duration) -> Option<(TaskId, ScheduledTask)> {
        let mut inner = self.inner.lock();
        inner.queue.retain(|e| !e.cancelled.load(Ordering::SeqCst));

        let index = inner
            .queue
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= until)
            .min_by_key(|(_, e)| (e.due, e.seq))
            .map(|(i, _)| i)?;

        let entry = inner.queue.remove(index);
        inner.now = inner.now.max(entry.due);
        Some((entry.id, entry.task))
    }

    /// Moves the clock forward and returns every task that became due.
    pub fn advance(&self, by: Duration) -> Vec<(TaskId, ScheduledTask)> {
        let until = self.now() + by;
        let mut fired = Vec::new();
        while let Some(task) = self.pop_due(until) {
            fired.push(task);
        }
        self.inner.lock().now = until;
        fired
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: ScheduledTask) -> TaskToken {
        let id = TaskId::new();
        let cancelled = Arc::new(AtomicBool::new(false));

        let mut inner = self.inner.lock();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        let due = inner.now + delay;
        inner.queue.push(Entry {
            due,
            seq,
            id,
            task,
            cancelled: Arc::clone(&cancelled),
        });

        TaskToken { id, cancelled, abort: None }
    }
}
