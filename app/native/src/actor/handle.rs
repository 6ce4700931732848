//! Handle for communicating with the notch actor.
//!
//! The handle is cheap to clone and usable from any thread: OS callbacks,
//! the preference watcher and the scheduler all post through it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use super::messages::NotchMessage;
use crate::coordinator::{CoordinatorStats, NotchQuery, OverlaySnapshot, QueryResult};
use crate::scheduler::TaskSink;
use crate::toggle::InputEvent;

/// Channel buffer size for the notch actor.
const CHANNEL_BUFFER_SIZE: usize = 256;

/// How long the typed query helpers wait for an answer.
const QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Error types for actor communication.
#[derive(Debug, thiserror::Error)]
pub enum ActorError {
    /// Failed to send message to actor.
    #[error("Failed to send message to actor: channel closed")]
    SendFailed,

    /// Failed to receive response from actor.
    #[error("Failed to receive response from actor: channel closed")]
    ReceiveFailed,

    /// Query timed out.
    #[error("Query timed out after {0:?}")]
    Timeout(Duration),

    /// The actor answered a different query.
    #[error("Unexpected response from actor")]
    UnexpectedResponse,
}

/// Creates a connected handle and mailbox.
#[must_use]
pub fn channel() -> (NotchActorHandle, Mailbox) {
    let (sender, receiver) = mpsc::channel(CHANNEL_BUFFER_SIZE);
    let (session_sender, session) = mpsc::unbounded_channel();
    let reconcile_queued = Arc::new(AtomicBool::new(false));

    let handle = NotchActorHandle {
        sender,
        session: session_sender,
        reconcile_queued: Arc::clone(&reconcile_queued),
    };
    (handle, Mailbox { receiver, session, reconcile_queued })
}

/// Receiving end of the actor channel.
#[derive(Debug)]
pub struct Mailbox {
    receiver: mpsc::Receiver<NotchMessage>,
    /// Lock and unlock notifications. Unbounded and served first, so a full
    /// mailbox can never leave windows up on a locked screen.
    session: mpsc::UnboundedReceiver<NotchMessage>,
    reconcile_queued: Arc<AtomicBool>,
}

impl Mailbox {
    /// Waits for the next message. Returns `None` once every handle is gone.
    pub async fn recv(&mut self) -> Option<NotchMessage> {
        tokio::select! {
            biased;
            Some(msg) = self.session.recv() => Some(msg),
            msg = self.receiver.recv() => msg,
        }
    }

    /// Takes the next message if one is queued.
    pub fn try_recv(&mut self) -> Option<NotchMessage> {
        self.session.try_recv().or_else(|_| self.receiver.try_recv()).ok()
    }

    /// Marks the queued reconcile as started, so new requests queue another.
    pub(super) fn reconcile_started(&self) { self.reconcile_queued.store(false, Ordering::SeqCst); }
}

/// Handle for communicating with the notch actor.
#[derive(Clone)]
pub struct NotchActorHandle {
    sender: mpsc::Sender<NotchMessage>,
    session: mpsc::UnboundedSender<NotchMessage>,
    reconcile_queued: Arc<AtomicBool>,
}

impl NotchActorHandle {
    // ========================================================================
    // Fire-and-forget sending
    // ========================================================================

    /// Sends a message without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed or full.
    pub fn send(&self, msg: NotchMessage) -> Result<(), ActorError> {
        self.sender.try_send(msg).map_err(|_| ActorError::SendFailed)
    }

    /// Sends a message, waiting for buffer space.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed.
    pub async fn send_async(&self, msg: NotchMessage) -> Result<(), ActorError> {
        self.sender.send(msg).await.map_err(|_| ActorError::SendFailed)
    }

    /// Requests a reconcile.
    ///
    /// Requests made while one is already queued collapse into it; a burst
    /// of display or preference changes costs a single pass.
    pub fn request_reconcile(&self) {
        if self.reconcile_queued.swap(true, Ordering::SeqCst) {
            tracing::trace!("overnotch: actor: reconcile already queued");
            return;
        }
        if let Err(err) = self.send(NotchMessage::Reconcile) {
            self.reconcile_queued.store(false, Ordering::SeqCst);
            tracing::warn!(error = %err, "overnotch: actor: failed to queue reconcile");
        }
    }

    /// Requests a resize of every window.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the actor has stopped.
    pub fn resize_all(&self) -> Result<(), ActorError> { self.send(NotchMessage::ResizeAll) }

    /// Delivers an input event.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the actor has stopped.
    pub fn input(&self, event: InputEvent) -> Result<(), ActorError> {
        self.send(NotchMessage::Input(event))
    }

    /// Reports that the screen locked.
    ///
    /// Never dropped for lack of buffer space and handled ahead of queued
    /// messages.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the actor has stopped.
    pub fn screen_locked(&self) -> Result<(), ActorError> {
        self.session.send(NotchMessage::ScreenLocked).map_err(|_| ActorError::SendFailed)
    }

    /// Reports that the screen unlocked. Ordered after any earlier lock.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the actor has stopped.
    pub fn screen_unlocked(&self) -> Result<(), ActorError> {
        self.session.send(NotchMessage::ScreenUnlocked).map_err(|_| ActorError::SendFailed)
    }

    /// Asks the actor to tear down and exit.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the actor has already stopped.
    pub async fn shutdown(&self) -> Result<(), ActorError> {
        self.send_async(NotchMessage::Shutdown).await
    }

    /// Returns a scheduler sink that posts fired tasks to this actor.
    #[must_use]
    pub fn task_sink(&self) -> TaskSink {
        let handle = self.clone();
        Arc::new(move |id, task| {
            if let Err(err) = handle.send(NotchMessage::TaskFired { id, task }) {
                tracing::warn!(task = task.name(), error = %err, "overnotch: actor: dropped fired task");
            }
        })
    }

    // ========================================================================
    // Query methods
    // ========================================================================

    /// Executes a query and waits for the result.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed, or
    /// [`ActorError::ReceiveFailed`] if the response channel is closed.
    pub async fn query(&self, query: NotchQuery) -> Result<QueryResult, ActorError> {
        let (tx, rx) = oneshot::channel();

        self.sender
            .send(NotchMessage::Query { query, respond_to: tx })
            .await
            .map_err(|_| ActorError::SendFailed)?;

        rx.await.map_err(|_| ActorError::ReceiveFailed)
    }

    /// Executes a query with a timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::Timeout`] if the query doesn't complete in time,
    /// or any error from [`Self::query`].
    pub async fn query_timeout(
        &self,
        query: NotchQuery,
        timeout: Duration,
    ) -> Result<QueryResult, ActorError> {
        tokio::time::timeout(timeout, self.query(query))
            .await
            .map_err(|_| ActorError::Timeout(timeout))?
    }

    /// Snapshots every overlay.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the actor fails or it does
    /// not answer in time.
    pub async fn overlays(&self) -> Result<Vec<OverlaySnapshot>, ActorError> {
        self.query_timeout(NotchQuery::Overlays, QUERY_TIMEOUT)
            .await?
            .into_overlays()
            .ok_or(ActorError::UnexpectedResponse)
    }

    /// Snapshots the default view.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the actor fails.
    pub async fn primary(&self) -> Result<OverlaySnapshot, ActorError> {
        self.query_timeout(NotchQuery::Primary, QUERY_TIMEOUT)
            .await?
            .into_primary()
            .ok_or(ActorError::UnexpectedResponse)
    }

    /// Reads lifecycle counters.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the actor fails.
    pub async fn stats(&self) -> Result<CoordinatorStats, ActorError> {
        self.query_timeout(NotchQuery::Stats, QUERY_TIMEOUT)
            .await?
            .into_stats()
            .ok_or(ActorError::UnexpectedResponse)
    }

    // ========================================================================
    // Status
    // ========================================================================

    /// Checks if the actor is still running (channel is open).
    #[must_use]
    pub fn is_alive(&self) -> bool { !self.sender.is_closed() }

    /// Number of messages waiting in the queue.
    #[must_use]
    pub fn pending_messages(&self) -> usize { self.sender.max_capacity() - self.sender.capacity() }
}

impl std::fmt::Debug for NotchActorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotchActorHandle")
            .field("alive", &self.is_alive())
            .field("pending", &self.pending_messages())
            .finish()
    }
}
