//! Poll event publisher.
//!
//! Mutations announce what changed so whatever caches or views sit in front
//! of the service can refresh. The poll service never fails a mutation
//! because publishing failed.

use async_trait::async_trait;
use pollbox_common::{AppError, AppResult};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Something that changed about a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    /// A poll was created.
    Created { id: String },
    /// A poll's fields or options were edited.
    Updated { id: String },
    /// A poll was removed.
    Deleted { id: String },
    /// A vote was counted.
    Voted { poll_id: String, option_id: String },
}

impl PollEvent {
    /// Id of the poll this event concerns.
    #[must_use]
    pub fn poll_id(&self) -> &str {
        match self {
            Self::Created { id } | Self::Updated { id } | Self::Deleted { id } => id,
            Self::Voted { poll_id, .. } => poll_id,
        }
    }

    /// View paths whose rendering is stale after this event.
    #[must_use]
    pub fn affected_paths(&self) -> Vec<String> {
        match self {
            Self::Created { .. } | Self::Deleted { .. } => vec!["/polls".to_string()],
            Self::Updated { id } => vec!["/polls".to_string(), format!("/polls/{id}")],
            Self::Voted { poll_id, .. } => vec![format!("/polls/{poll_id}")],
        }
    }
}

/// Trait for publishing poll events.
#[async_trait]
pub trait PollEventPublisher: Send + Sync {
    /// Publish one event.
    async fn publish(&self, event: PollEvent) -> AppResult<()>;
}

/// A no-op implementation for tests or when nothing listens.
#[derive(Clone, Default)]
pub struct NoOpPollEventPublisher;

#[async_trait]
impl PollEventPublisher for NoOpPollEventPublisher {
    async fn publish(&self, _event: PollEvent) -> AppResult<()> {
        Ok(())
    }
}

/// Publishes events on an in-process broadcast channel.
#[derive(Clone)]
pub struct BroadcastPollEventPublisher {
    sender: broadcast::Sender<PollEvent>,
}

impl BroadcastPollEventPublisher {
    /// Create a publisher buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PollEvent> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl PollEventPublisher for BroadcastPollEventPublisher {
    async fn publish(&self, event: PollEvent) -> AppResult<()> {
        if self.sender.receiver_count() == 0 {
            return Ok(());
        }
        self.sender
            .send(event)
            .map(|_| ())
            .map_err(|e| AppError::Internal(format!("Failed to publish poll event: {e}")))
    }
}

/// Wrapper for boxed `PollEventPublisher` trait object.
pub type PollEventPublisherService = Arc<dyn PollEventPublisher>;
