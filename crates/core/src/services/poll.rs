//! Poll service.

use pollbox_common::{AppError, AppResult};
use serde::Serialize;

use crate::{
    model::{Poll, PollOption, PollSummary, Vote},
    services::event_publisher::{
        NoOpPollEventPublisher, PollEvent, PollEventPublisherService,
    },
    store::{NewPoll, PollStoreService, PollUpdate, StoreError},
    tally::{OptionResult, tally},
    validation::{validate_create, validate_delete, validate_update, validate_vote},
};

/// Poll service for business logic.
#[derive(Clone)]
pub struct PollService {
    store: PollStoreService,
    events: PollEventPublisherService,
}

/// Input for creating a poll.
#[derive(Debug, Clone)]
pub struct CreatePollInput {
    pub title: String,
    pub description: String,
    pub options: Vec<String>,
    /// Defaults to active.
    pub is_active: Option<bool>,
}

/// Input for updating a poll.
#[derive(Debug, Clone)]
pub struct UpdatePollInput {
    pub id: String,
    pub title: String,
    pub description: String,
    pub options: Vec<PollOption>,
    /// `None` leaves the poll open or closed as it was.
    pub is_active: Option<bool>,
}

/// Input for casting a vote.
#[derive(Debug, Clone)]
pub struct VoteInput {
    pub poll_id: String,
    pub option_id: String,
}

/// Display-ready results of a poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResults {
    pub poll_id: String,
    pub total_votes: u64,
    pub is_active: bool,
    pub options: Vec<OptionResult>,
}

impl PollService {
    /// Create a new poll service.
    #[must_use]
    pub fn new(store: PollStoreService, events: PollEventPublisherService) -> Self {
        Self { store, events }
    }

    /// Create a poll service that publishes nowhere.
    #[must_use]
    pub fn with_store(store: PollStoreService) -> Self {
        Self::new(store, std::sync::Arc::new(NoOpPollEventPublisher))
    }

    /// Create a poll.
    pub async fn create_poll(&self, input: CreatePollInput) -> AppResult<Poll> {
        let validated =
            validate_create(&input.title, &input.description, input.options.as_slice())?;

        let poll = self
            .store
            .insert(NewPoll {
                title: validated.title,
                description: validated.description,
                options: validated.options,
                is_active: input.is_active.unwrap_or(true),
            })
            .await
            .map_err(|e| store_error("create poll", e))?;

        tracing::info!(poll_id = %poll.id, options = poll.options.len(), "Poll created");
        self.publish(PollEvent::Created {
            id: poll.id.clone(),
        })
        .await;

        Ok(poll)
    }

    /// Get a poll by ID.
    pub async fn get_poll(&self, id: &str) -> AppResult<Poll> {
        self.store
            .get(id)
            .await
            .map_err(|e| store_error("fetch poll", e))?
            .ok_or_else(|| AppError::NotFound(format!("Poll not found: {id}")))
    }

    /// List polls, newest first.
    pub async fn list_polls(&self, limit: usize, offset: usize) -> AppResult<Vec<PollSummary>> {
        let polls = self
            .store
            .list()
            .await
            .map_err(|e| store_error("fetch polls", e))?;

        Ok(polls
            .iter()
            .skip(offset)
            .take(limit)
            .map(Poll::summary)
            .collect())
    }

    /// Update a poll.
    ///
    /// Existing options are matched by id and keep their votes; options with
    /// an empty or unknown id are added with zero votes.
    pub async fn update_poll(&self, input: UpdatePollInput) -> AppResult<Poll> {
        validate_update(&input.id, &input.title, &input.description, &input.options)?;

        let poll = self
            .store
            .update(PollUpdate {
                id: input.id,
                title: input.title,
                description: input.description,
                is_active: input.is_active,
                options: input.options,
            })
            .await
            .map_err(|e| store_error("update poll", e))?;

        tracing::info!(poll_id = %poll.id, is_active = poll.is_active, "Poll updated");
        self.publish(PollEvent::Updated {
            id: poll.id.clone(),
        })
        .await;

        Ok(poll)
    }

    /// Delete a poll together with its options and votes.
    pub async fn delete_poll(&self, id: &str) -> AppResult<()> {
        validate_delete(id)?;

        let existed = self
            .store
            .delete(id)
            .await
            .map_err(|e| store_error("delete poll", e))?;
        if !existed {
            return Err(AppError::NotFound(format!("Poll not found: {id}")));
        }

        tracing::info!(poll_id = %id, "Poll deleted");
        self.publish(PollEvent::Deleted { id: id.to_string() })
            .await;

        Ok(())
    }

    /// Vote on a poll.
    pub async fn vote(&self, input: VoteInput) -> AppResult<Poll> {
        validate_vote(&input.poll_id, &input.option_id)?;

        let vote = Vote {
            poll_id: input.poll_id,
            option_id: input.option_id,
        };
        let poll = self
            .store
            .record_vote(&vote)
            .await
            .map_err(|e| store_error("submit vote", e))?;

        tracing::debug!(poll_id = %vote.poll_id, option_id = %vote.option_id, "Vote recorded");
        self.publish(PollEvent::Voted {
            poll_id: vote.poll_id,
            option_id: vote.option_id,
        })
        .await;

        Ok(poll)
    }

    /// Get a poll's results with per-option percentages.
    pub async fn results(&self, id: &str) -> AppResult<PollResults> {
        let poll = self.get_poll(id).await?;

        Ok(PollResults {
            options: tally(&poll),
            poll_id: poll.id,
            total_votes: poll.total_votes,
            is_active: poll.is_active,
        })
    }

    async fn publish(&self, event: PollEvent) {
        if let Err(e) = self.events.publish(event).await {
            tracing::warn!(error = %e, "Failed to publish poll event");
        }
    }
}

/// Map a store failure onto the error shown to the caller.
///
/// Backend failures are logged with their cause and reported generically.
fn store_error(operation: &str, err: StoreError) -> AppError {
    match err {
        StoreError::PollNotFound(id) => AppError::NotFound(format!("Poll not found: {id}")),
        StoreError::OptionNotFound { .. } => {
            AppError::BadRequest("Invalid option for this poll".to_string())
        }
        StoreError::PollClosed(_) => {
            AppError::Conflict("Poll is closed and no longer accepting votes".to_string())
        }
        StoreError::Backend(cause) => {
            tracing::error!(operation, cause = %cause, "Poll store failure");
            AppError::Internal(format!("Failed to {operation}"))
        }
    }
}
