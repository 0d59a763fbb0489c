//! Poll data model.
//!
//! This is the contract surface serialized by the HTTP layer, so field names
//! are camelCase on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A question with a fixed set of selectable options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub id: String,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub options: Vec<PollOption>,
    /// Always equal to the sum of the options' votes.
    pub total_votes: u64,
    pub is_active: bool,
}

/// One selectable answer within a poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollOption {
    pub id: String,
    pub text: String,
    pub votes: u64,
}

/// List view of a poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub votes_count: u64,
    pub is_active: bool,
}

/// A single ballot for one option of one poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub poll_id: String,
    pub option_id: String,
}

impl Poll {
    /// Re-derive `total_votes` from the options.
    pub fn recount(&mut self) {
        self.total_votes = self.options.iter().map(|o| o.votes).sum();
    }

    /// Whether new votes are accepted.
    #[must_use]
    pub const fn accepts_votes(&self) -> bool {
        self.is_active
    }

    /// Look up an option by id.
    #[must_use]
    pub fn option(&self, option_id: &str) -> Option<&PollOption> {
        self.options.iter().find(|o| o.id == option_id)
    }

    /// Build the list view of this poll.
    #[must_use]
    pub fn summary(&self) -> PollSummary {
        PollSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            created_at: self.created_at,
            votes_count: self.total_votes,
            is_active: self.is_active,
        }
    }
}
