//! Poll storage.
//!
//! [`PollStore`] is the persistence seam used by the poll service. The
//! in-memory implementation serializes every mutation behind one write lock,
//! which keeps `total_votes` equal to the sum of option votes under
//! concurrent voting.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use pollbox_common::IdGenerator;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::model::{Poll, PollOption, Vote};

/// Store failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("poll {0} not found")]
    PollNotFound(String),

    #[error("option {option_id} does not belong to poll {poll_id}")]
    OptionNotFound { poll_id: String, option_id: String },

    #[error("poll {0} is closed")]
    PollClosed(String),

    /// The backing store itself failed.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// A validated poll to insert.
#[derive(Debug, Clone)]
pub struct NewPoll {
    pub title: String,
    pub description: String,
    pub options: Vec<String>,
    pub is_active: bool,
}

/// A validated replacement for an existing poll's editable fields.
#[derive(Debug, Clone)]
pub struct PollUpdate {
    pub id: String,
    pub title: String,
    pub description: String,
    /// `None` keeps the stored flag.
    pub is_active: Option<bool>,
    /// Options whose id matches an existing option keep that id; the rest
    /// are minted fresh. Vote counts here are ignored.
    pub options: Vec<PollOption>,
}

/// Poll persistence.
#[async_trait]
pub trait PollStore: Send + Sync {
    /// Insert a new poll. Options start at zero votes.
    async fn insert(&self, poll: NewPoll) -> Result<Poll, StoreError>;

    /// Fetch a poll.
    async fn get(&self, id: &str) -> Result<Option<Poll>, StoreError>;

    /// All polls, newest first.
    async fn list(&self) -> Result<Vec<Poll>, StoreError>;

    /// Replace a poll's editable fields.
    async fn update(&self, update: PollUpdate) -> Result<Poll, StoreError>;

    /// Remove a poll with its options and counts. Returns whether it existed.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;

    /// Count one vote.
    async fn record_vote(&self, vote: &Vote) -> Result<Poll, StoreError>;
}

/// Shared handle to a poll store.
pub type PollStoreService = Arc<dyn PollStore>;

#[derive(Debug)]
struct Entry {
    poll: Poll,
    /// Last option sequence number handed out for this poll.
    option_seq: u64,
}

impl Entry {
    fn mint_option(&mut self, id_gen: &IdGenerator, text: String) -> PollOption {
        self.option_seq += 1;
        PollOption {
            id: id_gen.option_id(self.option_seq),
            text,
            votes: 0,
        }
    }
}

/// Process-local poll store.
#[derive(Clone, Default)]
pub struct InMemoryPollStore {
    polls: Arc<RwLock<HashMap<String, Entry>>>,
    id_gen: IdGenerator,
}

impl InMemoryPollStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the two sample polls used for demos.
    pub async fn seed_demo(&self) {
        let now = Utc::now();
        self.seed(
            "Favorite Programming Language",
            "What programming language do you prefer to work with?",
            &[("JavaScript", 15), ("Python", 12), ("TypeScript", 8), ("Rust", 7)],
            now,
        )
        .await;
        self.seed(
            "Best Frontend Framework",
            "Which frontend framework do you think is the best?",
            &[("React", 25), ("Vue", 18), ("Angular", 15), ("Svelte", 20)],
            now - Duration::days(1),
        )
        .await;
        tracing::info!("Seeded demo polls");
    }

    async fn seed(
        &self,
        title: &str,
        description: &str,
        options: &[(&str, u64)],
        created_at: DateTime<Utc>,
    ) {
        let mut entry = Entry {
            poll: Poll {
                id: self.id_gen.generate(),
                title: title.to_string(),
                description: description.to_string(),
                created_at,
                options: Vec::with_capacity(options.len()),
                total_votes: 0,
                is_active: true,
            },
            option_seq: 0,
        };
        for &(text, votes) in options {
            let mut option = entry.mint_option(&self.id_gen, text.to_string());
            option.votes = votes;
            entry.poll.options.push(option);
        }
        entry.poll.recount();

        self.polls
            .write()
            .await
            .insert(entry.poll.id.clone(), entry);
    }
}

#[async_trait]
impl PollStore for InMemoryPollStore {
    async fn insert(&self, poll: NewPoll) -> Result<Poll, StoreError> {
        let mut entry = Entry {
            poll: Poll {
                id: self.id_gen.generate(),
                title: poll.title,
                description: poll.description,
                created_at: Utc::now(),
                options: Vec::with_capacity(poll.options.len()),
                total_votes: 0,
                is_active: poll.is_active,
            },
            option_seq: 0,
        };
        for text in poll.options {
            let option = entry.mint_option(&self.id_gen, text);
            entry.poll.options.push(option);
        }

        let created = entry.poll.clone();
        self.polls.write().await.insert(created.id.clone(), entry);
        Ok(created)
    }

    async fn get(&self, id: &str) -> Result<Option<Poll>, StoreError> {
        Ok(self.polls.read().await.get(id).map(|e| e.poll.clone()))
    }

    async fn list(&self) -> Result<Vec<Poll>, StoreError> {
        let mut polls: Vec<Poll> = self
            .polls
            .read()
            .await
            .values()
            .map(|e| e.poll.clone())
            .collect();
        polls.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(polls)
    }

    async fn update(&self, update: PollUpdate) -> Result<Poll, StoreError> {
        let mut polls = self.polls.write().await;
        let entry = polls
            .get_mut(&update.id)
            .ok_or_else(|| StoreError::PollNotFound(update.id.clone()))?;

        let mut previous: HashMap<String, u64> = entry
            .poll
            .options
            .iter()
            .map(|o| (o.id.clone(), o.votes))
            .collect();

        let mut options = Vec::with_capacity(update.options.len());
        for incoming in update.options {
            // An id can only be claimed once; a repeated id is treated as new.
            match previous.remove(&incoming.id) {
                Some(votes) => options.push(PollOption {
                    id: incoming.id,
                    text: incoming.text,
                    votes,
                }),
                None => options.push(entry.mint_option(&self.id_gen, incoming.text)),
            }
        }

        entry.poll.title = update.title;
        entry.poll.description = update.description;
        if let Some(is_active) = update.is_active {
            entry.poll.is_active = is_active;
        }
        entry.poll.options = options;
        entry.poll.recount();

        Ok(entry.poll.clone())
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.polls.write().await.remove(id).is_some())
    }

    async fn record_vote(&self, vote: &Vote) -> Result<Poll, StoreError> {
        let mut polls = self.polls.write().await;
        let entry = polls
            .get_mut(&vote.poll_id)
            .ok_or_else(|| StoreError::PollNotFound(vote.poll_id.clone()))?;

        if !entry.poll.accepts_votes() {
            return Err(StoreError::PollClosed(vote.poll_id.clone()));
        }

        let option = entry
            .poll
            .options
            .iter_mut()
            .find(|o| o.id == vote.option_id)
            .ok_or_else(|| StoreError::OptionNotFound {
                poll_id: vote.poll_id.clone(),
                option_id: vote.option_id.clone(),
            })?;

        option.votes += 1;
        entry.poll.total_votes += 1;

        Ok(entry.poll.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_poll(options: &[&str]) -> NewPoll {
        NewPoll {
            title: "Lunch".to_string(),
            description: "Where do we eat?".to_string(),
            options: options.iter().map(|s| (*s).to_string()).collect(),
            is_active: true,
        }
    }

    fn vote(poll: &Poll, option_id: &str) -> Vote {
        Vote {
            poll_id: poll.id.clone(),
            option_id: option_id.to_string(),
        }
    }

    fn edit(poll: &Poll, options: Vec<PollOption>) -> PollUpdate {
        PollUpdate {
            id: poll.id.clone(),
            title: poll.title.clone(),
            description: poll.description.clone(),
            is_active: Some(poll.is_active),
            options,
        }
    }

    fn option(id: &str, text: &str) -> PollOption {
        PollOption {
            id: id.to_string(),
            text: text.to_string(),
            votes: 0,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_ids_and_zero_votes() {
        let store = InMemoryPollStore::new();
        let poll = store.insert(new_poll(&["Pizza", "Sushi"])).await.unwrap();

        assert_eq!(poll.id.len(), 26);
        let ids: Vec<&str> = poll.options.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["opt1", "opt2"]);
        assert!(poll.options.iter().all(|o| o.votes == 0));
        assert_eq!(poll.total_votes, 0);
        assert_eq!(store.get(&poll.id).await.unwrap(), Some(poll));
    }

    #[tokio::test]
    async fn test_record_vote_increments_option_and_total() {
        let store = InMemoryPollStore::new();
        let poll = store.insert(new_poll(&["Pizza", "Sushi"])).await.unwrap();

        store.record_vote(&vote(&poll, "opt2")).await.unwrap();
        let poll = store.record_vote(&vote(&poll, "opt2")).await.unwrap();

        assert_eq!(poll.options[0].votes, 0);
        assert_eq!(poll.options[1].votes, 2);
        assert_eq!(poll.total_votes, 2);
    }

    #[tokio::test]
    async fn test_record_vote_failures() {
        let store = InMemoryPollStore::new();
        let poll = store.insert(new_poll(&["Pizza", "Sushi"])).await.unwrap();

        let missing = Vote {
            poll_id: "nope".to_string(),
            option_id: "opt1".to_string(),
        };
        assert_eq!(
            store.record_vote(&missing).await,
            Err(StoreError::PollNotFound("nope".to_string()))
        );

        assert!(matches!(
            store.record_vote(&vote(&poll, "opt9")).await,
            Err(StoreError::OptionNotFound { .. })
        ));

        let mut closed = edit(&poll, poll.options.clone());
        closed.is_active = Some(false);
        store.update(closed).await.unwrap();
        assert_eq!(
            store.record_vote(&vote(&poll, "opt1")).await,
            Err(StoreError::PollClosed(poll.id.clone()))
        );

        // Rejected votes leave counts untouched.
        let stored = store.get(&poll.id).await.unwrap().unwrap();
        assert_eq!(stored.total_votes, 0);
    }

    #[tokio::test]
    async fn test_update_without_flag_keeps_active_state() {
        let store = InMemoryPollStore::new();
        let mut closed = new_poll(&["Pizza", "Sushi"]);
        closed.is_active = false;
        let poll = store.insert(closed).await.unwrap();

        let mut rename = edit(&poll, poll.options.clone());
        rename.title = "Dinner".to_string();
        rename.is_active = None;
        let updated = store.update(rename).await.unwrap();
        assert_eq!(updated.title, "Dinner");
        assert!(!updated.is_active);

        let mut reopen = edit(&updated, updated.options.clone());
        reopen.is_active = Some(true);
        assert!(store.update(reopen).await.unwrap().is_active);
    }

    #[tokio::test]
    async fn test_update_keeps_ids_and_votes_and_mints_new() {
        let store = InMemoryPollStore::new();
        let poll = store.insert(new_poll(&["Pizza", "Sushi"])).await.unwrap();
        store.record_vote(&vote(&poll, "opt1")).await.unwrap();
        store.record_vote(&vote(&poll, "opt1")).await.unwrap();

        let mut renamed = option("opt1", "Pizza Napoletana");
        renamed.votes = 99; // client counts are ignored
        let updated = store
            .update(edit(&poll, vec![renamed, option("", "Tacos")]))
            .await
            .unwrap();

        assert_eq!(updated.options[0].id, "opt1");
        assert_eq!(updated.options[0].text, "Pizza Napoletana");
        assert_eq!(updated.options[0].votes, 2);
        assert_eq!(updated.options[1].id, "opt3");
        assert_eq!(updated.options[1].votes, 0);
        assert_eq!(updated.total_votes, 2);
    }

    #[tokio::test]
    async fn test_removed_option_ids_are_never_reused() {
        let store = InMemoryPollStore::new();
        let poll = store
            .insert(new_poll(&["Pizza", "Sushi", "Tacos"]))
            .await
            .unwrap();
        store.record_vote(&vote(&poll, "opt3")).await.unwrap();

        // Drop opt3; its votes leave with it.
        let trimmed = store
            .update(edit(&poll, vec![option("opt1", "Pizza"), option("opt2", "Sushi")]))
            .await
            .unwrap();
        assert_eq!(trimmed.total_votes, 0);

        // Re-adding, even under the old id, mints a fresh one.
        let regrown = store
            .update(edit(
                &poll,
                vec![
                    option("opt1", "Pizza"),
                    option("opt2", "Sushi"),
                    option("opt3", "Tacos"),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(regrown.options[2].id, "opt4");
    }

    #[tokio::test]
    async fn test_duplicate_ids_in_update_are_minted() {
        let store = InMemoryPollStore::new();
        let poll = store.insert(new_poll(&["Pizza", "Sushi"])).await.unwrap();

        let updated = store
            .update(edit(&poll, vec![option("opt1", "Pizza"), option("opt1", "Pasta")]))
            .await
            .unwrap();
        assert_eq!(updated.options[0].id, "opt1");
        assert_eq!(updated.options[1].id, "opt3");
    }

    #[tokio::test]
    async fn test_update_missing_poll() {
        let store = InMemoryPollStore::new();
        let update = PollUpdate {
            id: "ghost".to_string(),
            title: "t".to_string(),
            description: "d".to_string(),
            is_active: Some(true),
            options: vec![option("opt1", "a"), option("opt2", "b")],
        };
        assert_eq!(
            store.update(update).await,
            Err(StoreError::PollNotFound("ghost".to_string()))
        );
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemoryPollStore::new();
        let poll = store.insert(new_poll(&["Pizza", "Sushi"])).await.unwrap();

        assert!(store.delete(&poll.id).await.unwrap());
        assert!(!store.delete(&poll.id).await.unwrap());
        assert_eq!(store.get(&poll.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = InMemoryPollStore::new();
        store.seed_demo().await;
        let created = store.insert(new_poll(&["Pizza", "Sushi"])).await.unwrap();

        let polls = store.list().await.unwrap();
        assert_eq!(polls.len(), 3);
        assert_eq!(polls[0].id, created.id);
        assert_eq!(polls[2].title, "Best Frontend Framework");
    }

    #[tokio::test]
    async fn test_seed_demo_totals() {
        let store = InMemoryPollStore::new();
        store.seed_demo().await;

        let polls = store.list().await.unwrap();
        let languages = polls
            .iter()
            .find(|p| p.title == "Favorite Programming Language")
            .unwrap();
        assert_eq!(languages.total_votes, 42);
        assert_eq!(languages.options[3].id, "opt4");
        let frameworks = polls
            .iter()
            .find(|p| p.title == "Best Frontend Framework")
            .unwrap();
        assert_eq!(frameworks.total_votes, 78);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_votes_keep_total_consistent() {
        let store = InMemoryPollStore::new();
        let poll = store.insert(new_poll(&["Pizza", "Sushi"])).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..100 {
            let store = store.clone();
            let ballot = vote(&poll, if i % 3 == 0 { "opt1" } else { "opt2" });
            handles.push(tokio::spawn(async move {
                store.record_vote(&ballot).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let poll = store.get(&poll.id).await.unwrap().unwrap();
        assert_eq!(poll.options[0].votes, 34);
        assert_eq!(poll.options[1].votes, 66);
        assert_eq!(poll.total_votes, 100);
    }
}
