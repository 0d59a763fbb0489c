//! Core business logic for pollbox.
//!
//! - [`model`]: polls, options and votes
//! - [`validation`]: structural checks run before any mutation
//! - [`tally`]: display percentages for results
//! - [`store`]: the persistence seam and an in-memory store
//! - [`services`]: the poll service and its event publisher

pub mod model;
pub mod services;
pub mod store;
pub mod tally;
pub mod validation;

pub use model::{Poll, PollOption, PollSummary, Vote};
pub use services::*;
pub use store::{InMemoryPollStore, PollStore, PollStoreService, StoreError};
pub use tally::{OptionResult, percentage_of, tally};
pub use validation::{ValidatedCreate, ValidationError};
