//! Business logic services.

#![allow(missing_docs)]

pub mod event_publisher;
pub mod poll;

pub use event_publisher::{
    BroadcastPollEventPublisher, NoOpPollEventPublisher, PollEvent, PollEventPublisher,
    PollEventPublisherService,
};
pub use poll::{CreatePollInput, PollResults, PollService, UpdatePollInput, VoteInput};
