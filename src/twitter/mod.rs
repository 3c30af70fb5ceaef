//! Twitter/X API integration module.
//!
//! This module contains the client for posting tweets and replies through the
//! Twitter API v2 with OAuth 1.0a user-context authentication, the weighted
//! tweet length calculation, and the thread publishing algorithm built on top
//! of both.

mod api;
mod thread;
mod weights;

// Re-export public API
pub use api::{TweetPoster, TwitterApiClient};
pub use thread::{
    post_thread, Delay, LogEvents, PublishOutcome, PublishedThread, ThreadEvents, ThreadPublisher,
    TokioDelay, REPLY_PACING,
};
pub use weights::{StandardWeigher, TweetWeigher, MAX_TWEET_WEIGHT};

// Crate-internal re-exports (used by tests)
#[allow(unused_imports)]
pub(crate) use api::sanitize_for_logging;
