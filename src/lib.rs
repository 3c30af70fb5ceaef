//! # Threadpost Library
//!
//! A Rust toolkit for generating content with the Groq LLM API and publishing
//! it as tweet threads on Twitter/X. The two components are independent: an
//! external caller first (optionally) generates message text, then publishes
//! it as a thread.
//!
//! ## Features
//!
//! - Groq chat-completion client with optional structured (JSON) output
//! - Tweet thread publishing with reply chaining and per-reply outcomes
//! - Weighted-length truncation for oversized replies
//! - Fixed pacing between reply posts to respect burst rate limits
//! - OAuth 1.0a request signing for the Twitter API v2
//! - Structured logging
//!
//! ## Configuration
//!
//! The following environment variables are consumed by the `from_env`
//! constructors and the convenience entry points:
//! - `GROQ_API_KEY`: Groq API key for content generation
//! - `X_APP_KEY`, `X_APP_SECRET`, `X_ACCESS_TOKEN`, `X_ACCESS_SECRET`:
//!   Twitter/X user-context credentials for posting
//!
//! ## Usage
//!
//! ```rust,no_run
//! use threadpost::{post_thread, GroqClient};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = GroqClient::from_env().unwrap();
//!     let content = client
//!         .generate("You write tweet threads.", "Write about Rust.", None, None)
//!         .await
//!         .unwrap();
//!     let replies = vec![content.as_text().unwrap().to_string()];
//!     let thread = post_thread("A thread about Rust", &replies).await.unwrap();
//!     println!("Posted thread {}", thread.head_id);
//! }
//! ```

pub mod config;
pub mod error;
pub mod groq;
pub mod oauth;
pub mod twitter;

// Re-export commonly used types and functions
pub use config::{GroqConfig, TwitterCredentials};
pub use error::{Error, Result};
pub use groq::{GeneratedContent, GroqClient, ResponseFormat, DEFAULT_MODEL};
pub use twitter::{
    post_thread, PublishOutcome, PublishedThread, StandardWeigher, ThreadEvents, ThreadPublisher,
    TweetPoster, TweetWeigher, TwitterApiClient, MAX_TWEET_WEIGHT, REPLY_PACING,
};

#[cfg(test)]
mod tests;
