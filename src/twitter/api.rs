//! Core Twitter API client.
//!
//! This module contains the low-level client for creating tweets and replies
//! through the Twitter API v2, along with the [`TweetPoster`] seam that lets
//! the thread publisher run against a fake during tests.

use log::{debug, error, info};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::TwitterCredentials;
use crate::error::{Error, Result};
use crate::oauth::build_oauth1_header;

/// Tweet creation endpoint of the Twitter API v2.
const TWEETS_URL: &str = "https://api.x.com/2/tweets";

/// Operations the thread publisher needs from the social platform: creating a
/// top-level tweet and creating a reply. Both return the new tweet's remote
/// identifier.
#[allow(async_fn_in_trait)]
pub trait TweetPoster {
    /// Posts `text` as a new top-level tweet and returns its id.
    async fn post_tweet(&self, text: &str) -> Result<String>;

    /// Posts `text` as a reply to `in_reply_to_tweet_id` and returns the new
    /// tweet's id.
    async fn reply_to_tweet(&self, text: &str, in_reply_to_tweet_id: &str) -> Result<String>;
}

/// Sanitizes text for safe logging by truncating and escaping control
/// characters.
///
/// Newlines and other control characters are replaced so a response body
/// cannot manipulate log output, and long bodies are truncated to prevent log
/// flooding.
pub(crate) fn sanitize_for_logging(text: &str, max_chars: usize) -> String {
    let sanitized: String = text
        .chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            c if c.is_control() => '?',
            c => c,
        })
        .collect();

    if sanitized.chars().count() > max_chars {
        let truncated: String = sanitized.chars().take(max_chars).collect();
        format!("{}... [truncated, {} total bytes]", truncated, text.len())
    } else {
        sanitized
    }
}

/// Response envelope of the tweet creation endpoint.
#[derive(Deserialize)]
struct CreateTweetResponse {
    data: Option<CreateTweetData>,
}

#[derive(Deserialize)]
struct CreateTweetData {
    id: String,
}

/// Client for the Twitter API v2 tweet endpoints, authenticated with OAuth
/// 1.0a user-context credentials.
///
/// # Example
///
/// ```rust,no_run
/// use threadpost::{TwitterApiClient, TweetPoster};
///
/// #[tokio::main]
/// async fn main() {
///     let client = TwitterApiClient::from_env().unwrap();
///     match client.post_tweet("Hello from Rust!").await {
///         Ok(id) => println!("Tweet posted: {}", id),
///         Err(e) => eprintln!("Failed to post tweet: {}", e),
///     }
/// }
/// ```
pub struct TwitterApiClient {
    http: Client,
    credentials: TwitterCredentials,
}

impl TwitterApiClient {
    /// Creates a new client with default HTTP settings (no explicit request
    /// timeout).
    pub fn new(credentials: TwitterCredentials) -> Self {
        TwitterApiClient {
            http: Client::new(),
            credentials,
        }
    }

    /// Creates a new client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the HTTP client cannot be constructed.
    pub fn with_timeout(credentials: TwitterCredentials, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(TwitterApiClient { http, credentials })
    }

    /// Creates a client from the `X_APP_KEY`, `X_APP_SECRET`,
    /// `X_ACCESS_TOKEN` and `X_ACCESS_SECRET` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCredential`] naming the first variable that is
    /// missing.
    pub fn from_env() -> Result<Self> {
        Ok(TwitterApiClient::new(TwitterCredentials::from_env()?))
    }

    /// Sends a tweet-create request and extracts the new tweet's id.
    async fn create_tweet(&self, payload: Value, operation_name: &str) -> Result<String> {
        info!(
            "Sending POST request to Twitter API v2 for operation: {}",
            operation_name
        );
        debug!("Request URL: {}", TWEETS_URL);

        let auth_header = build_oauth1_header(&self.credentials, "POST", TWEETS_URL);
        let response = self
            .http
            .post(TWEETS_URL)
            .header("Authorization", auth_header)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        info!(
            "Received response with status: {} for operation: {}",
            status, operation_name
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Operation '{}' failed - Status: {}", operation_name, status);
            debug!(
                "Error response for '{}': {}",
                operation_name,
                sanitize_for_logging(&body, 200)
            );
            return Err(Error::Api {
                status,
                body: sanitize_for_logging(&body, 200),
            });
        }

        let envelope: CreateTweetResponse = response.json().await?;
        match envelope.data {
            Some(data) => {
                info!("Operation '{}' completed successfully", operation_name);
                Ok(data.id)
            }
            None => Err(Error::UnexpectedResponse(format!(
                "tweet-create response for '{}' did not include data.id",
                operation_name
            ))),
        }
    }
}

impl TweetPoster for TwitterApiClient {
    async fn post_tweet(&self, text: &str) -> Result<String> {
        self.create_tweet(json!({ "text": text }), "post_tweet").await
    }

    async fn reply_to_tweet(&self, text: &str, in_reply_to_tweet_id: &str) -> Result<String> {
        self.create_tweet(
            json!({
                "text": text,
                "reply": {
                    "in_reply_to_tweet_id": in_reply_to_tweet_id
                }
            }),
            "reply_to_tweet",
        )
        .await
    }
}
