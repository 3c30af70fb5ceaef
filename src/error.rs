//! Error types for the threadpost toolkit.
//!
//! This module defines the error taxonomy shared by the content generator and
//! the thread publisher. Configuration and head-tweet failures are fatal and
//! propagate to the caller; per-reply failures are recorded in the publish
//! outcome list and never propagate.

use thiserror::Error;

/// Convenience result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the content generator and the thread publisher.
#[derive(Debug, Error)]
pub enum Error {
    /// A required credential is missing or empty.
    ///
    /// Carries the name of the environment variable (or credential field)
    /// that failed the presence check. Raised before any network call.
    #[error("missing required credential: {name}")]
    MissingCredential {
        /// Name of the missing environment variable or credential field.
        name: &'static str,
    },

    /// The HTTP request itself failed (connection, timeout, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote API returned a non-success status code.
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code returned by the API.
        status: reqwest::StatusCode,
        /// Response body, sanitized for logging.
        body: String,
    },

    /// The API responded with a success status but the body did not have the
    /// expected shape (e.g. a tweet-create response without `data.id`).
    #[error("unexpected API response: {0}")]
    UnexpectedResponse(String),

    /// The model returned a completion with no message content.
    #[error("the model did not return any content")]
    EmptyResponse,

    /// Structured output was requested but the model's payload was not valid
    /// JSON. Carries the raw payload for diagnostics; there is no silent
    /// fallback to raw text.
    #[error("the model did not return valid JSON as requested")]
    InvalidResponseFormat {
        /// The raw payload returned by the model.
        raw: String,
        /// The underlying JSON parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Posting the head tweet failed. There is no thread to continue without
    /// a head, so this aborts the entire publish operation.
    #[error("failed to post head tweet: {source}")]
    HeadPost {
        /// The underlying cause of the failure.
        #[source]
        source: Box<Error>,
    },

    /// Posting a single reply failed. Recorded in the per-reply outcome list;
    /// the chain continues from the last successfully posted tweet.
    #[error("failed to post reply {index}: {source}")]
    ReplyPost {
        /// Zero-based position of the reply in the input sequence.
        index: usize,
        /// The underlying cause of the failure.
        #[source]
        source: Box<Error>,
    },
}
