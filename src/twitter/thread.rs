//! Tweet thread publishing.
//!
//! This module contains the core publishing algorithm: post a head tweet, then
//! post each reply in input order as a chain, truncating oversized replies by
//! weighted length and pacing requests with a fixed delay. A failed reply is
//! recorded and skipped; subsequent replies attach to the last successfully
//! posted tweet. Only a head-tweet failure aborts the operation, since there
//! is no thread to continue without a head.

use log::{error, info, warn};
use std::time::Duration;

use crate::config::TwitterCredentials;
use crate::error::{Error, Result};
use crate::twitter::api::{TweetPoster, TwitterApiClient};
use crate::twitter::weights::{StandardWeigher, TweetWeigher, MAX_TWEET_WEIGHT};

/// Fixed pause between reply attempts, to stay under the platform's burst
/// rate limits. No backoff growth, no jitter.
pub const REPLY_PACING: Duration = Duration::from_millis(1500);

/// Suffix appended to truncated replies.
const ELLIPSIS: &str = "...";

/// Per-reply result of a publish call.
///
/// The thread as a whole has no single failure state; it is a sequence of
/// independent outcomes, one per reply in input order.
#[derive(Debug)]
pub enum PublishOutcome {
    /// The reply was posted; carries the remote tweet identifier.
    Posted {
        /// Identifier of the posted tweet.
        id: String,
    },
    /// The reply failed; the chain continued from the last successful tweet.
    Failed {
        /// The error recorded for this reply.
        error: Error,
    },
}

impl PublishOutcome {
    /// Whether this reply was posted successfully.
    pub fn is_posted(&self) -> bool {
        matches!(self, PublishOutcome::Posted { .. })
    }

    /// The posted tweet's identifier, if any.
    pub fn tweet_id(&self) -> Option<&str> {
        match self {
            PublishOutcome::Posted { id } => Some(id),
            PublishOutcome::Failed { .. } => None,
        }
    }
}

/// The result of publishing a whole thread: the head tweet's identifier and
/// one outcome per reply.
#[derive(Debug)]
pub struct PublishedThread {
    /// Identifier of the head tweet.
    pub head_id: String,
    /// Per-reply outcomes, in input order.
    pub outcomes: Vec<PublishOutcome>,
}

impl PublishedThread {
    /// Number of replies that were posted successfully.
    pub fn posted_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_posted()).count()
    }

    /// Number of replies that failed.
    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.posted_count()
    }
}

/// Observer callbacks for publish progress, so the algorithm is observable
/// without being tied to a specific output sink.
pub trait ThreadEvents {
    /// The head tweet was posted.
    fn on_head_posted(&self, _id: &str) {}
    /// A reply exceeded the weighted length limit and will be truncated.
    fn on_reply_truncated(&self, _index: usize, _weighted_length: usize) {}
    /// A reply was posted.
    fn on_reply_posted(&self, _index: usize, _id: &str) {}
    /// A reply failed; the chain continues from the last successful tweet.
    fn on_reply_failed(&self, _index: usize, _error: &Error) {}
}

/// Default observer that reports progress through the `log` crate.
pub struct LogEvents;

impl ThreadEvents for LogEvents {
    fn on_head_posted(&self, id: &str) {
        info!("Head tweet posted: {}", id);
    }

    fn on_reply_truncated(&self, index: usize, weighted_length: usize) {
        warn!(
            "Truncating reply {}: weighted length {} exceeds the {} limit",
            index + 1,
            weighted_length,
            MAX_TWEET_WEIGHT
        );
    }

    fn on_reply_posted(&self, index: usize, id: &str) {
        info!("Posted reply {} as tweet {}", index + 1, id);
    }

    fn on_reply_failed(&self, index: usize, error: &Error) {
        error!("Failed to post reply {}: {}", index + 1, error);
    }
}

/// Pause abstraction so tests can run without real wall-clock waits.
#[allow(async_fn_in_trait)]
pub trait Delay {
    /// Suspends the caller for `duration`.
    async fn wait(&self, duration: Duration);
}

/// Default delay backed by the tokio timer.
pub struct TokioDelay;

impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Publishes tweet threads: a head tweet plus an ordered chain of replies.
///
/// The publisher is generic over its collaborators so tests can substitute a
/// scripted poster, a custom weigher or an instant delay. Each publish call is
/// strictly sequential; posting order correctness depends on each request
/// completing before the next begins.
///
/// # Example
///
/// ```rust,no_run
/// use threadpost::{ThreadPublisher, TwitterApiClient};
///
/// #[tokio::main]
/// async fn main() {
///     let publisher = ThreadPublisher::new(TwitterApiClient::from_env().unwrap());
///     let replies = vec!["First reply".to_string(), "Second reply".to_string()];
///     match publisher.publish("Thread start", &replies).await {
///         Ok(thread) => println!("Posted {} of {} replies", thread.posted_count(), replies.len()),
///         Err(e) => eprintln!("Failed to publish thread: {}", e),
///     }
/// }
/// ```
pub struct ThreadPublisher<P, W = StandardWeigher, D = TokioDelay> {
    poster: P,
    weigher: W,
    delay: D,
    events: Box<dyn ThreadEvents + Send + Sync>,
    pacing: Duration,
}

impl<P: TweetPoster> ThreadPublisher<P> {
    /// Creates a publisher with the default weigher, tokio-backed pacing at
    /// [`REPLY_PACING`], and log-based progress reporting.
    pub fn new(poster: P) -> Self {
        ThreadPublisher {
            poster,
            weigher: StandardWeigher::new(),
            delay: TokioDelay,
            events: Box::new(LogEvents),
            pacing: REPLY_PACING,
        }
    }
}

impl<P, W, D> ThreadPublisher<P, W, D> {
    /// Overrides the pause between reply attempts.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Replaces the progress observer.
    pub fn with_events<E: ThreadEvents + Send + Sync + 'static>(mut self, events: E) -> Self {
        self.events = Box::new(events);
        self
    }

    /// Replaces the weighted-length implementation.
    pub fn with_weigher<W2: TweetWeigher>(self, weigher: W2) -> ThreadPublisher<P, W2, D> {
        ThreadPublisher {
            poster: self.poster,
            weigher,
            delay: self.delay,
            events: self.events,
            pacing: self.pacing,
        }
    }

    /// Replaces the delay implementation.
    pub fn with_delay<D2: Delay>(self, delay: D2) -> ThreadPublisher<P, W, D2> {
        ThreadPublisher {
            poster: self.poster,
            weigher: self.weigher,
            delay,
            events: self.events,
            pacing: self.pacing,
        }
    }
}

impl<P: TweetPoster, W: TweetWeigher, D: Delay> ThreadPublisher<P, W, D> {
    /// Publishes a thread: the head tweet, then each reply in input order.
    ///
    /// The head content is posted verbatim. Each reply is truncated first if
    /// its weighted length exceeds [`MAX_TWEET_WEIGHT`], then posted as a
    /// reply to the most recently successfully posted tweet (the head on the
    /// first iteration). A failed reply is recorded and skipped; the chain
    /// continues from the last successful tweet, so later replies never
    /// attach to a failed one. After every reply attempt the publisher waits
    /// the configured pacing interval.
    ///
    /// # Returns
    ///
    /// - `Ok(PublishedThread)` after all replies have been attempted, whether
    ///   or not any of them failed
    /// - `Err(Error::HeadPost)` if the head tweet could not be posted; no
    ///   replies are attempted in that case
    pub async fn publish(&self, head_content: &str, replies: &[String]) -> Result<PublishedThread> {
        info!("Publishing thread with {} replies", replies.len());

        let head_id = match self.poster.post_tweet(head_content).await {
            Ok(id) => {
                self.events.on_head_posted(&id);
                id
            }
            Err(source) => {
                error!("Failed to post head tweet: {}", source);
                return Err(Error::HeadPost {
                    source: Box::new(source),
                });
            }
        };

        let mut last_tweet_id = head_id.clone();
        let mut outcomes = Vec::with_capacity(replies.len());

        for (index, reply) in replies.iter().enumerate() {
            let weighted_length = self.weigher.weighted_length(reply);
            let text = if weighted_length > MAX_TWEET_WEIGHT {
                self.events.on_reply_truncated(index, weighted_length);
                self.truncate(reply)
            } else {
                reply.clone()
            };

            match self.poster.reply_to_tweet(&text, &last_tweet_id).await {
                Ok(id) => {
                    self.events.on_reply_posted(index, &id);
                    last_tweet_id = id.clone();
                    outcomes.push(PublishOutcome::Posted { id });
                }
                Err(source) => {
                    let error = Error::ReplyPost {
                        index,
                        source: Box::new(source),
                    };
                    self.events.on_reply_failed(index, &error);
                    outcomes.push(PublishOutcome::Failed { error });
                }
            }

            self.delay.wait(self.pacing).await;
        }

        info!(
            "Thread published: {} of {} replies posted",
            outcomes.iter().filter(|o| o.is_posted()).count(),
            replies.len()
        );
        Ok(PublishedThread { head_id, outcomes })
    }

    /// Shortens `content` to fit the weighted length limit.
    ///
    /// Reserves the weighted cost of the ellipsis suffix, then greedily
    /// accumulates whole characters from the start of the content, stopping
    /// before the character whose inclusion would exceed the remaining
    /// budget. This is a prefix-preserving truncation, not sentence-aware; it
    /// also weighs characters one at a time, so a URL or multi-code-point
    /// sequence crossing the boundary may be over-counted. Both are known
    /// limitations of the strategy.
    fn truncate(&self, content: &str) -> String {
        let budget = MAX_TWEET_WEIGHT - self.weigher.weighted_length(ELLIPSIS);
        let mut truncated = String::new();
        let mut used = 0;
        let mut buf = [0u8; 4];
        for c in content.chars() {
            let weight = self.weigher.weighted_length(c.encode_utf8(&mut buf));
            if used + weight > budget {
                break;
            }
            truncated.push(c);
            used += weight;
        }
        truncated.push_str(ELLIPSIS);
        truncated
    }
}

/// Posts a thread using credentials from the environment.
///
/// This is the convenience entry point for callers that do not need to
/// customize the publisher: it loads [`TwitterCredentials`] from the
/// environment, builds a [`TwitterApiClient`], and publishes with default
/// pacing and log-based progress reporting.
///
/// # Errors
///
/// - [`Error::MissingCredential`] if any of the four credential variables is
///   absent; nothing is posted in that case
/// - [`Error::HeadPost`] if the head tweet could not be posted
pub async fn post_thread(head_content: &str, replies: &[String]) -> Result<PublishedThread> {
    let credentials = TwitterCredentials::from_env()?;
    let publisher = ThreadPublisher::new(TwitterApiClient::new(credentials));
    publisher.publish(head_content, replies).await
}
