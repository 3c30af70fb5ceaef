//! # Tests Module
//!
//! This module contains the test suite for the threadpost toolkit: unit tests
//! for configuration, OAuth signing, weighted length and response parsing,
//! and publisher tests that exercise truncation, reply chaining, partial
//! failure and pacing against an in-memory fake of the Twitter API.
//!
//! ## Test Environment
//!
//! No test makes a network call. The publisher tests substitute a scripted
//! [`TweetPoster`] and a counting [`Delay`] so they run without wall-clock
//! waits. The environment-variable tests clean up after execution.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;

use crate::config::{
    GroqConfig, TwitterCredentials, GROQ_API_KEY_VAR, X_ACCESS_SECRET_VAR, X_ACCESS_TOKEN_VAR,
    X_APP_KEY_VAR, X_APP_SECRET_VAR,
};
use crate::error::Error;
use crate::groq::{parse_generated, GeneratedContent, ResponseFormat};
use crate::oauth::{build_bearer_auth_header, build_oauth1_header_with, percent_encode};
use crate::twitter::{
    post_thread, sanitize_for_logging, Delay, PublishOutcome, StandardWeigher, ThreadEvents,
    ThreadPublisher, TweetPoster, TweetWeigher, MAX_TWEET_WEIGHT, REPLY_PACING,
};

/// A single call made against the fake poster: the posted text and the parent
/// tweet id for replies.
#[derive(Debug, Clone, PartialEq)]
struct PostCall {
    text: String,
    in_reply_to: Option<String>,
}

/// In-memory fake of the Twitter API, returning scripted results in order and
/// recording every call.
#[derive(Clone, Default)]
struct RecordingPoster {
    results: Arc<Mutex<VecDeque<crate::Result<String>>>>,
    calls: Arc<Mutex<Vec<PostCall>>>,
}

impl RecordingPoster {
    /// Creates a poster that answers calls with `results` in order.
    fn scripted(results: Vec<crate::Result<String>>) -> Self {
        RecordingPoster {
            results: Arc::new(Mutex::new(results.into())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn calls(&self) -> Vec<PostCall> {
        self.calls.lock().unwrap().clone()
    }

    fn next_result(&self) -> crate::Result<String> {
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("unscripted-id".to_string()))
    }
}

impl TweetPoster for RecordingPoster {
    async fn post_tweet(&self, text: &str) -> crate::Result<String> {
        self.calls.lock().unwrap().push(PostCall {
            text: text.to_string(),
            in_reply_to: None,
        });
        self.next_result()
    }

    async fn reply_to_tweet(&self, text: &str, in_reply_to_tweet_id: &str) -> crate::Result<String> {
        self.calls.lock().unwrap().push(PostCall {
            text: text.to_string(),
            in_reply_to: Some(in_reply_to_tweet_id.to_string()),
        });
        self.next_result()
    }
}

/// Delay that records each requested pause without sleeping.
#[derive(Clone, Default)]
struct CountingDelay {
    waits: Arc<Mutex<Vec<Duration>>>,
}

impl CountingDelay {
    fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

impl Delay for CountingDelay {
    async fn wait(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}

/// Observer that records every callback for assertions.
#[derive(Clone, Default)]
struct RecordingEvents {
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingEvents {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl ThreadEvents for RecordingEvents {
    fn on_head_posted(&self, id: &str) {
        self.events.lock().unwrap().push(format!("head:{}", id));
    }

    fn on_reply_truncated(&self, index: usize, weighted_length: usize) {
        self.events
            .lock()
            .unwrap()
            .push(format!("truncated:{}:{}", index, weighted_length));
    }

    fn on_reply_posted(&self, index: usize, id: &str) {
        self.events
            .lock()
            .unwrap()
            .push(format!("posted:{}:{}", index, id));
    }

    fn on_reply_failed(&self, index: usize, _error: &Error) {
        self.events.lock().unwrap().push(format!("failed:{}", index));
    }
}

/// A scripted per-call failure, shaped like a platform API error.
fn scripted_failure() -> Error {
    Error::Api {
        status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
        body: "scripted failure".to_string(),
    }
}

/// Tests the scenario from the publishing contract: a short reply is posted
/// verbatim and an oversized reply is posted truncated, parented to the
/// previous successful tweet.
#[tokio::test]
async fn test_short_reply_posted_unmodified_and_long_reply_truncated() {
    let poster = RecordingPoster::scripted(vec![
        Ok("head-id".to_string()),
        Ok("reply-1".to_string()),
        Ok("reply-2".to_string()),
    ]);
    let publisher = ThreadPublisher::new(poster.clone()).with_delay(CountingDelay::default());

    let replies = vec!["short reply".to_string(), "x".repeat(400)];
    let thread = publisher.publish("Thread start", &replies).await.unwrap();

    assert_eq!(thread.head_id, "head-id");
    assert_eq!(thread.posted_count(), 2);
    assert_eq!(thread.failed_count(), 0);

    let calls = poster.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0].text, "Thread start");
    assert_eq!(calls[0].in_reply_to, None);

    // The short reply goes out unmodified, parented to the head.
    assert_eq!(calls[1].text, "short reply");
    assert_eq!(calls[1].in_reply_to, Some("head-id".to_string()));

    // The oversized reply is truncated to the weighted limit with an ellipsis
    // suffix and parented to the first reply.
    let weigher = StandardWeigher::new();
    assert!(calls[2].text.ends_with("..."));
    assert!(weigher.weighted_length(&calls[2].text) <= MAX_TWEET_WEIGHT);
    assert_eq!(calls[2].in_reply_to, Some("reply-1".to_string()));
}

/// Tests the greedy-maximal truncation property on an all-ASCII reply: the
/// kept prefix is the longest that fits the budget once the ellipsis weight
/// is reserved.
#[tokio::test]
async fn test_truncation_is_greedy_maximal() {
    let poster = RecordingPoster::scripted(vec![
        Ok("head".to_string()),
        Ok("r1".to_string()),
    ]);
    let publisher = ThreadPublisher::new(poster.clone()).with_delay(CountingDelay::default());

    let original = "x".repeat(400);
    let thread = publisher
        .publish("head", &[original.clone()])
        .await
        .unwrap();
    assert_eq!(thread.posted_count(), 1);

    let calls = poster.calls();
    let posted = &calls[1].text;
    let weigher = StandardWeigher::new();

    // 280 minus the 3-unit ellipsis leaves a 277-unit budget, all of it
    // usable by 1-unit ASCII characters.
    assert_eq!(posted, &format!("{}...", "x".repeat(277)));
    assert_eq!(weigher.weighted_length(posted), MAX_TWEET_WEIGHT);

    // Strict prefix of the original plus the suffix.
    let prefix = posted.strip_suffix("...").unwrap();
    assert!(original.starts_with(prefix));
    assert!(prefix.len() < original.len());

    // Including one more character would exceed the limit.
    let one_more = format!("{}x...", prefix);
    assert!(weigher.weighted_length(&one_more) > MAX_TWEET_WEIGHT);
}

/// Tests that truncation accumulates whole characters when each character
/// weighs more than one unit, leaving part of the budget unused rather than
/// splitting a character.
#[tokio::test]
async fn test_truncation_with_double_weight_characters() {
    let poster = RecordingPoster::scripted(vec![
        Ok("head".to_string()),
        Ok("r1".to_string()),
    ]);
    let publisher = ThreadPublisher::new(poster.clone()).with_delay(CountingDelay::default());

    // 200 emoji weigh 400 units; only 138 fit into the 277-unit budget.
    let original = "😀".repeat(200);
    publisher.publish("head", &[original]).await.unwrap();

    let calls = poster.calls();
    let posted = &calls[1].text;
    let weigher = StandardWeigher::new();
    assert_eq!(posted.chars().count(), 138 + 3);
    assert_eq!(weigher.weighted_length(posted), 279);
    assert!(weigher.weighted_length(&format!("{}😀", posted)) > MAX_TWEET_WEIGHT);
}

/// Tests that each reply is parented to the immediately preceding successful
/// tweet, never to the head once the chain has grown.
#[test]
fn test_reply_chain_parents() {
    let poster = RecordingPoster::scripted(vec![
        Ok("head".to_string()),
        Ok("r1".to_string()),
        Ok("r2".to_string()),
        Ok("r3".to_string()),
    ]);
    let publisher = ThreadPublisher::new(poster.clone()).with_delay(CountingDelay::default());

    let replies = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let thread = tokio_test::block_on(publisher.publish("head text", &replies)).unwrap();

    assert_eq!(thread.posted_count(), 3);
    let calls = poster.calls();
    assert_eq!(calls[1].in_reply_to, Some("head".to_string()));
    assert_eq!(calls[2].in_reply_to, Some("r1".to_string()));
    assert_eq!(calls[3].in_reply_to, Some("r2".to_string()));
}

/// Tests partial failure: a broken reply is recorded and skipped, and the
/// following replies attach to the last successful tweet rather than to the
/// failed one.
#[tokio::test]
async fn test_failed_reply_is_skipped_and_chain_continues() {
    let poster = RecordingPoster::scripted(vec![
        Ok("head".to_string()),
        Ok("r1".to_string()),
        Err(scripted_failure()),
        Ok("r3".to_string()),
    ]);
    let publisher = ThreadPublisher::new(poster.clone()).with_delay(CountingDelay::default());

    let replies = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let thread = publisher.publish("head text", &replies).await.unwrap();

    assert_eq!(thread.posted_count(), 2);
    assert_eq!(thread.failed_count(), 1);
    assert!(thread.outcomes[0].is_posted());
    assert!(!thread.outcomes[1].is_posted());
    assert!(thread.outcomes[2].is_posted());

    // The recorded failure names the reply's position in the sequence.
    match &thread.outcomes[1] {
        PublishOutcome::Failed {
            error: Error::ReplyPost { index, .. },
        } => assert_eq!(*index, 1),
        other => panic!("expected a ReplyPost failure, got {:?}", other),
    }

    // Reply 2 and reply 3 both use r1 as parent: the failed reply did not
    // advance the chain.
    let calls = poster.calls();
    assert_eq!(calls[2].in_reply_to, Some("r1".to_string()));
    assert_eq!(calls[3].in_reply_to, Some("r1".to_string()));
}

/// Tests that a head-post failure aborts the publish with no reply attempts
/// and no pacing.
#[tokio::test]
async fn test_head_failure_aborts_without_reply_attempts() {
    let poster = RecordingPoster::scripted(vec![Err(scripted_failure())]);
    let delay = CountingDelay::default();
    let publisher = ThreadPublisher::new(poster.clone()).with_delay(delay.clone());

    let replies = vec!["a".to_string(), "b".to_string()];
    let result = publisher.publish("head text", &replies).await;

    match result {
        Err(Error::HeadPost { .. }) => {}
        other => panic!("expected HeadPost error, got {:?}", other),
    }
    assert_eq!(poster.calls().len(), 1);
    assert!(delay.waits().is_empty());
}

/// Tests that the publisher paces exactly once after every reply attempt,
/// including failed ones.
#[tokio::test]
async fn test_pacing_after_each_reply_attempt() {
    let poster = RecordingPoster::scripted(vec![
        Ok("head".to_string()),
        Ok("r1".to_string()),
        Err(scripted_failure()),
        Ok("r3".to_string()),
    ]);
    let delay = CountingDelay::default();
    let publisher = ThreadPublisher::new(poster).with_delay(delay.clone());

    let replies = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    publisher.publish("head text", &replies).await.unwrap();

    assert_eq!(delay.waits(), vec![REPLY_PACING; 3]);
}

/// Tests that the progress observer sees the head post, the truncation of an
/// oversized reply, and the per-reply outcomes.
#[tokio::test]
async fn test_events_report_progress_and_errors() {
    let poster = RecordingPoster::scripted(vec![
        Ok("head".to_string()),
        Ok("r1".to_string()),
        Err(scripted_failure()),
    ]);
    let events = RecordingEvents::default();
    let publisher = ThreadPublisher::new(poster)
        .with_delay(CountingDelay::default())
        .with_events(events.clone());

    let replies = vec!["x".repeat(400), "b".to_string()];
    publisher.publish("head text", &replies).await.unwrap();

    assert_eq!(
        events.events(),
        vec![
            "head:head".to_string(),
            "truncated:0:400".to_string(),
            "posted:0:r1".to_string(),
            "failed:1".to_string(),
        ]
    );
}

/// Tests that credential construction rejects the first empty value by name.
#[test]
fn test_twitter_credentials_validation() {
    let ok = TwitterCredentials::new("k", "s", "t", "ts");
    assert!(ok.is_ok());

    match TwitterCredentials::new("", "s", "t", "ts") {
        Err(Error::MissingCredential { name }) => assert_eq!(name, X_APP_KEY_VAR),
        other => panic!("expected MissingCredential, got {:?}", other),
    }
    match TwitterCredentials::new("k", "", "t", "ts") {
        Err(Error::MissingCredential { name }) => assert_eq!(name, X_APP_SECRET_VAR),
        other => panic!("expected MissingCredential, got {:?}", other),
    }
    match TwitterCredentials::new("k", "s", "", "ts") {
        Err(Error::MissingCredential { name }) => assert_eq!(name, X_ACCESS_TOKEN_VAR),
        other => panic!("expected MissingCredential, got {:?}", other),
    }
    match TwitterCredentials::new("k", "s", "t", "") {
        Err(Error::MissingCredential { name }) => assert_eq!(name, X_ACCESS_SECRET_VAR),
        other => panic!("expected MissingCredential, got {:?}", other),
    }
}

/// Tests that publishing with missing platform credentials rejects before any
/// network call is made.
#[tokio::test]
async fn test_post_thread_without_credentials() {
    std::env::remove_var(X_APP_KEY_VAR);
    std::env::remove_var(X_APP_SECRET_VAR);
    std::env::remove_var(X_ACCESS_TOKEN_VAR);
    std::env::remove_var(X_ACCESS_SECRET_VAR);

    let result = post_thread("head", &["reply".to_string()]).await;
    match result {
        Err(Error::MissingCredential { name }) => assert_eq!(name, X_APP_KEY_VAR),
        other => panic!("expected MissingCredential, got {:?}", other),
    }
}

/// Tests Groq configuration loading and validation.
#[test]
fn test_groq_config() {
    match GroqConfig::new("") {
        Err(Error::MissingCredential { name }) => assert_eq!(name, GROQ_API_KEY_VAR),
        other => panic!("expected MissingCredential, got {:?}", other),
    }

    std::env::remove_var(GROQ_API_KEY_VAR);
    assert!(GroqConfig::from_env().is_err());

    std::env::set_var(GROQ_API_KEY_VAR, "gsk_test_key_1234");
    let config = GroqConfig::from_env().unwrap();
    assert_eq!(config.api_key, "gsk_test_key_1234");

    // Clean up
    std::env::remove_var(GROQ_API_KEY_VAR);
}

/// Tests that structured output parsing fails loudly on a malformed payload
/// while the identical payload is returned verbatim when no format was
/// requested.
#[test]
fn test_parse_generated_content() {
    let parsed = parse_generated(
        "{\"topic\": \"rust\"}".to_string(),
        Some(&ResponseFormat::JsonObject),
    )
    .unwrap();
    assert_eq!(parsed.as_json().unwrap()["topic"], "rust");

    match parse_generated("not json at all".to_string(), Some(&ResponseFormat::JsonObject)) {
        Err(Error::InvalidResponseFormat { raw, .. }) => assert_eq!(raw, "not json at all"),
        other => panic!("expected InvalidResponseFormat, got {:?}", other),
    }

    let raw = parse_generated("not json at all".to_string(), None).unwrap();
    assert_eq!(raw, GeneratedContent::Text("not json at all".to_string()));

    // An explicit text format also passes content through unmodified.
    let text = parse_generated("plain".to_string(), Some(&ResponseFormat::Text)).unwrap();
    assert_eq!(text.as_text(), Some("plain"));
}

/// Tests the wire shapes of the three response formats.
#[test]
fn test_response_format_request_values() {
    assert_eq!(
        ResponseFormat::Text.to_request_value(),
        json!({ "type": "text" })
    );
    assert_eq!(
        ResponseFormat::JsonObject.to_request_value(),
        json!({ "type": "json_object" })
    );
    assert_eq!(
        ResponseFormat::JsonSchema {
            name: "thread".to_string(),
            schema: json!({ "type": "object" }),
        }
        .to_request_value(),
        json!({
            "type": "json_schema",
            "json_schema": { "name": "thread", "schema": { "type": "object" } }
        })
    );
}

/// Tests the weighted length calculation: ASCII weighs one unit, CJK and
/// emoji weigh two, and URLs weigh a fixed 23 regardless of length.
#[test]
fn test_standard_weigher() {
    let weigher = StandardWeigher::new();

    assert_eq!(weigher.weighted_length(""), 0);
    assert_eq!(weigher.weighted_length("hello"), 5);
    assert_eq!(weigher.weighted_length(&"x".repeat(400)), 400);
    assert_eq!(weigher.weighted_length("漢字"), 4);
    assert_eq!(weigher.weighted_length("😀"), 2);
    assert_eq!(
        weigher.weighted_length("check https://example.com/some/very/long/path ok"),
        6 + 23 + 3
    );
    assert_eq!(
        weigher.weighted_length("https://a.io http://b.io"),
        23 + 1 + 23
    );
}

/// Tests OAuth 1.0a parameter encoding against the RFC 3986 unreserved set.
#[test]
fn test_oauth_percent_encoding() {
    assert_eq!(percent_encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
    assert_eq!(percent_encode("safe-chars_.~"), "safe-chars_.~");
    assert_eq!(percent_encode("100%"), "100%25");
}

/// Tests that the OAuth 1.0a header is deterministic for a fixed nonce and
/// timestamp, carries every protocol parameter, and lists them sorted.
#[test]
fn test_oauth1_header_structure() {
    let credentials = TwitterCredentials::new("consumer", "csecret", "token", "tsecret").unwrap();
    let header = build_oauth1_header_with(
        &credentials,
        "POST",
        "https://api.x.com/2/tweets",
        "fixednonce",
        1318622958,
    );

    assert!(header.starts_with("OAuth "));
    assert!(header.contains("oauth_consumer_key=\"consumer\""));
    assert!(header.contains("oauth_nonce=\"fixednonce\""));
    assert!(header.contains("oauth_signature_method=\"HMAC-SHA1\""));
    assert!(header.contains("oauth_timestamp=\"1318622958\""));
    assert!(header.contains("oauth_token=\"token\""));
    assert!(header.contains("oauth_version=\"1.0\""));
    assert!(header.contains("oauth_signature=\""));

    // Parameters are sorted by name.
    let key_pos = header.find("oauth_consumer_key").unwrap();
    let nonce_pos = header.find("oauth_nonce").unwrap();
    let sig_pos = header.find("oauth_signature=").unwrap();
    let version_pos = header.find("oauth_version").unwrap();
    assert!(key_pos < nonce_pos && nonce_pos < sig_pos && sig_pos < version_pos);

    // Deterministic for identical inputs.
    let again = build_oauth1_header_with(
        &credentials,
        "POST",
        "https://api.x.com/2/tweets",
        "fixednonce",
        1318622958,
    );
    assert_eq!(header, again);
}

/// Tests the Bearer header used for the Groq API.
#[test]
fn test_bearer_auth_header() {
    assert_eq!(build_bearer_auth_header("gsk_abc"), "Bearer gsk_abc");
}

/// Tests log sanitization: control characters are neutralized and long
/// bodies are truncated.
#[test]
fn test_sanitize_for_logging() {
    assert_eq!(sanitize_for_logging("line1\nline2\r\tx", 100), "line1 line2  x");
    assert_eq!(sanitize_for_logging("bell\u{7}!", 100), "bell?!");

    let long = "a".repeat(250);
    let sanitized = sanitize_for_logging(&long, 200);
    assert!(sanitized.starts_with(&"a".repeat(200)));
    assert!(sanitized.ends_with("[truncated, 250 total bytes]"));
}
