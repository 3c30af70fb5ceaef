//! OAuth authentication module for Twitter/X API integration.
//!
//! This module implements OAuth 1.0a request signing (RFC 5849) using the four
//! user-context credentials: consumer key/secret and access token/secret.
//! Posting tweets through the v2 endpoints requires every request to carry an
//! `Authorization: OAuth ...` header with an HMAC-SHA1 signature over the
//! request method, URL and OAuth parameters.
//!
//! Requests in this crate send JSON bodies and carry no query parameters, so
//! only the `oauth_*` parameters participate in the signature base string.

use base64::Engine;
use hmac::{Hmac, Mac};
use rand::Rng;
use sha1::Sha1;

use crate::config::TwitterCredentials;

type HmacSha1 = Hmac<Sha1>;

/// Builds the Authorization header for OAuth 2.0 Bearer Token authentication.
///
/// This is the header format used by the Groq API, which authenticates with a
/// single API key rather than a signed request.
///
/// # Example
///
/// ```rust
/// use threadpost::oauth::build_bearer_auth_header;
///
/// let header = build_bearer_auth_header("your_api_key");
/// assert_eq!(header, "Bearer your_api_key");
/// ```
pub fn build_bearer_auth_header(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Percent-encodes a string per RFC 3986.
///
/// OAuth 1.0a requires the strict unreserved set (`A-Z a-z 0-9 - . _ ~`);
/// everything else is encoded as uppercase `%XX` sequences.
pub(crate) fn percent_encode(input: &str) -> String {
    urlencoding::encode(input).into_owned()
}

/// Generates a random alphanumeric nonce for an OAuth request.
fn generate_nonce() -> String {
    let mut rng = rand::thread_rng();
    (0..32)
        .map(|_| {
            let chars = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
            chars[rng.gen_range(0..chars.len())] as char
        })
        .collect()
}

/// Computes the HMAC-SHA1 signature for a signature base string.
///
/// The signing key is `encode(consumer_secret)&encode(token_secret)` and the
/// result is base64-encoded as required by the OAuth 1.0a specification.
fn sign(base_string: &str, app_secret: &str, access_secret: &str) -> String {
    let signing_key = format!(
        "{}&{}",
        percent_encode(app_secret),
        percent_encode(access_secret)
    );
    let mut mac = HmacSha1::new_from_slice(signing_key.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(base_string.as_bytes());
    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

/// Builds the OAuth 1.0a signature base string.
///
/// The base string is `METHOD&encode(url)&encode(parameter-string)` where the
/// parameter string is every parameter percent-encoded, sorted by encoded key
/// (then encoded value), and joined as `key=value` pairs with `&`.
fn build_signature_base(method: &str, url: &str, params: &[(&str, &str)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();

    let parameter_string = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(url),
        percent_encode(&parameter_string)
    )
}

/// Builds an OAuth 1.0a Authorization header with an explicit nonce and
/// timestamp.
///
/// Split out from [`build_oauth1_header`] so that tests can verify the header
/// and signature deterministically.
pub(crate) fn build_oauth1_header_with(
    credentials: &TwitterCredentials,
    method: &str,
    url: &str,
    nonce: &str,
    timestamp: i64,
) -> String {
    let timestamp = timestamp.to_string();
    let params: [(&str, &str); 6] = [
        ("oauth_consumer_key", &credentials.app_key),
        ("oauth_nonce", nonce),
        ("oauth_signature_method", "HMAC-SHA1"),
        ("oauth_timestamp", &timestamp),
        ("oauth_token", &credentials.access_token),
        ("oauth_version", "1.0"),
    ];

    let base_string = build_signature_base(method, url, &params);
    let signature = sign(&base_string, &credentials.app_secret, &credentials.access_secret);

    let mut header_params: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (k.to_string(), percent_encode(v)))
        .collect();
    header_params.push(("oauth_signature".to_string(), percent_encode(&signature)));
    header_params.sort();

    let rendered = header_params
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, v))
        .collect::<Vec<_>>()
        .join(", ");

    format!("OAuth {}", rendered)
}

/// Builds the Authorization header for OAuth 1.0a User Context authentication.
///
/// This function creates the proper Authorization header for OAuth 1.0a
/// signed requests, which is required for Twitter API v2 endpoints that
/// perform user-specific operations like posting tweets with consumer-key
/// credentials.
///
/// # Parameters
///
/// - `credentials`: The four user-context credentials
/// - `method`: The HTTP method of the request being signed (e.g. `POST`)
/// - `url`: The request URL without query parameters
///
/// # Returns
///
/// A properly formatted Authorization header string for OAuth 1.0a signed
/// requests.
///
/// # Format
///
/// The header follows this format:
/// ```text
/// OAuth oauth_consumer_key="...", oauth_nonce="...", oauth_signature="...",
///       oauth_signature_method="HMAC-SHA1", oauth_timestamp="...",
///       oauth_token="...", oauth_version="1.0"
/// ```
pub fn build_oauth1_header(credentials: &TwitterCredentials, method: &str, url: &str) -> String {
    let nonce = generate_nonce();
    let timestamp = chrono::Utc::now().timestamp();
    build_oauth1_header_with(credentials, method, url, &nonce, timestamp)
}
