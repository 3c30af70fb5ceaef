//! Configuration module for the threadpost toolkit.
//!
//! This module contains the credential structures for the Groq and Twitter/X
//! APIs. Credentials are validated at construction time so that the core
//! components never read process-global state themselves; the `from_env`
//! constructors are the only place environment variables are consulted.

use log::{debug, info, warn};
use std::env;

use crate::error::{Error, Result};

/// Environment variable holding the Groq API key.
pub const GROQ_API_KEY_VAR: &str = "GROQ_API_KEY";

/// Environment variable holding the Twitter/X application (consumer) key.
pub const X_APP_KEY_VAR: &str = "X_APP_KEY";
/// Environment variable holding the Twitter/X application (consumer) secret.
pub const X_APP_SECRET_VAR: &str = "X_APP_SECRET";
/// Environment variable holding the Twitter/X account access token.
pub const X_ACCESS_TOKEN_VAR: &str = "X_ACCESS_TOKEN";
/// Environment variable holding the Twitter/X account access token secret.
pub const X_ACCESS_SECRET_VAR: &str = "X_ACCESS_SECRET";

/// Masks a secret value for logging, keeping only a short prefix and suffix.
fn mask_secret(secret: &str) -> String {
    let len = secret.len();
    if len > 16 {
        format!("{}...{}", &secret[..8], &secret[len - 8..])
    } else if len > 8 {
        format!("{}...", &secret[..8])
    } else {
        format!("{}...", secret)
    }
}

/// Reads a required environment variable, failing with the variable name if it
/// is absent or empty.
fn require_env(name: &'static str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => {
            info!("Found {} environment variable", name);
            debug!("{} (masked): {}", name, mask_secret(&value));
            if value.len() < 10 {
                warn!("{} seems unusually short ({} characters)", name, value.len());
            }
            Ok(value)
        }
        _ => Err(Error::MissingCredential { name }),
    }
}

/// Rejects an empty credential value, naming the field that failed.
fn require_value(name: &'static str, value: String) -> Result<String> {
    if value.is_empty() {
        return Err(Error::MissingCredential { name });
    }
    Ok(value)
}

/// Configuration for the Groq LLM API.
///
/// Holds the API key used as a Bearer token on chat-completion requests.
#[derive(Debug, Clone)]
pub struct GroqConfig {
    /// The Groq API key.
    pub api_key: String,
}

impl GroqConfig {
    /// Creates a new `GroqConfig`, validating that the key is non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCredential`] if the key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = require_value(GROQ_API_KEY_VAR, api_key.into())?;
        Ok(GroqConfig { api_key })
    }

    /// Loads the configuration from the `GROQ_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCredential`] naming the variable if it is not
    /// set or is empty.
    pub fn from_env() -> Result<Self> {
        info!("Loading Groq configuration from environment variables");
        let api_key = require_env(GROQ_API_KEY_VAR)?;
        Ok(GroqConfig { api_key })
    }
}

/// The four Twitter/X user-context credentials used for OAuth 1.0a signing.
///
/// All four values are required: the consumer key/secret identify the
/// application, and the access token/secret identify the posting account.
/// Presence is validated before any network call is made.
#[derive(Debug, Clone)]
pub struct TwitterCredentials {
    /// The application (consumer) key.
    pub app_key: String,
    /// The application (consumer) secret.
    pub app_secret: String,
    /// The account access token.
    pub access_token: String,
    /// The account access token secret.
    pub access_secret: String,
}

impl TwitterCredentials {
    /// Creates a new `TwitterCredentials`, validating that every value is
    /// non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCredential`] naming the first credential that
    /// failed the check.
    pub fn new(
        app_key: impl Into<String>,
        app_secret: impl Into<String>,
        access_token: impl Into<String>,
        access_secret: impl Into<String>,
    ) -> Result<Self> {
        Ok(TwitterCredentials {
            app_key: require_value(X_APP_KEY_VAR, app_key.into())?,
            app_secret: require_value(X_APP_SECRET_VAR, app_secret.into())?,
            access_token: require_value(X_ACCESS_TOKEN_VAR, access_token.into())?,
            access_secret: require_value(X_ACCESS_SECRET_VAR, access_secret.into())?,
        })
    }

    /// Loads the credentials from the `X_APP_KEY`, `X_APP_SECRET`,
    /// `X_ACCESS_TOKEN` and `X_ACCESS_SECRET` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCredential`] naming the first variable that is
    /// not set or is empty.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use threadpost::TwitterCredentials;
    ///
    /// let credentials = TwitterCredentials::from_env().unwrap();
    /// ```
    pub fn from_env() -> Result<Self> {
        info!("Loading Twitter credentials from environment variables");
        let credentials = TwitterCredentials {
            app_key: require_env(X_APP_KEY_VAR)?,
            app_secret: require_env(X_APP_SECRET_VAR)?,
            access_token: require_env(X_ACCESS_TOKEN_VAR)?,
            access_secret: require_env(X_ACCESS_SECRET_VAR)?,
        };
        info!("Twitter credentials loaded successfully");
        Ok(credentials)
    }
}
