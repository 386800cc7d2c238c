//! Client configuration.
//!
//! `ClientConfig` is immutable after construction and shared read-only across
//! all calls issued by a client. The API key is held as a [`SecretString`] so
//! it never appears in `Debug` output or logs.

use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.artifex.dev";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Immutable client configuration.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the API host, without a trailing slash. The versioned
    /// base path (`/v1`) is appended per request.
    pub base_url: String,
    pub(crate) api_key: SecretString,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retry policy applied to every call.
    pub retry_policy: RetryPolicy,
}

impl ClientConfig {
    pub(crate) fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .field("retry_policy", &self.retry_policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_never_exposes_the_key() {
        let config = ClientConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: SecretString::from("sk-very-secret"),
            timeout: DEFAULT_TIMEOUT,
            retry_policy: RetryPolicy::default(),
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-very-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
