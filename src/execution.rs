//! Request execution: dispatch, response interpretation and the retry loop.
//!
//! One transport request is sent per attempt. Attempts within a logical call
//! are strictly sequential: the next attempt is issued only after the previous
//! response has been fully interpreted and the retry policy has agreed to
//! retry. Both the network wait and the backoff sleep race the client's
//! cancellation token.

use reqwest::Method;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::client::ArtifexClient;
use crate::error::{ArtifexError, classify_http_error};
use crate::rate_limit::RateLimitInfo;

impl ArtifexClient {
    /// Execute one logical call: send, interpret, retry until success or a
    /// final error.
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, ArtifexError> {
        let url = format!("{}/v1{}", self.config().base_url, path);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            if self.cancel_token().is_cancelled() {
                return Err(ArtifexError::Cancelled);
            }

            debug!(method = %method, url = %url, attempt, "sending request");
            let error = match self.send_once(&method, &url, body.as_ref()).await {
                Ok(value) => return Ok(value),
                Err(ArtifexError::Cancelled) => return Err(ArtifexError::Cancelled),
                Err(err) => err,
            };

            let policy = self.retry_policy();
            if !policy.should_retry(&error, attempt) {
                return Err(error);
            }

            let delay = policy.delay_for(&error, attempt);
            warn!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "transient failure, retrying"
            );
            tokio::select! {
                _ = self.cancel_token().cancelled() => return Err(ArtifexError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// One attempt: a single transport request and its interpretation.
    async fn send_once<T: DeserializeOwned>(
        &self,
        method: &Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, ArtifexError> {
        let mut request = self
            .http()
            .request(method.clone(), url)
            .bearer_auth(self.config().api_key())
            .timeout(self.config().timeout);
        if let Some(json) = body {
            request = request.json(json);
        }

        let response = tokio::select! {
            _ = self.cancel_token().cancelled() => return Err(ArtifexError::Cancelled),
            result = request.send() => result.map_err(transport_error)?,
        };

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let text = tokio::select! {
            _ = self.cancel_token().cancelled() => return Err(ArtifexError::Cancelled),
            result = response.text() => result.map_err(transport_error)?,
        };

        interpret_response(status, &headers, &text)
    }
}

fn transport_error(err: reqwest::Error) -> ArtifexError {
    if err.is_timeout() {
        ArtifexError::Transport(format!("request timed out: {err}"))
    } else {
        ArtifexError::Transport(err.to_string())
    }
}

/// Turn a completed transport response into a decoded payload or a classified
/// error.
///
/// Rate limit headers are extracted before the status check so quota metadata
/// is available regardless of outcome. An empty or malformed success body is
/// a fatal [`ArtifexError::Parse`], never retried.
pub(crate) fn interpret_response<T: DeserializeOwned>(
    status: u16,
    headers: &HeaderMap,
    body: &str,
) -> Result<T, ArtifexError> {
    let rate_limit = RateLimitInfo::from_headers(headers);

    if !(200..300).contains(&status) {
        return Err(classify_http_error(status, body, rate_limit));
    }

    if body.trim().is_empty() {
        return Err(ArtifexError::Parse("empty response body".to_string()));
    }
    serde_json::from_str(body)
        .map_err(|e| ArtifexError::Parse(format!("failed to decode response body: {e}")))
}
