//! Artifex Client
//!
//! Main client structure and the public API surface: one async method per
//! wire operation. Each method validates trivially required inputs locally,
//! builds the verb/path/body triple and delegates to the request executor.

use reqwest::Method;
use secrecy::SecretString;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::error::ArtifexError;
use crate::retry::RetryPolicy;
use crate::types::{
    ApiKey, ApiKeyList, Balance, CreateApiKeyRequest, GenerateRequest, Generation, HistoryPage,
    ModelInfo, ModelList, OnChainPrompt, OnChainPromptRequest, OnChainStatus, PriceList,
    RenameApiKeyRequest, RevokedKey,
};

/// Artifex API client.
///
/// Cheap to clone; clones share the configuration and the underlying HTTP
/// connection pool. Safe to use from concurrent tasks.
#[derive(Clone)]
pub struct ArtifexClient {
    config: Arc<ClientConfig>,
    http: reqwest::Client,
    cancel: CancellationToken,
}

impl std::fmt::Debug for ArtifexClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifexClient")
            .field("base_url", &self.config.base_url)
            .field("timeout", &self.config.timeout)
            .field("max_retries", &self.config.retry_policy.max_retries)
            .finish()
    }
}

impl ArtifexClient {
    /// Create a client with default configuration.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ArtifexError> {
        Self::builder().api_key(api_key).build()
    }

    /// Returns a builder for constructing a client.
    pub fn builder() -> ArtifexClientBuilder {
        ArtifexClientBuilder::new()
    }

    /// Returns a clone of this client bound to the given cancellation token.
    ///
    /// Cancelling the token aborts any in-flight request or pending backoff
    /// sleep on the returned clone with [`ArtifexError::Cancelled`].
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        let mut client = self.clone();
        client.cancel = token;
        client
    }

    pub(crate) fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub(crate) fn retry_policy(&self) -> &RetryPolicy {
        &self.config.retry_policy
    }

    /// Generate an image from a prompt. `POST /generate`.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<Generation, ArtifexError> {
        require_non_empty(&request.prompt, "prompt")?;
        self.execute(Method::POST, "/generate", Some(to_body(request)?))
            .await
    }

    /// List the models available for generation. `GET /models`.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, ArtifexError> {
        let list: ModelList = self.execute(Method::GET, "/models", None).await?;
        Ok(list.models)
    }

    /// Fetch per-model generation prices. `GET /price`.
    pub async fn get_prices(&self) -> Result<PriceList, ArtifexError> {
        self.execute(Method::GET, "/price", None).await
    }

    /// Fetch the current credit balance. `GET /balance`.
    pub async fn get_balance(&self) -> Result<Balance, ArtifexError> {
        self.execute(Method::GET, "/balance", None).await
    }

    /// Fetch past generations. `GET /history`.
    ///
    /// `limit` and `offset` are appended to the query string only when
    /// supplied.
    pub async fn get_history(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<HistoryPage, ArtifexError> {
        let mut query = Vec::new();
        if let Some(limit) = limit {
            query.push(format!("limit={limit}"));
        }
        if let Some(offset) = offset {
            query.push(format!("offset={offset}"));
        }
        let path = if query.is_empty() {
            "/history".to_string()
        } else {
            format!("/history?{}", query.join("&"))
        };
        self.execute(Method::GET, &path, None).await
    }

    /// Create an API key from a wallet-signed proof. `POST /keys`.
    pub async fn create_api_key(
        &self,
        request: &CreateApiKeyRequest,
    ) -> Result<ApiKey, ArtifexError> {
        require_non_empty(&request.message, "message")?;
        require_non_empty(&request.signature, "signature")?;
        require_non_empty(&request.public_key, "publicKey")?;
        self.execute(Method::POST, "/keys", Some(to_body(request)?))
            .await
    }

    /// List the account's API keys. `GET /keys`.
    pub async fn list_api_keys(&self) -> Result<Vec<ApiKey>, ArtifexError> {
        let list: ApiKeyList = self.execute(Method::GET, "/keys", None).await?;
        Ok(list.keys)
    }

    /// Revoke an API key. `DELETE /keys/{id}`.
    pub async fn revoke_api_key(&self, id: &str) -> Result<RevokedKey, ArtifexError> {
        require_non_empty(id, "key id")?;
        let path = format!("/keys/{}", urlencoding::encode(id));
        self.execute(Method::DELETE, &path, None).await
    }

    /// Rename an API key. `PATCH /keys/{id}`.
    pub async fn rename_api_key(&self, id: &str, name: &str) -> Result<ApiKey, ArtifexError> {
        require_non_empty(id, "key id")?;
        require_non_empty(name, "name")?;
        let path = format!("/keys/{}", urlencoding::encode(id));
        let body = to_body(&RenameApiKeyRequest {
            name: name.to_string(),
        })?;
        self.execute(Method::PATCH, &path, Some(body)).await
    }

    /// Submit a prompt paid for on-chain. `POST /prompts`.
    pub async fn submit_onchain_prompt(
        &self,
        request: &OnChainPromptRequest,
    ) -> Result<OnChainPrompt, ArtifexError> {
        require_non_empty(&request.prompt, "prompt")?;
        self.execute(Method::POST, "/prompts", Some(to_body(request)?))
            .await
    }

    /// Look up an on-chain generation by transaction signature.
    /// `GET /generate/{txSignature}`.
    pub async fn get_onchain_status(
        &self,
        tx_signature: &str,
    ) -> Result<OnChainStatus, ArtifexError> {
        require_non_empty(tx_signature, "transaction signature")?;
        let path = format!("/generate/{}", urlencoding::encode(tx_signature));
        self.execute(Method::GET, &path, None).await
    }
}

fn to_body<T: Serialize>(value: &T) -> Result<serde_json::Value, ArtifexError> {
    serde_json::to_value(value)
        .map_err(|e| ArtifexError::InvalidInput(format!("failed to serialize request body: {e}")))
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ArtifexError> {
    if value.trim().is_empty() {
        return Err(ArtifexError::InvalidInput(format!(
            "{field} must not be empty"
        )));
    }
    Ok(())
}

/// Builder for [`ArtifexClient`].
#[derive(Debug, Default)]
pub struct ArtifexClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    max_retries: Option<u32>,
    retry_policy: Option<RetryPolicy>,
    http_client: Option<reqwest::Client>,
}

impl ArtifexClientBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API key (required, must be non-empty).
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the API host. A trailing slash is stripped.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the per-request timeout (default 30s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the maximum retry count (default 3).
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Replace the whole retry policy. `max_retries` set on the builder still
    /// applies on top.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Supply an externally owned HTTP client. The SDK shares it and never
    /// tears it down.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Build the client, validating configuration invariants.
    pub fn build(self) -> Result<ArtifexClient, ArtifexError> {
        let api_key = self.api_key.unwrap_or_default();
        if api_key.trim().is_empty() {
            return Err(ArtifexError::InvalidInput(
                "API key must not be empty".to_string(),
            ));
        }

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let mut retry_policy = self.retry_policy.unwrap_or_default();
        if let Some(max_retries) = self.max_retries {
            retry_policy = retry_policy.with_max_retries(max_retries);
        }

        let http = match self.http_client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .build()
                .map_err(|e| ArtifexError::Transport(e.to_string()))?,
        };

        Ok(ArtifexClient {
            config: Arc::new(ClientConfig {
                base_url,
                api_key: SecretString::from(api_key),
                timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
                retry_policy,
            }),
            http,
            cancel: CancellationToken::new(),
        })
    }
}
