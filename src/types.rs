//! Typed request and response payloads for the Artifex API.
//!
//! All payloads mirror the wire contract: camelCase keys, absent optional
//! fields omitted from serialized bodies, unknown fields ignored on decode.
//! The `options` bag is an open key-value map forwarded to the model without
//! interpretation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Execution mode for a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Billed generation against the production model.
    Production,
    /// Free test generation with watermarked output.
    Test,
}

/// Request body for `POST /generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<GenerationMode>,
    /// Model-specific parameters, forwarded opaquely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<HashMap<String, serde_json::Value>>,
}

impl GenerateRequest {
    /// Create a request with only the prompt set.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
            mode: None,
            options: None,
        }
    }

    /// Select a model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Select the execution mode.
    pub fn with_mode(mut self, mode: GenerationMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Attach model-specific options.
    pub fn with_options(mut self, options: HashMap<String, serde_json::Value>) -> Self {
        self.options = Some(options);
        self
    }
}

/// Credit accounting attached to a completed generation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    pub credits_used: f64,
    pub balance_remaining: f64,
}

/// A completed image generation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Generation {
    pub id: String,
    pub image_url: String,
    pub model: String,
    pub mode: GenerationMode,
    pub usage: Usage,
}

/// A model available for generation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Response body for `GET /models`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ModelList {
    pub models: Vec<ModelInfo>,
}

/// Response body for `GET /price`: credits per image, keyed by model id.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PriceList {
    pub prices: HashMap<String, f64>,
}

/// Response body for `GET /balance`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Balance {
    pub balance: f64,
}

/// One past generation in the account history.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits_used: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Response body for `GET /history`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    pub generations: Vec<HistoryEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

/// Request body for `POST /keys`.
///
/// `message`, `signature` and `public_key` form the wallet-signed proof of
/// ownership; the SDK forwards them opaquely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApiKeyRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub message: String,
    pub signature: String,
    pub public_key: String,
}

impl CreateApiKeyRequest {
    /// Create a request from a wallet-signed proof.
    pub fn new(
        message: impl Into<String>,
        signature: impl Into<String>,
        public_key: impl Into<String>,
    ) -> Self {
        Self {
            name: None,
            message: message.into(),
            signature: signature.into(),
            public_key: public_key.into(),
        }
    }

    /// Give the key a display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// An API key record.
///
/// The secret `key` material is only present in the response that created the
/// key; listings omit it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Response body for `GET /keys`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiKeyList {
    pub keys: Vec<ApiKey>,
}

/// Response body for `DELETE /keys/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RevokedKey {
    pub id: String,
    pub revoked: bool,
}

/// Request body for `PATCH /keys/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenameApiKeyRequest {
    pub name: String,
}

/// Request body for `POST /prompts` (on-chain submission).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnChainPromptRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<HashMap<String, serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
}

impl OnChainPromptRequest {
    /// Create a request with only the prompt set.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
            options: None,
            callback_url: None,
        }
    }

    /// Select a model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Attach model-specific options.
    pub fn with_options(mut self, options: HashMap<String, serde_json::Value>) -> Self {
        self.options = Some(options);
        self
    }

    /// Register a callback URL notified when the generation completes.
    pub fn with_callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }
}

/// Response body for `POST /prompts`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnChainPrompt {
    pub id: String,
    /// Opaque on-chain processing state reported by the service.
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_signature: Option<String>,
}

/// Response body for `GET /generate/{txSignature}`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnChainStatus {
    /// Opaque on-chain processing state reported by the service.
    pub status: String,
    /// Present once the generation has completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation: Option<Generation>,
}
