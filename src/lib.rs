//! artifex
//!
//! Typed async Rust client for the Artifex image generation API.
//!
//! The client translates typed method calls into HTTP requests, parses typed
//! responses, maps API error envelopes onto a closed error taxonomy and
//! transparently retries transient failures (rate limits, 5xx, transport
//! errors) with exponential backoff and `retry-after` awareness.
//!
//! # Example
//!
//! ```rust,no_run
//! use artifex::prelude::*;
//!
//! # async fn example() -> Result<(), ArtifexError> {
//! let client = ArtifexClient::builder()
//!     .api_key(std::env::var("ARTIFEX_API_KEY").unwrap_or_default())
//!     .build()?;
//!
//! let generation = client
//!     .generate(&GenerateRequest::new("A cat wearing a hat"))
//!     .await?;
//! println!("{}", generation.image_url);
//! # Ok(())
//! # }
//! ```
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod error;
mod execution;
pub mod rate_limit;
pub mod retry;
pub mod types;

pub use client::{ArtifexClient, ArtifexClientBuilder};
pub use error::ArtifexError;
pub use rate_limit::RateLimitInfo;
pub use retry::RetryPolicy;

/// Convenience re-exports for typical usage.
pub mod prelude {
    pub use crate::client::{ArtifexClient, ArtifexClientBuilder};
    pub use crate::error::ArtifexError;
    pub use crate::rate_limit::RateLimitInfo;
    pub use crate::retry::RetryPolicy;
    pub use crate::types::{
        ApiKey, Balance, CreateApiKeyRequest, GenerateRequest, Generation, GenerationMode,
        HistoryEntry, HistoryPage, ModelInfo, OnChainPrompt, OnChainPromptRequest, OnChainStatus,
        PriceList, RevokedKey, Usage,
    };
    pub use tokio_util::sync::CancellationToken;
}
