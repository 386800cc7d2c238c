//! Error Handling Module
//!
//! Defines the closed error taxonomy for the Artifex API (`ArtifexError`) and
//! the classification of raw HTTP failures into typed errors. Classification
//! prefers the structured error envelope `{"error": {type, code, message,
//! param?}}`; when the body does not parse as an envelope the failure degrades
//! to a generic [`ArtifexError::Api`] carrying the status and raw body.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::rate_limit::RateLimitInfo;

/// Typed error produced by the Artifex client.
///
/// API-derived variants carry the HTTP status of the response that produced
/// them plus the machine-readable `code` from the error envelope. Local
/// variants (`Transport`, `Parse`, `InvalidInput`, `Cancelled`) have no HTTP
/// status.
#[derive(Error, Debug, Clone)]
pub enum ArtifexError {
    /// 401-class failure: missing, invalid or revoked API key.
    #[error("authentication failed ({code}): {message}")]
    Authentication {
        status: u16,
        code: String,
        message: String,
    },

    /// The server rejected the request shape; `param` names the offending
    /// field when the API reported one.
    #[error("invalid request ({code}): {message}")]
    InvalidRequest {
        status: u16,
        code: String,
        message: String,
        param: Option<String>,
    },

    /// The account balance cannot cover the requested generation.
    #[error("insufficient credits ({code}): {message}")]
    InsufficientCredits {
        status: u16,
        code: String,
        message: String,
    },

    /// Too many requests. Carries quota metadata parsed from the response
    /// headers when the server provided any.
    #[error("rate limited ({code}): {message}")]
    RateLimited {
        status: u16,
        code: String,
        message: String,
        rate_limit: Option<RateLimitInfo>,
    },

    /// The addressed resource does not exist.
    #[error("not found ({code}): {message}")]
    NotFound {
        status: u16,
        code: String,
        message: String,
    },

    /// Any other API failure, including responses without a parseable error
    /// envelope.
    #[error("API error {status}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// The request never produced an HTTP response (DNS failure, connection
    /// refused, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(String),

    /// A successful response carried a body that could not be decoded as the
    /// expected payload. Always fatal; indicates a contract mismatch.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// Local input validation failed before any network attempt was made.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The caller's cancellation token fired while the call was in flight.
    #[error("operation cancelled")]
    Cancelled,
}

impl ArtifexError {
    /// HTTP status of the response that produced this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. }
            | Self::InvalidRequest { status, .. }
            | Self::InsufficientCredits { status, .. }
            | Self::RateLimited { status, .. }
            | Self::NotFound { status, .. }
            | Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Machine-readable error code.
    ///
    /// API-derived variants expose the envelope's `code`; local variants map
    /// to a stable synthetic code.
    pub fn code(&self) -> &str {
        match self {
            Self::Authentication { code, .. }
            | Self::InvalidRequest { code, .. }
            | Self::InsufficientCredits { code, .. }
            | Self::RateLimited { code, .. }
            | Self::NotFound { code, .. }
            | Self::Api { code, .. } => code,
            Self::Transport(_) => "transport_error",
            Self::Parse(_) => "parse_error",
            Self::InvalidInput(_) => "invalid_input",
            Self::Cancelled => "cancelled",
        }
    }

    /// Name of the offending request field, when the API reported one.
    pub fn param(&self) -> Option<&str> {
        match self {
            Self::InvalidRequest { param, .. } => param.as_deref(),
            _ => None,
        }
    }

    /// Rate limit metadata attached to this error, if any.
    pub fn rate_limit(&self) -> Option<&RateLimitInfo> {
        match self {
            Self::RateLimited { rate_limit, .. } => rate_limit.as_ref(),
            _ => None,
        }
    }

    /// Server-requested delay before the next attempt, if the response
    /// carried a `retry-after` header.
    pub fn retry_after(&self) -> Option<Duration> {
        self.rate_limit().and_then(|info| info.retry_after)
    }

    /// Whether a fresh attempt of the same request may succeed.
    ///
    /// Rate limits, server errors (5xx) and transport failures are
    /// transient. Everything else, including parse failures on a 2xx body,
    /// is permanent.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Transport(_) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<String>,
    message: Option<String>,
    param: Option<String>,
}

/// Classify a non-2xx HTTP response into an [`ArtifexError`].
///
/// `rate_limit` is attached only to rate-limit errors; other kinds drop it.
/// Bodies that fail to parse as an envelope fall through to a generic
/// [`ArtifexError::Api`] whose message preserves the status and raw body.
pub fn classify_http_error(
    status: u16,
    body: &str,
    rate_limit: Option<RateLimitInfo>,
) -> ArtifexError {
    match classify_envelope(status, body, rate_limit) {
        Some(err) => err,
        None => ArtifexError::Api {
            status,
            code: "http_error".to_string(),
            message: format!("HTTP {status}: {body}"),
        },
    }
}

/// Returns `None` when the body is not a well-formed error envelope so the
/// caller can fall back to the generic classifier.
fn classify_envelope(
    status: u16,
    body: &str,
    rate_limit: Option<RateLimitInfo>,
) -> Option<ArtifexError> {
    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    let ErrorBody {
        kind,
        code,
        message,
        param,
    } = envelope.error;

    let code = code.unwrap_or_else(|| "unknown".to_string());
    let message = message.unwrap_or_else(|| "Unknown error".to_string());

    Some(match kind.as_deref().unwrap_or("") {
        "authentication_error" => ArtifexError::Authentication {
            status,
            code,
            message,
        },
        "invalid_request_error" => ArtifexError::InvalidRequest {
            status,
            code,
            message,
            param,
        },
        "insufficient_credits" => ArtifexError::InsufficientCredits {
            status,
            code,
            message,
        },
        "rate_limit_error" => ArtifexError::RateLimited {
            status,
            code,
            message,
            rate_limit,
        },
        "not_found" => ArtifexError::NotFound {
            status,
            code,
            message,
        },
        _ => ArtifexError::Api {
            status,
            code,
            message,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(kind: &str, code: &str, message: &str) -> String {
        format!(r#"{{"error":{{"type":"{kind}","code":"{code}","message":"{message}"}}}}"#)
    }

    #[test]
    fn envelope_type_drives_classification() {
        let err = classify_http_error(401, &envelope("authentication_error", "bad_key", "nope"), None);
        match err {
            ArtifexError::Authentication { status, code, .. } => {
                assert_eq!(status, 401);
                assert_eq!(code, "bad_key");
            }
            other => panic!("unexpected error variant: {other:?}"),
        }

        let err = classify_http_error(402, &envelope("insufficient_credits", "broke", "top up"), None);
        assert!(matches!(err, ArtifexError::InsufficientCredits { .. }));

        let err = classify_http_error(404, &envelope("not_found", "missing", "gone"), None);
        assert!(matches!(err, ArtifexError::NotFound { .. }));
    }

    #[test]
    fn invalid_request_carries_param() {
        let body = r#"{"error":{"type":"invalid_request_error","code":"bad_param","message":"prompt too long","param":"prompt"}}"#;
        let err = classify_http_error(400, body, None);
        assert_eq!(err.param(), Some("prompt"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn rate_limit_attaches_info_only_to_rate_limit_kind() {
        let info = RateLimitInfo {
            retry_after: Some(Duration::from_secs(60)),
            ..Default::default()
        };
        let err = classify_http_error(
            429,
            &envelope("rate_limit_error", "slow_down", "too fast"),
            Some(info.clone()),
        );
        assert_eq!(err.retry_after(), Some(Duration::from_secs(60)));
        assert!(err.is_retryable());

        // Same info on a non-rate-limit kind is dropped.
        let err = classify_http_error(401, &envelope("authentication_error", "x", "y"), Some(info));
        assert!(err.rate_limit().is_none());
    }

    #[test]
    fn malformed_envelope_degrades_to_generic() {
        let err = classify_http_error(503, "<html>bad gateway</html>", None);
        match &err {
            ArtifexError::Api { status, code, message } => {
                assert_eq!(*status, 503);
                assert_eq!(code, "http_error");
                assert!(message.contains("HTTP 503"));
                assert!(message.contains("<html>bad gateway</html>"));
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
        assert!(err.is_retryable());
    }

    #[test]
    fn missing_error_key_degrades_to_generic() {
        let err = classify_http_error(400, r#"{"message":"not an envelope"}"#, None);
        assert!(matches!(err, ArtifexError::Api { status: 400, .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn unknown_envelope_type_is_generic_with_status_driven_retry() {
        let err = classify_http_error(418, &envelope("teapot_error", "teapot", "short and stout"), None);
        assert!(matches!(err, ArtifexError::Api { status: 418, .. }));
        assert!(!err.is_retryable());

        let err = classify_http_error(502, &envelope("upstream_error", "bad_gateway", "upstream died"), None);
        assert!(err.is_retryable());
    }

    #[test]
    fn retryable_matrix_for_local_kinds() {
        assert!(ArtifexError::Transport("connection refused".into()).is_retryable());
        assert!(!ArtifexError::Parse("truncated body".into()).is_retryable());
        assert!(!ArtifexError::InvalidInput("prompt must not be empty".into()).is_retryable());
        assert!(!ArtifexError::Cancelled.is_retryable());
    }

    #[test]
    fn codes_are_always_available() {
        assert_eq!(ArtifexError::Transport("x".into()).code(), "transport_error");
        assert_eq!(ArtifexError::Parse("x".into()).code(), "parse_error");
        assert_eq!(ArtifexError::Cancelled.code(), "cancelled");
        assert_eq!(ArtifexError::Cancelled.status_code(), None);
    }
}
