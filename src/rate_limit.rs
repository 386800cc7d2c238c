//! Rate limit metadata extracted from API response headers.
//!
//! The Artifex API reports quota state on every response via the standard
//! `x-ratelimit-*` headers plus `retry-after`. Extraction is independent of
//! the response status; the executor attaches the result to rate-limit errors.

use chrono::{DateTime, TimeZone, Utc};
use reqwest::header::HeaderMap;
use std::time::Duration;

const LIMIT_HEADER: &str = "x-ratelimit-limit";
const REMAINING_HEADER: &str = "x-ratelimit-remaining";
const RESET_HEADER: &str = "x-ratelimit-reset";
const RETRY_AFTER_HEADER: &str = "retry-after";

/// Quota metadata parsed from response headers.
///
/// Every field is independently optional; [`RateLimitInfo::from_headers`]
/// yields `None` rather than an all-empty value when no header is present.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RateLimitInfo {
    /// Requests allowed in the current window.
    pub limit: Option<u32>,
    /// Requests remaining in the current window.
    pub remaining: Option<u32>,
    /// Absolute instant at which the window resets.
    pub reset_at: Option<DateTime<Utc>>,
    /// Server-requested delay before the next attempt.
    pub retry_after: Option<Duration>,
}

impl RateLimitInfo {
    /// Parse rate limit headers from a response.
    ///
    /// Missing or unparseable headers leave the corresponding field unset.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let limit = parse_numeric_header(headers, LIMIT_HEADER);
        let remaining = parse_numeric_header(headers, REMAINING_HEADER);
        let reset_at = parse_numeric_header::<i64>(headers, RESET_HEADER)
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single());
        let retry_after =
            parse_numeric_header::<u64>(headers, RETRY_AFTER_HEADER).map(Duration::from_secs);

        if limit.is_none() && remaining.is_none() && reset_at.is_none() && retry_after.is_none() {
            return None;
        }

        Some(Self {
            limit,
            remaining,
            reset_at,
            retry_after,
        })
    }
}

fn parse_numeric_header<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}
