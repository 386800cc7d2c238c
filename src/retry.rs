//! Retry Policy Module
//!
//! Decides whether a failed attempt should be retried and how long to wait
//! before the next one. Delays grow exponentially from `base_delay`; a
//! rate-limit error carrying an explicit `retry-after` overrides the
//! exponential schedule for that attempt. Jitter is available but off by
//! default so the schedule stays deterministic.

use rand::Rng;
use std::time::Duration;

use crate::error::ArtifexError;

/// Retry policy configuration.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt. A value of `N`
    /// allows up to `N + 1` attempts in total.
    pub max_retries: u32,
    /// Base delay; attempt `n` (1-based) waits `base_delay * multiplier^n`.
    pub base_delay: Duration,
    /// Backoff multiplier for exponential growth.
    pub multiplier: f64,
    /// Cap on the computed delay.
    pub max_delay: Duration,
    /// Whether to add jitter to computed delays.
    pub use_jitter: bool,
    /// Maximum jitter fraction (0.0 to 1.0) applied around the delay.
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
            multiplier: 2.0,
            max_delay: Duration::from_secs(60),
            use_jitter: false,
            jitter_factor: 0.1,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum retry count.
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the base delay.
    pub const fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set the maximum delay.
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the backoff multiplier.
    pub const fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Enable or disable jitter.
    pub const fn with_jitter(mut self, use_jitter: bool) -> Self {
        self.use_jitter = use_jitter;
        self
    }

    /// Set the jitter factor.
    pub fn with_jitter_factor(mut self, factor: f64) -> Self {
        self.jitter_factor = factor.clamp(0.0, 1.0);
        self
    }

    /// Whether to retry after the given failure.
    ///
    /// `attempt` is the 1-based number of attempts that have already failed.
    pub fn should_retry(&self, error: &ArtifexError, attempt: u32) -> bool {
        attempt <= self.max_retries && error.is_retryable()
    }

    /// Delay to wait before re-issuing attempt `attempt + 1`.
    ///
    /// A rate-limit error with an explicit `retry-after` takes precedence
    /// over the exponential schedule.
    pub fn delay_for(&self, error: &ArtifexError, attempt: u32) -> Duration {
        if let Some(retry_after) = error.retry_after() {
            return retry_after;
        }

        let millis = self.base_delay.as_millis() as f64 * self.multiplier.powi(attempt as i32);
        let delay = Duration::from_millis(millis as u64).min(self.max_delay);

        if self.use_jitter {
            self.add_jitter(delay)
        } else {
            delay
        }
    }

    fn add_jitter(&self, delay: Duration) -> Duration {
        let mut rng = rand::thread_rng();
        let jitter_range = delay.as_millis() as f64 * self.jitter_factor;
        let jitter = rng.gen_range(-jitter_range..=jitter_range);

        let jittered = delay.as_millis() as f64 + jitter;
        Duration::from_millis(jittered.max(0.0) as u64)
    }
}
