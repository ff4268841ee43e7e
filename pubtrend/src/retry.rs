//! Retry with exponential backoff for E-utilities requests
//!
//! Each logical request runs through a small state machine:
//!
//! ```text
//! Attempting ──ok──▶ Verifying ──ok──▶ Succeeded
//!     │                  │
//!   error            mismatch
//!     ▼                  ▼
//!  Backoff ◀─────────────┘   (retryable, attempts left)
//!     │
//!  Exhausted                 (no attempts left, or not retryable)
//! ```
//!
//! Only errors whose [`RetryableError::is_retryable`] is true lead to a backoff.
//! Exhausting the attempt budget on a transient error yields
//! [`PubMedError::UpstreamUnavailable`] wrapping the last error.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use crate::error::{PubMedError, Result};

/// Classification of errors for the retry state machine
pub trait RetryableError {
    /// Whether the failed request should be attempted again
    fn is_retryable(&self) -> bool;

    /// Short human-readable reason, used in retry logs
    fn retry_reason(&self) -> &str;
}

/// Backoff configuration for upstream requests
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts per logical request, including the first one
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Factor applied to the delay after every retry
    pub multiplier: f64,
    /// Upper bound for a single delay
    pub max_delay: Duration,
    /// Add up to 10% random jitter to each delay
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
            multiplier: 2.0,
            max_delay: Duration::from_secs(60),
            jitter: false,
        }
    }
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single attempt, no retries
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier.max(1.0);
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay before retry number `retry` (0-based), without jitter
    ///
    /// With the defaults this yields 1s, 2s, 4s, 8s.
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let factor = self.multiplier.powi(retry as i32);
        let delay = self.initial_delay.as_secs_f64() * factor;
        Duration::from_secs_f64(delay.min(self.max_delay.as_secs_f64()))
    }

    /// The full sequence of delays this configuration can produce
    pub fn backoff_schedule(&self) -> Vec<Duration> {
        (0..self.max_attempts.saturating_sub(1))
            .map(|retry| self.delay_for_retry(retry))
            .collect()
    }

    fn jittered(&self, delay: Duration) -> Duration {
        if !self.jitter || delay.is_zero() {
            return delay;
        }
        let extra = rand::thread_rng().gen_range(0.0..0.1);
        delay.mul_f64(1.0 + extra)
    }
}

enum RetryState<T> {
    Attempting { attempt: u32 },
    Verifying { attempt: u32, value: T },
    Backoff { attempt: u32, error: PubMedError },
    Succeeded(T),
    Exhausted { attempts: u32, error: PubMedError },
}

/// Run `operation` under the retry policy
pub async fn with_retry<T, F, Fut>(operation: F, config: &RetryConfig, context: &str) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    with_verified_retry(operation, |_| Ok(()), config, context).await
}

/// Run `operation` under the retry policy, re-issuing it when `verify` rejects the value
pub async fn with_verified_retry<T, F, Fut, V>(
    operation: F,
    verify: V,
    config: &RetryConfig,
    context: &str,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
    V: Fn(&T) -> Result<()>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut state = RetryState::Attempting { attempt: 1 };

    loop {
        state = match state {
            RetryState::Attempting { attempt } => match operation().await {
                Ok(value) => RetryState::Verifying { attempt, value },
                Err(error) => RetryState::Backoff { attempt, error },
            },
            RetryState::Verifying { attempt, value } => match verify(&value) {
                Ok(()) => RetryState::Succeeded(value),
                Err(error) => RetryState::Backoff { attempt, error },
            },
            RetryState::Backoff { attempt, error } => {
                if !error.is_retryable() || attempt >= max_attempts {
                    RetryState::Exhausted {
                        attempts: attempt,
                        error,
                    }
                } else {
                    let delay = config.jittered(config.delay_for_retry(attempt - 1));
                    warn!(
                        context = context,
                        attempt = attempt,
                        max_attempts = max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        reason = error.retry_reason(),
                        error = %error,
                        "Request failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    RetryState::Attempting {
                        attempt: attempt + 1,
                    }
                }
            }
            RetryState::Succeeded(value) => return Ok(value),
            RetryState::Exhausted { attempts, error } => {
                if !error.is_retryable() {
                    debug!(context = context, error = %error, "Non-retryable error");
                    return Err(error);
                }
                warn!(context = context, attempts = attempts, "Retries exhausted");
                return Err(PubMedError::UpstreamUnavailable {
                    attempts,
                    source: Box::new(error),
                });
            }
        };
    }
}
