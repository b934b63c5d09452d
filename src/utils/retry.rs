//! Retry policy with exponential backoff and jitter.
//!
//! Shared by the embedding and completion pipelines. `RateLimited` failures
//! sleep and retry; `PayloadTooLarge` and `Unexpected` return to the caller
//! immediately (the embedding path resubmits smaller batches, the completion
//! path degrades to an apology); an exhausted budget becomes
//! `RetryBudgetExceeded`.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::error::RagError;
use crate::models::RetryConfig;

/// Validated retry parameters for one call site.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff_factor: f64,
}

impl RetryPolicy {
    /// Create a policy. `max_retries` must be positive and `backoff_factor`
    /// at least 1.
    pub fn new(max_retries: u32, backoff_factor: f64) -> Result<Self, RagError> {
        if max_retries == 0 {
            return Err(RagError::InvalidArgument(
                "max_retries must be positive".to_string(),
            ));
        }
        if !(backoff_factor >= 1.0) {
            return Err(RagError::InvalidArgument(
                "backoff_factor must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            max_retries,
            backoff_factor,
        })
    }

    pub fn from_config(config: &RetryConfig) -> Result<Self, RagError> {
        Self::new(config.max_retries, config.backoff_factor)
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Backoff before re-attempting after failure of 0-indexed `attempt`:
    /// `backoff_factor^attempt + jitter`, jitter uniform in [0, 1) seconds.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let base = self.backoff_factor.powi(attempt as i32);
        Duration::from_secs_f64(base + jitter())
    }
}

/// Jitter in [0, 1) seconds, derived from the clock.
/// Not uniform in the cryptographic sense, which is fine for backoff spread.
fn jitter() -> f64 {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    f64::from(nanos) / 1e9
}

/// Drive a remote call through the retry policy.
///
/// The operation reports failures already classified into the error
/// taxonomy (see `error::classify_remote`). Only `RateLimited` consumes an
/// attempt and retries; every other error is returned as-is so the caller
/// can apply its own degraded-failure behavior. No sleep is taken after the
/// final attempt.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, RagError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RagError>>,
{
    for attempt in 0..policy.max_retries() {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(RagError::RateLimited(message)) => {
                if attempt + 1 == policy.max_retries() {
                    break;
                }
                let delay = policy.backoff_delay(attempt);
                eprintln!(
                    "rate limited ({message}); retrying in {:.2}s",
                    delay.as_secs_f64()
                );
                sleep(delay).await;
            }
            Err(other) => return Err(other),
        }
    }
    Err(RagError::RetryBudgetExceeded {
        attempts: policy.max_retries(),
    })
}
