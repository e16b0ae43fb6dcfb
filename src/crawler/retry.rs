//! Retry policy for fallible operations
//!
//! Wraps an async operation with bounded attempts and randomized backoff.
//! Exhausting the attempts yields `Ok(None)` — a defined "no result"
//! outcome, not an error — while non-retryable errors propagate
//! immediately without backoff.

use crate::config::RetryConfig;
use rand::Rng;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Classifies an error as retryable or not
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Bounded-attempt retry with jittered backoff
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_wait: Duration,
}

impl RetryPolicy {
    /// Creates a policy. `max_attempts` must be at least 1 (validated at
    /// config load; clamped here for direct construction).
    pub fn new(max_attempts: u32, base_wait: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_wait,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.base_wait_ms),
        )
    }

    /// Runs `op` up to `max_attempts` times.
    ///
    /// * success → `Ok(Some(value))`
    /// * retryable error on every attempt → `Ok(None)` after exactly
    ///   `max_attempts` calls
    /// * non-retryable error → `Err` immediately, no backoff
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<Option<T>, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + Display,
    {
        for attempt in 1..=self.max_attempts {
            match op().await {
                Ok(value) => return Ok(Some(value)),
                Err(e) if e.is_retryable() => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "retryable failure"
                    );
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.backoff_wait()).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    /// Base wait scaled by a random factor sampled uniformly in [1, 2)
    fn backoff_wait(&self) -> Duration {
        let jitter: f64 = rand::thread_rng().gen_range(1.0..2.0);
        self.base_wait.mul_f64(jitter)
    }
}
