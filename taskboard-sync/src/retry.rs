//! Bounded retry with linear backoff.
//!
//! Attempt `i` (1-based) failing waits `base_delay * i` before the next one;
//! the last attempt's failure is returned as-is. With the defaults that is
//! 1s then 2s, three attempts in total.

use std::future::Future;
use std::time::Duration;

use taskboard_remote::{Operation, RemoteError};

use crate::error::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay after the given failed attempt (1-based). Saturates at
    /// `Duration::MAX`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// Worst-case time spent sleeping before the final failure.
    pub fn total_backoff(&self) -> Duration {
        (1..self.max_attempts)
            .map(|a| self.delay_after(a))
            .fold(Duration::ZERO, Duration::saturating_add)
    }

    pub async fn run<T, F, Fut>(&self, operation: Operation, mut call: F) -> Result<T, SyncError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let max = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(source) if attempt >= max => {
                    tracing::warn!(%operation, attempt, error = %source, "giving up");
                    return Err(SyncError::Remote {
                        operation,
                        attempts: attempt,
                        source,
                    });
                }
                Err(source) => {
                    let delay = self.delay_after(attempt);
                    tracing::warn!(
                        %operation,
                        attempt,
                        error = %source,
                        retry_in_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "attempt failed"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
