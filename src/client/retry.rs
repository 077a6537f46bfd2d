//! Exponential-backoff retry policy (spec §4.1 C2, §8 invariant 2).
//!
//! Grounded on `original_source/stockx/api/client/retry.py`'s `_Retry` and
//! the teacher's `RetryConfig`/`should_retry` in the original `batch.rs`.

use std::time::Duration;

use crate::error::{Error, StatusKind};

/// Retry configuration: bounded by attempts AND total wall-clock budget.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            initial_delay: Duration::from_secs(1),
            timeout: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration, timeout: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            timeout,
        }
    }

    /// Delay for the given 0-indexed attempt: `initial * 2^attempt + jitter`,
    /// jitter uniform in `[0, 10% of the base delay)`.
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.saturating_mul(1u32 << attempt.min(30));
        let jitter_fraction = jitter_fraction();
        let jitter = base.mul_f64(0.1 * jitter_fraction);
        base + jitter
    }

    /// Run `op` under this policy. `op` is retried while the error carries
    /// a retryable status code, attempts remain, and the wall-clock budget
    /// is not exhausted. The final error returned is the last one observed.
    pub async fn run<F, Fut, T>(&self, mut op: F) -> Result<T, Error>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, Error>>,
    {
        let mut waited = Duration::ZERO;
        let mut last_error = None;

        for attempt in 0..self.max_attempts {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    let retryable = matches!(&e, Error::Request { status, .. } if status.is_retryable());
                    last_error = Some(e);

                    if !retryable || waited >= self.timeout {
                        break;
                    }

                    let remaining = self.timeout - waited;
                    let delay = self.delay_for_attempt(attempt).min(remaining);
                    tracing::debug!(
                        attempt = attempt + 1,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis(),
                        "retrying request"
                    );
                    tokio::time::sleep(delay).await;
                    waited += delay;
                }
            }
        }

        Err(last_error.unwrap_or(Error::request(0, "retry loop exited without an error")))
    }
}

/// Deterministic-enough jitter source (no external rand dependency): derives
/// a value in `[0, 1)` from the current instant's sub-second fraction.
fn jitter_fraction() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    (nanos as f64 / 1_000_000_000.0).fract()
}

/// Helper used by callers that need to classify a raw status code without
/// constructing a full `Error`.
pub fn is_retryable_status(status: u16) -> bool {
    StatusKind::from_status(status).is_retryable()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_until_success() {
        let policy = RetryPolicy::new(5, Duration::from_millis(1), Duration::from_secs(5));
        let attempts = AtomicU32::new(0);

        let result = policy
            .run(|| {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(Error::request(503, "temporarily unavailable"))
                    } else {
                        Ok(42)
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(result, 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_non_transient_status() {
        let policy = RetryPolicy::default();
        let attempts = AtomicU32::new(0);

        let err = policy
            .run(|| {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(Error::request(404, "not found")) }
            })
            .await
            .unwrap_err();

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(err.status_code(), Some(404));
    }

    #[test]
    fn delay_grows_exponentially() {
        let policy = RetryPolicy::new(10, Duration::from_millis(100), Duration::from_secs(60));
        let d0 = policy.delay_for_attempt(0);
        let d1 = policy.delay_for_attempt(1);
        let d2 = policy.delay_for_attempt(2);

        assert!(d0 >= Duration::from_millis(100) && d0 < Duration::from_millis(110));
        assert!(d1 >= Duration::from_millis(200) && d1 < Duration::from_millis(220));
        assert!(d2 >= Duration::from_millis(400) && d2 < Duration::from_millis(440));
    }
}
