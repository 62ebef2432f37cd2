//! src/util/backoff.rs
//! ============================================================================
//! # Backoff: Bounded Retry With Exponential Delay
//!
//! Generic retry executor for a single asynchronous load operation. Delays
//! double per attempt up to a cap, with uniform jitter on top. Concurrent
//! `attempt` calls are independent and unordered relative to each other.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use thiserror::Error;
use tokio::time::sleep;
use tracing::debug;

/// Delay and budget knobs for one retry loop.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total tries, counting the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub cap_delay: Duration,
    /// Upper bound (exclusive) of the uniform jitter.
    pub jitter_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(1000),
            cap_delay: Duration::from_millis(10_000),
            jitter_max: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Pre-jitter delay after failed attempt `attempt` (1-based):
    /// `min(base_delay * 2^(attempt-1), cap_delay)`.
    pub fn base_backoff(&self, attempt: u32) -> Duration {
        let attempt: u32 = attempt.max(1);
        let factor: u32 = 2u32.saturating_pow(attempt - 1);
        self.base_delay.saturating_mul(factor).min(self.cap_delay)
    }

    /// Full delay after failed attempt `attempt`: capped exponential base
    /// plus jitter drawn uniformly from `[0, jitter_max)`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let base: Duration = self.base_backoff(attempt);
        let jitter_cap: u64 = self.jitter_max.as_millis() as u64;
        if jitter_cap == 0 {
            return base;
        }
        let jitter_ms: u64 = rand::thread_rng().gen_range(0..jitter_cap);
        base + Duration::from_millis(jitter_ms)
    }
}

/// Terminal state of a retry loop whose budget ran out.
#[derive(Debug, Error)]
#[error("gave up after {attempts} attempts: {source}")]
pub struct RetryExhausted<E>
where
    E: std::error::Error + 'static,
{
    pub attempts: u32,
    #[source]
    pub source: E,
}

/// Runs `operation` until it succeeds or `policy.max_attempts` tries have
/// failed, sleeping the backoff delay between tries.
///
/// `operation` takes no parameters and returns a fresh future per call
/// (same shape as the loader closures elsewhere in the crate).
pub async fn attempt<T, E, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::error::Error + 'static,
{
    let budget: u32 = policy.max_attempts.max(1);
    let mut attempt_no: u32 = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(source) if attempt_no >= budget => {
                return Err(RetryExhausted {
                    attempts: attempt_no,
                    source,
                });
            }
            Err(source) => {
                let delay: Duration = policy.backoff_delay(attempt_no);
                debug!("attempt {attempt_no} failed ({source}), retrying in {delay:?}");
                sleep(delay).await;
                attempt_no += 1;
            }
        }
    }
}

// ------------------------------------------------------------------------- //
// Tests
// ------------------------------------------------------------------------- //

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn instant_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::ZERO,
            cap_delay: Duration::ZERO,
            jitter_max: Duration::ZERO,
        }
    }

    #[test]
    fn base_backoff_doubles_and_caps() {
        let policy: RetryPolicy = RetryPolicy::default();

        assert_eq!(policy.base_backoff(1), Duration::from_millis(1000));
        assert_eq!(policy.base_backoff(2), Duration::from_millis(2000));
        assert_eq!(policy.base_backoff(3), Duration::from_millis(4000));
        assert_eq!(policy.base_backoff(4), Duration::from_millis(8000));
        // capped from here on
        assert_eq!(policy.base_backoff(5), Duration::from_millis(10_000));
        assert_eq!(policy.base_backoff(9), Duration::from_millis(10_000));

        let mut previous: Duration = Duration::ZERO;
        for attempt in 1..=9 {
            let delay: Duration = policy.base_backoff(attempt);
            assert!(delay >= previous, "backoff must be non-decreasing");
            assert!(delay <= policy.cap_delay);
            previous = delay;
        }
    }

    #[test]
    fn backoff_delay_stays_within_jitter_bound() {
        let policy: RetryPolicy = RetryPolicy::default();
        for _ in 0..64 {
            let delay: Duration = policy.backoff_delay(1);
            assert!(delay >= Duration::from_millis(1000));
            assert!(delay < Duration::from_millis(2000));
        }
    }

    #[tokio::test]
    async fn resolves_immediately_on_first_success() {
        let mut calls: u32 = 0;
        let result: Result<u32, RetryExhausted<io::Error>> =
            attempt(&instant_policy(5), || {
                calls += 1;
                async { Ok(7) }
            })
            .await;

        assert_eq!(result.expect("should succeed"), 7);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn retries_until_success() {
        let mut calls: u32 = 0;
        let result: Result<u32, RetryExhausted<io::Error>> =
            attempt(&instant_policy(5), || {
                calls += 1;
                let n: u32 = calls;
                async move {
                    if n < 3 {
                        Err(io::Error::other("transient"))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result.expect("should succeed on third try"), 3);
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn performs_exactly_max_attempts_then_fails() {
        let mut calls: u32 = 0;
        let result: Result<(), RetryExhausted<io::Error>> =
            attempt(&instant_policy(5), || {
                calls += 1;
                async { Err(io::Error::other("permanent")) }
            })
            .await;

        let exhausted: RetryExhausted<io::Error> = result.expect_err("must exhaust");
        assert_eq!(exhausted.attempts, 5);
        assert_eq!(calls, 5);
    }
}
