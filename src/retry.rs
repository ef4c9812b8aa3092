//! Bounded retry for any fallible async I/O call.
//!
//! The caller decides which errors are worth another attempt; everything
//! else propagates on the first failure.

use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// How long to wait before the next attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// The same pause before every retry.
    Fixed(Duration),
    /// `base * 2^retry` with ±30% jitter.
    Exponential { base: Duration },
}

impl Backoff {
    /// Delay before retry number `retry` (0-based).
    pub fn delay(&self, retry: u32) -> Duration {
        match *self {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { base } => calculate_backoff_delay(retry, base),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Zero is treated as one.
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// `max_retries` retries after the first attempt, fixed pause in between.
    pub fn fixed(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_retries.saturating_add(1),
            backoff: Backoff::Fixed(delay),
        }
    }

    pub fn exponential(max_attempts: u32, base: Duration) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Exponential { base },
        }
    }
}

/// Why a retried call gave up.
#[derive(Debug, PartialEq, Eq)]
pub enum RetryError<E> {
    /// The error was not retryable; returned on the attempt it happened.
    Permanent { error: E, attempts: u32 },
    /// Every attempt failed with a retryable error. Holds the last one.
    Exhausted { error: E, attempts: u32 },
}

impl<E> RetryError<E> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Permanent { attempts, .. } | RetryError::Exhausted { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn into_inner(self) -> E {
        match self {
            RetryError::Permanent { error, .. } | RetryError::Exhausted { error, .. } => error,
        }
    }
}

/// Run `operation` until it succeeds, fails with an error `is_retryable`
/// rejects, or the policy's attempts are spent. `notify` sees every retryable
/// failure together with the pause that follows it, right before sleeping.
pub async fn retry_notify<T, E, Op, Fut, P, N>(
    policy: RetryPolicy,
    mut operation: Op,
    is_retryable: P,
    mut notify: N,
) -> Result<T, RetryError<E>>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    N: FnMut(&E, Duration),
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) if !is_retryable(&error) => {
                return Err(RetryError::Permanent {
                    error,
                    attempts: attempt,
                });
            }
            Err(error) if attempt >= max_attempts => {
                return Err(RetryError::Exhausted {
                    error,
                    attempts: attempt,
                });
            }
            Err(error) => {
                let delay = policy.backoff.delay(attempt - 1);
                notify(&error, delay);
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Exponential backoff delay with jitter.
pub fn calculate_backoff_delay(retry: u32, base: Duration) -> Duration {
    // Cap the exponent to prevent overflow
    let capped = retry.min(10);
    let base_delay = base.saturating_mul(2_u32.saturating_pow(capped));

    // Add jitter: ±30% randomness
    let jitter_factor = rand::thread_rng().gen_range(0.7..1.3);
    base_delay.mul_f64(jitter_factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug, PartialEq, Eq)]
    enum TestError {
        Busy,
        Broken,
    }

    fn is_busy(e: &TestError) -> bool {
        *e == TestError::Busy
    }

    #[tokio::test]
    async fn test_succeeds_after_retryable_failures() {
        let calls = Cell::new(0);
        let mut sleeps = Vec::new();

        let result = retry_notify(
            RetryPolicy::fixed(3, Duration::from_millis(1)),
            || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move { if n < 3 { Err(TestError::Busy) } else { Ok(n) } }
            },
            is_busy,
            |_, delay| sleeps.push(delay),
        )
        .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.get(), 3);
        assert_eq!(sleeps, vec![Duration::from_millis(1); 2]);
    }

    #[tokio::test]
    async fn test_exhausts_after_max_attempts() {
        let calls = Cell::new(0);
        let mut sleeps = 0;

        let result: Result<(), _> = retry_notify(
            RetryPolicy::fixed(3, Duration::ZERO),
            || {
                calls.set(calls.get() + 1);
                async { Err(TestError::Busy) }
            },
            is_busy,
            |_, _| sleeps += 1,
        )
        .await;

        assert_eq!(
            result,
            Err(RetryError::Exhausted {
                error: TestError::Busy,
                attempts: 4
            })
        );
        assert_eq!(calls.get(), 4);
        assert_eq!(sleeps, 3);
    }

    #[tokio::test]
    async fn test_permanent_error_is_not_retried() {
        let calls = Cell::new(0);

        let result: Result<(), _> = retry_notify(
            RetryPolicy::fixed(3, Duration::ZERO),
            || {
                calls.set(calls.get() + 1);
                async { Err(TestError::Broken) }
            },
            is_busy,
            |_, _| panic!("permanent errors never back off"),
        )
        .await
        .map_err(|e| e.attempts());

        assert_eq!(result, Err(1));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let policy = RetryPolicy {
            max_attempts: 0,
            backoff: Backoff::Fixed(Duration::ZERO),
        };
        let result: Result<u8, RetryError<TestError>> =
            retry_notify(policy, || async { Ok(7) }, is_busy, |_, _| {}).await;
        assert_eq!(result, Ok(7));
    }

    #[test]
    fn test_backoff_progression() {
        let base = Duration::from_secs(30);

        let delay0 = calculate_backoff_delay(0, base);
        let delay1 = calculate_backoff_delay(1, base);
        let delay2 = calculate_backoff_delay(2, base);

        // Delays should be in expected ranges with jitter
        assert!(delay0.as_secs() >= 21 && delay0.as_secs() <= 39); // 30s ±30%
        assert!(delay1.as_secs() >= 42 && delay1.as_secs() <= 78); // 60s ±30%
        assert!(delay2.as_secs() >= 84 && delay2.as_secs() <= 156); // 120s ±30%
    }

    #[test]
    fn test_backoff_cap() {
        let base = Duration::from_secs(30);
        // At retry 10: 30 * 1024 = 30720s, jitter 0.7-1.3
        let delay_high = calculate_backoff_delay(20, base);
        assert!(delay_high.as_secs() >= 21000 && delay_high.as_secs() <= 40000);
    }

    #[test]
    fn test_fixed_backoff_is_constant() {
        let backoff = Backoff::Fixed(Duration::from_secs(30));
        assert_eq!(backoff.delay(0), Duration::from_secs(30));
        assert_eq!(backoff.delay(7), Duration::from_secs(30));
    }
}
