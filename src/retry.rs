//! Retry with exponential backoff for flaky async operations

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Each retry waits twice as long as the previous one.
pub const BACKOFF_MULTIPLIER: u32 = 2;

/// Errors that know whether another attempt could succeed.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// How many times to retry and how long to wait before the first retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_retries: u32,
    #[serde(rename = "initial_delay_ms", with = "duration_ms")]
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 3, initial_delay: Duration::from_millis(2000) }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self { max_retries, initial_delay }
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exp = retry.saturating_sub(1).min(31);
        self.initial_delay.saturating_mul(BACKOFF_MULTIPLIER.saturating_pow(exp))
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// `policy.max_retries` retries have been spent.
///
/// Attempts are strictly sequential and the wait between them is a tokio
/// sleep, so no worker thread is held. The last error is returned as-is.
pub async fn call_with_retry<T, E, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let mut retries = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && retries < policy.max_retries => {
                retries += 1;
                let delay = policy.delay_for(retries);
                tracing::warn!(
                    retry = retries,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying after error: {}",
                    err
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => {
                if retries > 0 {
                    tracing::debug!(retries, "Giving up after retries");
                }
                return Err(err);
            }
        }
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[derive(Debug, PartialEq)]
    enum FakeError {
        Transient,
        Fatal,
    }

    impl Display for FakeError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{self:?}")
        }
    }

    impl Retryable for FakeError {
        fn is_retryable(&self) -> bool {
            matches!(self, FakeError::Transient)
        }
    }

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::from_millis(100))
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_two_transient_failures() {
        let mut stamps: Vec<Instant> = Vec::new();

        let result = call_with_retry(&policy(3), || {
            stamps.push(Instant::now());
            let attempt = stamps.len();
            async move {
                if attempt < 3 {
                    Err(FakeError::Transient)
                } else {
                    Ok("reviewed")
                }
            }
        })
        .await;

        assert_eq!(result, Ok("reviewed"));
        assert_eq!(stamps.len(), 3, "two retries then success");
        assert_eq!(stamps[1] - stamps[0], Duration::from_millis(100));
        assert_eq!(stamps[2] - stamps[1], Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_propagates_last_error() {
        let mut attempts = 0u32;

        let result: Result<(), FakeError> = call_with_retry(&policy(3), || {
            attempts += 1;
            async { Err(FakeError::Transient) }
        })
        .await;

        assert_eq!(result, Err(FakeError::Transient));
        assert_eq!(attempts, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_short_circuits() {
        let mut attempts = 0u32;
        let start = Instant::now();

        let result: Result<(), FakeError> = call_with_retry(&policy(10), || {
            attempts += 1;
            async { Err(FakeError::Fatal) }
        })
        .await;

        assert_eq!(result, Err(FakeError::Fatal));
        assert_eq!(attempts, 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_means_single_attempt() {
        let mut attempts = 0u32;

        let result: Result<(), FakeError> = call_with_retry(&policy(0), || {
            attempts += 1;
            async { Err(FakeError::Transient) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_success_does_not_wait() {
        let start = Instant::now();
        let result: Result<u8, FakeError> = call_with_retry(&policy(3), || async { Ok(7) }).await;
        assert_eq!(result, Ok(7));
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_follow_policy_delays() {
        let p = policy(3);
        let mut stamps: Vec<Instant> = Vec::new();

        let result: Result<(), FakeError> = call_with_retry(&p, || {
            stamps.push(Instant::now());
            async { Err(FakeError::Transient) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(stamps.len(), 4);
        for retry in 1..=3u32 {
            let i = retry as usize;
            assert_eq!(stamps[i] - stamps[i - 1], p.delay_for(retry));
        }
    }

    #[test]
    fn test_delay_sequence_doubles() {
        let p = policy(5);
        assert_eq!(p.delay_for(1), Duration::from_millis(100));
        assert_eq!(p.delay_for(2), Duration::from_millis(200));
        assert_eq!(p.delay_for(3), Duration::from_millis(400));
    }

    #[test]
    fn test_policy_deserializes_millis() {
        let p: RetryPolicy = toml::from_str("max_retries = 1\ninitial_delay_ms = 50\n").expect("toml");
        assert_eq!(p, RetryPolicy::new(1, Duration::from_millis(50)));

        let defaults: RetryPolicy = toml::from_str("").expect("toml");
        assert_eq!(defaults, RetryPolicy::default());
    }
}
