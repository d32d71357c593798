//! The bounded retry loop.

use crate::error::{AttemptError, FetchError};
use crate::transport::TrendTransport;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Retry policy for one fetch.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Per-request timeout in seconds (enforced by the transport).
    pub timeout_secs: u64,
    /// Total attempt budget; the fetcher makes exactly this many attempts
    /// against a permanently failing upstream.
    pub max_retries: u32,
}

impl RetryPolicy {
    /// Per-request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// A successfully fetched, validated response body.
///
/// Ownership transfers to the caller; persisting it is the pipeline's job.
#[derive(Debug, Clone)]
pub struct RawPayload {
    /// The validated JSON body.
    pub body: Value,
    /// How many attempts the fetch took (1-based).
    pub attempts: u32,
}

/// Backoff before the 0-indexed attempt `k` (k >= 1): `2^(k-1)` seconds.
///
/// A pure function of the attempt index, with no jitter and no latency feedback,
/// so the wait sequence for a given budget is fully deterministic.
pub fn backoff_delay(attempt: u32) -> Duration {
    debug_assert!(attempt >= 1, "no backoff before the first attempt");
    Duration::from_secs(1u64 << (attempt - 1))
}

/// Fetch client with bounded retry and exponential backoff.
pub struct RetryingFetcher<T: TrendTransport> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: TrendTransport> RetryingFetcher<T> {
    /// Create a fetcher over the given transport and policy.
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// The configured policy.
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Fetch `url`, validating each structurally successful response with
    /// `validate` before accepting it.
    ///
    /// An invalid response counts as a retryable failure exactly like a
    /// transport error. Only exhaustion of the whole budget surfaces, as
    /// [`FetchError::Exhausted`] carrying the attempt count and the last
    /// observed error.
    pub async fn fetch<V>(
        &self,
        url: &str,
        params: &[(String, String)],
        validate: V,
    ) -> Result<RawPayload, FetchError>
    where
        V: Fn(&Value) -> Result<(), String>,
    {
        let mut last_error = AttemptError::InvalidResponse("no attempts permitted".to_string());

        for attempt in 0..self.policy.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(attempt);
                debug!(
                    "waiting {}s before attempt {}/{}",
                    delay.as_secs(),
                    attempt + 1,
                    self.policy.max_retries
                );
                tokio::time::sleep(delay).await;
            }

            match self.transport.get(url, params).await {
                Ok(body) => match validate(&body) {
                    Ok(()) => {
                        info!(
                            "fetch succeeded on attempt {}/{}",
                            attempt + 1,
                            self.policy.max_retries
                        );
                        return Ok(RawPayload {
                            body,
                            attempts: attempt + 1,
                        });
                    }
                    Err(reason) => {
                        warn!(
                            "attempt {}/{} returned an invalid response: {}",
                            attempt + 1,
                            self.policy.max_retries,
                            reason
                        );
                        last_error = AttemptError::InvalidResponse(reason);
                    }
                },
                Err(e) => {
                    warn!(
                        "attempt {}/{} failed: {}",
                        attempt + 1,
                        self.policy.max_retries,
                        e
                    );
                    last_error = AttemptError::Transport(e);
                }
            }
        }

        Err(FetchError::Exhausted {
            attempts: self.policy.max_retries,
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use serde_json::json;
    use tokio::time::Instant;

    fn accept_all(_: &Value) -> Result<(), String> {
        Ok(())
    }

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            timeout_secs: 30,
            max_retries,
        }
    }

    #[test]
    fn test_backoff_sequence() {
        assert_eq!(backoff_delay(1), Duration::from_secs(1));
        assert_eq!(backoff_delay(2), Duration::from_secs(2));
        assert_eq!(backoff_delay(3), Duration::from_secs(4));
        assert_eq!(backoff_delay(4), Duration::from_secs(8));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt_never_sleeps() {
        let transport = MockTransport::with_script(vec![Ok(json!({"code": 200}))]);
        let fetcher = RetryingFetcher::new(transport, policy(3));

        let start = Instant::now();
        let payload = fetcher.fetch("http://x", &[], accept_all).await.unwrap();

        assert_eq!(payload.attempts, 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(fetcher.transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_makes_exactly_max_retries_attempts() {
        let transport = MockTransport::always_failing();
        let fetcher = RetryingFetcher::new(transport, policy(3));

        let start = Instant::now();
        let err = fetcher.fetch("http://x", &[], accept_all).await.unwrap_err();

        // Exactly 3 attempts with 1s + 2s waits between them, none after.
        assert_eq!(fetcher.transport.calls(), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(3));
        let FetchError::Exhausted {
            attempts,
            last_error,
        } = err;
        assert_eq!(attempts, 3);
        assert!(matches!(last_error, AttemptError::Transport(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_response_is_retried_like_transport_error() {
        let transport = MockTransport::with_script(vec![
            Ok(json!({"code": 250, "msg": "api error"})),
            Ok(json!({"code": 200, "result": []})),
        ]);
        let fetcher = RetryingFetcher::new(transport, policy(3));

        let validate = |body: &Value| {
            if body["code"] == json!(200) {
                Ok(())
            } else {
                Err(format!("API returned code {}", body["code"]))
            }
        };

        let payload = fetcher.fetch("http://x", &[], validate).await.unwrap();
        assert_eq!(payload.attempts, 2);
        assert_eq!(fetcher.transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanently_invalid_response_exhausts_budget() {
        let transport = MockTransport::with_script(vec![
            Ok(json!({"code": 250})),
            Ok(json!({"code": 250})),
        ]);
        let fetcher = RetryingFetcher::new(transport, policy(2));

        let err = fetcher
            .fetch("http://x", &[], |_| Err("bad shape".to_string()))
            .await
            .unwrap_err();

        let FetchError::Exhausted {
            attempts,
            last_error,
        } = err;
        assert_eq!(attempts, 2);
        assert!(matches!(last_error, AttemptError::InvalidResponse(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_budget_never_calls_transport() {
        let transport = MockTransport::always_failing();
        let fetcher = RetryingFetcher::new(transport, policy(0));

        let err = fetcher.fetch("http://x", &[], accept_all).await.unwrap_err();
        assert_eq!(fetcher.transport.calls(), 0);
        let FetchError::Exhausted { attempts, .. } = err;
        assert_eq!(attempts, 0);
    }
}
