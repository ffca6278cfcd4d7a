//! Retry decorator for transient gateway failures.

use review_core::{AnalysisGateway, AnalysisRequest, GatewayError, RawResponse};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::config::MAX_RETRIES;

/// Longest single backoff sleep.
pub const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Exponential backoff schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub factor: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_secs(1),
            factor: 2,
        }
    }
}

impl RetryPolicy {
    /// Default schedule with `max_retries`, capped at [`MAX_RETRIES`].
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries: max_retries.min(MAX_RETRIES),
            ..Self::default()
        }
    }

    /// Delay before retry number `retry` (1-based): `base * factor^(retry-1)`,
    /// never more than [`MAX_BACKOFF`].
    pub fn delay_for(&self, retry: u32) -> Duration {
        let multiplier = self
            .factor
            .checked_pow(retry.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(multiplier).min(MAX_BACKOFF)
    }
}

/// Wraps a gateway and retries Timeout and RateLimited failures.
///
/// Unavailable is returned at once since it usually means bad credentials
/// or an unreachable host.
#[derive(Debug, Clone)]
pub struct RetryingGateway<G> {
    inner: G,
    policy: RetryPolicy,
}

impl<G: AnalysisGateway> RetryingGateway<G> {
    pub fn new(inner: G, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    async fn send_with_retry(
        &self,
        request: &AnalysisRequest,
    ) -> Result<RawResponse, GatewayError> {
        let mut retry = 0;
        loop {
            match self.inner.send(request).await {
                Err(err) if err.is_retryable() && retry < self.policy.max_retries => {
                    retry += 1;
                    let delay = self.policy.delay_for(retry);
                    warn!(
                        retry,
                        max_retries = self.policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient upstream failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }
}

impl<G: AnalysisGateway> AnalysisGateway for RetryingGateway<G> {
    fn send(
        &self,
        request: &AnalysisRequest,
    ) -> impl Future<Output = Result<RawResponse, GatewayError>> + Send {
        self.send_with_retry(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use review_core::{DEFAULT_MAX_CHARS, ReviewText};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Flaky {
        replies: Mutex<VecDeque<Result<RawResponse, GatewayError>>>,
        calls: AtomicUsize,
    }

    impl Flaky {
        fn new(replies: Vec<Result<RawResponse, GatewayError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl AnalysisGateway for Flaky {
        fn send(
            &self,
            _request: &AnalysisRequest,
        ) -> impl Future<Output = Result<RawResponse, GatewayError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let reply = self.replies.lock().unwrap().pop_front().unwrap();
            async move { reply }
        }
    }

    fn request() -> AnalysisRequest {
        let text = ReviewText::new("fine", DEFAULT_MAX_CHARS).unwrap();
        AnalysisRequest::new(text, 1, "prompt".to_string(), serde_json::Value::Null)
    }

    fn ok() -> Result<RawResponse, GatewayError> {
        Ok(RawResponse::new("{}", "m"))
    }

    #[test]
    fn delays_grow_exponentially() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(4));
    }

    #[test]
    fn huge_retry_counts_are_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(100), MAX_BACKOFF);
    }

    #[test]
    fn retry_count_is_capped() {
        assert_eq!(RetryPolicy::with_max_retries(40).max_retries, MAX_RETRIES);
        assert_eq!(RetryPolicy::with_max_retries(1).max_retries, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_timeouts_then_succeeds() {
        let flaky = Flaky::new(vec![
            Err(GatewayError::Timeout("t".into())),
            Err(GatewayError::RateLimited("r".into())),
            ok(),
        ]);
        let gateway = RetryingGateway::new(&flaky, RetryPolicy::default());

        let started = tokio::time::Instant::now();
        let response = gateway.send(&request()).await.unwrap();

        assert_eq!(response.body(), "{}");
        assert_eq!(flaky.calls(), 3);
        assert!(started.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_retries() {
        let flaky = Flaky::new(vec![
            Err(GatewayError::Timeout("1".into())),
            Err(GatewayError::Timeout("2".into())),
            Err(GatewayError::Timeout("3".into())),
        ]);
        let gateway = RetryingGateway::new(&flaky, RetryPolicy::default());

        let err = gateway.send(&request()).await.unwrap_err();

        assert_eq!(err, GatewayError::Timeout("3".into()));
        assert_eq!(flaky.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn unavailable_is_not_retried() {
        let flaky = Flaky::new(vec![Err(GatewayError::Unavailable("401".into())), ok()]);
        let gateway = RetryingGateway::new(&flaky, RetryPolicy::default());

        assert!(gateway.send(&request()).await.is_err());
        assert_eq!(flaky.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_retries_means_single_attempt() {
        let flaky = Flaky::new(vec![Err(GatewayError::RateLimited("r".into())), ok()]);
        let gateway = RetryingGateway::new(&flaky, RetryPolicy::with_max_retries(0));

        assert!(gateway.send(&request()).await.is_err());
        assert_eq!(flaky.calls(), 1);
    }
}
