//! Consistency poller.
//!
//! Writes are acknowledged before they become searchable. The poller re-runs an
//! idempotent check at a fixed interval until it reports the expected state.

use std::future::Future;

use tokio::time::{self, Instant};
use tracing::{debug, warn};

use crate::config::PollerConfig;
use crate::errors::SearchError;

/// What a polled operation observed.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome<T> {
    /// The expected state is visible.
    Ready(T),
    /// The operation succeeded but the expected state is not visible yet.
    Pending,
}

/// Retries an operation until it is `Ready`, bounded by a timeout.
///
/// Only `Pending` is retried. An `Err` from the operation is a permanent failure and
/// is returned immediately. Empty-but-successful and failed are never conflated.
#[derive(Debug, Clone, Default)]
pub struct ConsistencyPoller {
    config: PollerConfig,
}

impl ConsistencyPoller {
    pub fn new(config: PollerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Run `operation` until it returns `Ready`.
    ///
    /// # Returns
    ///
    /// * `Ok(T)` - The value of the first `Ready` outcome
    /// * `Err(SearchError::PollExhausted)` - If the timeout or attempt cap was reached
    /// * `Err(SearchError)` - The first error returned by `operation`
    pub async fn poll<T, F, Fut>(&self, mut operation: F) -> Result<T, SearchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<PollOutcome<T>, SearchError>>,
    {
        let started = Instant::now();
        let deadline = started + self.config.timeout;
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;

            let outcome = match time::timeout_at(deadline, operation()).await {
                Ok(outcome) => outcome?,
                // The attempt itself outlived the deadline
                Err(_) => return Err(self.exhausted(attempts, started)),
            };

            if let PollOutcome::Ready(value) = outcome {
                if attempts > 1 {
                    debug!(attempts = attempts, "Operation became visible after retry");
                }
                return Ok(value);
            }

            let capped = self
                .config
                .max_attempts
                .is_some_and(|max| attempts >= max);
            if capped || Instant::now() + self.config.interval > deadline {
                return Err(self.exhausted(attempts, started));
            }

            debug!(
                attempt = attempts,
                interval_ms = self.config.interval.as_millis() as u64,
                "Not visible yet, retrying"
            );
            time::sleep(self.config.interval).await;
        }
    }

    fn exhausted(&self, attempts: u32, started: Instant) -> SearchError {
        let elapsed = started.elapsed();
        warn!(
            attempts = attempts,
            elapsed_ms = elapsed.as_millis() as u64,
            "Gave up waiting for visibility"
        );
        SearchError::PollExhausted { attempts, elapsed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    fn poller(interval_ms: u64, timeout_ms: u64) -> ConsistencyPoller {
        ConsistencyPoller::new(PollerConfig::new(
            Duration::from_millis(interval_ms),
            Duration::from_millis(timeout_ms),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_on_first_attempt() {
        let calls = AtomicU32::new(0);

        let value = poller(100, 1_000)
            .poll(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(PollOutcome::Ready("visible")) }
            })
            .await
            .unwrap();

        assert_eq!(value, "visible");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_converges_after_n_pending() {
        let pending_rounds = 3;
        let attempts: Mutex<Vec<Instant>> = Mutex::new(Vec::new());

        let value = poller(100, 10_000)
            .poll(|| {
                let attempt = {
                    let mut times = attempts.lock().unwrap();
                    times.push(Instant::now());
                    times.len()
                };
                async move {
                    if attempt <= pending_rounds {
                        Ok(PollOutcome::Pending)
                    } else {
                        Ok(PollOutcome::Ready(attempt))
                    }
                }
            })
            .await
            .unwrap();

        // N pending rounds then success means N + 1 invocations
        assert_eq!(value, pending_rounds + 1);

        let times = attempts.lock().unwrap();
        assert_eq!(times.len(), pending_rounds + 1);
        for pair in times.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(100));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_errors_are_not_retried() {
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = poller(100, 10_000)
            .poll(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(SearchError::query_rejected("no such field")) }
            })
            .await;

        assert!(matches!(result, Err(SearchError::QueryRejected(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_exhausts() {
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = poller(100, 1_000)
            .poll(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(PollOutcome::Pending) }
            })
            .await;

        match result {
            Err(SearchError::PollExhausted { attempts, elapsed }) => {
                assert_eq!(attempts, calls.load(Ordering::SeqCst));
                assert!(attempts >= 10);
                assert!(elapsed <= Duration::from_millis(1_100));
            }
            other => panic!("expected PollExhausted, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_attempts_cap() {
        let calls = AtomicU32::new(0);
        let poller = ConsistencyPoller::new(
            PollerConfig::new(Duration::from_millis(100), Duration::from_secs(60))
                .with_max_attempts(3),
        );

        let result: Result<(), _> = poller
            .poll(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(PollOutcome::Pending) }
            })
            .await;

        assert!(matches!(
            result,
            Err(SearchError::PollExhausted { attempts: 3, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_attempt_hits_deadline() {
        let result: Result<(), _> = poller(100, 500)
            .poll(|| async {
                time::sleep(Duration::from_secs(5)).await;
                Ok(PollOutcome::Ready(()))
            })
            .await;

        assert!(matches!(
            result,
            Err(SearchError::PollExhausted { attempts: 1, .. })
        ));
    }
}
