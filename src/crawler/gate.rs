//! Fetch gate: global request limiter plus timeout-only retry policy
//!
//! Discovery and mirror workers share one gate, so the total number of
//! simultaneous connections is bounded no matter how many workers run.
//!
//! # Retry Logic
//!
//! | Condition | Action |
//! |-----------|--------|
//! | Success | Return body |
//! | Timeout | Retry up to `max_retries` attempts, exponential delay |
//! | Connection refused / DNS / TLS | Immediate → Fatal |
//! | HTTP error status | Immediate → Fatal |
//! | Other protocol error | Immediate → Fatal |
//!
//! The limiter permit covers a single attempt and is released before any
//! retry delay.

use crate::config::LimitsConfig;
use crate::crawler::{Transport, TransportError};
use crate::FetchError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;

/// Upper bound for a single retry delay
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Result of one network attempt
#[derive(Debug)]
pub enum FetchOutcome {
    Success(Vec<u8>),
    Retryable(TransportError),
    Fatal(TransportError),
}

impl From<Result<Vec<u8>, TransportError>> for FetchOutcome {
    fn from(result: Result<Vec<u8>, TransportError>) -> Self {
        match result {
            Ok(body) => Self::Success(body),
            Err(e) if e.is_timeout() => Self::Retryable(e),
            Err(e) => Self::Fatal(e),
        }
    }
}

/// Attempt budget and timing for a single request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, first one included
    pub max_attempts: u32,

    /// Per-attempt timeout handed to the transport
    pub timeout: Duration,

    /// Delay after the first timed-out attempt; doubles each time
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn from_limits(limits: &LimitsConfig) -> Self {
        Self {
            max_attempts: limits.max_retries.max(1),
            timeout: limits.timeout(),
            base_delay: limits.retry_delay(),
        }
    }

    /// Delay to wait after the given (1-based) failed attempt
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(MAX_RETRY_DELAY)
            .min(MAX_RETRY_DELAY)
    }
}

/// Shared, cloneable fetch gate
#[derive(Clone)]
pub struct FetchGate {
    transport: Arc<dyn Transport>,
    limiter: Arc<Semaphore>,
    policy: RetryPolicy,
    attempts: Arc<AtomicU64>,
}

impl FetchGate {
    pub fn new(transport: Arc<dyn Transport>, max_concurrent_requests: usize, policy: RetryPolicy) -> Self {
        Self {
            transport,
            limiter: Arc::new(Semaphore::new(max_concurrent_requests)),
            policy,
            attempts: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn from_limits(transport: Arc<dyn Transport>, limits: &LimitsConfig) -> Self {
        Self::new(
            transport,
            limits.max_concurrent_requests,
            RetryPolicy::from_limits(limits),
        )
    }

    /// Permits not currently held by an in-flight attempt
    pub fn available_permits(&self) -> usize {
        self.limiter.available_permits()
    }

    /// Number of network attempts issued through this gate
    pub fn attempts_issued(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    /// Fetches a URL under the limiter and retry policy
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<u8>)` - Response body
    /// * `Err(FetchError::Fatal)` - Non-timeout failure, no further attempts
    /// * `Err(FetchError::Exhausted)` - Every attempt timed out
    pub async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        for attempt in 1..=self.policy.max_attempts {
            match self.attempt(url).await? {
                FetchOutcome::Success(body) => {
                    if attempt > 1 {
                        tracing::debug!("Fetched {} after {} attempts", url, attempt);
                    }
                    return Ok(body);
                }
                FetchOutcome::Fatal(cause) => {
                    return Err(FetchError::Fatal {
                        url: url.to_string(),
                        cause,
                    });
                }
                FetchOutcome::Retryable(cause) => {
                    tracing::debug!(
                        "Attempt {}/{} for {} failed: {}",
                        attempt,
                        self.policy.max_attempts,
                        url,
                        cause
                    );
                    if attempt < self.policy.max_attempts {
                        tokio::time::sleep(self.policy.delay_after(attempt)).await;
                    }
                }
            }
        }

        Err(FetchError::Exhausted {
            url: url.to_string(),
            attempts: self.policy.max_attempts,
        })
    }

    /// One attempt; the permit is dropped when this returns
    async fn attempt(&self, url: &Url) -> Result<FetchOutcome, FetchError> {
        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|_| FetchError::Closed {
                url: url.to_string(),
            })?;

        self.attempts.fetch_add(1, Ordering::Relaxed);
        Ok(self.transport.get(url, self.policy.timeout).await.into())
    }
}
