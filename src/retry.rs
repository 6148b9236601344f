//! Rate-limit survival for remote calls
//!
//! Every remote call a watcher makes goes through [`call_rate_limited`].
//! Throttling responses are absorbed by an exponential backoff loop with
//! random jitter; any other error propagates untouched. Policies are scoped
//! per technology so one slow API cannot starve another's retry budget.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::error::ScanError;

/// Backoff policy for one technology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first call.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub base_delay: Duration,
    /// Ceiling on any single backoff sleep.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Sleep before retry number `retry` (1-based), jittered to spread
    /// synchronized callers apart.
    fn backoff(&self, retry: u32) -> Duration {
        let shift = retry.saturating_sub(1).min(16);
        let exponential = self.base_delay.saturating_mul(1u32 << shift);
        let capped = exponential.min(self.max_delay);
        let jitter = rand::rng().random_range(0.5..1.5);
        capped.mul_f64(jitter).min(self.max_delay)
    }
}

/// Invoke `op`, retrying only on [`ScanError::RateLimited`].
///
/// Exhausting the attempt budget escalates to a connectivity failure so the
/// caller's scope is recorded and skipped like any other unreachable scope.
pub async fn call_rate_limited<T, F, Fut>(
    policy: &RetryPolicy,
    technology: &str,
    mut op: F,
) -> Result<T, ScanError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScanError>>,
{
    let mut attempt = 1u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_throttle() => {
                if attempt >= policy.max_attempts {
                    return Err(ScanError::Connectivity(anyhow::anyhow!(
                        "rate limit on '{technology}' not lifted after {attempt} attempts"
                    )));
                }
                let delay = policy.backoff(attempt);
                tracing::warn!(technology, attempt, delay_ms = delay.as_millis() as u64, "throttled, backing off");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
