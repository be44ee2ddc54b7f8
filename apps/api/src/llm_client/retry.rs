//! Bounded exponential-backoff retry for outbound calls.
//!
//! Every external call site goes through [`retry`] so the attempt budget,
//! backoff schedule and retryable-error predicate live in one place.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Attempt budget and backoff schedule.
///
/// The delay before attempt `n` (n ≥ 2) is `base_delay * 2^(n-2)`, capped at
/// `max_delay`. With the defaults that is 1s, 2s, 4s, 8s across 5 attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(16),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait before `attempt` (1-based). The first attempt never waits.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt < 2 {
            return Duration::ZERO;
        }
        // Clamp the exponent so the multiplication cannot overflow for large budgets.
        let exponent = (attempt - 2).min(20);
        let delay = self.base_delay.saturating_mul(1u32 << exponent);
        delay.min(self.max_delay)
    }
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or the
/// attempt budget is spent. The last observed error is returned on failure.
pub async fn retry<T, E, F, Fut, P>(policy: &RetryPolicy, is_retryable: P, mut op: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts && is_retryable(&e) => {
                let delay = policy.delay_before(attempt + 1);
                warn!(
                    "Attempt {attempt}/{max_attempts} failed ({e}), retrying after {}ms...",
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                if is_retryable(&e) {
                    warn!("Giving up after {attempt} attempts: {e}");
                }
                return Err(e);
            }
        }
    }
}
