//! Exponential backoff for remote writes.

use crate::error::{CloudError, CloudResult};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

/// Attempt budget and delay base for [`RetryPolicy::run`].
///
/// The delay before attempt `k + 1` is `base_delay_ms * 2^(k - 1)`: with the
/// defaults, one second before the second attempt and two before the third.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay_ms: base_delay.as_millis().try_into().unwrap_or(u64::MAX),
        }
    }

    /// Delay slept after failed attempt `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }

    /// Runs `op` until it succeeds, fails terminally, or the attempt budget
    /// runs out.
    ///
    /// Terminal errors are returned as-is after the attempt that produced
    /// them. Exhaustion wraps the last error in
    /// [`CloudError::OperationFailed`]. `cancel` is checked before each
    /// backoff sleep and again before the next attempt.
    pub async fn run<T, F, Fut>(&self, op_name: &str, cancel: &CancelFlag, mut op: F) -> CloudResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = CloudResult<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("{op_name} succeeded on attempt {attempt}");
                    }
                    return Ok(value);
                }
                Err(e) if !e.is_retryable() => {
                    debug!("{op_name} failed terminally on attempt {attempt}: {e}");
                    return Err(e);
                }
                Err(e) if attempt >= max_attempts => {
                    warn!("{op_name} giving up after {attempt} attempts: {e}");
                    return Err(CloudError::OperationFailed {
                        attempts: attempt,
                        source: Box::new(e),
                    });
                }
                Err(e) => {
                    if cancel.is_cancelled() {
                        debug!("{op_name} cancelled after attempt {attempt}");
                        return Err(CloudError::Cancelled);
                    }
                    let backoff = self.delay_after(attempt);
                    warn!("{op_name} attempt {attempt}/{max_attempts} failed ({e}), retrying in {backoff:?}");
                    tokio::time::sleep(backoff).await;
                    if cancel.is_cancelled() {
                        debug!("{op_name} cancelled during backoff");
                        return Err(CloudError::Cancelled);
                    }
                    attempt += 1;
                }
            }
        }
    }

    /// Runs `op` exactly once. A retryable failure is reported as
    /// `OperationFailed { attempts: 1 }` so callers see the same shape as an
    /// exhausted retry.
    pub async fn once<T, Fut>(op_name: &str, op: Fut) -> CloudResult<T>
    where
        Fut: Future<Output = CloudResult<T>>,
    {
        match op.await {
            Err(e) if e.is_retryable() => {
                warn!("{op_name} failed: {e}");
                Err(CloudError::OperationFailed {
                    attempts: 1,
                    source: Box::new(e),
                })
            }
            other => other,
        }
    }
}

/// Cooperative cancellation for in-flight retry loops.
///
/// Clones share the flag. Cancelling does not interrupt an attempt already
/// in progress; the loop stops at the next check.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
