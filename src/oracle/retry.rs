use std::future::Future;
use std::time::Duration;

use tracing::{error, warn};

use crate::constants::{EXTRACTION_RETRIES, EXTRACTION_RETRY_DELAY};

/// Fixed-delay retry schedule.
///
/// Only the claim-extraction pathway retries; the matching pathway issues each batch once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub attempts: usize,
    /// Sleep between attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy with at least one attempt.
    pub const fn new(attempts: usize, delay: Duration) -> Self {
        Self {
            attempts: if attempts == 0 { 1 } else { attempts },
            delay,
        }
    }

    /// Claim-extraction schedule: 10 attempts, 1 s apart.
    pub const fn extraction() -> Self {
        Self::new(EXTRACTION_RETRIES, EXTRACTION_RETRY_DELAY)
    }

    /// Single attempt, no retry.
    pub const fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Runs `op` until it yields `Some`, up to `attempts` times.
    ///
    /// `op` receives the 1-based attempt number. Returns `None` once the attempts are exhausted.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Option<T>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Option<T>>,
    {
        for attempt in 1..=self.attempts {
            if let Some(value) = op(attempt).await {
                return Some(value);
            }
            if attempt < self.attempts {
                warn!(label, attempt, "Attempt failed, retrying");
                if !self.delay.is_zero() {
                    tokio::time::sleep(self.delay).await;
                }
            }
        }
        error!(label, attempts = self.attempts, "Giving up after exhausting retries");
        None
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}
