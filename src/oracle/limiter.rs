use std::sync::Arc;

use tokio::sync::{Semaphore, SemaphorePermit};

use super::error::{OracleError, OracleResult};

/// Counting semaphore bounding in-flight oracle calls.
///
/// Construct one per run and clone it into every corpus task: clones share the same permits,
/// which makes the cap process-wide rather than per corpus or per direction.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl ConcurrencyLimiter {
    /// Creates a limiter with `capacity` permits (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Waits for a permit. The call slot is released when the permit drops.
    pub async fn acquire(&self) -> OracleResult<SemaphorePermit<'_>> {
        self.semaphore
            .acquire()
            .await
            .map_err(|_| OracleError::LimiterClosed)
    }

    /// Configured number of permits.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits not currently held.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}
