//! Request scheduling
//!
//! Every page fetch in every stage goes through one [`Scheduler`]:
//! - a global semaphore caps the number of fetches in flight
//! - an optional minimum interval spaces out request starts

use crate::config::CrawlerConfig;
use crate::HarvestError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

/// Permit for one fetch; dropping it frees the slot
pub struct FetchPermit {
    _permit: OwnedSemaphorePermit,
}

/// Global concurrency limiter with a politeness interval
pub struct Scheduler {
    /// Global semaphore for limiting concurrent fetches
    global_semaphore: Arc<Semaphore>,

    /// Minimum time between two request starts
    min_interval: Duration,

    /// Earliest instant the next request may start
    next_slot: Mutex<Instant>,
}

impl Scheduler {
    /// Creates a scheduler from the crawler configuration
    pub fn new(config: &CrawlerConfig) -> Self {
        Self::with_limits(
            config.max_concurrent_requests as usize,
            Duration::from_millis(config.request_interval_ms),
        )
    }

    /// Creates a scheduler with explicit limits
    ///
    /// A concurrency of 0 is raised to 1.
    pub fn with_limits(max_concurrent: usize, min_interval: Duration) -> Self {
        Self {
            global_semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            min_interval,
            next_slot: Mutex::new(Instant::now()),
        }
    }

    /// Waits for a free fetch slot and for the politeness interval
    ///
    /// # Returns
    ///
    /// * `Ok(FetchPermit)` - The caller may start its request now
    /// * `Err(HarvestError::Scheduler)` - The semaphore was closed
    pub async fn acquire(&self) -> Result<FetchPermit, HarvestError> {
        let permit = self
            .global_semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| HarvestError::Scheduler(e.to_string()))?;

        if !self.min_interval.is_zero() {
            let start_at = {
                let mut next_slot = self.next_slot.lock().await;
                let now = Instant::now();
                let start_at = (*next_slot).max(now);
                *next_slot = start_at + self.min_interval;
                start_at
            };
            tracing::trace!(
                "Waiting {:?} before next request",
                start_at.saturating_duration_since(Instant::now())
            );
            tokio::time::sleep_until(start_at).await;
        }

        Ok(FetchPermit { _permit: permit })
    }

    /// Number of fetch slots currently free
    pub fn available_permits(&self) -> usize {
        self.global_semaphore.available_permits()
    }
}
