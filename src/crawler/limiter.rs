use crate::CrawlError;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Admission gate bounding the number of simultaneously in-flight fetches
///
/// Only the fetch and parse step of a task holds a slot. Tasks themselves are
/// not limited, so the number of live tasks may far exceed the capacity.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
}

/// A held slot; dropping it returns the slot to the gate
#[derive(Debug)]
pub struct FetchSlot {
    _permit: OwnedSemaphorePermit,
}

impl ConcurrencyLimiter {
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
        }
    }

    /// Waits until a slot is free and takes it
    pub async fn acquire(&self) -> Result<FetchSlot, CrawlError> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            // Closed once the run is cancelled
            .map_err(|_| CrawlError::Cancelled)?;

        Ok(FetchSlot { _permit: permit })
    }

    /// Closes the gate; pending and future acquisitions fail
    pub fn close(&self) {
        self.semaphore.close();
    }
}
