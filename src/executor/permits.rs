//! Concurrency permit pool
//!
//! One pool exists per batch execution. A task may only start once it holds
//! an [`AdmissionPermit`], and the permit is released on drop, so every exit
//! path (success, error, timeout, panic) returns its slot. The pool also
//! carries an instrumented in-flight counter used to verify the concurrency
//! cap and to detect accounting corruption at batch completion.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::{Result, TaskFanError};

/// Owned pool of concurrency permits for one batch
#[derive(Clone)]
pub struct PermitPool {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    in_flight: Arc<AtomicUsize>,
    high_water: Arc<AtomicUsize>,
}

impl PermitPool {
    /// Create a pool holding exactly `capacity` permits
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            in_flight: Arc::new(AtomicUsize::new(0)),
            high_water: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Wait for a free permit and take it
    ///
    /// Waiters are served in FIFO order by the underlying semaphore; that is
    /// a fairness default, not a contract.
    pub async fn admit(&self) -> Result<AdmissionPermit> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| TaskFanError::Invariant("permit pool closed during batch".to_string()))?;

        let held = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.high_water.fetch_max(held, Ordering::SeqCst);

        Ok(AdmissionPermit {
            _permit: permit,
            in_flight: self.in_flight.clone(),
        })
    }

    /// Total number of permits in the pool
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of permits currently free
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Number of permits currently held
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of permits held simultaneously so far
    pub fn high_water(&self) -> usize {
        self.high_water.load(Ordering::SeqCst)
    }

    /// Verify that every permit has been returned
    ///
    /// Called after all tasks have been joined. A mismatch means the
    /// accounting is corrupt and is surfaced as a fatal error.
    pub fn verify_reconciled(&self) -> Result<()> {
        let available = self.semaphore.available_permits();
        let held = self.in_flight.load(Ordering::SeqCst);

        if available != self.capacity || held != 0 {
            return Err(TaskFanError::Invariant(format!(
                "permit accounting mismatch: {}/{} permits available, {} still marked in flight",
                available, self.capacity, held
            )));
        }

        Ok(())
    }
}

impl std::fmt::Debug for PermitPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermitPool")
            .field("capacity", &self.capacity)
            .field("available", &self.available())
            .field("in_flight", &self.in_flight())
            .field("high_water", &self.high_water())
            .finish()
    }
}

/// One slot of the concurrency budget, released on drop
pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
    in_flight: Arc<AtomicUsize>,
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
