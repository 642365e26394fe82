//! Cumulative executor metrics
//!
//! Observability counters folded after every batch. These are the only state
//! an executor keeps across calls; all execution state (permits, outcome
//! buffers) is strictly per-batch.

use serde::{Deserialize, Serialize};

use super::outcome::BatchSummary;

/// Cumulative counters across all batches run by one executor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutorMetrics {
    /// Number of batches executed
    pub batches: usize,
    /// Total tasks run across all batches
    pub tasks_run: usize,
    /// Tasks that failed with an error or panic
    pub tasks_failed: usize,
    /// Tasks that exceeded the per-task deadline
    pub tasks_timed_out: usize,
    /// Highest number of tasks observed in flight at once, across all batches
    pub peak_in_flight: usize,
    /// Total wall-clock time spent in batches, in milliseconds
    pub total_duration_ms: u128,
}

impl ExecutorMetrics {
    pub(crate) fn record_batch(&mut self, summary: &BatchSummary, peak_in_flight: usize) {
        self.batches += 1;
        self.tasks_run += summary.total;
        self.tasks_failed += summary.failed;
        self.tasks_timed_out += summary.timed_out;
        self.peak_in_flight = self.peak_in_flight.max(peak_in_flight);
        self.total_duration_ms += summary.duration_ms;
    }
}
