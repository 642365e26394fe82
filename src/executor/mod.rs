//! Bounded task executor
//!
//! Runs a fixed batch of independent async tasks with a cap on how many may
//! be in flight at once. Each task's result or failure is recorded at its
//! original index; one task's failure never aborts its siblings. Permits are
//! acquired inside each spawned wrapper and released by drop on every exit
//! path, and permit accounting is verified before a batch returns.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{BoxError, Result, TaskFanError};

mod config;
mod metrics;
mod outcome;
mod permits;

pub use config::{ConfigError, ExecutorConfig};
pub use metrics::ExecutorMetrics;
pub use outcome::{BatchSummary, FailureKind, TaskFailure, TaskOutcome};
pub use permits::{AdmissionPermit, PermitPool};

/// Callback invoked after each task resolves, with (completed, total)
pub type ProgressCallback = Box<dyn Fn(usize, usize) + Send + Sync>;

/// Executor that runs batches of independent tasks under a concurrency cap
///
/// The executor itself holds only configuration and cumulative metrics; the
/// permit pool and outcome buffer are created per batch and discarded when
/// [`execute`](BoundedExecutor::execute) returns.
pub struct BoundedExecutor {
    config: ExecutorConfig,
    progress_callback: Option<Arc<ProgressCallback>>,
    metrics: Arc<Mutex<ExecutorMetrics>>,
}

impl std::fmt::Debug for BoundedExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedExecutor")
            .field("config", &self.config)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "Fn(usize, usize)"),
            )
            .field("metrics", &self.metrics)
            .finish()
    }
}

impl BoundedExecutor {
    /// Create an executor from a validated configuration
    pub fn new(config: ExecutorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            progress_callback: None,
            metrics: Arc::new(Mutex::new(ExecutorMetrics::default())),
        })
    }

    /// Create an executor with the given concurrency limit
    pub fn with_limit(max_concurrent: usize) -> Result<Self> {
        Self::new(ExecutorConfig::new(max_concurrent))
    }

    /// Set a progress callback invoked after each task resolves
    pub fn with_progress_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(Box::new(callback)));
        self
    }

    /// The configured concurrency limit
    pub fn max_concurrent(&self) -> usize {
        self.config.max_concurrent
    }

    /// Snapshot of the cumulative metrics
    pub fn metrics(&self) -> ExecutorMetrics {
        self.metrics.lock().clone()
    }

    /// Execute a batch of tasks, at most `max_concurrent` at a time
    ///
    /// Returns one outcome per input task, at the task's original index,
    /// regardless of completion order. Task errors, timeouts, and panics are
    /// captured as [`TaskOutcome::Failure`] values; only a broken executor
    /// invariant (permit accounting corruption, a runtime-cancelled join)
    /// surfaces as an `Err`.
    #[instrument(skip(self, tasks), fields(task_count = tasks.len()))]
    pub async fn execute<R, F>(&self, tasks: Vec<F>) -> Result<Vec<TaskOutcome<R>>>
    where
        R: Send + 'static,
        F: Future<Output = std::result::Result<R, BoxError>> + Send + 'static,
    {
        let batch_start = Instant::now();
        let total = tasks.len();

        if tasks.is_empty() {
            info!("no tasks in batch");
            return Ok(Vec::new());
        }

        let batch_id = Uuid::new_v4();
        info!(
            %batch_id,
            total,
            max_concurrent = self.config.max_concurrent,
            timeout = ?self.config.task_timeout,
            "starting batch execution"
        );

        let pool = PermitPool::new(self.config.max_concurrent);
        let completed = Arc::new(AtomicUsize::new(0));
        let task_timeout = self.config.task_timeout;

        // Spawn all wrappers in input order; each one waits for admission
        // before polling the user future, so at most max_concurrent task
        // bodies make progress at once.
        let mut handles = Vec::with_capacity(total);
        for (index, task) in tasks.into_iter().enumerate() {
            let pool = pool.clone();
            let completed = completed.clone();
            let progress = self.progress_callback.clone();

            handles.push(tokio::spawn(async move {
                let _permit = pool.admit().await?;
                debug!(index, "task admitted");

                let outcome = match task_timeout {
                    Some(limit) => match tokio::time::timeout(limit, task).await {
                        Ok(Ok(value)) => TaskOutcome::Success(value),
                        Ok(Err(e)) => {
                            warn!(index, error = %e, "task failed");
                            TaskOutcome::Failure(TaskFailure::new(
                                index,
                                FailureKind::Error,
                                e.to_string(),
                            ))
                        }
                        Err(_) => {
                            warn!(index, timeout = ?limit, "task timed out");
                            TaskOutcome::Failure(TaskFailure::new(
                                index,
                                FailureKind::TimedOut,
                                format!("task timed out after {:?}", limit),
                            ))
                        }
                    },
                    None => match task.await {
                        Ok(value) => TaskOutcome::Success(value),
                        Err(e) => {
                            warn!(index, error = %e, "task failed");
                            TaskOutcome::Failure(TaskFailure::new(
                                index,
                                FailureKind::Error,
                                e.to_string(),
                            ))
                        }
                    },
                };

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                if let Some(ref callback) = progress {
                    callback(done, total);
                }

                Ok::<_, TaskFanError>(outcome)
            }));
        }

        // Join in submission order: outcome i lands at position i without
        // any index plumbing in the output buffer.
        let mut outcomes = Vec::with_capacity(total);
        for (index, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(Ok(outcome)) => outcomes.push(outcome),
                Ok(Err(fatal)) => return Err(fatal),
                Err(join_err) if join_err.is_panic() => {
                    warn!(index, "task panicked");
                    outcomes.push(TaskOutcome::Failure(TaskFailure::new(
                        index,
                        FailureKind::Panicked,
                        format!("task panicked: {}", join_err),
                    )));
                }
                Err(join_err) => {
                    return Err(TaskFanError::Invariant(format!(
                        "task {} was cancelled by the runtime: {}",
                        index, join_err
                    )));
                }
            }
        }

        pool.verify_reconciled()?;

        let summary =
            BatchSummary::from_outcomes(&outcomes).with_duration(batch_start.elapsed());
        info!(
            %batch_id,
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            timed_out = summary.timed_out,
            duration_ms = summary.duration_ms,
            peak_in_flight = pool.high_water(),
            "batch execution completed"
        );

        self.metrics.lock().record_batch(&summary, pool.high_water());

        Ok(outcomes)
    }

    /// Execute keyed tasks; keys ride along and outcomes keep submission order
    pub async fn execute_keyed<K, R, F>(&self, tasks: Vec<(K, F)>) -> Result<Vec<(K, TaskOutcome<R>)>>
    where
        R: Send + 'static,
        F: Future<Output = std::result::Result<R, BoxError>> + Send + 'static,
    {
        let (keys, futures): (Vec<K>, Vec<F>) = tasks.into_iter().unzip();
        let outcomes = self.execute(futures).await?;
        Ok(keys.into_iter().zip(outcomes).collect())
    }

    /// Map an input collection through an async closure under the cap
    ///
    /// Each input's failure is recorded against its own index; siblings are
    /// unaffected.
    pub async fn execute_with<I, R, F, Fut>(&self, inputs: Vec<I>, f: F) -> Result<Vec<TaskOutcome<R>>>
    where
        R: Send + 'static,
        F: Fn(I) -> Fut,
        Fut: Future<Output = std::result::Result<R, BoxError>> + Send + 'static,
    {
        let tasks: Vec<Fut> = inputs.into_iter().map(f).collect();
        self.execute(tasks).await
    }
}

impl Default for BoundedExecutor {
    fn default() -> Self {
        // The default configuration is always valid
        Self::new(ExecutorConfig::default()).expect("default config is valid")
    }
}
