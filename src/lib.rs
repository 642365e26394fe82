//! # Taskfan
//!
//! Bounded-concurrency fan-out/fan-in execution of independent async tasks.
//!
//! ## Overview
//!
//! Taskfan runs a fixed batch of independent asynchronous tasks with a cap on
//! how many may be in flight at once. Every task produces exactly one outcome
//! at its original index, and a single task's failure never aborts its
//! siblings.
//!
//! ## Quick Start
//!
//! ```rust
//! use taskfan::{BoundedExecutor, TaskOutcome};
//!
//! # async fn example() -> taskfan::Result<()> {
//! // At most 4 tasks run at once
//! let executor = BoundedExecutor::with_limit(4)?;
//!
//! let tasks: Vec<_> = (0..8u64)
//!     .map(|i| async move { Ok::<_, taskfan::BoxError>(i * i) })
//!     .collect();
//!
//! let outcomes = executor.execute(tasks).await?;
//! assert_eq!(outcomes.len(), 8);
//! assert!(matches!(outcomes[2], TaskOutcome::Success(4)));
//! # Ok(())
//! # }
//! ```
//!
//! ## Key Guarantees
//!
//! - **Bounded concurrency**: at most `max_concurrent` tasks hold a permit at
//!   any instant
//! - **Order preservation**: outcome `i` always comes from input task `i`,
//!   regardless of completion order
//! - **Failure isolation**: a task's error, timeout, or panic is captured as
//!   data at its index and never cancels sibling tasks
//! - **Permit conservation**: all permits are returned by the time a batch
//!   completes; a mismatch is a fatal invariant error
//!
//! ## Modules
//!
//! - [`executor`]: the bounded task executor and its permit pool
//! - [`fanout`]: unbounded gather-style fan-out helpers
//! - [`agents`]: named sub-agent workers dispatched through the executor

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

use thiserror::Error;

/// Result type for taskfan operations
pub type Result<T> = std::result::Result<T, TaskFanError>;

/// Boxed error type returned by task bodies
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for taskfan operations
///
/// Per-task failures are never surfaced here; they are captured as
/// [`TaskOutcome::Failure`](executor::TaskOutcome) values at the task's
/// index. Only configuration and executor-invariant faults travel the
/// error channel.
#[derive(Error, Debug)]
pub enum TaskFanError {
    /// Invalid executor configuration
    #[error("Configuration error: {0}")]
    Config(#[from] executor::ConfigError),

    /// Broken internal accounting (permit leak, closed pool, cancelled join)
    #[error("Executor invariant violated: {0}")]
    Invariant(String),

    /// Join error from async tasks outside the outcome path
    #[error("Async join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Agent layer error
    #[error("Agent error: {0}")]
    Agent(#[from] agents::AgentError),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Bounded task executor module
pub mod executor;

/// Unbounded fan-out helpers
pub mod fanout;

/// Sub-agent pool module
pub mod agents;

pub use executor::{
    BatchSummary, BoundedExecutor, ConfigError, ExecutorConfig, ExecutorMetrics, FailureKind,
    TaskFailure, TaskOutcome,
};
