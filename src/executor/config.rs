//! Executor configuration
//!
//! Configuration is validated at construction time; an executor with an
//! invalid limit is never created and never runs a task.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by executor configuration validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The concurrency limit must admit at least one task
    #[error("max_concurrent must be at least 1, got {0}")]
    InvalidConcurrency(usize),
}

/// Configuration for a [`BoundedExecutor`](crate::BoundedExecutor)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Maximum number of tasks allowed to run simultaneously; must be >= 1
    pub max_concurrent: usize,

    /// Optional per-task deadline; an elapsed deadline becomes a
    /// `TimedOut` failure at that task's index
    pub task_timeout: Option<Duration>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_concurrent: num_cpus::get(),
            task_timeout: None,
        }
    }
}

impl ExecutorConfig {
    /// Create a configuration with the given concurrency limit
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            max_concurrent,
            task_timeout: None,
        }
    }

    /// Set the concurrency limit
    pub fn with_max_concurrent(mut self, limit: usize) -> Self {
        self.max_concurrent = limit;
        self
    }

    /// Set the per-task deadline
    pub fn with_task_timeout(mut self, timeout: Duration) -> Self {
        self.task_timeout = Some(timeout);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.max_concurrent < 1 {
            return Err(ConfigError::InvalidConcurrency(self.max_concurrent));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExecutorConfig::default();
        assert!(config.max_concurrent >= 1);
        assert!(config.task_timeout.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = ExecutorConfig::new(4).with_task_timeout(Duration::from_secs(30));
        assert_eq!(config.max_concurrent, 4);
        assert_eq!(config.task_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_zero_limit_rejected() {
        let config = ExecutorConfig::new(0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidConcurrency(0)));
    }
}
