//! Sub-agent pool
//!
//! Named workers with a specialty, registered in a pool and fanned out over
//! a set of assignments through the bounded executor. Each assignment's
//! outcome is keyed by the agent name it was addressed to and kept in
//! submission order; an unknown agent name becomes an isolated failure at
//! that index, never a batch abort.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::executor::{BoundedExecutor, TaskOutcome};
use crate::{BoxError, Result};

/// Errors related to agent operations
#[derive(Error, Debug)]
pub enum AgentError {
    /// No agent is registered under the requested name
    #[error("Agent not found: {0}")]
    NotFound(String),

    /// The agent could not process its assignment
    #[error("Assignment processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of one agent processing one assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentReport {
    /// Name of the agent that produced this report
    pub agent: String,
    /// The agent's specialty
    pub specialty: String,
    /// Agent-specific output payload
    pub output: Value,
}

/// A named worker with a specialty, processing one assignment at a time
#[async_trait]
pub trait SubAgent: Send + Sync {
    /// The agent's unique name
    fn name(&self) -> &str;

    /// What this agent specializes in
    fn specialty(&self) -> &str;

    /// Process a single assignment
    async fn process(&self, assignment: Value) -> Result<AgentReport>;
}

/// Closure-backed [`SubAgent`] for tests and ad-hoc workers
pub struct FnAgent {
    name: String,
    specialty: String,
    handler: Arc<dyn Fn(Value) -> Result<Value> + Send + Sync>,
}

impl FnAgent {
    /// Create an agent from a closure that maps an assignment to an output
    pub fn new<F>(name: impl Into<String>, specialty: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            specialty: specialty.into(),
            handler: Arc::new(handler),
        }
    }
}

#[async_trait]
impl SubAgent for FnAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn specialty(&self) -> &str {
        &self.specialty
    }

    async fn process(&self, assignment: Value) -> Result<AgentReport> {
        let output = (self.handler)(assignment)?;
        Ok(AgentReport {
            agent: self.name.clone(),
            specialty: self.specialty.clone(),
            output,
        })
    }
}

/// Registry of sub-agents dispatched through a bounded executor
pub struct AgentPool {
    agents: Arc<DashMap<String, Arc<dyn SubAgent>>>,
    executor: BoundedExecutor,
}

impl AgentPool {
    /// Create a pool that dispatches through the given executor
    pub fn new(executor: BoundedExecutor) -> Self {
        Self {
            agents: Arc::new(DashMap::new()),
            executor,
        }
    }

    /// Register an agent under its own name, replacing any previous entry
    pub fn register(&self, agent: Arc<dyn SubAgent>) {
        debug!(agent = agent.name(), specialty = agent.specialty(), "agent registered");
        self.agents.insert(agent.name().to_string(), agent);
    }

    /// Look up an agent by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn SubAgent>> {
        self.agents.get(name).map(|entry| entry.value().clone())
    }

    /// Names of all registered agents
    pub fn names(&self) -> Vec<String> {
        self.agents.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Fan assignments out to their agents through the bounded executor
    ///
    /// Each entry pairs an agent name with an assignment payload. Outcomes
    /// come back keyed by the same name, in submission order. An unknown
    /// agent name is reified as a failure at that index.
    pub async fn dispatch(
        &self,
        assignments: Vec<(String, Value)>,
    ) -> Result<Vec<(String, TaskOutcome<AgentReport>)>> {
        info!(
            assignments = assignments.len(),
            agents = self.agents.len(),
            "dispatching assignments"
        );

        let tasks: Vec<_> = assignments
            .into_iter()
            .map(|(name, assignment)| {
                let agent = self.get(&name);
                let missing = name.clone();
                let task = async move {
                    match agent {
                        Some(agent) => agent
                            .process(assignment)
                            .await
                            .map_err(|e| Box::new(e) as BoxError),
                        None => Err(Box::new(AgentError::NotFound(missing)) as BoxError),
                    }
                };
                (name, task)
            })
            .collect();

        self.executor.execute_keyed(tasks).await
    }
}
