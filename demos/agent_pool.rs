//! Example demonstrating parallel sub-agent dispatch through the executor

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::Rng;
use serde_json::{json, Value};
use taskfan::agents::{AgentPool, AgentReport, SubAgent};
use taskfan::BoundedExecutor;

struct Specialist {
    name: &'static str,
    specialty: &'static str,
}

#[async_trait]
impl SubAgent for Specialist {
    fn name(&self) -> &str {
        self.name
    }

    fn specialty(&self) -> &str {
        self.specialty
    }

    async fn process(&self, assignment: Value) -> taskfan::Result<AgentReport> {
        // Simulated work time
        let delay = rand::thread_rng().gen_range(100..400);
        tokio::time::sleep(Duration::from_millis(delay)).await;

        Ok(AgentReport {
            agent: self.name.to_string(),
            specialty: self.specialty.to_string(),
            output: json!({
                "assignment": assignment,
                "result": format!("{} finished its part", self.name),
            }),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("🚀 Taskfan - Parallel Sub-Agent Example\n");

    let pool = AgentPool::new(BoundedExecutor::with_limit(3)?);
    for (name, specialty) in [
        ("frontend", "UI/UX development"),
        ("backend", "APIs and services"),
        ("database", "data modeling"),
        ("testing", "quality assurance"),
        ("documentation", "technical writing"),
    ] {
        pool.register(Arc::new(Specialist { name, specialty }));
    }

    let project = "todo application";
    let assignments: Vec<(String, Value)> = pool
        .names()
        .into_iter()
        .map(|name| {
            let task = json!(format!("handle the {} work for the {}", name, project));
            (name, task)
        })
        .collect();

    println!("Dispatching {} assignments across the pool...\n", assignments.len());

    let start = Instant::now();
    let outcomes = pool.dispatch(assignments).await?;

    for (agent, outcome) in &outcomes {
        match outcome.success() {
            Some(report) => println!("  ✅ {} ({}): {}", agent, report.specialty, report.output["result"]),
            None => println!("  ❌ {} failed: {:?}", agent, outcome.failure()),
        }
    }

    println!("\nTotal time: {:?}", start.elapsed());

    Ok(())
}
