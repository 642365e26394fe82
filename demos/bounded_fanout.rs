//! Example demonstrating bounded fan-out with mixed successes and failures

use std::time::{Duration, Instant};

use rand::Rng;
use taskfan::{BatchSummary, BoundedExecutor, BoxError, ExecutorConfig, TaskOutcome};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("🚀 Taskfan - Bounded Fan-Out Example\n");

    let config = ExecutorConfig::new(3).with_task_timeout(Duration::from_secs(2));
    let executor = BoundedExecutor::new(config)?
        .with_progress_callback(|completed, total| {
            println!("  progress: {}/{}", completed, total);
        });

    let endpoints = vec![
        "/api/users",
        "/api/posts",
        "/api/comments",
        "/api/broken",
        "/api/settings",
        "/api/metrics",
    ];

    println!("Fetching {} endpoints, at most 3 at a time...\n", endpoints.len());

    let tasks: Vec<_> = endpoints
        .iter()
        .map(|&endpoint| (endpoint, fetch(endpoint)))
        .collect();

    let start = Instant::now();
    let outcomes = executor.execute_keyed(tasks).await?;
    let elapsed = start.elapsed();

    println!("\nResults:");
    for (endpoint, outcome) in &outcomes {
        match outcome {
            TaskOutcome::Success(body) => println!("  ✅ {} -> {}", endpoint, body),
            TaskOutcome::Failure(failure) => {
                println!("  ❌ {} -> {:?}: {}", endpoint, failure.kind, failure.message)
            }
        }
    }

    let plain: Vec<_> = outcomes.into_iter().map(|(_, o)| o).collect();
    let summary = BatchSummary::from_outcomes(&plain).with_duration(elapsed);
    println!(
        "\nSummary: {}/{} succeeded, {} failed, {} timed out in {}ms",
        summary.succeeded, summary.total, summary.failed, summary.timed_out, summary.duration_ms
    );
    println!("Executor metrics: {:?}", executor.metrics());

    Ok(())
}

/// Simulated network call with jittered latency; one endpoint always fails
async fn fetch(endpoint: &'static str) -> Result<String, BoxError> {
    let delay = rand::thread_rng().gen_range(50..250);
    tokio::time::sleep(Duration::from_millis(delay)).await;

    if endpoint.contains("broken") {
        return Err(format!("503 from {}", endpoint).into());
    }
    Ok(format!("200 OK ({} bytes)", endpoint.len() * 128))
}
