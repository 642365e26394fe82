//! Bounded executor tests
//!
//! Covers the executor's visible contract: result length and ordering,
//! the concurrency cap, per-task failure isolation, timeout and panic
//! reification, configuration validation, and permit conservation across
//! repeated batches.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use pretty_assertions::assert_eq;
use taskfan::{BoundedExecutor, BoxError, ExecutorConfig, FailureKind, TaskFanError};

#[tokio::test]
async fn test_result_length_matches_input() {
    let executor = BoundedExecutor::with_limit(3).expect("valid limit");

    for m in [1usize, 2, 7, 20] {
        let tasks: Vec<_> = (0..m)
            .map(|i| async move { Ok::<_, BoxError>(i) })
            .collect();

        let outcomes = executor.execute(tasks).await.expect("batch should run");
        assert_eq!(outcomes.len(), m, "batch of {} tasks should yield {} outcomes", m, m);
        assert!(outcomes.iter().all(|o| o.is_success()));
    }
}

#[tokio::test]
async fn test_empty_batch_returns_immediately() {
    let executor = BoundedExecutor::with_limit(4).expect("valid limit");

    let tasks: Vec<BoxFuture<'static, Result<u64, BoxError>>> = Vec::new();
    let outcomes = executor.execute(tasks).await.expect("empty batch is a no-op");

    assert!(outcomes.is_empty());
    // Nothing ran, so nothing was recorded
    assert_eq!(executor.metrics().batches, 0);
    assert_eq!(executor.metrics().tasks_run, 0);
}

#[tokio::test]
async fn test_ordering_preserved_under_inverted_delays() {
    // Task i sleeps longer than task i+1, so completion order is the
    // reverse of input order; outcomes must still land in input order.
    let executor = BoundedExecutor::with_limit(5).expect("valid limit");

    let tasks: Vec<_> = (0..5u64)
        .map(|i| async move {
            tokio::time::sleep(Duration::from_millis(20 * (5 - i))).await;
            Ok::<_, BoxError>(i)
        })
        .collect();

    let outcomes = executor.execute(tasks).await.expect("batch should run");

    for (i, outcome) in outcomes.iter().enumerate() {
        assert_eq!(
            outcome.success(),
            Some(&(i as u64)),
            "outcome {} should hold the value of input task {}",
            i,
            i
        );
    }
}

#[tokio::test]
async fn test_concurrency_cap_respected() {
    let limit = 2;
    let executor = BoundedExecutor::with_limit(limit).expect("valid limit");

    let current = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let tasks: Vec<_> = (0..8u64)
        .map(|i| {
            let current = current.clone();
            let peak = peak.clone();
            async move {
                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(30)).await;
                current.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, BoxError>(i)
            }
        })
        .collect();

    let outcomes = executor.execute(tasks).await.expect("batch should run");
    assert_eq!(outcomes.len(), 8);

    let observed_peak = peak.load(Ordering::SeqCst);
    assert!(
        observed_peak <= limit,
        "observed {} tasks in flight, limit is {}",
        observed_peak,
        limit
    );

    // The executor's own instrumentation agrees
    let metrics = executor.metrics();
    assert!(metrics.peak_in_flight <= limit);
    assert!(metrics.peak_in_flight >= 1);
}

#[tokio::test]
async fn test_single_failure_is_isolated() {
    // 5 tasks, index 2 fails, others return i*10
    let executor = BoundedExecutor::with_limit(3).expect("valid limit");

    let tasks: Vec<_> = (0..5u64)
        .map(|i| async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            if i == 2 {
                Err::<u64, BoxError>("task 2 exploded".into())
            } else {
                Ok(i * 10)
            }
        })
        .collect();

    let outcomes = executor.execute(tasks).await.expect("batch should run");
    assert_eq!(outcomes.len(), 5);

    for (i, outcome) in outcomes.iter().enumerate() {
        if i == 2 {
            let failure = outcome.failure().expect("index 2 should fail");
            assert_eq!(failure.index, 2);
            assert_eq!(failure.kind, FailureKind::Error);
            assert!(failure.message.contains("exploded"));
        } else {
            assert_eq!(outcome.success(), Some(&(i as u64 * 10)), "task {} should succeed", i);
        }
    }
}

#[tokio::test]
async fn test_zero_limit_is_a_config_error() {
    let err = BoundedExecutor::with_limit(0).expect_err("limit 0 must be rejected");
    assert!(matches!(err, TaskFanError::Config(_)));

    let err = BoundedExecutor::new(ExecutorConfig::new(0)).expect_err("limit 0 must be rejected");
    assert!(matches!(err, TaskFanError::Config(_)));
}

#[tokio::test]
async fn test_timeout_reified_at_its_index() {
    let config = ExecutorConfig::new(4).with_task_timeout(Duration::from_millis(50));
    let executor = BoundedExecutor::new(config).expect("valid config");

    let tasks: Vec<_> = (0..3u64)
        .map(|i| async move {
            let delay = if i == 1 { 300 } else { 5 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok::<_, BoxError>(i)
        })
        .collect();

    let outcomes = executor.execute(tasks).await.expect("batch should run");

    assert_eq!(outcomes[0].success(), Some(&0));
    assert_eq!(outcomes[2].success(), Some(&2));

    let failure = outcomes[1].failure().expect("slow task should time out");
    assert_eq!(failure.index, 1);
    assert_eq!(failure.kind, FailureKind::TimedOut);

    assert_eq!(executor.metrics().tasks_timed_out, 1);
}

#[tokio::test]
async fn test_panic_reified_at_its_index() {
    let executor = BoundedExecutor::with_limit(2).expect("valid limit");

    let tasks: Vec<_> = (0..4u64)
        .map(|i| async move {
            if i == 1 {
                panic!("kaboom");
            }
            Ok::<_, BoxError>(i)
        })
        .collect();

    let outcomes = executor.execute(tasks).await.expect("batch should run");
    assert_eq!(outcomes.len(), 4);

    let failure = outcomes[1].failure().expect("panicking task should fail");
    assert_eq!(failure.index, 1);
    assert_eq!(failure.kind, FailureKind::Panicked);

    for i in [0usize, 2, 3] {
        assert_eq!(outcomes[i].success(), Some(&(i as u64)), "task {} should succeed", i);
    }
}

#[tokio::test]
async fn test_executor_reusable_across_batches() {
    // Permits are per-batch; a prior batch (even one with failures) must not
    // leak capacity into the next.
    let executor = BoundedExecutor::with_limit(2).expect("valid limit");

    for round in 0..3u64 {
        let tasks: Vec<_> = (0..4u64)
            .map(|i| async move {
                if i == 0 {
                    Err::<u64, BoxError>("first task fails every round".into())
                } else {
                    Ok(round * 100 + i)
                }
            })
            .collect();

        let outcomes = executor.execute(tasks).await.expect("batch should run");
        assert_eq!(outcomes.len(), 4);
        assert!(outcomes[0].is_failure());
        assert_eq!(outcomes[3].success(), Some(&(round * 100 + 3)));
    }

    let metrics = executor.metrics();
    assert_eq!(metrics.batches, 3);
    assert_eq!(metrics.tasks_run, 12);
    assert_eq!(metrics.tasks_failed, 3);
}

#[tokio::test]
async fn test_progress_callback_reports_completion() {
    let updates = Arc::new(Mutex::new(Vec::new()));
    let updates_clone = updates.clone();

    let executor = BoundedExecutor::with_limit(2)
        .expect("valid limit")
        .with_progress_callback(move |completed, total| {
            updates_clone.lock().unwrap().push((completed, total));
        });

    let tasks: Vec<_> = (0..5u64)
        .map(|i| async move { Ok::<_, BoxError>(i) })
        .collect();

    executor.execute(tasks).await.expect("batch should run");

    let updates = updates.lock().unwrap();
    assert_eq!(updates.len(), 5, "one update per task");
    assert_eq!(*updates.last().unwrap(), (5, 5), "final update reports full completion");
}

#[tokio::test]
async fn test_keyed_execution_preserves_keys() {
    let executor = BoundedExecutor::with_limit(2).expect("valid limit");

    let tasks: Vec<(&str, _)> = vec![
        ("users", fetch_endpoint("/api/users", 30)),
        ("posts", fetch_endpoint("/api/posts", 10)),
        ("comments", fetch_endpoint("/api/comments", 20)),
    ];

    let outcomes = executor.execute_keyed(tasks).await.expect("batch should run");

    let keys: Vec<_> = outcomes.iter().map(|(k, _)| *k).collect();
    assert_eq!(keys, vec!["users", "posts", "comments"]);
    assert_eq!(
        outcomes[1].1.success(),
        Some(&"response from /api/posts".to_string())
    );
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        // Length and order hold for any batch size and any valid limit.
        #[test]
        fn result_length_and_order_always_hold(m in 0usize..24, limit in 1usize..8) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async move {
                let executor = BoundedExecutor::with_limit(limit).unwrap();
                let tasks: Vec<_> = (0..m)
                    .map(|i| async move { Ok::<_, BoxError>(i) })
                    .collect();

                let outcomes = executor.execute(tasks).await.unwrap();
                prop_assert_eq!(outcomes.len(), m);
                for (i, outcome) in outcomes.iter().enumerate() {
                    prop_assert_eq!(outcome.success(), Some(&i));
                }
                Ok(())
            })?;
        }
    }
}

// Simulated I/O helper shared by the keyed tests
async fn fetch_endpoint(endpoint: &'static str, delay_ms: u64) -> Result<String, BoxError> {
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    Ok(format!("response from {}", endpoint))
}
