//! Unbounded fan-out helpers
//!
//! Gather-style fan-out/fan-in with the same isolated-failure, input-order
//! contract as the bounded executor, but no concurrency cap and no spawning.
//! Because futures are polled in place rather than spawned, non-`'static`
//! futures are accepted; the trade-off is that panics are not caught here
//! (there is no join boundary). Use [`BoundedExecutor`](crate::BoundedExecutor)
//! when a cap or panic isolation is needed.

use std::future::Future;

use futures::stream::{FuturesOrdered, StreamExt};
use tracing::warn;

use crate::executor::{FailureKind, TaskFailure, TaskOutcome};
use crate::BoxError;

/// Run all futures concurrently, collecting per-item outcomes in input order
///
/// A failing item becomes a [`TaskOutcome::Failure`] at its index and does
/// not affect its siblings.
pub async fn join_isolated<R, F>(futures: Vec<F>) -> Vec<TaskOutcome<R>>
where
    F: Future<Output = std::result::Result<R, BoxError>>,
{
    let mut ordered: FuturesOrdered<F> = futures.into_iter().collect();
    let mut outcomes = Vec::with_capacity(ordered.len());

    let mut index = 0;
    while let Some(result) = ordered.next().await {
        match result {
            Ok(value) => outcomes.push(TaskOutcome::Success(value)),
            Err(e) => {
                warn!(index, error = %e, "fan-out item failed");
                outcomes.push(TaskOutcome::Failure(TaskFailure::new(
                    index,
                    FailureKind::Error,
                    e.to_string(),
                )));
            }
        }
        index += 1;
    }

    outcomes
}

/// Keyed variant of [`join_isolated`]; keys keep their submission order
pub async fn join_keyed<K, R, F>(futures: Vec<(K, F)>) -> Vec<(K, TaskOutcome<R>)>
where
    F: Future<Output = std::result::Result<R, BoxError>>,
{
    let (keys, futures): (Vec<K>, Vec<F>) = futures.into_iter().unzip();
    let outcomes = join_isolated(futures).await;
    keys.into_iter().zip(outcomes).collect()
}
