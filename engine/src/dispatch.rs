//! Bounded-parallelism fan-out for target and judge queries.
//!
//! Built on `tokio::task::JoinSet` plus a `Semaphore` capped at 10 permits:
//! a spawn/await-all shape for bounded concurrency, since these fan-outs
//! are network-bound rather than CPU-bound.
//!
//! *Conservativeness*: a task's failure never aborts its siblings and never
//! aborts the fan-out. Each call site supplies the degraded value for its
//! role (target -> `""`, judge rating -> `1`, on-topic -> `1.0`) via
//! `degraded`, which also fills any index the fan-out stopped short of
//! spawning because cancellation was observed first.

use std::future::Future;
use std::sync::Arc;
use std::sync::Mutex;

use redteam_core::CancellationToken;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

const MAX_CONCURRENT: usize = 10;

/// Run `make_future(i)` for every `i` in `0..n`, at most 10 concurrently,
/// and return the results in index order. If `cancel` is already set before
/// an index is spawned, that index is filled with `degraded` instead
/// (cancellation stops enqueuing new work but lets outstanding tasks finish).
pub async fn fan_out<T, F, Fut>(n: usize, cancel: &CancellationToken, degraded: T, make_future: F) -> Vec<T>
where
    T: Clone + Send + std::fmt::Debug + 'static,
    F: Fn(usize) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT));
    let results: Arc<Mutex<Vec<T>>> = Arc::new(Mutex::new(vec![degraded.clone(); n]));
    let mut tasks = JoinSet::new();

    for i in 0..n {
        if cancel.is_cancelled() {
            tracing::debug!(index = i, "fan-out stopped enqueuing after cancellation");
            break;
        }
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .expect("fan-out semaphore is never closed");
        let future = make_future(i);
        let results = Arc::clone(&results);
        tasks.spawn(async move {
            let value = future.await;
            results.lock().unwrap()[i] = value;
            drop(permit);
        });
    }

    while tasks.join_next().await.is_some() {}

    Arc::try_unwrap(results)
        .expect("all spawned tasks have completed")
        .into_inner()
        .unwrap()
}
