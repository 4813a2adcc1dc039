//! Bounded concurrent mapping over a list of items.
//!
//! Spawns at most N persistent tokio tasks that claim item indices from a
//! shared atomic counter. Each result is written to the slot matching its
//! input position, so output order never depends on completion order.
//!
//! A failing item (an `Err` or a panic inside the operation) leaves its slot
//! empty. Sibling items and the overall call are never aborted.

use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use tokio::task::JoinHandle;

/// Apply `op` to every item with at most `limit` operations in flight.
///
/// Returns one slot per input item, in input order. A slot is `None` when
/// the operation for that item returned an error or panicked.
///
/// A `limit` of zero is treated as one.
///
/// # Example
///
/// ```ignore
/// let lengths = map_limit(titles, 8, |title| async move {
///     Ok::<_, std::convert::Infallible>(title.len())
/// })
/// .await;
/// ```
pub async fn map_limit<T, R, E, F, Fut>(items: Vec<T>, limit: usize, op: F) -> Vec<Option<R>>
where
    T: Send + 'static,
    R: Send + 'static,
    E: Display + Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
{
    let len = items.len();
    if len == 0 {
        return Vec::new();
    }
    let workers = limit.max(1).min(len);

    // Each item sits in its own slot so a worker can take ownership of
    // exactly the index it claimed.
    let slots: Arc<Vec<Mutex<Option<T>>>> =
        Arc::new(items.into_iter().map(|item| Mutex::new(Some(item))).collect());
    let next = Arc::new(AtomicUsize::new(0));
    let op = Arc::new(op);

    let handles: Vec<JoinHandle<Vec<(usize, R)>>> = (0..workers)
        .map(|_| {
            let slots = slots.clone();
            let next = next.clone();
            let op = op.clone();
            tokio::spawn(async move {
                let mut completed = Vec::new();
                loop {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    if index >= slots.len() {
                        break;
                    }
                    let Some(item) = take_item(&slots[index]) else {
                        continue;
                    };

                    let op = &op;
                    match AssertUnwindSafe(async move { op(item).await })
                        .catch_unwind()
                        .await
                    {
                        Ok(Ok(result)) => completed.push((index, result)),
                        Ok(Err(e)) => {
                            log::debug!("map_limit: item {} failed: {}", index, e);
                        }
                        Err(_) => {
                            log::debug!("map_limit: item {} panicked, slot left empty", index);
                        }
                    }
                }
                completed
            })
        })
        .collect();

    let mut results: Vec<Option<R>> = (0..len).map(|_| None).collect();
    for handle in handles {
        match handle.await {
            Ok(completed) => {
                for (index, result) in completed {
                    results[index] = Some(result);
                }
            }
            Err(e) => log::warn!("map_limit: worker task ended abnormally: {}", e),
        }
    }
    results
}

fn take_item<T>(slot: &Mutex<Option<T>>) -> Option<T> {
    slot.lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .take()
}
