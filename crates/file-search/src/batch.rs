// crates/file-search/src/batch.rs
// Bounded-concurrency batch executor with per-item outcome aggregation

use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Worker bound used when the caller asks for zero
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Outcome of a batch. Every dispatched item lands in exactly one of
/// `succeeded` or `failed`; undispatched items (after cancellation) in neither.
#[derive(Debug)]
pub struct BatchResult<E> {
    pub succeeded: Vec<String>,
    pub failed: BTreeMap<String, E>,
    pub total: usize,
}

impl<E> BatchResult<E> {
    fn empty() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: BTreeMap::new(),
            total: 0,
        }
    }

    pub fn processed(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// One progress notification, delivered once per finished item
#[derive(Debug)]
pub struct BatchProgress<'a, E> {
    /// 1-based completion count; strictly increasing across all workers
    pub current: usize,
    pub total: usize,
    pub item: &'a str,
    pub error: Option<&'a E>,
}

struct BatchState<E> {
    completed: usize,
    succeeded: Vec<String>,
    failed: BTreeMap<String, E>,
}

/// Run `op` over `items` with at most `concurrency` in flight.
///
/// A failing item never aborts its siblings. Once `cancel` fires no new
/// items are dispatched; items already running are left to finish (the
/// operation itself is expected to observe cancellation). Progress is
/// reported under the same lock that records the outcome, so counts never
/// repeat or go backwards. A repeated item is dispatched once and counted
/// once in `total`.
pub async fn run<E, F, Fut, P>(
    items: Vec<String>,
    concurrency: usize,
    cancel: CancellationToken,
    op: F,
    on_progress: P,
) -> BatchResult<E>
where
    E: Send + 'static,
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    P: Fn(BatchProgress<'_, E>) + Send + Sync + 'static,
{
    let mut seen = HashSet::new();
    let items: Vec<String> = items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect();
    let total = items.len();
    if total == 0 {
        return BatchResult::empty();
    }
    let concurrency = if concurrency == 0 {
        DEFAULT_CONCURRENCY
    } else {
        concurrency
    };
    debug!(total, concurrency, "Starting batch");

    let semaphore = Arc::new(Semaphore::new(concurrency));
    let state = Arc::new(Mutex::new(BatchState {
        completed: 0,
        succeeded: Vec::with_capacity(total),
        failed: BTreeMap::new(),
    }));
    let op = Arc::new(op);
    let on_progress = Arc::new(on_progress);
    let mut tasks = JoinSet::new();

    for item in items {
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            permit = semaphore.clone().acquire_owned() => match permit {
                Ok(p) => p,
                Err(_) => break,
            },
        };
        if cancel.is_cancelled() {
            break;
        }

        let op = Arc::clone(&op);
        let on_progress = Arc::clone(&on_progress);
        let state = Arc::clone(&state);
        tasks.spawn(async move {
            let outcome = op(item.clone()).await;

            let mut guard = state.lock().unwrap_or_else(|e| e.into_inner());
            guard.completed += 1;
            let current = guard.completed;
            match outcome {
                Ok(()) => {
                    on_progress(BatchProgress {
                        current,
                        total,
                        item: &item,
                        error: None,
                    });
                    guard.succeeded.push(item);
                }
                Err(e) => {
                    on_progress(BatchProgress {
                        current,
                        total,
                        item: &item,
                        error: Some(&e),
                    });
                    guard.failed.insert(item, e);
                }
            }
            drop(guard);
            drop(permit);
        });
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            if e.is_panic() {
                std::panic::resume_unwind(e.into_panic());
            }
        }
    }

    let mut guard = state.lock().unwrap_or_else(|e| e.into_inner());
    let succeeded = std::mem::take(&mut guard.succeeded);
    let failed = std::mem::take(&mut guard.failed);
    drop(guard);

    debug!(
        total,
        succeeded = succeeded.len(),
        failed = failed.len(),
        "Batch finished"
    );

    BatchResult {
        succeeded,
        failed,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn items(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_empty_input() {
        let calls = Arc::new(AtomicUsize::new(0));
        let progress_calls = Arc::clone(&calls);
        let result: BatchResult<String> = run(
            Vec::new(),
            3,
            CancellationToken::new(),
            |_item| async { Ok(()) },
            move |_p| {
                progress_calls.fetch_add(1, Ordering::SeqCst);
            },
        )
        .await;
        assert_eq!(result.total, 0);
        assert!(result.succeeded.is_empty());
        assert!(result.failed.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_abort_siblings() {
        let result = run(
            items(&["f1", "f2", "f3"]),
            2,
            CancellationToken::new(),
            |item| async move {
                if item == "f2" {
                    Err(format!("{} is broken", item))
                } else {
                    Ok(())
                }
            },
            |_p| {},
        )
        .await;

        let mut succeeded = result.succeeded.clone();
        succeeded.sort();
        assert_eq!(succeeded, vec!["f1", "f3"]);
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed["f2"], "f2 is broken");
        assert_eq!(result.total, 3);
        assert!(result.has_failures());
    }

    #[tokio::test]
    async fn test_all_fail_sequentially() {
        let result = run(
            items(&["a", "b", "c", "d"]),
            1,
            CancellationToken::new(),
            |_item| async { Err::<(), _>("nope") },
            |_p| {},
        )
        .await;
        assert!(result.succeeded.is_empty());
        assert_eq!(result.failed.len(), 4);
        assert_eq!(result.processed(), 4);
    }

    #[tokio::test]
    async fn test_repeated_items_run_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let result = run(
            items(&["a", "b", "a", "c", "b"]),
            2,
            CancellationToken::new(),
            move |item| {
                counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if item == "a" {
                        Err("broken".to_string())
                    } else {
                        Ok(())
                    }
                }
            },
            |_p| {},
        )
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(result.total, 3);
        assert_eq!(result.processed(), result.total);
        assert_eq!(result.failed.len(), 1);
    }

    #[tokio::test]
    async fn test_zero_concurrency_uses_default() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (f, p) = (Arc::clone(&in_flight), Arc::clone(&peak));
        let result: BatchResult<String> = run(
            (0..12).map(|i| i.to_string()).collect(),
            0,
            CancellationToken::new(),
            move |_item| {
                let (f, p) = (Arc::clone(&f), Arc::clone(&p));
                async move {
                    let now = f.fetch_add(1, Ordering::SeqCst) + 1;
                    p.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    f.fetch_sub(1, Ordering::SeqCst);
                    Ok(())
                }
            },
            |_p| {},
        )
        .await;
        assert_eq!(result.succeeded.len(), 12);
        assert!(peak.load(Ordering::SeqCst) <= DEFAULT_CONCURRENCY);
    }
}
