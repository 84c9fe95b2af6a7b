//! Bounded fan-out / ordered fan-in.
//!
//! Each item becomes its own tokio task so a panic stays inside its slot.
//! `buffer_unordered` admits the next item as soon as any outstanding task
//! finishes, never exceeding `max_concurrency`. Results are written back by
//! index so the caller sees them in input order.

use futures::stream::{self, StreamExt};
use std::future::Future;
use thiserror::Error;
use tokio::task::JoinError;

pub const DEFAULT_MAX_CONCURRENCY: usize = 50;

/// A unit of work that did not produce a value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskFailure {
    #[error("task panicked: {0}")]
    Panicked(String),

    #[error("task was cancelled")]
    Cancelled,
}

impl From<JoinError> for TaskFailure {
    fn from(err: JoinError) -> Self {
        if !err.is_panic() {
            return TaskFailure::Cancelled;
        }
        let payload = err.into_panic();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        TaskFailure::Panicked(message)
    }
}

/// Run `worker` over every item with at most `max_concurrency` in flight.
///
/// `result[i]` always belongs to `items[i]`. Errors a worker returns are part
/// of its `R`; only panics and cancellation surface as [`TaskFailure`], and
/// neither affects sibling items. An empty input spawns nothing.
pub async fn dispatch<T, R, F, Fut>(
    items: Vec<T>,
    max_concurrency: usize,
    worker: F,
) -> Vec<Result<R, TaskFailure>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = R> + Send + 'static,
{
    if items.is_empty() {
        return Vec::new();
    }

    let limit = max_concurrency.max(1);
    let mut slots: Vec<Option<Result<R, TaskFailure>>> = items.iter().map(|_| None).collect();

    // Completion order, so any finished task frees its slot for the next item.
    let mut completed = stream::iter(items.into_iter().enumerate())
        .map(|(index, item)| {
            let handle = tokio::spawn(worker(item));
            async move { (index, handle.await.map_err(TaskFailure::from)) }
        })
        .buffer_unordered(limit);

    while let Some((index, result)) = completed.next().await {
        slots[index] = Some(result);
    }

    slots.into_iter().flatten().collect()
}
