//! Fan-out / fan-in over Tokio tasks.
//!
//! Every item is spawned as its own task; results are joined back in input
//! order regardless of completion order. If any task fails the batch fails
//! with the error of the earliest failing item. Siblings are not cancelled.

use std::future::Future;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::domain::{InsightError, Result};

/// Spawn `f(index, item)` for every item and join the results in input order.
pub async fn fan_out<T, R, F, Fut>(items: Vec<T>, f: F) -> Result<Vec<R>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(usize, T) -> Fut,
    Fut: Future<Output = Result<R>> + Send + 'static,
{
    let tasks: Vec<JoinHandle<Result<R>>> = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| tokio::spawn(f(index, item)))
        .collect();

    debug!(tasks = tasks.len(), "fan-out spawned");

    join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.map_err(|e| InsightError::TaskFailed(e.to_string()))?)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_results_follow_input_order_not_completion_order() {
        // Earlier items sleep longer, so they finish last.
        let delays = vec![30u64, 20, 10, 0];
        let out = fan_out(delays, |index, delay| async move {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(index * 10)
        })
        .await
        .unwrap();
        assert_eq!(out, vec![0, 10, 20, 30]);
    }

    #[tokio::test]
    async fn test_first_failure_by_position_fails_the_batch() {
        let out = fan_out(vec![1, 2, 3], |index, _| async move {
            if index >= 1 {
                Err(InsightError::Publish(format!("item {index}")))
            } else {
                Ok(index)
            }
        })
        .await;

        match out {
            Err(InsightError::Publish(msg)) => assert_eq!(msg, "item 1"),
            other => panic!("expected publish error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failure_does_not_cancel_siblings() {
        let finished = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&finished);
        let out = fan_out(vec![0u64, 20], move |index, delay| {
            let counter = Arc::clone(&counter);
            async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                counter.fetch_add(1, Ordering::SeqCst);
                if index == 0 {
                    Err(InsightError::EmptyInput)
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert!(out.is_err());
        assert_eq!(finished.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_panicking_task_maps_to_task_failed() {
        let out: Result<Vec<()>> = fan_out(vec![true], |_, explode| async move {
            if explode {
                panic!("boom");
            }
            Ok(())
        })
        .await;
        assert!(matches!(out, Err(InsightError::TaskFailed(_))));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let out: Vec<usize> = fan_out(Vec::<usize>::new(), |_, item| async move { Ok(item) })
            .await
            .unwrap();
        assert!(out.is_empty());
    }
}
