//! Debounced fire-and-forget tasks for search-as-you-type and card lookups.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Runs the most recently scheduled task after a quiet period.
///
/// Each task waits out the delay and then runs only if nothing newer was
/// scheduled in the meantime, so only the last of a burst of keystrokes
/// issues a request. A task that has started running is never interrupted.
/// Callers never await the work; results go wherever the scheduled future
/// sends them.
pub struct Debouncer {
    delay: Duration,
    /// Bumped by every `schedule` and `cancel`; a waiting task runs only if
    /// it still holds the latest value.
    generation: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `task` to run after the delay, superseding any task still
    /// waiting.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let generation = Arc::clone(&self.generation);
        let mine = generation.fetch_add(1, Ordering::SeqCst) + 1;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if generation.load(Ordering::SeqCst) != mine {
                tracing::trace!("Superseded debounced task skipped");
                return;
            }
            task.await;
        });
    }

    /// Drop the waiting task, if any. A task already running finishes.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_only_last_task_runs() {
        let debouncer = Debouncer::new(Duration::from_millis(50));
        let (tx, mut rx) = mpsc::unbounded_channel();

        for i in 0..5 {
            let tx = tx.clone();
            debouncer.schedule(async move {
                let _ = tx.send(i);
            });
        }
        drop(tx);

        assert_eq!(rx.recv().await, Some(4));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_cancel_prevents_run() {
        let debouncer = Debouncer::new(Duration::from_millis(50));
        let runs = Arc::new(AtomicUsize::new(0));

        let counter = runs.clone();
        debouncer.schedule(async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        debouncer.cancel();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_running_task_is_not_interrupted() {
        let debouncer = Debouncer::new(Duration::from_millis(10));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let first = tx.clone();
        debouncer.schedule(async move {
            // Still busy when the next task is scheduled
            tokio::time::sleep(Duration::from_millis(100)).await;
            let _ = first.send("first");
        });
        tokio::time::sleep(Duration::from_millis(40)).await;

        let second = tx.clone();
        debouncer.schedule(async move {
            let _ = second.send("second");
        });
        drop(tx);

        assert_eq!(rx.recv().await, Some("second"));
        assert_eq!(rx.recv().await, Some("first"));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_spaced_tasks_all_run() {
        let debouncer = Debouncer::new(Duration::from_millis(10));
        let runs = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let counter = runs.clone();
            debouncer.schedule(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(60)).await;
        }

        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }
}
