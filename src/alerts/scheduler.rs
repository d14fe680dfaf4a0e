use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// A repeating background task with an explicit stop handle.
///
/// The task runs once immediately, then re-arms `interval` after each run
/// completes (trailing interval: a slow run pushes the next one out by its
/// own duration, there is no fixed-phase clock). Stopping takes effect
/// between runs; a run already in progress completes first. Dropping the
/// handle without calling `stop` also ends the loop at its next idle point.
pub struct RepeatingTask {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl RepeatingTask {
    pub fn spawn<F, Fut>(interval: Duration, mut task: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (shutdown, mut watcher) = watch::channel(false);
        let handle = tokio::spawn(async move {
            loop {
                task().await;
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    // fires on stop() and when the handle is dropped
                    _ = watcher.changed() => break,
                }
            }
        });
        Self { shutdown, handle }
    }

    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn counting_task(count: Arc<AtomicU32>) -> impl FnMut() -> std::future::Ready<()> + Send + 'static
    {
        move || {
            count.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn runs_immediately_then_on_trailing_interval() {
        let count = Arc::new(AtomicU32::new(0));
        let task = RepeatingTask::spawn(Duration::from_secs(3600), counting_task(count.clone()));

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1, "first run has no delay");

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);

        tokio::time::sleep(Duration::from_secs(2 * 3600)).await;
        assert_eq!(count.load(Ordering::SeqCst), 4);

        task.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_prevents_further_runs() {
        let count = Arc::new(AtomicU32::new(0));
        let task = RepeatingTask::spawn(Duration::from_secs(3600), counting_task(count.clone()));

        tokio::time::sleep(Duration::from_millis(10)).await;
        task.stop().await;
        let after_stop = count.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_secs(3 * 3600)).await;
        assert_eq!(count.load(Ordering::SeqCst), after_stop);
    }
}
