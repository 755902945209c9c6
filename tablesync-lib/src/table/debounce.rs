//! Trailing-edge debouncing on tokio tasks.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use log::debug;
use log::error;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Runs only the last of a burst of scheduled effects.
///
/// Each [`schedule`](Self::schedule) aborts the pending task and spawns a
/// new one that sleeps for the delay before running. Dropping the debouncer
/// aborts whatever is pending.
pub struct Debouncer {
    name: &'static str,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    /// Creates an idle debouncer; the name is used in log messages.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            pending: Mutex::new(None),
        }
    }

    /// Schedules an effect, replacing any pending one.
    ///
    /// Returns `false` if no tokio runtime is available, in which case the
    /// effect is dropped and the caller decides on a fallback.
    pub fn schedule<F>(&self, delay: Duration, effect: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Ok(handle) = Handle::try_current() else {
            return false;
        };
        let name = self.name;
        let task = handle.spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if AssertUnwindSafe(effect).catch_unwind().await.is_err() {
                error!("Debounced {} effect panicked", name);
            }
        });

        if let Some(previous) = self.pending.lock().replace(task) {
            if !previous.is_finished() {
                debug!("Debounced {} effect superseded", name);
            }
            previous.abort();
        }
        true
    }

    /// Aborts the pending effect, if any.
    pub fn cancel(&self) {
        if let Some(task) = self.pending.lock().take() {
            task.abort();
        }
    }

    /// Returns `true` if an effect is scheduled and has not finished.
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_burst_runs_last_only() {
        let debouncer = Debouncer::new("test");
        let runs = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(AtomicUsize::new(0));

        for i in 1..=5 {
            let runs = runs.clone();
            let last = last.clone();
            assert!(debouncer.schedule(Duration::from_millis(100), async move {
                runs.fetch_add(1, Ordering::SeqCst);
                last.store(i, Ordering::SeqCst);
            }));
            tokio::time::sleep(Duration::from_millis(30)).await;
        }

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(last.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel() {
        let debouncer = Debouncer::new("test");
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        debouncer.schedule(Duration::from_millis(50), async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(debouncer.is_pending());
        debouncer.cancel();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_without_runtime() {
        let debouncer = Debouncer::new("test");
        assert!(!debouncer.schedule(Duration::ZERO, async {}));
    }
}
