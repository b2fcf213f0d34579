// Generic periodic-callback primitive - knows nothing about charts or data
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(60);

/// Runs a callback once immediately on start and then on a fixed period.
/// At most one timer task exists per scheduler: starting while running and
/// stopping while stopped are both no-ops.
#[derive(Default)]
pub struct RefreshScheduler {
    handle: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self { handle: None }
    }

    pub fn start<F, Fut>(&mut self, period: Duration, callback: F)
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.handle.is_some() {
            tracing::debug!("refresh scheduler already running; start ignored");
            return;
        }
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                // The first tick completes immediately.
                ticker.tick().await;
                callback().await;
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_callback(count: Arc<AtomicUsize>) -> impl Fn() -> std::future::Ready<()> + Send {
        move || {
            count.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_immediately_then_on_period() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut scheduler = RefreshScheduler::new();
        scheduler.start(Duration::from_secs(60), counting_callback(count.clone()));

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(count.load(Ordering::SeqCst), 4);

        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_while_running_is_a_no_op() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut scheduler = RefreshScheduler::new();
        scheduler.start(Duration::from_secs(60), counting_callback(first.clone()));
        scheduler.start(Duration::from_secs(1), counting_callback(second.clone()));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);

        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_the_timer_and_is_idempotent() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut scheduler = RefreshScheduler::new();
        scheduler.start(Duration::from_secs(60), counting_callback(count.clone()));

        tokio::time::sleep(Duration::from_millis(1)).await;
        scheduler.stop();
        scheduler.stop();
        assert!(!scheduler.is_running());

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_can_restart_after_stop() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut scheduler = RefreshScheduler::new();
        scheduler.start(Duration::from_secs(60), counting_callback(count.clone()));
        tokio::time::sleep(Duration::from_millis(1)).await;
        scheduler.stop();

        scheduler.start(Duration::from_secs(60), counting_callback(count.clone()));
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);

        scheduler.stop();
    }
}
