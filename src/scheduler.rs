//! Scheduled Tasks
//!
//! Timers (delayed view switches, resource polling, icon cycling) run as
//! tokio tasks behind a [`TaskHandle`]. Dropping the handle cancels the task,
//! so every teardown path releases it.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug)]
pub struct TaskHandle {
    name: &'static str,
    inner: Option<JoinHandle<()>>,
}

impl TaskHandle {
    fn new(name: &'static str, inner: JoinHandle<()>) -> Self {
        Self {
            name,
            inner: Some(inner),
        }
    }

    /// True while the task has neither finished nor been cancelled
    pub fn is_active(&self) -> bool {
        self.inner.as_ref().map_or(false, |h| !h.is_finished())
    }

    /// Abort the task. Safe to call more than once.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.inner.take() {
            handle.abort();
            debug!(task = self.name, "Cancelled scheduled task");
        }
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Run `task` once after `delay`.
pub fn spawn_after<F>(name: &'static str, delay: Duration, task: F) -> TaskHandle
where
    F: Future<Output = ()> + Send + 'static,
{
    let handle = tokio::spawn(async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        task.await;
    });
    TaskHandle::new(name, handle)
}

/// Shortest period `spawn_every` will run at
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Run `tick` immediately and then every `period` until cancelled.
/// The loop ends early when `tick` returns false. Periods below
/// [`MIN_PERIOD`] are raised to it.
pub fn spawn_every<F, Fut>(name: &'static str, period: Duration, mut tick: F) -> TaskHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period.max(MIN_PERIOD));
        loop {
            interval.tick().await;
            if !tick().await {
                break;
            }
        }
    });
    TaskHandle::new(name, handle)
}
