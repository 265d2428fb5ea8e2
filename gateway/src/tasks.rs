//! Deferred work that must finish even after the response has been sent.

use std::future::Future;

use tokio_util::task::TaskTracker;
use tracing::info;

/// Tracks background tasks so shutdown can wait for them.
#[derive(Clone, Default)]
pub struct DeferredTasks {
    tracker: TaskTracker,
}

impl DeferredTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a task in the background without awaiting it.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tracker.spawn(task);
    }

    /// Number of tasks still running.
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Wait for every task spawned so far, then keep accepting new ones.
    pub async fn flush(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// Wait for every outstanding task before the process exits.
    pub async fn shutdown(&self) {
        let pending = self.pending();
        if pending > 0 {
            info!(pending, "Waiting for deferred tasks");
        }
        self.tracker.close();
        self.tracker.wait().await;
    }
}
