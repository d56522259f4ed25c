//! Cancellation and queue statistics.

use std::sync::atomic::Ordering;

use crate::types::{QueueStats, TaskId};

use super::MediaDownloader;

impl MediaDownloader {
    /// Request cooperative cancellation of a running task
    ///
    /// The task observes the request at its next suspension point, tears
    /// down the external downloader, and terminates with a `Cancelled`
    /// outcome. Equivalent to calling [`TaskHandle::cancel`] on the handle
    /// returned by `submit`.
    ///
    /// Returns `true` if the task was running, `false` otherwise (unknown
    /// id, still queued, or already finished — queued tasks are cancelled
    /// through their handle).
    ///
    /// [`TaskHandle::cancel`]: crate::types::TaskHandle::cancel
    pub async fn cancel(&self, id: TaskId) -> bool {
        let active = self.queue_state.active_tasks.lock().await;
        match active.get(&id) {
            Some(token) => {
                tracing::info!(task_id = id.0, "Cancellation requested");
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Number of tasks currently running
    pub async fn active_count(&self) -> usize {
        self.queue_state.active_tasks.lock().await.len()
    }

    /// Snapshot of queue occupancy
    pub async fn queue_stats(&self) -> QueueStats {
        let queued = self.queue_state.queue.lock().await.len();
        let active = self.queue_state.active_tasks.lock().await.len();

        QueueStats {
            queued,
            active,
            accepting_new: self.queue_state.accepting_new.load(Ordering::SeqCst),
        }
    }
}
